//! Plates and walls.
//!
//! Slabs are updated out of place: every setter returns a modified copy and
//! leaves the receiver as it was, on success and on failure.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::properties::{LocationValue, ShellEccentricity, ShellOrthotropy, ShellProperties};
use crate::entity::{EntityId, EntityMeta, NamingSequence};
use crate::errors::{StruxError, StruxResult};
use crate::geometry::{Region, Vector3};
use crate::releases::ShellEdgeConnection;
use crate::restricted::{NonNegMax1e5, SlabType};
use crate::tolerance;

impl SlabType {
    /// Allowed numbers of thickness samples: uniform or a variable field
    pub const fn thickness_arity(&self) -> [usize; 2] {
        match self {
            SlabType::Plate => [1, 3],
            SlabType::Wall => [1, 2],
        }
    }

    /// Default name prefix
    pub const fn prefix(&self) -> &'static str {
        match self {
            SlabType::Plate => "P",
            SlabType::Wall => "W",
        }
    }

    /// Check a region's orientation for this type
    pub fn check_region(&self, region: &Region) -> StruxResult<()> {
        if *self == SlabType::Wall {
            let z = region.coordinate_system().local_z().z;
            if z.abs() > tolerance::POINT3D {
                return Err(StruxError::invalid_geometry(format!(
                    "wall is not vertical (local z has global z component {:e}); create a plate instead",
                    z
                )));
            }
        }
        Ok(())
    }

    fn check_thickness(&self, thickness: &[LocationValue]) -> StruxResult<()> {
        let [uniform, variable] = self.thickness_arity();
        if thickness.len() != uniform && thickness.len() != variable {
            return Err(StruxError::arity(
                "thickness",
                thickness.len(),
                format!("{} or {} for a {}", uniform, variable, self),
            ));
        }
        Ok(())
    }
}

/// Analytical part of a slab
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlabPart {
    pub(crate) meta: EntityMeta,
    pub name: String,
    pub region: Region,
    pub thickness: Vec<LocationValue>,
    pub material: EntityId,
    pub eccentricity: ShellEccentricity,
    pub orthotropy: ShellOrthotropy,
    /// Average surface element size [m]; zero lets the engine choose
    pub mesh_size: NonNegMax1e5,
}

impl SlabPart {
    pub fn meta(&self) -> &EntityMeta {
        &self.meta
    }
}

/// A named plate or wall
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slab {
    pub(crate) meta: EntityMeta,
    name: String,
    slab_type: SlabType,
    part: SlabPart,
}

impl Slab {
    /// Create a slab with the next default name for its type.
    ///
    /// # Errors
    ///
    /// * `InvalidGeometry` - a wall region that is not vertical
    /// * `Arity` - wrong number of thickness samples for the type
    pub fn new(
        names: &mut NamingSequence,
        slab_type: SlabType,
        region: Region,
        thickness: Vec<LocationValue>,
        material: EntityId,
        properties: ShellProperties,
    ) -> StruxResult<Self> {
        slab_type.check_region(&region)?;
        slab_type.check_thickness(&thickness)?;

        let name = names.next_name(slab_type.prefix());
        let part = SlabPart {
            meta: EntityMeta::created(),
            name: format!("{}.1", name),
            region: region.with_all_edge_connections(properties.edge_connection),
            thickness,
            material,
            eccentricity: properties.eccentricity,
            orthotropy: properties.orthotropy,
            mesh_size: NonNegMax1e5::ZERO,
        };
        Ok(Slab {
            meta: EntityMeta::created(),
            name,
            slab_type,
            part,
        })
    }

    pub fn plate(
        names: &mut NamingSequence,
        region: Region,
        thickness: Vec<LocationValue>,
        material: EntityId,
        properties: ShellProperties,
    ) -> StruxResult<Self> {
        Slab::new(names, SlabType::Plate, region, thickness, material, properties)
    }

    pub fn wall(
        names: &mut NamingSequence,
        region: Region,
        thickness: Vec<LocationValue>,
        material: EntityId,
        properties: ShellProperties,
    ) -> StruxResult<Self> {
        Slab::new(names, SlabType::Wall, region, thickness, material, properties)
    }

    pub(crate) fn restore(meta: EntityMeta, name: String, slab_type: SlabType, part: SlabPart) -> StruxResult<Self> {
        slab_type.check_region(&part.region)?;
        slab_type.check_thickness(&part.thickness)?;
        Ok(Slab {
            meta,
            name,
            slab_type,
            part,
        })
    }

    pub fn id(&self) -> EntityId {
        self.meta.id
    }

    /// Identity and change stamp; read-only outside the crate
    pub fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn slab_type(&self) -> SlabType {
        self.slab_type
    }

    pub fn part(&self) -> &SlabPart {
        &self.part
    }

    pub fn region(&self) -> &Region {
        &self.part.region
    }

    pub fn edge_connections(&self) -> &[ShellEdgeConnection] {
        self.part.region.edge_connections()
    }

    // ------------------------------------------------------------------------
    // Out-of-place updates
    // ------------------------------------------------------------------------

    /// Copy with `connection` on the edges at `indices`.
    ///
    /// Every index is checked against the region's edge count first; one
    /// out-of-range index fails the whole update with `IndexOutOfRange`.
    pub fn set_shell_edge_connection(&self, connection: ShellEdgeConnection, indices: &[usize]) -> StruxResult<Slab> {
        let mut slab = self.clone();
        slab.part.region = slab.part.region.with_edge_connection(connection, indices)?;
        slab.part.meta.touch();
        Ok(slab)
    }

    /// Copy with a new average surface element size
    pub fn set_average_surface_element_size(&self, size: f64) -> StruxResult<Slab> {
        let mut slab = self.clone();
        slab.part.mesh_size = NonNegMax1e5::new(size)?;
        slab.part.meta.touch();
        Ok(slab)
    }

    /// Copy with local x turned to `local_x` around the plane normal
    pub fn set_local_axes(&self, local_x: Vector3) -> StruxResult<Slab> {
        let mut cs = *self.part.region.coordinate_system();
        cs.set_x_around_z(local_x)?;
        let mut slab = self.clone();
        slab.part.region = slab.part.region.with_coordinate_system(cs)?;
        slab.part.meta.touch();
        Ok(slab)
    }

    /// Copy with the local frame oriented to the global one, plane-style
    pub fn orient_coordinate_system_to_gcs(&self) -> StruxResult<Slab> {
        let mut cs = *self.part.region.coordinate_system();
        cs.orient_plane_to_gcs()?;
        debug!(slab = %self.name, "oriented slab frame to global coordinate system");
        let mut slab = self.clone();
        slab.part.region = slab.part.region.with_coordinate_system(cs)?;
        slab.part.meta.touch();
        Ok(slab)
    }

    pub fn with_eccentricity(&self, eccentricity: ShellEccentricity) -> Slab {
        let mut slab = self.clone();
        slab.part.eccentricity = eccentricity;
        slab.part.meta.touch();
        slab
    }

    pub fn with_orthotropy(&self, orthotropy: ShellOrthotropy) -> Slab {
        let mut slab = self.clone();
        slab.part.orthotropy = orthotropy;
        slab.part.meta.touch();
        slab
    }
}
