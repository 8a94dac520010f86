use serde::{Deserialize, Serialize};

use crate::entity::{EntityId, EntityMeta, NamingSequence};
use crate::errors::StruxResult;
use crate::geometry::{CoordinateSystem, Edge, Region, Vector3};
use crate::releases::ShellEdgeConnection;
use crate::restricted::{NonNegMax1e5, SlabType};

/// Prefix of default panel names
pub const PANEL_PREFIX: &str = "PP";

/// Panel with a continuous analytical model: one internal region whose
/// outer edges carry the external edge connections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    pub(crate) meta: EntityMeta,
    name: String,
    panel_type: SlabType,
    material: EntityId,
    section: EntityId,
    thickness: NonNegMax1e5,
    region: Region,
}

/// Everything a panel exposes, by value
#[derive(Debug, Clone, PartialEq)]
pub struct PanelParts {
    pub id: EntityId,
    pub region: Region,
    pub material: EntityId,
    pub section: EntityId,
    pub edges: Vec<Edge>,
    pub edge_connections: Vec<ShellEdgeConnection>,
    pub local_x: Vector3,
    pub local_y: Vector3,
    pub identifier: String,
}

impl Panel {
    pub fn new(
        names: &mut NamingSequence,
        panel_type: SlabType,
        region: Region,
        material: EntityId,
        section: EntityId,
        thickness: f64,
        edge_connection: ShellEdgeConnection,
    ) -> StruxResult<Self> {
        panel_type.check_region(&region)?;
        let thickness = NonNegMax1e5::new(thickness)?;
        Ok(Panel {
            meta: EntityMeta::created(),
            name: names.next_name(PANEL_PREFIX),
            panel_type,
            material,
            section,
            thickness,
            region: region.with_all_edge_connections(edge_connection),
        })
    }

    pub(crate) fn restore(
        meta: EntityMeta,
        name: String,
        panel_type: SlabType,
        material: EntityId,
        section: EntityId,
        thickness: NonNegMax1e5,
        region: Region,
    ) -> StruxResult<Self> {
        panel_type.check_region(&region)?;
        Ok(Panel {
            meta,
            name,
            panel_type,
            material,
            section,
            thickness,
            region,
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

    pub fn panel_type(&self) -> SlabType {
        self.panel_type
    }

    pub fn material(&self) -> EntityId {
        self.material
    }

    pub fn section(&self) -> EntityId {
        self.section
    }

    pub fn thickness(&self) -> NonNegMax1e5 {
        self.thickness
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    pub fn coordinate_system(&self) -> &CoordinateSystem {
        self.region.coordinate_system()
    }

    pub fn external_edge_connections(&self) -> &[ShellEdgeConnection] {
        self.region.edge_connections()
    }

    /// Copy with `connection` on the external edges at `indices`; all or
    /// nothing, like [`Slab::set_shell_edge_connection`](super::Slab::set_shell_edge_connection).
    pub fn set_external_edge_connections(&self, connection: ShellEdgeConnection, indices: &[usize]) -> StruxResult<Panel> {
        let mut panel = self.clone();
        panel.region = panel.region.with_edge_connection(connection, indices)?;
        panel.meta.touch();
        Ok(panel)
    }

    pub fn deconstruct(&self) -> PanelParts {
        let cs = self.coordinate_system();
        PanelParts {
            id: self.id(),
            region: self.region.clone(),
            material: self.material,
            section: self.section,
            edges: self.region.edges().cloned().collect(),
            edge_connections: self.external_edge_connections().to_vec(),
            local_x: cs.local_x(),
            local_y: cs.local_y(),
            identifier: self.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point3;

    fn panel() -> Panel {
        let region =
            Region::rectangle(Point3::ORIGIN, Vector3::new(4.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 3.0)).unwrap();
        Panel::new(
            &mut NamingSequence::new(),
            SlabType::Wall,
            region,
            EntityId::new(),
            EntityId::new(),
            0.2,
            ShellEdgeConnection::rigid(),
        )
        .unwrap()
    }

    #[test]
    fn test_deconstruct() {
        let p = panel();
        let parts = p.deconstruct();
        assert_eq!(parts.identifier, "PP.1");
        assert_eq!(parts.id, p.id());
        assert_eq!(parts.edges.len(), 4);
        assert_eq!(parts.edge_connections.len(), 4);
        assert!(parts.local_x.equals(&Vector3::UNIT_X, 1e-12));
        assert!(parts.local_y.equals(&Vector3::UNIT_Z, 1e-12));
    }

    #[test]
    fn test_set_external_edge_connections() {
        let p = panel();
        let hinged = p
            .set_external_edge_connections(ShellEdgeConnection::hinged(), &[3])
            .unwrap();
        assert_eq!(hinged.external_edge_connections()[3], ShellEdgeConnection::hinged());
        assert_eq!(p.external_edge_connections()[3], ShellEdgeConnection::rigid());
        assert!(p
            .set_external_edge_connections(ShellEdgeConnection::hinged(), &[9])
            .is_err());
    }

    #[test]
    fn test_negative_thickness_is_rejected() {
        let region =
            Region::rectangle(Point3::ORIGIN, Vector3::new(4.0, 0.0, 0.0), Vector3::new(0.0, 3.0, 0.0)).unwrap();
        let result = Panel::new(
            &mut NamingSequence::new(),
            SlabType::Plate,
            region,
            EntityId::new(),
            EntityId::new(),
            -0.2,
            ShellEdgeConnection::rigid(),
        );
        assert!(result.is_err());
    }
}
