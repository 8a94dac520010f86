//! Analytical part of a bar.
//!
//! The part owns the authoritative end data: two section references, two
//! eccentricities and two connectivities. The composite section and the
//! eccentricity model are recomputed from them on every read.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::eccentricity::{Eccentricity, ModelEccentricity};
use crate::entity::{EntityId, EntityMeta};
use crate::errors::{StruxError, StruxResult};
use crate::geometry::{CoordinateSystem, Edge, Point3, Vector3};
use crate::releases::Connectivity;
use crate::restricted::{BarType, SteelMade};
use crate::sections::ComplexSection;

// ============================================================================
// Per-type rules
// ============================================================================

/// What a bar type permits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarRules {
    /// Edge may be an arc
    pub allows_arc: bool,
    /// Edge must be a vertical line
    pub requires_vertical_line: bool,
    /// Start and end may carry different sections and eccentricities
    pub allows_distinct_ends: bool,
    /// Part carries a composite section and an eccentricity model
    pub has_complex_section: bool,
    /// Ends may be eccentric or released; otherwise centric and rigid
    pub allows_end_conditions: bool,
}

impl BarType {
    pub const fn rules(&self) -> BarRules {
        match self {
            BarType::Beam => BarRules {
                allows_arc: true,
                requires_vertical_line: false,
                allows_distinct_ends: true,
                has_complex_section: true,
                allows_end_conditions: true,
            },
            BarType::Column => BarRules {
                allows_arc: false,
                requires_vertical_line: true,
                allows_distinct_ends: true,
                has_complex_section: true,
                allows_end_conditions: true,
            },
            BarType::Truss => BarRules {
                allows_arc: false,
                requires_vertical_line: false,
                allows_distinct_ends: false,
                has_complex_section: false,
                allows_end_conditions: false,
            },
        }
    }

    /// Check an edge against this type's shape rule
    pub fn check_edge(&self, edge: &Edge) -> StruxResult<()> {
        let rules = self.rules();
        if !edge.is_line() && !rules.allows_arc {
            return Err(StruxError::invalid_geometry(format!("a {} edge must be a line", self)));
        }
        if rules.requires_vertical_line && !edge.is_line_vertical() {
            return Err(StruxError::invalid_geometry(format!("a {} edge must be a vertical line", self)));
        }
        Ok(())
    }

    /// Eccentricities must be zero and connectivities rigid on a type
    /// without end conditions; the document has no place for them.
    pub fn check_end_conditions(
        &self,
        eccentricities: &[Eccentricity; 2],
        connectivities: &[Connectivity; 2],
    ) -> StruxResult<()> {
        if self.rules().allows_end_conditions {
            return Ok(());
        }
        if eccentricities.iter().any(|e| *e != Eccentricity::default()) {
            return Err(StruxError::invalid_input(
                "eccentricities",
                format!("{:?}", eccentricities),
                format!("a {} is always centric", self),
            ));
        }
        if connectivities.iter().any(|c| *c != Connectivity::rigid()) {
            return Err(StruxError::invalid_input(
                "connectivities",
                format!("{:?}", connectivities),
                format!("a {} always has rigid ends", self),
            ));
        }
        Ok(())
    }
}

/// Broadcast a 1- or 2-element slice to both ends
fn ends<T: Copy>(field: &str, values: &[T], allow_distinct: bool, bar_type: BarType) -> StruxResult<[T; 2]> {
    match values {
        [v] => Ok([*v, *v]),
        [start, end] => {
            if !allow_distinct {
                return Err(StruxError::invalid_input(
                    field,
                    "2 values",
                    format!("a {} can only have 1 {}", bar_type, field),
                ));
            }
            Ok([*start, *end])
        }
        _ => Err(StruxError::arity(field, values.len(), "1 or 2")),
    }
}

// ============================================================================
// BarPart
// ============================================================================

/// Analytical bar: geometry, local frame and per-end properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarPart {
    pub(crate) meta: EntityMeta,
    name: String,
    bar_type: BarType,
    edge: Edge,
    coordinate_system: CoordinateSystem,
    material: EntityId,
    sections: [EntityId; 2],
    eccentricities: [Eccentricity; 2],
    connectivities: [Connectivity; 2],
    complex_section_id: Option<EntityId>,
    section_pos: [f64; 2],
    made: Option<SteelMade>,
    ecc_calc: bool,
}

/// Fields of a bar part read back from a document
pub(crate) struct BarPartRecord {
    pub meta: EntityMeta,
    pub name: String,
    pub bar_type: BarType,
    pub edge: Edge,
    pub local_y: Vector3,
    pub material: EntityId,
    pub sections: [EntityId; 2],
    pub eccentricities: [Eccentricity; 2],
    pub connectivities: [Connectivity; 2],
    pub complex_section_id: Option<EntityId>,
    pub made: Option<SteelMade>,
    pub ecc_calc: bool,
}

impl BarPart {
    /// Create a part named `{identifier}.1`.
    ///
    /// # Errors
    ///
    /// * `InvalidGeometry` - edge shape not allowed for `bar_type`
    /// * `Arity` - a per-end slice is empty or longer than 2
    /// * `InvalidInput` - distinct ends on a truss
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        identifier: &str,
        bar_type: BarType,
        edge: Edge,
        material: EntityId,
        sections: &[EntityId],
        eccentricities: &[Eccentricity],
        connectivities: &[Connectivity],
    ) -> StruxResult<Self> {
        bar_type.check_edge(&edge)?;
        let rules = bar_type.rules();
        let eccentricities = ends("eccentricities", eccentricities, rules.allows_distinct_ends, bar_type)?;
        let connectivities = ends("connectivities", connectivities, true, bar_type)?;
        bar_type.check_end_conditions(&eccentricities, &connectivities)?;
        Ok(BarPart {
            meta: EntityMeta::created(),
            name: format!("{}.1", identifier),
            bar_type,
            coordinate_system: edge.coordinate_system()?,
            edge,
            material,
            sections: ends("sections", sections, rules.allows_distinct_ends, bar_type)?,
            eccentricities,
            connectivities,
            complex_section_id: rules.has_complex_section.then(EntityId::new),
            section_pos: [0.0, 1.0],
            made: None,
            ecc_calc: true,
        })
    }

    pub(crate) fn restore(record: BarPartRecord) -> StruxResult<Self> {
        let BarPartRecord {
            meta,
            name,
            bar_type,
            edge,
            local_y,
            material,
            sections,
            eccentricities,
            connectivities,
            complex_section_id,
            made,
            ecc_calc,
        } = record;

        bar_type.check_edge(&edge)?;
        let mut coordinate_system = edge.coordinate_system()?;
        coordinate_system.set_y_around_x(local_y)?;
        let rules = bar_type.rules();
        if !rules.allows_distinct_ends && (sections[0] != sections[1] || eccentricities[0] != eccentricities[1]) {
            return Err(StruxError::invalid_input(
                "sections",
                "2 values",
                format!("a {} can only have 1 section", bar_type),
            ));
        }
        bar_type.check_end_conditions(&eccentricities, &connectivities)?;
        let complex_section_id = if rules.has_complex_section {
            Some(complex_section_id.ok_or_else(|| StruxError::missing_attribute("complex_section", "bar_part"))?)
        } else {
            None
        };

        Ok(BarPart {
            meta,
            name,
            bar_type,
            edge,
            coordinate_system,
            material,
            sections,
            eccentricities,
            connectivities,
            complex_section_id,
            section_pos: [0.0, 1.0],
            made,
            ecc_calc,
        })
    }

    // ------------------------------------------------------------------------
    // Identity and type
    // ------------------------------------------------------------------------

    pub fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename to `{identifier}.1`
    pub fn set_identifier(&mut self, identifier: &str) {
        self.name = format!("{}.1", identifier);
    }

    pub fn bar_type(&self) -> BarType {
        self.bar_type
    }

    pub fn material(&self) -> EntityId {
        self.material
    }

    pub fn set_material(&mut self, material: EntityId) {
        self.material = material;
    }

    pub fn made(&self) -> Option<SteelMade> {
        self.made
    }

    pub fn set_made(&mut self, made: Option<SteelMade>) {
        self.made = made;
    }

    pub fn ecc_calc(&self) -> bool {
        self.ecc_calc
    }

    pub fn set_ecc_calc(&mut self, ecc_calc: bool) {
        self.ecc_calc = ecc_calc;
    }

    // ------------------------------------------------------------------------
    // Geometry
    // ------------------------------------------------------------------------

    pub fn edge(&self) -> &Edge {
        &self.edge
    }

    /// Replace the edge and re-derive the local frame from it
    pub fn set_edge(&mut self, edge: Edge) -> StruxResult<()> {
        self.bar_type.check_edge(&edge)?;
        self.coordinate_system = edge.coordinate_system()?;
        self.edge = edge;
        Ok(())
    }

    pub fn coordinate_system(&self) -> &CoordinateSystem {
        &self.coordinate_system
    }

    pub fn local_origin(&self) -> Point3 {
        self.coordinate_system.origin()
    }

    pub fn local_x(&self) -> Vector3 {
        self.coordinate_system.local_x()
    }

    pub fn local_y(&self) -> Vector3 {
        self.coordinate_system.local_y()
    }

    pub fn local_z(&self) -> Vector3 {
        self.coordinate_system.local_z()
    }

    /// Rotate the frame around local x so local y follows `direction`
    pub fn set_local_y(&mut self, direction: Vector3) -> StruxResult<()> {
        self.coordinate_system.set_y_around_x(direction)
    }

    /// Re-orient the local frame to the global one, edge-style
    pub fn orient_coordinate_system_to_gcs(&mut self) -> StruxResult<()> {
        let mut cs = self.coordinate_system;
        cs.orient_edge_to_gcs()?;
        debug!(bar_part = %self.name, "oriented bar frame to global coordinate system");
        self.coordinate_system = cs;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // End definitions
    // ------------------------------------------------------------------------

    pub fn sections(&self) -> [EntityId; 2] {
        self.sections
    }

    pub fn start_section(&self) -> EntityId {
        self.sections[0]
    }

    pub fn end_section(&self) -> EntityId {
        self.sections[1]
    }

    /// One section for both ends, or start and end sections
    pub fn set_sections(&mut self, sections: &[EntityId]) -> StruxResult<()> {
        self.sections = ends("sections", sections, self.bar_type.rules().allows_distinct_ends, self.bar_type)?;
        Ok(())
    }

    pub fn eccentricities(&self) -> [Eccentricity; 2] {
        self.eccentricities
    }

    pub fn set_eccentricities(&mut self, eccentricities: &[Eccentricity]) -> StruxResult<()> {
        let eccentricities = ends(
            "eccentricities",
            eccentricities,
            self.bar_type.rules().allows_distinct_ends,
            self.bar_type,
        )?;
        self.bar_type.check_end_conditions(&eccentricities, &self.connectivities)?;
        self.eccentricities = eccentricities;
        Ok(())
    }

    pub fn connectivities(&self) -> [Connectivity; 2] {
        self.connectivities
    }

    pub fn set_connectivities(&mut self, connectivities: &[Connectivity]) -> StruxResult<()> {
        let connectivities = ends("connectivities", connectivities, true, self.bar_type)?;
        self.bar_type.check_end_conditions(&self.eccentricities, &connectivities)?;
        self.connectivities = connectivities;
        Ok(())
    }

    /// The section shared by both ends
    pub fn uniform_section(&self) -> StruxResult<EntityId> {
        if self.sections[0] == self.sections[1] {
            Ok(self.sections[0])
        } else {
            Err(StruxError::NonUniformSection { bar: self.name.clone() })
        }
    }

    pub fn section_pos(&self) -> [f64; 2] {
        self.section_pos
    }

    /// Parametric positions of the end sections; must be `[0, 1]`-anchored
    pub fn set_section_pos(&mut self, pos: &[f64]) -> StruxResult<()> {
        match pos {
            [first, last] => {
                if *first != 0.0 {
                    return Err(StruxError::invalid_input("section_pos", first.to_string(), "first item must be 0"));
                }
                if *last != 1.0 {
                    return Err(StruxError::invalid_input("section_pos", last.to_string(), "last item must be 1"));
                }
                self.section_pos = [*first, *last];
                Ok(())
            }
            _ => Err(StruxError::arity("section_pos", pos.len(), "2 (one per section)")),
        }
    }

    // ------------------------------------------------------------------------
    // Derived state
    // ------------------------------------------------------------------------

    /// Identity of the composite section; `None` for trusses
    pub fn complex_section_id(&self) -> Option<EntityId> {
        self.complex_section_id
    }

    /// Composite section built from the current ends; `None` for trusses
    pub fn complex_section(&self) -> Option<ComplexSection> {
        self.complex_section_id
            .map(|id| ComplexSection::from_ends(id, self.section_pos, self.sections, self.eccentricities))
    }

    /// Eccentricity model built from the current ends; `None` for trusses
    pub fn model_eccentricity(&self) -> Option<ModelEccentricity> {
        self.bar_type
            .rules()
            .has_complex_section
            .then(|| ModelEccentricity::from_ends(self.eccentricities))
    }

    /// Value of the `complex_section` reference: the composite section, or the
    /// section itself for a truss
    pub fn complex_section_ref(&self) -> EntityId {
        self.complex_section_id.unwrap_or(self.sections[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    fn beam_edge() -> Edge {
        Edge::line(Point3::ORIGIN, Point3::new(6.0, 0.0, 0.0)).unwrap()
    }

    fn beam(sections: &[EntityId]) -> BarPart {
        BarPart::new(
            "B.1",
            BarType::Beam,
            beam_edge(),
            EntityId::new(),
            sections,
            &[Eccentricity::default()],
            &[Connectivity::rigid()],
        )
        .unwrap()
    }

    #[test]
    fn test_identifier_suffix() {
        let part = beam(&[EntityId::new()]);
        assert_eq!(part.name(), "B.1.1");
    }

    #[test]
    fn test_single_section_broadcasts() {
        let s = EntityId::new();
        let part = beam(&[s]);
        assert_eq!(part.start_section(), part.end_section());
        assert_eq!(part.uniform_section().unwrap(), s);
    }

    #[test]
    fn test_distinct_sections_are_not_uniform() {
        let part = beam(&[EntityId::new(), EntityId::new()]);
        let err = part.uniform_section().unwrap_err();
        assert_eq!(err.error_code(), "NON_UNIFORM_SECTION");
    }

    #[test]
    fn test_section_arity() {
        let mut part = beam(&[EntityId::new()]);
        let err = part.set_sections(&[]).unwrap_err();
        assert_eq!(err, StruxError::arity("sections", 0, "1 or 2"));
        let three = [EntityId::new(), EntityId::new(), EntityId::new()];
        assert_eq!(part.set_sections(&three).unwrap_err().error_code(), "ARITY");
        assert_eq!(part.set_connectivities(&[]).unwrap_err().error_code(), "ARITY");
    }

    #[test]
    fn test_truss_rejects_two_sections() {
        let s = EntityId::new();
        let mut truss = BarPart::new(
            "T.1",
            BarType::Truss,
            beam_edge(),
            EntityId::new(),
            &[s],
            &[Eccentricity::default()],
            &[Connectivity::rigid()],
        )
        .unwrap();
        let err = truss.set_sections(&[s, EntityId::new()]).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
        assert!(truss
            .set_eccentricities(&[Eccentricity::default(), Eccentricity::default()])
            .is_err());

        assert!(truss.complex_section().is_none());
        assert!(truss.model_eccentricity().is_none());
        assert_eq!(truss.complex_section_ref(), s);
    }

    #[test]
    fn test_truss_ends_stay_centric_and_rigid() {
        let mut truss = BarPart::new(
            "T.1",
            BarType::Truss,
            beam_edge(),
            EntityId::new(),
            &[EntityId::new()],
            &[Eccentricity::default()],
            &[Connectivity::rigid()],
        )
        .unwrap();
        let before = truss.clone();

        let offset = Eccentricity::new(0.05, 0.1).unwrap();
        let err = truss.set_eccentricities(&[offset]).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
        let err = truss.set_connectivities(&[Connectivity::hinged()]).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
        assert_eq!(truss, before);

        truss.set_connectivities(&[Connectivity::rigid()]).unwrap();
        truss.set_eccentricities(&[Eccentricity::default()]).unwrap();

        let hinged = BarPart::new(
            "T.2",
            BarType::Truss,
            beam_edge(),
            EntityId::new(),
            &[EntityId::new()],
            &[Eccentricity::default()],
            &[Connectivity::hinged()],
        );
        assert!(hinged.is_err());
    }

    #[test]
    fn test_column_requires_vertical_line() {
        let err = BarPart::new(
            "C.1",
            BarType::Column,
            beam_edge(),
            EntityId::new(),
            &[EntityId::new()],
            &[Eccentricity::default()],
            &[Connectivity::rigid()],
        )
        .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_GEOMETRY");

        let vertical = Edge::line(Point3::ORIGIN, Point3::new(0.0, 0.0, 3.0)).unwrap();
        assert!(BarType::Column.check_edge(&vertical).is_ok());
    }

    #[test]
    fn test_truss_rejects_arc() {
        let arc = Edge::arc(Point3::ORIGIN, 2.0, 0.0, 1.0, Vector3::UNIT_Z, Vector3::UNIT_X).unwrap();
        assert!(BarType::Truss.check_edge(&arc).is_err());
        assert!(BarType::Beam.check_edge(&arc).is_ok());

        let column_err = BarType::Column.check_edge(&arc).unwrap_err();
        assert_eq!(column_err.error_code(), "INVALID_GEOMETRY");

        let mut part = beam(&[EntityId::new()]);
        part.set_edge(arc).unwrap();
        assert!(part.local_z().equals(&Vector3::UNIT_Z, EPS));
    }

    #[test]
    fn test_complex_section_tracks_current_ends() {
        let a = EntityId::new();
        let b = EntityId::new();
        let mut part = beam(&[a]);
        let id = part.complex_section_id().unwrap();
        assert_eq!(part.complex_section().unwrap().sections(), [a, a]);

        part.set_sections(&[a, b]).unwrap();
        let ecc = Eccentricity::new(0.0, 0.15).unwrap();
        part.set_eccentricities(&[Eccentricity::default(), ecc]).unwrap();

        let cs = part.complex_section().unwrap();
        assert_eq!(cs.id, id);
        assert_eq!(cs.sections(), [a, b]);
        assert_eq!(cs.eccentricities()[1], ecc);
        assert_eq!(part.complex_section_ref(), id);

        let model = part.model_eccentricity().unwrap();
        assert!(model.use_default_physical_alignment);
        assert_eq!(model.analytical, model.physical);
        assert_eq!(model.analytical[1], ecc);
    }

    #[test]
    fn test_set_local_y_keeps_local_x() {
        let mut part = beam(&[EntityId::new()]);
        let x = part.local_x();
        part.set_local_y(Vector3::new(0.0, 0.0, 5.0)).unwrap();
        assert_eq!(part.local_x(), x);
        assert!(part.local_y().equals(&Vector3::UNIT_Z, EPS));
        assert!(part.local_z().equals(&part.local_x().cross(&part.local_y()), EPS));

        let err = part.set_local_y(Vector3::new(1.0, 1.0, 0.0)).unwrap_err();
        assert_eq!(err.error_code(), "ORTHOGONALITY");
        assert!(part.local_y().equals(&Vector3::UNIT_Z, EPS));
    }

    #[test]
    fn test_orient_to_gcs_restores_edge_frame() {
        let mut part = beam(&[EntityId::new()]);
        let original = *part.coordinate_system();
        part.set_local_y(Vector3::new(0.0, 0.0, -1.0)).unwrap();
        part.orient_coordinate_system_to_gcs().unwrap();
        assert!(part.local_y().equals(&original.local_y(), EPS));
    }

    #[test]
    fn test_section_pos_validation() {
        let mut part = beam(&[EntityId::new()]);
        assert_eq!(part.section_pos(), [0.0, 1.0]);
        assert!(part.set_section_pos(&[0.0, 1.0]).is_ok());
        assert!(part.set_section_pos(&[0.1, 1.0]).is_err());
        assert!(part.set_section_pos(&[0.0, 0.9]).is_err());
        assert_eq!(part.set_section_pos(&[0.0, 0.5, 1.0]).unwrap_err().error_code(), "ARITY");
    }
}
