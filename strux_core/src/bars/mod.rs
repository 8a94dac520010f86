//! # Bars
//!
//! Beams, columns and trusses. A [`Bar`] is the named structural element; its
//! analytical data lives in a single [`BarPart`].
//!
//! ## Type rules
//!
//! | type   | edge                | distinct ends | composite section |
//! |--------|---------------------|---------------|-------------------|
//! | beam   | line or arc         | yes           | yes               |
//! | column | vertical line       | yes           | yes               |
//! | truss  | line                | no            | no                |
//!
//! Rules are checked when a value is assigned, not when the model is written.
//!
//! ## Example
//!
//! ```rust
//! use strux_core::bars::{Bar, Eccentricity};
//! use strux_core::entity::{EntityId, NamingSequence};
//! use strux_core::geometry::{Edge, Point3};
//! use strux_core::releases::Connectivity;
//!
//! let mut names = NamingSequence::new();
//! let edge = Edge::line(Point3::ORIGIN, Point3::new(0.0, 0.0, 3.0))?;
//! let section = EntityId::new();
//!
//! let column = Bar::column(
//!     &mut names,
//!     edge,
//!     EntityId::new(),
//!     &[section],
//!     &[Eccentricity::default()],
//!     &[Connectivity::rigid()],
//! )?;
//!
//! assert_eq!(column.name(), "C.1");
//! assert_eq!(column.part().name(), "C.1.1");
//! assert_eq!(column.part().uniform_section()?, section);
//! # Ok::<(), strux_core::errors::StruxError>(())
//! ```

mod bar_part;
mod eccentricity;

pub use bar_part::{BarPart, BarRules};
pub(crate) use bar_part::BarPartRecord;
pub use eccentricity::{Eccentricity, ModelEccentricity};

use serde::{Deserialize, Serialize};

use crate::entity::{EntityId, EntityMeta, NamingSequence};
use crate::errors::StruxResult;
use crate::geometry::Edge;
use crate::releases::Connectivity;
use crate::restricted::BarType;

/// A named bar element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub(crate) meta: EntityMeta,
    name: String,
    part: BarPart,
}

impl Bar {
    /// Default name prefix of a bar type
    pub fn prefix(bar_type: BarType) -> &'static str {
        match bar_type {
            BarType::Beam => "B",
            BarType::Column => "C",
            BarType::Truss => "T",
        }
    }

    /// Create a bar with the next default name for its type
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        names: &mut NamingSequence,
        bar_type: BarType,
        edge: Edge,
        material: EntityId,
        sections: &[EntityId],
        eccentricities: &[Eccentricity],
        connectivities: &[Connectivity],
    ) -> StruxResult<Self> {
        let name = names.next_name(Bar::prefix(bar_type));
        let part = BarPart::new(&name, bar_type, edge, material, sections, eccentricities, connectivities)?;
        Ok(Bar {
            meta: EntityMeta::created(),
            name,
            part,
        })
    }

    pub fn beam(
        names: &mut NamingSequence,
        edge: Edge,
        material: EntityId,
        sections: &[EntityId],
        eccentricities: &[Eccentricity],
        connectivities: &[Connectivity],
    ) -> StruxResult<Self> {
        Bar::new(names, BarType::Beam, edge, material, sections, eccentricities, connectivities)
    }

    pub fn column(
        names: &mut NamingSequence,
        edge: Edge,
        material: EntityId,
        sections: &[EntityId],
        eccentricities: &[Eccentricity],
        connectivities: &[Connectivity],
    ) -> StruxResult<Self> {
        Bar::new(names, BarType::Column, edge, material, sections, eccentricities, connectivities)
    }

    /// Truss member: one section, centric, rigid ends
    pub fn truss(names: &mut NamingSequence, edge: Edge, material: EntityId, section: EntityId) -> StruxResult<Self> {
        Bar::new(
            names,
            BarType::Truss,
            edge,
            material,
            &[section],
            &[Eccentricity::default()],
            &[Connectivity::rigid()],
        )
    }

    pub(crate) fn restore(meta: EntityMeta, name: String, part: BarPart) -> Self {
        Bar { meta, name, part }
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

    /// Rename the bar and its part
    pub fn set_identifier(&mut self, identifier: impl Into<String>) {
        self.name = identifier.into();
        self.part.set_identifier(&self.name);
    }

    /// Type of the part, which carries the type rules
    pub fn bar_type(&self) -> BarType {
        self.part.bar_type()
    }

    pub fn part(&self) -> &BarPart {
        &self.part
    }

    /// Mutable access to the part; its setters enforce the type rules
    pub fn part_mut(&mut self) -> &mut BarPart {
        &mut self.part
    }
}
