//! # Sections
//!
//! Cross-section definitions and the composite section of a bar.
//!
//! A [`ComplexSection`] is never stored. It is a pure function of a bar's two
//! end definitions, rebuilt whenever it is read; only its identity is kept on
//! the bar part.

use serde::{Deserialize, Serialize};

use crate::bars::Eccentricity;
use crate::entity::{EntityId, EntityMeta};
use crate::errors::StruxResult;
use crate::restricted::{MaterialFamily, NonNegMax1e5};

/// Cross-section with the constants the interchange format carries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub(crate) meta: EntityMeta,
    pub name: String,
    /// Material family the section belongs to
    pub family: MaterialFamily,
    /// Area [m²]
    pub area: NonNegMax1e5,
    /// Second moment of area about local y [m⁴]
    pub iy: NonNegMax1e5,
    /// Second moment of area about local z [m⁴]
    pub iz: NonNegMax1e5,
}

impl Section {
    pub fn new(name: impl Into<String>, family: MaterialFamily, area: f64, iy: f64, iz: f64) -> StruxResult<Self> {
        Ok(Section {
            meta: EntityMeta::created(),
            name: name.into(),
            family,
            area: NonNegMax1e5::new(area)?,
            iy: NonNegMax1e5::new(iy)?,
            iz: NonNegMax1e5::new(iz)?,
        })
    }

    /// Solid rectangle `b` wide and `h` deep [m]
    pub fn rectangle(name: impl Into<String>, family: MaterialFamily, b: f64, h: f64) -> StruxResult<Self> {
        Section::new(name, family, b * h, b * h.powi(3) / 12.0, h * b.powi(3) / 12.0)
    }

    pub fn id(&self) -> EntityId {
        self.meta.id
    }

    /// Identity and change stamp; read-only outside the crate
    pub fn meta(&self) -> &EntityMeta {
        &self.meta
    }
}

/// One end definition of a composite section
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComplexSectionEntry {
    /// Parametric position along the bar, 0..1
    pub pos: f64,
    pub section: EntityId,
    pub eccentricity: Eccentricity,
}

/// Per-end sections and eccentricities of a bar, in interchange form
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComplexSection {
    pub id: EntityId,
    pub entries: [ComplexSectionEntry; 2],
}

impl ComplexSection {
    /// Build from the two ends of a bar
    pub fn from_ends(
        id: EntityId,
        section_pos: [f64; 2],
        sections: [EntityId; 2],
        eccentricities: [Eccentricity; 2],
    ) -> Self {
        let entry = |i: usize| ComplexSectionEntry {
            pos: section_pos[i],
            section: sections[i],
            eccentricity: eccentricities[i],
        };
        ComplexSection {
            id,
            entries: [entry(0), entry(1)],
        }
    }

    pub fn sections(&self) -> [EntityId; 2] {
        [self.entries[0].section, self.entries[1].section]
    }

    pub fn eccentricities(&self) -> [Eccentricity; 2] {
        [self.entries[0].eccentricity, self.entries[1].eccentricity]
    }
}
