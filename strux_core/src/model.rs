//! # Model Store
//!
//! The `Model` is the root container written to and read from `.struxml`
//! documents. Entities live in flat per-kind arenas in insertion order;
//! a single identity index maps every [`EntityId`] to its arena slot.
//!
//! ## Structure
//!
//! ```text
//! Model
//! ├── id: document identity
//! ├── bars, slabs, panels, covers        (structure)
//! ├── point_loads, temperature_loads     (loads)
//! ├── load_cases, load_combinations
//! ├── sections, materials                (shared, referenced by id)
//! └── index: HashMap<EntityId, (EntityKind, usize)>
//! ```
//!
//! Composite sections are not stored. They are derived from the bars that
//! own them whenever a document is written.
//!
//! ## Example
//!
//! ```rust
//! use strux_core::bars::Bar;
//! use strux_core::entity::NamingSequence;
//! use strux_core::geometry::{Edge, Point3};
//! use strux_core::materials::Material;
//! use strux_core::model::Model;
//! use strux_core::restricted::MaterialFamily;
//! use strux_core::sections::Section;
//!
//! let mut model = Model::new();
//! let steel = model.add_material(Material::steel_s355())?;
//! let hea = model.add_section(Section::rectangle("R 100x200", MaterialFamily::Steel, 0.1, 0.2)?)?;
//!
//! let mut names = NamingSequence::new();
//! let edge = Edge::line(Point3::ORIGIN, Point3::new(5.0, 0.0, 0.0))?;
//! model.add_bar(Bar::truss(&mut names, edge, steel, hea)?)?;
//!
//! model.validate_references()?;
//! assert_eq!(model.section(hea)?.name, "R 100x200");
//! # Ok::<(), strux_core::errors::StruxError>(())
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::bars::Bar;
use crate::cover::Cover;
use crate::entity::EntityId;
use crate::errors::{StruxError, StruxResult};
use crate::loads::{LoadCase, LoadCombination, PointLoad, SurfaceTemperatureLoad};
use crate::materials::Material;
use crate::sections::Section;
use crate::shells::{Panel, Slab};

/// Kind of entity an identity resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Bar,
    Slab,
    Panel,
    Cover,
    PointLoad,
    SurfaceTemperatureLoad,
    LoadCase,
    LoadCombination,
    Section,
    Material,
}

impl EntityKind {
    /// Lowercase label used in error messages
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Bar => "bar",
            EntityKind::Slab => "slab",
            EntityKind::Panel => "panel",
            EntityKind::Cover => "cover",
            EntityKind::PointLoad => "point load",
            EntityKind::SurfaceTemperatureLoad => "surface temperature load",
            EntityKind::LoadCase => "load case",
            EntityKind::LoadCombination => "load combination",
            EntityKind::Section => "section",
            EntityKind::Material => "material",
        }
    }

    /// Whether a cover may rest on an entity of this kind
    pub fn is_structural(&self) -> bool {
        matches!(self, EntityKind::Bar | EntityKind::Slab | EntityKind::Panel)
    }
}

/// Flat identity-keyed store of a structural model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    /// Identity of the document
    pub id: EntityId,
    bars: Vec<Bar>,
    slabs: Vec<Slab>,
    panels: Vec<Panel>,
    covers: Vec<Cover>,
    point_loads: Vec<PointLoad>,
    temperature_loads: Vec<SurfaceTemperatureLoad>,
    load_cases: Vec<LoadCase>,
    load_combinations: Vec<LoadCombination>,
    sections: Vec<Section>,
    materials: Vec<Material>,
    #[serde(skip)]
    index: HashMap<EntityId, (EntityKind, usize)>,
}

impl Default for Model {
    fn default() -> Self {
        Model::new()
    }
}

/// Generates `add_*`, slice and by-id accessors for one arena
macro_rules! arena {
    ($kind:ident, $field:ident, $ty:ty, $add:ident, $get:ident) => {
        #[doc = concat!("Insert a ", stringify!($ty), "; fails if its identity is already in the model")]
        pub fn $add(&mut self, entity: $ty) -> StruxResult<EntityId> {
            let id = entity.meta.id;
            self.claim(id, EntityKind::$kind, self.$field.len())?;
            self.$field.push(entity);
            Ok(id)
        }

        pub fn $field(&self) -> &[$ty] {
            &self.$field
        }

        pub fn $get(&self, id: EntityId) -> Option<&$ty> {
            match self.index.get(&id) {
                Some((EntityKind::$kind, slot)) => self.$field.get(*slot),
                _ => None,
            }
        }
    };
}

impl Model {
    pub fn new() -> Self {
        Model {
            id: EntityId::new(),
            bars: Vec::new(),
            slabs: Vec::new(),
            panels: Vec::new(),
            covers: Vec::new(),
            point_loads: Vec::new(),
            temperature_loads: Vec::new(),
            load_cases: Vec::new(),
            load_combinations: Vec::new(),
            sections: Vec::new(),
            materials: Vec::new(),
            index: HashMap::new(),
        }
    }

    fn claim(&mut self, id: EntityId, kind: EntityKind, slot: usize) -> StruxResult<()> {
        if let Some((existing, _)) = self.index.get(&id) {
            return Err(StruxError::invalid_input(
                "guid",
                id.to_string(),
                format!("identity is already used by a {}", existing.label()),
            ));
        }
        self.index.insert(id, (kind, slot));
        Ok(())
    }

    arena!(Bar, bars, Bar, add_bar, bar);
    arena!(Slab, slabs, Slab, add_slab, slab);
    arena!(Panel, panels, Panel, add_panel, panel);
    arena!(Cover, covers, Cover, add_cover, cover);
    arena!(PointLoad, point_loads, PointLoad, add_point_load, point_load);
    arena!(
        SurfaceTemperatureLoad,
        temperature_loads,
        SurfaceTemperatureLoad,
        add_temperature_load,
        temperature_load
    );
    arena!(LoadCase, load_cases, LoadCase, add_load_case, find_load_case);
    arena!(
        LoadCombination,
        load_combinations,
        LoadCombination,
        add_load_combination,
        load_combination
    );
    arena!(Section, sections, Section, add_section, find_section);
    arena!(Material, materials, Material, add_material, find_material);

    /// Kind of the entity with this identity
    pub fn kind_of(&self, id: EntityId) -> Option<EntityKind> {
        self.index.get(&id).map(|(kind, _)| *kind)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.index.contains_key(&id)
    }

    /// Number of stored entities of all kinds
    pub fn entity_count(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    // ========================================================================
    // Reference resolution
    // ========================================================================

    pub fn section(&self, id: EntityId) -> StruxResult<&Section> {
        self.find_section(id)
            .ok_or_else(|| StruxError::dangling(EntityKind::Section.label(), id))
    }

    pub fn material(&self, id: EntityId) -> StruxResult<&Material> {
        self.find_material(id)
            .ok_or_else(|| StruxError::dangling(EntityKind::Material.label(), id))
    }

    pub fn load_case(&self, id: EntityId) -> StruxResult<&LoadCase> {
        self.find_load_case(id)
            .ok_or_else(|| StruxError::dangling(EntityKind::LoadCase.label(), id))
    }

    /// Replace a stored slab with an updated copy of the same identity.
    ///
    /// Returns the previous version.
    pub fn replace_slab(&mut self, slab: Slab) -> StruxResult<Slab> {
        match self.index.get(&slab.id()) {
            Some((EntityKind::Slab, slot)) => {
                let stored = self.slabs.get_mut(*slot).ok_or_else(|| StruxError::Internal {
                    message: format!("index points past the slab arena for {}", slab.id()),
                })?;
                Ok(std::mem::replace(stored, slab))
            }
            _ => Err(StruxError::dangling(EntityKind::Slab.label(), slab.id())),
        }
    }

    /// Replace a stored panel with an updated copy of the same identity
    pub fn replace_panel(&mut self, panel: Panel) -> StruxResult<Panel> {
        match self.index.get(&panel.id()) {
            Some((EntityKind::Panel, slot)) => {
                let stored = self.panels.get_mut(*slot).ok_or_else(|| StruxError::Internal {
                    message: format!("index points past the panel arena for {}", panel.id()),
                })?;
                Ok(std::mem::replace(stored, panel))
            }
            _ => Err(StruxError::dangling(EntityKind::Panel.label(), panel.id())),
        }
    }

    /// Replace a stored bar with an updated copy of the same identity
    pub fn replace_bar(&mut self, bar: Bar) -> StruxResult<Bar> {
        match self.index.get(&bar.id()) {
            Some((EntityKind::Bar, slot)) => {
                let stored = self.bars.get_mut(*slot).ok_or_else(|| StruxError::Internal {
                    message: format!("index points past the bar arena for {}", bar.id()),
                })?;
                Ok(std::mem::replace(stored, bar))
            }
            _ => Err(StruxError::dangling(EntityKind::Bar.label(), bar.id())),
        }
    }

    /// Change a stored bar through its setters.
    ///
    /// `update` works on a copy, which is stored only if it succeeds and the
    /// copy still has identity `id`; on any error the stored bar is untouched.
    pub fn update_bar<T>(&mut self, id: EntityId, update: impl FnOnce(&mut Bar) -> StruxResult<T>) -> StruxResult<T> {
        let mut bar = self
            .bar(id)
            .cloned()
            .ok_or_else(|| StruxError::dangling(EntityKind::Bar.label(), id))?;
        let out = update(&mut bar)?;
        if bar.id() != id {
            return Err(StruxError::invalid_input(
                "guid",
                bar.id().to_string(),
                format!("an update of bar {} cannot change its identity", id),
            ));
        }
        self.replace_bar(bar)?;
        Ok(out)
    }

    /// Check that every reference held by an entity resolves to an entity of
    /// the right kind. Stops at the first dangling reference.
    pub fn validate_references(&self) -> StruxResult<()> {
        for bar in &self.bars {
            let part = bar.part();
            self.material(part.material())?;
            for section in part.sections() {
                self.section(section)?;
            }
        }
        for slab in &self.slabs {
            self.material(slab.part().material)?;
        }
        for panel in &self.panels {
            self.material(panel.material())?;
            self.section(panel.section())?;
        }
        for cover in &self.covers {
            for id in &cover.supporting_structures {
                match self.kind_of(*id) {
                    Some(kind) if kind.is_structural() => {}
                    Some(kind) => {
                        warn!(cover = %cover.name, %id, kind = kind.label(), "cover rests on a non-structural entity");
                        return Err(StruxError::dangling("supporting structure", id));
                    }
                    None => return Err(StruxError::dangling("supporting structure", id)),
                }
            }
        }
        for load in &self.point_loads {
            self.load_case(load.load_case)?;
        }
        for load in &self.temperature_loads {
            self.load_case(load.load_case)?;
        }
        for combination in &self.load_combinations {
            for (id, _) in &combination.cases {
                self.load_case(*id)?;
            }
        }
        Ok(())
    }

    /// Rebuild the identity index, e.g. after deserializing with serde
    pub fn reindex(&mut self) -> StruxResult<()> {
        let mut model = Model {
            id: self.id,
            ..Model::new()
        };
        for e in self.bars.drain(..) {
            model.add_bar(e)?;
        }
        for e in self.slabs.drain(..) {
            model.add_slab(e)?;
        }
        for e in self.panels.drain(..) {
            model.add_panel(e)?;
        }
        for e in self.covers.drain(..) {
            model.add_cover(e)?;
        }
        for e in self.point_loads.drain(..) {
            model.add_point_load(e)?;
        }
        for e in self.temperature_loads.drain(..) {
            model.add_temperature_load(e)?;
        }
        for e in self.load_cases.drain(..) {
            model.add_load_case(e)?;
        }
        for e in self.load_combinations.drain(..) {
            model.add_load_combination(e)?;
        }
        for e in self.sections.drain(..) {
            model.add_section(e)?;
        }
        for e in self.materials.drain(..) {
            model.add_material(e)?;
        }
        *self = model;
        Ok(())
    }
}
