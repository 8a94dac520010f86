//! # strux_core - Structural Model Interchange Engine
//!
//! `strux_core` builds structural models (bars, slabs, panels, covers, loads,
//! sections and materials) as a graph of entities that reference each other
//! by identity. It writes them to the strictly ordered `.struxml` interchange
//! format and drives an external analysis engine with job scripts.
//!
//! ## Design Philosophy
//!
//! - **Validated at construction**: restricted values and type rules are
//!   checked when an entity is built or changed, so a valid model always
//!   serializes to a valid document
//! - **Persistent updates**: setters return a changed copy with the same
//!   identity; derived data such as composite sections is recomputed on access
//! - **Flat store**: the [`model::Model`] keeps entities in per-kind arenas
//!   behind one identity index
//! - **Rich Errors**: structured error values, not strings
//!
//! ## Quick Start
//!
//! ```rust
//! use strux_core::bars::{Bar, Eccentricity};
//! use strux_core::config::DocumentSettings;
//! use strux_core::entity::NamingSequence;
//! use strux_core::geometry::{Edge, Point3};
//! use strux_core::materials::Material;
//! use strux_core::model::Model;
//! use strux_core::releases::Connectivity;
//! use strux_core::restricted::MaterialFamily;
//! use strux_core::sections::Section;
//! use strux_core::struxml::{read_model, write_model};
//!
//! let mut model = Model::new();
//! let steel = model.add_material(Material::steel_s355())?;
//! let section = model.add_section(Section::rectangle("R 200x400", MaterialFamily::Steel, 0.2, 0.4)?)?;
//!
//! let mut names = NamingSequence::new();
//! let edge = Edge::line(Point3::ORIGIN, Point3::new(6.0, 0.0, 0.0))?;
//! let beam = Bar::beam(&mut names, edge, steel, &[section], &[Eccentricity::default()], &[Connectivity::rigid()])?;
//! model.add_bar(beam)?;
//!
//! let xml = write_model(&model, &DocumentSettings::default())?;
//! let read = read_model(&xml)?;
//! assert_eq!(read.bars()[0].name(), "B.1");
//! # Ok::<(), strux_core::errors::StruxError>(())
//! ```
//!
//! ## Modules
//!
//! - [`geometry`] - vectors, coordinate systems, edges and regions
//! - [`tolerance`] - named comparison epsilons
//! - [`restricted`] - range-checked scalars and closed vocabularies
//! - [`entity`] - identities, change stamps and default naming
//! - [`bars`], [`shells`], [`cover`] - structural entities
//! - [`loads`] - load cases, combinations and loads
//! - [`sections`], [`materials`], [`releases`] - shared definitions
//! - [`model`] - the identity-indexed model store
//! - [`xml`], [`struxml`] - the ordered element tree and the document mapping
//! - [`calculate`] - job scripts and the external engine
//! - [`file_io`] - atomic saves and document locking
//! - [`config`] - engine and document settings
//! - [`errors`] - structured error types

pub mod bars;
pub mod config;
pub mod cover;
pub mod entity;
pub mod errors;
pub mod geometry;
pub mod loads;
pub mod materials;
pub mod model;
pub mod releases;
pub mod restricted;
pub mod sections;
pub mod shells;
pub mod struxml;
pub mod tolerance;
pub mod xml;

#[cfg(not(target_arch = "wasm32"))]
pub mod calculate;
#[cfg(not(target_arch = "wasm32"))]
pub mod file_io;

// Re-export commonly used types at crate root for convenience
pub use entity::{EntityId, NamingSequence};
pub use errors::{StruxError, StruxResult};
pub use model::Model;
pub use struxml::{read_model, write_model};

#[cfg(not(target_arch = "wasm32"))]
pub use file_io::{load_model, save_model, FileLock};
