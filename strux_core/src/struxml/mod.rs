//! # StruXML Serializer
//!
//! Maps the entity model to the `.struxml` interchange format and back.
//!
//! ## Document layout
//!
//! ```text
//! database (struxml_version, guid, standard, country, ...)
//! ├── entities
//! │   ├── bar*  ─ bar_part ─ curve, local-y, connectivity×2, eccentricity
//! │   ├── slab* ─ slab_part ─ region, thickness+, local_x, local_y
//! │   ├── panel*
//! │   ├── advanced-fem ─ cover*
//! │   └── loads ─ point_load*, surface_temperature_variation_load*,
//! │               load_case*, load_combination*
//! ├── sections ─ section*, complex_section*
//! ├── materials ─ material*
//! └── end
//! ```
//!
//! Every element is built through [`crate::xml::schema::element`], so the
//! children always come out in the order the format requires. Reading
//! checks the same order and rejects documents that violate it.

mod bars;
mod document;
mod geometry;
mod library;
mod loads;
mod primitives;
mod shells;

pub use document::{read_model, validate_version, write_model, STRUXML_VERSION};

use crate::errors::StruxResult;
use crate::xml::XmlElement;

/// Conversion of an entity into its interchange element
pub trait ToXml {
    fn to_xml(&self) -> StruxResult<XmlElement>;
}

/// Reconstruction of an entity from its interchange element.
///
/// Entities whose reading depends on other parts of the document, such as
/// bars resolving their composite section, are read by the document reader
/// instead.
pub trait FromXml: Sized {
    fn from_xml(element: &XmlElement) -> StruxResult<Self>;
}
