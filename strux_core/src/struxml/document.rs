//! Whole-document writing and reading.

use std::collections::HashMap;

use chrono::{SecondsFormat, Utc};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::bars::read_bar;
use super::{FromXml, ToXml};
use crate::config::DocumentSettings;
use crate::cover::Cover;
use crate::entity::EntityId;
use crate::errors::{StruxError, StruxResult};
use crate::loads::{LoadCase, LoadCombination, PointLoad, SurfaceTemperatureLoad};
use crate::materials::Material;
use crate::model::Model;
use crate::sections::{ComplexSection, Section};
use crate::shells::{Panel, Slab};
use crate::xml::{schema, XmlElement};

/// Interchange format version written to and accepted from documents
pub const STRUXML_VERSION: &str = "01.00.000";

/// Check that a document version can be read.
///
/// The major version must match and the minor version may not be newer
/// than [`STRUXML_VERSION`].
pub fn validate_version(file_version: &str) -> StruxResult<()> {
    let parse = |v: &str| -> Vec<u32> { v.split('.').filter_map(|p| p.trim().parse().ok()).collect() };
    let file_parts = parse(file_version);
    let current_parts = parse(STRUXML_VERSION);

    let mismatch = || StruxError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: STRUXML_VERSION.to_string(),
    };

    match (file_parts.as_slice(), current_parts.as_slice()) {
        ([file_major, rest @ ..], [major, current_rest @ ..]) if file_major == major => {
            match (rest.first(), current_rest.first()) {
                (Some(file_minor), Some(minor)) if file_minor > minor => Err(mismatch()),
                _ => Ok(()),
            }
        }
        _ => Err(mismatch()),
    }
}

fn collect<T: ToXml>(name: &str, items: &[T], into: &mut Vec<XmlElement>) -> StruxResult<()> {
    for item in items {
        into.push(item.to_xml()?);
    }
    debug!(element = name, count = items.len(), "wrote entities");
    Ok(())
}

/// Composite sections of every non-truss bar, first occurrence kept
fn complex_sections(model: &Model) -> Vec<ComplexSection> {
    let mut seen = Vec::new();
    model
        .bars()
        .iter()
        .filter_map(|bar| bar.part().complex_section())
        .filter(|cs| {
            if seen.contains(&cs.id) {
                false
            } else {
                seen.push(cs.id);
                true
            }
        })
        .collect()
}

/// Serialize a model to a `.struxml` document.
///
/// Children of every element are written in schema order regardless of the
/// order entities were added in.
///
/// # Example
///
/// ```rust
/// use strux_core::config::DocumentSettings;
/// use strux_core::model::Model;
/// use strux_core::struxml::{read_model, write_model};
///
/// let model = Model::new();
/// let xml = write_model(&model, &DocumentSettings::default())?;
/// assert!(xml.contains("struxml_version"));
///
/// let read = read_model(&xml)?;
/// assert_eq!(read.id, model.id);
/// # Ok::<(), strux_core::errors::StruxError>(())
/// ```
#[instrument(skip_all, fields(model = %model.id))]
pub fn write_model(model: &Model, settings: &DocumentSettings) -> StruxResult<String> {
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    let attributes = vec![
        ("xmlns".to_string(), schema::NAMESPACE.to_string()),
        ("struxml_version".to_string(), STRUXML_VERSION.to_string()),
        ("source_software".to_string(), settings.source_software.clone()),
        ("start_time".to_string(), now.clone()),
        ("end_time".to_string(), now),
        ("guid".to_string(), model.id.to_string()),
        ("convertid".to_string(), Uuid::nil().to_string()),
        ("standard".to_string(), settings.standard.clone()),
        ("country".to_string(), settings.country.clone()),
    ];

    let mut entities = Vec::new();
    collect("bar", model.bars(), &mut entities)?;
    collect("slab", model.slabs(), &mut entities)?;
    collect("panel", model.panels(), &mut entities)?;

    if !model.covers().is_empty() {
        let mut covers = Vec::new();
        collect("cover", model.covers(), &mut covers)?;
        entities.push(schema::element("advanced-fem", Vec::new(), covers)?);
    }

    let mut loads = Vec::new();
    collect("point_load", model.point_loads(), &mut loads)?;
    collect("surface_temperature_variation_load", model.temperature_loads(), &mut loads)?;
    collect("load_case", model.load_cases(), &mut loads)?;
    collect("load_combination", model.load_combinations(), &mut loads)?;
    if !loads.is_empty() {
        entities.push(schema::element("loads", Vec::new(), loads)?);
    }

    let mut sections = Vec::new();
    collect("section", model.sections(), &mut sections)?;
    collect("complex_section", &complex_sections(model), &mut sections)?;

    let mut materials = Vec::new();
    collect("material", model.materials(), &mut materials)?;

    let root = schema::element(
        schema::ROOT,
        attributes,
        vec![
            schema::element("entities", Vec::new(), entities)?,
            schema::element("sections", Vec::new(), sections)?,
            schema::element("materials", Vec::new(), materials)?,
            XmlElement::new("end"),
        ],
    )?;

    let xml = root.to_xml_string()?;
    info!(entities = model.entity_count(), bytes = xml.len(), "wrote struxml document");
    Ok(xml)
}

fn read_all<T: FromXml>(parent: Option<&XmlElement>, name: &str) -> StruxResult<Vec<T>> {
    match parent {
        Some(parent) => parent.children_named(name).map(T::from_xml).collect(),
        None => Ok(Vec::new()),
    }
}

/// Parse a `.struxml` document into a model.
///
/// Library blocks are read first so that bars can recover their end
/// sections from the composite sections they reference. Line loads are
/// skipped.
///
/// # Errors
///
/// * `XmlParse` - malformed markup or a wrong root element
/// * `VersionMismatch` - the document is newer than this reader
/// * `SchemaOrder` - children out of order or not allowed
/// * `DanglingReference` - a bar references a missing composite section
#[instrument(skip_all)]
pub fn read_model(content: &str) -> StruxResult<Model> {
    let root = XmlElement::parse(content)?;
    if root.name != schema::ROOT {
        return Err(StruxError::xml(format!(
            "expected <{}> root element, found <{}>",
            schema::ROOT,
            root.name
        )));
    }
    validate_version(root.required_attr("struxml_version")?)?;
    schema::check_order(&root)?;

    let mut model = Model::new();
    if let Some(id) = root.parse_opt_attr::<EntityId>("guid")? {
        model.id = id;
    }

    let sections_block = root.child("sections");
    if let Some(block) = sections_block {
        schema::check_order(block)?;
    }
    let complex: HashMap<EntityId, ComplexSection> = read_all::<ComplexSection>(sections_block, "complex_section")?
        .into_iter()
        .map(|cs| (cs.id, cs))
        .collect();
    for section in read_all::<Section>(sections_block, "section")? {
        model.add_section(section)?;
    }

    let materials_block = root.child("materials");
    if let Some(block) = materials_block {
        schema::check_order(block)?;
    }
    for material in read_all::<Material>(materials_block, "material")? {
        model.add_material(material)?;
    }

    if let Some(entities) = root.child("entities") {
        schema::check_order(entities)?;
        for e in entities.children_named("bar") {
            model.add_bar(read_bar(e, &complex)?)?;
        }
        for slab in read_all::<Slab>(Some(entities), "slab")? {
            model.add_slab(slab)?;
        }
        for panel in read_all::<Panel>(Some(entities), "panel")? {
            model.add_panel(panel)?;
        }

        let fem = entities.child("advanced-fem");
        if let Some(fem) = fem {
            schema::check_order(fem)?;
        }
        for cover in read_all::<Cover>(fem, "cover")? {
            model.add_cover(cover)?;
        }

        let loads = entities.child("loads");
        if let Some(loads) = loads {
            schema::check_order(loads)?;
            let skipped = loads.children_named("line_load").count();
            if skipped > 0 {
                warn!(count = skipped, "skipping line loads");
            }
        }
        for case in read_all::<LoadCase>(loads, "load_case")? {
            model.add_load_case(case)?;
        }
        for combination in read_all::<LoadCombination>(loads, "load_combination")? {
            model.add_load_combination(combination)?;
        }
        for load in read_all::<PointLoad>(loads, "point_load")? {
            model.add_point_load(load)?;
        }
        for load in read_all::<SurfaceTemperatureLoad>(loads, "surface_temperature_variation_load")? {
            model.add_temperature_load(load)?;
        }
    }

    info!(entities = model.entity_count(), "read struxml document");
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_rules() {
        assert!(validate_version(STRUXML_VERSION).is_ok());
        assert!(validate_version("01.00.001").is_ok());
        assert!(validate_version("1.0").is_ok());
        assert_eq!(validate_version("01.01.000").unwrap_err().error_code(), "VERSION_MISMATCH");
        assert!(validate_version("02.00.000").is_err());
        assert!(validate_version("garbage").is_err());
    }

    #[test]
    fn test_empty_model_writes_required_blocks_only() {
        let xml = write_model(&Model::new(), &DocumentSettings::default()).unwrap();
        let root = XmlElement::parse(&xml).unwrap();
        let names: Vec<_> = root.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["entities", "sections", "materials", "end"]);
        assert_eq!(root.attr("convertid"), Some("00000000-0000-0000-0000-000000000000"));
        assert_eq!(root.attr("xmlns"), Some(schema::NAMESPACE));
    }

    #[test]
    fn test_wrong_root_is_rejected() {
        let err = read_model("<?xml version=\"1.0\"?><model/>").unwrap_err();
        assert_eq!(err.error_code(), "XML_PARSE");
    }

    #[test]
    fn test_out_of_order_blocks_are_rejected() {
        let xml = format!(
            "<database struxml_version=\"{}\"><materials/><entities/></database>",
            STRUXML_VERSION
        );
        assert_eq!(read_model(&xml).unwrap_err().error_code(), "SCHEMA_ORDER");
    }

    #[test]
    fn test_newer_document_is_rejected() {
        let xml = "<database struxml_version=\"01.05.000\"><entities/></database>";
        assert_eq!(read_model(xml).unwrap_err().error_code(), "VERSION_MISMATCH");
    }
}
