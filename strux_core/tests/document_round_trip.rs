//! Whole-document write/read tests.

use std::f64::consts::PI;

use strux_core::bars::{Bar, Eccentricity};
use strux_core::config::DocumentSettings;
use strux_core::cover::Cover;
use strux_core::entity::{EntityId, NamingSequence};
use strux_core::geometry::{Edge, Point3, Region, Vector3};
use strux_core::loads::{LoadCase, LoadCombination, PointLoad, SurfaceTemperatureLoad};
use strux_core::materials::Material;
use strux_core::model::Model;
use strux_core::releases::{Connectivity, ShellEdgeConnection};
use strux_core::restricted::{LoadCombType, MaterialFamily, SlabType};
use strux_core::sections::Section;
use strux_core::shells::{LocationValue, Panel, ShellProperties, Slab};
use strux_core::struxml::{read_model, write_model};
use strux_core::xml::XmlElement;

fn rectangle(a: Vector3, b: Vector3) -> Region {
    Region::rectangle(Point3::ORIGIN, a, b).unwrap()
}

/// A small frame with every entity kind, loads added before structure
fn sample_model() -> Model {
    let mut model = Model::new();
    let mut names = NamingSequence::new();

    let dead = model.add_load_case(LoadCase::dead_load("DL")).unwrap();
    let steel = model.add_material(Material::steel_s355()).unwrap();
    let concrete = model.add_material(Material::concrete_c30_37()).unwrap();
    let hea = model
        .add_section(Section::rectangle("R 200x300", MaterialFamily::Steel, 0.2, 0.3).unwrap())
        .unwrap();
    let heb = model
        .add_section(Section::rectangle("R 200x500", MaterialFamily::Steel, 0.2, 0.5).unwrap())
        .unwrap();

    model
        .add_point_load(PointLoad::force(dead, Point3::new(3.0, 0.0, 0.0), Vector3::new(0.0, 0.0, -20.0), "").unwrap())
        .unwrap();

    let haunched = Bar::beam(
        &mut names,
        Edge::line(Point3::ORIGIN, Point3::new(6.0, 0.0, 0.0)).unwrap(),
        steel,
        &[hea, heb],
        &[Eccentricity::default(), Eccentricity::new(0.0, 0.1).unwrap()],
        &[Connectivity::rigid(), Connectivity::hinged()],
    )
    .unwrap();
    let beam_id = model.add_bar(haunched).unwrap();

    let curved = Bar::beam(
        &mut names,
        Edge::arc(Point3::ORIGIN, 4.0, 0.0, PI / 2.0, Vector3::UNIT_Z, Vector3::UNIT_X).unwrap(),
        steel,
        &[hea],
        &[Eccentricity::default()],
        &[Connectivity::rigid()],
    )
    .unwrap();
    model.add_bar(curved).unwrap();

    let column = Bar::column(
        &mut names,
        Edge::line(Point3::ORIGIN, Point3::new(0.0, 0.0, 3.0)).unwrap(),
        steel,
        &[heb],
        &[Eccentricity::default()],
        &[Connectivity::rigid()],
    )
    .unwrap();
    model.add_bar(column).unwrap();

    let truss = Bar::truss(
        &mut names,
        Edge::line(Point3::ORIGIN, Point3::new(3.0, 0.0, 4.0)).unwrap(),
        steel,
        hea,
    )
    .unwrap();
    model.add_bar(truss).unwrap();

    let floor = rectangle(Vector3::new(6.0, 0.0, 0.0), Vector3::new(0.0, 4.0, 0.0));
    let plate = Slab::plate(
        &mut names,
        floor.clone(),
        LocationValue::uniform(&floor, 0.25).unwrap(),
        concrete,
        ShellProperties::default(),
    )
    .unwrap()
    .set_shell_edge_connection(ShellEdgeConnection::hinged(), &[1, 3])
    .unwrap();
    let plate_id = model.add_slab(plate).unwrap();

    let wall_region = rectangle(Vector3::new(6.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 3.0));
    let wall = Slab::wall(
        &mut names,
        wall_region.clone(),
        LocationValue::uniform(&wall_region, 0.2).unwrap(),
        concrete,
        ShellProperties::default(),
    )
    .unwrap();
    model.add_slab(wall).unwrap();

    let panel = Panel::new(
        &mut names,
        SlabType::Wall,
        rectangle(Vector3::new(0.0, 6.0, 0.0), Vector3::new(0.0, 0.0, 3.0)),
        concrete,
        hea,
        0.2,
        ShellEdgeConnection::rigid(),
    )
    .unwrap();
    model.add_panel(panel).unwrap();

    let cover = Cover::one_way(&mut names, floor.clone(), &[beam_id, plate_id], Vector3::UNIT_Y).unwrap();
    model.add_cover(cover).unwrap();

    model
        .add_temperature_load(SurfaceTemperatureLoad::uniform(floor, 20.0, -10.0, dead, "summer").unwrap())
        .unwrap();

    let combination = LoadCombination::new("ULS", LoadCombType::UltimateOrdinary)
        .with_case(dead, 1.35)
        .unwrap();
    model.add_load_combination(combination).unwrap();

    model.validate_references().unwrap();
    model
}

/// Parsed document with the write timestamps removed
fn stable_tree(xml: &str) -> XmlElement {
    let mut root = XmlElement::parse(xml).unwrap();
    root.attributes.retain(|(k, _)| k != "start_time" && k != "end_time");
    root
}

fn child_names(e: &XmlElement) -> Vec<&str> {
    e.children.iter().map(|c| c.name.as_str()).collect()
}

#[test]
fn test_write_read_write_is_stable() {
    let model = sample_model();
    let settings = DocumentSettings::default();

    let first = write_model(&model, &settings).unwrap();
    let read = read_model(&first).unwrap();
    let second = write_model(&read, &settings).unwrap();

    assert_eq!(stable_tree(&first), stable_tree(&second));
}

#[test]
fn test_identities_and_references_survive() {
    let model = sample_model();
    let read = read_model(&write_model(&model, &DocumentSettings::default()).unwrap()).unwrap();

    assert_eq!(read.id, model.id);
    assert_eq!(read.entity_count(), model.entity_count());
    read.validate_references().unwrap();

    for (a, b) in model.bars().iter().zip(read.bars()) {
        assert_eq!(a.id(), b.id());
        assert_eq!(a.name(), b.name());
        assert_eq!(a.part().sections(), b.part().sections());
        assert_eq!(a.part().eccentricities(), b.part().eccentricities());
        assert_eq!(a.part().complex_section_id(), b.part().complex_section_id());
        assert_eq!(a.part().edge(), b.part().edge());
    }
    for (a, b) in model.slabs().iter().zip(read.slabs()) {
        assert_eq!(a.id(), b.id());
        assert_eq!(a.edge_connections(), b.edge_connections());
        assert_eq!(a.part().thickness, b.part().thickness);
    }
    assert_eq!(read.covers()[0].supporting_structures, model.covers()[0].supporting_structures);
    assert_eq!(read.load_combinations(), model.load_combinations());
    assert_eq!(read.materials(), model.materials());
    assert_eq!(read.sections(), model.sections());
}

#[test]
fn test_blocks_follow_schema_order() {
    let model = sample_model();
    let root = XmlElement::parse(&write_model(&model, &DocumentSettings::default()).unwrap()).unwrap();

    assert_eq!(child_names(&root), vec!["entities", "sections", "materials", "end"]);

    let entities = root.required_child("entities").unwrap();
    let names = child_names(entities);
    let first_slab = names.iter().position(|n| *n == "slab").unwrap();
    let last_bar = names.iter().rposition(|n| *n == "bar").unwrap();
    assert!(last_bar < first_slab);
    assert_eq!(names.last(), Some(&"loads"));

    let loads = entities.required_child("loads").unwrap();
    assert_eq!(
        child_names(loads),
        vec!["point_load", "surface_temperature_variation_load", "load_case", "load_combination"]
    );
}

#[test]
fn test_one_complex_section_per_non_truss_bar() {
    let model = sample_model();
    let root = XmlElement::parse(&write_model(&model, &DocumentSettings::default()).unwrap()).unwrap();
    let sections = root.required_child("sections").unwrap();

    assert_eq!(sections.children_named("section").count(), 2);
    assert_eq!(sections.children_named("complex_section").count(), 3);

    for bar in root.required_child("entities").unwrap().children_named("bar") {
        let part = bar.required_child("bar_part").unwrap();
        assert!(part.child("buckling_data").is_some());
        assert!(part.child("end").is_some());
    }
}

#[test]
fn test_bar_end_change_is_reflected_in_next_write() {
    let mut model = sample_model();
    let beam_id = model.bars()[0].id();
    let new_section = model
        .add_section(Section::rectangle("R 300x600", MaterialFamily::Steel, 0.3, 0.6).unwrap())
        .unwrap();
    model
        .update_bar(beam_id, |bar| bar.part_mut().set_sections(&[new_section]))
        .unwrap();

    let read = read_model(&write_model(&model, &DocumentSettings::default()).unwrap()).unwrap();
    let beam = read.bar(beam_id).unwrap();
    assert_eq!(beam.part().sections(), [new_section, new_section]);
    assert_eq!(beam.part().uniform_section().unwrap(), new_section);
}

#[test]
fn test_dangling_complex_section_is_reported() {
    let model = sample_model();
    let xml = write_model(&model, &DocumentSettings::default()).unwrap();
    let mut root = XmlElement::parse(&xml).unwrap();
    let sections = root.children.iter_mut().find(|c| c.name == "sections").unwrap();
    sections.children.retain(|c| c.name != "complex_section");

    let err = read_model(&root.to_xml_string().unwrap()).unwrap_err();
    assert_eq!(err.error_code(), "DANGLING_REFERENCE");
}

#[test]
fn test_line_loads_are_skipped() {
    let model = Model::new();
    let xml = write_model(&model, &DocumentSettings::default()).unwrap();
    let mut root = XmlElement::parse(&xml).unwrap();
    let entities = root.children.iter_mut().find(|c| c.name == "entities").unwrap();
    entities.children.push(
        XmlElement::new("loads")
            .with_child(XmlElement::new("line_load").with_attr("guid", EntityId::new()))
            .with_child(
                XmlElement::new("load_case")
                    .with_attr("guid", EntityId::new())
                    .with_attr("last_change", "2024-05-01T12:00:00Z")
                    .with_attr("name", "LL")
                    .with_attr("type", "static"),
            ),
    );

    let read = read_model(&root.to_xml_string().unwrap()).unwrap();
    assert_eq!(read.load_cases().len(), 1);
    assert_eq!(read.entity_count(), 1);
}

#[test]
fn test_stored_bar_keeps_its_identity() {
    let mut model = sample_model();
    let beam_id = model.bars()[0].id();
    let column = model.bars()[2].clone();

    let err = model
        .update_bar(beam_id, |bar| {
            *bar = column;
            Ok(())
        })
        .unwrap_err();
    assert_eq!(err.error_code(), "INVALID_INPUT");
    assert_eq!(model.bar(beam_id).unwrap().id(), beam_id);

    let read = read_model(&write_model(&model, &DocumentSettings::default()).unwrap()).unwrap();
    assert_eq!(read.entity_count(), model.entity_count());
}
