//! Edges, regions and shell edge connections.

use super::primitives::{point, read_point, read_vector, vector};
use crate::errors::{StruxError, StruxResult};
use crate::geometry::{CoordinateSystem, Contour, Edge, Region, Vector3};
use crate::releases::{Motions, Rigidity, Rotations, ShellEdgeConnection};
use crate::xml::{schema, XmlElement};

// ============================================================================
// Edges
// ============================================================================

/// Write an edge as `name` (`edge` in contours, `curve` in bar parts)
pub(crate) fn edge(name: &str, edge: &Edge) -> XmlElement {
    match *edge {
        Edge::Line { start, end } => XmlElement::new(name)
            .with_attr("type", "line")
            .with_child(point("point", start))
            .with_child(point("point", end)),
        Edge::Arc {
            center,
            radius,
            start_angle,
            end_angle,
            normal,
            x_axis,
        } => XmlElement::new(name)
            .with_attr("type", "arc")
            .with_attr("radius", radius)
            .with_attr("start_angle", start_angle)
            .with_attr("end_angle", end_angle)
            .with_child(point("point", center))
            .with_child(vector("normal", normal))
            .with_child(vector("x_axis", x_axis)),
    }
}

pub(crate) fn read_edge(e: &XmlElement) -> StruxResult<Edge> {
    schema::check_order(e)?;
    let points = e
        .children_named("point")
        .map(read_point)
        .collect::<StruxResult<Vec<_>>>()?;

    match e.required_attr("type")? {
        "line" => match points.as_slice() {
            [start, end] => Edge::line(*start, *end),
            _ => Err(StruxError::arity("point", points.len(), "2 for a line edge")),
        },
        "arc" => {
            let center = match points.as_slice() {
                [center] => *center,
                _ => return Err(StruxError::arity("point", points.len(), "1 for an arc edge")),
            };
            Edge::arc(
                center,
                e.parse_attr("radius")?,
                e.parse_attr("start_angle")?,
                e.parse_attr("end_angle")?,
                read_vector(e.required_child("normal")?)?,
                read_vector(e.required_child("x_axis")?)?,
            )
        }
        other => Err(StruxError::xml(format!("unknown edge type '{}' on <{}>", other, e.name))),
    }
}

// ============================================================================
// Edge connections
// ============================================================================

fn stiffness(name: &str, components: [(&'static str, f64); 6]) -> XmlElement {
    components
        .iter()
        .fold(XmlElement::new(name), |e, (key, value)| e.with_attr(*key, value))
}

pub(crate) fn edge_connection(connection: &ShellEdgeConnection) -> StruxResult<XmlElement> {
    let rigidity = schema::element(
        "rigidity",
        Vec::new(),
        vec![
            stiffness("rotations", connection.rigidity.rotations.components()),
            stiffness("motions", connection.rigidity.motions.components()),
        ],
    )?;
    Ok(XmlElement::new("edge_connection")
        .with_opt_attr("name", connection.release_name.as_deref())
        .with_child(rigidity))
}

macro_rules! read_stiffness {
    ($type:ident, $e:expr) => {{
        let e = $e;
        $type::define(
            e.parse_attr("x_neg")?,
            e.parse_attr("x_pos")?,
            e.parse_attr("y_neg")?,
            e.parse_attr("y_pos")?,
            e.parse_attr("z_neg")?,
            e.parse_attr("z_pos")?,
        )
    }};
}

pub(crate) fn read_edge_connection(e: &XmlElement) -> StruxResult<ShellEdgeConnection> {
    let rigidity = e.required_child("rigidity")?;
    schema::check_order(rigidity)?;
    Ok(ShellEdgeConnection {
        rigidity: Rigidity {
            motions: read_stiffness!(Motions, rigidity.required_child("motions")?)?,
            rotations: read_stiffness!(Rotations, rigidity.required_child("rotations")?)?,
        },
        release_name: e.attr("name").map(str::to_string),
    })
}

// ============================================================================
// Regions
// ============================================================================

/// Write a region; edge connections are included for shells only
pub(crate) fn region(region: &Region, with_connections: bool) -> StruxResult<XmlElement> {
    let mut connections = region.edge_connections().iter();
    let mut contours = Vec::with_capacity(region.contours().len());
    for contour in region.contours() {
        let mut edges = Vec::with_capacity(contour.edges().len());
        for (e, connection) in contour.edges().iter().zip(&mut connections) {
            let XmlElement {
                attributes,
                mut children,
                ..
            } = edge("edge", e);
            if with_connections {
                children.push(edge_connection(connection)?);
            }
            edges.push(schema::element("edge", attributes, children)?);
        }
        contours.push(schema::element("contour", Vec::new(), edges)?);
    }
    schema::element("region", Vec::new(), contours)
}

/// Read a region. With `axes` the local frame is rebuilt from the stored
/// local x and y; otherwise it is derived from the contours.
pub(crate) fn read_region(e: &XmlElement, axes: Option<(Vector3, Vector3)>) -> StruxResult<Region> {
    schema::check_order(e)?;
    let mut contours = Vec::new();
    let mut connections = Vec::new();
    for c in e.children_named("contour") {
        schema::check_order(c)?;
        let mut edges = Vec::new();
        for edge_e in c.children_named("edge") {
            edges.push(read_edge(edge_e)?);
            connections.push(match edge_e.child("edge_connection") {
                Some(conn) => read_edge_connection(conn)?,
                None => ShellEdgeConnection::default(),
            });
        }
        contours.push(Contour::new(edges)?);
    }

    let derived = Region::from_contours(contours.clone())?;
    let cs = match axes {
        Some((x, y)) => CoordinateSystem::new(derived.coordinate_system().origin(), x, y)?,
        None => *derived.coordinate_system(),
    };
    Region::from_parts(contours, connections, cs)
}

/// `local_x` and `local_y` elements of a region frame
pub(crate) fn frame(region: &Region) -> [XmlElement; 2] {
    let cs = region.coordinate_system();
    [vector("local_x", cs.local_x()), vector("local_y", cs.local_y())]
}

pub(crate) fn read_frame(parent: &XmlElement) -> StruxResult<(Vector3, Vector3)> {
    Ok((
        read_vector(parent.required_child("local_x")?)?,
        read_vector(parent.required_child("local_y")?)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point3;
    use std::f64::consts::PI;

    #[test]
    fn test_arc_edge_round_trip() {
        let arc = Edge::arc(Point3::ORIGIN, 2.0, 0.0, PI / 2.0, Vector3::UNIT_Z, Vector3::UNIT_X).unwrap();
        let e = edge("curve", &arc);
        assert_eq!(e.attr("type"), Some("arc"));
        assert_eq!(read_edge(&e).unwrap(), arc);
    }

    #[test]
    fn test_line_edge_needs_two_points() {
        let e = XmlElement::new("edge")
            .with_attr("type", "line")
            .with_child(point("point", Point3::ORIGIN));
        assert_eq!(read_edge(&e).unwrap_err().error_code(), "ARITY");
    }

    #[test]
    fn test_rigidity_children_are_in_schema_order() {
        let e = edge_connection(&ShellEdgeConnection::hinged()).unwrap();
        let rigidity = e.required_child("rigidity").unwrap();
        let names: Vec<_> = rigidity.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["motions", "rotations"]);
        assert_eq!(read_edge_connection(&e).unwrap(), ShellEdgeConnection::hinged());
    }

    #[test]
    fn test_region_round_trip_with_rotated_frame() {
        let base = Region::rectangle(Point3::ORIGIN, Vector3::new(6.0, 0.0, 0.0), Vector3::new(0.0, 4.0, 0.0))
            .unwrap()
            .with_edge_connection(ShellEdgeConnection::hinged(), &[2])
            .unwrap();
        let mut cs = *base.coordinate_system();
        cs.set_x_around_z(Vector3::UNIT_Y).unwrap();
        let rotated = base.with_coordinate_system(cs).unwrap();

        let e = region(&rotated, true).unwrap();
        let axes = (cs.local_x(), cs.local_y());
        let read = read_region(&e, Some(axes)).unwrap();
        assert_eq!(read.edge_connections(), rotated.edge_connections());
        assert!(read.coordinate_system().local_x().equals(&Vector3::UNIT_Y, 1e-12));
    }

    #[test]
    fn test_region_without_connections_reads_rigid() {
        let r = Region::rectangle(Point3::ORIGIN, Vector3::new(1.0, 0.0, 0.0), Vector3::new(0.0, 1.0, 0.0))
            .unwrap()
            .with_edge_connection(ShellEdgeConnection::hinged(), &[0])
            .unwrap();
        let e = region(&r, false).unwrap();
        assert!(e.children[0].children[0].child("edge_connection").is_none());
        let read = read_region(&e, None).unwrap();
        assert_eq!(read.edge_connections()[0], ShellEdgeConnection::rigid());
    }
}
