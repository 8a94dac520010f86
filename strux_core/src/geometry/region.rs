//! # Regions
//!
//! A planar surface bounded by closed contours. The first contour is the
//! outer boundary; any further contours are holes.
//!
//! Every edge of every contour carries one [`ShellEdgeConnection`]. Edges are
//! indexed in contour order, so index `k` is the `k`-th edge when all
//! contours are concatenated.
//!
//! ## Example
//!
//! ```rust
//! use strux_core::geometry::{Point3, Region, Vector3};
//! use strux_core::releases::ShellEdgeConnection;
//!
//! let region = Region::rectangle(Point3::ORIGIN, Vector3::new(6.0, 0.0, 0.0), Vector3::new(0.0, 4.0, 0.0))?;
//! assert_eq!(region.edge_count(), 4);
//!
//! let hinged = region.with_edge_connection(ShellEdgeConnection::hinged(), &[0, 2])?;
//! assert_eq!(hinged.edge_connections()[2], ShellEdgeConnection::hinged());
//! assert_eq!(region.edge_connections()[2], ShellEdgeConnection::rigid());
//! # Ok::<(), strux_core::errors::StruxError>(())
//! ```

use serde::{Deserialize, Serialize};

use super::coordinate_system::CoordinateSystem;
use super::edge::Edge;
use super::vector::{Point3, Vector3};
use crate::errors::{StruxError, StruxResult};
use crate::releases::ShellEdgeConnection;
use crate::tolerance;

/// Closed chain of edges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contour {
    edges: Vec<Edge>,
}

impl Contour {
    /// Each edge must end where the next begins, and the last must close on
    /// the first.
    pub fn new(edges: Vec<Edge>) -> StruxResult<Self> {
        if edges.is_empty() {
            return Err(StruxError::invalid_geometry("contour has no edges"));
        }
        for (i, edge) in edges.iter().enumerate() {
            let next = &edges[(i + 1) % edges.len()];
            if !edge
                .end_point()
                .equals(&next.start_point(), tolerance::LENGTH_COMPARISON)
            {
                return Err(StruxError::invalid_geometry(format!(
                    "contour is not closed: edge {} does not end where edge {} starts",
                    i,
                    (i + 1) % edges.len()
                )));
            }
        }
        Ok(Contour { edges })
    }

    /// Closed polygon through `points`
    pub fn polygon(points: &[Point3]) -> StruxResult<Self> {
        if points.len() < 3 {
            return Err(StruxError::invalid_geometry(format!(
                "polygon needs at least 3 points, got {}",
                points.len()
            )));
        }
        let edges = points
            .iter()
            .zip(points.iter().cycle().skip(1))
            .map(|(a, b)| Edge::line(*a, *b))
            .collect::<StruxResult<Vec<_>>>()?;
        Contour::new(edges)
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }
}

/// Planar region with per-edge connections and a local frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    contours: Vec<Contour>,
    edge_connections: Vec<ShellEdgeConnection>,
    coordinate_system: CoordinateSystem,
}

impl Region {
    /// Build a region and derive its frame.
    ///
    /// Origin is the first contour point, X follows the first edge, Z is the
    /// plane normal. All edges default to rigid connections.
    pub fn from_contours(contours: Vec<Contour>) -> StruxResult<Self> {
        let outer = contours
            .first()
            .ok_or_else(|| StruxError::invalid_geometry("region has no contours"))?;

        let points: Vec<Point3> = outer.edges().iter().map(|e| e.start_point()).collect();
        let normal = newell_normal(&points)
            .normalize()
            .map_err(|_| StruxError::invalid_geometry("region outer contour encloses no area"))?;

        let origin = points[0];
        let first = outer.edges()[0].end_point() - origin;
        // Project onto the plane so the frame is exactly orthogonal
        let x = (first - normal * first.dot(&normal)).normalize()?;
        let cs = CoordinateSystem::new(origin, x, normal.cross(&x))?;

        for contour in &contours {
            for edge in contour.edges() {
                for p in edge.points() {
                    let distance = (p - origin).dot(&normal).abs();
                    if distance > tolerance::BREP {
                        return Err(StruxError::invalid_geometry(format!(
                            "region is not planar: point ({}, {}, {}) is {:e} from the plane",
                            p.x, p.y, p.z, distance
                        )));
                    }
                }
            }
        }

        let count = contours.iter().map(|c| c.edges().len()).sum();
        Ok(Region {
            contours,
            edge_connections: vec![ShellEdgeConnection::default(); count],
            coordinate_system: cs,
        })
    }

    /// Rectangle spanned by two side vectors from a corner
    pub fn rectangle(corner: Point3, side_a: Vector3, side_b: Vector3) -> StruxResult<Self> {
        let contour = Contour::polygon(&[corner, corner + side_a, corner + side_a + side_b, corner + side_b])?;
        Region::from_contours(vec![contour])
    }

    /// Reassemble a region read back from a document
    pub fn from_parts(
        contours: Vec<Contour>,
        edge_connections: Vec<ShellEdgeConnection>,
        coordinate_system: CoordinateSystem,
    ) -> StruxResult<Self> {
        let region = Region::from_contours(contours)?;
        if edge_connections.len() != region.edge_count() {
            return Err(StruxError::arity(
                "edge_connections",
                edge_connections.len(),
                region.edge_count().to_string(),
            ));
        }
        let region = region.with_coordinate_system(coordinate_system)?;
        Ok(Region {
            edge_connections,
            ..region
        })
    }

    pub fn contours(&self) -> &[Contour] {
        &self.contours
    }

    /// All edges of all contours, in index order
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.contours.iter().flat_map(|c| c.edges().iter())
    }

    pub fn edge_count(&self) -> usize {
        self.edge_connections.len()
    }

    pub fn edge_connections(&self) -> &[ShellEdgeConnection] {
        &self.edge_connections
    }

    pub fn coordinate_system(&self) -> &CoordinateSystem {
        &self.coordinate_system
    }

    /// Copy with `connection` applied to every edge in `indices`.
    ///
    /// All indices are checked before anything is applied; one bad index
    /// fails the whole update with `IndexOutOfRange`.
    pub fn with_edge_connection(&self, connection: ShellEdgeConnection, indices: &[usize]) -> StruxResult<Region> {
        let count = self.edge_count();
        if let Some(&index) = indices.iter().find(|&&i| i >= count) {
            return Err(StruxError::IndexOutOfRange { index, count });
        }

        let mut region = self.clone();
        for &i in indices {
            region.edge_connections[i] = connection.clone();
        }
        Ok(region)
    }

    /// Copy with `connection` on every edge
    pub fn with_all_edge_connections(&self, connection: ShellEdgeConnection) -> Region {
        Region {
            edge_connections: vec![connection; self.edge_count()],
            ..self.clone()
        }
    }

    /// Copy with a new local frame. Its Z must stay normal to the plane.
    pub fn with_coordinate_system(&self, cs: CoordinateSystem) -> StruxResult<Region> {
        if !cs.local_z().parallel(&self.coordinate_system.local_z()).is_parallel() {
            return Err(StruxError::invalid_geometry(
                "local z of a region frame must be normal to the region plane",
            ));
        }
        Ok(Region {
            coordinate_system: cs,
            ..self.clone()
        })
    }
}

/// Newell's method: area-weighted normal of a closed polygon
fn newell_normal(points: &[Point3]) -> Vector3 {
    let mut n = Vector3::ZERO;
    for (a, b) in points.iter().zip(points.iter().cycle().skip(1)) {
        n.x += (a.y - b.y) * (a.z + b.z);
        n.y += (a.z - b.z) * (a.x + b.x);
        n.z += (a.x - b.x) * (a.y + b.y);
    }
    n
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    fn floor() -> Region {
        Region::rectangle(Point3::ORIGIN, Vector3::new(6.0, 0.0, 0.0), Vector3::new(0.0, 4.0, 0.0)).unwrap()
    }

    #[test]
    fn test_rectangle_frame() {
        let r = floor();
        let cs = r.coordinate_system();
        assert_eq!(cs.origin(), Point3::ORIGIN);
        assert!(cs.local_x().equals(&Vector3::UNIT_X, EPS));
        assert!(cs.local_z().equals(&Vector3::UNIT_Z, EPS));
        assert_eq!(r.edge_count(), 4);
        assert!(r.edge_connections().iter().all(|c| *c == ShellEdgeConnection::rigid()));
    }

    #[test]
    fn test_clockwise_contour_points_down() {
        let r = Region::rectangle(Point3::ORIGIN, Vector3::new(0.0, 4.0, 0.0), Vector3::new(6.0, 0.0, 0.0)).unwrap();
        assert!(r.coordinate_system().local_z().equals(&-Vector3::UNIT_Z, EPS));
    }

    #[test]
    fn test_non_planar_region_is_rejected() {
        let contour = Contour::polygon(&[
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.1),
            Point3::new(0.0, 1.0, 0.0),
        ])
        .unwrap();
        let err = Region::from_contours(vec![contour]).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_GEOMETRY");
    }

    #[test]
    fn test_open_contour_is_rejected() {
        let a = Edge::line(Point3::ORIGIN, Point3::new(1.0, 0.0, 0.0)).unwrap();
        let b = Edge::line(Point3::new(1.0, 0.0, 0.0), Point3::new(1.0, 1.0, 0.0)).unwrap();
        assert!(Contour::new(vec![a, b]).is_err());
    }

    #[test]
    fn test_hole_edges_are_indexed_after_outer() {
        let outer = Contour::polygon(&[
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(10.0, 0.0, 0.0),
            Point3::new(10.0, 10.0, 0.0),
            Point3::new(0.0, 10.0, 0.0),
        ])
        .unwrap();
        let hole = Contour::polygon(&[
            Point3::new(4.0, 4.0, 0.0),
            Point3::new(4.0, 6.0, 0.0),
            Point3::new(6.0, 5.0, 0.0),
        ])
        .unwrap();
        let r = Region::from_contours(vec![outer, hole]).unwrap();
        assert_eq!(r.edge_count(), 7);
        assert_eq!(r.edges().count(), 7);
        assert!(r.with_edge_connection(ShellEdgeConnection::hinged(), &[6]).is_ok());
    }

    #[test]
    fn test_edge_connection_out_of_range_is_all_or_nothing() {
        let r = floor();
        let err = r
            .with_edge_connection(ShellEdgeConnection::hinged(), &[0, 4])
            .unwrap_err();
        assert_eq!(err, StruxError::IndexOutOfRange { index: 4, count: 4 });
        assert!(r.edge_connections().iter().all(|c| *c == ShellEdgeConnection::rigid()));
    }

    #[test]
    fn test_with_coordinate_system_keeps_plane() {
        let r = floor();
        let mut cs = *r.coordinate_system();
        cs.set_x_around_z(Vector3::UNIT_Y).unwrap();
        let rotated = r.with_coordinate_system(cs).unwrap();
        assert!(rotated.coordinate_system().local_x().equals(&Vector3::UNIT_Y, EPS));

        let tilted = CoordinateSystem::new(Point3::ORIGIN, Vector3::UNIT_X, Vector3::UNIT_Z).unwrap();
        assert!(r.with_coordinate_system(tilted).is_err());
    }
}
