//! Line and arc edges.

use serde::{Deserialize, Serialize};

use super::coordinate_system::CoordinateSystem;
use super::vector::{Point3, Vector3};
use crate::errors::{StruxError, StruxResult};
use crate::tolerance;

/// A curve segment: straight line or circular arc.
///
/// Arc points are `center + radius * (cos θ · x_axis + sin θ · (normal × x_axis))`
/// for `θ` from `start_angle` to `end_angle` (radians).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Edge {
    Line {
        start: Point3,
        end: Point3,
    },
    Arc {
        center: Point3,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        normal: Vector3,
        x_axis: Vector3,
    },
}

impl Edge {
    /// Straight edge. Fails when the end points coincide.
    pub fn line(start: Point3, end: Point3) -> StruxResult<Edge> {
        if start.distance_to(&end) < tolerance::LENGTH_COMPARISON {
            return Err(StruxError::invalid_geometry("line edge has coincident end points"));
        }
        Ok(Edge::Line { start, end })
    }

    /// Circular arc edge.
    ///
    /// `normal` and `x_axis` are normalized; they must be perpendicular.
    pub fn arc(
        center: Point3,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        normal: Vector3,
        x_axis: Vector3,
    ) -> StruxResult<Edge> {
        if !radius.is_finite() || radius < tolerance::LENGTH_COMPARISON {
            return Err(StruxError::invalid_geometry(format!("arc radius {} is not positive", radius)));
        }
        if (end_angle - start_angle).abs() < tolerance::DOT_PRODUCT {
            return Err(StruxError::invalid_geometry("arc has zero sweep"));
        }
        let normal = normal.normalize()?;
        let x_axis = x_axis.normalize()?;
        let dot = normal.dot(&x_axis);
        if dot.abs() >= tolerance::DOT_PRODUCT {
            return Err(StruxError::orthogonality("arc x-axis is not perpendicular to its normal", dot));
        }
        Ok(Edge::Arc {
            center,
            radius,
            start_angle,
            end_angle,
            normal,
            x_axis,
        })
    }

    pub fn is_line(&self) -> bool {
        matches!(self, Edge::Line { .. })
    }

    /// Straight and parallel to global Z
    pub fn is_line_vertical(&self) -> bool {
        match self {
            Edge::Line { start, end } => (*end - *start).parallel(&Vector3::UNIT_Z).is_parallel(),
            Edge::Arc { .. } => false,
        }
    }

    pub fn start_point(&self) -> Point3 {
        match *self {
            Edge::Line { start, .. } => start,
            Edge::Arc { start_angle, .. } => self.point_at_angle(start_angle),
        }
    }

    pub fn end_point(&self) -> Point3 {
        match *self {
            Edge::Line { end, .. } => end,
            Edge::Arc { end_angle, .. } => self.point_at_angle(end_angle),
        }
    }

    /// Start, end and, for arcs, the mid point
    pub fn points(&self) -> Vec<Point3> {
        match *self {
            Edge::Line { start, end } => vec![start, end],
            Edge::Arc {
                start_angle, end_angle, ..
            } => vec![
                self.start_point(),
                self.point_at_angle(0.5 * (start_angle + end_angle)),
                self.end_point(),
            ],
        }
    }

    fn point_at_angle(&self, angle: f64) -> Point3 {
        match *self {
            Edge::Line { start, .. } => start,
            Edge::Arc {
                center,
                radius,
                normal,
                x_axis,
                ..
            } => {
                let y_axis = normal.cross(&x_axis);
                center + (x_axis * angle.cos() + y_axis * angle.sin()) * radius
            }
        }
    }

    /// Local frame of the edge.
    ///
    /// Line: origin at the start, X along the line, Y oriented to the global
    /// frame. Arc: origin at mid-sweep, X tangent, Y toward the centre,
    /// Z equal to the arc normal.
    pub fn coordinate_system(&self) -> StruxResult<CoordinateSystem> {
        match *self {
            Edge::Line { start, end } => {
                let x = (end - start).normalize()?;
                let helper = if x.parallel(&Vector3::UNIT_Z).is_parallel() {
                    Vector3::UNIT_X
                } else {
                    Vector3::UNIT_Z
                };
                let mut cs = CoordinateSystem::new(start, x, helper.cross(&x))?;
                cs.orient_edge_to_gcs()?;
                Ok(cs)
            }
            Edge::Arc {
                start_angle,
                end_angle,
                normal,
                x_axis,
                ..
            } => {
                let mid = 0.5 * (start_angle + end_angle);
                let radial = x_axis * mid.cos() + normal.cross(&x_axis) * mid.sin();
                let mut tangent = normal.cross(&radial);
                if end_angle < start_angle {
                    tangent = -tangent;
                }
                let y = if end_angle < start_angle { radial } else { -radial };
                CoordinateSystem::new(self.point_at_angle(mid), tangent, y)
            }
        }
    }
}
