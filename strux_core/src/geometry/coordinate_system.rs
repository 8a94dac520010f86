//! # Coordinate System
//!
//! An oriented local frame: an origin plus three mutually orthogonal unit
//! axes. Every oriented structural element (bar parts, slab parts, panels)
//! carries one.
//!
//! ## Invariants
//!
//! - **Complete**: all three axes are finite unit vectors.
//! - **Orthogonal**: `|X · Y| < DOT_PRODUCT` and `X × Y == Z`.
//!
//! Both hold after every successful constructor and mutator. A mutator that
//! would break them fails and leaves the frame untouched.
//!
//! ## Example
//!
//! ```rust
//! use strux_core::geometry::{CoordinateSystem, Point3, Vector3};
//!
//! let mut cs = CoordinateSystem::new(Point3::ORIGIN, Vector3::UNIT_X, Vector3::UNIT_Y)?;
//! cs.set_y_around_x(Vector3::new(0.0, 0.0, 2.0))?;
//!
//! assert_eq!(cs.local_x(), Vector3::UNIT_X);
//! assert!(cs.local_z().equals(&Vector3::new(0.0, -1.0, 0.0), 1e-12));
//! # Ok::<(), strux_core::errors::StruxError>(())
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::vector::{Point3, Vector3};
use crate::errors::{StruxError, StruxResult};
use crate::tolerance;

/// Orthonormal right-handed local frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinateSystem")]
pub struct CoordinateSystem {
    origin: Point3,
    local_x: Vector3,
    local_y: Vector3,
    local_z: Vector3,
}

/// Unvalidated wire shape, checked through [`CoordinateSystem::with_axes`].
#[derive(Deserialize)]
struct RawCoordinateSystem {
    origin: Point3,
    local_x: Vector3,
    local_y: Vector3,
    local_z: Vector3,
}

impl TryFrom<RawCoordinateSystem> for CoordinateSystem {
    type Error = StruxError;

    fn try_from(raw: RawCoordinateSystem) -> StruxResult<Self> {
        CoordinateSystem::with_axes(raw.origin, raw.local_x, raw.local_y, raw.local_z)
    }
}

impl CoordinateSystem {
    /// Global coordinate system (GCS) at the world origin
    pub fn global() -> Self {
        CoordinateSystem {
            origin: Point3::ORIGIN,
            local_x: Vector3::UNIT_X,
            local_y: Vector3::UNIT_Y,
            local_z: Vector3::UNIT_Z,
        }
    }

    /// Construct from origin and local x and y axes. `Z = X × Y`.
    ///
    /// # Errors
    ///
    /// * `IncompleteFrame` - an axis is degenerate
    /// * `Orthogonality` - X and Y are not perpendicular
    pub fn new(origin: Point3, local_x: Vector3, local_y: Vector3) -> StruxResult<Self> {
        let x = unit_axis(local_x, "local_x")?;
        let y = unit_axis(local_y, "local_y")?;
        let cs = CoordinateSystem {
            origin,
            local_x: x,
            local_y: y,
            local_z: x.cross(&y),
        };
        cs.check()?;
        Ok(cs)
    }

    /// Construct from origin and all three axes, validating that `Z = X × Y`.
    pub fn with_axes(origin: Point3, local_x: Vector3, local_y: Vector3, local_z: Vector3) -> StruxResult<Self> {
        let cs = CoordinateSystem {
            origin,
            local_x: unit_axis(local_x, "local_x")?,
            local_y: unit_axis(local_y, "local_y")?,
            local_z: unit_axis(local_z, "local_z")?,
        };
        cs.check()?;
        Ok(cs)
    }

    pub fn origin(&self) -> Point3 {
        self.origin
    }

    pub fn local_x(&self) -> Vector3 {
        self.local_x
    }

    pub fn local_y(&self) -> Vector3 {
        self.local_y
    }

    pub fn local_z(&self) -> Vector3 {
        self.local_z
    }

    /// Move the frame without changing its orientation
    pub fn with_origin(mut self, origin: Point3) -> Self {
        self.origin = origin;
        self
    }

    /// All three axes are finite unit vectors
    pub fn is_complete(&self) -> bool {
        [self.local_x, self.local_y, self.local_z]
            .iter()
            .all(|a| a.length().is_finite() && (a.length() - 1.0).abs() < tolerance::LENGTH_COMPARISON)
    }

    /// X ⟂ Y within [`tolerance::DOT_PRODUCT`] and `X × Y == Z`
    pub fn is_orthogonal(&self) -> bool {
        self.local_x.dot(&self.local_y).abs() < tolerance::DOT_PRODUCT
            && self
                .local_x
                .cross(&self.local_y)
                .equals(&self.local_z, tolerance::AXIS_EQUALITY)
    }

    fn check(&self) -> StruxResult<()> {
        if !self.is_complete() {
            return Err(StruxError::incomplete_frame("axes must be unit vectors"));
        }
        if !self.is_orthogonal() {
            return Err(StruxError::orthogonality(
                format!(
                    "coordinate system is not orthogonal within the tolerance {}",
                    tolerance::DOT_PRODUCT
                ),
                self.local_x.dot(&self.local_y),
            ));
        }
        Ok(())
    }

    // ========================================================================
    // Single-axis rotations
    // ========================================================================

    /// Set X and rotate the frame around Z. `Y = Z × X`.
    pub fn set_x_around_z(&mut self, vector: Vector3) -> StruxResult<()> {
        let val = vector.normalize()?;
        let dot = self.local_z.dot(&val);
        if dot.abs() >= tolerance::DOT_PRODUCT {
            return Err(StruxError::orthogonality("the passed X-axis is not perpendicular to Z-axis", dot));
        }
        self.local_x = val;
        self.local_y = self.local_z.cross(&val);
        Ok(())
    }

    /// Set Y and rotate the frame around X. `Z = X × Y`.
    pub fn set_y_around_x(&mut self, vector: Vector3) -> StruxResult<()> {
        let val = vector.normalize()?;
        let dot = self.local_x.dot(&val);
        if dot.abs() >= tolerance::DOT_PRODUCT {
            return Err(StruxError::orthogonality("the passed Y-axis is not perpendicular to X-axis", dot));
        }
        self.local_y = val;
        self.local_z = self.local_x.cross(&val);
        Ok(())
    }

    /// Set Y and rotate the frame around Z. `X = Y × Z`.
    pub fn set_y_around_z(&mut self, vector: Vector3) -> StruxResult<()> {
        let val = vector.normalize()?;
        let dot = self.local_z.dot(&val);
        if dot.abs() >= tolerance::DOT_PRODUCT {
            return Err(StruxError::orthogonality("the passed Y-axis is not perpendicular to Z-axis", dot));
        }
        self.local_y = val;
        self.local_x = val.cross(&self.local_z);
        Ok(())
    }

    /// Set Z and rotate the frame around X. `Y = Z × X`.
    pub fn set_z_around_x(&mut self, vector: Vector3) -> StruxResult<()> {
        let val = vector.normalize()?;
        let dot = self.local_x.dot(&val);
        if dot.abs() >= tolerance::DOT_PRODUCT {
            return Err(StruxError::orthogonality("the passed Z-axis is not perpendicular to X-axis", dot));
        }
        self.local_z = val;
        self.local_y = val.cross(&self.local_x);
        Ok(())
    }

    // ========================================================================
    // Re-orientation to the global coordinate system
    // ========================================================================

    /// Orient as an edge frame, where X is constrained by the edge.
    ///
    /// Y becomes `Ẑ × X`, or `Ŷ` when X is vertical.
    pub fn orient_edge_to_gcs(&mut self) -> StruxResult<()> {
        if !self.is_complete() {
            return Err(StruxError::incomplete_frame("impossible to orient an incomplete coordinate system"));
        }

        if self.local_x.parallel(&Vector3::UNIT_Z).is_parallel() {
            debug!("edge frame is vertical, aligning local y to global Y");
            self.set_y_around_x(perpendicular_part(Vector3::UNIT_Y, self.local_x)?)
        } else {
            self.set_y_around_x(Vector3::UNIT_Z.cross(&self.local_x))
        }
    }

    /// Orient as a plane frame, where X and Y are constrained by the plane.
    ///
    /// Non-vertical planes end with Z pointing up; vertical planes end with
    /// Y along global Z. Tilted planes that already face up are left alone.
    pub fn orient_plane_to_gcs(&mut self) -> StruxResult<()> {
        let dot = self.local_z.dot(&Vector3::UNIT_Z);
        let tol = tolerance::DOT_PRODUCT;

        if (dot - 1.0).abs() < tol {
            debug!("plane is horizontal, aligning local x to global X");
            self.set_x_around_z(perpendicular_part(Vector3::UNIT_X, self.local_z)?)
        } else if dot.abs() < tol {
            debug!("plane is vertical, aligning local y to global Z");
            self.set_y_around_z(perpendicular_part(Vector3::UNIT_Z, self.local_z)?)
        } else if (dot + 1.0).abs() < tol {
            debug!("plane is horizontal and inverted, flipping around local x");
            self.set_z_around_x(self.local_z.reverse())?;
            self.set_x_around_z(perpendicular_part(Vector3::UNIT_X, self.local_z)?)
        } else if dot > 0.0 && dot < 1.0 {
            Ok(())
        } else if dot < 0.0 && dot > -1.0 {
            debug!(dot, "plane is tilted downwards, flipping around local x");
            self.set_z_around_x(self.local_z.reverse())
        } else {
            Err(StruxError::orthogonality(
                "impossible to orient axes, dot product should be between -1 and 1",
                dot,
            ))
        }
    }
}

impl Default for CoordinateSystem {
    fn default() -> Self {
        CoordinateSystem::global()
    }
}

/// `target` with its component along the unit vector `axis` removed.
///
/// A frame within tolerance of a global axis is still slightly off it, so
/// the global direction it snaps to is first made exactly perpendicular.
fn perpendicular_part(target: Vector3, axis: Vector3) -> StruxResult<Vector3> {
    (target - axis.scale(target.dot(&axis))).normalize()
}

fn unit_axis(v: Vector3, name: &str) -> StruxResult<Vector3> {
    v.normalize()
        .map_err(|_| StruxError::incomplete_frame(format!("{} is missing or has zero length", name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    fn tilted_frame(angle: f64) -> CoordinateSystem {
        // Rotate the global frame around X by `angle`
        let y = Vector3::new(0.0, angle.cos(), angle.sin());
        CoordinateSystem::new(Point3::ORIGIN, Vector3::UNIT_X, y).unwrap()
    }

    #[test]
    fn test_new_derives_z_and_is_orthogonal() {
        let cs = CoordinateSystem::new(
            Point3::new(1.0, 2.0, 3.0),
            Vector3::new(2.0, 0.0, 0.0),
            Vector3::new(0.0, 5.0, 0.0),
        )
        .unwrap();
        assert!(cs.is_complete());
        assert!(cs.is_orthogonal());
        assert!(cs.local_z().equals(&Vector3::UNIT_Z, EPS));
    }

    #[test]
    fn test_new_rejects_non_perpendicular_axes() {
        let err = CoordinateSystem::new(Point3::ORIGIN, Vector3::UNIT_X, Vector3::new(1e-6, 1.0, 0.0)).unwrap_err();
        match err {
            StruxError::Orthogonality { dot, .. } => assert!(dot > 0.0),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_new_rejects_degenerate_axis() {
        let err = CoordinateSystem::new(Point3::ORIGIN, Vector3::ZERO, Vector3::UNIT_Y).unwrap_err();
        assert_eq!(err.error_code(), "INCOMPLETE_FRAME");
    }

    #[test]
    fn test_with_axes_rejects_left_handed_frame() {
        let err = CoordinateSystem::with_axes(Point3::ORIGIN, Vector3::UNIT_X, Vector3::UNIT_Y, -Vector3::UNIT_Z)
            .unwrap_err();
        assert_eq!(err.error_code(), "ORTHOGONALITY");
    }

    #[test]
    fn test_set_y_around_x_keeps_x() {
        let mut cs = CoordinateSystem::global();
        let before = cs.local_x();
        cs.set_y_around_x(Vector3::new(0.0, 1.0, 1.0)).unwrap();

        assert_eq!(cs.local_x(), before);
        assert!(cs.local_z().equals(&cs.local_x().cross(&cs.local_y()), EPS));
        assert!((cs.local_y().length() - 1.0).abs() < EPS);
        assert!(cs.is_orthogonal());
    }

    #[test]
    fn test_mutator_failure_leaves_frame_untouched() {
        let mut cs = CoordinateSystem::global();
        let before = cs;
        let err = cs.set_y_around_x(Vector3::new(1.0, 1.0, 0.0)).unwrap_err();
        assert_eq!(err.error_code(), "ORTHOGONALITY");
        assert_eq!(cs, before);
    }

    #[test]
    fn test_all_mutators_preserve_right_handedness() {
        let mut cs = CoordinateSystem::global();
        cs.set_x_around_z(Vector3::new(1.0, 1.0, 0.0)).unwrap();
        assert!(cs.is_orthogonal());
        cs.set_y_around_z(Vector3::new(-1.0, 0.0, 0.0)).unwrap();
        assert!(cs.is_orthogonal());
        cs.set_z_around_x(Vector3::new(0.0, 0.0, -1.0)).unwrap();
        assert!(cs.is_orthogonal());
        assert!(cs.local_z().equals(&-Vector3::UNIT_Z, EPS));
    }

    #[test]
    fn test_orient_edge_horizontal() {
        // Edge along global Y, any initial local y
        let mut cs = CoordinateSystem::new(Point3::ORIGIN, Vector3::UNIT_Y, Vector3::UNIT_Z).unwrap();
        cs.orient_edge_to_gcs().unwrap();
        // Z × Y = -X
        assert!(cs.local_y().equals(&-Vector3::UNIT_X, EPS));
        assert!(cs.local_z().equals(&Vector3::UNIT_Z, EPS));
    }

    #[test]
    fn test_orient_edge_vertical_uses_global_y() {
        let mut cs = CoordinateSystem::new(Point3::ORIGIN, Vector3::UNIT_Z, Vector3::UNIT_X).unwrap();
        cs.orient_edge_to_gcs().unwrap();
        assert!(cs.local_y().equals(&Vector3::UNIT_Y, EPS));
        assert!(cs.local_x().equals(&Vector3::UNIT_Z, EPS));
    }

    #[test]
    fn test_orient_plane_horizontal() {
        let mut cs = CoordinateSystem::new(Point3::ORIGIN, Vector3::UNIT_Y, -Vector3::UNIT_X).unwrap();
        cs.orient_plane_to_gcs().unwrap();
        assert!(cs.local_x().equals(&Vector3::UNIT_X, EPS));
        assert!(cs.local_z().equals(&Vector3::UNIT_Z, EPS));
    }

    #[test]
    fn test_orient_plane_vertical() {
        // Plane with normal along global Y
        let mut cs = CoordinateSystem::new(Point3::ORIGIN, Vector3::UNIT_Z, Vector3::UNIT_X).unwrap();
        assert!(cs.local_z().equals(&Vector3::UNIT_Y, EPS));
        cs.orient_plane_to_gcs().unwrap();
        assert!(cs.local_y().equals(&Vector3::UNIT_Z, EPS));
        assert!(cs.local_z().equals(&Vector3::UNIT_Y, EPS));
    }

    #[test]
    fn test_orient_plane_tilted_down_is_flipped() {
        let mut cs = tilted_frame(2.0); // z' has a negative global z component
        assert!(cs.local_z().z < 0.0);
        let x_before = cs.local_x();
        cs.orient_plane_to_gcs().unwrap();
        assert!(cs.local_z().z > 0.0);
        assert_eq!(cs.local_x(), x_before);
        assert!(cs.is_orthogonal());
    }

    #[test]
    fn test_orient_plane_tilted_up_is_unchanged() {
        let mut cs = tilted_frame(0.5);
        let before = cs;
        cs.orient_plane_to_gcs().unwrap();
        assert_eq!(cs, before);
    }

    #[test]
    fn test_orient_plane_inverted() {
        let mut cs = CoordinateSystem::new(Point3::ORIGIN, Vector3::UNIT_Y, Vector3::UNIT_X).unwrap();
        assert!(cs.local_z().equals(&-Vector3::UNIT_Z, EPS));
        cs.orient_plane_to_gcs().unwrap();
        assert!(cs.local_z().equals(&Vector3::UNIT_Z, EPS));
        assert!(cs.local_x().equals(&Vector3::UNIT_X, EPS));
    }

    #[test]
    fn test_orient_edge_nearly_vertical() {
        let x = Vector3::new(0.0, 1e-6, 1.0);
        let mut cs = CoordinateSystem::new(Point3::ORIGIN, x, Vector3::UNIT_X).unwrap();
        let before_x = cs.local_x();

        cs.orient_edge_to_gcs().unwrap();
        assert!(cs.is_orthogonal());
        assert_eq!(cs.local_x(), before_x);
        assert!(cs.local_y().equals(&Vector3::UNIT_Y, 1e-5));
    }

    #[test]
    fn test_orient_plane_nearly_horizontal() {
        // Tilted around global Y, so global X is not in the plane
        let a: f64 = 1e-6;
        let mut cs = CoordinateSystem::new(Point3::ORIGIN, Vector3::new(a.cos(), 0.0, -a.sin()), Vector3::UNIT_Y).unwrap();
        let before_z = cs.local_z();

        cs.orient_plane_to_gcs().unwrap();
        assert!(cs.is_orthogonal());
        assert!(cs.local_z().equals(&before_z, EPS));
        assert!(cs.local_x().equals(&Vector3::UNIT_X, 1e-5));
    }

    #[test]
    fn test_orient_plane_nearly_vertical() {
        let a: f64 = 1e-11;
        let mut cs = CoordinateSystem::new(Point3::ORIGIN, Vector3::UNIT_X, Vector3::new(0.0, a.sin(), a.cos())).unwrap();
        assert!(cs.local_z().dot(&Vector3::UNIT_Z).abs() < tolerance::DOT_PRODUCT);

        cs.orient_plane_to_gcs().unwrap();
        assert!(cs.is_orthogonal());
        assert!(cs.local_y().equals(&Vector3::UNIT_Z, 1e-5));
    }

    #[test]
    fn test_serde_roundtrip_validates() {
        let cs = CoordinateSystem::new(Point3::new(1.0, 0.0, 0.0), Vector3::UNIT_X, Vector3::UNIT_Z).unwrap();
        let json = serde_json::to_string(&cs).unwrap();
        let back: CoordinateSystem = serde_json::from_str(&json).unwrap();
        assert_eq!(cs, back);

        let broken = json.replace("\"local_y\":{\"x\":0.0", "\"local_y\":{\"x\":0.5");
        assert!(serde_json::from_str::<CoordinateSystem>(&broken).is_err());
    }
}
