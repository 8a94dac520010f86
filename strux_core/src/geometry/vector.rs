//! Vector and point value types.
//!
//! Both types are plain `Copy` values with no identity. Equality in the
//! geometric sense goes through [`Vector3::equals`] / [`Point3::equals`] with an
//! explicit tolerance; the derived `PartialEq` is exact and only used for
//! structural comparisons (round trips, tests).

use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

use crate::errors::{StruxError, StruxResult};
use crate::tolerance;

// ============================================================================
// Vector3
// ============================================================================

/// A direction/displacement in 3D space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Result of a parallelism test between two vectors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Parallel {
    /// Same direction
    SameDirection,
    /// Parallel but pointing the other way
    OppositeDirection,
    /// Not parallel
    NotParallel,
}

impl Parallel {
    /// True for either parallel outcome
    pub fn is_parallel(&self) -> bool {
        !matches!(self, Parallel::NotParallel)
    }
}

impl Vector3 {
    pub const ZERO: Vector3 = Vector3 { x: 0.0, y: 0.0, z: 0.0 };
    pub const UNIT_X: Vector3 = Vector3 { x: 1.0, y: 0.0, z: 0.0 };
    pub const UNIT_Y: Vector3 = Vector3 { x: 0.0, y: 1.0, z: 0.0 };
    pub const UNIT_Z: Vector3 = Vector3 { x: 0.0, y: 0.0, z: 1.0 };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Vector3 { x, y, z }
    }

    /// Vector from `from` to `to`
    pub fn between(from: Point3, to: Point3) -> Self {
        to - from
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Scale to unit length.
    ///
    /// Fails with [`StruxError::DegenerateVector`] when the length is below
    /// [`tolerance::LENGTH_COMPARISON`].
    pub fn normalize(&self) -> StruxResult<Vector3> {
        let len = self.length();
        if !len.is_finite() || len < tolerance::LENGTH_COMPARISON {
            return Err(StruxError::DegenerateVector {
                x: self.x,
                y: self.y,
                z: self.z,
            });
        }
        Ok(self.scale(1.0 / len))
    }

    pub fn cross(&self, v: &Vector3) -> Vector3 {
        Vector3 {
            x: self.y * v.z - self.z * v.y,
            y: self.z * v.x - self.x * v.z,
            z: self.x * v.y - self.y * v.x,
        }
    }

    pub fn dot(&self, v: &Vector3) -> f64 {
        self.x * v.x + self.y * v.y + self.z * v.z
    }

    pub fn scale(&self, s: f64) -> Vector3 {
        Vector3::new(self.x * s, self.y * s, self.z * s)
    }

    pub fn reverse(&self) -> Vector3 {
        self.scale(-1.0)
    }

    /// Component-wise equality within `tol`
    pub fn equals(&self, v: &Vector3, tol: f64) -> bool {
        (self.x - v.x).abs() <= tol && (self.y - v.y).abs() <= tol && (self.z - v.z).abs() <= tol
    }

    pub fn is_zero(&self) -> bool {
        self.length() < tolerance::LENGTH_COMPARISON
    }

    /// Classify `self` against `v`.
    ///
    /// Degenerate vectors are never parallel to anything.
    pub fn parallel(&self, v: &Vector3) -> Parallel {
        let (a, b) = match (self.normalize(), v.normalize()) {
            (Ok(a), Ok(b)) => (a, b),
            _ => return Parallel::NotParallel,
        };
        let dot = a.dot(&b);
        if (dot - 1.0).abs() < tolerance::DOT_PRODUCT {
            Parallel::SameDirection
        } else if (dot + 1.0).abs() < tolerance::DOT_PRODUCT {
            Parallel::OppositeDirection
        } else {
            Parallel::NotParallel
        }
    }

    /// Check perpendicularity of two vectors after normalization
    pub fn is_perpendicular(&self, v: &Vector3) -> bool {
        match (self.normalize(), v.normalize()) {
            (Ok(a), Ok(b)) => a.dot(&b).abs() < tolerance::DOT_PRODUCT,
            _ => false,
        }
    }
}

impl Add for Vector3 {
    type Output = Vector3;
    fn add(self, rhs: Vector3) -> Vector3 {
        Vector3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vector3 {
    type Output = Vector3;
    fn sub(self, rhs: Vector3) -> Vector3 {
        Vector3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Neg for Vector3 {
    type Output = Vector3;
    fn neg(self) -> Vector3 {
        self.reverse()
    }
}

impl Mul<f64> for Vector3 {
    type Output = Vector3;
    fn mul(self, s: f64) -> Vector3 {
        self.scale(s)
    }
}

// ============================================================================
// Point3
// ============================================================================

/// A position in 3D space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub const ORIGIN: Point3 = Point3 { x: 0.0, y: 0.0, z: 0.0 };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Point3 { x, y, z }
    }

    pub fn distance_to(&self, p: &Point3) -> f64 {
        (*p - *self).length()
    }

    /// Component-wise equality within `tol`
    pub fn equals(&self, p: &Point3, tol: f64) -> bool {
        (self.x - p.x).abs() <= tol && (self.y - p.y).abs() <= tol && (self.z - p.z).abs() <= tol
    }

    /// Position vector of this point
    pub fn to_vector(&self) -> Vector3 {
        Vector3::new(self.x, self.y, self.z)
    }
}

impl Sub for Point3 {
    type Output = Vector3;
    fn sub(self, rhs: Point3) -> Vector3 {
        Vector3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Add<Vector3> for Point3 {
    type Output = Point3;
    fn add(self, v: Vector3) -> Point3 {
        Point3::new(self.x + v.x, self.y + v.y, self.z + v.z)
    }
}

impl Sub<Vector3> for Point3 {
    type Output = Point3;
    fn sub(self, v: Vector3) -> Point3 {
        Point3::new(self.x - v.x, self.y - v.y, self.z - v.z)
    }
}
