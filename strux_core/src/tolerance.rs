//! # Tolerance Policy
//!
//! Named epsilons used by every geometric comparison in the crate. These are
//! fixed by the interchange format's consumer and are not configurable.
//!
//! ## Example
//!
//! ```rust
//! use strux_core::tolerance::DOT_PRODUCT;
//! use strux_core::geometry::Vector3;
//!
//! let dot = Vector3::UNIT_X.dot(&Vector3::UNIT_Y);
//! assert!(dot.abs() < DOT_PRODUCT);
//! ```

/// Flatness of region contours (distance of a point from the region plane).
pub const BREP: f64 = 1e-6;

/// Two unit vectors `a`, `b` are perpendicular when `|a · b| < DOT_PRODUCT`.
pub const DOT_PRODUCT: f64 = 1e-10;

/// Length below which a vector is degenerate, and the distance below which
/// two points coincide.
pub const LENGTH_COMPARISON: f64 = 1e-5;

/// Component-wise equality of unit vectors, and the wall verticality limit.
pub const POINT3D: f64 = 1e-15;

/// Relative tolerance for comparing derived axes (`X × Y` against a stored `Z`).
///
/// [`POINT3D`] is below the rounding error of one cross product of unit
/// vectors, so derived axes are compared with this bound instead.
pub const AXIS_EQUALITY: f64 = 1e-9;
