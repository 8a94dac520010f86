//! # Geometry Kernel
//!
//! Value types the structural entities are built from:
//!
//! - [`Vector3`], [`Point3`] - 3D arithmetic with tolerance comparisons
//! - [`CoordinateSystem`] - orthonormal local frames and their re-orientation
//! - [`Edge`] - line and arc segments
//! - [`Contour`], [`Region`] - planar bounded surfaces
//!
//! Conversion from a CAD host's native geometry into these types happens
//! outside this crate.

mod coordinate_system;
mod edge;
mod region;
mod vector;

pub use coordinate_system::CoordinateSystem;
pub use edge::Edge;
pub use region::{Contour, Region};
pub use vector::{Parallel, Point3, Vector3};
