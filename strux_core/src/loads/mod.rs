//! Loads and load cases
//!
//! Loads reference their [`LoadCase`] by identity. Load cases and
//! combinations are stored once in the model and written once to the
//! document.
//!
//! # Overview
//!
//! - [`LoadCase`] - named case with type and duration class
//! - [`LoadCombination`] - factored load cases for one limit state
//! - [`PointLoad`] - concentrated force or moment
//! - [`SurfaceTemperatureLoad`] - top/bottom temperature over a region
//!
//! # Example
//!
//! ```
//! use strux_core::geometry::{Point3, Vector3};
//! use strux_core::loads::{LoadCase, PointLoad};
//!
//! let dead = LoadCase::dead_load("DL");
//! let load = PointLoad::force(dead.id(), Point3::new(2.0, 0.0, 3.0), Vector3::new(0.0, 0.0, -12.0), "")?;
//!
//! assert_eq!(load.load_case, dead.id());
//! assert_eq!(load.magnitude.value(), 12.0);
//! # Ok::<(), strux_core::errors::StruxError>(())
//! ```

pub mod load_case;
pub mod point_load;
pub mod surface_temperature;

pub use load_case::{LoadCase, LoadCombination};
pub use point_load::PointLoad;
pub use surface_temperature::{SurfaceTemperatureLoad, TopBotLocationValue};
