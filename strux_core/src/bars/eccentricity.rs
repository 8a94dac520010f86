use serde::{Deserialize, Serialize};

use crate::errors::StruxResult;
use crate::restricted::AbsMax1e20;

/// Offset of a bar section from its analytical axis, in local y and z [m]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Eccentricity {
    pub y: AbsMax1e20,
    pub z: AbsMax1e20,
}

impl Eccentricity {
    pub fn new(y: f64, z: f64) -> StruxResult<Self> {
        Ok(Eccentricity {
            y: AbsMax1e20::new(y)?,
            z: AbsMax1e20::new(z)?,
        })
    }
}

/// Analytical and physical eccentricities at both ends of a bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelEccentricity {
    pub use_default_physical_alignment: bool,
    pub analytical: [Eccentricity; 2],
    pub physical: [Eccentricity; 2],
}

impl ModelEccentricity {
    /// Mirror the end eccentricities into both components
    pub fn from_ends(ends: [Eccentricity; 2]) -> Self {
        ModelEccentricity {
            use_default_physical_alignment: true,
            analytical: ends,
            physical: ends,
        }
    }
}
