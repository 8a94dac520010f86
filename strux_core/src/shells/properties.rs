use serde::{Deserialize, Serialize};

use crate::errors::{StruxError, StruxResult};
use crate::geometry::{Point3, Region};
use crate::releases::ShellEdgeConnection;
use crate::restricted::{AbsMax1e20, NonNegMax1e5, Ratio01, VerticalAlign};

/// A value attached to a point, e.g. a thickness sample [m]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationValue {
    pub point: Point3,
    pub value: NonNegMax1e5,
}

impl LocationValue {
    pub fn new(point: Point3, value: f64) -> StruxResult<Self> {
        Ok(LocationValue {
            point,
            value: NonNegMax1e5::new(value)?,
        })
    }

    /// One sample at the region origin
    pub fn uniform(region: &Region, value: f64) -> StruxResult<Vec<Self>> {
        Ok(vec![LocationValue::new(region.coordinate_system().origin(), value)?])
    }
}

/// Offset of a shell's mid-surface from its region
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShellEccentricity {
    pub alignment: VerticalAlign,
    pub eccentricity: AbsMax1e20,
    pub eccentricity_calculation: bool,
    pub eccentricity_by_cracking: bool,
}

impl ShellEccentricity {
    pub fn new(alignment: VerticalAlign, eccentricity: f64, calculation: bool, by_cracking: bool) -> StruxResult<Self> {
        Ok(ShellEccentricity {
            alignment,
            eccentricity: AbsMax1e20::new(eccentricity)?,
            eccentricity_calculation: calculation,
            eccentricity_by_cracking: by_cracking,
        })
    }
}

impl Default for ShellEccentricity {
    fn default() -> Self {
        ShellEccentricity {
            alignment: VerticalAlign::Center,
            eccentricity: AbsMax1e20::ZERO,
            eccentricity_calculation: false,
            eccentricity_by_cracking: false,
        }
    }
}

/// Orthotropic stiffness of a shell
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShellOrthotropy {
    /// Direction of E1 from local x [deg]
    pub orthotropic_direction: f64,
    /// E2/E1
    pub e2_over_e1: Ratio01,
}

impl ShellOrthotropy {
    pub fn new(orthotropic_direction: f64, e2_over_e1: f64) -> StruxResult<Self> {
        if !orthotropic_direction.is_finite() || orthotropic_direction.abs() > 360.0 {
            return Err(StruxError::invalid_input(
                "orthotropic_direction",
                orthotropic_direction.to_string(),
                "angle must be within [-360, 360] degrees",
            ));
        }
        Ok(ShellOrthotropy {
            orthotropic_direction,
            e2_over_e1: Ratio01::new(e2_over_e1)?,
        })
    }
}

impl Default for ShellOrthotropy {
    fn default() -> Self {
        ShellOrthotropy {
            orthotropic_direction: 0.0,
            e2_over_e1: Ratio01::ONE,
        }
    }
}

/// Shell settings applied when a slab is created
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ShellProperties {
    /// Connection given to every edge of the region
    pub edge_connection: ShellEdgeConnection,
    pub eccentricity: ShellEccentricity,
    pub orthotropy: ShellOrthotropy,
}
