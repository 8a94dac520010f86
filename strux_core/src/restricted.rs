//! # Restricted Value Types
//!
//! Validated scalar wrappers and closed vocabularies used by entity
//! attributes. The interchange schema bounds most numeric attributes; these
//! types reject out-of-range values when they are created, so a valid model can
//! never produce an invalid document.
//!
//! Scalars serialize as plain numbers (`#[serde(try_from = "f64")]`), and
//! vocabularies serialize as the exact tokens used in the interchange format.
//!
//! ## Example
//!
//! ```rust
//! use strux_core::restricted::{AbsMax1e20, BarType};
//!
//! let ecc = AbsMax1e20::new(-0.25)?;
//! assert_eq!(ecc.value(), -0.25);
//! assert!(AbsMax1e20::new(f64::INFINITY).is_err());
//!
//! let t: BarType = "column".parse()?;
//! assert_eq!(t, BarType::Column);
//! # Ok::<(), strux_core::errors::StruxError>(())
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{StruxError, StruxResult};

// ============================================================================
// Bounded scalars (macro to reduce boilerplate)
// ============================================================================

macro_rules! restricted_f64 {
    ($(#[$doc:meta])* $type:ident, $min:expr, $max:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
        #[serde(try_from = "f64", into = "f64")]
        pub struct $type(f64);

        impl $type {
            pub const MIN: f64 = $min;
            pub const MAX: f64 = $max;

            /// Validate and wrap a raw value
            pub fn new(value: f64) -> StruxResult<Self> {
                if !value.is_finite() || value < Self::MIN || value > Self::MAX {
                    return Err(StruxError::invalid_input(
                        stringify!($type),
                        value.to_string(),
                        format!("value must be within [{:e}, {:e}]", Self::MIN, Self::MAX),
                    ));
                }
                Ok(Self(value))
            }

            /// Get the raw f64 value
            pub fn value(self) -> f64 {
                self.0
            }

            /// Wrap a constant known to be in range
            pub(crate) const fn from_const(value: f64) -> Self {
                Self(value)
            }
        }

        impl TryFrom<f64> for $type {
            type Error = StruxError;
            fn try_from(value: f64) -> StruxResult<Self> {
                Self::new(value)
            }
        }

        impl From<$type> for f64 {
            fn from(v: $type) -> f64 {
                v.0
            }
        }

        impl fmt::Display for $type {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

restricted_f64!(
    /// Magnitude bounded by `|v| ≤ 1e20` (load values, eccentricities)
    AbsMax1e20,
    -1e20,
    1e20
);

restricted_f64!(
    /// Non-negative value up to `1e15` (spring stiffnesses)
    NonNegMax1e15,
    0.0,
    1e15
);

restricted_f64!(
    /// Non-negative value up to `1e5` (thickness, mesh size, section constants)
    NonNegMax1e5,
    0.0,
    1e5
);

restricted_f64!(
    /// Ratio in `[0, 1]`
    Ratio01,
    0.0,
    1.0
);

impl AbsMax1e20 {
    pub const ZERO: AbsMax1e20 = AbsMax1e20(0.0);
}

impl NonNegMax1e15 {
    pub const ZERO: NonNegMax1e15 = NonNegMax1e15(0.0);
}

impl NonNegMax1e5 {
    pub const ZERO: NonNegMax1e5 = NonNegMax1e5(0.0);
}

impl Ratio01 {
    pub const ONE: Ratio01 = Ratio01(1.0);
}

impl Default for AbsMax1e20 {
    fn default() -> Self {
        AbsMax1e20::ZERO
    }
}

// ============================================================================
// Closed vocabularies
// ============================================================================

macro_rules! vocabulary {
    ($(#[$doc:meta])* $type:ident { $($variant:ident => $token:literal),+ $(,)? }) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $type {
            $(
                #[serde(rename = $token)]
                $variant,
            )+
        }

        impl $type {
            pub const ALL: &'static [$type] = &[$($type::$variant),+];

            /// Token used in the interchange format
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($type::$variant => $token,)+
                }
            }
        }

        impl FromStr for $type {
            type Err = StruxError;

            fn from_str(s: &str) -> StruxResult<Self> {
                match s {
                    $($token => Ok($type::$variant),)+
                    other => Err(StruxError::invalid_input(
                        stringify!($type),
                        other,
                        format!(
                            "expected one of: {}",
                            [$($token),+].join(", ")
                        ),
                    )),
                }
            }
        }

        impl fmt::Display for $type {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

vocabulary!(
    /// Structural type of a bar
    BarType {
        Beam => "beam",
        Column => "column",
        Truss => "truss",
    }
);

vocabulary!(
    /// Structural type of a slab or panel
    SlabType {
        Plate => "plate",
        Wall => "wall",
    }
);

vocabulary!(
    /// Vertical alignment of a shell relative to its region
    VerticalAlign {
        Top => "top",
        Center => "center",
        Bottom => "bottom",
    }
);

vocabulary!(
    /// Manufacturing method of a steel bar
    SteelMade {
        Rolled => "rolled",
        ColdWorked => "cold_worked",
        Welded => "welded",
    }
);

vocabulary!(
    LoadCaseType {
        Static => "static",
        DeadLoad => "dead_load",
        Shrinkage => "shrinkage",
        Prestressing => "prestressing",
        Fire => "fire",
        Deviation => "deviation",
        Notional => "notional",
    }
);

vocabulary!(
    /// Load duration class
    DurationClass {
        Permanent => "permanent",
        LongTerm => "long-term",
        MediumTerm => "medium-term",
        ShortTerm => "short-term",
        Instantaneous => "instantaneous",
    }
);

vocabulary!(
    ForceLoadType {
        Force => "force",
        Moment => "moment",
    }
);

vocabulary!(
    /// Limit state of a load combination
    LoadCombType {
        UltimateOrdinary => "ultimate_ordinary",
        UltimateAccidental => "ultimate_accidental",
        UltimateSeismic => "ultimate_seismic",
        ServiceabilityQuasiPermanent => "serviceability_quasi_permanent",
        ServiceabilityFrequent => "serviceability_frequent",
        ServiceabilityCharacteristic => "serviceability_characteristic",
    }
);

vocabulary!(
    /// Engine module targeted by a user command
    UserModule {
        Resmode => "RESMODE",
        Rcdesign => "RCDESIGN",
        Steeldesign => "STEELDESIGN",
        Timberdesign => "TIMBERDESIGN",
    }
);

vocabulary!(
    /// Material family; also the element name of the material's property block
    MaterialFamily {
        Steel => "steel",
        Concrete => "concrete",
        Timber => "timber",
        Custom => "custom",
    }
);

vocabulary!(
    /// Direction in which a spring detaches (carries no force)
    DetachType {
        XTension => "x_tens",
        XCompression => "x_comp",
        YTension => "y_tens",
        YCompression => "y_comp",
        ZTension => "z_tens",
        ZCompression => "z_comp",
    }
);

impl Default for VerticalAlign {
    fn default() -> Self {
        VerticalAlign::Center
    }
}

impl Default for DurationClass {
    fn default() -> Self {
        DurationClass::Permanent
    }
}
