//! # Releases
//!
//! Stiffness and connection conditions: spring pairs, motion/rotation
//! releases, shell edge connections and bar-end connectivity.
//!
//! Stiffness values are in kN/m (motions) and kNm/rad (rotations), or per
//! metre for line-type releases.

use serde::{Deserialize, Serialize};

use crate::errors::StruxResult;
use crate::restricted::{DetachType, NonNegMax1e15};

/// Rigid stiffness of a point-type release
pub const RIGID_POINT: f64 = 1e10;
/// Rigid stiffness of a line-type release
pub const RIGID_LINE: f64 = 1e7;

/// Compression (`neg`) / tension (`pos`) spring pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StiffBase {
    pub neg: NonNegMax1e15,
    pub pos: NonNegMax1e15,
}

impl StiffBase {
    pub fn new(neg: f64, pos: f64) -> StruxResult<Self> {
        Ok(StiffBase {
            neg: NonNegMax1e15::new(neg)?,
            pos: NonNegMax1e15::new(pos)?,
        })
    }

    /// Same stiffness in compression and tension
    pub fn symmetric(value: f64) -> StruxResult<Self> {
        StiffBase::new(value, value)
    }

    pub fn free() -> Self {
        StiffBase {
            neg: NonNegMax1e15::ZERO,
            pos: NonNegMax1e15::ZERO,
        }
    }
}

// ============================================================================
// Motions / Rotations
// ============================================================================

macro_rules! directional_stiffness {
    ($(#[$doc:meta])* $type:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
        pub struct $type {
            pub x: StiffBase,
            pub y: StiffBase,
            pub z: StiffBase,
        }

        impl $type {
            /// Define from six compression/tension stiffnesses
            pub fn define(x_neg: f64, x_pos: f64, y_neg: f64, y_pos: f64, z_neg: f64, z_pos: f64) -> StruxResult<Self> {
                Ok($type {
                    x: StiffBase::new(x_neg, x_pos)?,
                    y: StiffBase::new(y_neg, y_pos)?,
                    z: StiffBase::new(z_neg, z_pos)?,
                })
            }

            fn uniform(value: NonNegMax1e15) -> Self {
                let s = StiffBase { neg: value, pos: value };
                $type { x: s, y: s, z: s }
            }

            /// Rigid point-type release (1e10)
            pub fn rigid_point() -> Self {
                Self::uniform(NonNegMax1e15::from_const(RIGID_POINT))
            }

            /// Rigid line-type release (1e7)
            pub fn rigid_line() -> Self {
                Self::uniform(NonNegMax1e15::from_const(RIGID_LINE))
            }

            pub fn free() -> Self {
                Self::uniform(NonNegMax1e15::ZERO)
            }

            /// Components in interchange order: x_neg, x_pos, y_neg, y_pos, z_neg, z_pos
            pub fn components(&self) -> [(&'static str, f64); 6] {
                [
                    ("x_neg", self.x.neg.value()),
                    ("x_pos", self.x.pos.value()),
                    ("y_neg", self.y.neg.value()),
                    ("y_pos", self.y.pos.value()),
                    ("z_neg", self.z.neg.value()),
                    ("z_pos", self.z.pos.value()),
                ]
            }
        }
    };
}

directional_stiffness!(
    /// Translational release stiffnesses
    Motions
);

directional_stiffness!(
    /// Rotational release stiffnesses
    Rotations
);

/// Motions and rotations of a release
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rigidity {
    pub motions: Motions,
    pub rotations: Rotations,
}

// ============================================================================
// Shell edge connections
// ============================================================================

/// Connection condition of one shell edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShellEdgeConnection {
    pub rigidity: Rigidity,
    /// Predefined release name, if any
    pub release_name: Option<String>,
}

impl ShellEdgeConnection {
    pub fn new(rigidity: Rigidity) -> Self {
        ShellEdgeConnection {
            rigidity,
            release_name: None,
        }
    }

    pub fn rigid() -> Self {
        ShellEdgeConnection {
            rigidity: Rigidity {
                motions: Motions::rigid_line(),
                rotations: Rotations::rigid_line(),
            },
            release_name: Some("Rigid".to_string()),
        }
    }

    pub fn hinged() -> Self {
        ShellEdgeConnection {
            rigidity: Rigidity {
                motions: Motions::rigid_line(),
                rotations: Rotations::free(),
            },
            release_name: Some("Hinged".to_string()),
        }
    }
}

impl Default for ShellEdgeConnection {
    fn default() -> Self {
        ShellEdgeConnection::rigid()
    }
}

// ============================================================================
// Bar connectivity
// ============================================================================

/// Springs in the interchange order mov_x, rot_x, mov_y, rot_y, mov_z, rot_z
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimpleStiffness {
    pub mov_x: StiffBase,
    pub rot_x: StiffBase,
    pub mov_y: StiffBase,
    pub rot_y: StiffBase,
    pub mov_z: StiffBase,
    pub rot_z: StiffBase,
    pub detach: Option<DetachType>,
}

impl SimpleStiffness {
    /// Element names with their springs, in interchange order
    pub fn entries(&self) -> [(&'static str, StiffBase); 6] {
        [
            ("mov_x", self.mov_x),
            ("rot_x", self.rot_x),
            ("mov_y", self.mov_y),
            ("rot_y", self.rot_y),
            ("mov_z", self.mov_z),
            ("rot_z", self.rot_z),
        ]
    }
}

/// Bar-end connectivity. `true` means the degree of freedom is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Connectivity {
    pub m_x: bool,
    pub m_y: bool,
    pub m_z: bool,
    pub r_x: bool,
    pub r_y: bool,
    pub r_z: bool,
    /// Semi-rigid springs on the released degrees of freedom
    pub springs: Option<SimpleStiffness>,
}

impl Connectivity {
    pub fn rigid() -> Self {
        Connectivity {
            m_x: true,
            m_y: true,
            m_z: true,
            r_x: true,
            r_y: true,
            r_z: true,
            springs: None,
        }
    }

    /// Bending released, torsion fixed
    pub fn hinged() -> Self {
        Connectivity {
            r_y: false,
            r_z: false,
            ..Connectivity::rigid()
        }
    }

    /// Flags in interchange order
    pub fn flags(&self) -> [(&'static str, bool); 6] {
        [
            ("m_x", self.m_x),
            ("m_y", self.m_y),
            ("m_z", self.m_z),
            ("r_x", self.r_x),
            ("r_y", self.r_y),
            ("r_z", self.r_z),
        ]
    }
}

impl Default for Connectivity {
    fn default() -> Self {
        Connectivity::rigid()
    }
}
