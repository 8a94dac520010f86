//! # Shells
//!
//! Plates, walls and panels. A [`Slab`] owns one [`SlabPart`] holding its
//! region, thickness field and shell properties. A [`Panel`] is a shell
//! with a continuous analytical model.
//!
//! Shells are value types: every setter returns an updated copy.
//!
//! ## Example
//!
//! ```rust
//! use strux_core::entity::{EntityId, NamingSequence};
//! use strux_core::geometry::{Point3, Region, Vector3};
//! use strux_core::releases::ShellEdgeConnection;
//! use strux_core::shells::{LocationValue, ShellProperties, Slab};
//!
//! let mut names = NamingSequence::new();
//! let region = Region::rectangle(Point3::ORIGIN, Vector3::new(6.0, 0.0, 0.0), Vector3::new(0.0, 4.0, 0.0))?;
//! let thickness = LocationValue::uniform(&region, 0.2)?;
//!
//! let plate = Slab::plate(&mut names, region, thickness, EntityId::new(), ShellProperties::default())?;
//! let hinged = plate.set_shell_edge_connection(ShellEdgeConnection::hinged(), &[0])?;
//!
//! assert_eq!(plate.name(), "P.1");
//! assert_eq!(plate.edge_connections()[0], ShellEdgeConnection::rigid());
//! assert_eq!(hinged.edge_connections()[0], ShellEdgeConnection::hinged());
//! # Ok::<(), strux_core::errors::StruxError>(())
//! ```

mod panel;
mod properties;
mod slab;

pub use panel::{Panel, PanelParts, PANEL_PREFIX};
pub use properties::{LocationValue, ShellEccentricity, ShellOrthotropy, ShellProperties};
pub use slab::{Slab, SlabPart};
