//! # Job Scripts and the External Engine
//!
//! A job is an [`FdScript`]: a header followed by commands the engine runs
//! in order. [`Engine`] stages the script, runs the engine as a child
//! process and hands back the result lists it wrote.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::{Path, PathBuf};
//! use strux_core::calculate::{Analysis, Engine, FdScript};
//! use strux_core::config::EngineConfig;
//!
//! let config = EngineConfig::from_env();
//! let script = FdScript::analysis(
//!     &config,
//!     Path::new("model.struxml"),
//!     Analysis::with_combinations(),
//!     None,
//!     &[PathBuf::from("bsc/reactions.bsc")],
//!     Path::new("results"),
//!     true,
//! )?;
//!
//! let output = Engine::new(config).run(&script)?;
//! for artifact in &output.artifacts {
//!     let bytes = artifact.read_bytes()?;
//!     println!("{}: {} bytes", artifact.path.display(), bytes.len());
//! }
//! # Ok::<(), strux_core::errors::StruxError>(())
//! ```

pub mod commands;
pub mod engine;
pub mod fdscript;

pub use commands::{
    Analysis, CmdCalculation, CmdEndSession, CmdListGen, CmdOpen, CmdSave, CmdUser, Command, Design, Font,
    BSC_EXTENSION,
};
pub use engine::{Engine, JobOutput, ResultArtifact};
pub use fdscript::{FdScript, FdScriptHeader, FDSCRIPT_VERSION};
