//! # Error Types
//!
//! Structured error types for strux_core. Validation errors are raised at the
//! point of construction or assignment and describe a broken caller contract;
//! only the external-engine variants are expected to cross a process boundary.
//!
//! ## Example
//!
//! ```rust
//! use strux_core::errors::{StruxError, StruxResult};
//!
//! fn validate_mesh_size(size: f64) -> StruxResult<()> {
//!     if size <= 0.0 {
//!         return Err(StruxError::invalid_input(
//!             "mesh_size",
//!             size.to_string(),
//!             "Mesh size must be positive",
//!         ));
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for strux_core operations
pub type StruxResult<T> = Result<T, StruxError>;

/// Structured error type for model, serializer and engine operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum StruxError {
    /// A zero-length vector was normalized
    #[error("Degenerate vector ({x}, {y}, {z}) cannot be normalized")]
    DegenerateVector { x: f64, y: f64, z: f64 },

    /// A coordinate system is missing an axis or has a degenerate one
    #[error("Incomplete coordinate system: {reason}")]
    IncompleteFrame { reason: String },

    /// Axes that must be perpendicular are not
    #[error("Orthogonality violated: {reason} (dot product {dot})")]
    Orthogonality { reason: String, dot: f64 },

    /// A multi-valued attribute received the wrong number of items
    #[error("Incorrect length of {field}: {actual}, expected {expected}")]
    Arity {
        field: String,
        actual: usize,
        expected: String,
    },

    /// The start and end sections of a bar differ
    #[error("Bar '{bar}' has two different sections; no uniform section exists")]
    NonUniformSection { bar: String },

    /// An edge index is outside the region's edge range
    #[error("Index {index} is out of bounds for {count} edges")]
    IndexOutOfRange { index: usize, count: usize },

    /// A batch-script path does not carry the required extension
    #[error("Incorrect file extension for '{path}': expected .{expected}")]
    InvalidScriptExtension { path: String, expected: String },

    /// The external engine exited unsuccessfully or left out an artifact
    #[error("External engine failed (exit code {exit_code:?}): {reason}")]
    ExternalEngine {
        exit_code: Option<i32>,
        reason: String,
        output: String,
    },

    /// The external engine did not finish in time and was terminated
    #[error("External engine timed out after {timeout_secs} s")]
    ExternalEngineTimeout { timeout_secs: u64, output: String },

    /// An input value is invalid (out of range, wrong vocabulary, type rule)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// Geometry does not satisfy an entity's shape rule
    #[error("Invalid geometry: {reason}")]
    InvalidGeometry { reason: String },

    /// A referenced entity is not present in the model
    #[error("Dangling reference: {kind} {id} not found")]
    DanglingReference { kind: String, id: String },

    /// Malformed XML
    #[error("XML parse error: {reason}")]
    XmlParse { reason: String },

    /// Children of an element are not in schema order, or are unknown
    #[error("Schema order violated in <{parent}>: {reason}")]
    SchemaOrder { parent: String, reason: String },

    /// A required element is missing
    #[error("Missing element <{element}> in <{parent}>")]
    MissingElement { element: String, parent: String },

    /// A required attribute is missing
    #[error("Missing attribute '{attribute}' on <{element}>")]
    MissingAttribute { attribute: String, element: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// File is locked by another user/process
    #[error("File locked: '{path}' is locked by {locked_by} since {locked_at}")]
    FileLocked {
        path: String,
        locked_by: String,
        locked_at: String,
    },

    /// Serialization/deserialization error outside the XML reader
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Document version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl StruxError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        StruxError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an InvalidGeometry error
    pub fn invalid_geometry(reason: impl Into<String>) -> Self {
        StruxError::InvalidGeometry { reason: reason.into() }
    }

    /// Create an IncompleteFrame error
    pub fn incomplete_frame(reason: impl Into<String>) -> Self {
        StruxError::IncompleteFrame { reason: reason.into() }
    }

    /// Create an Orthogonality error carrying the measured dot product
    pub fn orthogonality(reason: impl Into<String>, dot: f64) -> Self {
        StruxError::Orthogonality {
            reason: reason.into(),
            dot,
        }
    }

    /// Create an Arity error
    pub fn arity(field: impl Into<String>, actual: usize, expected: impl Into<String>) -> Self {
        StruxError::Arity {
            field: field.into(),
            actual,
            expected: expected.into(),
        }
    }

    /// Create a DanglingReference error
    pub fn dangling(kind: impl Into<String>, id: impl ToString) -> Self {
        StruxError::DanglingReference {
            kind: kind.into(),
            id: id.to_string(),
        }
    }

    /// Create an XmlParse error
    pub fn xml(reason: impl Into<String>) -> Self {
        StruxError::XmlParse { reason: reason.into() }
    }

    /// Create a SchemaOrder error
    pub fn schema_order(parent: impl Into<String>, reason: impl Into<String>) -> Self {
        StruxError::SchemaOrder {
            parent: parent.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingElement error
    pub fn missing_element(element: impl Into<String>, parent: impl Into<String>) -> Self {
        StruxError::MissingElement {
            element: element.into(),
            parent: parent.into(),
        }
    }

    /// Create a MissingAttribute error
    pub fn missing_attribute(attribute: impl Into<String>, element: impl Into<String>) -> Self {
        StruxError::MissingAttribute {
            attribute: attribute.into(),
            element: element.into(),
        }
    }

    /// Create an ExternalEngine error
    pub fn external_engine(exit_code: Option<i32>, reason: impl Into<String>, output: impl Into<String>) -> Self {
        StruxError::ExternalEngine {
            exit_code,
            reason: reason.into(),
            output: output.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        StruxError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileLocked error
    pub fn file_locked(path: impl Into<String>, locked_by: impl Into<String>, locked_at: impl Into<String>) -> Self {
        StruxError::FileLocked {
            path: path.into(),
            locked_by: locked_by.into(),
            locked_at: locked_at.into(),
        }
    }

    /// Check if this error is one a caller may sensibly retry.
    ///
    /// Everything else is a contract violation that a retry cannot fix.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            StruxError::FileLocked { .. }
                | StruxError::ExternalEngine { .. }
                | StruxError::ExternalEngineTimeout { .. }
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            StruxError::DegenerateVector { .. } => "DEGENERATE_VECTOR",
            StruxError::IncompleteFrame { .. } => "INCOMPLETE_FRAME",
            StruxError::Orthogonality { .. } => "ORTHOGONALITY",
            StruxError::Arity { .. } => "ARITY",
            StruxError::NonUniformSection { .. } => "NON_UNIFORM_SECTION",
            StruxError::IndexOutOfRange { .. } => "INDEX_OUT_OF_RANGE",
            StruxError::InvalidScriptExtension { .. } => "INVALID_SCRIPT_EXTENSION",
            StruxError::ExternalEngine { .. } => "EXTERNAL_ENGINE",
            StruxError::ExternalEngineTimeout { .. } => "EXTERNAL_ENGINE_TIMEOUT",
            StruxError::InvalidInput { .. } => "INVALID_INPUT",
            StruxError::InvalidGeometry { .. } => "INVALID_GEOMETRY",
            StruxError::DanglingReference { .. } => "DANGLING_REFERENCE",
            StruxError::XmlParse { .. } => "XML_PARSE",
            StruxError::SchemaOrder { .. } => "SCHEMA_ORDER",
            StruxError::MissingElement { .. } => "MISSING_ELEMENT",
            StruxError::MissingAttribute { .. } => "MISSING_ATTRIBUTE",
            StruxError::FileError { .. } => "FILE_ERROR",
            StruxError::FileLocked { .. } => "FILE_LOCKED",
            StruxError::SerializationError { .. } => "SERIALIZATION_ERROR",
            StruxError::VersionMismatch { .. } => "VERSION_MISMATCH",
            StruxError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}
