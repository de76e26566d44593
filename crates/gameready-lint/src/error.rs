//! Errors that can stop a scan before it starts.
//!
//! Once a scan is running nothing is fatal: check problems become findings.

use gameready_scene::SceneError;

/// Errors raised while preparing a scan.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// Single-object scope without an active (or named) object.
    #[error("no valid active object selected")]
    NoActiveObject,

    /// The named object does not exist.
    #[error("object '{0}' not found")]
    UnknownObject(String),

    /// The active object is neither a mesh nor an armature.
    #[error("object '{name}' has unsupported type {kind}")]
    UnsupportedObject {
        /// Object name.
        name: String,
        /// Host type name.
        kind: String,
    },

    /// Collection scope without a target collection.
    #[error("please select a collection to scan")]
    MissingCollection,

    /// The named collection does not exist.
    #[error("collection '{0}' not found")]
    UnknownCollection(String),

    /// Everything in scope was excluded or not a mesh.
    #[error("no valid objects found to scan")]
    NothingToScan,

    /// The scene snapshot is structurally invalid.
    #[error("invalid scene: {0}")]
    InvalidScene(#[from] SceneError),

    /// Failed to read a settings file.
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse a settings file.
    #[error("failed to parse settings: {0}")]
    Settings(#[from] serde_json::Error),
}

/// Errors raised by a report sink.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// Writing the report failed.
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
}
