//! Error types for scene snapshots.

use thiserror::Error;

/// Top-level error type for scene loading and validation.
#[derive(Debug, Error)]
pub enum SceneError {
    /// An id refers past the end of its arena.
    #[error("{owner}: {kind} id {id} is out of range ({len} available)")]
    DanglingId {
        /// Where the reference was found.
        owner: String,
        /// Arena name (object, collection, material, image).
        kind: &'static str,
        /// Offending id.
        id: usize,
        /// Arena length.
        len: usize,
    },

    /// An element index inside an object's data is out of range.
    #[error("{owner}: {what} index {index} is out of range ({len} available)")]
    IndexOutOfRange {
        /// Object name.
        owner: String,
        /// Element description (e.g. "polygon 3 vertex").
        what: String,
        /// Offending index.
        index: usize,
        /// Number of elements.
        len: usize,
    },

    /// Object parent links form a cycle.
    #[error("object '{0}' is part of a parent cycle")]
    ParentCycle(String),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl SceneError {
    pub(crate) fn dangling(owner: impl Into<String>, kind: &'static str, id: usize, len: usize) -> Self {
        SceneError::DanglingId {
            owner: owner.into(),
            kind,
            id,
            len,
        }
    }

    pub(crate) fn out_of_range(
        owner: impl Into<String>,
        what: impl Into<String>,
        index: usize,
        len: usize,
    ) -> Self {
        SceneError::IndexOutOfRange {
            owner: owner.into(),
            what: what.into(),
            index,
            len,
        }
    }
}
