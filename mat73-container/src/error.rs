//! Error types for container engine operations.

use thiserror::Error;

use crate::types::ObjectId;

/// Result type alias for container operations.
pub type Result<T> = std::result::Result<T, ContainerError>;

/// Errors reported by a container engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContainerError {
    /// No object exists at the given path.
    #[error("No object at '{path}'")]
    NotFound {
        /// Path that was looked up.
        path: String,
    },

    /// An object with this name already exists in the scope.
    #[error("Object already exists: '{path}'")]
    AlreadyExists {
        /// Path of the existing object.
        path: String,
    },

    /// The object is not a group.
    #[error("Not a group: '{path}'")]
    NotAGroup {
        /// Path of the object.
        path: String,
    },

    /// The object is not a dataset.
    #[error("Not a dataset: '{path}'")]
    NotADataset {
        /// Path of the object.
        path: String,
    },

    /// The handle was never issued or has been closed.
    #[error("Invalid or closed handle {id}")]
    InvalidHandle {
        /// The offending handle.
        id: ObjectId,
    },

    /// A buffer does not fit the dataset it is written to.
    #[error("Shape mismatch: expected {expected} values, found {found}")]
    ShapeMismatch {
        /// Values the dataset holds.
        expected: usize,
        /// Values the buffer holds.
        found: usize,
    },

    /// A buffer's element type cannot be stored in the dataset.
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// Dataset element type.
        expected: String,
        /// Buffer element type.
        found: String,
    },

    /// A child name is empty or contains a path separator.
    #[error("Invalid object name: '{name}'")]
    InvalidName {
        /// The rejected name.
        name: String,
    },

    /// A fault injected into the in-memory engine.
    #[error("Injected fault in {op}")]
    InjectedFault {
        /// Operation that was made to fail.
        op: &'static str,
    },
}

impl ContainerError {
    /// Create a NotFound error.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Create an AlreadyExists error.
    pub fn already_exists(path: impl Into<String>) -> Self {
        Self::AlreadyExists { path: path.into() }
    }

    /// Create a NotAGroup error.
    pub fn not_a_group(path: impl Into<String>) -> Self {
        Self::NotAGroup { path: path.into() }
    }

    /// Create a NotADataset error.
    pub fn not_a_dataset(path: impl Into<String>) -> Self {
        Self::NotADataset { path: path.into() }
    }

    /// Create a TypeMismatch error.
    pub fn type_mismatch(expected: impl ToString, found: impl ToString) -> Self {
        Self::TypeMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }
}
