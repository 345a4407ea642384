//! Error types for MAT v7.3 mapping operations.
//!
//! This module provides the [`Error`] enum covering both malformed
//! [`Variable`](crate::Variable)s, which are rejected before anything is
//! written, and failures reported by the container engine, which carry the
//! path of the object being written or read.

use mat73_container::ContainerError;
use thiserror::Error;

/// Result type alias for MAT v7.3 operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while encoding or decoding variables.
#[derive(Error, Debug)]
pub enum Error {
    /// A variable or field has an empty name.
    #[error("Variable name must not be empty")]
    EmptyName,

    /// A name contains a character the container cannot store.
    #[error("Invalid variable name: '{name}'")]
    InvalidName {
        /// The rejected name.
        name: String,
    },

    /// Two siblings share a name.
    #[error("Duplicate name '{name}' in '{scope}'")]
    DuplicateName {
        /// The repeated name.
        name: String,
        /// Where the collision occurs.
        scope: String,
    },

    /// The variable has no class to encode.
    #[error("Variable '{name}' has no class")]
    MissingClass {
        /// Variable name.
        name: String,
    },

    /// The class has no encoding in this layer.
    #[error("Class '{class}' of variable '{name}' cannot be encoded")]
    UnsupportedClass {
        /// Variable name.
        name: String,
        /// Class tag name.
        class: String,
    },

    /// A dimension vector is empty or holds a zero.
    #[error("Invalid dimensions {dims:?} for variable '{name}'")]
    InvalidDimensions {
        /// Variable name.
        name: String,
        /// The rejected dimensions.
        dims: Vec<usize>,
    },

    /// A struct payload cannot be split evenly across its elements.
    #[error("Struct '{name}' has {fields} values for {elements} elements")]
    FieldCountMismatch {
        /// Struct name.
        name: String,
        /// Length of the field payload.
        fields: usize,
        /// Product of the struct's dimensions.
        elements: usize,
    },

    /// A struct element lists its fields in a different order than the first.
    #[error("Struct '{name}' element {element} has field '{found}', expected '{expected}'")]
    FieldLayoutMismatch {
        /// Struct name.
        name: String,
        /// Zero-based element index.
        element: usize,
        /// Field name from the first element.
        expected: String,
        /// Field name found instead.
        found: String,
    },

    /// The payload does not fit the class or dimensions.
    #[error("Payload of '{name}' does not match its header: {reason}")]
    PayloadMismatch {
        /// Variable name.
        name: String,
        /// What is wrong.
        reason: String,
    },

    /// The payload's element encoding differs from the declared storage type.
    #[error("Variable '{name}' declares {declared} storage but holds {found} values")]
    StorageMismatch {
        /// Variable name.
        name: String,
        /// Declared storage type.
        declared: String,
        /// Native type of the payload buffer.
        found: String,
    },

    /// The storage type has no encoding for this class.
    #[error("Variable '{name}' cannot be stored as {storage}")]
    UnsupportedStorage {
        /// Variable name.
        name: String,
        /// Storage type name.
        storage: String,
    },

    /// The container engine failed.
    #[error("Container error at '{object}': {source}")]
    Container {
        /// Path of the object being written or read.
        object: String,
        /// Underlying engine error.
        #[source]
        source: ContainerError,
    },
}

impl Error {
    /// Create a Container error for the given object path.
    pub fn container(object: impl Into<String>, source: ContainerError) -> Self {
        Self::Container {
            object: object.into(),
            source,
        }
    }

    /// Create a PayloadMismatch error.
    pub fn payload_mismatch(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::PayloadMismatch {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create an UnsupportedClass error.
    pub fn unsupported_class(name: impl Into<String>, class: impl Into<String>) -> Self {
        Self::UnsupportedClass {
            name: name.into(),
            class: class.into(),
        }
    }

    /// Check whether this is a precondition failure rather than an engine one.
    pub fn is_precondition(&self) -> bool {
        !matches!(self, Error::Container { .. })
    }
}

/// Attach an object path to engine results.
pub(crate) trait ContainerContext<T> {
    /// Wrap an engine error with the path it concerns.
    fn at(self, object: impl AsRef<str>) -> Result<T>;
}

impl<T> ContainerContext<T> for std::result::Result<T, ContainerError> {
    fn at(self, object: impl AsRef<str>) -> Result<T> {
        self.map_err(|e| Error::container(object.as_ref(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::FieldCountMismatch {
            name: "s".into(),
            fields: 5,
            elements: 2,
        };
        assert!(err.to_string().contains("5 values for 2 elements"));

        let err = Error::unsupported_class("c", "cell");
        assert!(err.to_string().contains("'cell'"));
    }

    #[test]
    fn test_container_context() {
        let raw: std::result::Result<(), ContainerError> =
            Err(ContainerError::not_found("/x"));
        let err = raw.at("/s/x").unwrap_err();

        assert!(!err.is_precondition());
        match err {
            Error::Container { object, .. } => assert_eq!(object, "/s/x"),
            other => panic!("Expected Container, got {:?}", other),
        }
    }

    #[test]
    fn test_precondition_kinds() {
        assert!(Error::EmptyName.is_precondition());
        assert!(Error::payload_mismatch("x", "short").is_precondition());
    }
}
