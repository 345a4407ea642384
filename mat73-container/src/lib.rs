//! # mat73-container
//!
//! The hierarchical container engine interface used by `mat73-rs`, plus an
//! in-memory engine that implements it.
//!
//! The container model is the one HDF5 exposes: named groups holding
//! n-dimensional datasets and other groups, typed attributes on both, and
//! object references that can be stored inside datasets. Dataset shapes are
//! row-major (C order).
//!
//! ## Handles
//!
//! Objects are addressed through [`ObjectId`] handles. Each handle returned
//! by a `create_*`, `open_*` or [`Container::dereference`] call must be
//! released with [`Container::close`]. [`MemContainer::open_handles`] reports
//! how many are outstanding.
//!
//! ## Example
//!
//! ```
//! use mat73_container::{AttrValue, Container, MemContainer};
//!
//! let mut c = MemContainer::new();
//! let root = c.root();
//! let group = c.create_group(root, "s")?;
//! c.create_attribute(group, "MATLAB_class", &AttrValue::Str("struct".into()))?;
//! c.close(group)?;
//!
//! assert_eq!(c.list("/")?, vec!["s"]);
//! # Ok::<(), mat73_container::ContainerError>(())
//! ```

#![deny(missing_docs)]

mod buffer;
mod container;
mod error;
mod memory;
mod types;

pub use buffer::{Buffer, Element};
pub use container::{Container, has_child};
pub use error::{ContainerError, Result};
pub use memory::{MemContainer, Op};
pub use types::{
    AttrValue, CompoundField, ElementType, NativeType, ObjectId, ObjectKind, ObjectRef,
};
