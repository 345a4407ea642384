//! # mat73-rs
//!
//! Map MATLAB array values onto a hierarchical container in the MAT v7.3
//! layout, and read top-level variable headers back.
//!
//! A MAT v7.3 file is an HDF5 file with conventions on top: every variable
//! is a dataset or group under the root, tagged with its MATLAB class;
//! dimensions are stored reversed, since MATLAB is column-major and HDF5 is
//! row-major; and struct arrays keep their values in a shared `/#refs#`
//! group, reached through datasets of object references.
//!
//! This crate implements those conventions against the
//! [`Container`] interface from `mat73-container`. Opening files on disk
//! and the MAT file header block are left to the container implementation.
//!
//! ## Quick Start
//!
//! ```
//! use mat73_rs::{ClassTag, MatFile, MemContainer, Result, Variable};
//!
//! fn main() -> Result<()> {
//!     let mut mat = MatFile::new(MemContainer::new());
//!
//!     let samples = vec![0.0f32, 0.5, 1.0, 0.5];
//!     let signal = Variable::numeric("signal", ClassTag::Single, vec![1, 4], samples);
//!     let trials = Variable::structure(
//!         "trials",
//!         vec![1, 2],
//!         vec![
//!             Variable::string("label", "left"),
//!             Variable::string("label", "right"),
//!         ],
//!     );
//!     mat.write(&signal)?;
//!     mat.write(&trials.with_global(true))?;
//!
//!     while let Some(header) = mat.next_header()? {
//!         println!("{} {:?} {:?}", header.name(), header.class(), header.dims());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Layout
//!
//! | Value | Container object |
//! |-------|------------------|
//! | real numeric | dataset of the class's native type |
//! | complex numeric | dataset of a `real`/`imag` compound |
//! | char | 16- or 32-bit code-unit dataset, `MATLAB_int_decode = 2` |
//! | `1 x 1` struct | group with one child per field |
//! | struct array | group with one reference dataset per field |
//!
//! ## Feature Flags
//!
//! - `ndarray` (default): build variables from and into `ndarray` arrays
//!
//! ## Logging
//!
//! Object creation, rollbacks and skipped metadata are reported through
//! `tracing`. No subscriber is installed by this crate.

#![deny(missing_docs)]

mod class;
mod complex;
mod config;
mod decode;
mod dims;
mod encode;
mod error;
mod file;
pub mod metadata;
mod pool;
mod shared;
mod storage;
mod variable;

pub use class::ClassTag;
pub use complex::{
    complex_type, deinterleave, deinterleave_buffer, interleave, interleave_buffers,
    COMPLEX_MEMBERS,
};
pub use config::MatConfig;
pub use dims::{element_count, permute_dims};
pub use error::{Error, Result};
pub use file::{Headers, MatFile};
pub use shared::SharedMatFile;
pub use storage::StorageType;
pub use variable::{Payload, Variable};

pub use mat73_container::{
    AttrValue, Buffer, Container, ContainerError, Element, ElementType, MemContainer, NativeType,
    ObjectId, ObjectKind, ObjectRef, Op,
};

#[cfg(feature = "ndarray")]
pub use ndarray;
