//! The container engine capability interface.

use crate::buffer::Buffer;
use crate::error::Result;
use crate::types::{AttrValue, ElementType, ObjectId, ObjectKind, ObjectRef};

/// A hierarchical container of named groups, n-dimensional datasets and
/// typed attributes.
///
/// Scopes and objects are addressed through [`ObjectId`] handles. Every
/// handle returned by a `create_*` or `open_*` call is owned by the caller
/// and must be passed back to [`close`](Self::close) exactly once. The root
/// handle from [`root`](Self::root) is owned by the engine and is never
/// closed.
///
/// Paths starting with `/` resolve from the root; any other path resolves
/// from the given scope. Children are listed in creation order.
pub trait Container {
    /// The root group.
    fn root(&self) -> ObjectId;

    /// Create a new group named `name` under `scope`.
    fn create_group(&mut self, scope: ObjectId, name: &str) -> Result<ObjectId>;

    /// Open the group at `path`.
    ///
    /// Returns `Ok(None)` if nothing exists at `path`; an error if the
    /// object there is not a group.
    fn open_group(&mut self, scope: ObjectId, path: &str) -> Result<Option<ObjectId>>;

    /// Create a dataset of `element_type` with the given row-major `shape`.
    fn create_dataset(
        &mut self,
        scope: ObjectId,
        name: &str,
        element_type: &ElementType,
        shape: &[usize],
    ) -> Result<ObjectId>;

    /// Open the dataset at `path`.
    fn open_dataset(&mut self, scope: ObjectId, path: &str) -> Result<ObjectId>;

    /// Write the full contents of a dataset.
    ///
    /// Compound elements are passed flattened member by member. Numeric
    /// buffers of another native type are converted on the way in.
    fn write_dataset(&mut self, dataset: ObjectId, buffer: &Buffer) -> Result<()>;

    /// Read the full contents of a dataset in its stored element type.
    fn read_dataset(&self, dataset: ObjectId) -> Result<Buffer>;

    /// Row-major shape of a dataset.
    fn dataset_shape(&self, dataset: ObjectId) -> Result<Vec<usize>>;

    /// Element type of a dataset.
    fn dataset_type(&self, dataset: ObjectId) -> Result<ElementType>;

    /// Attach an attribute to a group or dataset.
    fn create_attribute(&mut self, object: ObjectId, name: &str, value: &AttrValue) -> Result<()>;

    /// Read an attribute.
    ///
    /// An absent attribute is `Ok(None)`, never an error.
    fn read_attribute(&self, object: ObjectId, name: &str) -> Result<Option<AttrValue>>;

    /// Create a reference to the object at `path`.
    fn create_object_reference(&self, scope: ObjectId, path: &str) -> Result<ObjectRef>;

    /// Open the object a reference points at.
    fn dereference(&mut self, reference: ObjectRef) -> Result<ObjectId>;

    /// Number of direct children of a group.
    fn child_count(&self, scope: ObjectId) -> Result<usize>;

    /// Kind of the child at `index`.
    fn child_kind_at(&self, scope: ObjectId, index: usize) -> Result<ObjectKind>;

    /// Name of the child at `index`.
    fn child_name_at(&self, scope: ObjectId, index: usize) -> Result<String>;

    /// Remove the child named `name` from `scope`, with everything below it.
    fn unlink(&mut self, scope: ObjectId, name: &str) -> Result<()>;

    /// Release a handle.
    fn close(&mut self, object: ObjectId) -> Result<()>;
}

/// Check whether `scope` already has a child called `name`.
pub fn has_child<C: Container + ?Sized>(
    container: &C,
    scope: ObjectId,
    name: &str,
) -> Result<bool> {
    let count = container.child_count(scope)?;
    for index in 0..count {
        if container.child_name_at(scope, index)? == name {
            return Ok(true);
        }
    }
    Ok(false)
}
