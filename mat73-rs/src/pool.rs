//! The shared reference pool.
//!
//! Struct arrays store every (element, field) value as its own object in a
//! single pool group at [`POOL_PATH`], named by the pool's object count at
//! the time of writing, and point at those objects through reference
//! datasets. The pool is created the first time a struct array needs it
//! and its handle is kept for the life of the file.

use mat73_container::{Container, ObjectId};
use tracing::debug;

use crate::error::{ContainerContext, Result};
use crate::metadata::{POOL_NAME, POOL_PATH};

/// Lazily resolved handle to the pool group.
#[derive(Debug, Default)]
pub(crate) struct RefPool {
    handle: Option<ObjectId>,
}

impl RefPool {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// The pool handle, if it has been resolved.
    pub(crate) fn handle(&self) -> Option<ObjectId> {
        self.handle
    }

    /// Open the pool group, creating it if it does not exist yet.
    pub(crate) fn resolve<C: Container>(&mut self, container: &mut C) -> Result<ObjectId> {
        if let Some(handle) = self.handle {
            return Ok(handle);
        }

        let root = container.root();
        let handle = match container.open_group(root, POOL_PATH).at(POOL_PATH)? {
            Some(handle) => {
                debug!("Opened existing reference pool {}", POOL_PATH);
                handle
            }
            None => {
                debug!("Creating reference pool {}", POOL_PATH);
                container.create_group(root, POOL_NAME).at(POOL_PATH)?
            }
        };
        self.handle = Some(handle);
        Ok(handle)
    }

    /// Name for the next object written into the pool.
    pub(crate) fn next_slot<C: Container>(container: &C, pool: ObjectId) -> Result<String> {
        Ok(container.child_count(pool).at(POOL_PATH)?.to_string())
    }

    /// Release the pool handle, if one is held.
    pub(crate) fn release<C: Container>(&mut self, container: &mut C) -> Result<()> {
        match self.handle.take() {
            Some(handle) => container.close(handle).at(POOL_PATH),
            None => Ok(()),
        }
    }
}
