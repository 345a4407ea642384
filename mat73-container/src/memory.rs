//! An in-memory container engine.
//!
//! [`MemContainer`] implements [`Container`] over a plain object table. It
//! keeps children in creation order, resolves absolute and relative paths,
//! converts numeric buffers to the dataset's element type on write, and
//! counts open handles so callers can check that every handle they acquired
//! was released.
//!
//! Faults can be injected per operation with
//! [`inject_fault`](MemContainer::inject_fault) to exercise error paths.
//!
//! # Example
//!
//! ```
//! use mat73_container::{Buffer, Container, ElementType, MemContainer, NativeType};
//!
//! let mut c = MemContainer::new();
//! let root = c.root();
//! let ds = c.create_dataset(root, "x", &ElementType::Native(NativeType::Float64), &[2, 3])?;
//! c.write_dataset(ds, &Buffer::from(vec![0.0f64; 6]))?;
//! c.close(ds)?;
//!
//! assert_eq!(c.open_handles(), 0);
//! assert!(c.exists("/x"));
//! # Ok::<(), mat73_container::ContainerError>(())
//! ```

use std::collections::HashMap;

use crate::buffer::Buffer;
use crate::container::Container;
use crate::error::{ContainerError, Result};
use crate::types::{AttrValue, ElementType, ObjectId, ObjectKind, ObjectRef};

/// Operations that can be made to fail on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// `create_group`
    CreateGroup,
    /// `create_dataset`
    CreateDataset,
    /// `write_dataset`
    WriteDataset,
    /// `create_attribute`
    CreateAttribute,
}

impl Op {
    const fn label(self) -> &'static str {
        match self {
            Op::CreateGroup => "create_group",
            Op::CreateDataset => "create_dataset",
            Op::WriteDataset => "write_dataset",
            Op::CreateAttribute => "create_attribute",
        }
    }
}

#[derive(Debug, Clone)]
enum NodeKind {
    Group {
        children: Vec<usize>,
    },
    Dataset {
        element_type: ElementType,
        shape: Vec<usize>,
        data: Option<Buffer>,
    },
    Link {
        target: String,
    },
}

#[derive(Debug, Clone)]
struct Node {
    name: String,
    parent: Option<usize>,
    kind: NodeKind,
    attrs: Vec<(String, AttrValue)>,
}

const ROOT: usize = 0;
const ROOT_HANDLE: ObjectId = ObjectId(0);

/// A container held entirely in memory.
#[derive(Debug, Clone)]
pub struct MemContainer {
    /// Object table; unlinked slots are `None`.
    nodes: Vec<Option<Node>>,

    /// Open handles, mapped to the node they refer to.
    handles: HashMap<ObjectId, usize>,

    /// Next handle value to issue.
    next_handle: u64,

    /// Remaining successful calls before an operation fails.
    faults: HashMap<Op, usize>,
}

impl Default for MemContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl MemContainer {
    /// Create an empty container with just a root group.
    pub fn new() -> Self {
        let root = Node {
            name: String::new(),
            parent: None,
            kind: NodeKind::Group { children: Vec::new() },
            attrs: Vec::new(),
        };
        MemContainer {
            nodes: vec![Some(root)],
            handles: HashMap::new(),
            next_handle: 1,
            faults: HashMap::new(),
        }
    }

    /// Make the call to `op` after `successes` more successful calls fail.
    ///
    /// `inject_fault(Op::WriteDataset, 0)` fails the very next write.
    pub fn inject_fault(&mut self, op: Op, successes: usize) {
        self.faults.insert(op, successes);
    }

    /// Drop all pending injected faults.
    pub fn clear_faults(&mut self) {
        self.faults.clear();
    }

    /// Number of handles acquired and not yet closed.
    pub fn open_handles(&self) -> usize {
        self.handles.len()
    }

    /// Check whether an object exists at the absolute `path`.
    pub fn exists(&self, path: &str) -> bool {
        matches!(self.resolve(ROOT, path), Ok(Some(_)))
    }

    /// Names of the children of the group at `path`, in creation order.
    pub fn list(&self, path: &str) -> Result<Vec<String>> {
        let node = self
            .resolve(ROOT, path)?
            .ok_or_else(|| ContainerError::not_found(path))?;
        let children = self.children(node)?;
        Ok(children.iter().map(|&c| self.node_unchecked(c).name.clone()).collect())
    }

    /// Absolute path of the object behind a handle.
    pub fn path_of(&self, object: ObjectId) -> Result<String> {
        let node = self.node_index(object)?;
        Ok(self.node_path(node))
    }

    /// Create a soft link named `name` under `scope` pointing at `target`.
    ///
    /// Links are listed as [`ObjectKind::Other`] and are not followed.
    pub fn create_soft_link(&mut self, scope: ObjectId, name: &str, target: &str) -> Result<()> {
        let parent = self.node_index(scope)?;
        self.insert_child(parent, name, NodeKind::Link { target: target.to_string() })?;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn check_fault(&mut self, op: Op) -> Result<()> {
        if let Some(remaining) = self.faults.get_mut(&op) {
            if *remaining == 0 {
                self.faults.remove(&op);
                return Err(ContainerError::InjectedFault { op: op.label() });
            }
            *remaining -= 1;
        }
        Ok(())
    }

    fn node_index(&self, object: ObjectId) -> Result<usize> {
        let index = if object == ROOT_HANDLE {
            ROOT
        } else {
            *self
                .handles
                .get(&object)
                .ok_or(ContainerError::InvalidHandle { id: object })?
        };
        match self.nodes.get(index) {
            Some(Some(_)) => Ok(index),
            _ => Err(ContainerError::InvalidHandle { id: object }),
        }
    }

    fn node_unchecked(&self, index: usize) -> &Node {
        self.nodes[index]
            .as_ref()
            .unwrap_or_else(|| panic!("object table slot {} is empty", index))
    }

    fn node_path(&self, index: usize) -> String {
        let mut segments = Vec::new();
        let mut current = Some(index);
        while let Some(i) = current {
            let node = self.node_unchecked(i);
            if node.parent.is_some() {
                segments.push(node.name.as_str());
            }
            current = node.parent;
        }
        segments.reverse();
        format!("/{}", segments.join("/"))
    }

    fn children(&self, index: usize) -> Result<&[usize]> {
        match &self.node_unchecked(index).kind {
            NodeKind::Group { children } => Ok(children),
            _ => Err(ContainerError::not_a_group(self.node_path(index))),
        }
    }

    fn child_by_name(&self, parent: usize, name: &str) -> Result<Option<usize>> {
        Ok(self
            .children(parent)?
            .iter()
            .copied()
            .find(|&c| self.node_unchecked(c).name == name))
    }

    fn resolve(&self, start: usize, path: &str) -> Result<Option<usize>> {
        let mut current = if path.starts_with('/') { ROOT } else { start };
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            match self.child_by_name(current, segment)? {
                Some(child) => current = child,
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }

    fn child_at(&self, scope: ObjectId, index: usize) -> Result<&Node> {
        let parent = self.node_index(scope)?;
        let children = self.children(parent)?;
        let child = children.get(index).ok_or_else(|| {
            ContainerError::not_found(format!("{}[{}]", self.node_path(parent), index))
        })?;
        Ok(self.node_unchecked(*child))
    }

    fn insert_child(&mut self, parent: usize, name: &str, kind: NodeKind) -> Result<usize> {
        if name.is_empty() || name.contains('/') {
            return Err(ContainerError::InvalidName { name: name.to_string() });
        }
        if self.child_by_name(parent, name)?.is_some() {
            let base = self.node_path(parent);
            return Err(ContainerError::already_exists(join_path(&base, name)));
        }

        let index = self.nodes.len();
        self.nodes.push(Some(Node {
            name: name.to_string(),
            parent: Some(parent),
            kind,
            attrs: Vec::new(),
        }));
        if let Some(Some(Node {
            kind: NodeKind::Group { children },
            ..
        })) = self.nodes.get_mut(parent)
        {
            children.push(index);
        }
        Ok(index)
    }

    fn issue_handle(&mut self, node: usize) -> ObjectId {
        let id = ObjectId(self.next_handle);
        self.next_handle += 1;
        self.handles.insert(id, node);
        id
    }

    fn remove_subtree(&mut self, index: usize) {
        if let Some(node) = self.nodes[index].take() {
            if let NodeKind::Group { children } = node.kind {
                for child in children {
                    self.remove_subtree(child);
                }
            }
        }
    }
}

fn join_path(base: &str, name: &str) -> String {
    if base.ends_with('/') {
        format!("{}{}", base, name)
    } else {
        format!("{}/{}", base, name)
    }
}

impl Container for MemContainer {
    fn root(&self) -> ObjectId {
        ROOT_HANDLE
    }

    fn create_group(&mut self, scope: ObjectId, name: &str) -> Result<ObjectId> {
        let parent = self.node_index(scope)?;
        self.check_fault(Op::CreateGroup)?;
        let node = self.insert_child(parent, name, NodeKind::Group { children: Vec::new() })?;
        Ok(self.issue_handle(node))
    }

    fn open_group(&mut self, scope: ObjectId, path: &str) -> Result<Option<ObjectId>> {
        let start = self.node_index(scope)?;
        match self.resolve(start, path)? {
            Some(node) => match self.node_unchecked(node).kind {
                NodeKind::Group { .. } => Ok(Some(self.issue_handle(node))),
                _ => Err(ContainerError::not_a_group(self.node_path(node))),
            },
            None => Ok(None),
        }
    }

    fn create_dataset(
        &mut self,
        scope: ObjectId,
        name: &str,
        element_type: &ElementType,
        shape: &[usize],
    ) -> Result<ObjectId> {
        let parent = self.node_index(scope)?;
        self.check_fault(Op::CreateDataset)?;
        let kind = NodeKind::Dataset {
            element_type: element_type.clone(),
            shape: shape.to_vec(),
            data: None,
        };
        let node = self.insert_child(parent, name, kind)?;
        Ok(self.issue_handle(node))
    }

    fn open_dataset(&mut self, scope: ObjectId, path: &str) -> Result<ObjectId> {
        let start = self.node_index(scope)?;
        let node = self
            .resolve(start, path)?
            .ok_or_else(|| ContainerError::not_found(path))?;
        match self.node_unchecked(node).kind {
            NodeKind::Dataset { .. } => Ok(self.issue_handle(node)),
            _ => Err(ContainerError::not_a_dataset(self.node_path(node))),
        }
    }

    fn write_dataset(&mut self, dataset: ObjectId, buffer: &Buffer) -> Result<()> {
        let index = self.node_index(dataset)?;
        self.check_fault(Op::WriteDataset)?;
        let path = self.node_path(index);

        let Some(Some(node)) = self.nodes.get_mut(index) else {
            return Err(ContainerError::InvalidHandle { id: dataset });
        };
        let NodeKind::Dataset { element_type, shape, data } = &mut node.kind else {
            return Err(ContainerError::not_a_dataset(path));
        };

        let expected = shape.iter().product::<usize>() * element_type.values_per_element();
        if buffer.len() != expected {
            return Err(ContainerError::ShapeMismatch { expected, found: buffer.len() });
        }

        let stored = match element_type {
            ElementType::ObjectRef => match buffer {
                Buffer::Refs(_) => buffer.clone(),
                other => {
                    let found = other.native_type().map(|n| n.to_string()).unwrap_or_default();
                    return Err(ContainerError::type_mismatch(&*element_type, found));
                }
            },
            _ => {
                let native = element_type
                    .base_native()
                    .ok_or_else(|| ContainerError::type_mismatch(&*element_type, "buffer"))?;
                buffer
                    .convert(native)
                    .ok_or_else(|| ContainerError::type_mismatch(native, "object-ref"))?
            }
        };
        *data = Some(stored);
        Ok(())
    }

    fn read_dataset(&self, dataset: ObjectId) -> Result<Buffer> {
        let index = self.node_index(dataset)?;
        let node = self.node_unchecked(index);
        let NodeKind::Dataset { element_type, shape, data } = &node.kind else {
            return Err(ContainerError::not_a_dataset(self.node_path(index)));
        };

        if let Some(buffer) = data {
            return Ok(buffer.clone());
        }

        // Unwritten numeric datasets read back as their zero fill value.
        let count = shape.iter().product::<usize>() * element_type.values_per_element();
        element_type
            .base_native()
            .and_then(|native| Buffer::Float64(vec![0.0; count]).convert(native))
            .ok_or_else(|| {
                ContainerError::not_found(format!("{} (no data written)", self.node_path(index)))
            })
    }

    fn dataset_shape(&self, dataset: ObjectId) -> Result<Vec<usize>> {
        let index = self.node_index(dataset)?;
        match &self.node_unchecked(index).kind {
            NodeKind::Dataset { shape, .. } => Ok(shape.clone()),
            _ => Err(ContainerError::not_a_dataset(self.node_path(index))),
        }
    }

    fn dataset_type(&self, dataset: ObjectId) -> Result<ElementType> {
        let index = self.node_index(dataset)?;
        match &self.node_unchecked(index).kind {
            NodeKind::Dataset { element_type, .. } => Ok(element_type.clone()),
            _ => Err(ContainerError::not_a_dataset(self.node_path(index))),
        }
    }

    fn create_attribute(&mut self, object: ObjectId, name: &str, value: &AttrValue) -> Result<()> {
        let index = self.node_index(object)?;
        self.check_fault(Op::CreateAttribute)?;
        let path = self.node_path(index);

        let Some(Some(node)) = self.nodes.get_mut(index) else {
            return Err(ContainerError::InvalidHandle { id: object });
        };
        if node.attrs.iter().any(|(n, _)| n == name) {
            return Err(ContainerError::already_exists(format!("{}@{}", path, name)));
        }
        node.attrs.push((name.to_string(), value.clone()));
        Ok(())
    }

    fn read_attribute(&self, object: ObjectId, name: &str) -> Result<Option<AttrValue>> {
        let index = self.node_index(object)?;
        Ok(self
            .node_unchecked(index)
            .attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone()))
    }

    fn create_object_reference(&self, scope: ObjectId, path: &str) -> Result<ObjectRef> {
        let start = self.node_index(scope)?;
        let node = self
            .resolve(start, path)?
            .ok_or_else(|| ContainerError::not_found(path))?;
        Ok(ObjectRef(node as u64))
    }

    fn dereference(&mut self, reference: ObjectRef) -> Result<ObjectId> {
        let index = usize::try_from(reference.0)
            .map_err(|_| ContainerError::not_found(format!("ref {}", reference.0)))?;
        match self.nodes.get(index) {
            Some(Some(_)) => Ok(self.issue_handle(index)),
            _ => Err(ContainerError::not_found(format!("ref {}", reference.0))),
        }
    }

    fn child_count(&self, scope: ObjectId) -> Result<usize> {
        let index = self.node_index(scope)?;
        Ok(self.children(index)?.len())
    }

    fn child_kind_at(&self, scope: ObjectId, index: usize) -> Result<ObjectKind> {
        Ok(match self.child_at(scope, index)?.kind {
            NodeKind::Group { .. } => ObjectKind::Group,
            NodeKind::Dataset { .. } => ObjectKind::Dataset,
            NodeKind::Link { .. } => ObjectKind::Other,
        })
    }

    fn child_name_at(&self, scope: ObjectId, index: usize) -> Result<String> {
        Ok(self.child_at(scope, index)?.name.clone())
    }

    fn unlink(&mut self, scope: ObjectId, name: &str) -> Result<()> {
        let parent = self.node_index(scope)?;
        let child = self.child_by_name(parent, name)?.ok_or_else(|| {
            ContainerError::not_found(join_path(&self.node_path(parent), name))
        })?;

        if let Some(Some(Node {
            kind: NodeKind::Group { children },
            ..
        })) = self.nodes.get_mut(parent)
        {
            children.retain(|&c| c != child);
        }
        self.remove_subtree(child);
        Ok(())
    }

    fn close(&mut self, object: ObjectId) -> Result<()> {
        if object == ROOT_HANDLE {
            return Ok(());
        }
        self.handles
            .remove(&object)
            .map(|_| ())
            .ok_or(ContainerError::InvalidHandle { id: object })
    }
}
