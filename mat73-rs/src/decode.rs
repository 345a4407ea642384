//! Top-level header scan.
//!
//! The decoder walks the root group's children in creation order and turns
//! each recognized child into a header-only [`Variable`]: name, class,
//! dimensions, complexity, storage and the global flag. Values are not read.
//!
//! Missing or unreadable metadata is not an error: an absent class leaves
//! the class unset and an absent global marker reads as `false`. Engine
//! failures are returned, but the cursor has already moved past the child
//! that failed, so the next call continues with the one after it.

use mat73_container::{AttrValue, Container, ElementType, NativeType, ObjectId, ObjectKind};
use tracing::{debug, trace, warn};

use crate::class::ClassTag;
use crate::complex::COMPLEX_MEMBERS;
use crate::config::MatConfig;
use crate::dims::permute_dims;
use crate::error::{ContainerContext, Result};
use crate::metadata::{child_path, CLASS_ATTR, FIELDS_ATTR, GLOBAL_ATTR, POOL_NAME};
use crate::storage::StorageType;
use crate::variable::Variable;

/// Read position among the root group's children.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct HeaderCursor {
    position: usize,
}

impl HeaderCursor {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Index of the next child to examine.
    pub(crate) fn position(&self) -> usize {
        self.position
    }

    pub(crate) fn rewind(&mut self) {
        self.position = 0;
    }

    /// Advance to the next top-level variable and read its header.
    ///
    /// Returns `Ok(None)` once every root child has been examined.
    pub(crate) fn next<C: Container>(
        &mut self,
        container: &mut C,
        config: &MatConfig,
    ) -> Result<Option<Variable>> {
        let root = container.root();
        let total = container.child_count(root).at("/")?;

        while self.position < total {
            let index = self.position;
            self.position += 1;

            let kind = container.child_kind_at(root, index).at("/")?;
            match kind {
                ObjectKind::Dataset => {
                    let name = container.child_name_at(root, index).at("/")?;
                    return read_dataset_header(container, root, name).map(Some);
                }
                ObjectKind::Group if config.scan_groups => {
                    let name = container.child_name_at(root, index).at("/")?;
                    if name == POOL_NAME {
                        trace!("Skipping reference pool");
                        continue;
                    }
                    if let Some(header) = read_group_header(container, root, name)? {
                        return Ok(Some(header));
                    }
                }
                other => trace!("Skipping root child {} ({:?})", index, other),
            }
        }
        Ok(None)
    }
}

fn read_dataset_header<C: Container>(
    container: &mut C,
    root: ObjectId,
    name: String,
) -> Result<Variable> {
    let path = child_path("/", &name);
    let dataset = container.open_dataset(root, &name).at(&path)?;

    let header = dataset_header(container, dataset, name, &path);
    let closed = container.close(dataset).at(&path);
    let header = header?;
    closed?;

    debug!(
        "Read header {} (class {:?}, dims {:?})",
        path,
        header.class().map(|c| c.name()),
        header.dims()
    );
    Ok(header)
}

fn dataset_header<C: Container>(
    container: &C,
    dataset: ObjectId,
    name: String,
    path: &str,
) -> Result<Variable> {
    let shape = container.dataset_shape(dataset).at(path)?;
    let element_type = container.dataset_type(dataset).at(path)?;
    let class = read_class(container, dataset, path)?;
    let global = read_global(container, dataset, path)?;

    let mut header = Variable::header(name, class, permute_dims(&shape)).with_global(global);
    header.set_complex(element_type.has_members(&COMPLEX_MEMBERS));
    header.set_storage(infer_storage(class, &element_type));
    Ok(header)
}

/// Read a root group as a struct header; `None` if it is not a struct.
fn read_group_header<C: Container>(
    container: &mut C,
    root: ObjectId,
    name: String,
) -> Result<Option<Variable>> {
    let path = child_path("/", &name);
    let Some(group) = container.open_group(root, &name).at(&path)? else {
        return Ok(None);
    };

    let header = group_header(container, group, name, &path);
    let closed = container.close(group).at(&path);
    let header = header?;
    closed?;
    Ok(header)
}

fn group_header<C: Container>(
    container: &mut C,
    group: ObjectId,
    name: String,
    path: &str,
) -> Result<Option<Variable>> {
    let class = read_class(container, group, path)?;
    if class != Some(ClassTag::Struct) {
        trace!("Skipping group {} without struct class", path);
        return Ok(None);
    }
    let global = read_global(container, group, path)?;
    let dims = struct_dims(container, group, path)?;

    debug!("Read struct header {} (dims {:?})", path, dims);
    Ok(Some(Variable::header(name, class, dims).with_global(global)))
}

/// Dimensions of a struct group.
///
/// A struct array's fields are reference datasets shaped like the array; a
/// scalar struct's fields are the values themselves.
fn struct_dims<C: Container>(container: &mut C, group: ObjectId, path: &str) -> Result<Vec<usize>> {
    let scalar = vec![1, 1];
    let fields = container.read_attribute(group, FIELDS_ATTR).at(path)?;
    let Some(first) = fields.as_ref().and_then(AttrValue::as_list).and_then(|l| l.first()) else {
        return Ok(scalar);
    };

    let field_path = child_path(path, first);
    if child_kind(container, group, first).at(path)? != Some(ObjectKind::Dataset) {
        return Ok(scalar);
    }

    let dataset = container.open_dataset(group, first).at(&field_path)?;
    let probed = container
        .dataset_type(dataset)
        .and_then(|t| Ok((t, container.dataset_shape(dataset)?)))
        .at(&field_path);
    let closed = container.close(dataset).at(&field_path);
    let (element_type, shape) = probed?;
    closed?;

    Ok(match element_type {
        ElementType::ObjectRef => permute_dims(&shape),
        _ => scalar,
    })
}

fn child_kind<C: Container>(
    container: &C,
    scope: ObjectId,
    name: &str,
) -> mat73_container::Result<Option<ObjectKind>> {
    for index in 0..container.child_count(scope)? {
        if container.child_name_at(scope, index)? == name {
            return container.child_kind_at(scope, index).map(Some);
        }
    }
    Ok(None)
}

fn read_class<C: Container>(
    container: &C,
    object: ObjectId,
    path: &str,
) -> Result<Option<ClassTag>> {
    let value = container.read_attribute(object, CLASS_ATTR).at(path)?;
    Ok(match value {
        None => {
            trace!("{} has no class attribute", path);
            None
        }
        Some(value) => {
            let class = value.as_str().and_then(ClassTag::from_name);
            if class.is_none() {
                warn!("Unrecognized class attribute on {}: {:?}", path, value);
            }
            class
        }
    })
}

fn read_global<C: Container>(container: &C, object: ObjectId, path: &str) -> Result<bool> {
    let value = container.read_attribute(object, GLOBAL_ATTR).at(path)?;
    Ok(value.and_then(|v| v.as_int()).map_or(false, |flag| flag != 0))
}

/// Best-effort storage type from a dataset's element type.
fn infer_storage(class: Option<ClassTag>, element_type: &ElementType) -> Option<StorageType> {
    let native = element_type.base_native()?;
    Some(match (class, native) {
        (Some(ClassTag::Char), NativeType::UInt16) => StorageType::Utf16,
        (Some(ClassTag::Char), NativeType::UInt32) => StorageType::Utf32,
        (_, native) => StorageType::from_native(native),
    })
}

#[cfg(test)]
mod tests {
    use mat73_container::{Buffer, MemContainer};

    use super::*;

    fn dataset(c: &mut MemContainer, name: &str, shape: &[usize], attrs: &[(&str, AttrValue)]) {
        let root = c.root();
        let ds = c
            .create_dataset(root, name, &ElementType::Native(NativeType::Float64), shape)
            .unwrap();
        for (attr, value) in attrs {
            c.create_attribute(ds, attr, value).unwrap();
        }
        c.close(ds).unwrap();
    }

    fn class(name: &str) -> (&'static str, AttrValue) {
        (CLASS_ATTR, AttrValue::Str(name.to_string()))
    }

    #[test]
    fn test_headers_in_creation_order() {
        let mut c = MemContainer::new();
        dataset(&mut c, "b", &[3, 2], &[class("double")]);
        dataset(&mut c, "a", &[1, 1], &[class("double")]);

        let mut cursor = HeaderCursor::new();
        let config = MatConfig::new();
        let first = cursor.next(&mut c, &config).unwrap().unwrap();
        assert_eq!(first.name(), "b");
        assert_eq!(first.dims(), &[2, 3]);
        assert_eq!(first.class(), Some(ClassTag::Double));
        assert_eq!(first.storage_type(), Some(StorageType::Double));
        assert!(!first.is_global());

        assert_eq!(cursor.next(&mut c, &config).unwrap().unwrap().name(), "a");
        assert!(cursor.next(&mut c, &config).unwrap().is_none());
        assert!(cursor.next(&mut c, &config).unwrap().is_none());
        assert_eq!(cursor.position(), 2);
        assert_eq!(c.open_handles(), 0);
    }

    #[test]
    fn test_groups_skipped_by_default() {
        let mut c = MemContainer::new();
        let root = c.root();
        let g = c.create_group(root, "g").unwrap();
        c.close(g).unwrap();
        dataset(&mut c, "x", &[1, 1], &[class("single")]);

        let mut cursor = HeaderCursor::new();
        let header = cursor.next(&mut c, &MatConfig::new()).unwrap().unwrap();
        assert_eq!(header.name(), "x");
        assert_eq!(cursor.position(), 2);
    }

    #[test]
    fn test_missing_and_garbled_class() {
        let mut c = MemContainer::new();
        dataset(&mut c, "none", &[1, 1], &[]);
        dataset(&mut c, "bad", &[1, 1], &[class("Double")]);
        dataset(&mut c, "int", &[1, 1], &[(CLASS_ATTR, AttrValue::Int(3))]);

        let mut cursor = HeaderCursor::new();
        let config = MatConfig::new();
        for _ in 0..3 {
            let header = cursor.next(&mut c, &config).unwrap().unwrap();
            assert_eq!(header.class(), None);
        }
    }

    #[test]
    fn test_global_flag() {
        let mut c = MemContainer::new();
        dataset(&mut c, "g", &[1, 1], &[class("double"), (GLOBAL_ATTR, AttrValue::Int(1))]);
        dataset(&mut c, "z", &[1, 1], &[class("double"), (GLOBAL_ATTR, AttrValue::Int(0))]);

        let mut cursor = HeaderCursor::new();
        let config = MatConfig::new();
        assert!(cursor.next(&mut c, &config).unwrap().unwrap().is_global());
        assert!(!cursor.next(&mut c, &config).unwrap().unwrap().is_global());
    }

    #[test]
    fn test_complex_and_char_storage() {
        let mut c = MemContainer::new();
        let root = c.root();
        let z = c
            .create_dataset(root, "z", &crate::complex::complex_type(NativeType::Int16), &[1, 2])
            .unwrap();
        c.create_attribute(z, CLASS_ATTR, &AttrValue::Str("int16".into())).unwrap();
        c.close(z).unwrap();
        let s = c
            .create_dataset(root, "s", &ElementType::Native(NativeType::UInt32), &[4, 1])
            .unwrap();
        c.create_attribute(s, CLASS_ATTR, &AttrValue::Str("char".into())).unwrap();
        c.write_dataset(s, &Buffer::from(vec![65u32, 66, 67, 68])).unwrap();
        c.close(s).unwrap();

        let mut cursor = HeaderCursor::new();
        let config = MatConfig::new();
        let z = cursor.next(&mut c, &config).unwrap().unwrap();
        assert!(z.is_complex());
        assert_eq!(z.storage_type(), Some(StorageType::Int16));
        assert_eq!(z.dims(), &[2, 1]);

        let s = cursor.next(&mut c, &config).unwrap().unwrap();
        assert!(!s.is_complex());
        assert_eq!(s.storage_type(), Some(StorageType::Utf32));
        assert_eq!(s.dims(), &[1, 4]);
    }

    #[test]
    fn test_scan_groups_reports_structs_only() {
        let mut c = MemContainer::new();
        let root = c.root();
        let plain = c.create_group(root, "plain").unwrap();
        c.close(plain).unwrap();
        let pool = c.create_group(root, POOL_NAME).unwrap();
        c.create_attribute(pool, CLASS_ATTR, &AttrValue::Str("struct".into())).unwrap();
        c.close(pool).unwrap();
        let s = c.create_group(root, "s").unwrap();
        c.create_attribute(s, CLASS_ATTR, &AttrValue::Str("struct".into())).unwrap();
        c.close(s).unwrap();

        let mut cursor = HeaderCursor::new();
        let config = MatConfig::new().scan_groups(true);
        let header = cursor.next(&mut c, &config).unwrap().unwrap();
        assert_eq!(header.name(), "s");
        assert_eq!(header.class(), Some(ClassTag::Struct));
        assert_eq!(header.dims(), &[1, 1]);
        assert_eq!(header.storage_type(), None);
        assert!(cursor.next(&mut c, &config).unwrap().is_none());
        assert_eq!(c.open_handles(), 0);
    }

    #[test]
    fn test_links_skipped() {
        let mut c = MemContainer::new();
        let root = c.root();
        c.create_soft_link(root, "dangling", "/nowhere").unwrap();
        dataset(&mut c, "ok", &[1, 1], &[class("double")]);

        let mut cursor = HeaderCursor::new();
        let config = MatConfig::new();
        let header = cursor.next(&mut c, &config).unwrap().unwrap();
        assert_eq!(header.name(), "ok");
    }

    #[test]
    fn test_rewind() {
        let mut c = MemContainer::new();
        dataset(&mut c, "a", &[1, 1], &[class("double")]);

        let mut cursor = HeaderCursor::new();
        let config = MatConfig::new();
        assert!(cursor.next(&mut c, &config).unwrap().is_some());
        assert!(cursor.next(&mut c, &config).unwrap().is_none());
        cursor.rewind();
        assert_eq!(cursor.next(&mut c, &config).unwrap().unwrap().name(), "a");
    }
}
