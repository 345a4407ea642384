//! Struct groups and the reference pool.

use mat73_container::{AttrValue, Buffer, Container, ElementType, ObjectId, ObjectRef};
use tracing::{debug, warn};

use super::{class_attrs, Encoder};
use crate::class::ClassTag;
use crate::dims::permute_dims;
use crate::error::{ContainerContext, Error, Result};
use crate::metadata::{child_path, pool_slot_path, FIELDS_ATTR, POOL_PATH};
use crate::pool::RefPool;
use crate::variable::Variable;

impl<'a, C: Container> Encoder<'a, C> {
    /// Write a struct as a tagged group.
    ///
    /// A failed group is unlinked, except inside the pool: pool slots are
    /// named by count, so removing one would hand its name to a later value
    /// while references may already point at it. The orphan stays.
    pub(super) fn write_struct(
        &mut self,
        scope: ObjectId,
        scope_path: &str,
        name: &str,
        var: &Variable,
        global: bool,
    ) -> Result<()> {
        let path = child_path(scope_path, name);
        let group = self.container.create_group(scope, name).at(&path)?;
        debug!("Created struct group {} (dims {:?})", path, var.dims());

        let populated = self.populate_struct(group, &path, var, global);
        let closed = self.container.close(group).at(&path);

        if let Err(e) = populated {
            if self.is_pool(scope) {
                warn!("Leaving partial struct {} in reference pool: {}", path, e);
            } else {
                warn!("Rolling back struct {}: {}", path, e);
                if let Err(unlink_err) = self.container.unlink(scope, name) {
                    warn!("Failed to unlink {}: {}", path, unlink_err);
                }
            }
            return Err(e);
        }
        closed
    }

    fn populate_struct(
        &mut self,
        group: ObjectId,
        path: &str,
        var: &Variable,
        global: bool,
    ) -> Result<()> {
        let fields = var
            .fields()
            .ok_or_else(|| Error::payload_mismatch(var.name(), "expected struct fields"))?;
        let elements = var.element_count()?;
        let field_count = var.field_count().ok_or_else(|| Error::FieldCountMismatch {
            name: var.name().to_string(),
            fields: fields.len(),
            elements,
        })?;

        let mut attrs = class_attrs(ClassTag::Struct, global);
        attrs.push((FIELDS_ATTR, AttrValue::StrList(field_names(&fields[..field_count]))));
        self.tag(group, path, &attrs)?;

        if field_count == 0 {
            return Ok(());
        }
        if elements == 1 {
            for field in fields {
                self.write_value(group, path, field.name(), field, false)?;
            }
            return Ok(());
        }

        let refs = self.write_pooled(fields, field_count)?;
        let shape = permute_dims(var.dims());
        for (field, refs) in fields[..field_count].iter().zip(refs) {
            self.write_dataset(
                group,
                path,
                field.name(),
                &ElementType::ObjectRef,
                &shape,
                &Buffer::Refs(refs),
                &Vec::new(),
            )?;
        }
        Ok(())
    }

    /// Write every (element, field) value into the pool.
    ///
    /// Returns one reference list per field, in element order.
    fn write_pooled(
        &mut self,
        fields: &[Variable],
        field_count: usize,
    ) -> Result<Vec<Vec<ObjectRef>>> {
        let pool = self.pool.resolve(&mut *self.container)?;
        let root = self.container.root();
        let elements = fields.len() / field_count;
        let mut refs = vec![Vec::with_capacity(elements); field_count];

        for element in fields.chunks(field_count) {
            for (f, value) in element.iter().enumerate() {
                let slot = RefPool::next_slot(&*self.container, pool)?;
                self.write_value(pool, POOL_PATH, &slot, value, false)?;

                let target = pool_slot_path(&slot);
                let reference = self
                    .container
                    .create_object_reference(root, &target)
                    .at(&target)?;
                refs[f].push(reference);
            }
        }
        debug!(
            "Pooled {} values for {} fields x {} elements",
            fields.len(),
            field_count,
            elements
        );
        Ok(refs)
    }
}

/// Field names in order, duplicates dropped.
fn field_names(fields: &[Variable]) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(fields.len());
    for field in fields {
        if !names.iter().any(|n| n == field.name()) {
            names.push(field.name().to_string());
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use mat73_container::{MemContainer, Op};

    use super::*;
    use crate::metadata::{CLASS_ATTR, POOL_NAME};

    fn encode(c: &mut MemContainer, var: &Variable) -> Result<()> {
        let mut pool = RefPool::new();
        let root = c.root();
        let result = Encoder::new(c, &mut pool).write_top(root, "/", var, false);
        pool.release(c)?;
        result
    }

    fn scalar(name: &str, v: f64) -> Variable {
        Variable::numeric(name, ClassTag::Double, vec![1, 1], vec![v])
    }

    #[test]
    fn test_scalar_struct_fields_are_children() {
        let mut c = MemContainer::new();
        let s = Variable::scalar_struct("s", vec![scalar("a", 1.0), Variable::string("b", "hi")]);
        encode(&mut c, &s).unwrap();

        assert_eq!(c.list("/").unwrap(), vec!["s"]);
        assert_eq!(c.list("/s").unwrap(), vec!["a", "b"]);

        let root = c.root();
        let g = c.open_group(root, "/s").unwrap().unwrap();
        assert_eq!(
            c.read_attribute(g, CLASS_ATTR).unwrap(),
            Some(AttrValue::Str("struct".into()))
        );
        assert_eq!(
            c.read_attribute(g, FIELDS_ATTR).unwrap(),
            Some(AttrValue::StrList(vec!["a".into(), "b".into()]))
        );
        c.close(g).unwrap();
        assert_eq!(c.open_handles(), 0);
    }

    #[test]
    fn test_struct_array_goes_through_pool() {
        let mut c = MemContainer::new();
        let fields = vec![scalar("x", 1.0), scalar("y", 2.0), scalar("x", 3.0), scalar("y", 4.0)];
        let s = Variable::structure("p", vec![1, 2], fields);
        encode(&mut c, &s).unwrap();

        assert_eq!(c.list("/").unwrap(), vec!["p", POOL_NAME]);
        assert_eq!(c.list(POOL_PATH).unwrap(), vec!["0", "1", "2", "3"]);
        assert_eq!(c.list("/p").unwrap(), vec!["x", "y"]);

        let root = c.root();
        let ds = c.open_dataset(root, "/p/y").unwrap();
        assert_eq!(c.dataset_shape(ds).unwrap(), vec![2, 1]);
        assert_eq!(c.dataset_type(ds).unwrap(), ElementType::ObjectRef);
        let refs = c.read_dataset(ds).unwrap();
        c.close(ds).unwrap();

        let targets: Vec<String> = refs
            .as_refs()
            .unwrap()
            .iter()
            .map(|r| {
                let obj = c.dereference(*r).unwrap();
                let path = c.path_of(obj).unwrap();
                c.close(obj).unwrap();
                path
            })
            .collect();
        assert_eq!(targets, vec!["/#refs#/1", "/#refs#/3"]);
        assert_eq!(c.open_handles(), 0);
    }

    #[test]
    fn test_fieldless_struct_array() {
        let mut c = MemContainer::new();
        encode(&mut c, &Variable::structure("e", vec![2, 2], Vec::new())).unwrap();

        assert!(c.list("/e").unwrap().is_empty());
        assert!(!c.exists(POOL_PATH));
        let root = c.root();
        let g = c.open_group(root, "e").unwrap().unwrap();
        assert_eq!(
            c.read_attribute(g, FIELDS_ATTR).unwrap(),
            Some(AttrValue::StrList(Vec::new()))
        );
        c.close(g).unwrap();
    }

    #[test]
    fn test_field_names_dedup() {
        let names = field_names(&[scalar("a", 0.0), scalar("b", 0.0), scalar("a", 0.0)]);
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_failed_scalar_struct_is_unlinked() {
        let mut c = MemContainer::new();
        c.inject_fault(Op::CreateDataset, 1);
        let s = Variable::scalar_struct("s", vec![scalar("a", 1.0), scalar("b", 2.0)]);

        assert!(encode(&mut c, &s).is_err());
        assert!(!c.exists("/s"));
        assert_eq!(c.open_handles(), 0);
    }

    #[test]
    fn test_failed_pooled_struct_is_left_in_pool() {
        let mut c = MemContainer::new();
        let inner = |v| Variable::scalar_struct("in", vec![scalar("a", v), scalar("b", v)]);
        let s = Variable::structure("outer", vec![2, 1], vec![inner(1.0), inner(2.0)]);

        // Two datasets for the first pooled struct, one for the second.
        c.inject_fault(Op::CreateDataset, 3);
        assert!(encode(&mut c, &s).is_err());

        assert!(!c.exists("/outer"));
        assert_eq!(c.list(POOL_PATH).unwrap(), vec!["0", "1"]);
        assert_eq!(c.list("/#refs#/1").unwrap(), vec!["a"]);
        assert_eq!(c.open_handles(), 0);
    }
}
