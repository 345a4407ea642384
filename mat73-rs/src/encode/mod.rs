//! Variable encoding.
//!
//! One recursive encoder handles every value, top-level or nested: it
//! dispatches on the variable's class to the array path (numeric and char
//! datasets) or the record path (struct groups), and the record path calls
//! back into it for each field value.
//!
//! Callers are expected to have run [`Variable::validate`] on the tree
//! first; the encoder still reports inconsistencies as errors rather than
//! panicking.

mod array;
mod record;

use mat73_container::{AttrValue, Buffer, Container, ElementType, ObjectId};
use tracing::{debug, warn};

use crate::class::ClassTag;
use crate::error::{ContainerContext, Error, Result};
use crate::metadata::{child_path, CLASS_ATTR, GLOBAL_ATTR};
use crate::pool::RefPool;
use crate::variable::Variable;

/// Attributes to attach to a newly created object.
type Attrs = Vec<(&'static str, AttrValue)>;

/// Walks a variable tree and emits container objects.
pub(crate) struct Encoder<'a, C: Container> {
    container: &'a mut C,
    pool: &'a mut RefPool,
}

impl<'a, C: Container> Encoder<'a, C> {
    pub(crate) fn new(container: &'a mut C, pool: &'a mut RefPool) -> Self {
        Encoder { container, pool }
    }

    /// Encode `var` under `scope`, named by its own name.
    ///
    /// `global` adds the global marker attribute to the created object.
    pub(crate) fn write_top(
        &mut self,
        scope: ObjectId,
        scope_path: &str,
        var: &Variable,
        global: bool,
    ) -> Result<()> {
        self.write_value(scope, scope_path, var.name(), var, global)
    }

    /// Encode `var` under `scope` as `name`.
    fn write_value(
        &mut self,
        scope: ObjectId,
        scope_path: &str,
        name: &str,
        var: &Variable,
        global: bool,
    ) -> Result<()> {
        let class = var.class().ok_or_else(|| Error::MissingClass {
            name: var.name().to_string(),
        })?;

        match class {
            ClassTag::Struct => self.write_struct(scope, scope_path, name, var, global),
            ClassTag::Char => self.write_chars(scope, scope_path, name, var, global),
            c if c.is_numeric() => self.write_numeric(scope, scope_path, name, var, c, global),
            c => Err(Error::unsupported_class(var.name(), c.name())),
        }
    }

    fn is_pool(&self, scope: ObjectId) -> bool {
        self.pool.handle() == Some(scope)
    }

    /// Create a dataset, tag it, and fill it, or leave nothing behind.
    ///
    /// If tagging or writing fails the dataset is unlinked before the error
    /// is returned. The dataset handle is closed on every path.
    #[allow(clippy::too_many_arguments)]
    fn write_dataset(
        &mut self,
        scope: ObjectId,
        scope_path: &str,
        name: &str,
        element_type: &ElementType,
        shape: &[usize],
        data: &Buffer,
        attrs: &Attrs,
    ) -> Result<()> {
        let path = child_path(scope_path, name);
        let dataset = self
            .container
            .create_dataset(scope, name, element_type, shape)
            .at(&path)?;
        debug!("Created dataset {} ({}, shape {:?})", path, element_type, shape);

        let populated = self.populate(dataset, &path, data, attrs);
        let closed = self.container.close(dataset).at(&path);

        if let Err(e) = populated {
            warn!("Rolling back dataset {}: {}", path, e);
            if let Err(unlink_err) = self.container.unlink(scope, name) {
                warn!("Failed to unlink {}: {}", path, unlink_err);
            }
            return Err(e);
        }
        closed
    }

    fn populate(
        &mut self,
        object: ObjectId,
        path: &str,
        data: &Buffer,
        attrs: &Attrs,
    ) -> Result<()> {
        self.tag(object, path, attrs)?;
        self.container.write_dataset(object, data).at(path)
    }

    fn tag(&mut self, object: ObjectId, path: &str, attrs: &Attrs) -> Result<()> {
        for (name, value) in attrs {
            self.container
                .create_attribute(object, name, value)
                .at(format!("{}@{}", path, name))?;
        }
        Ok(())
    }
}

/// The class tag attribute, plus the global marker when asked for.
fn class_attrs(class: ClassTag, global: bool) -> Attrs {
    let mut attrs = vec![(CLASS_ATTR, AttrValue::Str(class.name().to_string()))];
    if global {
        attrs.push((GLOBAL_ATTR, AttrValue::Int(1)));
    }
    attrs
}
