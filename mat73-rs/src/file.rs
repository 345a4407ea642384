//! The container handle.
//!
//! [`MatFile`] owns a container and everything the mapping keeps per
//! container: the reference pool and the header cursor.

use mat73_container::{has_child, Container};
use tracing::debug;

use crate::config::MatConfig;
use crate::decode::HeaderCursor;
use crate::encode::Encoder;
use crate::error::{ContainerContext, Error, Result};
use crate::metadata::POOL_NAME;
use crate::pool::RefPool;
use crate::variable::Variable;

/// MATLAB variables mapped onto a hierarchical container.
///
/// Writes go through [`write`](Self::write); top-level headers are read
/// back one at a time with [`next_header`](Self::next_header) or
/// [`headers`](Self::headers).
///
/// # Example
///
/// ```
/// use mat73_rs::{ClassTag, MatFile, MemContainer, Variable};
///
/// let mut mat = MatFile::new(MemContainer::new());
/// mat.write(&Variable::numeric("x", ClassTag::Double, vec![2, 3], vec![0.0; 6]))?;
/// mat.write(&Variable::string("label", "trial 1"))?;
///
/// let names: Vec<String> = mat
///     .headers()
///     .map(|h| h.map(|v| v.name().to_string()))
///     .collect::<Result<_, _>>()?;
/// assert_eq!(names, ["x", "label"]);
/// # Ok::<(), mat73_rs::Error>(())
/// ```
#[derive(Debug)]
pub struct MatFile<C: Container> {
    container: C,
    pool: RefPool,
    cursor: HeaderCursor,
    config: MatConfig,
}

impl<C: Container> MatFile<C> {
    /// Wrap a container with default options.
    pub fn new(container: C) -> Self {
        Self::with_config(container, MatConfig::default())
    }

    /// Wrap a container with the given options.
    pub fn with_config(container: C, config: MatConfig) -> Self {
        MatFile {
            container,
            pool: RefPool::new(),
            cursor: HeaderCursor::new(),
            config,
        }
    }

    /// Write a top-level variable under the root group.
    ///
    /// The whole tree is validated before anything is written. Struct
    /// arrays anywhere in the tree store their values in the shared
    /// reference pool, which is created on first use.
    ///
    /// # Errors
    ///
    /// - Any precondition error from [`Variable::validate`]
    /// - [`Error::InvalidName`] for the reserved pool name
    /// - [`Error::DuplicateName`] if the root already has a child by that name
    /// - [`Error::Container`] if the engine fails; the variable's own
    ///   object is removed, but values already placed in the pool stay
    pub fn write(&mut self, var: &Variable) -> Result<()> {
        var.validate()?;
        if var.name() == POOL_NAME {
            return Err(Error::InvalidName {
                name: var.name().to_string(),
            });
        }

        let root = self.container.root();
        if has_child(&self.container, root, var.name()).at("/")? {
            return Err(Error::DuplicateName {
                name: var.name().to_string(),
                scope: "/".to_string(),
            });
        }

        let global = self.config.tag_globals && var.is_global();
        let written =
            Encoder::new(&mut self.container, &mut self.pool).write_top(root, "/", var, global);
        let released = self.pool.release(&mut self.container);
        written?;
        released?;

        debug!("Wrote variable {} (dims {:?})", var.name(), var.dims());
        Ok(())
    }

    /// Read the header of the next top-level variable.
    ///
    /// Returns `Ok(None)` once the root group is exhausted. An error skips
    /// the offending child; calling again continues with the next one.
    pub fn next_header(&mut self) -> Result<Option<Variable>> {
        self.cursor.next(&mut self.container, &self.config)
    }

    /// Iterate over the remaining top-level headers.
    pub fn headers(&mut self) -> Headers<'_, C> {
        Headers { file: self }
    }

    /// Start reading headers from the first root child again.
    pub fn rewind(&mut self) {
        self.cursor.rewind();
    }

    /// Index of the next root child the decoder will examine.
    pub fn cursor_position(&self) -> usize {
        self.cursor.position()
    }

    /// The options in use.
    pub fn config(&self) -> &MatConfig {
        &self.config
    }

    /// Borrow the container.
    pub fn container(&self) -> &C {
        &self.container
    }

    /// Mutably borrow the container.
    pub fn container_mut(&mut self) -> &mut C {
        &mut self.container
    }

    /// Give back the container.
    pub fn into_inner(self) -> C {
        self.container
    }
}

/// Iterator over top-level headers.
///
/// Created by [`MatFile::headers`].
pub struct Headers<'a, C: Container> {
    file: &'a mut MatFile<C>,
}

impl<C: Container> Iterator for Headers<'_, C> {
    type Item = Result<Variable>;

    fn next(&mut self) -> Option<Self::Item> {
        self.file.next_header().transpose()
    }
}

#[cfg(test)]
mod tests {
    use mat73_container::MemContainer;

    use super::*;
    use crate::class::ClassTag;
    use crate::metadata::GLOBAL_ATTR;

    fn scalar(name: &str) -> Variable {
        Variable::numeric(name, ClassTag::Double, vec![1, 1], vec![1.0f64])
    }

    #[test]
    fn test_write_then_scan() {
        let mut mat = MatFile::new(MemContainer::new());
        mat.write(&scalar("a")).unwrap();
        mat.write(&Variable::string("b", "hey")).unwrap();

        let a = mat.next_header().unwrap().unwrap();
        assert_eq!(a.name(), "a");
        let b = mat.next_header().unwrap().unwrap();
        assert_eq!(b.class(), Some(ClassTag::Char));
        assert_eq!(b.dims(), &[1, 3]);
        assert!(mat.next_header().unwrap().is_none());
        assert_eq!(mat.cursor_position(), 2);
    }

    #[test]
    fn test_duplicate_rejected_before_write() {
        let mut mat = MatFile::new(MemContainer::new());
        mat.write(&scalar("a")).unwrap();
        match mat.write(&scalar("a")) {
            Err(Error::DuplicateName { name, scope }) => {
                assert_eq!(name, "a");
                assert_eq!(scope, "/");
            }
            other => panic!("Expected DuplicateName, got {:?}", other),
        }
    }

    #[test]
    fn test_pool_name_reserved() {
        let mut mat = MatFile::new(MemContainer::new());
        assert!(matches!(
            mat.write(&scalar(POOL_NAME)),
            Err(Error::InvalidName { .. })
        ));
        assert_eq!(mat.container().child_count(mat.container().root()).unwrap(), 0);
    }

    #[test]
    fn test_invalid_variable_writes_nothing() {
        let mut mat = MatFile::new(MemContainer::new());
        let bad = Variable::numeric("a", ClassTag::Double, vec![2, 2], vec![1.0f64]);
        assert!(mat.write(&bad).unwrap_err().is_precondition());
        assert!(mat.container().list("/").unwrap().is_empty());
    }

    #[test]
    fn test_overflowing_dims_rejected() {
        let mut mat = MatFile::new(MemContainer::new());
        let huge = Variable::numeric("a", ClassTag::Double, vec![usize::MAX, 2], Vec::<f64>::new());
        assert!(matches!(mat.write(&huge), Err(Error::InvalidDimensions { .. })));

        let huge = Variable::structure("s", vec![1 << 40, 1 << 40], Vec::new());
        assert!(matches!(mat.write(&huge), Err(Error::InvalidDimensions { .. })));
        assert!(mat.container().list("/").unwrap().is_empty());
    }

    #[test]
    fn test_global_tagging_follows_config() {
        let mut mat = MatFile::new(MemContainer::new());
        mat.write(&scalar("g").with_global(true)).unwrap();
        assert!(mat.next_header().unwrap().unwrap().is_global());

        let config = MatConfig::new().tag_globals(false);
        let mut mat = MatFile::with_config(MemContainer::new(), config);
        mat.write(&scalar("g").with_global(true)).unwrap();
        let c = mat.container_mut();
        let root = c.root();
        let ds = c.open_dataset(root, "g").unwrap();
        assert_eq!(c.read_attribute(ds, GLOBAL_ATTR).unwrap(), None);
        c.close(ds).unwrap();
        assert!(!mat.next_header().unwrap().unwrap().is_global());
    }

    #[test]
    fn test_no_handles_held_between_writes() {
        let mut mat = MatFile::new(MemContainer::new());
        let fields = vec![scalar("x"), scalar("x")];
        mat.write(&Variable::structure("s", vec![2, 1], fields)).unwrap();
        assert_eq!(mat.container().open_handles(), 0);

        let c = mat.into_inner();
        assert_eq!(c.list("/").unwrap(), vec!["s", POOL_NAME]);
    }

    #[test]
    fn test_headers_iterator_and_rewind() {
        let mut mat = MatFile::new(MemContainer::new());
        for name in ["a", "b", "c"] {
            mat.write(&scalar(name)).unwrap();
        }
        assert_eq!(mat.headers().count(), 3);
        assert_eq!(mat.headers().count(), 0);

        mat.rewind();
        let names: Vec<String> = mat
            .headers()
            .map(|h| h.unwrap().name().to_string())
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }
}
