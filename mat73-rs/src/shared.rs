//! A [`MatFile`] shared between threads.

use std::sync::Arc;

use mat73_container::Container;
use parking_lot::{Mutex, MutexGuard};

use crate::config::MatConfig;
use crate::error::Result;
use crate::file::MatFile;
use crate::variable::Variable;

/// A cloneable, lock-protected [`MatFile`].
///
/// Every write holds the lock for its whole duration, so the reference
/// pool's count-based slot names never race.
///
/// # Example
///
/// ```
/// use std::thread;
/// use mat73_rs::{ClassTag, MemContainer, SharedMatFile, Variable};
///
/// let shared = SharedMatFile::new(MemContainer::new());
/// let workers: Vec<_> = (0..4)
///     .map(|i| {
///         let shared = shared.clone();
///         thread::spawn(move || {
///             let name = format!("v{}", i);
///             let v = Variable::numeric(name, ClassTag::Double, vec![1, 1], vec![i as f64]);
///             shared.write(&v)
///         })
///     })
///     .collect();
/// for w in workers {
///     w.join().unwrap()?;
/// }
/// assert_eq!(shared.lock().container().list("/")?.len(), 4);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct SharedMatFile<C: Container> {
    inner: Arc<Mutex<MatFile<C>>>,
}

impl<C: Container> Clone for SharedMatFile<C> {
    fn clone(&self) -> Self {
        SharedMatFile {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: Container> SharedMatFile<C> {
    /// Wrap a container with default options.
    pub fn new(container: C) -> Self {
        Self::from_file(MatFile::new(container))
    }

    /// Wrap a container with the given options.
    pub fn with_config(container: C, config: MatConfig) -> Self {
        Self::from_file(MatFile::with_config(container, config))
    }

    /// Share an existing file.
    pub fn from_file(file: MatFile<C>) -> Self {
        SharedMatFile {
            inner: Arc::new(Mutex::new(file)),
        }
    }

    /// Write a top-level variable. See [`MatFile::write`].
    pub fn write(&self, var: &Variable) -> Result<()> {
        self.inner.lock().write(var)
    }

    /// Read the next top-level header. See [`MatFile::next_header`].
    pub fn next_header(&self) -> Result<Option<Variable>> {
        self.inner.lock().next_header()
    }

    /// Lock the file for a sequence of operations.
    pub fn lock(&self) -> MutexGuard<'_, MatFile<C>> {
        self.inner.lock()
    }

    /// Take the file back if this is the last handle.
    ///
    /// Returns `self` unchanged while other clones are alive.
    pub fn try_into_inner(self) -> std::result::Result<MatFile<C>, Self> {
        Arc::try_unwrap(self.inner)
            .map(Mutex::into_inner)
            .map_err(|inner| SharedMatFile { inner })
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use mat73_container::MemContainer;

    use super::*;
    use crate::class::ClassTag;
    use crate::metadata::POOL_PATH;

    fn pair(name: &str, v: f64) -> Variable {
        let fields = vec![
            Variable::numeric("a", ClassTag::Double, vec![1, 1], vec![v]),
            Variable::numeric("a", ClassTag::Double, vec![1, 1], vec![-v]),
        ];
        Variable::structure(name, vec![1, 2], fields)
    }

    #[test]
    fn test_concurrent_struct_arrays_get_distinct_slots() {
        let shared = SharedMatFile::new(MemContainer::new());
        let workers: Vec<_> = (0..8)
            .map(|i| {
                let shared = shared.clone();
                thread::spawn(move || shared.write(&pair(&format!("s{}", i), i as f64)))
            })
            .collect();
        for w in workers {
            w.join().unwrap().unwrap();
        }

        let file = shared.try_into_inner().unwrap();
        let c = file.container();
        let mut slots: Vec<usize> = c
            .list(POOL_PATH)
            .unwrap()
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        slots.sort_unstable();
        assert_eq!(slots, (0..16).collect::<Vec<_>>());
        assert_eq!(c.open_handles(), 0);
    }

    #[test]
    fn test_try_into_inner_with_live_clone() {
        let shared = SharedMatFile::new(MemContainer::new());
        let other = shared.clone();
        let shared = shared.try_into_inner().unwrap_err();
        drop(other);
        assert!(shared.try_into_inner().is_ok());
    }
}
