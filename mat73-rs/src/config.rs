//! File-level options.

/// Options for a [`MatFile`](crate::MatFile).
///
/// # Example
///
/// ```
/// use mat73_rs::MatConfig;
///
/// let config = MatConfig::new()
///     .scan_groups(true)
///     .tag_globals(false);
/// assert!(config.scans_groups());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatConfig {
    /// Surface root-level struct groups as top-level headers.
    pub scan_groups: bool,

    /// Write the global marker for variables flagged as global.
    pub tag_globals: bool,
}

impl Default for MatConfig {
    fn default() -> Self {
        MatConfig {
            scan_groups: false,
            tag_globals: true,
        }
    }
}

impl MatConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether the decoder reports root struct groups.
    ///
    /// By default only root datasets are reported. The reference pool is
    /// never reported.
    pub fn scan_groups(mut self, scan: bool) -> Self {
        self.scan_groups = scan;
        self
    }

    /// Set whether global variables get the global marker attribute.
    pub fn tag_globals(mut self, tag: bool) -> Self {
        self.tag_globals = tag;
        self
    }

    /// Whether root struct groups are reported.
    pub fn scans_groups(&self) -> bool {
        self.scan_groups
    }

    /// Whether global variables are tagged.
    pub fn tags_globals(&self) -> bool {
        self.tag_globals
    }
}
