//! On-disk metadata names.
//!
//! These strings are read by MATLAB and every other v7.3 reader; they must
//! not change.

/// String attribute holding the class name of every array, char and struct.
pub const CLASS_ATTR: &str = "MATLAB_class";

/// Integer attribute marking char datasets as UTF-16/32 code units.
pub const INT_DECODE_ATTR: &str = "MATLAB_int_decode";

/// Value of [`INT_DECODE_ATTR`] for code-unit char data.
pub const INT_DECODE_CODE_UNITS: i32 = 2;

/// String-list attribute naming a struct's fields in order.
pub const FIELDS_ATTR: &str = "MATLAB_fields";

/// Optional integer attribute marking a top-level variable as global.
pub const GLOBAL_ATTR: &str = "MATLAB_global";

/// Path of the shared reference pool group.
pub const POOL_PATH: &str = "/#refs#";

/// Name of the reference pool group under the root.
pub const POOL_NAME: &str = "#refs#";

/// Absolute path of a pool slot.
pub fn pool_slot_path(slot: &str) -> String {
    format!("{}/{}", POOL_PATH, slot)
}

/// Join a child name onto a scope path.
pub(crate) fn child_path(scope: &str, name: &str) -> String {
    if scope.ends_with('/') {
        format!("{}{}", scope, name)
    } else {
        format!("{}/{}", scope, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_paths() {
        assert_eq!(POOL_PATH, format!("/{}", POOL_NAME));
        assert_eq!(pool_slot_path("12"), "/#refs#/12");
    }

    #[test]
    fn test_child_path() {
        assert_eq!(child_path("/", "x"), "/x");
        assert_eq!(child_path("/s", "x"), "/s/x");
    }
}
