//! Dimension ordering.
//!
//! MATLAB lists dimensions fastest-varying first (column-major); container
//! dataset shapes list them slowest-varying first (row-major). The same
//! element buffer is valid under both orders once the dimension vector is
//! reversed, so converting between the two is a reversal and nothing more.

/// Reverse a dimension vector between MATLAB and dataset order.
///
/// The permutation is its own inverse.
///
/// # Example
///
/// ```
/// use mat73_rs::permute_dims;
///
/// let shape = permute_dims(&[2, 3, 4]);
/// assert_eq!(shape, vec![4, 3, 2]);
/// assert_eq!(permute_dims(&shape), vec![2, 3, 4]);
/// ```
pub fn permute_dims(dims: &[usize]) -> Vec<usize> {
    dims.iter().rev().copied().collect()
}

/// Number of elements described by a dimension vector.
///
/// Returns `None` if the product does not fit in a `usize`.
pub fn element_count(dims: &[usize]) -> Option<usize> {
    dims.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
}
