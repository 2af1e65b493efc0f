//! The swap gate.
//!
//! Under the upsize-only policy an element never trades an image for a
//! smaller one: once a zone has been served, only that zone or a larger one
//! may replace it. Recording the served zone is the caller's job (see
//! [`Swapper::recompute`](crate::swapper::Swapper::recompute)).

/// Decide whether an element should be re-rendered for `zone`.
///
/// # Examples
/// ```
/// # use smarter_images::swap::should_swap;
/// assert!(should_swap(false, Some(768), 360));
/// assert!(should_swap(true, None, 360));
/// assert!(!should_swap(true, Some(768), 360));
/// ```
pub fn should_swap(upsize_only: bool, max_served_zone: Option<u32>, zone: u32) -> bool {
    if !upsize_only {
        return true;
    }
    match max_served_zone {
        None => true,
        Some(served) => zone >= served,
    }
}
