//! Breakpoint zones.
//!
//! A zone is one of the configured breakpoint widths. The active zone for a
//! viewport is the greatest breakpoint not exceeding the viewport width,
//! clamped to the first breakpoint for narrow viewports and to the last one
//! for wide viewports:
//!
//! ```text
//! breakpoints   360     480     768
//! width    0 ───┼───────┼───────┼──────▶
//! zone       360 │  360  │  480  │  768
//! ```

use crate::config::ConfigError;

/// A validated breakpoint list: at least two entries, strictly increasing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breakpoints(Vec<u32>);

impl Breakpoints {
    pub fn new(values: Vec<u32>) -> Result<Self, ConfigError> {
        validate_breakpoints(&values)?;
        Ok(Self(values))
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    /// Map a viewport width to its zone.
    ///
    /// # Examples
    /// ```
    /// # use smarter_images::zone::Breakpoints;
    /// let bp = Breakpoints::new(vec![360, 480, 768]).unwrap();
    /// assert_eq!(bp.resolve(200), 360);
    /// assert_eq!(bp.resolve(500), 480);
    /// assert_eq!(bp.resolve(2000), 768);
    /// ```
    pub fn resolve(&self, width: u32) -> u32 {
        resolve_unchecked(&self.0, width)
    }
}

/// Validate and resolve in one step, for callers holding a raw list.
pub fn resolve(breakpoints: &[u32], width: u32) -> Result<u32, ConfigError> {
    validate_breakpoints(breakpoints)?;
    Ok(resolve_unchecked(breakpoints, width))
}

/// Check the breakpoint invariants: `len >= 2`, strictly increasing.
pub fn validate_breakpoints(values: &[u32]) -> Result<(), ConfigError> {
    if values.len() < 2 {
        return Err(ConfigError::Validation(format!(
            "breakpoints must have at least 2 entries, got {}",
            values.len()
        )));
    }
    if let Some(pair) = values.windows(2).find(|pair| pair[0] >= pair[1]) {
        return Err(ConfigError::Validation(format!(
            "breakpoints must be strictly increasing ({} is followed by {})",
            pair[0], pair[1]
        )));
    }
    Ok(())
}

/// Resolution without validation. Requires a non-empty slice.
///
/// The mid-range scan keeps the last matching window rather than stopping
/// at the first, so malformed input resolves the same way every time.
fn resolve_unchecked(breakpoints: &[u32], width: u32) -> u32 {
    let first = breakpoints[0];
    let last = breakpoints[breakpoints.len() - 1];

    if width >= last {
        return last;
    }

    breakpoints
        .windows(2)
        .filter(|pair| pair[0] <= width && width < pair[1])
        .map(|pair| pair[0])
        .last()
        .unwrap_or(first)
}
