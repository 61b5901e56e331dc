//! Robust statistics engine.
//!
//! Pure numeric functions, no I/O. The median uses an exact element
//! selection rule rather than interpolation: downstream r-scores (and
//! regression comparisons against historical QC output) depend on the
//! median always being a member of the sample.

use crate::{Error, Result};

/// Return the value of the median element.
///
/// Values are sorted ascending and the element at index `h = (n-1)/2` is
/// selected. When `n` is even, two elements are nearest the middle; the
/// tie-break rounds `h` to the nearest integer and then clears its low
/// bit, so the one with even index is returned. This is deliberately not
/// the interpolating median: the result is always an observed value.
pub fn median(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(Error::EmptyInput);
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let h = (sorted.len() as f64 - 1.0) / 2.0;
    let mut idx = h as usize;
    if idx as f64 != h {
        // Even-length sample: round to nearest, then force an even index.
        idx = ((h + 0.5) as usize) & !1;
    }
    Ok(sorted[idx])
}

/// Each value converted to its deviation: the value minus the sample
/// median. Order is preserved.
pub fn deviation(values: &[f64]) -> Result<Vec<f64>> {
    let m = median(values)?;
    Ok(values.iter().map(|v| v - m).collect())
}

/// The median of the absolute deviations, a robust scale estimate.
pub fn mad(values: &[f64]) -> Result<f64> {
    let deviations: Vec<f64> = deviation(values)?.iter().map(|d| d.abs()).collect();
    median(&deviations)
}
