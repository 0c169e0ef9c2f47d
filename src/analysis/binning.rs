//! Equal-width binning of a continuous attribute.
//!
//! The observed `[min, max]` range is split into `n` intervals of equal width.
//! Intervals are right-closed, `(lower, upper]`, and the first lower edge is
//! pulled down by 0.1% of the range so the minimum lands in the first bin.
//! The last upper edge is set to `max` exactly, so the maximum always lands in
//! the last bin regardless of rounding in `min + n * width`.
//!
//! A constant column (`min == max`) yields one closed bin `[min, max]`.

use crate::domain::{Attribute, Bin, Record};
use crate::error::AppError;

/// Fraction of the range used to open up the first bin's lower edge.
const LOW_EDGE_ADJUST: f64 = 0.001;

/// A fitted partition of an observed range.
#[derive(Debug, Clone, PartialEq)]
pub struct Binning {
    bins: Vec<Bin>,
}

impl Binning {
    /// Fit `count` equal-width bins over the observed range of `values`.
    ///
    /// Empty input yields a partition with no bins.
    pub fn equal_width(values: &[f64], count: usize) -> Result<Self, AppError> {
        if count == 0 {
            return Err(AppError::data("Bin count must be at least 1."));
        }
        if values.is_empty() {
            return Ok(Self { bins: Vec::new() });
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(AppError::data("Cannot bin non-finite values."));
        }

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        if max <= min {
            return Ok(Self {
                bins: vec![Bin {
                    index: 0,
                    lower: min,
                    upper: max,
                    closed_low: true,
                }],
            });
        }

        let range = max - min;
        let width = range / count as f64;
        let mut edges: Vec<f64> = (0..=count).map(|i| min + width * i as f64).collect();
        edges[0] = min - range * LOW_EDGE_ADJUST;
        edges[count] = max;

        let bins = edges
            .windows(2)
            .enumerate()
            .map(|(index, pair)| Bin {
                index,
                lower: pair[0],
                upper: pair[1],
                closed_low: false,
            })
            .collect();

        Ok(Self { bins })
    }

    /// Fit bins over one attribute of `records`.
    pub fn for_attribute(records: &[&Record], attribute: Attribute, count: usize) -> Result<Self, AppError> {
        let values: Vec<f64> = records.iter().map(|r| attribute.value(r)).collect();
        Self::equal_width(&values, count)
    }

    pub fn bins(&self) -> &[Bin] {
        &self.bins
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// The bin containing `value`, or `None` outside the fitted range.
    pub fn locate(&self, value: f64) -> Option<&Bin> {
        let first = self.bins.first()?;
        let last = self.bins.last()?;
        if !first.contains(value) && !(value > first.upper && value <= last.upper) {
            return None;
        }
        let idx = self.bins.partition_point(|b| b.upper < value);
        self.bins.get(idx)
    }
}
