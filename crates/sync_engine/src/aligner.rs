//! Timestamp interval selection.

use std::ops::Range;

/// Selects the stream indices whose timestamps fall in a half-open interval.
///
/// Both streams share one time base; the selected stream must be strictly
/// increasing.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemporalAligner;

impl TemporalAligner {
    /// Indices `i` with `interval.start <= timestamps[i] < interval.end`.
    ///
    /// Two boundary searches, O(log n). An empty or inverted interval yields
    /// an empty range.
    pub fn select<T: Ord + Copy>(timestamps: &[T], interval: Range<T>) -> Range<usize> {
        let lower = timestamps.partition_point(|t| *t < interval.start);
        let upper = timestamps.partition_point(|t| *t < interval.end);
        lower..upper.max(lower)
    }
}
