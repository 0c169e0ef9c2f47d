//! Box-plot summaries of `cnt` per group.

use std::collections::BTreeMap;

use crate::domain::{BoxSummary, GroupKey, Record};

/// Whisker reach, in multiples of the interquartile range.
const WHISKER_IQR: f64 = 1.5;

/// One summary per key, sorted by key.
pub fn box_summaries<'a, I, F>(records: I, mut key: F) -> Vec<BoxSummary>
where
    I: IntoIterator<Item = &'a Record>,
    F: FnMut(&Record) -> Option<GroupKey>,
{
    let mut groups: BTreeMap<GroupKey, Vec<f64>> = BTreeMap::new();
    for record in records {
        if let Some(k) = key(record) {
            groups.entry(k).or_default().push(f64::from(record.cnt));
        }
    }

    groups
        .into_iter()
        .filter_map(|(key, mut values)| {
            values.sort_by(f64::total_cmp);
            summarize(key, &values)
        })
        .collect()
}

fn summarize(key: GroupKey, sorted: &[f64]) -> Option<BoxSummary> {
    let min = *sorted.first()?;
    let max = *sorted.last()?;
    let q1 = quantile(sorted, 0.25)?;
    let median = quantile(sorted, 0.5)?;
    let q3 = quantile(sorted, 0.75)?;
    let mean = sorted.iter().sum::<f64>() / sorted.len() as f64;

    let reach = (q3 - q1) * WHISKER_IQR;
    let (lo_fence, hi_fence) = (q1 - reach, q3 + reach);
    // Whiskers never reach inside the box, even when no point lies between fence and quartile.
    let lower_whisker = sorted.iter().copied().find(|&v| v >= lo_fence).unwrap_or(min).min(q1);
    let upper_whisker = sorted.iter().rev().copied().find(|&v| v <= hi_fence).unwrap_or(max).max(q3);
    let outliers = sorted.iter().filter(|&&v| v < lo_fence || v > hi_fence).count();

    Some(BoxSummary {
        key,
        count: sorted.len(),
        min,
        q1,
        median,
        q3,
        max,
        mean,
        lower_whisker,
        upper_whisker,
        outliers,
    })
}

/// Quantile of pre-sorted data with linear interpolation between closest ranks.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}
