//! ASCII/Unicode charts for terminal output.
//!
//! This is intentionally "dumb" (fixed-width rows), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Bar charts draw one `#` run per group; box charts draw whiskers as `-`,
//! the interquartile box as `=` and the median as `|`.

use crate::dashboard::{ChartData, ChartView};
use crate::domain::{AggregationResult, BoxSummary};
use crate::report::{fmt_statistic, truncate};

const MAX_LABEL: usize = 24;
const MIN_BAR_WIDTH: usize = 10;

/// Render any chart body (no title).
pub fn render_chart(chart: &ChartView, width: usize) -> String {
    match &chart.data {
        ChartData::Bars(result) => render_bar_chart(result, width),
        ChartData::Boxes(boxes) => render_box_chart(boxes, width),
    }
}

/// Horizontal bars scaled to the largest group value.
pub fn render_bar_chart(result: &AggregationResult, width: usize) -> String {
    if result.is_empty() {
        return "(no data)\n".to_string();
    }

    let labels: Vec<String> = result
        .rows
        .iter()
        .map(|r| truncate(&r.key.to_string(), MAX_LABEL))
        .collect();
    let values: Vec<String> = result
        .rows
        .iter()
        .map(|r| fmt_statistic(r.value, result.statistic))
        .collect();

    let lw = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let vw = values.iter().map(String::len).max().unwrap_or(0);
    let bw = width.saturating_sub(lw + vw + 4).max(MIN_BAR_WIDTH);
    let max = result.max_value().unwrap_or(0.0);

    let mut out = String::new();
    for ((label, value), row) in labels.iter().zip(&values).zip(&result.rows) {
        let n = scale(row.value, max, bw);
        out.push_str(&format!("{label:<lw$} | {} {value}\n", "#".repeat(n)));
    }
    out
}

/// Box-and-whisker rows on a shared axis.
pub fn render_box_chart(boxes: &[BoxSummary], width: usize) -> String {
    if boxes.is_empty() {
        return "(no data)\n".to_string();
    }

    let labels: Vec<String> = boxes
        .iter()
        .map(|b| truncate(&b.key.to_string(), MAX_LABEL))
        .collect();
    let lw = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let bw = width.saturating_sub(lw + 3).max(MIN_BAR_WIDTH);

    let lo = boxes.iter().map(|b| b.lower_whisker).fold(f64::INFINITY, f64::min);
    let hi = boxes.iter().map(|b| b.upper_whisker).fold(f64::NEG_INFINITY, f64::max);
    let map = |v: f64| -> usize {
        if !(hi > lo) {
            return 0;
        }
        let u = ((v - lo) / (hi - lo)).clamp(0.0, 1.0);
        (u * (bw as f64 - 1.0)).round() as usize
    };

    let mut out = String::new();
    for (label, b) in labels.iter().zip(boxes) {
        let mut grid = vec![' '; bw];
        for cell in &mut grid[map(b.lower_whisker)..=map(b.upper_whisker)] {
            *cell = '-';
        }
        for cell in &mut grid[map(b.q1)..=map(b.q3)] {
            *cell = '=';
        }
        grid[map(b.median)] = '|';

        out.push_str(&format!(
            "{label:<lw$} | {} median={:.0} n={} outliers={}\n",
            grid.into_iter().collect::<String>(),
            b.median,
            b.count,
            b.outliers,
        ));
    }
    out.push_str(&format!("{:lw$}   {lo:.0} .. {hi:.0}\n", ""));
    out
}

fn scale(value: f64, max: f64, width: usize) -> usize {
    if !(max > 0.0) || !value.is_finite() || value <= 0.0 {
        return 0;
    }
    ((value / max) * width as f64).round().min(width as f64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, GroupKey, GroupRow, KeyPart, Statistic};

    fn row(hour: u8, count: usize, sum: u64, value: f64) -> GroupRow {
        GroupRow {
            key: GroupKey::single(KeyPart::Hour(hour)),
            count,
            sum,
            value,
        }
    }

    #[test]
    fn bar_chart_golden_snapshot_small() {
        let result = AggregationResult {
            statistic: Statistic::Mean,
            rows: vec![row(7, 2, 30, 15.0), row(8, 1, 30, 30.0)],
        };

        let txt = render_bar_chart(&result, 30);
        let expected = concat!(
            "07 | ########## 15.0\n",
            "08 | #################### 30.0\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn empty_chart_says_so() {
        let result = AggregationResult {
            statistic: Statistic::Sum,
            rows: Vec::new(),
        };
        assert_eq!(render_bar_chart(&result, 40), "(no data)\n");
        assert_eq!(render_box_chart(&[], 40), "(no data)\n");
    }

    #[test]
    fn box_chart_places_median_inside_box() {
        let b = BoxSummary {
            key: GroupKey::single(KeyPart::Category(Category::new(0, "Non-Holiday"))),
            count: 5,
            min: 0.0,
            q1: 25.0,
            median: 50.0,
            q3: 75.0,
            max: 100.0,
            mean: 50.0,
            lower_whisker: 0.0,
            upper_whisker: 100.0,
            outliers: 0,
        };
        let txt = render_box_chart(&[b], 25);
        let first = txt.lines().next().unwrap();
        assert!(first.starts_with("Non-Holiday | -"));
        assert!(first.contains("==|=="));
        assert!(first.ends_with("median=50 n=5 outliers=0"));
    }
}
