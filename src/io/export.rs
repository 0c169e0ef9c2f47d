//! Export chart tables to CSV, one file per chart.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::dashboard::{ChartData, ChartView, PageView};
use crate::error::AppError;
use crate::report::page_arg;

#[derive(Debug, Serialize)]
struct BarRow<'a> {
    page: &'a str,
    chart: &'a str,
    group: String,
    rows: usize,
    sum: u64,
    statistic: &'static str,
    value: f64,
}

#[derive(Debug, Serialize)]
struct BoxRow<'a> {
    page: &'a str,
    chart: &'a str,
    group: String,
    n: usize,
    min: f64,
    q1: f64,
    median: f64,
    q3: f64,
    max: f64,
    mean: f64,
    lower_whisker: f64,
    upper_whisker: f64,
    outliers: usize,
}

/// Write every chart of `pages` to `<dir>/<chart-id>.csv`. Returns the files written.
pub fn write_pages_csv(dir: &Path, pages: &[PageView]) -> Result<Vec<PathBuf>, AppError> {
    fs::create_dir_all(dir)
        .map_err(|e| AppError::input(format!("Failed to create export directory '{}': {e}", dir.display())))?;

    let mut written = Vec::new();
    for view in pages {
        let page = page_arg(view.page);
        for chart in &view.charts {
            let path = dir.join(format!("{}.csv", chart.id));
            write_chart_csv(&path, &page, chart)?;
            written.push(path);
        }
    }

    info!(dir = %dir.display(), files = written.len(), "CSV export written");
    Ok(written)
}

/// Write one chart's table to a CSV file.
pub fn write_chart_csv(path: &Path, page: &str, chart: &ChartView) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::input(format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let row_err = |e: csv::Error| AppError::input(format!("Failed to write export CSV row: {e}"));

    match &chart.data {
        ChartData::Bars(result) => {
            for r in &result.rows {
                writer
                    .serialize(BarRow {
                        page,
                        chart: &chart.id,
                        group: r.key.to_string(),
                        rows: r.count,
                        sum: r.sum,
                        statistic: result.statistic.display_name(),
                        value: r.value,
                    })
                    .map_err(row_err)?;
            }
        }
        ChartData::Boxes(boxes) => {
            for b in boxes {
                writer
                    .serialize(BoxRow {
                        page,
                        chart: &chart.id,
                        group: b.key.to_string(),
                        n: b.count,
                        min: b.min,
                        q1: b.q1,
                        median: b.median,
                        q3: b.q3,
                        max: b.max,
                        mean: b.mean,
                        lower_whisker: b.lower_whisker,
                        upper_whisker: b.upper_whisker,
                        outliers: b.outliers,
                    })
                    .map_err(row_err)?;
            }
        }
    }

    writer
        .flush()
        .map_err(|e| AppError::input(format!("Failed to flush export CSV '{}': {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AggregationResult, GroupKey, GroupRow, KeyPart, Statistic};

    #[test]
    fn writes_one_row_per_group() {
        let dir = tempfile::tempdir().unwrap();
        let chart = ChartView {
            id: "hour-mean".to_string(),
            title: "t".to_string(),
            x_label: "x".to_string(),
            y_label: "y".to_string(),
            data: ChartData::Bars(AggregationResult {
                statistic: Statistic::Mean,
                rows: vec![GroupRow {
                    key: GroupKey::single(KeyPart::Hour(7)),
                    count: 2,
                    sum: 30,
                    value: 15.0,
                }],
            }),
        };
        let path = dir.path().join("hour-mean.csv");
        write_chart_csv(&path, "rush-hour-factors", &chart).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "page,chart,group,rows,sum,statistic,value");
        assert_eq!(lines[1], "rush-hour-factors,hour-mean,07,2,30,mean,15.0");
        assert_eq!(lines.len(), 2);
    }
}
