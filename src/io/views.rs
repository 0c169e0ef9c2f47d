//! Read/write views JSON files.
//!
//! A views file is the "portable" representation of a dashboard run:
//! - run metadata (generation time, bin count)
//! - every built page with its chart tables
//!
//! `bikes plot --views <file>` re-renders it without the source CSVs.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::dashboard::PageView;
use crate::error::AppError;

pub const VIEWS_TOOL: &str = "bikes";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewsFile {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub bins: usize,
    pub pages: Vec<PageView>,
}

impl ViewsFile {
    pub fn new(pages: Vec<PageView>, bins: usize) -> Self {
        Self {
            tool: VIEWS_TOOL.to_string(),
            generated_at: Utc::now(),
            bins,
            pages,
        }
    }
}

/// Write a views JSON file.
pub fn write_views_json(path: &Path, views: &ViewsFile) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::input(format!("Failed to create views JSON '{}': {e}", path.display())))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, views)
        .map_err(|e| AppError::input(format!("Failed to write views JSON: {e}")))?;
    writer
        .flush()
        .map_err(|e| AppError::input(format!("Failed to flush views JSON '{}': {e}", path.display())))?;

    info!(path = %path.display(), pages = views.pages.len(), "Views JSON written");
    Ok(())
}

/// Read a views JSON file.
pub fn read_views_json(path: &Path) -> Result<ViewsFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open views JSON '{}': {e}", path.display())))?;
    let views: ViewsFile = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::input(format!("Invalid views JSON '{}': {e}", path.display())))?;

    if views.tool != VIEWS_TOOL {
        return Err(AppError::input(format!(
            "'{}' was not written by {VIEWS_TOOL} (tool = {:?}).",
            path.display(),
            views.tool
        )));
    }
    Ok(views)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::{ChartData, ChartView, Page};
    use crate::domain::{
        AggregationResult, Bin, BoxSummary, Category, GroupKey, GroupRow, KeyPart, Statistic,
    };

    fn page() -> PageView {
        let bin = Bin {
            index: 1,
            lower: 0.2,
            upper: 0.4,
            closed_low: false,
        };
        PageView {
            page: Page::RushHourFactors,
            title: Page::RushHourFactors.title().to_string(),
            question: Page::RushHourFactors.question().to_string(),
            charts: vec![
                ChartView {
                    id: "rush-temp-mean".to_string(),
                    title: "temp".to_string(),
                    x_label: "Temperature (Binned)".to_string(),
                    y_label: "Average Rentals".to_string(),
                    data: ChartData::Bars(AggregationResult {
                        statistic: Statistic::Mean,
                        rows: vec![GroupRow {
                            key: GroupKey(vec![KeyPart::Hour(8), KeyPart::Bin(bin)]),
                            count: 3,
                            sum: 300,
                            value: 100.0,
                        }],
                    }),
                },
                ChartView {
                    id: "holiday-distribution".to_string(),
                    title: "box".to_string(),
                    x_label: "Day Type".to_string(),
                    y_label: "Total Rentals".to_string(),
                    data: ChartData::Boxes(vec![BoxSummary {
                        key: GroupKey::single(KeyPart::Category(Category::new(1, "Holiday"))),
                        count: 1,
                        min: 5.0,
                        q1: 5.0,
                        median: 5.0,
                        q3: 5.0,
                        max: 5.0,
                        mean: 5.0,
                        lower_whisker: 5.0,
                        upper_whisker: 5.0,
                        outliers: 0,
                    }]),
                },
            ],
        }
    }

    #[test]
    fn views_file_reloads_identically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("views.json");
        let views = ViewsFile::new(vec![page()], 5);

        write_views_json(&path, &views).unwrap();
        let back = read_views_json(&path).unwrap();
        assert_eq!(back, views);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn failed_final_write_is_an_error() {
        // Writes to /dev/full fail with ENOSPC; a small file only hits it on flush.
        let path = Path::new("/dev/full");
        if !path.exists() {
            return;
        }
        let err = write_views_json(path, &ViewsFile::new(vec![page()], 5)).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_INPUT);
    }

    #[test]
    fn foreign_json_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("other.json");
        let mut views = ViewsFile::new(Vec::new(), 5);
        views.tool = "some-other-tool".to_string();
        write_views_json(&path, &views).unwrap();

        let err = read_views_json(&path).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_INPUT);
    }
}
