//! Shared load pipeline used by the CLI, the exporter and the TUI.
//!
//! Keeping this in one place avoids duplicating the workflow:
//! CSV ingest -> relabel -> page builds
//!
//! The front-ends can then focus on presentation (printing vs widgets vs files).

use tracing::info;

use crate::analysis::Labeler;
use crate::dashboard::{DashboardData, PageView, build_pages};
use crate::domain::{DashboardConfig, Granularity};
use crate::error::AppError;
use crate::io::ingest::load_dataset;

/// Everything a front-end needs after one load.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub data: DashboardData,
    pub pages: Vec<PageView>,
}

/// Load and relabel both datasets.
pub fn load_data(config: &DashboardConfig) -> Result<DashboardData, AppError> {
    let labeler = Labeler::new(config.unmapped);
    let (hourly, hourly_report) = load_dataset(&config.hour_csv, Granularity::Hourly, &labeler)?;
    let (daily, daily_report) = load_dataset(&config.day_csv, Granularity::Daily, &labeler)?;

    info!(hourly = hourly.len(), daily = daily.len(), "Datasets ready");

    Ok(DashboardData {
        hourly,
        daily,
        reports: vec![hourly_report, daily_report],
    })
}

/// Load both datasets and build every page.
pub fn run_dashboard(config: &DashboardConfig) -> Result<RunOutput, AppError> {
    let data = load_data(config)?;
    let pages = build_pages(&data, config.bin_count)?;
    Ok(RunOutput { data, pages })
}
