//! Page builders: which aggregations feed which chart.

use tracing::debug;

use crate::analysis::{Binning, box_summaries, field_key, group_by_bin, group_by_fields, rush_hours};
use crate::dashboard::{ChartData, ChartView, Page, PageView};
use crate::domain::{AggregationResult, Attribute, Dataset, Granularity, KeyField, Record, Statistic};
use crate::error::AppError;
use crate::io::ingest::IngestReport;

/// Both datasets, loaded and relabeled once, passed by reference to every page.
#[derive(Debug, Clone)]
pub struct DashboardData {
    pub hourly: Dataset,
    pub daily: Dataset,
    pub reports: Vec<IngestReport>,
}

impl DashboardData {
    pub fn dataset(&self, granularity: Granularity) -> &Dataset {
        match granularity {
            Granularity::Hourly => &self.hourly,
            Granularity::Daily => &self.daily,
        }
    }
}

/// Build every page in sidebar order.
pub fn build_pages(data: &DashboardData, bin_count: usize) -> Result<Vec<PageView>, AppError> {
    Page::ALL.iter().map(|&page| build_page(page, data, bin_count)).collect()
}

pub fn build_page(page: Page, data: &DashboardData, bin_count: usize) -> Result<PageView, AppError> {
    let charts = match page {
        Page::SeasonHolidays => season_holiday_charts(&data.hourly.records),
        Page::HolidayComparison => holiday_comparison_charts(&data.daily.records),
        Page::SeasonTotals => season_total_charts(&data.daily.records),
        Page::RushHourFactors => rush_hour_charts(&data.hourly.records, bin_count)?,
    };

    Ok(PageView {
        page,
        title: page.title().to_string(),
        question: page.question().to_string(),
        charts,
    })
}

fn season_holiday_charts(hourly: &[Record]) -> Vec<ChartView> {
    let by = |field: KeyField, statistic: Statistic| group_by_fields(hourly, &[KeyField::Hour, field], statistic);

    vec![
        bars(
            "hour-season-mean",
            "Bike Rentals by Hour and Season",
            KeyField::Hour.display_name(),
            "Average Rentals",
            by(KeyField::Season, Statistic::Mean),
        ),
        bars(
            "hour-holiday-mean",
            "Bike Rentals by Hour on Holidays vs Non-Holidays",
            KeyField::Hour.display_name(),
            "Average Rentals",
            by(KeyField::Holiday, Statistic::Mean),
        ),
        bars(
            "hour-season-total",
            "Total Rentals by Hour and Season",
            KeyField::Hour.display_name(),
            "Total Rentals",
            by(KeyField::Season, Statistic::Sum),
        ),
        bars(
            "hour-holiday-total",
            "Total Rentals by Hour and Holiday",
            KeyField::Hour.display_name(),
            "Total Rentals",
            by(KeyField::Holiday, Statistic::Sum),
        ),
    ]
}

fn holiday_comparison_charts(daily: &[Record]) -> Vec<ChartView> {
    vec![
        bars(
            "holiday-mean",
            "Average Bike Rentals: Holidays vs Non-Holidays",
            KeyField::Holiday.display_name(),
            "Average Total Rentals",
            group_by_fields(daily, &[KeyField::Holiday], Statistic::Mean),
        ),
        ChartView {
            id: "holiday-distribution".to_string(),
            title: "Distribution of Bike Rentals: Holidays vs Non-Holidays".to_string(),
            x_label: KeyField::Holiday.display_name().to_string(),
            y_label: "Total Rentals".to_string(),
            data: ChartData::Boxes(box_summaries(daily, |r| field_key(r, &[KeyField::Holiday]))),
        },
    ]
}

fn season_total_charts(daily: &[Record]) -> Vec<ChartView> {
    vec![bars(
        "season-total",
        "Total Bicycle Rentals by Season",
        KeyField::Season.display_name(),
        "Total Rentals",
        group_by_fields(daily, &[KeyField::Season], Statistic::Sum),
    )]
}

fn rush_hour_charts(hourly: &[Record], bin_count: usize) -> Result<Vec<ChartView>, AppError> {
    let rush = rush_hours(hourly);
    debug!(rows = rush.len(), "Rush-hour rows selected");

    let mut charts = Vec::with_capacity(Attribute::ALL.len() + 1);
    for attribute in Attribute::ALL {
        let binning = Binning::for_attribute(&rush, attribute, bin_count)?;
        let result = group_by_bin(rush.iter().copied(), &binning, attribute, Statistic::Mean);
        charts.push(bars(
            &format!("rush-{}-mean", attribute.column()),
            &format!("Average Bike Rentals by {} (Rush Hours)", attribute.display_name()),
            &format!("{} (Binned)", attribute.display_name()),
            "Average Rentals",
            result,
        ));
    }

    charts.push(bars(
        "rush-workingday-mean",
        "Average Bike Rentals by Working Day (Rush Hours)",
        KeyField::WorkingDay.display_name(),
        "Average Rentals",
        group_by_fields(rush.iter().copied(), &[KeyField::WorkingDay], Statistic::Mean),
    ));

    Ok(charts)
}

fn bars(id: &str, title: &str, x_label: &str, y_label: &str, result: AggregationResult) -> ChartView {
    ChartView {
        id: id.to_string(),
        title: title.to_string(),
        x_label: x_label.to_string(),
        y_label: y_label.to_string(),
        data: ChartData::Bars(result),
    }
}
