//! Dashboard pages.
//!
//! A page is a titled list of charts. Each chart is plain data (an
//! `AggregationResult` or a list of `BoxSummary`) plus labels, so the text
//! report, the views file and the TUI all render the same thing.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::domain::{AggregationResult, BoxSummary};

pub mod pages;

pub use pages::{DashboardData, build_page, build_pages};

/// The dashboard's navigation entries, in sidebar order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Page {
    SeasonHolidays,
    HolidayComparison,
    SeasonTotals,
    RushHourFactors,
}

impl Page {
    pub const ALL: [Page; 4] = [
        Page::SeasonHolidays,
        Page::HolidayComparison,
        Page::SeasonTotals,
        Page::RushHourFactors,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Page::SeasonHolidays => "Season & Holidays",
            Page::HolidayComparison => "Holidays & Non-Holidays",
            Page::SeasonTotals => "Most Rentals by Season",
            Page::RushHourFactors => "Rush-Hour Factors",
        }
    }

    /// The question the page answers.
    pub fn question(self) -> &'static str {
        match self {
            Page::SeasonHolidays => "How do bike rentals vary across seasons and holidays?",
            Page::HolidayComparison => "Is bike usage different on holidays compared to non-holidays?",
            Page::SeasonTotals => "In which season are the most bicycles rented?",
            Page::RushHourFactors => "Which factors influence bike rentals during rush hours?",
        }
    }

    pub fn index(self) -> usize {
        Page::ALL.iter().position(|p| *p == self).unwrap_or(0)
    }
}

/// Chart payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "lowercase")]
pub enum ChartData {
    Bars(AggregationResult),
    Boxes(Vec<BoxSummary>),
}

impl ChartData {
    pub fn is_empty(&self) -> bool {
        match self {
            ChartData::Bars(result) => result.is_empty(),
            ChartData::Boxes(boxes) => boxes.is_empty(),
        }
    }
}

/// One chart on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartView {
    /// Stable identifier, used for export file names.
    pub id: String,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub data: ChartData,
}

/// A fully built page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageView {
    pub page: Page,
    pub title: String,
    pub question: String,
    pub charts: Vec<ChartView>,
}
