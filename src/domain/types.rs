//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during aggregation
//! - exported to JSON/CSV
//! - reloaded later for plotting

use std::cmp::Ordering;
use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Default number of equal-width bins for continuous attributes.
pub const DEFAULT_BIN_COUNT: usize = 5;

/// Morning and evening commute windows (inclusive).
pub const RUSH_HOURS: [HourWindow; 2] = [HourWindow::new(7, 9), HourWindow::new(16, 19)];

/// Row granularity of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Hourly,
    Daily,
}

impl Granularity {
    pub fn display_name(self) -> &'static str {
        match self {
            Granularity::Hourly => "hourly",
            Granularity::Daily => "daily",
        }
    }
}

/// What to do with a category code that has no label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum UnmappedPolicy {
    /// Abort loading on the first unmapped code.
    Error,
    /// Keep the row with an `unmapped(<code>)` label and log a warning.
    Unlabeled,
}

/// Summary statistic computed over `cnt` per group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Statistic {
    Sum,
    Mean,
    Count,
}

impl Statistic {
    pub fn display_name(self) -> &'static str {
        match self {
            Statistic::Sum => "total",
            Statistic::Mean => "mean",
            Statistic::Count => "rows",
        }
    }
}

/// Continuous attributes that can be binned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Attribute {
    Temp,
    Hum,
    Windspeed,
}

impl Attribute {
    pub const ALL: [Attribute; 3] = [Attribute::Temp, Attribute::Hum, Attribute::Windspeed];

    pub fn value(self, record: &Record) -> f64 {
        match self {
            Attribute::Temp => record.temp,
            Attribute::Hum => record.hum,
            Attribute::Windspeed => record.windspeed,
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            Attribute::Temp => "temp",
            Attribute::Hum => "hum",
            Attribute::Windspeed => "windspeed",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Attribute::Temp => "Temperature",
            Attribute::Hum => "Humidity",
            Attribute::Windspeed => "Windspeed",
        }
    }
}

/// Discrete fields a dataset can be grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum KeyField {
    Hour,
    Season,
    Holiday,
    WorkingDay,
}

impl KeyField {
    /// Key part for `record`, or `None` when the record lacks the field
    /// (daily rows have no hour).
    pub fn key_part(self, record: &Record) -> Option<KeyPart> {
        match self {
            KeyField::Hour => record.hour.map(KeyPart::Hour),
            KeyField::Season => Some(KeyPart::Category(record.season.clone())),
            KeyField::Holiday => Some(KeyPart::Category(record.holiday.clone())),
            KeyField::WorkingDay => Some(KeyPart::Category(record.working_day.clone())),
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            KeyField::Hour => "Hour of Day",
            KeyField::Season => "Season",
            KeyField::Holiday => "Day Type",
            KeyField::WorkingDay => "Working Day",
        }
    }
}

/// A relabeled categorical value. Ordering follows the code so seasons sort
/// in calendar order rather than alphabetically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Category {
    pub code: i64,
    pub label: String,
}

impl Category {
    pub fn new(code: i64, label: impl Into<String>) -> Self {
        Self {
            code,
            label: label.into(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// One CSV row with its category codes still in integer form.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// 1-based line in the source file (header is line 1).
    pub line: usize,
    pub date: Option<NaiveDate>,
    pub hour: Option<u8>,
    pub season: i64,
    pub holiday: i64,
    pub working_day: i64,
    pub temp: f64,
    pub hum: f64,
    pub windspeed: f64,
    pub cnt: u32,
}

/// One observation (an hour or a day) after relabeling.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub date: Option<NaiveDate>,
    pub hour: Option<u8>,
    pub season: Category,
    pub holiday: Category,
    pub working_day: Category,
    pub temp: f64,
    pub hum: f64,
    pub windspeed: f64,
    pub cnt: u32,
}

/// An immutable, relabeled dataset.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub granularity: Granularity,
    pub records: Vec<Record>,
}

impl Dataset {
    pub fn new(granularity: Granularity, records: Vec<Record>) -> Self {
        Self { granularity, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn total_cnt(&self) -> u64 {
        self.records.iter().map(|r| u64::from(r.cnt)).sum()
    }
}

/// Inclusive hour-of-day range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourWindow {
    pub start: u8,
    pub end: u8,
}

impl HourWindow {
    pub const fn new(start: u8, end: u8) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, hour: u8) -> bool {
        (self.start..=self.end).contains(&hour)
    }
}

/// One interval of an equal-width partition.
///
/// Intervals are `(lower, upper]`; `closed_low` marks the degenerate
/// single-bin case where the interval is `[lower, upper]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Bin {
    pub index: usize,
    pub lower: f64,
    pub upper: f64,
    #[serde(default)]
    pub closed_low: bool,
}

impl Bin {
    pub fn contains(&self, value: f64) -> bool {
        let above = if self.closed_low {
            value >= self.lower
        } else {
            value > self.lower
        };
        above && value <= self.upper
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

impl PartialEq for Bin {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Bin {}

impl PartialOrd for Bin {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Bin {
    fn cmp(&self, other: &Self) -> Ordering {
        self.index
            .cmp(&other.index)
            .then_with(|| self.lower.total_cmp(&other.lower))
            .then_with(|| self.upper.total_cmp(&other.upper))
    }
}

impl fmt::Display for Bin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let open = if self.closed_low { '[' } else { '(' };
        write!(f, "{open}{:.3}, {:.3}]", self.lower, self.upper)
    }
}

/// One component of a group key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyPart {
    Hour(u8),
    Category(Category),
    Bin(Bin),
}

impl fmt::Display for KeyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyPart::Hour(h) => write!(f, "{h:02}"),
            KeyPart::Category(c) => write!(f, "{c}"),
            KeyPart::Bin(b) => write!(f, "{b}"),
        }
    }
}

/// A (possibly composite) group key, e.g. `(hour, season)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupKey(pub Vec<KeyPart>);

impl GroupKey {
    pub fn single(part: KeyPart) -> Self {
        Self(vec![part])
    }

    pub fn parts(&self) -> &[KeyPart] {
        &self.0
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" / ")?;
            }
            write!(f, "{part}")?;
        }
        Ok(())
    }
}

/// One output row of a group-by aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRow {
    pub key: GroupKey,
    pub count: usize,
    pub sum: u64,
    /// The requested statistic (sum, mean or count) as a float.
    pub value: f64,
}

/// Per-group statistic of `cnt`, sorted by key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationResult {
    pub statistic: Statistic,
    pub rows: Vec<GroupRow>,
}

impl AggregationResult {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, key: &GroupKey) -> Option<&GroupRow> {
        self.rows
            .binary_search_by(|row| row.key.cmp(key))
            .ok()
            .map(|idx| &self.rows[idx])
    }

    pub fn total_count(&self) -> usize {
        self.rows.iter().map(|r| r.count).sum()
    }

    pub fn total_sum(&self) -> u64 {
        self.rows.iter().map(|r| r.sum).sum()
    }

    pub fn max_value(&self) -> Option<f64> {
        self.rows.iter().map(|r| r.value).reduce(f64::max)
    }
}

/// Distribution of `cnt` within one group, as drawn by a box plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxSummary {
    pub key: GroupKey,
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub mean: f64,
    /// Smallest observation within `q1 - 1.5 * IQR`.
    pub lower_whisker: f64,
    /// Largest observation within `q3 + 1.5 * IQR`.
    pub upper_whisker: f64,
    /// Observations beyond either whisker.
    pub outliers: usize,
}

/// Resolved run configuration shared by every front-end.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub hour_csv: PathBuf,
    pub day_csv: PathBuf,
    pub bin_count: usize,
    pub unmapped: UnmappedPolicy,
    /// Width (columns) of ASCII charts.
    pub chart_width: usize,
}
