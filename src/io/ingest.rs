//! CSV ingest and validation.
//!
//! This module turns the hourly/daily rental CSVs into `RawRecord`s and then
//! into relabeled `Dataset`s.
//!
//! Design goals:
//! - **Strict schema** for required columns (fatal, exit code 2, before any row is read)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **No aggregation logic here**

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::StringRecord;
use tracing::{debug, info, warn};

use crate::analysis::Labeler;
use crate::domain::{Dataset, Granularity, RawRecord};
use crate::error::AppError;

/// Columns every dataset must carry.
pub const REQUIRED_COLUMNS: [&str; 7] = ["season", "holiday", "workingday", "temp", "hum", "windspeed", "cnt"];

/// Extra column required by the hourly dataset.
pub const HOUR_COLUMN: &str = "hr";

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// What happened while reading one file.
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub source: PathBuf,
    pub granularity: Granularity,
    pub rows_read: usize,
    pub rows_used: usize,
    pub row_errors: Vec<RowError>,
}

/// Parsed rows (codes not yet relabeled) plus the ingest report.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub rows: Vec<RawRecord>,
    pub report: IngestReport,
}

/// Load a CSV file, relabel it, and return the dataset with its report.
pub fn load_dataset(path: &Path, granularity: Granularity, labeler: &Labeler) -> Result<(Dataset, IngestReport), AppError> {
    let ingested = load_raw(path, granularity)?;
    let records = labeler.relabel(granularity, &ingested.rows)?;
    Ok((Dataset::new(granularity, records), ingested.report))
}

/// Load and validate a CSV file into raw rows.
pub fn load_raw(path: &Path, granularity: Granularity) -> Result<IngestedData, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open CSV '{}': {e}", path.display())))?;
    read_raw(file, path, granularity)
}

/// Read raw rows from any reader. `source` is only used for messages.
pub fn read_raw<R: Read>(input: R, source: &Path, granularity: Granularity) -> Result<IngestedData, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| AppError::input(format!("Failed to read CSV headers from '{}': {e}", source.display())))?
        .clone();

    let header_map = build_header_map(&headers);
    ensure_required_columns_exist(&header_map, granularity, source)?;

    let mut rows = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // records() starts after the header, and lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, &header_map, granularity, line) {
            Ok(row) => rows.push(row),
            Err(message) => {
                debug!(line, %message, "Skipping row");
                row_errors.push(RowError { line, message });
            }
        }
    }

    let rows_used = rows.len();
    if !row_errors.is_empty() {
        warn!(
            source = %source.display(),
            skipped = row_errors.len(),
            "Rows skipped during ingest"
        );
    }
    if rows_used == 0 {
        return Err(AppError::data(format!(
            "No valid rows in {} dataset '{}'.",
            granularity.display_name(),
            source.display()
        )));
    }

    info!(
        source = %source.display(),
        dataset = granularity.display_name(),
        rows_read,
        rows_used,
        "Dataset loaded"
    );

    Ok(IngestedData {
        rows,
        report: IngestReport {
            source: source.to_path_buf(),
            granularity,
            rows_read,
            rows_used,
            row_errors,
        },
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn ensure_required_columns_exist(
    header_map: &HashMap<String, usize>,
    granularity: Granularity,
    source: &Path,
) -> Result<(), AppError> {
    let hour = (granularity == Granularity::Hourly).then_some(HOUR_COLUMN);
    for name in REQUIRED_COLUMNS.into_iter().chain(hour) {
        if !header_map.contains_key(name) {
            return Err(AppError::input(format!(
                "Missing required column `{name}` in '{}'.",
                source.display()
            )));
        }
    }
    Ok(())
}

fn parse_row(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    granularity: Granularity,
    line: usize,
) -> Result<RawRecord, String> {
    let hour = match granularity {
        Granularity::Hourly => Some(parse_hour(get_required(record, header_map, HOUR_COLUMN)?)?),
        Granularity::Daily => None,
    };

    let date = get_optional(record, header_map, "dteday")
        .map(parse_date)
        .transpose()?;

    Ok(RawRecord {
        line,
        date,
        hour,
        season: parse_code(record, header_map, "season")?,
        holiday: parse_code(record, header_map, "holiday")?,
        working_day: parse_code(record, header_map, "workingday")?,
        temp: parse_f64(record, header_map, "temp")?,
        hum: parse_f64(record, header_map, "hum")?,
        windspeed: parse_f64(record, header_map, "windspeed")?,
        cnt: parse_count(get_required(record, header_map, "cnt")?)?,
    })
}

fn parse_hour(s: &str) -> Result<u8, String> {
    match s.parse::<u8>() {
        Ok(h) if h < 24 => Ok(h),
        _ => Err(format!("Invalid `hr` value '{s}' (expected 0-23).")),
    }
}

fn parse_count(s: &str) -> Result<u32, String> {
    s.parse::<u32>()
        .map_err(|_| format!("Invalid `cnt` value '{s}' (expected a non-negative integer)."))
}

fn parse_code(record: &StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Result<i64, String> {
    let s = get_required(record, header_map, name)?;
    s.parse::<i64>()
        .map_err(|_| format!("Invalid `{name}` code '{s}' (expected an integer)."))
}

fn parse_f64(record: &StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Result<f64, String> {
    let s = get_required(record, header_map, name)?;
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(format!("Invalid `{name}` value '{s}'.")),
    }
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn get_optional<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    const FMTS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    Err(format!("Invalid date '{s}'. Expected one of: YYYY-MM-DD, DD/MM/YYYY, YYYY/MM/DD."))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOURLY: &str = "\u{feff}instant,dteday,season,yr,mnth,hr,holiday,weekday,workingday,weathersit,temp,atemp,hum,windspeed,casual,registered,cnt\n\
1,2011-01-01,1,0,1,0,0,6,0,1,0.24,0.2879,0.81,0,3,13,16\n\
2,2011-01-01,1,0,1,1,0,6,0,1,0.22,0.2727,0.8,0,8,32,40\n\
3,2011-01-01,1,0,1,25,0,6,0,1,0.22,0.2727,0.8,0,5,27,32\n\
4,2011-01-01,1,0,1,3,0,6,0,1,0.24,0.2879,0.75,0,3,10,-1\n";

    fn read(text: &str, granularity: Granularity) -> Result<IngestedData, AppError> {
        read_raw(text.as_bytes(), Path::new("test.csv"), granularity)
    }

    #[test]
    fn reads_hourly_rows_and_reports_bad_ones() {
        let data = read(HOURLY, Granularity::Hourly).unwrap();

        assert_eq!(data.report.rows_read, 4);
        assert_eq!(data.report.rows_used, 2);
        assert_eq!(data.report.row_errors.len(), 2);
        assert_eq!(data.report.row_errors[0].line, 4);
        assert!(data.report.row_errors[0].message.contains("`hr`"));
        assert!(data.report.row_errors[1].message.contains("`cnt`"));

        let first = &data.rows[0];
        assert_eq!(first.line, 2);
        assert_eq!(first.hour, Some(0));
        assert_eq!(first.cnt, 16);
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2011, 1, 1));
        assert!((first.hum - 0.81).abs() < 1e-12);
    }

    #[test]
    fn daily_data_needs_no_hour_column() {
        let text = "dteday,season,holiday,workingday,temp,hum,windspeed,cnt\n2011-01-01,1,0,0,0.34,0.80,0.16,985\n";
        let data = read(text, Granularity::Daily).unwrap();
        assert_eq!(data.rows.len(), 1);
        assert_eq!(data.rows[0].hour, None);
        assert_eq!(data.rows[0].cnt, 985);
    }

    #[test]
    fn missing_column_is_fatal() {
        let text = "season,holiday,workingday,temp,hum,cnt\n1,0,1,0.2,0.3,5\n";
        let err = read(text, Granularity::Daily).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_INPUT);
        assert!(err.message().contains("`windspeed`"));
    }

    #[test]
    fn hourly_data_requires_hour_column() {
        let text = "season,holiday,workingday,temp,hum,windspeed,cnt\n1,0,1,0.2,0.3,0.1,5\n";
        let err = read(text, Granularity::Hourly).unwrap_err();
        assert!(err.message().contains("`hr`"));
    }

    #[test]
    fn no_usable_rows_is_a_data_error() {
        let text = "season,holiday,workingday,temp,hum,windspeed,cnt\n1,0,1,oops,0.3,0.1,5\n";
        let err = read(text, Granularity::Daily).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_DATA);
    }

    #[test]
    fn header_names_are_case_insensitive() {
        let text = "SEASON,Holiday,WorkingDay,Temp,Hum,WindSpeed,CNT\n2,0,1,0.2,0.3,0.1,5\n";
        let data = read(text, Granularity::Daily).unwrap();
        assert_eq!(data.rows[0].season, 2);
    }
}
