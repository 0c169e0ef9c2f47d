//! Aggregation engine.
//!
//! Every stage is a pure function from one view of the data to another:
//! relabel → filter → bin → group-by. Nothing here knows how results are drawn.

pub mod aggregate;
pub mod binning;
pub mod filter;
pub mod relabel;
pub mod summary;

pub use aggregate::{GroupSpec, aggregate, field_key, group_by, group_by_bin, group_by_fields};
pub use binning::Binning;
pub use filter::{filter_hours, rush_hours};
pub use relabel::{CategoryMap, Labeler};
pub use summary::{box_summaries, quantile};

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::domain::{Category, Record};

    pub fn hourly(hour: u8, cnt: u32) -> Record {
        Record {
            date: None,
            hour: Some(hour),
            season: Category::new(1, "Spring"),
            holiday: Category::new(0, "Non-Holiday"),
            working_day: Category::new(1, "Working"),
            temp: 0.5,
            hum: 0.5,
            windspeed: 0.2,
            cnt,
        }
    }

    pub fn daily(cnt: u32) -> Record {
        Record {
            hour: None,
            ..hourly(0, cnt)
        }
    }

    pub fn with_season(mut record: Record, code: i64, label: &str) -> Record {
        record.season = Category::new(code, label);
        record
    }

    pub fn with_holiday(mut record: Record, code: i64, label: &str) -> Record {
        record.holiday = Category::new(code, label);
        record
    }
}
