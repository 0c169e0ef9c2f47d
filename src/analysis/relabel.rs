//! Categorical relabeling: integer codes → display labels.

use std::collections::BTreeMap;

use tracing::warn;

use crate::domain::{Category, Granularity, RawRecord, Record, UnmappedPolicy};
use crate::error::AppError;

/// Fixed lookup from integer code to label for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryMap {
    field: &'static str,
    entries: BTreeMap<i64, String>,
}

impl CategoryMap {
    pub fn new<L: Into<String>>(field: &'static str, entries: impl IntoIterator<Item = (i64, L)>) -> Self {
        Self {
            field,
            entries: entries.into_iter().map(|(code, label)| (code, label.into())).collect(),
        }
    }

    pub fn seasons() -> Self {
        Self::new("season", [(1, "Spring"), (2, "Summer"), (3, "Fall"), (4, "Winter")])
    }

    pub fn holidays() -> Self {
        Self::new("holiday", [(0, "Non-Holiday"), (1, "Holiday")])
    }

    pub fn working_days() -> Self {
        Self::new("workingday", [(0, "Non-Working"), (1, "Working")])
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    pub fn label(&self, code: i64) -> Option<&str> {
        self.entries.get(&code).map(String::as_str)
    }

    /// Resolve `code` to a category, or `None` when the map has no entry.
    pub fn category(&self, code: i64) -> Option<Category> {
        self.label(code).map(|label| Category::new(code, label))
    }
}

/// The full set of maps applied to a dataset at load time.
#[derive(Debug, Clone)]
pub struct Labeler {
    pub season: CategoryMap,
    pub holiday: CategoryMap,
    pub working_day: CategoryMap,
    pub policy: UnmappedPolicy,
}

impl Labeler {
    pub fn new(policy: UnmappedPolicy) -> Self {
        Self {
            season: CategoryMap::seasons(),
            holiday: CategoryMap::holidays(),
            working_day: CategoryMap::working_days(),
            policy,
        }
    }

    /// Relabel every row, preserving order.
    pub fn relabel(&self, granularity: Granularity, raw: &[RawRecord]) -> Result<Vec<Record>, AppError> {
        let mut unmapped_rows = 0usize;
        let mut out = Vec::with_capacity(raw.len());

        for row in raw {
            let mut row_unmapped = false;
            let mut resolve = |map: &CategoryMap, code: i64| -> Result<Category, AppError> {
                if let Some(category) = map.category(code) {
                    return Ok(category);
                }
                match self.policy {
                    UnmappedPolicy::Error => Err(AppError::data(format!(
                        "Unmapped `{}` code {code} in {} data (line {}).",
                        map.field(),
                        granularity.display_name(),
                        row.line,
                    ))),
                    UnmappedPolicy::Unlabeled => {
                        row_unmapped = true;
                        Ok(Category::new(code, format!("unmapped({code})")))
                    }
                }
            };

            let season = resolve(&self.season, row.season)?;
            let holiday = resolve(&self.holiday, row.holiday)?;
            let working_day = resolve(&self.working_day, row.working_day)?;

            if row_unmapped {
                unmapped_rows += 1;
            }

            out.push(Record {
                date: row.date,
                hour: row.hour,
                season,
                holiday,
                working_day,
                temp: row.temp,
                hum: row.hum,
                windspeed: row.windspeed,
                cnt: row.cnt,
            });
        }

        if unmapped_rows > 0 {
            warn!(
                dataset = granularity.display_name(),
                rows = unmapped_rows,
                "Rows carry category codes without labels"
            );
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(line: usize, season: i64, holiday: i64) -> RawRecord {
        RawRecord {
            line,
            date: None,
            hour: Some(0),
            season,
            holiday,
            working_day: 1,
            temp: 0.5,
            hum: 0.5,
            windspeed: 0.1,
            cnt: 1,
        }
    }

    #[test]
    fn seasons_map_consistently() {
        let map = CategoryMap::new("season", [(1, "Spring"), (2, "Summer")]);
        let labels: Vec<_> = [1, 2, 1].iter().map(|&c| map.label(c).unwrap()).collect();
        assert_eq!(labels, ["Spring", "Summer", "Spring"]);
    }

    #[test]
    fn relabel_replaces_every_code() {
        let labeler = Labeler::new(UnmappedPolicy::Error);
        let rows = vec![raw(2, 1, 0), raw(3, 4, 1), raw(4, 1, 0)];
        let out = labeler.relabel(Granularity::Hourly, &rows).unwrap();

        assert_eq!(out[0].season.label, "Spring");
        assert_eq!(out[1].season.label, "Winter");
        assert_eq!(out[2].season, out[0].season);
        assert_eq!(out[0].holiday.label, "Non-Holiday");
        assert_eq!(out[1].holiday.label, "Holiday");
        assert_eq!(out[0].working_day.label, "Working");
    }

    #[test]
    fn unmapped_code_fails_under_error_policy() {
        let labeler = Labeler::new(UnmappedPolicy::Error);
        let err = labeler
            .relabel(Granularity::Daily, &[raw(2, 1, 0), raw(7, 9, 0)])
            .unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_DATA);
        assert!(err.message().contains("season"));
        assert!(err.message().contains("line 7"));
    }

    #[test]
    fn unmapped_code_passes_through_when_unlabeled() {
        let labeler = Labeler::new(UnmappedPolicy::Unlabeled);
        let out = labeler.relabel(Granularity::Daily, &[raw(2, 9, 0)]).unwrap();
        assert_eq!(out[0].season, Category::new(9, "unmapped(9)"));
    }
}
