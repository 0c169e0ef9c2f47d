//! Group-by aggregation of `cnt`.
//!
//! Keys come from a caller-supplied function so the same code serves single
//! fields, composite keys like `(hour, season)`, and binned attributes.
//! Records for which the key function returns `None` are left out.

use std::collections::BTreeMap;

use crate::analysis::binning::Binning;
use crate::analysis::filter::rush_hours;
use crate::domain::{
    AggregationResult, Attribute, Dataset, Granularity, GroupKey, GroupRow, KeyField, KeyPart, Record, Statistic,
};
use crate::error::AppError;

/// A complete aggregation request over one dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSpec {
    pub fields: Vec<KeyField>,
    /// Appended after `fields` as a bin key part.
    pub bin_by: Option<Attribute>,
    pub bin_count: usize,
    pub rush_hours_only: bool,
    pub statistic: Statistic,
}

/// Run `spec` over `dataset`: filter, fit bins on the filtered rows, then group.
pub fn aggregate(dataset: &Dataset, spec: &GroupSpec) -> Result<AggregationResult, AppError> {
    if spec.fields.is_empty() && spec.bin_by.is_none() {
        return Err(AppError::input("Nothing to group by: give at least one field or a bin attribute."));
    }
    if dataset.granularity == Granularity::Daily {
        if spec.fields.contains(&KeyField::Hour) {
            return Err(AppError::input("The daily dataset has no hour field to group by."));
        }
        if spec.rush_hours_only {
            return Err(AppError::input("Rush-hour filtering needs the hourly dataset."));
        }
    }

    let rows: Vec<&Record> = if spec.rush_hours_only {
        rush_hours(&dataset.records)
    } else {
        dataset.records.iter().collect()
    };

    let binning = spec
        .bin_by
        .map(|attribute| Binning::for_attribute(&rows, attribute, spec.bin_count).map(|b| (attribute, b)))
        .transpose()?;

    Ok(group_by(rows.iter().copied(), spec.statistic, |r| {
        let mut key = field_key(r, &spec.fields)?;
        if let Some((attribute, binning)) = &binning {
            key.0.push(KeyPart::Bin(*binning.locate(attribute.value(r))?));
        }
        Some(key)
    }))
}

/// Aggregate `cnt` per key. Rows come back sorted by key.
pub fn group_by<'a, I, F>(records: I, statistic: Statistic, mut key: F) -> AggregationResult
where
    I: IntoIterator<Item = &'a Record>,
    F: FnMut(&Record) -> Option<GroupKey>,
{
    let mut groups: BTreeMap<GroupKey, (usize, u64)> = BTreeMap::new();
    for record in records {
        let Some(k) = key(record) else { continue };
        let entry = groups.entry(k).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += u64::from(record.cnt);
    }

    let rows = groups
        .into_iter()
        .map(|(key, (count, sum))| GroupRow {
            key,
            count,
            sum,
            value: statistic_value(statistic, count, sum),
        })
        .collect();

    AggregationResult { statistic, rows }
}

/// Aggregate by one or more discrete fields, in the given order.
pub fn group_by_fields<'a, I>(records: I, fields: &[KeyField], statistic: Statistic) -> AggregationResult
where
    I: IntoIterator<Item = &'a Record>,
{
    group_by(records, statistic, |r| field_key(r, fields))
}

/// Aggregate by the bin each record's `attribute` falls into.
pub fn group_by_bin<'a, I>(records: I, binning: &Binning, attribute: Attribute, statistic: Statistic) -> AggregationResult
where
    I: IntoIterator<Item = &'a Record>,
{
    group_by(records, statistic, |r| {
        binning
            .locate(attribute.value(r))
            .map(|bin| GroupKey::single(KeyPart::Bin(*bin)))
    })
}

/// Composite key over `fields`, or `None` when any field is missing.
pub fn field_key(record: &Record, fields: &[KeyField]) -> Option<GroupKey> {
    fields
        .iter()
        .map(|f| f.key_part(record))
        .collect::<Option<Vec<_>>>()
        .map(GroupKey)
}

fn statistic_value(statistic: Statistic, count: usize, sum: u64) -> f64 {
    match statistic {
        Statistic::Sum => sum as f64,
        Statistic::Count => count as f64,
        Statistic::Mean => {
            if count == 0 {
                0.0
            } else {
                sum as f64 / count as f64
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::filter::rush_hours;
    use crate::analysis::fixtures::{daily as daily_row, hourly, with_season};
    use crate::domain::Category;

    #[test]
    fn rush_hour_mean_by_hour() {
        let records = vec![hourly(7, 10), hourly(7, 20), hourly(22, 5)];
        let rush = rush_hours(&records);
        assert_eq!(rush.len(), 2);

        let result = group_by_fields(rush.iter().copied(), &[KeyField::Hour], Statistic::Mean);
        assert_eq!(result.len(), 1);
        let row = result.get(&GroupKey::single(KeyPart::Hour(7))).unwrap();
        assert_eq!(row.value, 15.0);
        assert_eq!(row.count, 2);
    }

    #[test]
    fn sums_are_conserved() {
        let records = vec![
            with_season(hourly(8, 3), 1, "Spring"),
            with_season(hourly(8, 4), 2, "Summer"),
            with_season(hourly(9, 5), 1, "Spring"),
            with_season(hourly(8, 6), 1, "Spring"),
        ];
        let result = group_by_fields(&records, &[KeyField::Season], Statistic::Sum);

        assert_eq!(result.total_sum(), 18);
        assert_eq!(result.total_count(), records.len());
        let spring = GroupKey::single(KeyPart::Category(Category::new(1, "Spring")));
        assert_eq!(result.get(&spring).unwrap().value, 14.0);
    }

    #[test]
    fn mean_is_sum_over_count() {
        let records = vec![hourly(1, 1), hourly(1, 2), hourly(1, 4), hourly(2, 9)];
        let result = group_by_fields(&records, &[KeyField::Hour], Statistic::Mean);
        for row in &result.rows {
            assert_eq!(row.value, row.sum as f64 / row.count as f64);
        }
        let single = result.get(&GroupKey::single(KeyPart::Hour(2))).unwrap();
        assert_eq!(single.value, 9.0);
    }

    #[test]
    fn composite_keys_sort_by_hour_then_season_code() {
        let records = vec![
            with_season(hourly(9, 1), 4, "Winter"),
            with_season(hourly(8, 1), 3, "Fall"),
            with_season(hourly(9, 1), 1, "Spring"),
            with_season(hourly(8, 1), 1, "Spring"),
        ];
        let result = group_by_fields(&records, &[KeyField::Hour, KeyField::Season], Statistic::Count);
        let labels: Vec<String> = result.rows.iter().map(|r| r.key.to_string()).collect();
        assert_eq!(labels, ["08 / Spring", "08 / Fall", "09 / Spring", "09 / Winter"]);
    }

    #[test]
    fn empty_input_gives_empty_result() {
        let records = vec![hourly(0, 1), hourly(23, 2)];
        let rush = rush_hours(&records);
        let result = group_by_fields(rush.iter().copied(), &[KeyField::Hour], Statistic::Mean);
        assert!(result.is_empty());
        assert_eq!(result.max_value(), None);
    }

    #[test]
    fn rows_missing_a_key_field_are_skipped() {
        let mut day = hourly(0, 7);
        day.hour = None;
        let records = vec![day, hourly(5, 1)];
        let result = group_by_fields(&records, &[KeyField::Hour], Statistic::Sum);
        assert_eq!(result.total_sum(), 1);
    }

    fn request(fields: Vec<KeyField>, bin_by: Option<Attribute>, rush: bool) -> GroupSpec {
        GroupSpec {
            fields,
            bin_by,
            bin_count: 5,
            rush_hours_only: rush,
            statistic: Statistic::Sum,
        }
    }

    #[test]
    fn request_combines_filter_fields_and_bins() {
        let mut records = Vec::new();
        for hour in [6u8, 8, 8, 17, 23] {
            let mut r = hourly(hour, u32::from(hour));
            r.hum = f64::from(hour) / 24.0;
            records.push(r);
        }
        let dataset = Dataset::new(Granularity::Hourly, records);

        let result = aggregate(&dataset, &request(vec![KeyField::Hour], Some(Attribute::Hum), true)).unwrap();
        assert_eq!(result.total_sum(), 8 + 8 + 17);
        for row in &result.rows {
            assert!(matches!(row.key.parts(), [KeyPart::Hour(_), KeyPart::Bin(_)]));
        }
    }

    #[test]
    fn impossible_requests_are_rejected() {
        let daily_set = Dataset::new(Granularity::Daily, vec![daily_row(10)]);
        assert!(aggregate(&daily_set, &request(vec![KeyField::Hour], None, false)).is_err());
        assert!(aggregate(&daily_set, &request(vec![KeyField::Season], None, true)).is_err());
        assert!(aggregate(&daily_set, &request(Vec::new(), None, false)).is_err());
        assert!(aggregate(&daily_set, &request(vec![KeyField::Season], None, false)).is_ok());
    }

    #[test]
    fn binned_counts_cover_every_row() {
        let records: Vec<Record> = (0..50)
            .map(|i| {
                let mut r = hourly(8, i);
                r.temp = i as f64 / 49.0;
                r
            })
            .collect();
        let refs: Vec<&Record> = records.iter().collect();
        let binning = Binning::for_attribute(&refs, Attribute::Temp, 5).unwrap();
        let result = group_by_bin(refs.iter().copied(), &binning, Attribute::Temp, Statistic::Mean);

        assert_eq!(result.len(), 5);
        assert_eq!(result.total_count(), records.len());
        let indices: Vec<usize> = result
            .rows
            .iter()
            .filter_map(|r| match r.key.parts() {
                [KeyPart::Bin(b)] => Some(b.index),
                _ => None,
            })
            .collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
    }
}
