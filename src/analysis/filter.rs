//! Row filters over relabeled records.

use crate::domain::{HourWindow, RUSH_HOURS, Record};

/// Keep records whose hour falls in any of `windows`, preserving order.
///
/// Records without an hour (daily rows) never match.
pub fn filter_hours<'a>(records: &'a [Record], windows: &[HourWindow]) -> Vec<&'a Record> {
    records
        .iter()
        .filter(|r| r.hour.is_some_and(|h| windows.iter().any(|w| w.contains(h))))
        .collect()
}

/// Keep records in the 7–9 and 16–19 commute windows.
pub fn rush_hours(records: &[Record]) -> Vec<&Record> {
    filter_hours(records, &RUSH_HOURS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fixtures::hourly;

    #[test]
    fn keeps_only_commute_hours() {
        let records: Vec<Record> = (0..24).map(|h| hourly(h, u32::from(h))).collect();
        let kept: Vec<u8> = rush_hours(&records).iter().filter_map(|r| r.hour).collect();
        assert_eq!(kept, vec![7, 8, 9, 16, 17, 18, 19]);
    }

    #[test]
    fn preserves_order_without_duplicates() {
        let records = vec![hourly(7, 10), hourly(22, 5), hourly(7, 20), hourly(19, 1), hourly(6, 3)];
        let kept = rush_hours(&records);
        let cnts: Vec<u32> = kept.iter().map(|r| r.cnt).collect();
        assert_eq!(cnts, vec![10, 20, 1]);
    }

    #[test]
    fn no_match_is_empty_not_error() {
        let records = vec![hourly(0, 1), hourly(12, 2), hourly(23, 3)];
        assert!(rush_hours(&records).is_empty());
    }

    #[test]
    fn rows_without_hour_never_match() {
        let mut day = hourly(8, 4);
        day.hour = None;
        assert!(rush_hours(&[day]).is_empty());
    }
}
