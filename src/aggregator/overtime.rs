//! Overtime totals derived from daily hours worked
//!
//! Overtime for a day is the hours worked beyond the daily limit. Days
//! without grid hours are ignored rather than counted as zero.

use crate::models::{AggregateKey, MonthPeriod, ReadingRecord};
use serde::Serialize;
use std::collections::BTreeMap;

/// Overtime and total hours for one group of days
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct OvertimeSummary {
    /// Sum over days of hours worked above the limit
    pub overtime: f64,
    /// Sum over days of hours worked
    pub total_worked: f64,
    /// Days with known hours worked
    pub days: usize,
}

impl OvertimeSummary {
    fn add_day(&mut self, worked: f64, limit: f64) {
        self.overtime += (worked - limit).max(0.0);
        self.total_worked += worked;
        self.days += 1;
    }
}

fn group_overtime<K, F>(records: &[ReadingRecord], limit: f64, key: F) -> BTreeMap<K, OvertimeSummary>
where
    K: Ord,
    F: Fn(&ReadingRecord) -> K,
{
    let mut groups: BTreeMap<K, OvertimeSummary> = BTreeMap::new();
    for record in records {
        if let Some(worked) = record.hours_worked {
            groups.entry(key(record)).or_default().add_day(worked, limit);
        }
    }
    groups
}

/// Overtime per calendar month
pub fn overtime_by_month(records: &[ReadingRecord], limit: f64) -> BTreeMap<MonthPeriod, OvertimeSummary> {
    group_overtime(records, limit, ReadingRecord::month)
}

/// Overtime per position
pub fn overtime_by_position(records: &[ReadingRecord], limit: f64) -> BTreeMap<String, OvertimeSummary> {
    group_overtime(records, limit, |record| record.position.clone())
}

/// Overtime per position and calendar month
pub fn overtime_by_position_and_month(
    records: &[ReadingRecord],
    limit: f64,
) -> BTreeMap<AggregateKey, OvertimeSummary> {
    group_overtime(records, limit, |record| {
        AggregateKey::new(record.position.clone(), record.month())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::fixtures::record;

    #[test]
    fn test_overtime_only_counts_hours_above_limit() {
        let records = vec![
            record("Master", 2024, 1, 1, 10.0),
            record("Master", 2024, 1, 2, 8.0),
            record("Master", 2024, 1, 3, 12.5),
        ];

        let by_position = overtime_by_position(&records, 8.0);
        let master = by_position["Master"];
        assert_eq!(master.overtime, 6.5);
        assert_eq!(master.total_worked, 30.5);
        assert_eq!(master.days, 3);
    }

    #[test]
    fn test_days_without_grid_hours_are_ignored() {
        let mut unknown = record("Cook", 2024, 2, 1, 0.0);
        unknown.hours_worked = None;
        let records = vec![unknown, record("Cook", 2024, 3, 1, 9.0)];

        let by_month = overtime_by_month(&records, 8.0);
        assert_eq!(by_month.len(), 1);
        assert_eq!(by_month[&MonthPeriod::new(2024, 3).unwrap()].overtime, 1.0);
    }

    #[test]
    fn test_overtime_by_position_and_month() {
        let records = vec![
            record("Cook", 2024, 1, 1, 11.0),
            record("Cook", 2024, 2, 1, 7.0),
            record("Bosun", 2024, 1, 1, 9.0),
        ];

        let table = overtime_by_position_and_month(&records, 8.0);
        let jan = MonthPeriod::new(2024, 1).unwrap();
        let feb = MonthPeriod::new(2024, 2).unwrap();
        assert_eq!(table[&AggregateKey::new("Cook", jan)].overtime, 3.0);
        assert_eq!(table[&AggregateKey::new("Cook", feb)].overtime, 0.0);
        assert_eq!(table[&AggregateKey::new("Cook", feb)].total_worked, 7.0);
        assert_eq!(table[&AggregateKey::new("Bosun", jan)].overtime, 1.0);
    }
}
