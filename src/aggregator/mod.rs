//! Aggregation of reading records into summary tables
//!
//! Every function here is a pure pass over a slice of records that
//! returns an ordered map, so repeated runs over the same records yield
//! identical tables. Groups with no usable value never appear as keys.
//!
//! - [`mean_by_position_and_month`] - the main position by month table
//! - [`overtime`] - hours worked beyond a daily limit
//! - [`compliance`] - hours-of-rest violations

pub mod compliance;
pub mod overtime;

pub use compliance::{ComplianceSummary, violations_by_month};
pub use overtime::{
    OvertimeSummary, overtime_by_month, overtime_by_position, overtime_by_position_and_month,
};

use crate::models::{AggregateKey, Metric, MonthPeriod, ReadingRecord, Summary};
use std::collections::BTreeMap;
use tracing::debug;

/// Position by month summary table
pub type AggregateTable = BTreeMap<AggregateKey, Summary>;

/// Summarise a set of values; None for an empty set
pub fn summarize(values: &[f64]) -> Option<Summary> {
    if values.is_empty() {
        return None;
    }

    let count = values.len();
    let mean = values.iter().sum::<f64>() / count as f64;
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let std_dev = (count > 1).then(|| {
        let squares: f64 = values.iter().map(|value| (value - mean).powi(2)).sum();
        (squares / (count - 1) as f64).sqrt()
    });

    Some(Summary {
        count,
        mean,
        min,
        max,
        std_dev,
    })
}

/// Group metric values by key and summarise each group
fn group_summaries<K, F>(records: &[ReadingRecord], metric: Metric, key: F) -> BTreeMap<K, Summary>
where
    K: Ord,
    F: Fn(&ReadingRecord) -> Option<K>,
{
    let mut groups: BTreeMap<K, Vec<f64>> = BTreeMap::new();
    let mut without_value = 0;

    for record in records {
        let Some(group) = key(record) else {
            continue;
        };
        match metric.value(record) {
            Some(value) => groups.entry(group).or_default().push(value),
            None => without_value += 1,
        }
    }

    if without_value > 0 {
        debug!("{} records carried no {} value", without_value, metric.label());
    }

    groups
        .into_iter()
        .filter_map(|(group, values)| summarize(&values).map(|summary| (group, summary)))
        .collect()
}

/// Mean (with count, min, max and spread) per position and calendar month
pub fn mean_by_position_and_month(records: &[ReadingRecord], metric: Metric) -> AggregateTable {
    group_summaries(records, metric, |record| {
        Some(AggregateKey::new(record.position.clone(), record.month()))
    })
}

/// Summary per position across all months
pub fn mean_by_position(records: &[ReadingRecord], metric: Metric) -> BTreeMap<String, Summary> {
    group_summaries(records, metric, |record| Some(record.position.clone()))
}

/// Summary per calendar month across all positions
pub fn mean_by_month(records: &[ReadingRecord], metric: Metric) -> BTreeMap<MonthPeriod, Summary> {
    group_summaries(records, metric, |record| Some(record.month()))
}

/// Summary per position restricted to a single month
pub fn positions_in_month(
    records: &[ReadingRecord],
    metric: Metric,
    month: MonthPeriod,
) -> BTreeMap<String, Summary> {
    group_summaries(records, metric, |record| {
        (record.month() == month).then(|| record.position.clone())
    })
}

/// Summary per seafarer; records without a seafarer name are left out
pub fn summary_by_seafarer(records: &[ReadingRecord], metric: Metric) -> BTreeMap<String, Summary> {
    group_summaries(records, metric, |record| record.seafarer.clone())
}


#[cfg(test)]
mod tests {
    use super::fixtures::record;
    use super::*;
    use crate::models::RestValue;

    #[test]
    fn test_mean_of_three_values() {
        let summary = summarize(&[10.0, 20.0, 30.0]).unwrap();
        assert_eq!(summary.count, 3);
        assert_eq!(summary.mean, 20.0);
        assert_eq!(summary.min, 10.0);
        assert_eq!(summary.max, 30.0);
        assert_eq!(summary.std_dev, Some(10.0));
    }

    #[test]
    fn test_empty_set_has_no_summary() {
        assert_eq!(summarize(&[]), None);
        assert_eq!(summarize(&[4.0]).unwrap().std_dev, None);
    }

    #[test]
    fn test_groups_by_position_and_month() {
        let records = vec![
            record("P1", 2024, 1, 1, 10.0),
            record("P1", 2024, 1, 2, 20.0),
            record("P1", 2024, 1, 3, 30.0),
            record("P2", 2024, 1, 1, 8.0),
            record("P1", 2024, 2, 1, 6.0),
        ];

        let table = mean_by_position_and_month(&records, Metric::HoursWorked);
        let jan = MonthPeriod::new(2024, 1).unwrap();
        let feb = MonthPeriod::new(2024, 2).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table[&AggregateKey::new("P1", jan)].mean, 20.0);
        assert_eq!(table[&AggregateKey::new("P2", jan)].mean, 8.0);
        assert_eq!(table[&AggregateKey::new("P1", feb)].count, 1);
        assert!(!table.contains_key(&AggregateKey::new("P2", feb)));
    }

    #[test]
    fn test_groups_without_values_are_omitted() {
        let mut unknown = record("P3", 2024, 3, 1, 0.0);
        unknown.hours_worked = None;
        let records = vec![record("P1", 2024, 3, 1, 9.0), unknown];

        let table = mean_by_position_and_month(&records, Metric::HoursWorked);
        assert_eq!(table.len(), 1);
        assert!(table.keys().all(|key| key.position == "P1"));
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let records = vec![
            record("P1", 2024, 1, 1, 7.5),
            record("P2", 2024, 2, 1, 11.0),
            record("P1", 2024, 1, 2, 9.0),
        ];

        let first = mean_by_position_and_month(&records, Metric::RestIn24h);
        let second = mean_by_position_and_month(&records, Metric::RestIn24h);
        assert_eq!(first, second);
    }

    #[test]
    fn test_rest_metric_reads_not_applicable_as_full_day() {
        let mut off_duty = record("P1", 2024, 1, 2, 0.0);
        off_duty.rest_24h = RestValue::NotApplicable;
        let records = vec![record("P1", 2024, 1, 1, 12.0), off_duty];

        let by_position = mean_by_position(&records, Metric::RestIn24h);
        assert_eq!(by_position["P1"].mean, 18.0);
    }

    #[test]
    fn test_marginal_tables() {
        let records = vec![
            record("P1", 2024, 1, 1, 10.0),
            record("P2", 2024, 1, 1, 6.0),
            record("P2", 2024, 2, 1, 4.0),
        ];

        let by_month = mean_by_month(&records, Metric::HoursWorked);
        assert_eq!(by_month[&MonthPeriod::new(2024, 1).unwrap()].mean, 8.0);

        let january = positions_in_month(&records, Metric::HoursWorked, MonthPeriod::new(2024, 1).unwrap());
        assert_eq!(january.len(), 2);

        let by_seafarer = summary_by_seafarer(&records, Metric::HoursWorked);
        assert_eq!(by_seafarer["P2 seafarer"].count, 2);
        assert_eq!(by_seafarer["P2 seafarer"].mean, 5.0);
    }
}
