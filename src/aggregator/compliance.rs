//! Hours-of-rest violation counting
//!
//! A day violates the rules when its rest in any 24 hours or in any 7
//! days falls below the configured minimum. N/A cells mean no work fell
//! in the window and count as full rest; unreadable cells are never
//! treated as violations.

use crate::config::RestLimits;
use crate::constants::{FULL_REST_24H, FULL_REST_7D};
use crate::models::{MonthPeriod, ReadingRecord};
use serde::Serialize;
use std::collections::BTreeMap;

/// Violation counts for one month
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ComplianceSummary {
    pub violations_24h: usize,
    pub violations_7d: usize,
    /// Day rows recorded in the month
    pub days_recorded: usize,
}

/// Count violations per calendar month
pub fn violations_by_month(
    records: &[ReadingRecord],
    limits: &RestLimits,
) -> BTreeMap<MonthPeriod, ComplianceSummary> {
    let mut months: BTreeMap<MonthPeriod, ComplianceSummary> = BTreeMap::new();

    for record in records {
        let summary = months.entry(record.month()).or_default();
        summary.days_recorded += 1;

        if record
            .rest_24h
            .resolved(FULL_REST_24H)
            .is_some_and(|rest| rest < limits.min_rest_24h)
        {
            summary.violations_24h += 1;
        }
        if record
            .rest_7d
            .resolved(FULL_REST_7D)
            .is_some_and(|rest| rest < limits.min_rest_7d)
        {
            summary.violations_7d += 1;
        }
    }

    months
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::fixtures::record;
    use crate::models::RestValue;

    #[test]
    fn test_counts_violations_per_month() {
        let mut short_week = record("AB", 2024, 1, 2, 12.0);
        short_week.rest_7d = RestValue::Hours(70.0);
        let mut not_applicable = record("AB", 2024, 1, 3, 0.0);
        not_applicable.rest_24h = RestValue::NotApplicable;
        not_applicable.rest_7d = RestValue::NotApplicable;

        let records = vec![
            record("AB", 2024, 1, 1, 15.0), // 9h rest
            short_week,
            not_applicable,
            record("AB", 2024, 2, 1, 16.0), // 8h rest
        ];

        let months = violations_by_month(&records, &RestLimits::default());
        let jan = months[&MonthPeriod::new(2024, 1).unwrap()];
        assert_eq!(jan.violations_24h, 1);
        assert_eq!(jan.violations_7d, 1);
        assert_eq!(jan.days_recorded, 3);

        let feb = months[&MonthPeriod::new(2024, 2).unwrap()];
        assert_eq!(feb.violations_24h, 1);
        assert_eq!(feb.violations_7d, 0);
    }

    #[test]
    fn test_missing_rest_is_not_a_violation() {
        let mut unreadable = record("AB", 2024, 1, 1, 20.0);
        unreadable.rest_24h = RestValue::Missing;

        let months = violations_by_month(&[unreadable], &RestLimits::default());
        assert_eq!(months[&MonthPeriod::new(2024, 1).unwrap()].violations_24h, 0);
    }

    #[test]
    fn test_limit_itself_is_compliant() {
        let mut exactly = record("AB", 2024, 1, 1, 14.0);
        exactly.rest_7d = RestValue::Hours(77.0);

        let months = violations_by_month(&[exactly], &RestLimits::default());
        let jan = months[&MonthPeriod::new(2024, 1).unwrap()];
        assert_eq!(jan, ComplianceSummary {
            violations_24h: 0,
            violations_7d: 0,
            days_recorded: 1,
        });
    }
}
