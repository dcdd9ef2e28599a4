//! Core data structures for watchkeeping report processing.
//!
//! Defines the sheet header, the per-day reading record, the month period
//! used as a grouping key, and the summary statistics produced by the
//! aggregator.

use crate::constants::{FULL_REST_24H, FULL_REST_7D};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Header fields printed at the top of one hours-of-rest sheet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageHeader {
    pub vessel: Option<String>,
    pub seafarer: Option<String>,
    /// Rank or watch station; required for a sheet to yield records
    pub position: Option<String>,
    /// Free text period label, e.g. "January 2024"
    pub period: Option<String>,
    /// Page label as printed, e.g. "1/3"
    pub page_label: Option<String>,
}

/// One hours-of-rest cell as read from the report
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RestValue {
    Hours(f64),
    /// Printed as N/A: no work fell in the window
    NotApplicable,
    /// Absent or unreadable
    Missing,
}

impl RestValue {
    /// Hours of rest with N/A read as a full rest window
    pub fn resolved(&self, full_window: f64) -> Option<f64> {
        match self {
            RestValue::Hours(hours) => Some(*hours),
            RestValue::NotApplicable => Some(full_window),
            RestValue::Missing => None,
        }
    }
}

/// One day of watchkeeping data for one seafarer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingRecord {
    pub date: NaiveDate,
    pub position: String,
    pub seafarer: Option<String>,
    pub vessel: Option<String>,
    /// Index of the source page in document order
    pub page: usize,
    /// Index of the day row within its sheet
    pub row: usize,
    /// Hours worked from the work grid, when a page image was available
    pub hours_worked: Option<f64>,
    pub rest_24h: RestValue,
    pub rest_7d: RestValue,
}

impl ReadingRecord {
    pub fn month(&self) -> MonthPeriod {
        MonthPeriod::from_date(self.date)
    }
}

/// Numeric value of a record selected for aggregation
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Metric {
    HoursWorked,
    #[value(name = "rest-24h")]
    #[serde(rename = "rest-24h")]
    RestIn24h,
    #[value(name = "rest-7d")]
    #[serde(rename = "rest-7d")]
    RestIn7d,
}

impl Metric {
    /// Extract this metric from a record; N/A rest counts as a full window
    pub fn value(&self, record: &ReadingRecord) -> Option<f64> {
        match self {
            Metric::HoursWorked => record.hours_worked,
            Metric::RestIn24h => record.rest_24h.resolved(FULL_REST_24H),
            Metric::RestIn7d => record.rest_7d.resolved(FULL_REST_7D),
        }
    }

    /// Human readable column title
    pub fn label(&self) -> &'static str {
        match self {
            Metric::HoursWorked => "Hours Worked",
            Metric::RestIn24h => "Hours of Rest in any 24h",
            Metric::RestIn7d => "Hours of Rest in any 7d",
        }
    }
}

/// Calendar month used as a grouping key
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawMonthPeriod")]
pub struct MonthPeriod {
    pub year: i32,
    pub month: u32,
}

/// Unchecked form read by serde before the month range is validated
#[derive(Deserialize)]
struct RawMonthPeriod {
    year: i32,
    month: u32,
}

impl TryFrom<RawMonthPeriod> for MonthPeriod {
    type Error = String;

    fn try_from(raw: RawMonthPeriod) -> Result<Self, Self::Error> {
        MonthPeriod::new(raw.year, raw.month)
            .ok_or_else(|| format!("month {} is outside 1-12", raw.month))
    }
}

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

impl MonthPeriod {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn month_name(&self) -> &'static str {
        self.month
            .checked_sub(1)
            .and_then(|index| MONTH_NAMES.get(index as usize))
            .copied()
            .unwrap_or("Unknown month")
    }

    /// Parse "YYYY-MM" as used on the command line
    pub fn parse(text: &str) -> Option<Self> {
        let (year, month) = text.trim().split_once('-')?;
        Self::new(year.parse().ok()?, month.parse().ok()?)
    }
}

impl fmt::Display for MonthPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.month_name(), self.year)
    }
}

/// Grouping key for the position by month table
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AggregateKey {
    pub position: String,
    pub month: MonthPeriod,
}

impl AggregateKey {
    pub fn new(position: impl Into<String>, month: MonthPeriod) -> Self {
        Self {
            position: position.into(),
            month,
        }
    }
}

/// Summary statistics for one group; only built from at least one value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// Sample standard deviation; None for a single value
    pub std_dev: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_period_display_and_order() {
        let jan = MonthPeriod::new(2024, 1).unwrap();
        let dec = MonthPeriod::new(2023, 12).unwrap();
        assert_eq!(jan.to_string(), "January 2024");
        assert!(dec < jan);
        assert!(MonthPeriod::new(2024, 13).is_none());
    }

    #[test]
    fn test_month_period_rejects_out_of_range_json() {
        let parsed: MonthPeriod = serde_json::from_str(r#"{"year":2024,"month":3}"#).unwrap();
        assert_eq!(parsed.to_string(), "March 2024");
        assert!(serde_json::from_str::<MonthPeriod>(r#"{"year":2024,"month":13}"#).is_err());
        assert!(serde_json::from_str::<MonthPeriod>(r#"{"year":2024,"month":0}"#).is_err());

        let unchecked = MonthPeriod { year: 2024, month: 0 };
        assert_eq!(unchecked.month_name(), "Unknown month");
    }

    #[test]
    fn test_month_period_parse() {
        assert_eq!(MonthPeriod::parse("2024-02"), MonthPeriod::new(2024, 2));
        assert_eq!(MonthPeriod::parse("2024-00"), None);
        assert_eq!(MonthPeriod::parse("February"), None);
    }

    #[test]
    fn test_metric_resolves_not_applicable() {
        let record = ReadingRecord {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            position: "Master".to_string(),
            seafarer: None,
            vessel: None,
            page: 0,
            row: 0,
            hours_worked: None,
            rest_24h: RestValue::NotApplicable,
            rest_7d: RestValue::Missing,
        };

        assert_eq!(Metric::RestIn24h.value(&record), Some(FULL_REST_24H));
        assert_eq!(Metric::RestIn7d.value(&record), None);
        assert_eq!(Metric::HoursWorked.value(&record), None);
        assert_eq!(record.month(), MonthPeriod::new(2024, 3).unwrap());
    }
}
