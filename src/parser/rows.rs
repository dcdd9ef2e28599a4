//! Day row extraction for hours-of-rest sheets
//!
//! Two layouts reach the parser. The PDF text layer lists each table
//! column as a run of lines (all dates, then all rest values), while OCR
//! of a scanned page yields one line per day. Rows that cannot be read
//! are counted and dropped; they never abort the sheet.

use super::fields::{
    LeadingDate, ValueToken, parse_date, parse_value_token, split_leading_date, value_tokens,
};
use crate::constants::{FULL_REST_24H, FULL_REST_7D, REST_24H_LABEL, REST_7D_LABEL};
use crate::models::RestValue;
use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

static DATE_COLUMN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^[ \t|]*Date[ \t|]*$").expect("regex is valid"));

static REST_24H_COLUMN: LazyLock<Regex> =
    LazyLock::new(|| column_label_regex(REST_24H_LABEL));

static REST_7D_COLUMN: LazyLock<Regex> = LazyLock::new(|| column_label_regex(REST_7D_LABEL));

/// Column label matched at end of line with flexible spacing, e.g. "in  any 24 h"
fn column_label_regex(label: &str) -> Regex {
    let words: Vec<String> = label
        .split_whitespace()
        .map(|word| {
            word.chars()
                .map(|c| regex::escape(&c.to_string()))
                .collect::<Vec<_>>()
                .join(r"\s*")
        })
        .collect();
    Regex::new(&format!(r"(?im){}[ \t|]*$", words.join(r"\s+"))).expect("regex is valid")
}

/// Which table layout a sheet was read with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowLayout {
    /// Column-per-run text layer output
    Columns,
    /// One line per day, as produced by OCR
    Rows,
}

/// One readable day row
#[derive(Debug, Clone, PartialEq)]
pub struct DayRow {
    /// Position of the row in the sheet table, counting unreadable rows
    pub index: usize,
    pub date: NaiveDate,
    pub rest_24h: RestValue,
    pub rest_7d: RestValue,
}

/// All day rows found in a sheet
#[derive(Debug, Clone, PartialEq)]
pub struct RowParse {
    pub layout: RowLayout,
    pub rows: Vec<DayRow>,
    /// Rows that looked like table rows but could not be read
    pub skipped: usize,
    /// Table rows seen, readable or not; sizes the work grid
    pub row_slots: usize,
}

/// Extract day rows, preferring the column layout when its labels are present
pub fn parse_day_rows(text: &str) -> RowParse {
    parse_column_layout(text).unwrap_or_else(|| parse_row_layout(text))
}

/// Lines following a column label up to the next blank line
fn column_block<'a>(text: &'a str, label: &Regex) -> Option<Vec<&'a str>> {
    let found = label.find(text)?;
    let block: Vec<&str> = text[found.end()..]
        .lines()
        .skip_while(|line| line.trim().is_empty())
        .take_while(|line| !line.trim().is_empty())
        .collect();
    Some(block)
}

fn parse_column_layout(text: &str) -> Option<RowParse> {
    let dates = column_block(text, &DATE_COLUMN)?;
    let rest_24h = column_block(text, &REST_24H_COLUMN);
    let rest_7d = column_block(text, &REST_7D_COLUMN);

    if rest_24h.is_none() && rest_7d.is_none() {
        return None;
    }
    // OCR output can carry a lone "Date" heading above full rows
    if !dates.iter().any(|line| parse_date(line).is_some()) {
        return None;
    }

    let mut rows = Vec::new();
    let mut skipped = 0;

    for (index, line) in dates.iter().enumerate() {
        match split_leading_date(line) {
            Some(LeadingDate::Valid(date, rest)) if rest.trim().is_empty() => {
                rows.push(DayRow {
                    index,
                    date,
                    rest_24h: column_value(rest_24h.as_deref(), index, FULL_REST_24H),
                    rest_7d: column_value(rest_7d.as_deref(), index, FULL_REST_7D),
                });
            }
            _ => {
                debug!("Skipping unreadable date row {}: '{}'", index, line.trim());
                skipped += 1;
            }
        }
    }

    Some(RowParse {
        layout: RowLayout::Columns,
        rows,
        skipped,
        row_slots: dates.len(),
    })
}

fn column_value(column: Option<&[&str]>, index: usize, window: f64) -> RestValue {
    let Some(line) = column.and_then(|lines| lines.get(index)) else {
        return RestValue::Missing;
    };

    match parse_value_token(line.trim()) {
        Some(token) => rest_value(token, window).unwrap_or_else(|| {
            debug!("Rest value '{}' outside 0-{} hours", line.trim(), window);
            RestValue::Missing
        }),
        None => RestValue::Missing,
    }
}

/// Convert a token to a rest value, rejecting hours outside the window
fn rest_value(token: ValueToken, window: f64) -> Option<RestValue> {
    match token {
        ValueToken::NotApplicable => Some(RestValue::NotApplicable),
        ValueToken::Number(hours) if hours <= window => Some(RestValue::Hours(hours)),
        ValueToken::Number(_) => None,
    }
}

fn parse_row_layout(text: &str) -> RowParse {
    let mut rows = Vec::new();
    let mut skipped = 0;
    let mut row_slots = 0;

    for line in text.lines() {
        let Some(leading) = split_leading_date(line) else {
            continue;
        };
        let index = row_slots;
        row_slots += 1;

        let (date, remainder) = match leading {
            LeadingDate::Valid(date, remainder) => (date, remainder),
            LeadingDate::Invalid(found) => {
                debug!("Skipping row {} with invalid date '{}'", index, found);
                skipped += 1;
                continue;
            }
        };

        let tokens = value_tokens(remainder);
        let parsed = match tokens.as_slice() {
            [.., day, week] => rest_value(*day, FULL_REST_24H).zip(rest_value(*week, FULL_REST_7D)),
            _ => None,
        };

        match parsed {
            Some((rest_24h, rest_7d)) => rows.push(DayRow {
                index,
                date,
                rest_24h,
                rest_7d,
            }),
            None => {
                debug!("Skipping malformed row {}: '{}'", index, line.trim());
                skipped += 1;
            }
        }
    }

    RowParse {
        layout: RowLayout::Rows,
        rows,
        skipped,
        row_slots,
    }
}
