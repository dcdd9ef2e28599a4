//! Report layouts as plain data
//!
//! Each report is first built as one or more [`SheetTable`]s so the layout
//! can be checked without touching the filesystem. Rows follow the key
//! order of the aggregated maps, which keeps output deterministic.

use crate::aggregator::{AggregateTable, ComplianceSummary, OvertimeSummary};
use crate::constants::{HALF_HOUR_SLOTS, INVALID_SHEET_CHARS, MAX_SHEET_NAME_LEN};
use crate::grid::WorkGrid;
use crate::models::{AggregateKey, Metric, MonthPeriod, Summary};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;

/// One worksheet cell
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    fn optional(value: Option<f64>) -> Self {
        value.map_or(Cell::Empty, Cell::Number)
    }
}

/// A worksheet: a bold header row followed by data rows
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl SheetTable {
    /// Create an empty table; the name is made safe for Excel
    pub fn new(name: &str, headers: &[&str]) -> Self {
        Self {
            name: sanitize_sheet_name(name),
            headers: headers.iter().map(|header| header.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    /// Cell at a data row and column
    pub fn cell(&self, row: usize, column: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|cells| cells.get(column))
    }
}

/// Excel sheet names are at most 31 characters, exclude `[]:*?/\` and
/// may not start or end with an apostrophe
pub fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !INVALID_SHEET_CHARS.contains(c))
        .take(MAX_SHEET_NAME_LEN)
        .collect();
    let cleaned = cleaned
        .trim_matches(|c: char| c.is_whitespace() || c == '\'')
        .to_string();

    if cleaned.is_empty() {
        "Sheet1".to_string()
    } else {
        cleaned
    }
}

/// Lay out a two-key map as a matrix with blanks for missing pairs
fn pivot<R, C>(name: &str, corner: &str, cells: &BTreeMap<(R, C), f64>) -> SheetTable
where
    R: Ord + Clone + Display,
    C: Ord + Clone + Display,
{
    let row_keys: BTreeSet<&R> = cells.keys().map(|(row, _)| row).collect();
    let column_keys: BTreeSet<&C> = cells.keys().map(|(_, column)| column).collect();

    let mut table = SheetTable::new(name, &[corner]);
    table
        .headers
        .extend(column_keys.iter().map(|column| column.to_string()));

    for row_key in row_keys {
        let mut row = vec![Cell::text(row_key.to_string())];
        row.extend(column_keys.iter().map(|&column_key| {
            Cell::optional(cells.get(&(row_key.clone(), column_key.clone())).copied())
        }));
        table.push_row(row);
    }

    table
}

/// Months down, positions across, mean of the metric in each cell
pub fn means_table(table: &AggregateTable) -> SheetTable {
    let cells: BTreeMap<(MonthPeriod, String), f64> = table
        .iter()
        .map(|(key, summary)| ((key.month, key.position.clone()), summary.mean))
        .collect();
    pivot("Means", "Month", &cells)
}

/// Long format listing of every position and month group
pub fn summary_table(table: &AggregateTable) -> SheetTable {
    let mut sheet = SheetTable::new(
        "Summary",
        &["Position", "Month", "Count", "Mean", "Min", "Max", "Std Dev"],
    );
    for (AggregateKey { position, month }, summary) in table {
        sheet.push_row(vec![
            Cell::text(position.as_str()),
            Cell::text(month.to_string()),
            Cell::Number(summary.count as f64),
            Cell::Number(summary.mean),
            Cell::Number(summary.min),
            Cell::Number(summary.max),
            Cell::optional(summary.std_dev),
        ]);
    }
    sheet
}

/// Average of the metric per position for a single month
pub fn month_average_table(
    sheet_name: &str,
    summaries: &BTreeMap<String, Summary>,
    metric: Metric,
) -> SheetTable {
    let average = format!("Average {}", metric.label());
    let mut sheet = SheetTable::new(sheet_name, &["Position", average.as_str()]);
    for (position, summary) in summaries {
        sheet.push_row(vec![Cell::text(position.as_str()), Cell::Number(summary.mean)]);
    }
    sheet
}

/// Overtime and hours worked per month
pub fn overtime_by_month_table(
    sheet_name: &str,
    months: &BTreeMap<MonthPeriod, OvertimeSummary>,
) -> SheetTable {
    let mut sheet = SheetTable::new(sheet_name, &["Month", "Overtime", "Total Hours Worked"]);
    for (month, totals) in months {
        sheet.push_row(vec![
            Cell::text(month.to_string()),
            Cell::Number(totals.overtime),
            Cell::Number(totals.total_worked),
        ]);
    }
    sheet
}

/// Overtime and hours worked per position
pub fn overtime_by_position_table(
    sheet_name: &str,
    positions: &BTreeMap<String, OvertimeSummary>,
) -> SheetTable {
    let mut sheet = SheetTable::new(sheet_name, &["Position", "Overtime", "Total Hours Worked"]);
    for (position, totals) in positions {
        sheet.push_row(vec![
            Cell::text(position.as_str()),
            Cell::Number(totals.overtime),
            Cell::Number(totals.total_worked),
        ]);
    }
    sheet
}

/// Positions down, months across: one sheet of overtime, one of hours worked
pub fn overtime_matrix_tables(groups: &BTreeMap<AggregateKey, OvertimeSummary>) -> Vec<SheetTable> {
    let overtime: BTreeMap<(String, MonthPeriod), f64> = groups
        .iter()
        .map(|(key, totals)| ((key.position.clone(), key.month), totals.overtime))
        .collect();
    let worked: BTreeMap<(String, MonthPeriod), f64> = groups
        .iter()
        .map(|(key, totals)| ((key.position.clone(), key.month), totals.total_worked))
        .collect();

    vec![
        pivot("Overtimes", "Position", &overtime),
        pivot("Total Hours Worked", "Position", &worked),
    ]
}

/// Rest violations per month
pub fn violations_table(
    sheet_name: &str,
    months: &BTreeMap<MonthPeriod, ComplianceSummary>,
) -> SheetTable {
    let mut sheet = SheetTable::new(
        sheet_name,
        &[
            "Month",
            "Violations in any 24h",
            "Violations in any 7d",
            "Total Days Worked",
        ],
    );
    for (month, counts) in months {
        sheet.push_row(vec![
            Cell::text(month.to_string()),
            Cell::Number(counts.violations_24h as f64),
            Cell::Number(counts.violations_7d as f64),
            Cell::Number(counts.days_recorded as f64),
        ]);
    }
    sheet
}

/// Mean, spread and day count per seafarer
pub fn seafarer_table(seafarers: &BTreeMap<String, Summary>) -> SheetTable {
    let mut sheet = SheetTable::new("Seafarers", &["Seafarer", "Mean", "Std", "Number of Days"]);
    for (seafarer, summary) in seafarers {
        sheet.push_row(vec![
            Cell::text(seafarer.as_str()),
            Cell::Number(summary.mean),
            Cell::optional(summary.std_dev),
            Cell::Number(summary.count as f64),
        ]);
    }
    sheet
}

/// Start time of a half-hour slot, e.g. slot 3 is "01:30"
fn slot_label(slot: usize) -> String {
    format!("{:02}:{:02}", slot / 2, (slot % 2) * 30)
}

/// One `Page{n}` sheet per grid: day rows down, half-hour slots across,
/// 1 for work and 0 for rest. Rows that could not be sampled stay blank.
pub fn work_grid_tables(grids: &[WorkGrid]) -> Vec<SheetTable> {
    let slots: Vec<String> = (0..HALF_HOUR_SLOTS).map(slot_label).collect();

    grids
        .iter()
        .enumerate()
        .map(|(index, grid)| {
            let mut sheet = SheetTable::new(&format!("Page{}", index + 1), &["Row"]);
            sheet.headers.extend(slots.iter().cloned());

            for row in 0..grid.row_count() {
                let mut cells = vec![Cell::Number((row + 1) as f64)];
                match grid.cells(row) {
                    Some(flags) => cells.extend(
                        flags
                            .iter()
                            .map(|&worked| Cell::Number(if worked { 1.0 } else { 0.0 })),
                    ),
                    None => cells.extend(std::iter::repeat_n(Cell::Empty, HALF_HOUR_SLOTS)),
                }
                sheet.push_row(cells);
            }
            sheet
        })
        .collect()
}
