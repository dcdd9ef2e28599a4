//! Record parser for ISF Watchkeeper hours-of-rest reports
//!
//! Turns the raw text of one page (PDF text layer or OCR output) into
//! reading records. The parser is deliberately permissive: anything it
//! cannot read is dropped and counted, never raised as an error, since
//! cover pages and OCR noise are expected.
//!
//! ## Architecture
//!
//! - [`fields`] - OCR-tolerant date and number parsing
//! - [`header`] - sheet header fields (vessel, seafarer, position, period)
//! - [`rows`] - day rows in column (text layer) or row (OCR) layout
//!
//! ## Usage
//!
//! ```rust
//! use watchkeeper_processor::parser::parse_page;
//!
//! let text = "RECORD OF HOURS OF REST\nPosition (Rank): Master\n01/01/2024 14 84\n";
//! let page = parse_page(text, 0);
//! let records = page.records(None);
//! assert_eq!(records.len(), 1);
//! ```

pub mod fields;
pub mod header;
pub mod rows;

#[cfg(test)]
pub mod tests;

pub use fields::normalize_ocr_text;
pub use header::parse_sheet_header;
pub use rows::{DayRow, RowLayout, RowParse, parse_day_rows};

use crate::constants::SHEET_MARKER;
use crate::grid::WorkGrid;
use crate::models::{PageHeader, ReadingRecord};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Sheet title with flexible spacing and the usual O/0 and I/1 OCR swaps
static SHEET_MARKER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    let words: Vec<String> = SHEET_MARKER
        .split_whitespace()
        .map(|word| {
            word.chars()
                .map(|c| match c {
                    'O' => "[O0]".to_string(),
                    'I' => "[I1l|]".to_string(),
                    other => regex::escape(&other.to_string()),
                })
                .collect()
        })
        .collect();
    Regex::new(&format!("(?i){}", words.join(r"\s+"))).expect("regex is valid")
});

/// One hours-of-rest sheet read from a page
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSheet {
    pub header: PageHeader,
    pub rows: RowParse,
}

impl ParsedSheet {
    /// Build reading records for this sheet, attaching grid hours when available
    pub fn records(&self, page: usize, grid: Option<&WorkGrid>) -> Vec<ReadingRecord> {
        let Some(position) = self.header.position.clone() else {
            if !self.rows.rows.is_empty() {
                warn!(
                    "Page {}: {} day rows dropped because the sheet has no position",
                    page + 1,
                    self.rows.rows.len()
                );
            }
            return Vec::new();
        };

        self.rows
            .rows
            .iter()
            .map(|row| ReadingRecord {
                date: row.date,
                position: position.clone(),
                seafarer: self.header.seafarer.clone(),
                vessel: self.header.vessel.clone(),
                page,
                row: row.index,
                hours_worked: grid.and_then(|grid| grid.hours_worked(row.index)),
                rest_24h: row.rest_24h,
                rest_7d: row.rest_7d,
            })
            .collect()
    }

    /// Rows that were recognised as table rows but dropped
    pub fn skipped_rows(&self) -> usize {
        self.rows.skipped
            + if self.header.position.is_none() {
                self.rows.rows.len()
            } else {
                0
            }
    }
}

/// All sheets found on one page
#[derive(Debug, Clone, PartialEq)]
pub struct PageParse {
    pub page: usize,
    pub sheets: Vec<ParsedSheet>,
}

impl PageParse {
    /// Records for every sheet on the page; the grid applies to single-sheet pages
    pub fn records(&self, grid: Option<&WorkGrid>) -> Vec<ReadingRecord> {
        let grid = if self.sheets.len() == 1 { grid } else { None };
        self.sheets
            .iter()
            .flat_map(|sheet| sheet.records(self.page, grid))
            .collect()
    }

    /// Table rows on the page, used to size the work grid
    pub fn row_slots(&self) -> usize {
        self.sheets.iter().map(|sheet| sheet.rows.row_slots).max().unwrap_or(0)
    }
}

/// Whether text contains at least one hours-of-rest sheet
pub fn contains_sheet(text: &str) -> bool {
    SHEET_MARKER_PATTERN.is_match(text)
}

/// Split text into sheet bodies; text before the first title is discarded
pub fn split_sheets(text: &str) -> Vec<&str> {
    SHEET_MARKER_PATTERN.split(text).skip(1).collect()
}

/// Parse a single sheet body
pub fn parse_sheet(text: &str) -> ParsedSheet {
    let header = parse_sheet_header(text);
    let rows = parse_day_rows(text);

    debug!(
        "Sheet for {:?}: {} rows read, {} skipped ({:?} layout)",
        header.position,
        rows.rows.len(),
        rows.skipped,
        rows.layout
    );

    ParsedSheet { header, rows }
}

/// Parse the raw text of one page into its sheets
pub fn parse_page(text: &str, page: usize) -> PageParse {
    let normalized = normalize_ocr_text(text);
    let sheets: Vec<ParsedSheet> = split_sheets(&normalized).into_iter().map(parse_sheet).collect();

    if sheets.is_empty() {
        debug!("Page {}: no hours-of-rest sheet found", page + 1);
    }

    PageParse { page, sheets }
}
