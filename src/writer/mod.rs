//! Excel report writing
//!
//! Reports are laid out as [`SheetTable`]s by the [`tables`] module and
//! written here with `rust_xlsxwriter`. Output files are named after the
//! vessel, so one writer serves one ship's report set.

pub mod tables;

pub use tables::{Cell, SheetTable, sanitize_sheet_name};

use crate::aggregator::{AggregateTable, ComplianceSummary, OvertimeSummary};
use crate::constants::{INVALID_FILE_NAME_CHARS, UNKNOWN_VESSEL, WORK_GRID_FILE_NAME};
use crate::error::Result;
use crate::grid::WorkGrid;
use crate::models::{AggregateKey, Metric, MonthPeriod, Summary};
use rust_xlsxwriter::{Format, Workbook};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Write tables to an .xlsx file, one worksheet per table
pub fn write_workbook(path: &Path, tables: &[SheetTable]) -> Result<()> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    for table in tables {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&table.name)?;

        for (column, header) in table.headers.iter().enumerate() {
            worksheet.write_string_with_format(0, column as u16, header, &header_format)?;
        }

        for (index, row) in table.rows.iter().enumerate() {
            let row_number = index as u32 + 1;
            for (column, cell) in row.iter().enumerate() {
                match cell {
                    Cell::Text(text) => {
                        worksheet.write_string(row_number, column as u16, text)?;
                    }
                    Cell::Number(value) => {
                        worksheet.write_number(row_number, column as u16, *value)?;
                    }
                    Cell::Empty => {}
                }
            }
        }

        debug!("Sheet '{}': {} rows", table.name, table.rows.len());
    }

    workbook.save(path)?;
    Ok(())
}

/// Replace path separators and characters Windows rejects, so a vessel name
/// cannot escape the output directory or break the file name
fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| if INVALID_FILE_NAME_CHARS.contains(&c) { '-' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Writes the report workbooks for one vessel
#[derive(Debug, Clone)]
pub struct ReportWriter {
    output_dir: PathBuf,
    vessel: String,
}

impl ReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>, vessel: Option<&str>) -> Self {
        let vessel = vessel
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(UNKNOWN_VESSEL);

        Self {
            output_dir: output_dir.into(),
            vessel: vessel.to_string(),
        }
    }

    pub fn vessel(&self) -> &str {
        &self.vessel
    }

    /// Write tables to `<output_dir>/<file_name>`, creating the directory if needed
    pub fn write_tables(&self, file_name: &str, tables: &[SheetTable]) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(sanitize_file_name(file_name));

        write_workbook(&path, tables)?;
        info!("Wrote {}", path.display());
        Ok(path)
    }

    /// Position by month means with a long format summary sheet
    pub fn write_means(&self, table: &AggregateTable, metric: Metric) -> Result<PathBuf> {
        let file_name = format!(
            "{} mean {} by position and month.xlsx",
            self.vessel,
            metric.label().to_lowercase()
        );
        self.write_tables(
            &file_name,
            &[tables::means_table(table), tables::summary_table(table)],
        )
    }

    /// Per position average for one month
    pub fn write_month_average(
        &self,
        month: MonthPeriod,
        summaries: &BTreeMap<String, Summary>,
        metric: Metric,
    ) -> Result<PathBuf> {
        let label = format!("{} {}", self.vessel, month);
        let file_name = format!("{} average hours by positions.xlsx", label);
        self.write_tables(
            &file_name,
            &[tables::month_average_table(&label, summaries, metric)],
        )
    }

    pub fn write_overtime_monthly(
        &self,
        months: &BTreeMap<MonthPeriod, OvertimeSummary>,
        limit: f64,
    ) -> Result<PathBuf> {
        let file_name = format!("{} overtime by month over {} hours.xlsx", self.vessel, limit);
        self.write_tables(
            &file_name,
            &[tables::overtime_by_month_table(&self.vessel, months)],
        )
    }

    pub fn write_overtime_positions(
        &self,
        positions: &BTreeMap<String, OvertimeSummary>,
        limit: f64,
    ) -> Result<PathBuf> {
        let file_name = format!("{} overtime by positions over {} hours.xlsx", self.vessel, limit);
        self.write_tables(
            &file_name,
            &[tables::overtime_by_position_table(&self.vessel, positions)],
        )
    }

    pub fn write_overtime_positions_monthly(
        &self,
        groups: &BTreeMap<AggregateKey, OvertimeSummary>,
        limit: f64,
    ) -> Result<PathBuf> {
        let file_name = format!(
            "{} overtime by positions and months over {} hours.xlsx",
            self.vessel, limit
        );
        self.write_tables(&file_name, &tables::overtime_matrix_tables(groups))
    }

    pub fn write_violations(&self, months: &BTreeMap<MonthPeriod, ComplianceSummary>) -> Result<PathBuf> {
        let file_name = format!("{} violations by month.xlsx", self.vessel);
        self.write_tables(&file_name, &[tables::violations_table(&self.vessel, months)])
    }

    pub fn write_seafarers(&self, seafarers: &BTreeMap<String, Summary>) -> Result<PathBuf> {
        let file_name = format!("{} mean and std of each seafarer.xlsx", self.vessel);
        self.write_tables(&file_name, &[tables::seafarer_table(seafarers)])
    }

    /// Sampled work grids as 0/1 cells, one `Page{n}` sheet per grid
    pub fn write_work_grids(&self, grids: &[WorkGrid]) -> Result<PathBuf> {
        self.write_tables(WORK_GRID_FILE_NAME, &tables::work_grid_tables(grids))
    }
}
