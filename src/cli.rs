//! Command-line interface components.
//!
//! Parses arguments, sets up logging, layers configuration, finds the
//! report files and drives extraction and report writing.

use crate::aggregator;
use crate::config::{OcrMode, ProcessorConfig};
use crate::loader::SourceKind;
use crate::models::{Metric, MonthPeriod};
use crate::processor::{Extraction, Extractor};
use crate::writer::ReportWriter;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::*;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, warn};

#[derive(Parser, Debug, Clone)]
#[command(name = "watchkeeper_processor")]
#[command(about = "Extract ISF Watchkeeper hours-of-rest reports into Excel summaries")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// Report files (PDF or scanned images) or directories containing them
    #[arg(value_name = "INPUTS", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Directory the workbooks are written to
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Reports to write (repeatable)
    #[arg(short, long = "report", value_enum, default_value = "means")]
    pub reports: Vec<ReportKind>,

    /// Value aggregated by the means, month average and seafarer reports
    #[arg(long, value_enum)]
    pub metric: Option<Metric>,

    /// Month for the month average report, as YYYY-MM (default: every month found)
    #[arg(long, value_name = "YYYY-MM", value_parser = parse_month)]
    pub month: Option<MonthPeriod>,

    /// Daily hours worked above which time counts as overtime
    #[arg(long, value_name = "HOURS")]
    pub overtime_limit: Option<f64>,

    /// When to run OCR on page images
    #[arg(long, value_enum)]
    pub ocr: Option<OcrMode>,

    /// Configuration file (JSON)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors and hide progress
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Args {
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    pub fn show_progress(&self) -> bool {
        !self.quiet
    }

    /// Requested reports with `all` expanded, in a stable order
    pub fn report_kinds(&self) -> BTreeSet<ReportKind> {
        if self.reports.contains(&ReportKind::All) {
            ReportKind::value_variants()
                .iter()
                .copied()
                .filter(|kind| *kind != ReportKind::All)
                .collect()
        } else {
            self.reports.iter().copied().collect()
        }
    }
}

/// Workbooks the binary can write
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum ReportKind {
    /// Mean per position and month
    Means,
    /// Per position average for one month
    MonthAverage,
    /// Overtime per month
    OvertimeMonthly,
    /// Overtime per position
    OvertimePositions,
    /// Overtime per position and month
    OvertimePositionsMonthly,
    /// Rest violations per month
    Violations,
    /// Mean and spread per seafarer
    Seafarers,
    /// Sampled work grids, one sheet per page
    Grids,
    /// Every report above
    All,
}

fn parse_month(value: &str) -> std::result::Result<MonthPeriod, String> {
    MonthPeriod::parse(value).ok_or_else(|| format!("'{}' is not a month in YYYY-MM form", value))
}

/// Run the command line tool
pub fn run(args: Args) -> Result<()> {
    setup_logging(&args)?;
    let start_time = Instant::now();

    let config = load_config(&args)?;
    let inputs = discover_inputs(&args.inputs)?;
    if inputs.is_empty() {
        anyhow::bail!("No PDF or image reports found in the given inputs");
    }

    if args.show_progress() {
        println!("{}", "Extracting watchkeeping reports".bright_green().bold());
        println!("  {} {}", "Inputs:".bright_cyan(), inputs.len());
        println!("  {} {}", "Output:".bright_cyan(), args.output_dir.display());
    }

    let extractor = Extractor::new(config.clone()).with_progress(args.show_progress());
    let extraction = extractor
        .extract_files(&inputs)
        .context("Failed to extract reading records")?;

    if extraction.records.is_empty() {
        warn!("No reading records were extracted; workbooks will be empty");
    }

    let writer = ReportWriter::new(&args.output_dir, extraction.vessel());
    let written = write_reports(
        &writer,
        &args.report_kinds(),
        &extraction,
        &config,
        args.month,
    )
    .with_context(|| format!("Failed to write reports to {}", args.output_dir.display()))?;

    if args.show_progress() {
        print_summary(&extraction.stats, &written, start_time);
    }

    Ok(())
}

/// Set up tracing with an env filter defaulting to the verbosity flags
fn setup_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("watchkeeper_processor={}", log_level)));

    if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
            .context("Failed to initialise logging")?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .context("Failed to initialise logging")?;
    }

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Load configuration using layered approach (defaults -> file -> args)
fn load_config(args: &Args) -> Result<ProcessorConfig> {
    let mut config = ProcessorConfig::load_layered(args.config.as_deref())
        .context("Failed to load configuration")?;

    if let Some(mode) = args.ocr {
        config = config.with_ocr_mode(mode);
    }
    if let Some(metric) = args.metric {
        config = config.with_metric(metric);
    }
    if let Some(limit) = args.overtime_limit {
        config = config.with_overtime_limit(limit);
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Expand directories into their supported report files, sorted by name
pub fn discover_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        if !input.is_dir() {
            // missing files fail later with a proper input error
            files.push(input.clone());
            continue;
        }

        let before = files.len();
        for entry in walkdir::WalkDir::new(input).sort_by_file_name() {
            let entry = entry.with_context(|| format!("Failed to walk {}", input.display()))?;
            if entry.file_type().is_file() && SourceKind::from_path(entry.path()).is_some() {
                files.push(entry.into_path());
            }
        }

        if files.len() == before {
            warn!("No reports found in {}", input.display());
        }
    }

    debug!("Discovered {} input files", files.len());
    Ok(files)
}

/// Write each requested report, returning the created workbook paths
pub fn write_reports(
    writer: &ReportWriter,
    kinds: &BTreeSet<ReportKind>,
    extraction: &Extraction,
    config: &ProcessorConfig,
    month: Option<MonthPeriod>,
) -> Result<Vec<PathBuf>> {
    let records = extraction.records.as_slice();
    let metric = config.metric;
    let limit = config.overtime_limit_hours;
    let mut written = Vec::new();

    let overtime_requested = kinds.iter().any(|kind| {
        matches!(
            kind,
            ReportKind::OvertimeMonthly
                | ReportKind::OvertimePositions
                | ReportKind::OvertimePositionsMonthly
        )
    });
    if overtime_requested && records.iter().all(|record| record.hours_worked.is_none()) {
        warn!("No work grid hours were read; overtime reports will be empty");
    }

    for kind in kinds {
        match kind {
            ReportKind::Means => {
                let table = aggregator::mean_by_position_and_month(records, metric);
                written.push(writer.write_means(&table, metric)?);
            }
            ReportKind::MonthAverage => {
                let months: Vec<MonthPeriod> = match month {
                    Some(month) => vec![month],
                    None => aggregator::mean_by_month(records, metric).into_keys().collect(),
                };
                for month in months {
                    let summaries = aggregator::positions_in_month(records, metric, month);
                    written.push(writer.write_month_average(month, &summaries, metric)?);
                }
            }
            ReportKind::OvertimeMonthly => {
                let months = aggregator::overtime_by_month(records, limit);
                written.push(writer.write_overtime_monthly(&months, limit)?);
            }
            ReportKind::OvertimePositions => {
                let positions = aggregator::overtime_by_position(records, limit);
                written.push(writer.write_overtime_positions(&positions, limit)?);
            }
            ReportKind::OvertimePositionsMonthly => {
                let groups = aggregator::overtime_by_position_and_month(records, limit);
                written.push(writer.write_overtime_positions_monthly(&groups, limit)?);
            }
            ReportKind::Violations => {
                let months = aggregator::violations_by_month(records, &config.limits);
                written.push(writer.write_violations(&months)?);
            }
            ReportKind::Seafarers => {
                let seafarers = aggregator::summary_by_seafarer(records, metric);
                written.push(writer.write_seafarers(&seafarers)?);
            }
            ReportKind::Grids => {
                if extraction.grids.is_empty() {
                    warn!("No page images were sampled; skipping the work grid workbook");
                } else {
                    written.push(writer.write_work_grids(&extraction.grids)?);
                }
            }
            ReportKind::All => {}
        }
    }

    Ok(written)
}

fn print_summary(stats: &crate::processor::ExtractionStats, written: &[PathBuf], start_time: Instant) {
    println!("\n{}", "Extraction complete".bright_green().bold());
    println!(
        "  {} {}",
        "Sheets:".bright_cyan(),
        stats.sheets_found.to_string().bright_white().bold()
    );
    println!(
        "  {} {} ({:.1}% of table rows)",
        "Records:".bright_cyan(),
        stats.records_parsed.to_string().bright_white().bold(),
        stats.success_rate()
    );
    if stats.ocr_failures > 0 {
        println!(
            "  {} {}",
            "OCR failures:".bright_yellow(),
            stats.ocr_failures.to_string().bright_yellow()
        );
    }
    for path in written {
        println!("  {} {}", "Wrote".bright_green(), display_name(path));
    }
    println!(
        "  {} {:.2}s",
        "Elapsed:".bright_cyan(),
        start_time.elapsed().as_secs_f64()
    );
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{HALF_HOUR_SLOTS, WORK_GRID_FILE_NAME};
    use crate::grid::WorkGrid;
    use tempfile::TempDir;

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["watchkeeper_processor", "report.pdf"]).unwrap();
        assert_eq!(args.inputs, vec![PathBuf::from("report.pdf")]);
        assert_eq!(args.output_dir, PathBuf::from("."));
        assert_eq!(args.reports, vec![ReportKind::Means]);
        assert_eq!(args.get_log_level(), "warn");
        assert!(args.month.is_none());
    }

    #[test]
    fn test_all_reports_expand() {
        let args = Args::try_parse_from([
            "watchkeeper_processor",
            "-r",
            "all",
            "--month",
            "2024-03",
            "-vv",
            "a.pdf",
        ])
        .unwrap();

        let kinds = args.report_kinds();
        assert_eq!(kinds.len(), 8);
        assert!(kinds.contains(&ReportKind::Grids));
        assert!(!kinds.contains(&ReportKind::All));
        assert_eq!(args.month, MonthPeriod::new(2024, 3));
        assert_eq!(args.get_log_level(), "debug");
    }

    #[test]
    fn test_grid_report_needs_sampled_pages() {
        let temp_dir = TempDir::new().unwrap();
        let writer = ReportWriter::new(temp_dir.path(), None);
        let kinds = BTreeSet::from([ReportKind::Grids]);
        let config = ProcessorConfig::default();

        let written = write_reports(&writer, &kinds, &Extraction::default(), &config, None).unwrap();
        assert!(written.is_empty());

        let extraction = Extraction {
            grids: vec![WorkGrid::from_rows(vec![Some([true; HALF_HOUR_SLOTS])])],
            ..Extraction::default()
        };
        let written = write_reports(&writer, &kinds, &extraction, &config, None).unwrap();
        assert_eq!(written.len(), 1);
        assert_eq!(display_name(&written[0]), WORK_GRID_FILE_NAME);
    }

    #[test]
    fn test_invalid_month_rejected() {
        let result = Args::try_parse_from(["watchkeeper_processor", "--month", "March", "a.pdf"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        let result = Args::try_parse_from(["watchkeeper_processor", "-q", "-v", "a.pdf"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_discover_inputs_walks_directories_in_order() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("march");
        std::fs::create_dir(&nested).unwrap();
        for name in ["b.pdf", "a.png", "notes.txt"] {
            std::fs::write(temp_dir.path().join(name), b"").unwrap();
        }
        std::fs::write(nested.join("c.tif"), b"").unwrap();

        let files = discover_inputs(&[temp_dir.path().to_path_buf()]).unwrap();
        let names: Vec<String> = files.iter().map(|path| display_name(path)).collect();
        assert_eq!(names, vec!["a.png", "b.pdf", "c.tif"]);
    }
}
