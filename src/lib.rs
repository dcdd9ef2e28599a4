//! Watchkeeper Processor Library
//!
//! A Rust library for turning ISF Watchkeeper "RECORD OF HOURS OF REST"
//! reports, exported as PDF or scanned to images, into Excel summaries.
//!
//! This library provides tools for:
//! - Loading PDF text layers and rendering pages to images
//! - Running OCR on scanned pages through an external engine
//! - Parsing sheet headers and day rows from noisy text
//! - Reading hours worked from the half-hour work grid
//! - Aggregating means, overtime and rest violations by position and month
//! - Writing the results to `.xlsx` workbooks
//!
//! ```rust
//! use watchkeeper_processor::{Extractor, Metric, ProcessorConfig, aggregator};
//!
//! let sheet = "RECORD OF HOURS OF REST\nPosition (Rank): Master\n\
//!              01/01/2024 14 84\n02/01/2024 10 80\n";
//! let extraction = Extractor::new(ProcessorConfig::default()).extract_text_blocks(&[sheet]);
//! let means = aggregator::mean_by_position_and_month(&extraction.records, Metric::RestIn24h);
//! assert_eq!(means.values().next().map(|summary| summary.mean), Some(12.0));
//! ```

pub mod aggregator;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod grid;
pub mod loader;
pub mod models;
pub mod ocr;
pub mod parser;
pub mod processor;
pub mod writer;

// Re-export commonly used types
pub use config::{OcrMode, ProcessorConfig};
pub use error::{Result, WatchkeeperError};
pub use loader::{PageLoader, SourceDocument};
pub use models::{AggregateKey, Metric, MonthPeriod, ReadingRecord, RestValue, Summary};
pub use ocr::{TesseractCli, TextRecognizer};
pub use processor::{Extraction, ExtractionStats, Extractor};
pub use writer::{ReportWriter, SheetTable};
