//! Extraction pipeline for watchkeeping reports.
//!
//! Orchestrates the per-document workflow: load the document, pick the
//! text source (PDF text layer or OCR), parse each sheet, sample the work
//! grid from the page image and collect reading records with statistics.
//! Pages are processed one after another; nothing is shared between runs.

use crate::config::{OcrMode, ProcessorConfig};
use crate::error::Result;
use crate::grid::WorkGrid;
use crate::loader::{PageLoader, RawPage, SourceDocument};
use crate::models::{PageHeader, ReadingRecord};
use crate::ocr::{TesseractCli, TextRecognizer};
use crate::parser::{self, PageParse, contains_sheet, normalize_ocr_text, split_sheets};

use colored::*;
use image::RgbImage;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Counters gathered while extracting records
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct ExtractionStats {
    /// Page level text units examined: OCR pages or text layer sheets
    pub pages_seen: usize,

    /// Hours-of-rest sheets recognised
    pub sheets_found: usize,

    /// Reading records produced
    pub records_parsed: usize,

    /// Table rows dropped as malformed
    pub rows_skipped: usize,

    /// Pages sent to the OCR engine
    pub ocr_pages: usize,

    /// Pages the OCR engine failed on
    pub ocr_failures: usize,

    /// Non-fatal errors for reporting
    pub errors: Vec<String>,
}

impl ExtractionStats {
    /// Share of table rows that became records, as a percentage
    pub fn success_rate(&self) -> f64 {
        let total = self.records_parsed + self.rows_skipped;
        if total == 0 {
            0.0
        } else {
            (self.records_parsed as f64 / total as f64) * 100.0
        }
    }

    pub fn merge(&mut self, other: &ExtractionStats) {
        self.pages_seen += other.pages_seen;
        self.sheets_found += other.sheets_found;
        self.records_parsed += other.records_parsed;
        self.rows_skipped += other.rows_skipped;
        self.ocr_pages += other.ocr_pages;
        self.ocr_failures += other.ocr_failures;
        self.errors.extend(other.errors.iter().cloned());
    }

    /// One-line summary for logs
    pub fn summary(&self) -> String {
        format!(
            "{} pages, {} sheets, {} records, {} rows skipped ({:.1}% success), {} OCR pages, {} OCR failures",
            self.pages_seen,
            self.sheets_found,
            self.records_parsed,
            self.rows_skipped,
            self.success_rate(),
            self.ocr_pages,
            self.ocr_failures
        )
    }
}

/// Output of one extraction run
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Headers of every sheet found, in document order
    pub sheets: Vec<PageHeader>,

    /// Reading records in document order
    pub records: Vec<ReadingRecord>,

    /// Work grids sampled from page images, one per sheet that had one
    pub grids: Vec<WorkGrid>,

    pub stats: ExtractionStats,
}

impl Extraction {
    /// Append another extraction, keeping document order
    pub fn merge(&mut self, other: Extraction) {
        self.sheets.extend(other.sheets);
        self.records.extend(other.records);
        self.grids.extend(other.grids);
        self.stats.merge(&other.stats);
    }

    /// Vessel named on the sheets; a run is expected to cover one ship
    pub fn vessel(&self) -> Option<&str> {
        let vessels: BTreeSet<&str> = self
            .sheets
            .iter()
            .filter_map(|header| header.vessel.as_deref())
            .collect();

        if vessels.len() > 1 {
            warn!(
                "Reports name {} different vessels ({}); using the first",
                vessels.len(),
                vessels.iter().copied().collect::<Vec<_>>().join(", ")
            );
        }

        self.sheets.iter().find_map(|header| header.vessel.as_deref())
    }

    fn add_page(&mut self, parse: PageParse, grid: Option<WorkGrid>) {
        let records = parse.records(grid.as_ref());

        self.stats.sheets_found += parse.sheets.len();
        self.stats.rows_skipped += parse.sheets.iter().map(|sheet| sheet.skipped_rows()).sum::<usize>();
        self.stats.records_parsed += records.len();

        self.sheets.extend(parse.sheets.into_iter().map(|sheet| sheet.header));
        self.records.extend(records);
        self.grids.extend(grid);
    }
}

/// Turns report documents into reading records
pub struct Extractor {
    config: ProcessorConfig,
    loader: PageLoader,
    recognizer: Box<dyn TextRecognizer>,
    show_progress: bool,
}

impl Extractor {
    /// Create an extractor using tesseract for OCR
    pub fn new(config: ProcessorConfig) -> Self {
        Self {
            loader: PageLoader::new(config.raster.clone()),
            recognizer: Box::new(TesseractCli::new(&config.ocr)),
            config,
            show_progress: false,
        }
    }

    /// Replace the OCR engine
    pub fn with_recognizer(mut self, recognizer: Box<dyn TextRecognizer>) -> Self {
        self.recognizer = recognizer;
        self
    }

    /// Show a progress bar while pages are processed
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Load and extract one report file
    pub fn extract_file(&self, path: &Path) -> Result<Extraction> {
        let document = self.loader.load(path)?;
        Ok(self.extract_document(&document))
    }

    /// Extract several files in order; any unreadable file aborts the run
    pub fn extract_files(&self, paths: &[PathBuf]) -> Result<Extraction> {
        let mut extraction = Extraction::default();

        for path in paths {
            let file_extraction = self.extract_file(path)?;
            info!(
                "{}: {}",
                path.display(),
                file_extraction.stats.summary()
            );
            extraction.merge(file_extraction);
        }

        if self.show_progress {
            println!(
                "  {} {} records from {} sheets",
                "Extracted".bright_green(),
                extraction.stats.records_parsed.to_string().bright_white().bold(),
                extraction.stats.sheets_found
            );
        }

        Ok(extraction)
    }

    /// Extract records from an already loaded document
    pub fn extract_document(&self, document: &SourceDocument) -> Extraction {
        let text_layer = document.text_layer.as_deref();

        let use_text_layer = match self.config.ocr.mode {
            OcrMode::Never => true,
            OcrMode::Auto => text_layer.is_some_and(contains_sheet),
            OcrMode::Always => !document.has_images() && text_layer.is_some(),
        };

        if self.config.ocr.mode == OcrMode::Always && use_text_layer {
            warn!(
                "{}: no page images to OCR, falling back to the text layer",
                document.path.display()
            );
        }

        if use_text_layer {
            match text_layer {
                Some(text) => self.extract_text_layer(text, &document.pages),
                None => {
                    warn!(
                        "{}: no text layer and OCR is disabled; {} pages skipped",
                        document.path.display(),
                        document.page_count()
                    );
                    Extraction {
                        stats: ExtractionStats {
                            pages_seen: document.page_count(),
                            ..ExtractionStats::default()
                        },
                        ..Extraction::default()
                    }
                }
            }
        } else {
            self.extract_with_ocr(&document.pages)
        }
    }

    /// Parse raw text blocks, one per page, without page images
    pub fn extract_text_blocks(&self, blocks: &[&str]) -> Extraction {
        let mut extraction = Extraction::default();
        for (page, text) in blocks.iter().enumerate() {
            extraction.stats.pages_seen += 1;
            extraction.add_page(parser::parse_page(text, page), None);
        }
        extraction
    }

    /// Text layer sheets line up with rendered pages only when the counts match
    fn extract_text_layer(&self, text: &str, pages: &[RawPage]) -> Extraction {
        let normalized = normalize_ocr_text(text);
        let blocks = split_sheets(&normalized);
        let mut extraction = Extraction::default();

        let aligned = !pages.is_empty() && blocks.len() == pages.len();
        if !pages.is_empty() && !aligned {
            warn!(
                "Text layer has {} sheets but the document has {} pages; hours worked unavailable",
                blocks.len(),
                pages.len()
            );
        }

        let progress = self.progress_bar(blocks.len() as u64, "Parsing text layer");
        for (index, block) in blocks.into_iter().enumerate() {
            let parse = PageParse {
                page: index,
                sheets: vec![parser::parse_sheet(block)],
            };
            let image = if aligned { pages[index].image.as_ref() } else { None };

            extraction.stats.pages_seen += 1;
            self.add_page_with_grid(&mut extraction, parse, image);
            progress.inc(1);
        }
        progress.finish_and_clear();

        extraction
    }

    fn extract_with_ocr(&self, pages: &[RawPage]) -> Extraction {
        let mut extraction = Extraction::default();
        let progress = self.progress_bar(pages.len() as u64, "Running OCR");

        for page in pages {
            extraction.stats.pages_seen += 1;
            progress.inc(1);

            let Some(image) = page.image.as_ref() else {
                warn!("Page {} has no image to OCR", page.number + 1);
                continue;
            };

            extraction.stats.ocr_pages += 1;
            match self.recognizer.recognize(image, page.number) {
                Ok(text) => {
                    let parse = parser::parse_page(&text, page.number);
                    self.add_page_with_grid(&mut extraction, parse, Some(image));
                }
                Err(e) => {
                    warn!("Skipping page {}: {}", page.number + 1, e);
                    extraction.stats.ocr_failures += 1;
                    extraction.stats.errors.push(e.to_string());
                }
            }
        }

        progress.finish_and_clear();
        debug!("OCR via {}: {}", self.recognizer.name(), extraction.stats.summary());
        extraction
    }

    fn add_page_with_grid(&self, extraction: &mut Extraction, parse: PageParse, image: Option<&RgbImage>) {
        let rows = parse.row_slots();
        let grid = match image {
            Some(image) if rows > 0 => Some(WorkGrid::sample(image, rows, &self.config.grid)),
            _ => None,
        };
        extraction.add_page(parse, grid);
    }

    fn progress_bar(&self, len: u64, message: &'static str) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let progress = ProgressBar::new(len);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        progress.set_message(message);
        progress
    }
}
