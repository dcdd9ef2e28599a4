//! Integration tests for the extraction pipeline and report workbooks
//!
//! These tests drive text blocks and scanned page images through the
//! extractor, aggregate the records and read the written workbooks back
//! with calamine.

use calamine::{Data, Reader, open_workbook_auto};
use image::{Rgb, RgbImage};
use tempfile::TempDir;
use watchkeeper_processor::config::GridGeometry;
use watchkeeper_processor::{
    Extractor, Metric, OcrMode, ProcessorConfig, ReportWriter, Result, TextRecognizer,
    WatchkeeperError, aggregator,
};

const JANUARY_PAGE: &str = "RECORD OF HOURS OF REST\n\
Vessel: MV Aurora\n\
Seafarer (Full Name): Ana Costa\n\
Position (Rank): P1\n\
01/01/2024 14 5\n\
02/01/2024 13 15\n\
Page 1 of 2\n";

const FEBRUARY_PAGE: &str = "RECORD OF HOURS OF REST\n\
Vessel: MV Aurora\n\
Seafarer (Full Name): Ana Costa\n\
Position (Rank): P1\n\
01/02/2024 12 25\n\
Page 2 of 2\n";

/// OCR stand-in returning the same text for every page
struct FixedText(&'static str);

impl TextRecognizer for FixedText {
    fn recognize(&self, _image: &RgbImage, _page: usize) -> Result<String> {
        Ok(self.0.to_string())
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

/// Scanned sheet with `hours[i]` hours shaded on day row `i`
fn render_scan(geometry: &GridGeometry, hours: &[usize]) -> RgbImage {
    let width = geometry.columns.iter().max().copied().unwrap_or(0) + 20;
    let height = geometry.origin_y + geometry.row_pitch * hours.len() as u32 + 20;
    let mut image = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));

    for (row, &worked) in hours.iter().enumerate() {
        let y = geometry.origin_y + geometry.row_pitch * row as u32;
        // shade from 06:00 onwards
        for &x in geometry.columns.iter().skip(12).take(worked * 2) {
            image.put_pixel(x, y, Rgb([30, 30, 30]));
        }
    }
    image
}

/// Test the two page scenario from raw text to the means workbook
///
/// Purpose: Validate parsing, grouping by position and month and writing in one pass
/// Benefit: Ensures the numbers an operator reads in Excel match the report pages
#[test]
fn test_two_pages_to_means_workbook() {
    let temp_dir = TempDir::new().unwrap();
    let extractor = Extractor::new(ProcessorConfig::default());

    let extraction = extractor.extract_text_blocks(&[JANUARY_PAGE, FEBRUARY_PAGE]);
    assert_eq!(extraction.stats.sheets_found, 2);
    assert_eq!(extraction.records.len(), 3);
    assert_eq!(extraction.vessel(), Some("MV Aurora"));

    let table = aggregator::mean_by_position_and_month(&extraction.records, Metric::RestIn7d);
    assert_eq!(table.len(), 2);

    let writer = ReportWriter::new(temp_dir.path(), extraction.vessel());
    let path = writer.write_means(&table, Metric::RestIn7d).unwrap();

    let mut workbook = open_workbook_auto(&path).unwrap();
    let means = workbook.worksheet_range("Means").unwrap();
    assert_eq!(means.get_value((0, 1)), Some(&Data::String("P1".to_string())));
    assert_eq!(
        means.get_value((1, 0)),
        Some(&Data::String("January 2024".to_string()))
    );
    assert_eq!(means.get_value((1, 1)), Some(&Data::Float(10.0)));
    assert_eq!(
        means.get_value((2, 0)),
        Some(&Data::String("February 2024".to_string()))
    );
    assert_eq!(means.get_value((2, 1)), Some(&Data::Float(25.0)));

    let summary = workbook.worksheet_range("Summary").unwrap();
    assert_eq!(summary.get_value((1, 2)), Some(&Data::Float(2.0)));
}

/// Test a scanned page image through OCR, grid sampling and overtime
///
/// Purpose: Validate that hours worked are read from the shaded grid of a scan
/// Benefit: Ensures overtime reports reflect the gantt cells, not the rest columns
#[test]
fn test_scanned_page_to_overtime_workbook() {
    let temp_dir = TempDir::new().unwrap();
    let config = ProcessorConfig::default().with_ocr_mode(OcrMode::Always);
    let scan_path = temp_dir.path().join("scan.png");
    render_scan(&config.grid, &[8, 10]).save(&scan_path).unwrap();

    let extractor = Extractor::new(config.clone()).with_recognizer(Box::new(FixedText(JANUARY_PAGE)));
    let extraction = extractor.extract_files(&[scan_path]).unwrap();

    assert_eq!(extraction.stats.ocr_pages, 1);
    let worked: Vec<Option<f64>> = extraction.records.iter().map(|r| r.hours_worked).collect();
    assert_eq!(worked, vec![Some(8.0), Some(10.0)]);

    let months = aggregator::overtime_by_month(&extraction.records, config.overtime_limit_hours);
    let writer = ReportWriter::new(temp_dir.path().join("out"), extraction.vessel());
    let path = writer
        .write_overtime_monthly(&months, config.overtime_limit_hours)
        .unwrap();
    assert!(path.ends_with("MV Aurora overtime by month over 8 hours.xlsx"));

    let mut workbook = open_workbook_auto(&path).unwrap();
    let sheet = workbook.worksheet_range("MV Aurora").unwrap();
    assert_eq!(sheet.get_value((1, 1)), Some(&Data::Float(2.0)));
    assert_eq!(sheet.get_value((1, 2)), Some(&Data::Float(18.0)));

    assert_eq!(extraction.grids.len(), 1);
    let path = writer.write_work_grids(&extraction.grids).unwrap();
    let mut workbook = open_workbook_auto(&path).unwrap();
    let page = workbook.worksheet_range("Page1").unwrap();
    // day one is shaded from 06:00 for eight hours
    assert_eq!(page.get_value((1, 12)), Some(&Data::Float(0.0)));
    assert_eq!(page.get_value((1, 13)), Some(&Data::Float(1.0)));
    assert_eq!(page.get_value((1, 28)), Some(&Data::Float(1.0)));
    assert_eq!(page.get_value((1, 29)), Some(&Data::Float(0.0)));
}

/// Test that a missing input aborts the run
///
/// Purpose: Validate the fatal path for unreadable inputs
/// Benefit: Ensures a typo in a file name is reported instead of producing empty reports
#[test]
fn test_missing_input_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let extractor = Extractor::new(ProcessorConfig::default());

    let result = extractor.extract_files(&[temp_dir.path().join("missing.pdf")]);
    assert!(matches!(result, Err(WatchkeeperError::InputNotFound { .. })));
}
