//! OCR adapter for scanned report pages.
//!
//! [`TextRecognizer`] is the seam between page images and the record
//! parser. The production implementation shells out to the tesseract
//! command line tool; tests substitute their own recognisers.

use crate::config::OcrConfig;
use crate::error::{Result, WatchkeeperError};
use image::{ImageFormat, RgbImage};
use std::process::Command;
use tracing::debug;

/// Turns a page image into raw text
pub trait TextRecognizer {
    /// Recognise the text of one page; `page` is used for error context
    fn recognize(&self, image: &RgbImage, page: usize) -> Result<String>;

    /// Engine name for logging
    fn name(&self) -> &str;
}

/// Tesseract invoked as an external process
#[derive(Debug, Clone)]
pub struct TesseractCli {
    program: String,
    language: String,
    page_segmentation_mode: u8,
}

impl TesseractCli {
    pub fn new(config: &OcrConfig) -> Self {
        Self {
            program: config.program.clone(),
            language: config.language.clone(),
            page_segmentation_mode: config.page_segmentation_mode,
        }
    }
}

impl TextRecognizer for TesseractCli {
    fn recognize(&self, image: &RgbImage, page: usize) -> Result<String> {
        let input = tempfile::Builder::new()
            .prefix("watchkeeper-page-")
            .suffix(".png")
            .tempfile()?;
        image.save_with_format(input.path(), ImageFormat::Png)?;

        let output = Command::new(&self.program)
            .arg(input.path())
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .arg("--psm")
            .arg(self.page_segmentation_mode.to_string())
            .output()
            .map_err(|e| {
                WatchkeeperError::ocr(page, self.name(), format!("failed to execute {}: {}", self.program, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(WatchkeeperError::ocr(page, self.name(), stderr.trim()));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!("OCR page {}: {} characters", page + 1, text.len());
        Ok(text)
    }

    fn name(&self) -> &str {
        "tesseract"
    }
}
