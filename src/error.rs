//! Error handling for watchkeeping report processing.
//!
//! Provides error types with context for document loading, OCR,
//! configuration and workbook writing failures. Row-level parse problems
//! are not errors: they are counted and skipped by the parser.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WatchkeeperError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Workbook error: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),

    #[error("Configuration file error: {0}")]
    ConfigFormat(#[from] serde_json::Error),

    #[error("Input document not found: {path}")]
    InputNotFound { path: PathBuf },

    #[error("Unsupported input file: {path} (extension '{extension}')")]
    UnsupportedInput { path: PathBuf, extension: String },

    #[error("Unreadable document: {path} - {reason}")]
    UnreadableDocument { path: PathBuf, reason: String },

    #[error("Page rasterisation failed for {path}: {reason}")]
    Rasterization { path: PathBuf, reason: String },

    #[error("OCR failed on page {page} with {engine}: {reason}")]
    Ocr {
        page: usize,
        engine: String,
        reason: String,
    },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl WatchkeeperError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an OCR error for a page
    pub fn ocr(page: usize, engine: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Ocr {
            page,
            engine: engine.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, WatchkeeperError>;
