//! Configuration management and validation.
//!
//! Provides configuration structures for OCR, page rasterisation, the
//! work grid layout and the hours-of-rest limits, loaded in layers:
//! built-in defaults, then an optional JSON file, then command-line
//! overrides applied by the caller.

use crate::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_OCR_LANGUAGE, DEFAULT_OCR_PROGRAM,
    DEFAULT_OVERTIME_LIMIT_HOURS, DEFAULT_PAGE_SEGMENTATION_MODE, DEFAULT_RASTER_DPI,
    DEFAULT_RASTER_PROGRAM, GRID_COLUMNS, GRID_ORIGIN_Y, GRID_ROW_PITCH, HALF_HOUR_SLOTS,
    MIN_REST_24H, MIN_REST_7D,
};
use crate::error::{Result, WatchkeeperError};
use crate::models::Metric;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// How page text is obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OcrMode {
    /// Use the PDF text layer when it holds report sheets, OCR otherwise
    Auto,
    /// OCR every page image, ignoring any text layer
    Always,
    /// Never run OCR; pages without a text layer yield nothing
    Never,
}

/// Tesseract invocation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    pub mode: OcrMode,

    /// Path or name of the tesseract binary
    pub program: String,

    /// Tesseract language pack, e.g. "eng"
    pub language: String,

    /// Tesseract --psm value
    pub page_segmentation_mode: u8,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            mode: OcrMode::Auto,
            program: DEFAULT_OCR_PROGRAM.to_string(),
            language: DEFAULT_OCR_LANGUAGE.to_string(),
            page_segmentation_mode: DEFAULT_PAGE_SEGMENTATION_MODE,
        }
    }
}

/// PDF page rasterisation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterConfig {
    /// Path or name of the pdftoppm binary
    pub program: String,

    /// Render resolution; must match the grid geometry
    pub dpi: u32,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_RASTER_PROGRAM.to_string(),
            dpi: DEFAULT_RASTER_DPI,
        }
    }
}

/// Pixel layout of the half-hour work grid on a rendered sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridGeometry {
    /// Y coordinate sampled for the first day row
    pub origin_y: u32,

    /// Distance in pixels between day rows
    pub row_pitch: u32,

    /// X coordinate sampled for each half-hour cell
    pub columns: Vec<u32>,

    /// Resolution the coordinates apply to
    pub dpi: u32,
}

impl Default for GridGeometry {
    fn default() -> Self {
        Self {
            origin_y: GRID_ORIGIN_Y,
            row_pitch: GRID_ROW_PITCH,
            columns: GRID_COLUMNS.to_vec(),
            dpi: DEFAULT_RASTER_DPI,
        }
    }
}

/// Minimum rest requirements used for violation counting
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestLimits {
    pub min_rest_24h: f64,
    pub min_rest_7d: f64,
}

impl Default for RestLimits {
    fn default() -> Self {
        Self {
            min_rest_24h: MIN_REST_24H,
            min_rest_7d: MIN_REST_7D,
        }
    }
}

/// Top level processor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    pub ocr: OcrConfig,
    pub raster: RasterConfig,
    pub grid: GridGeometry,
    pub limits: RestLimits,

    /// Daily hours worked above which time counts as overtime
    pub overtime_limit_hours: f64,

    /// Value aggregated by the means report
    pub metric: Metric,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            ocr: OcrConfig::default(),
            raster: RasterConfig::default(),
            grid: GridGeometry::default(),
            limits: RestLimits::default(),
            overtime_limit_hours: DEFAULT_OVERTIME_LIMIT_HOURS,
            metric: Metric::HoursWorked,
        }
    }
}

impl ProcessorConfig {
    /// Default config file location under the user config directory
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load a configuration from a JSON file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: ProcessorConfig = serde_json::from_str(&contents)?;
        debug!("Loaded configuration from {}", path.display());
        config.validate()?;
        Ok(config)
    }

    /// Load from an explicit file, else the default location if present, else defaults
    pub fn load_layered(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        match Self::default_config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => {
                debug!("No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Override the OCR mode
    pub fn with_ocr_mode(mut self, mode: OcrMode) -> Self {
        self.ocr.mode = mode;
        self
    }

    /// Override the aggregated metric
    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    /// Override the overtime threshold
    pub fn with_overtime_limit(mut self, hours: f64) -> Self {
        self.overtime_limit_hours = hours;
        self
    }

    /// Check that limits and grid layout are usable
    pub fn validate(&self) -> Result<()> {
        if self.grid.columns.len() != HALF_HOUR_SLOTS {
            return Err(WatchkeeperError::configuration(format!(
                "grid must define {} columns, found {}",
                HALF_HOUR_SLOTS,
                self.grid.columns.len()
            )));
        }

        if self.grid.row_pitch == 0 {
            return Err(WatchkeeperError::configuration(
                "grid row_pitch must be greater than zero",
            ));
        }

        if self.raster.dpi != self.grid.dpi {
            return Err(WatchkeeperError::configuration(format!(
                "raster dpi {} does not match grid dpi {}",
                self.raster.dpi, self.grid.dpi
            )));
        }

        if !(0.0..=24.0).contains(&self.overtime_limit_hours) {
            return Err(WatchkeeperError::configuration(format!(
                "overtime limit must be between 0 and 24 hours, got {}",
                self.overtime_limit_hours
            )));
        }

        if !(0.0..=24.0).contains(&self.limits.min_rest_24h)
            || !(0.0..=168.0).contains(&self.limits.min_rest_7d)
        {
            return Err(WatchkeeperError::configuration(
                "rest limits must lie within their 24h and 7d windows",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_is_valid() {
        let config = ProcessorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.grid.columns.len(), HALF_HOUR_SLOTS);
        assert_eq!(config.ocr.mode, OcrMode::Auto);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{ "overtime_limit_hours": 10.0, "ocr": {{ "mode": "never" }} }}"#
        )
        .unwrap();

        let config = ProcessorConfig::from_file(file.path()).unwrap();
        assert_eq!(config.overtime_limit_hours, 10.0);
        assert_eq!(config.ocr.mode, OcrMode::Never);
        assert_eq!(config.ocr.program, DEFAULT_OCR_PROGRAM);
        assert_eq!(config.limits, RestLimits::default());
    }

    #[test]
    fn test_invalid_grid_rejected() {
        let mut config = ProcessorConfig::default();
        config.grid.columns.truncate(10);
        assert!(matches!(
            config.validate(),
            Err(WatchkeeperError::Configuration { .. })
        ));
    }

    #[test]
    fn test_mismatched_dpi_rejected() {
        let mut config = ProcessorConfig::default();
        config.raster.dpi = 300;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_file_is_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not json").unwrap();
        assert!(matches!(
            ProcessorConfig::from_file(file.path()),
            Err(WatchkeeperError::ConfigFormat(_))
        ));
    }
}
