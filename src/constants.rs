//! Application constants for the watchkeeper processor
//!
//! This module contains the report layout markers, default values and
//! regulatory limits used throughout the processor.

// =============================================================================
// Report Layout
// =============================================================================

/// Title printed at the top of every ISF Watchkeeper hours-of-rest sheet
pub const SHEET_MARKER: &str = "RECORD OF HOURS OF REST";

/// Number of half-hour cells per day in the work grid
pub const HALF_HOUR_SLOTS: usize = 48;

/// Column label preceding the rest-in-any-24-hours values
pub const REST_24H_LABEL: &str = "in any 24h";

/// Column label preceding the rest-in-any-7-days values
pub const REST_7D_LABEL: &str = "in any 7d";

// =============================================================================
// Work Grid Geometry (ISF layout rendered at 200 DPI)
// =============================================================================

/// Resolution the default grid coordinates were measured at
pub const DEFAULT_RASTER_DPI: u32 = 200;

/// Pixel row of the first day's grid line
pub const GRID_ORIGIN_Y: u32 = 348;

/// Vertical distance between consecutive day rows
pub const GRID_ROW_PITCH: u32 = 26;

/// Sample x coordinate for each half-hour cell, midnight first
pub const GRID_COLUMNS: [u32; HALF_HOUR_SLOTS] = [
    288, 303, 327, 343, 366, 383, 406, 422, 445, 461, 484, 500, 523, 540, 563, 579, 602, 619, 643,
    658, 682, 698, 721, 736, 760, 776, 798, 814, 839, 853, 877, 894, 917, 932, 957, 972, 996, 1012,
    1036, 1051, 1074, 1090, 1114, 1130, 1153, 1170, 1193, 1208,
];

// =============================================================================
// Hours of Rest Limits
// =============================================================================

/// Length of the rolling 24 hour window
pub const FULL_REST_24H: f64 = 24.0;

/// Length of the rolling 7 day window
pub const FULL_REST_7D: f64 = 168.0;

/// Minimum hours of rest in any 24 hour period
pub const MIN_REST_24H: f64 = 10.0;

/// Minimum hours of rest in any 7 day period
pub const MIN_REST_7D: f64 = 77.0;

/// Default daily working hours above which time counts as overtime
pub const DEFAULT_OVERTIME_LIMIT_HOURS: f64 = 8.0;

// =============================================================================
// External Tools
// =============================================================================

/// Poppler rasteriser used to turn PDF pages into images
pub const DEFAULT_RASTER_PROGRAM: &str = "pdftoppm";

/// Tesseract command line binary
pub const DEFAULT_OCR_PROGRAM: &str = "tesseract";

/// Tesseract language pack
pub const DEFAULT_OCR_LANGUAGE: &str = "eng";

/// Tesseract page segmentation mode: single uniform block of text
pub const DEFAULT_PAGE_SEGMENTATION_MODE: u8 = 6;

// =============================================================================
// Input and Output
// =============================================================================

/// Extensions accepted as PDF input
pub const PDF_EXTENSIONS: &[&str] = &["pdf"];

/// Extensions accepted as scanned image input
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tif", "tiff"];

/// Excel limit on worksheet name length
pub const MAX_SHEET_NAME_LEN: usize = 31;

/// Characters Excel rejects in worksheet names
pub const INVALID_SHEET_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

/// Characters replaced in output file names; not portable across filesystems
pub const INVALID_FILE_NAME_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Workbook holding the sampled work grids, one sheet per page
pub const WORK_GRID_FILE_NAME: &str = "output.xlsx";

/// Vessel name used for output files when no sheet carried one
pub const UNKNOWN_VESSEL: &str = "Unknown vessel";

/// Directory name under the user config directory
pub const CONFIG_DIR_NAME: &str = "watchkeeper-processor";

/// Default config file name
pub const CONFIG_FILE_NAME: &str = "config.json";
