//! Sheet header extraction for hours-of-rest reports
//!
//! The header fields sit either on the same line as their label or,
//! in PDF text-layer output, after one or more blank lines. Each pattern
//! accepts both.

use crate::models::PageHeader;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

static VESSEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bVessel\s*[:;]\s*([^\n]+)").expect("regex is valid")
});

static SEAFARER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bSeafarer\s*\(\s*Full\s*Name\s*\)\s*[:;]?\s*([^\n]+)").expect("regex is valid")
});

static POSITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bPosition\s*\(\s*Rank\s*\)\s*[:;]?\s*([^\n]+)").expect("regex is valid")
});

/// The period label is the last non-blank line before "Periods"
static PERIOD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^[ \t]*([^\n]*\S)[ \t]*\n(?:[ \t]*\n)*[ \t]*Periods\b").expect("regex is valid")
});

/// Labels that end a field when OCR runs two header cells into one line
static NEXT_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s(?:Vessel\s*[:;]|Seafarer\s*\(|Position\s*\(|Page\s*[:.]?\s*\d|IMO\s*(?:No|Number)?\s*[:.])")
        .expect("regex is valid")
});

static PAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bPage\s*[:.]?\s*(\d+(?:\s*(?:/|of)\s*\d+)?)").expect("regex is valid")
});

/// Extract the header fields of one sheet; absent fields stay None
pub fn parse_sheet_header(text: &str) -> PageHeader {
    let header = PageHeader {
        vessel: capture(&VESSEL, text),
        seafarer: capture(&SEAFARER, text),
        position: capture(&POSITION, text),
        period: capture(&PERIOD, text),
        page_label: capture(&PAGE, text),
    };

    debug!(
        "Parsed sheet header: vessel={:?} seafarer={:?} position={:?} period={:?}",
        header.vessel, header.seafarer, header.position, header.period
    );

    header
}

fn capture(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| clean_field(m.as_str()))
        .filter(|value| !value.is_empty())
}

/// Cut at a following label, collapse inner whitespace and strip table border noise
fn clean_field(value: &str) -> String {
    let value = match NEXT_LABEL.find(value) {
        Some(label) => &value[..label.start()],
        None => value,
    };

    value
        .trim_matches(|c: char| c.is_whitespace() || c == '|' || c == '_')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
