//! OCR-tolerant field parsing utilities
//!
//! Scanned reports come back from OCR with predictable character
//! confusions. These helpers repair them inside tokens that are clearly
//! numeric and leave everything else untouched.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

/// Leading date at the start of a line: day, month, year with `/`, `.` or `-`
static LEADING_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\s|]*([0-9OoIl|]{1,2})\s*[/.\-]\s*([0-9OoIl|]{1,2})\s*[/.\-]\s*([0-9OoIl]{2,4})")
        .expect("regex is valid")
});

/// "N/A" as OCR spaces it out, e.g. "N / A" or "n \ a."
static SPACED_NOT_APPLICABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bN\s*[/\\]\s*A\b\.?").expect("regex is valid")
});

/// A value token read from a table cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueToken {
    Number(f64),
    NotApplicable,
}

/// Outcome of looking for a date at the start of a line
#[derive(Debug, Clone, PartialEq)]
pub enum LeadingDate<'a> {
    /// A valid date followed by the rest of the line
    Valid(NaiveDate, &'a str),
    /// Date-shaped text that does not form a calendar date
    Invalid(String),
}

/// Normalise line endings and look-alike punctuation in raw OCR text
pub fn normalize_ocr_text(text: &str) -> String {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .chars()
        .map(|c| match c {
            '\u{00A0}' | '\u{2007}' | '\u{202F}' | '\t' => ' ',
            '\u{2044}' | '\u{2215}' => '/',
            '\u{2013}' | '\u{2014}' => '-',
            other => other,
        })
        .collect::<String>()
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Replace letters OCR commonly reads in place of digits.
///
/// Returns None when the token holds no real digit, so words such as
/// "Il" are never turned into numbers.
pub fn repair_numeric(token: &str) -> Option<String> {
    if !token.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    Some(
        token
            .chars()
            .map(|c| match c {
                'O' | 'o' => '0',
                'I' | 'l' | '|' => '1',
                other => other,
            })
            .collect(),
    )
}

/// Parse a date written as day/month/year
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    match split_leading_date(text)? {
        LeadingDate::Valid(date, rest) if rest.trim().is_empty() => Some(date),
        _ => None,
    }
}

/// Find a date at the start of a line and return it with the remainder
pub fn split_leading_date(line: &str) -> Option<LeadingDate<'_>> {
    let captures = LEADING_DATE.captures(line)?;
    let whole = captures.get(0)?;

    let digits = whole.as_str().chars().filter(|c| c.is_ascii_digit()).count();
    if digits < 3 {
        return None;
    }

    let rest = &line[whole.end()..];
    let day = repair_numeric(&captures[1]).unwrap_or_else(|| captures[1].to_string());
    let month = repair_numeric(&captures[2]).unwrap_or_else(|| captures[2].to_string());
    let year = repair_numeric(&captures[3]).unwrap_or_else(|| captures[3].to_string());

    let parsed = (|| {
        let day: u32 = day.parse().ok()?;
        let month: u32 = month.parse().ok()?;
        let mut year: i32 = year.parse().ok()?;
        match year {
            0..=99 => year += 2000,
            100..=999 => return None,
            _ => {}
        }
        NaiveDate::from_ymd_opt(year, month, day)
    })();

    Some(match parsed {
        Some(date) => LeadingDate::Valid(date, rest),
        None => LeadingDate::Invalid(whole.as_str().trim().to_string()),
    })
}

/// Parse one table cell token as a number or N/A
pub fn parse_value_token(token: &str) -> Option<ValueToken> {
    let token = token.trim_matches(|c: char| matches!(c, '|' | ',' | ';' | ':' | '[' | ']' | '(' | ')'));
    if token.is_empty() {
        return None;
    }

    if matches!(
        token.to_ascii_uppercase().as_str(),
        "N/A" | "NA" | "N\\A" | "N/A." | "N.A."
    ) {
        return Some(ValueToken::NotApplicable);
    }

    let repaired = repair_numeric(token)?.replace(',', ".");
    let value: f64 = repaired.parse().ok()?;
    (value.is_finite() && value >= 0.0).then_some(ValueToken::Number(value))
}

/// Split the remainder of a row into value tokens, ignoring words.
///
/// `|` is a cell border here, never a misread `1`.
pub fn value_tokens(text: &str) -> Vec<ValueToken> {
    let text = SPACED_NOT_APPLICABLE.replace_all(text, "N/A");
    text.split(|c: char| c.is_whitespace() || c == '|')
        .filter_map(parse_value_token)
        .collect()
}
