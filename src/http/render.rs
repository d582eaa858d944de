//! Row-oriented text encoding of dequeued elements.
//!
//! Each row is the element type followed by every body value in body key
//! order, each field terminated by the field separator, and the row ended
//! by the line separator.

use axum::http::HeaderMap;
use axum::http::header::ACCEPT;
use serde_json::Value;
use std::fmt::Write;

use crate::constants;
use crate::queue::Element;

/// Header overriding the field separator.
pub const CSV_SEPARATOR_HEADER: &str = "csv-separator";

/// Header overriding the row separator.
pub const CSV_LINE_SEPARATOR_HEADER: &str = "csv-lineseparator";

/// Field and row delimiters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvFormat {
    pub field_separator: String,
    pub line_separator: String,
}

impl Default for CsvFormat {
    fn default() -> Self {
        Self {
            field_separator: constants::DEFAULT_CSV_SEPARATOR.to_string(),
            line_separator: constants::DEFAULT_CSV_LINE_SEPARATOR.to_string(),
        }
    }
}

impl CsvFormat {
    /// Read delimiters from request headers, falling back to the defaults.
    ///
    /// Header values may spell control characters as `\n`, `\r` and `\t`
    /// since raw newlines are not valid in HTTP headers.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let read = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .filter(|v| !v.is_empty())
                .map(unescape)
        };

        let defaults = Self::default();
        Self {
            field_separator: read(CSV_SEPARATOR_HEADER).unwrap_or(defaults.field_separator),
            line_separator: read(CSV_LINE_SEPARATOR_HEADER).unwrap_or(defaults.line_separator),
        }
    }
}

/// Returns true if the `Accept` header asks for the row encoding.
pub fn wants_csv(headers: &HeaderMap) -> bool {
    headers
        .get_all(ACCEPT)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|media| media.split(';').next().unwrap_or_default().trim())
        .any(|media| media.eq_ignore_ascii_case(constants::CSV_MEDIA_TYPE))
}

/// Render elements as delimited rows.
pub fn render_rows(elements: &[Element], format: &CsvFormat) -> String {
    let mut out = String::new();
    for element in elements {
        let _ = write!(out, "{}{}", element.element_type, format.field_separator);
        for value in element.body.values() {
            push_field(&mut out, value);
            out.push_str(&format.field_separator);
        }
        out.push_str(&format.line_separator);
    }
    out
}

fn push_field(out: &mut String, value: &Value) {
    match value {
        Value::Null => {},
        Value::String(s) => out.push_str(s),
        // Numbers, booleans and nested values use their compact JSON form
        other => {
            let _ = write!(out, "{other}");
        },
    }
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            },
            None => out.push('\\'),
        }
    }
    out
}
