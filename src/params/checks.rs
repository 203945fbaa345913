//! Value coercions and format predicates used by the validator steps.
//!
//! Raw request values arrive loosely typed (query strings, form fields, JSON
//! scalars), so these helpers coerce loosely: numbers compare
//! by their string form, strings convert to numbers leniently, and
//! "truthiness" decides whether a value counts as present.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Number, Value};

use super::input::FileAttachment;

static PHONE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{10,11}$").unwrap());

static TIME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([01][0-9]|2[0-3]):[0-5][0-9]:[0-5][0-9]$").unwrap());

// Day 01-31, month 01-12. No calendar check.
static DATE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(0[1-9]|[12][0-9]|3[01])-(0[1-9]|1[0-2])-[0-9]{4}$").unwrap());

/// Whether a value counts as set. `false`, `0`, `""`, `null` and empty
/// arrays are not.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(_) => true,
    }
}

/// Missing, `null` or the empty string.
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

/// String form of a value, as used for pattern and membership tests.
pub fn to_display_string(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => number_to_string(n),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => to_display_string(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

fn number_to_string(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    n.as_f64().map(format_number).unwrap_or_else(|| n.to_string())
}

/// Formats a float without a trailing `.0` for whole values.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Lenient numeric conversion. Returns `None` for values that do not denote
/// a finite number.
pub fn to_number(value: &Value) -> Option<f64> {
    match value {
        Value::Null => Some(0.0),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_number(s),
        Value::Array(items) if items.len() <= 1 => parse_number(&to_display_string(value)),
        Value::Array(_) | Value::Object(_) => None,
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return Some(0.0);
    }

    let radix = [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)]
        .iter()
        .find_map(|(prefix, radix)| s.strip_prefix(prefix).map(|digits| (digits, *radix)));
    if let Some((digits, radix)) = radix {
        return u64::from_str_radix(digits, radix).ok().map(|n| n as f64);
    }

    // Rust accepts "inf" and "nan" spellings that must not count as numbers.
    let is_decimal = s
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'));
    if !is_decimal {
        return None;
    }

    s.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// JSON value for a converted number: integral values stay integers.
pub fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() <= i64::MAX as f64 {
        Value::from(n as i64)
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

/// Trims a string, or every string element of an array.
pub fn trim_value(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(s.trim().to_string()),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => Value::String(s.trim().to_string()),
                    other => other,
                })
                .collect(),
        ),
        other => other,
    }
}

/// Parses a JSON string. Already-structured values pass through; a document
/// that parses to `null` is treated as invalid.
pub fn parse_json(value: &Value) -> Option<Value> {
    match value {
        Value::String(s) => serde_json::from_str::<Value>(s)
            .ok()
            .filter(|parsed| !parsed.is_null()),
        Value::Null => None,
        other => Some(other.clone()),
    }
}

/// Native arrays as-is, or a bracket-delimited string holding a JSON array.
pub fn to_array(value: &Value) -> Option<Value> {
    match value {
        Value::Array(_) => Some(value.clone()),
        Value::String(s) if s.starts_with('[') && s.ends_with(']') => {
            match serde_json::from_str::<Value>(s) {
                Ok(parsed @ Value::Array(_)) => Some(parsed),
                _ => None,
            }
        }
        _ => None,
    }
}

pub fn is_positive(value: &Value) -> bool {
    to_number(value).map(|n| n >= 0.0).unwrap_or(false)
}

pub fn is_valid_phone(value: &Value) -> bool {
    PHONE_REGEX.is_match(&to_display_string(value))
}

pub fn is_valid_time(value: &Value) -> bool {
    TIME_REGEX.is_match(&to_display_string(value))
}

pub fn is_valid_date(value: &Value) -> bool {
    DATE_REGEX.is_match(&to_display_string(value))
}

/// Case and surrounding-whitespace insensitive membership.
pub fn is_valid_enum(value: &Value, allowed: &[String]) -> bool {
    if value.is_null() {
        return false;
    }
    let provided = to_display_string(value).trim().to_lowercase();
    if provided.is_empty() {
        return false;
    }
    allowed
        .iter()
        .any(|candidate| candidate.trim().to_lowercase() == provided)
}

pub fn is_allowed_file_type(file: &FileAttachment, allowed: &[String]) -> bool {
    allowed.iter().any(|mime| *mime == file.content_type)
}

pub fn is_within_file_size(file: &FileAttachment, max_bytes: u64) -> bool {
    file.size <= max_bytes
}

/// Compares the text after the last `.` of the filename with the allowed
/// extensions, ignoring case and a leading dot.
pub fn has_allowed_extension(file: &FileAttachment, allowed: &[String]) -> bool {
    let extension = file
        .file_name
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .to_lowercase();
    allowed
        .iter()
        .any(|ext| ext.replacen('.', "", 1).to_lowercase() == extension)
}

/// Byte count as megabytes, for messages.
pub fn megabytes(bytes: u64) -> f64 {
    bytes as f64 / 1024.0 / 1024.0
}
