//! Lenient parsing of trip arguments emitted by the decision step
//!
//! The decision step is not guaranteed to respect the declared schema: cities
//! may arrive as a bare string and counts as floats or numeric strings.
//! Anything that cannot be read as the expected type is treated as absent.

use serde_json::Value;

/// Trip parameters as read from a tool call's arguments
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TripArgs {
    pub cities: Option<Vec<String>>,
    pub days: Option<u64>,
    pub people: Option<u64>,
    pub budget: Option<u64>,
    pub transport: Option<String>,
}

impl TripArgs {
    pub fn from_value(input: &Value) -> Self {
        let field = |key: &str| input.get(key).filter(|v| !v.is_null());
        Self {
            cities: field("cities").and_then(parse_cities),
            days: field("days").and_then(parse_count),
            people: field("people").and_then(parse_count),
            budget: field("budget").and_then(parse_count),
            transport: field("transport").and_then(parse_text),
        }
    }
}

/// A list of names; a single string becomes a one-element list
pub fn parse_cities(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::String(_) => parse_text(value).map(|city| vec![city]),
        Value::Array(items) => Some(items.iter().filter_map(parse_text).collect()),
        _ => None,
    }
}

/// A non-negative whole number
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn parse_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract().abs() < f64::EPSILON && *f >= 0.0 && *f <= u64::MAX as f64)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_text(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}
