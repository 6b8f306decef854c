use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::models::ColumnType;

// ISO-like date prefix, e.g. "2024-01-31" or "2024-01-31T08:00:00".
static DATE_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}").expect("valid date regex"));

pub fn is_date_like(value: &str) -> bool {
    DATE_PREFIX.is_match(value)
}

fn is_numeric(value: &str) -> bool {
    value.parse::<f64>().is_ok()
}

fn is_boolean_token(value: &str) -> bool {
    matches!(
        value.to_lowercase().as_str(),
        "true" | "false" | "0" | "1"
    )
}

/// Assigns a type to a column from its non-empty sampled values. Rules are
/// evaluated in a fixed order and the first rule the entire candidate set
/// satisfies wins; mixed columns fall through to TEXT, as does an empty
/// candidate set. Note that all-numeric boolean-ish columns ("0"/"1")
/// classify as INTEGER because the numeric rule is tried first.
pub fn infer_text_type(candidates: &[&str]) -> ColumnType {
    if candidates.is_empty() {
        return ColumnType::Text;
    }
    if candidates.iter().all(|v| is_numeric(v)) {
        if candidates.iter().any(|v| v.contains('.')) {
            ColumnType::Real
        } else {
            ColumnType::Integer
        }
    } else if candidates.iter().all(|v| is_boolean_token(v)) {
        ColumnType::Boolean
    } else if candidates.iter().all(|v| is_date_like(v)) {
        ColumnType::Date
    } else {
        ColumnType::Text
    }
}

/// Assigns a type from the first non-null JSON value seen for a column.
/// Unlike the text path, only one value is consulted.
pub fn infer_json_type(value: &Value) -> ColumnType {
    match value {
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                ColumnType::Integer
            } else {
                ColumnType::Real
            }
        }
        Value::Bool(_) => ColumnType::Boolean,
        Value::String(s) if is_date_like(s) => ColumnType::Date,
        _ => ColumnType::Text,
    }
}
