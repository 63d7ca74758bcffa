//! Load-time normalization of the loosely typed field payload.
//!
//! The builder has stored the same attribute in several shapes over time
//! (booleans vs. `"Yes"`, option arrays vs. JSON-encoded strings). Everything
//! is folded into one shape here so downstream code never re-derives it.

use serde_json::Value;

use super::FieldOption;

const OPTION_TEXT_KEYS: &[&str] = &["option_text", "text", "label", "value", "name"];
const OPTION_IMAGE_KEYS: &[&str] = &["image_url", "image", "url", "src"];

/// Interpret the heterogeneous `required` flag.
pub fn normalize_required(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        Value::String(text) => matches!(text.trim().to_ascii_lowercase().as_str(), "yes" | "true" | "1" | "required"),
        Value::Number(number) => number.as_f64().is_some_and(|numeric| numeric != 0.0),
        _ => false,
    }
}

/// Normalize an option list into labelled [`FieldOption`]s.
///
/// Accepts an array of strings, an array of objects carrying `option_text`
/// (or a close alias), or a JSON-encoded string of either. Entries without a
/// usable label are dropped.
pub fn normalize_options(value: &Value) -> Vec<FieldOption> {
    match value {
        Value::Array(items) => items.iter().filter_map(option_from_item).collect(),
        Value::String(text) => match decode_embedded_json(text) {
            Some(decoded) => normalize_options(&decoded),
            None => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// Normalize matrix rows or columns into their display labels.
pub fn normalize_labels(value: &Value) -> Vec<String> {
    normalize_options(value)
        .into_iter()
        .map(|option| option.option_text)
        .collect()
}

/// Read a numeric bound that may have been stored as text.
pub fn normalize_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Read an optional string attribute, treating blanks as absent.
pub fn normalize_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn option_from_item(item: &Value) -> Option<FieldOption> {
    match item {
        Value::String(text) if !text.trim().is_empty() => Some(FieldOption::new(text.trim())),
        Value::Number(number) => Some(FieldOption::new(number.to_string())),
        Value::Object(map) => {
            let option_text = OPTION_TEXT_KEYS
                .iter()
                .find_map(|key| map.get(*key).and_then(normalize_text))?;
            let image_url = OPTION_IMAGE_KEYS
                .iter()
                .find_map(|key| map.get(*key).and_then(normalize_text));
            Some(FieldOption { option_text, image_url })
        }
        _ => None,
    }
}

fn decode_embedded_json(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if !(trimmed.starts_with('[') || trimmed.starts_with('{')) {
        return None;
    }
    serde_json::from_str(trimmed).ok()
}
