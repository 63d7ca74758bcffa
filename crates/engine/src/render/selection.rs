//! Selection state derived from stored answers.
//!
//! Nothing here is cached: widgets recompute highlighting from the canonical
//! response on every render, so a restored draft shows exactly what was saved.

use formfill_types::{Field, ResponseValue, matrix_key};

/// Index of the option whose label equals the stored single-choice answer.
pub fn selected_option_index(field: &Field, value: Option<&ResponseValue>) -> Option<usize> {
    let ResponseValue::Text(text) = value? else {
        return None;
    };
    let wanted = text.trim();
    field
        .options
        .iter()
        .position(|option| option.option_text.trim() == wanted)
}

/// Indices of every option present in a stored multi-select answer.
pub fn selected_option_indices(field: &Field, value: Option<&ResponseValue>) -> Vec<usize> {
    let Some(ResponseValue::Selections(selected)) = value else {
        return Vec::new();
    };
    field
        .options
        .iter()
        .enumerate()
        .filter(|(_, option)| selected.iter().any(|label| label.trim() == option.option_text.trim()))
        .map(|(index, _)| index)
        .collect()
}

/// Selected column index for each matrix row, in row order.
pub fn matrix_selection(field: &Field, value: Option<&ResponseValue>) -> Vec<Option<usize>> {
    let cells = match value {
        Some(ResponseValue::Matrix(cells)) => Some(cells),
        _ => None,
    };
    field
        .rows
        .iter()
        .map(|row| {
            let column = cells?.get(&matrix_key(row))?;
            field
                .columns
                .iter()
                .position(|candidate| matrix_key(candidate) == *column)
        })
        .collect()
}

/// Current ranking: stored order first, then any options not yet ranked.
///
/// Stored labels that no longer match an option are dropped.
pub fn ranking_order(field: &Field, value: Option<&ResponseValue>) -> Vec<String> {
    let labels: Vec<&str> = field.options.iter().map(|option| option.option_text.as_str()).collect();
    let mut order: Vec<String> = match value {
        Some(ResponseValue::Selections(stored)) => stored
            .iter()
            .filter(|label| labels.contains(&label.as_str()))
            .cloned()
            .collect(),
        _ => Vec::new(),
    };
    for label in labels {
        if !order.iter().any(|ranked| ranked == label) {
            order.push(label.to_string());
        }
    }
    order
}

pub fn flag_value(value: Option<&ResponseValue>) -> bool {
    matches!(value, Some(ResponseValue::Flag(true)))
}

/// Text shown in an input; numbers are rendered in their JSON form.
pub fn text_value(value: Option<&ResponseValue>) -> String {
    match value {
        Some(ResponseValue::Text(text)) => text.clone(),
        Some(ResponseValue::Number(number)) => number.to_string(),
        Some(ResponseValue::Flag(flag)) => flag.to_string(),
        _ => String::new(),
    }
}

pub fn number_value(value: Option<&ResponseValue>) -> Option<f64> {
    match value? {
        ResponseValue::Number(number) => number.as_f64(),
        ResponseValue::Text(text) => text.trim().parse().ok(),
        _ => None,
    }
}
