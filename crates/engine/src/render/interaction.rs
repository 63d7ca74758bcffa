//! Write-back from widget interactions to the response store.
//!
//! Each [`Interaction`] is converted into the field kind's stored value shape
//! and passed to [`ResponseStore::set`]. Rejected interactions never touch the
//! store.

use chrono::NaiveDate;
use formfill_types::{AddressValue, DateRangeValue, DocumentFile, Field, FieldId, FieldKind, ResponseValue, matrix_key};
use formfill_util::DraftStoreError;
use serde::Deserialize;
use serde_json::Number;
use thiserror::Error;
use tracing::debug;

use super::selection::{flag_value, ranking_order};
use super::{opinion_scale_bounds, slider_bounds, star_rating_max};
use crate::store::ResponseStore;

/// Sub-field of an Address answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressPart {
    Address,
    City,
    State,
    Zip,
}

/// User action on a rendered widget.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interaction {
    SetText(String),
    SetNumber(f64),
    Toggle,
    SetFlag(bool),
    SelectOption(usize),
    ToggleOption(usize),
    SelectMatrixCell { row: usize, column: usize },
    MoveRankingItem { from: usize, to: usize },
    SetDateRangeStart(String),
    SetDateRangeEnd(String),
    SetAddressPart { part: AddressPart, value: String },
    /// Not read from answer files; the bytes are never serialized.
    #[serde(skip)]
    AttachDocument(DocumentFile),
}

impl Interaction {
    fn name(&self) -> &'static str {
        match self {
            Interaction::SetText(_) => "set_text",
            Interaction::SetNumber(_) => "set_number",
            Interaction::Toggle => "toggle",
            Interaction::SetFlag(_) => "set_flag",
            Interaction::SelectOption(_) => "select_option",
            Interaction::ToggleOption(_) => "toggle_option",
            Interaction::SelectMatrixCell { .. } => "select_matrix_cell",
            Interaction::MoveRankingItem { .. } => "move_ranking_item",
            Interaction::SetDateRangeStart(_) => "set_date_range_start",
            Interaction::SetDateRangeEnd(_) => "set_date_range_end",
            Interaction::SetAddressPart { .. } => "set_address_part",
            Interaction::AttachDocument(_) => "attach_document",
        }
    }
}

/// Reasons an interaction was rejected.
#[derive(Debug, Error)]
pub enum InteractionError {
    #[error("`{interaction}` does not apply to {kind} fields")]
    Unsupported { kind: String, interaction: &'static str },
    #[error("option {index} is out of range ({len} options)")]
    OptionOutOfRange { index: usize, len: usize },
    #[error("matrix cell ({row}, {column}) is out of range")]
    MatrixCellOutOfRange { row: usize, column: usize },
    #[error("date range starts after it ends ({from} > {to})")]
    InvalidDateRange { from: String, to: String },
    #[error("value {value} is outside {min}..={max}")]
    OutOfBounds { value: f64, min: f64, max: f64 },
    #[error("field {0} is not part of this form")]
    UnknownField(FieldId),
    #[error("field {0} is not on the current page")]
    NotOnCurrentPage(FieldId),
    #[error(transparent)]
    Draft(#[from] DraftStoreError),
}

/// Apply `interaction` to `field`, writing the resulting answer through the store.
pub fn apply_interaction(
    field: &Field,
    store: &mut ResponseStore,
    interaction: Interaction,
) -> Result<(), InteractionError> {
    let current = store.value(&field.id);
    let value = next_value(field, current, interaction)?;
    debug!(field = %field.id, kind = %field.kind, "applying interaction");
    store.set(field.id.clone(), field.kind.clone(), value)?;
    Ok(())
}

fn next_value(
    field: &Field,
    current: Option<&ResponseValue>,
    interaction: Interaction,
) -> Result<ResponseValue, InteractionError> {
    let unsupported = |interaction: &Interaction| InteractionError::Unsupported {
        kind: field.kind.to_string(),
        interaction: interaction.name(),
    };

    match (&field.kind, interaction) {
        (kind, interaction) if !kind.accepts_response() => Err(unsupported(&interaction)),

        (
            FieldKind::ShortAnswer
            | FieldKind::Email
            | FieldKind::Number
            | FieldKind::Paragraph
            | FieldKind::LongAnswer
            | FieldKind::DatePicker
            | FieldKind::TimePicker
            | FieldKind::DateTimePicker
            | FieldKind::Unknown(_),
            Interaction::SetText(text),
        ) => Ok(ResponseValue::Text(text)),

        (FieldKind::Number, Interaction::SetNumber(value)) => number(
            value,
            field.min_value.unwrap_or(f64::MIN),
            field.max_value.unwrap_or(f64::MAX),
        ),
        (FieldKind::StarRating, Interaction::SetNumber(value)) => number(value, 1.0, f64::from(star_rating_max(field))),
        (FieldKind::Slider, Interaction::SetNumber(value)) => {
            let (min, max) = slider_bounds(field);
            number(value, min, max)
        }
        (FieldKind::OpinionScale, Interaction::SetNumber(value)) => {
            let (min, max) = opinion_scale_bounds(field);
            number(value, min as f64, max as f64)
        }

        (FieldKind::Checkbox | FieldKind::Switch, Interaction::Toggle) => Ok(ResponseValue::Flag(!flag_value(current))),
        (FieldKind::Checkbox | FieldKind::Switch, Interaction::SetFlag(flag)) => Ok(ResponseValue::Flag(flag)),

        (FieldKind::MultipleChoice | FieldKind::Dropdown | FieldKind::Picture, Interaction::SelectOption(index)) => {
            option_label(field, index).map(ResponseValue::Text)
        }

        (FieldKind::MultipleSelect | FieldKind::MultipleSelectCheckboxes, Interaction::ToggleOption(index)) => {
            let label = option_label(field, index)?;
            let mut selections = match current {
                Some(ResponseValue::Selections(selections)) => selections.clone(),
                _ => Vec::new(),
            };
            match selections.iter().position(|selected| *selected == label) {
                Some(position) => {
                    selections.remove(position);
                }
                None => selections.push(label),
            }
            Ok(ResponseValue::Selections(selections))
        }

        (FieldKind::ChoiceMatrix, Interaction::SelectMatrixCell { row, column }) => {
            let (Some(row_label), Some(column_label)) = (field.rows.get(row), field.columns.get(column)) else {
                return Err(InteractionError::MatrixCellOutOfRange { row, column });
            };
            let mut cells = match current {
                Some(ResponseValue::Matrix(cells)) => cells.clone(),
                _ => Default::default(),
            };
            cells.insert(matrix_key(row_label), matrix_key(column_label));
            Ok(ResponseValue::Matrix(cells))
        }

        (FieldKind::Ranking, Interaction::MoveRankingItem { from, to }) => {
            let mut order = ranking_order(field, current);
            if from >= order.len() || to >= order.len() {
                return Err(InteractionError::OptionOutOfRange {
                    index: from.max(to),
                    len: order.len(),
                });
            }
            let item = order.remove(from);
            order.insert(to, item);
            Ok(ResponseValue::Selections(order))
        }

        (FieldKind::DateRange, Interaction::SetDateRangeStart(from)) => date_range(current, |range| range.from = from),
        (FieldKind::DateRange, Interaction::SetDateRangeEnd(to)) => date_range(current, |range| range.to = to),

        (FieldKind::Address, Interaction::SetAddressPart { part, value }) => {
            let mut address = match current {
                Some(ResponseValue::Address(address)) => address.clone(),
                _ => AddressValue::default(),
            };
            let slot = match part {
                AddressPart::Address => &mut address.address,
                AddressPart::City => &mut address.city,
                AddressPart::State => &mut address.state,
                AddressPart::Zip => &mut address.zip,
            };
            *slot = value;
            Ok(ResponseValue::Address(address))
        }

        (FieldKind::DocumentType, Interaction::AttachDocument(document)) => Ok(ResponseValue::Document(document)),

        (_, interaction) => Err(unsupported(&interaction)),
    }
}

fn option_label(field: &Field, index: usize) -> Result<String, InteractionError> {
    field
        .options
        .get(index)
        .map(|option| option.option_text.clone())
        .ok_or(InteractionError::OptionOutOfRange {
            index,
            len: field.options.len(),
        })
}

/// Integral values are stored as JSON integers so drafts stay readable.
fn number(value: f64, min: f64, max: f64) -> Result<ResponseValue, InteractionError> {
    if !value.is_finite() || value < min || value > max {
        return Err(InteractionError::OutOfBounds { value, min, max });
    }
    let stored = if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Number::from(value as i64)
    } else {
        Number::from_f64(value).ok_or(InteractionError::OutOfBounds { value, min, max })?
    };
    Ok(ResponseValue::Number(stored))
}

fn date_range(
    current: Option<&ResponseValue>,
    update: impl FnOnce(&mut DateRangeValue),
) -> Result<ResponseValue, InteractionError> {
    let mut range = match current {
        Some(ResponseValue::DateRange(range)) => range.clone(),
        _ => DateRangeValue::default(),
    };
    update(&mut range);
    check_date_order(&range)?;
    Ok(ResponseValue::DateRange(range))
}

/// Only complete ISO dates are compared; partial input is accepted as typed.
fn check_date_order(range: &DateRangeValue) -> Result<(), InteractionError> {
    let parse = |text: &str| NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok();
    if let (Some(from), Some(to)) = (parse(&range.from), parse(&range.to))
        && from > to
    {
        return Err(InteractionError::InvalidDateRange {
            from: range.from.clone(),
            to: range.to.clone(),
        });
    }
    Ok(())
}
