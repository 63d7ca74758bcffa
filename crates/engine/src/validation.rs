//! Required-field validation shared by page navigation and submission.
//!
//! Both paths check the stored `{type, value}` envelope with the same rules:
//!
//! - Address needs every sub-field non-blank.
//! - Choice Matrix needs a column for every row.
//! - Everything else fails when absent, blank, or an empty selection.
//!
//! Checks stop at the first failing field.

use std::fmt;

use formfill_types::{Field, FieldId, FieldKind, Response, ResponseValue, matrix_key};
use thiserror::Error;

use crate::store::ResponseStore;

/// Why a required field was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationReason {
    Missing,
    IncompleteAddress,
    /// Rows (as displayed) that have no column selected.
    IncompleteMatrix { missing_rows: Vec<String> },
}

impl fmt::Display for ValidationReason {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationReason::Missing => formatter.write_str("is required"),
            ValidationReason::IncompleteAddress => formatter.write_str("needs address, city, state and zip"),
            ValidationReason::IncompleteMatrix { missing_rows } => {
                write!(formatter, "needs a selection for {}", missing_rows.join(", "))
            }
        }
    }
}

/// First required field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{label} {reason}")]
pub struct ValidationFailure {
    pub field_id: FieldId,
    pub label: String,
    pub reason: ValidationReason,
}

impl ValidationFailure {
    fn new(field: &Field, reason: ValidationReason) -> Self {
        Self {
            field_id: field.id.clone(),
            label: field.display_label(),
            reason,
        }
    }
}

/// Check one field against its stored response.
pub fn check_field(field: &Field, response: Option<&Response>) -> Result<(), ValidationFailure> {
    if !field.required || !field.kind.accepts_response() {
        return Ok(());
    }
    if field.kind == FieldKind::ChoiceMatrix {
        return check_matrix(field, response.map(|response| &response.value));
    }
    let Some(response) = response else {
        return Err(ValidationFailure::new(field, ValidationReason::Missing));
    };

    match (&field.kind, &response.value) {
        (FieldKind::Address, ResponseValue::Address(address)) => {
            if address.is_complete() {
                Ok(())
            } else {
                Err(ValidationFailure::new(field, ValidationReason::IncompleteAddress))
            }
        }
        (FieldKind::Address, _) => Err(ValidationFailure::new(field, ValidationReason::IncompleteAddress)),
        (_, value) if value.is_blank() => Err(ValidationFailure::new(field, ValidationReason::Missing)),
        _ => Ok(()),
    }
}

/// An absent answer lists every row as missing.
fn check_matrix(field: &Field, value: Option<&ResponseValue>) -> Result<(), ValidationFailure> {
    let cells = match value {
        Some(ResponseValue::Matrix(cells)) => Some(cells),
        _ => None,
    };

    if field.rows.is_empty() {
        return match cells {
            Some(cells) if !cells.is_empty() => Ok(()),
            _ => Err(ValidationFailure::new(field, ValidationReason::Missing)),
        };
    }

    let missing_rows: Vec<String> = field
        .rows
        .iter()
        .filter(|row| {
            cells
                .and_then(|cells| cells.get(&matrix_key(row)))
                .is_none_or(|column| column.trim().is_empty())
        })
        .cloned()
        .collect();

    if missing_rows.is_empty() {
        Ok(())
    } else {
        Err(ValidationFailure::new(field, ValidationReason::IncompleteMatrix { missing_rows }))
    }
}

/// Validate `fields` in order, stopping at the first failure.
pub fn first_failure<'a, I>(fields: I, store: &ResponseStore) -> Result<(), ValidationFailure>
where
    I: IntoIterator<Item = &'a Field>,
{
    fields
        .into_iter()
        .try_for_each(|field| check_field(field, store.get(&field.id)))
}
