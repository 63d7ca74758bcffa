//! Typed answers and the draft codec.
//!
//! A [`Response`] pairs the field kind with a [`ResponseValue`]. The JSON
//! produced by [`Response::to_draft_json`] is the durable draft format, so the
//! per-kind shapes below must stay byte-compatible with drafts written by
//! earlier sessions:
//!
//! | kind | JSON |
//! |---|---|
//! | Checkbox, Switch | `"true"` / `"false"` |
//! | Multiple Select(s), Ranking | array of option labels |
//! | Choice Matrix | object of lower-cased, trimmed row → column |
//! | Date Range | `{from, to}` |
//! | Address | `{address, city, state, zip}` |
//! | Document Type | `{name, type, size}` |
//! | everything else | raw string or number |

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value, json};
use thiserror::Error;

use crate::form::{FieldId, FieldKind};

/// Value sent in place of a document whose binary travels as its own part.
pub const FILE_ATTACHED_SENTINEL: &str = "file_attached";

/// Errors surfaced while decoding a stored draft entry.
#[derive(Debug, Error, PartialEq)]
pub enum CodecError {
    #[error("draft entry is not an object with `type` and `value`")]
    MissingEnvelope,
    #[error("value for `{kind}` has an unexpected shape: {found}")]
    UnexpectedShape { kind: String, found: String },
}

/// Start and end of a date range, as entered (ISO dates in practice).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateRangeValue {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
}

/// Postal address sub-fields.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AddressValue {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip: String,
}

impl AddressValue {
    /// Returns true when every sub-field has non-blank content.
    pub fn is_complete(&self) -> bool {
        [&self.address, &self.city, &self.state, &self.zip]
            .iter()
            .all(|part| !part.trim().is_empty())
    }
}

/// File chosen for a Document Type field.
///
/// Only `{name, type, size}` is ever serialized; the bytes stay in memory and
/// travel with the submission as a separate part.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DocumentFile {
    pub name: String,
    #[serde(rename = "type", default)]
    pub mime_type: String,
    #[serde(default)]
    pub size: u64,
    #[serde(skip)]
    pub bytes: Option<Vec<u8>>,
}

impl DocumentFile {
    /// Wrap freshly read file content.
    pub fn attached(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size: bytes.len() as u64,
            bytes: Some(bytes),
        }
    }

    /// Returns true when the binary content is available for upload.
    pub fn has_content(&self) -> bool {
        self.bytes.is_some()
    }
}

/// Typed answer content.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseValue {
    Text(String),
    Number(Number),
    Flag(bool),
    /// Option labels; for Ranking the order is the chosen rank.
    Selections(Vec<String>),
    /// Row label → column label, both lower-cased and trimmed.
    Matrix(IndexMap<String, String>),
    DateRange(DateRangeValue),
    Address(AddressValue),
    Document(DocumentFile),
}

impl ResponseValue {
    /// Build a matrix answer, normalizing labels to the stored key format.
    pub fn matrix<I, R, C>(cells: I) -> Self
    where
        I: IntoIterator<Item = (R, C)>,
        R: AsRef<str>,
        C: AsRef<str>,
    {
        ResponseValue::Matrix(
            cells
                .into_iter()
                .map(|(row, column)| (matrix_key(row.as_ref()), matrix_key(column.as_ref())))
                .collect(),
        )
    }

    /// Returns true when the value carries no answer content.
    pub fn is_blank(&self) -> bool {
        match self {
            ResponseValue::Text(text) => text.trim().is_empty(),
            ResponseValue::Number(_) | ResponseValue::Flag(_) => false,
            ResponseValue::Selections(items) => items.is_empty(),
            ResponseValue::Matrix(cells) => cells.is_empty(),
            ResponseValue::DateRange(range) => range.from.trim().is_empty() && range.to.trim().is_empty(),
            ResponseValue::Address(address) => [&address.address, &address.city, &address.state, &address.zip]
                .iter()
                .all(|part| part.trim().is_empty()),
            ResponseValue::Document(document) => document.name.trim().is_empty(),
        }
    }

    /// Encode as draft JSON.
    pub fn to_draft_json(&self) -> Value {
        match self {
            ResponseValue::Text(text) => Value::String(text.clone()),
            ResponseValue::Number(number) => Value::Number(number.clone()),
            ResponseValue::Flag(flag) => Value::String(flag.to_string()),
            ResponseValue::Selections(items) => json!(items),
            ResponseValue::Matrix(cells) => Value::Object(
                cells
                    .iter()
                    .map(|(row, column)| (matrix_key(row), Value::String(matrix_key(column))))
                    .collect(),
            ),
            ResponseValue::DateRange(range) => json!({"from": range.from, "to": range.to}),
            ResponseValue::Address(address) => json!({
                "address": address.address,
                "city": address.city,
                "state": address.state,
                "zip": address.zip,
            }),
            ResponseValue::Document(document) => json!({
                "name": document.name,
                "type": document.mime_type,
                "size": document.size,
            }),
        }
    }

    /// Encode for the submission `responses` map.
    ///
    /// Identical to the draft encoding except that documents whose content is
    /// uploaded as a separate part are replaced with [`FILE_ATTACHED_SENTINEL`].
    pub fn to_submission_json(&self) -> Value {
        match self {
            ResponseValue::Document(document) if document.has_content() => {
                Value::String(FILE_ATTACHED_SENTINEL.to_string())
            }
            other => other.to_draft_json(),
        }
    }

    /// Decode draft JSON for the given kind. Inverse of [`Self::to_draft_json`].
    pub fn from_draft_json(kind: &FieldKind, value: &Value) -> Result<Self, CodecError> {
        let unexpected = || CodecError::UnexpectedShape {
            kind: kind.as_tag().to_string(),
            found: value.to_string(),
        };

        match kind {
            FieldKind::Checkbox | FieldKind::Switch => match value {
                Value::String(text) => match text.trim() {
                    "true" => Ok(ResponseValue::Flag(true)),
                    "false" => Ok(ResponseValue::Flag(false)),
                    _ => Err(unexpected()),
                },
                Value::Bool(flag) => Ok(ResponseValue::Flag(*flag)),
                _ => Err(unexpected()),
            },
            FieldKind::MultipleSelect | FieldKind::MultipleSelectCheckboxes | FieldKind::Ranking => match value {
                Value::Array(items) => items
                    .iter()
                    .map(|item| item.as_str().map(str::to_string))
                    .collect::<Option<Vec<_>>>()
                    .map(ResponseValue::Selections)
                    .ok_or_else(unexpected),
                _ => Err(unexpected()),
            },
            FieldKind::ChoiceMatrix => match value {
                Value::Object(map) => map
                    .iter()
                    .map(|(row, column)| column.as_str().map(|column| (row.as_str(), column)))
                    .collect::<Option<Vec<_>>>()
                    .map(ResponseValue::matrix)
                    .ok_or_else(unexpected),
                _ => Err(unexpected()),
            },
            FieldKind::DateRange => decode_object(value)
                .map(ResponseValue::DateRange)
                .ok_or_else(unexpected),
            FieldKind::Address => decode_object(value)
                .map(ResponseValue::Address)
                .ok_or_else(unexpected),
            FieldKind::DocumentType => decode_object(value)
                .map(ResponseValue::Document)
                .ok_or_else(unexpected),
            _ => match value {
                Value::String(text) => Ok(ResponseValue::Text(text.clone())),
                Value::Number(number) => Ok(ResponseValue::Number(number.clone())),
                Value::Bool(flag) => Ok(ResponseValue::Text(flag.to_string())),
                _ => Err(unexpected()),
            },
        }
    }
}

fn decode_object<T: for<'de> Deserialize<'de>>(value: &Value) -> Option<T> {
    match value {
        Value::Object(_) => serde_json::from_value(value.clone()).ok(),
        _ => None,
    }
}

/// Normalize a matrix row or column label into its stored key form.
pub fn matrix_key(label: &str) -> String {
    label.trim().to_lowercase()
}

/// One stored answer: `{type, value}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub kind: FieldKind,
    pub value: ResponseValue,
}

impl Response {
    pub fn new(kind: FieldKind, value: ResponseValue) -> Self {
        Self { kind, value }
    }

    /// Encode as the `{type, value}` draft envelope.
    pub fn to_draft_json(&self) -> Value {
        json!({"type": self.kind.as_tag(), "value": self.value.to_draft_json()})
    }

    /// Decode a `{type, value}` draft envelope.
    pub fn from_draft_json(envelope: &Value) -> Result<Self, CodecError> {
        let kind = envelope
            .get("type")
            .and_then(Value::as_str)
            .map(FieldKind::from_tag)
            .ok_or(CodecError::MissingEnvelope)?;
        let value = envelope.get("value").ok_or(CodecError::MissingEnvelope)?;
        let value = ResponseValue::from_draft_json(&kind, value)?;
        Ok(Self { kind, value })
    }
}

/// Ordered mapping of answers keyed by field.
pub type ResponseMap = IndexMap<FieldId, Response>;

/// Encode a whole response map as a draft object.
pub fn encode_draft(responses: &ResponseMap) -> Value {
    let entries: Map<String, Value> = responses
        .iter()
        .map(|(field_id, response)| (field_id.to_string(), response.to_draft_json()))
        .collect();
    Value::Object(entries)
}

/// Decode a draft object, returning decoded entries and the keys that failed.
pub fn decode_draft(draft: &Value) -> (ResponseMap, Vec<(String, CodecError)>) {
    let mut responses = ResponseMap::new();
    let mut failures = Vec::new();
    let Some(entries) = draft.as_object() else {
        failures.push((String::new(), CodecError::MissingEnvelope));
        return (responses, failures);
    };

    for (key, envelope) in entries {
        match Response::from_draft_json(envelope) {
            Ok(response) => {
                responses.insert(FieldId::from(key.as_str()), response);
            }
            Err(error) => failures.push((key.clone(), error)),
        }
    }
    (responses, failures)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_are_stored_as_strings() {
        let response = Response::new(FieldKind::Checkbox, ResponseValue::Flag(true));
        assert_eq!(response.to_draft_json(), json!({"type": "Checkbox", "value": "true"}));
    }

    #[test]
    fn matrix_keys_are_lowercased_and_trimmed() {
        let value = ResponseValue::matrix([(" Row A ", "Col B")]);
        assert_eq!(value.to_draft_json(), json!({"row a": "col b"}));
    }

    #[test]
    fn documents_never_serialize_bytes() {
        let document = DocumentFile::attached("cv.pdf", "application/pdf", vec![0u8; 16]);
        let value = ResponseValue::Document(document);
        assert_eq!(value.to_draft_json(), json!({"name": "cv.pdf", "type": "application/pdf", "size": 16}));
        assert_eq!(value.to_submission_json(), json!(FILE_ATTACHED_SENTINEL));
    }

    #[test]
    fn restored_document_keeps_metadata_only() {
        let envelope = json!({"type": "Document Type", "value": {"name": "cv.pdf", "type": "application/pdf", "size": 16}});
        let response = Response::from_draft_json(&envelope).expect("decode document");
        let ResponseValue::Document(document) = response.value else {
            panic!("expected document value");
        };
        assert_eq!(document.size, 16);
        assert!(!document.has_content());
    }

    #[test]
    fn decode_draft_skips_malformed_entries() {
        let draft = json!({
            "1": {"type": "Switch", "value": "false"},
            "2": {"type": "Ranking", "value": "not a list"},
            "3": {"value": "missing type"}
        });
        let (responses, failures) = decode_draft(&draft);
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[&FieldId::from("1")].value, ResponseValue::Flag(false));
        assert_eq!(failures.len(), 2);
    }

    #[test]
    fn scalar_kinds_keep_numbers_and_text() {
        let number = ResponseValue::from_draft_json(&FieldKind::Slider, &json!(42)).expect("decode number");
        assert_eq!(number, ResponseValue::Number(Number::from(42)));
        let text = ResponseValue::from_draft_json(&FieldKind::Email, &json!("a@b.c")).expect("decode text");
        assert_eq!(text, ResponseValue::Text("a@b.c".into()));
    }

    #[test]
    fn address_completeness_requires_every_part() {
        let mut address = AddressValue {
            address: "1 Main St".into(),
            city: "Springfield".into(),
            state: "IL".into(),
            zip: String::new(),
        };
        assert!(!address.is_complete());
        address.zip = "62701".into();
        assert!(address.is_complete());
    }
}
