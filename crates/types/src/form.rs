//! Field schema, page and styling definitions for a published form.
//!
//! Payloads fetched from the form service are tolerant of several legacy
//! shapes. Each public type here deserializes through a private `Raw*`
//! mirror and is normalized exactly once, so the rest of the workspace can
//! rely on a single canonical representation.

pub mod kind;
pub mod normalize;

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub use kind::FieldKind;
use normalize::{normalize_labels, normalize_number, normalize_options, normalize_required, normalize_text};

/// Default form background color.
pub const DEFAULT_BACKGROUND_COLOR: &str = "#ffffff";
/// Default question (label) color.
pub const DEFAULT_QUESTION_COLOR: &str = "#000000";
/// Default answer (input text) color.
pub const DEFAULT_ANSWER_COLOR: &str = "#333333";
/// Default accent color for buttons and selections.
pub const DEFAULT_PRIMARY_COLOR: &str = "#3b82f6";
/// Default font family.
pub const DEFAULT_FONT: &str = "Inter";

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                Ok(Self(IdRepr::deserialize(deserializer)?.into_string()))
            }
        }
    };
}

opaque_id!(
    /// Stable identifier of a field, unique within its form.
    FieldId
);
opaque_id!(
    /// Identifier of a page within a form.
    PageId
);

/// Identifiers are published as either JSON strings or integers.
#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Text(String),
    Signed(i64),
    Unsigned(u64),
}

impl IdRepr {
    fn into_string(self) -> String {
        match self {
            IdRepr::Text(text) => text,
            IdRepr::Signed(number) => number.to_string(),
            IdRepr::Unsigned(number) => number.to_string(),
        }
    }
}

/// One labelled choice offered by a container field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    /// Label shown to the respondent and stored in responses.
    pub option_text: String,
    /// Picture choice image, when the option carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl FieldOption {
    pub fn new(option_text: impl Into<String>) -> Self {
        Self {
            option_text: option_text.into(),
            image_url: None,
        }
    }
}

/// Horizontal alignment for headings and media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl Alignment {
    fn from_text(text: &str) -> Self {
        match text.trim().to_ascii_lowercase().as_str() {
            "center" | "centre" | "middle" => Alignment::Center,
            "right" | "end" => Alignment::Right,
            _ => Alignment::Left,
        }
    }
}

/// Per-field styling that overrides the form theme.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldStyleOverrides {
    pub question_color: Option<String>,
    pub answer_color: Option<String>,
    pub background_color: Option<String>,
    pub font_size: Option<f64>,
}

/// A single form element: question, media, control or layout.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawField")]
pub struct Field {
    pub id: FieldId,
    pub kind: FieldKind,
    pub required: bool,
    /// Page the field belongs to; fields without a page only appear in
    /// whole-form validation.
    pub page_id: Option<PageId>,
    pub label: Option<String>,
    pub placeholder: Option<String>,
    pub description: Option<String>,
    pub options: Vec<FieldOption>,
    /// Choice Matrix row labels.
    pub rows: Vec<String>,
    /// Choice Matrix column labels.
    pub columns: Vec<String>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    /// Uploaded media for Image, PDF, Video, YouTubeVideo and Banner fields.
    pub media_url: Option<String>,
    pub alignment: Alignment,
    pub style: FieldStyleOverrides,
}

impl Field {
    /// Build a bare field; mostly useful for tests and fixtures.
    pub fn new(id: impl Into<FieldId>, kind: FieldKind) -> Self {
        Self {
            id: id.into(),
            kind,
            required: false,
            page_id: None,
            label: None,
            placeholder: None,
            description: None,
            options: Vec::new(),
            rows: Vec::new(),
            columns: Vec::new(),
            min_value: None,
            max_value: None,
            media_url: None,
            alignment: Alignment::Left,
            style: FieldStyleOverrides::default(),
        }
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_page(mut self, page_id: impl Into<PageId>) -> Self {
        self.page_id = Some(page_id.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(FieldOption::new).collect();
        self
    }

    pub fn with_matrix<R, C, S>(mut self, rows: R, columns: C) -> Self
    where
        R: IntoIterator<Item = S>,
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows = rows.into_iter().map(Into::into).collect();
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_range(mut self, min_value: f64, max_value: f64) -> Self {
        self.min_value = Some(min_value);
        self.max_value = Some(max_value);
        self
    }

    /// Label used in the widget header and in validation messages.
    pub fn display_label(&self) -> String {
        match &self.label {
            Some(label) => label.clone(),
            None => format!("Field {}", self.id),
        }
    }

    /// Returns true when the field belongs to the given page.
    pub fn is_on_page(&self, page_id: &PageId) -> bool {
        self.page_id.as_ref() == Some(page_id)
    }
}

#[derive(Deserialize)]
struct RawField {
    id: FieldId,
    #[serde(rename = "type")]
    kind: FieldKind,
    #[serde(default)]
    required: Value,
    #[serde(default)]
    page_id: Option<PageId>,
    #[serde(default)]
    label: Value,
    #[serde(default)]
    question: Value,
    #[serde(default)]
    placeholder: Value,
    #[serde(default)]
    description: Value,
    #[serde(default)]
    options: Value,
    #[serde(default)]
    rows: Value,
    #[serde(default)]
    columns: Value,
    #[serde(default)]
    min_value: Value,
    #[serde(default)]
    max_value: Value,
    #[serde(default)]
    uploads: Value,
    #[serde(default)]
    alignment: Value,
    #[serde(default)]
    question_color: Value,
    #[serde(default)]
    answer_color: Value,
    #[serde(default)]
    background_color: Value,
    #[serde(default)]
    font_size: Value,
}

impl From<RawField> for Field {
    fn from(raw: RawField) -> Self {
        Self {
            id: raw.id,
            kind: raw.kind,
            required: normalize_required(&raw.required),
            page_id: raw.page_id,
            label: normalize_text(&raw.label).or_else(|| normalize_text(&raw.question)),
            placeholder: normalize_text(&raw.placeholder),
            description: normalize_text(&raw.description),
            options: normalize_options(&raw.options),
            rows: normalize_labels(&raw.rows),
            columns: normalize_labels(&raw.columns),
            min_value: normalize_number(&raw.min_value),
            max_value: normalize_number(&raw.max_value),
            media_url: media_url(&raw.uploads),
            alignment: normalize_text(&raw.alignment)
                .map(|text| Alignment::from_text(&text))
                .unwrap_or_default(),
            style: FieldStyleOverrides {
                question_color: normalize_text(&raw.question_color),
                answer_color: normalize_text(&raw.answer_color),
                background_color: normalize_text(&raw.background_color),
                font_size: normalize_number(&raw.font_size),
            },
        }
    }
}

/// `uploads` is either a URL string or an object/array describing the file.
fn media_url(uploads: &Value) -> Option<String> {
    match uploads {
        Value::Array(items) => items.iter().find_map(media_url),
        Value::Object(map) => ["url", "file", "src", "link"]
            .iter()
            .find_map(|key| map.get(*key).and_then(normalize_text)),
        other => normalize_text(other),
    }
}

/// Logical grouping of fields shown together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: PageId,
    #[serde(default, deserialize_with = "lenient_integer")]
    pub page_number: i64,
    #[serde(default)]
    pub page_title: Option<String>,
    /// Navigation order; independent of `page_number`.
    #[serde(default, deserialize_with = "lenient_integer")]
    pub sort_order: i64,
}

impl Page {
    pub fn new(id: impl Into<PageId>, page_number: i64, sort_order: i64) -> Self {
        Self {
            id: id.into(),
            page_number,
            page_title: None,
            sort_order,
        }
    }
}

/// Theme inputs read by the renderer. Never mutated by the engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormStyling {
    pub background_color: String,
    pub question_color: String,
    pub answer_color: String,
    pub primary_color: String,
    pub font: String,
    pub background_image: Option<String>,
}

impl Default for FormStyling {
    fn default() -> Self {
        Self {
            background_color: DEFAULT_BACKGROUND_COLOR.to_string(),
            question_color: DEFAULT_QUESTION_COLOR.to_string(),
            answer_color: DEFAULT_ANSWER_COLOR.to_string(),
            primary_color: DEFAULT_PRIMARY_COLOR.to_string(),
            font: DEFAULT_FONT.to_string(),
            background_image: None,
        }
    }
}

/// Form-level metadata returned alongside the field list.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(from = "RawForm")]
pub struct Form {
    pub title: Option<String>,
    pub description: Option<String>,
    pub styling: FormStyling,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawForm {
    title: Value,
    description: Value,
    background_color: Value,
    question_color: Value,
    answer_color: Value,
    primary_color: Value,
    selected_font: Value,
    font: Value,
    background_image: Value,
}

impl From<RawForm> for Form {
    fn from(raw: RawForm) -> Self {
        let defaults = FormStyling::default();
        Self {
            title: normalize_text(&raw.title),
            description: normalize_text(&raw.description),
            styling: FormStyling {
                background_color: normalize_text(&raw.background_color).unwrap_or(defaults.background_color),
                question_color: normalize_text(&raw.question_color).unwrap_or(defaults.question_color),
                answer_color: normalize_text(&raw.answer_color).unwrap_or(defaults.answer_color),
                primary_color: normalize_text(&raw.primary_color).unwrap_or(defaults.primary_color),
                font: normalize_text(&raw.selected_font)
                    .or_else(|| normalize_text(&raw.font))
                    .unwrap_or(defaults.font),
                background_image: media_url(&raw.background_image),
            },
        }
    }
}

/// Body of the form fetch endpoint.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct FormDocument {
    #[serde(default, deserialize_with = "null_as_default")]
    pub form: Form,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fields: Vec<Field>,
}

/// Body of the page list endpoint.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct PageList {
    #[serde(default, deserialize_with = "null_as_default")]
    pub pages: Vec<Page>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_integer<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(normalize_number(&value).map(|number| number as i64).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_field_with_legacy_shapes() {
        let field: Field = serde_json::from_value(json!({
            "id": 12,
            "type": "Multiple Choice",
            "required": "Yes",
            "page_id": 3,
            "question": "Favourite colour?",
            "options": "[{\"option_text\":\"Red\"},{\"option_text\":\"Blue\"}]",
            "alignment": "center"
        }))
        .expect("deserialize field");

        assert_eq!(field.id, FieldId::from("12"));
        assert_eq!(field.kind, FieldKind::MultipleChoice);
        assert!(field.required);
        assert_eq!(field.page_id, Some(PageId::from("3")));
        assert_eq!(field.display_label(), "Favourite colour?");
        assert_eq!(field.options.len(), 2);
        assert_eq!(field.alignment, Alignment::Center);
    }

    #[test]
    fn matrix_rows_and_columns_normalize_to_labels() {
        let field: Field = serde_json::from_value(json!({
            "id": "m1",
            "type": "Choice Matrix",
            "rows": [{"option_text": "Row A"}],
            "columns": ["Col 1", "Col 2"]
        }))
        .expect("deserialize matrix");

        assert_eq!(field.rows, vec!["Row A".to_string()]);
        assert_eq!(field.columns, vec!["Col 1".to_string(), "Col 2".to_string()]);
        assert!(!field.required);
    }

    #[test]
    fn form_document_applies_styling_defaults() {
        let document: FormDocument = serde_json::from_value(json!({
            "form": {"title": "Survey", "primary_color": "#ff0000", "question_color": ""},
            "fields": null
        }))
        .expect("deserialize document");

        assert_eq!(document.form.title.as_deref(), Some("Survey"));
        assert_eq!(document.form.styling.primary_color, "#ff0000");
        assert_eq!(document.form.styling.question_color, DEFAULT_QUESTION_COLOR);
        assert_eq!(document.form.styling.font, DEFAULT_FONT);
        assert!(document.fields.is_empty());
    }

    #[test]
    fn missing_form_object_uses_defaults() {
        let document: FormDocument = serde_json::from_value(json!({"fields": []})).expect("deserialize document");
        assert_eq!(document.form.styling, FormStyling::default());
    }

    #[test]
    fn pages_tolerate_textual_numbers() {
        let pages: PageList = serde_json::from_value(json!({
            "pages": [{"id": 1, "page_number": "2", "page_title": "Intro", "sort_order": null}]
        }))
        .expect("deserialize pages");

        assert_eq!(pages.pages[0].page_number, 2);
        assert_eq!(pages.pages[0].sort_order, 0);
    }
}
