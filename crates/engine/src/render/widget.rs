//! Widget descriptors produced by the renderer.
//!
//! Descriptors are plain data: a front end maps each variant to a concrete
//! control. They serialize with a `widget` tag so the CLI can print them.

use formfill_types::{AddressValue, Alignment, DocumentFile, FieldId};
use serde::Serialize;

/// Flavour of single-line text input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextInputKind {
    Text,
    Email,
    Number,
}

/// Which picker a date-like field uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DateMode {
    Date,
    Time,
    DateTime,
}

/// One labelled choice with its derived selection state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionView {
    pub index: usize,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub selected: bool,
}

/// One matrix row and the index of its selected column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatrixRowView {
    pub label: String,
    pub selected_column: Option<usize>,
}

/// Metadata of the file currently attached to an upload widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub size: u64,
    /// False when only draft metadata survived a reload; the file must be
    /// chosen again before its content can be uploaded.
    pub content_available: bool,
}

impl From<&DocumentFile> for FileSummary {
    fn from(document: &DocumentFile) -> Self {
        Self {
            name: document.name.clone(),
            mime_type: document.mime_type.clone(),
            size: document.size,
            content_available: document.has_content(),
        }
    }
}

/// Interactive or static element for one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "widget", rename_all = "snake_case")]
pub enum Widget {
    TextInput {
        input: TextInputKind,
        value: String,
        placeholder: Option<String>,
    },
    TextArea {
        value: String,
        placeholder: Option<String>,
        lines: u16,
    },
    Checkbox {
        checked: bool,
    },
    Switch {
        on: bool,
    },
    RadioGroup {
        options: Vec<OptionView>,
    },
    CheckboxGroup {
        options: Vec<OptionView>,
    },
    Dropdown {
        options: Vec<OptionView>,
        placeholder: Option<String>,
    },
    MultiSelect {
        options: Vec<OptionView>,
    },
    PictureChoice {
        options: Vec<OptionView>,
    },
    ChoiceMatrix {
        rows: Vec<MatrixRowView>,
        columns: Vec<String>,
    },
    Ranking {
        items: Vec<String>,
    },
    StarRating {
        max: u32,
        value: Option<u32>,
    },
    Slider {
        min: f64,
        max: f64,
        value: Option<f64>,
    },
    OpinionScale {
        min: i64,
        max: i64,
        selected: Option<i64>,
    },
    DatePicker {
        mode: DateMode,
        value: String,
    },
    DateRange {
        from: String,
        to: String,
    },
    Address {
        parts: AddressValue,
    },
    FileUpload {
        file: Option<FileSummary>,
    },
    Divider,
    Image {
        src: Option<String>,
        alignment: Alignment,
    },
    Pdf {
        src: Option<String>,
    },
    Video {
        src: Option<String>,
    },
    #[serde(rename = "youtube")]
    YouTube {
        src: Option<String>,
        embed_url: Option<String>,
    },
    Heading {
        text: String,
        alignment: Alignment,
    },
    Banner {
        text: String,
        image: Option<String>,
    },
    ThankYou {
        message: String,
    },
    SubmitButton {
        label: String,
        color: String,
    },
    NextButton {
        label: String,
        color: String,
    },
}

/// Colors and typography after applying field overrides to the form theme.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedStyle {
    pub question_color: String,
    pub answer_color: String,
    pub background_color: String,
    pub primary_color: String,
    pub font: String,
    pub font_size: Option<f64>,
    pub alignment: Alignment,
}

/// Renderer output for one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedField {
    pub field_id: FieldId,
    #[serde(rename = "type")]
    pub kind: String,
    pub label: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub style: ResolvedStyle,
    pub widget: Widget,
}
