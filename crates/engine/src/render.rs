//! Field renderer: `(field, responses, theme) -> widget descriptor`.
//!
//! [`render`] is pure. It dispatches on [`FieldKind`] with one arm per kind
//! and falls back to a plain text input for kinds it does not recognise, so
//! a form authored with a newer builder still renders. Value changes travel
//! the other way through [`apply_interaction`].

mod interaction;
mod media;
mod selection;
mod widget;

pub use interaction::{AddressPart, Interaction, InteractionError, apply_interaction};
pub use media::youtube_embed_url;
pub use selection::{matrix_selection, ranking_order, selected_option_index, selected_option_indices};
pub use widget::{
    DateMode, FileSummary, MatrixRowView, OptionView, RenderedField, ResolvedStyle, TextInputKind, Widget,
};

use formfill_types::{AddressValue, Field, FieldKind, FormStyling, ResponseValue};

use crate::store::ResponseStore;
use selection::{flag_value, number_value, text_value};

const DEFAULT_STAR_COUNT: u32 = 5;
const DEFAULT_SLIDER_RANGE: (f64, f64) = (0.0, 100.0);
const DEFAULT_OPINION_RANGE: (i64, i64) = (0, 10);
const PARAGRAPH_LINES: u16 = 4;
const LONG_ANSWER_LINES: u16 = 8;

/// Render one field against the current answers and form theme.
pub fn render(field: &Field, store: &ResponseStore, styling: &FormStyling) -> RenderedField {
    RenderedField {
        field_id: field.id.clone(),
        kind: field.kind.as_tag().to_string(),
        label: field.display_label(),
        required: field.required && field.kind.accepts_response(),
        description: field.description.clone(),
        style: resolve_style(field, styling),
        widget: widget_for(field, store.value(&field.id), styling),
    }
}

/// Field overrides win over the form theme.
pub fn resolve_style(field: &Field, styling: &FormStyling) -> ResolvedStyle {
    let overrides = &field.style;
    ResolvedStyle {
        question_color: overrides
            .question_color
            .clone()
            .unwrap_or_else(|| styling.question_color.clone()),
        answer_color: overrides
            .answer_color
            .clone()
            .unwrap_or_else(|| styling.answer_color.clone()),
        background_color: overrides
            .background_color
            .clone()
            .unwrap_or_else(|| styling.background_color.clone()),
        primary_color: styling.primary_color.clone(),
        font: styling.font.clone(),
        font_size: overrides.font_size,
        alignment: field.alignment,
    }
}

fn widget_for(field: &Field, value: Option<&ResponseValue>, styling: &FormStyling) -> Widget {
    match &field.kind {
        FieldKind::ShortAnswer => text_input(field, value, TextInputKind::Text),
        FieldKind::Email => text_input(field, value, TextInputKind::Email),
        FieldKind::Number => text_input(field, value, TextInputKind::Number),
        FieldKind::Paragraph => text_area(field, value, PARAGRAPH_LINES),
        FieldKind::LongAnswer => text_area(field, value, LONG_ANSWER_LINES),

        FieldKind::Checkbox => Widget::Checkbox {
            checked: flag_value(value),
        },
        FieldKind::Switch => Widget::Switch { on: flag_value(value) },

        FieldKind::MultipleChoice => Widget::RadioGroup {
            options: single_choice_options(field, value),
        },
        FieldKind::Dropdown => Widget::Dropdown {
            options: single_choice_options(field, value),
            placeholder: field.placeholder.clone(),
        },
        FieldKind::Picture => Widget::PictureChoice {
            options: single_choice_options(field, value),
        },
        FieldKind::MultipleSelectCheckboxes => Widget::CheckboxGroup {
            options: multi_choice_options(field, value),
        },
        FieldKind::MultipleSelect => Widget::MultiSelect {
            options: multi_choice_options(field, value),
        },
        FieldKind::ChoiceMatrix => Widget::ChoiceMatrix {
            rows: field
                .rows
                .iter()
                .zip(matrix_selection(field, value))
                .map(|(label, selected_column)| MatrixRowView {
                    label: label.clone(),
                    selected_column,
                })
                .collect(),
            columns: field.columns.clone(),
        },
        FieldKind::Ranking => Widget::Ranking {
            items: ranking_order(field, value),
        },

        FieldKind::StarRating => Widget::StarRating {
            max: star_rating_max(field),
            value: number_value(value).map(|stars| stars.round().max(0.0) as u32),
        },
        FieldKind::Slider => {
            let (min, max) = slider_bounds(field);
            Widget::Slider {
                min,
                max,
                value: number_value(value),
            }
        }
        FieldKind::OpinionScale => {
            let (min, max) = opinion_scale_bounds(field);
            Widget::OpinionScale {
                min,
                max,
                selected: number_value(value).map(|point| point.round() as i64),
            }
        }

        FieldKind::DatePicker => date_picker(value, DateMode::Date),
        FieldKind::TimePicker => date_picker(value, DateMode::Time),
        FieldKind::DateTimePicker => date_picker(value, DateMode::DateTime),
        FieldKind::DateRange => match value {
            Some(ResponseValue::DateRange(range)) => Widget::DateRange {
                from: range.from.clone(),
                to: range.to.clone(),
            },
            _ => Widget::DateRange {
                from: String::new(),
                to: String::new(),
            },
        },
        FieldKind::Address => Widget::Address {
            parts: match value {
                Some(ResponseValue::Address(address)) => address.clone(),
                _ => AddressValue::default(),
            },
        },
        FieldKind::DocumentType => Widget::FileUpload {
            file: match value {
                Some(ResponseValue::Document(document)) => Some(FileSummary::from(document)),
                _ => None,
            },
        },

        FieldKind::Divider => Widget::Divider,
        FieldKind::Image => Widget::Image {
            src: field.media_url.clone(),
            alignment: field.alignment,
        },
        FieldKind::Pdf => Widget::Pdf {
            src: field.media_url.clone(),
        },
        FieldKind::Video => Widget::Video {
            src: field.media_url.clone(),
        },
        FieldKind::YouTubeVideo => Widget::YouTube {
            embed_url: field.media_url.as_deref().and_then(youtube_embed_url),
            src: field.media_url.clone(),
        },
        FieldKind::Heading => Widget::Heading {
            text: field.display_label(),
            alignment: field.alignment,
        },
        FieldKind::Banner => Widget::Banner {
            text: field.display_label(),
            image: field.media_url.clone(),
        },
        FieldKind::ThankYou => Widget::ThankYou {
            message: field
                .description
                .clone()
                .or_else(|| field.label.clone())
                .unwrap_or_else(|| "Thank you!".to_string()),
        },
        FieldKind::Submit => Widget::SubmitButton {
            label: field.label.clone().unwrap_or_else(|| "Submit".to_string()),
            color: styling.primary_color.clone(),
        },
        FieldKind::Next => Widget::NextButton {
            label: field.label.clone().unwrap_or_else(|| "Next".to_string()),
            color: styling.primary_color.clone(),
        },

        FieldKind::Unknown(_) => text_input(field, value, TextInputKind::Text),
    }
}

fn text_input(field: &Field, value: Option<&ResponseValue>, input: TextInputKind) -> Widget {
    Widget::TextInput {
        input,
        value: text_value(value),
        placeholder: field.placeholder.clone(),
    }
}

fn text_area(field: &Field, value: Option<&ResponseValue>, lines: u16) -> Widget {
    Widget::TextArea {
        value: text_value(value),
        placeholder: field.placeholder.clone(),
        lines,
    }
}

fn date_picker(value: Option<&ResponseValue>, mode: DateMode) -> Widget {
    Widget::DatePicker {
        mode,
        value: text_value(value),
    }
}

fn single_choice_options(field: &Field, value: Option<&ResponseValue>) -> Vec<OptionView> {
    let selected = selected_option_index(field, value);
    option_views(field, |index| selected == Some(index))
}

fn multi_choice_options(field: &Field, value: Option<&ResponseValue>) -> Vec<OptionView> {
    let selected = selected_option_indices(field, value);
    option_views(field, |index| selected.contains(&index))
}

fn option_views(field: &Field, is_selected: impl Fn(usize) -> bool) -> Vec<OptionView> {
    field
        .options
        .iter()
        .enumerate()
        .map(|(index, option)| OptionView {
            index,
            label: option.option_text.clone(),
            image_url: option.image_url.clone(),
            selected: is_selected(index),
        })
        .collect()
}

pub(crate) fn star_rating_max(field: &Field) -> u32 {
    field
        .max_value
        .filter(|max| *max >= 1.0)
        .map(|max| max.round() as u32)
        .unwrap_or(DEFAULT_STAR_COUNT)
}

pub(crate) fn slider_bounds(field: &Field) -> (f64, f64) {
    let min = field.min_value.unwrap_or(DEFAULT_SLIDER_RANGE.0);
    let max = field.max_value.unwrap_or(DEFAULT_SLIDER_RANGE.1);
    if max > min { (min, max) } else { DEFAULT_SLIDER_RANGE }
}

pub(crate) fn opinion_scale_bounds(field: &Field) -> (i64, i64) {
    let min = field.min_value.map(|min| min.round() as i64).unwrap_or(DEFAULT_OPINION_RANGE.0);
    let max = field.max_value.map(|max| max.round() as i64).unwrap_or(DEFAULT_OPINION_RANGE.1);
    if max > min { (min, max) } else { DEFAULT_OPINION_RANGE }
}
