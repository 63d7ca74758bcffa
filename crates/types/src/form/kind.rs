//! Closed set of field type tags understood by the renderer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Field type tag as published by the form builder.
///
/// Tags arrive as display strings (for example `"Short Answer"`). Anything the
/// renderer does not know about is preserved in [`FieldKind::Unknown`] so a
/// form authored with a newer builder never fails to load.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldKind {
    ShortAnswer,
    Paragraph,
    Email,
    Number,
    Checkbox,
    MultipleSelectCheckboxes,
    Dropdown,
    MultipleSelect,
    Switch,
    MultipleChoice,
    ChoiceMatrix,
    DatePicker,
    TimePicker,
    DateTimePicker,
    DateRange,
    LongAnswer,
    DocumentType,
    Ranking,
    StarRating,
    Slider,
    OpinionScale,
    Address,
    Picture,
    Divider,
    Image,
    Pdf,
    Video,
    YouTubeVideo,
    Heading,
    Banner,
    ThankYou,
    Submit,
    Next,
    /// Tag not recognised by this version; rendered as a plain text input.
    Unknown(String),
}

const KNOWN_TAGS: &[(&str, FieldKind)] = &[
    ("Short Answer", FieldKind::ShortAnswer),
    ("Paragraph", FieldKind::Paragraph),
    ("Email", FieldKind::Email),
    ("Number", FieldKind::Number),
    ("Checkbox", FieldKind::Checkbox),
    ("Multiple Select Checkboxes", FieldKind::MultipleSelectCheckboxes),
    ("Dropdown", FieldKind::Dropdown),
    ("Multiple Select", FieldKind::MultipleSelect),
    ("Switch", FieldKind::Switch),
    ("Multiple Choice", FieldKind::MultipleChoice),
    ("Choice Matrix", FieldKind::ChoiceMatrix),
    ("Date Picker", FieldKind::DatePicker),
    ("Time Picker", FieldKind::TimePicker),
    ("DateTime Picker", FieldKind::DateTimePicker),
    ("Date Range", FieldKind::DateRange),
    ("Long Answer", FieldKind::LongAnswer),
    ("Document Type", FieldKind::DocumentType),
    ("Ranking", FieldKind::Ranking),
    ("Star Rating", FieldKind::StarRating),
    ("Slider", FieldKind::Slider),
    ("Opinion Scale", FieldKind::OpinionScale),
    ("Address", FieldKind::Address),
    ("Picture", FieldKind::Picture),
    ("Divider", FieldKind::Divider),
    ("Image", FieldKind::Image),
    ("PDF", FieldKind::Pdf),
    ("Video", FieldKind::Video),
    ("YouTubeVideo", FieldKind::YouTubeVideo),
    ("Heading", FieldKind::Heading),
    ("Banner", FieldKind::Banner),
    ("ThankYou", FieldKind::ThankYou),
    ("Submit", FieldKind::Submit),
    ("Next", FieldKind::Next),
];

impl FieldKind {
    /// Resolve a published tag. Exact matches win; otherwise the comparison
    /// ignores case and whitespace so `"multiple select"` and `"DateTimePicker"`
    /// still resolve.
    pub fn from_tag(tag: &str) -> Self {
        if let Some((_, kind)) = KNOWN_TAGS.iter().find(|(known, _)| *known == tag) {
            return kind.clone();
        }

        let wanted = squash(tag);
        KNOWN_TAGS
            .iter()
            .find(|(known, _)| squash(known) == wanted)
            .map(|(_, kind)| kind.clone())
            .unwrap_or_else(|| FieldKind::Unknown(tag.to_string()))
    }

    /// Canonical tag used in drafts and submissions.
    pub fn as_tag(&self) -> &str {
        if let FieldKind::Unknown(tag) = self {
            return tag;
        }
        KNOWN_TAGS
            .iter()
            .find(|(_, kind)| kind == self)
            .map(|(tag, _)| *tag)
            .unwrap_or_default()
    }

    /// Returns true for kinds that collect an answer from the respondent.
    ///
    /// Layout, media and control elements never carry a response and are
    /// skipped by required-field validation.
    pub fn accepts_response(&self) -> bool {
        !matches!(
            self,
            FieldKind::Divider
                | FieldKind::Image
                | FieldKind::Pdf
                | FieldKind::Video
                | FieldKind::YouTubeVideo
                | FieldKind::Heading
                | FieldKind::Banner
                | FieldKind::ThankYou
                | FieldKind::Submit
                | FieldKind::Next
        )
    }

    /// Kinds whose answer is a list of option labels.
    pub fn is_multi_select(&self) -> bool {
        matches!(
            self,
            FieldKind::MultipleSelect | FieldKind::MultipleSelectCheckboxes | FieldKind::Ranking
        )
    }

    /// Kinds whose answer is stored as the string `"true"` / `"false"`.
    pub fn is_flag(&self) -> bool {
        matches!(self, FieldKind::Checkbox | FieldKind::Switch)
    }
}

fn squash(tag: &str) -> String {
    tag.chars()
        .filter(|character| !character.is_whitespace() && *character != '_' && *character != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

impl FromStr for FieldKind {
    type Err = std::convert::Infallible;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        Ok(FieldKind::from_tag(tag))
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_tag())
    }
}

impl Serialize for FieldKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_tag())
    }
}

impl<'de> Deserialize<'de> for FieldKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(FieldKind::from_tag(&tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_exact_and_loose_tags() {
        assert_eq!(FieldKind::from_tag("Choice Matrix"), FieldKind::ChoiceMatrix);
        assert_eq!(FieldKind::from_tag("multiple select"), FieldKind::MultipleSelect);
        assert_eq!(FieldKind::from_tag("DatePicker"), FieldKind::DatePicker);
        assert_eq!(FieldKind::from_tag("pdf"), FieldKind::Pdf);
    }

    #[test]
    fn multiple_select_does_not_shadow_checkbox_variant() {
        assert_eq!(
            FieldKind::from_tag("Multiple Select Checkboxes"),
            FieldKind::MultipleSelectCheckboxes
        );
    }

    #[test]
    fn unknown_tags_are_preserved() {
        let kind = FieldKind::from_tag("Signature Pad");
        assert_eq!(kind, FieldKind::Unknown("Signature Pad".into()));
        assert_eq!(kind.as_tag(), "Signature Pad");
        assert!(kind.accepts_response());
    }

    #[test]
    fn tags_round_trip_through_serde() {
        let kind: FieldKind = serde_json::from_str("\"Opinion Scale\"").expect("deserialize kind");
        assert_eq!(kind, FieldKind::OpinionScale);
        assert_eq!(serde_json::to_string(&kind).expect("serialize kind"), "\"Opinion Scale\"");
    }
}
