//! Transmission payload assembled by the submission controller.

use indexmap::IndexMap;
use serde_json::Value;

use crate::form::FieldId;

/// Prefix of the multipart part carrying a document's binary content.
pub const DOCUMENT_PART_PREFIX: &str = "document_";

/// Binary attachment uploaded as its own multipart part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPart {
    pub field_id: FieldId,
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl DocumentPart {
    /// Multipart part name, `document_<fieldId>`.
    pub fn part_name(&self) -> String {
        format!("{}{}", DOCUMENT_PART_PREFIX, self.field_id)
    }
}

/// Everything sent to the submission endpoint for one form.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SubmissionPayload {
    pub form_id: String,
    /// Encoded responses keyed by field id, serialized as the `responses` part.
    pub responses: IndexMap<FieldId, Value>,
    pub documents: Vec<DocumentPart>,
}

impl SubmissionPayload {
    /// JSON text for the `responses` part.
    pub fn responses_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.responses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn responses_serialize_in_field_order() {
        let mut payload = SubmissionPayload {
            form_id: "9".into(),
            ..SubmissionPayload::default()
        };
        payload.responses.insert(FieldId::from("b"), json!("second"));
        payload.responses.insert(FieldId::from("a"), json!("first"));

        assert_eq!(payload.responses_json().expect("serialize"), r#"{"b":"second","a":"first"}"#);
    }

    #[test]
    fn document_part_is_named_after_field() {
        let part = DocumentPart {
            field_id: FieldId::from("7"),
            file_name: "cv.pdf".into(),
            mime_type: "application/pdf".into(),
            bytes: Vec::new(),
        };
        assert_eq!(part.part_name(), "document_7");
    }
}
