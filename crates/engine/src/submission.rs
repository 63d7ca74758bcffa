//! Submission controller: validate everything, send once, then clean up.
//!
//! Validation covers required fields on every page, not just the current one,
//! and stops at the first failure. Nothing is mutated until the service
//! acknowledges the submission, so a failed attempt can simply be retried.

use formfill_api::{ApiError, FormService, SubmissionReceipt};
use formfill_types::{DocumentPart, Field, ResponseValue, SubmissionPayload};
use formfill_util::DRAFT_KEY_PREFIX;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::store::ResponseStore;
use crate::validation::{ValidationFailure, first_failure};

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationFailure),
    #[error(transparent)]
    Transport(#[from] ApiError),
}

/// What happened after an acknowledged submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub receipt: SubmissionReceipt,
    /// Draft entries removed from the durable store.
    pub purged_drafts: usize,
}

/// Build the transmission payload from the current answers.
///
/// Documents holding their content become `document_<fieldId>` parts and are
/// marked `"file_attached"` in the responses map. Documents restored from a
/// draft have no content and are sent as metadata.
pub fn build_payload(store: &ResponseStore) -> SubmissionPayload {
    let mut payload = SubmissionPayload {
        form_id: store.form_id().to_string(),
        ..SubmissionPayload::default()
    };

    for (field_id, response) in store.responses() {
        if let ResponseValue::Document(document) = &response.value
            && let Some(bytes) = &document.bytes
        {
            payload.documents.push(DocumentPart {
                field_id: field_id.clone(),
                file_name: document.name.clone(),
                mime_type: document.mime_type.clone(),
                bytes: bytes.clone(),
            });
        }
        payload
            .responses
            .insert(field_id.clone(), response.value.to_submission_json());
    }
    payload
}

/// Validate, send and, on success, purge drafts and reset the store.
pub async fn submit(
    fields: &[Field],
    store: &mut ResponseStore,
    service: &dyn FormService,
) -> Result<SubmitOutcome, SubmitError> {
    first_failure(fields, store)?;

    let payload = build_payload(store);
    debug!(
        form_id = %payload.form_id,
        responses = payload.responses.len(),
        documents = payload.documents.len(),
        "sending submission"
    );
    let receipt = service.submit(&payload).await?;

    let purged_drafts = match store.clear(DRAFT_KEY_PREFIX) {
        Ok(removed) => removed,
        Err(error) => {
            warn!(%error, "submission accepted but drafts could not be purged");
            0
        }
    };
    store.reset();
    info!(form_id = %payload.form_id, purged_drafts, "submission accepted");

    Ok(SubmitOutcome { receipt, purged_drafts })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use formfill_types::{DocumentFile, FieldId, FieldKind, FormDocument, Page, PageId};
    use formfill_util::{DraftStore, InMemoryDraftStore};
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct RecordingService {
        reject: bool,
        sent: Mutex<Vec<SubmissionPayload>>,
    }

    #[async_trait]
    impl FormService for RecordingService {
        async fn fetch_form(&self, _form_id: &str) -> Result<FormDocument, ApiError> {
            Ok(FormDocument::default())
        }

        async fn fetch_pages(&self, _form_id: &str) -> Result<Vec<Page>, ApiError> {
            Ok(Vec::new())
        }

        async fn submit(&self, payload: &SubmissionPayload) -> Result<SubmissionReceipt, ApiError> {
            self.sent.lock().expect("sent lock").push(payload.clone());
            if self.reject {
                return Err(ApiError::Status {
                    status: 503,
                    message: "unavailable".into(),
                });
            }
            Ok(SubmissionReceipt { ok: true, error: None })
        }
    }

    fn store(drafts: Arc<InMemoryDraftStore>) -> ResponseStore {
        let mut store = ResponseStore::new("42", drafts);
        store.switch_page(Some(PageId::from("1")));
        store
    }

    #[tokio::test]
    async fn validation_failure_sends_nothing() {
        let drafts = Arc::new(InMemoryDraftStore::new());
        let service = RecordingService::default();
        let mut store = store(drafts.clone());
        store
            .set(FieldId::from("3"), FieldKind::ShortAnswer, ResponseValue::Text("kept".into()))
            .unwrap();
        let fields = vec![
            Field::new("1", FieldKind::Email).with_required(true).with_page("2"),
            Field::new("3", FieldKind::ShortAnswer).with_page("1"),
        ];
        let drafts_before = drafts.entries().unwrap();

        let error = submit(&fields, &mut store, &service).await.unwrap_err();

        assert!(matches!(error, SubmitError::Validation(ref failure) if failure.field_id.as_str() == "1"));
        assert!(service.sent.lock().unwrap().is_empty());
        assert_eq!(store.len(), 1);
        assert_eq!(drafts.entries().unwrap(), drafts_before);
    }

    #[tokio::test]
    async fn transport_failure_keeps_store_and_drafts() {
        let drafts = Arc::new(InMemoryDraftStore::new());
        let service = RecordingService {
            reject: true,
            ..RecordingService::default()
        };
        let mut store = store(drafts.clone());
        let field = Field::new("1", FieldKind::ShortAnswer).with_required(true);
        store
            .set(field.id.clone(), field.kind.clone(), ResponseValue::Text("hi".into()))
            .unwrap();

        let error = submit(std::slice::from_ref(&field), &mut store, &service)
            .await
            .unwrap_err();

        assert!(matches!(error, SubmitError::Transport(_)));
        assert_eq!(store.len(), 1);
        assert_eq!(drafts.entries().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn success_purges_drafts_and_resets_store() {
        let drafts = Arc::new(InMemoryDraftStore::new());
        drafts.set("form_7_page_1", "{}".into()).unwrap();
        drafts.set("theme", "dark".into()).unwrap();
        let service = RecordingService::default();
        let mut store = store(drafts.clone());
        store
            .set(FieldId::from("1"), FieldKind::ShortAnswer, ResponseValue::Text("hi".into()))
            .unwrap();

        let outcome = submit(&[], &mut store, &service).await.unwrap();

        assert_eq!(outcome.purged_drafts, 2);
        assert!(store.is_empty());
        let remaining: Vec<String> = drafts.entries().unwrap().into_iter().map(|(key, _)| key).collect();
        assert_eq!(remaining, vec!["theme".to_string()]);
    }

    #[test]
    fn payload_separates_document_content() {
        let mut store = store(Arc::new(InMemoryDraftStore::new()));
        store
            .set(
                FieldId::from("5"),
                FieldKind::DocumentType,
                ResponseValue::Document(DocumentFile::attached("cv.pdf", "application/pdf", vec![9u8; 10 * 1024])),
            )
            .unwrap();
        store
            .set(FieldId::from("6"), FieldKind::Switch, ResponseValue::Flag(false))
            .unwrap();

        let payload = build_payload(&store);

        assert_eq!(payload.form_id, "42");
        assert_eq!(payload.documents.len(), 1);
        assert_eq!(payload.documents[0].part_name(), "document_5");
        assert_eq!(payload.documents[0].bytes.len(), 10 * 1024);
        assert_eq!(payload.responses[&FieldId::from("5")], json!("file_attached"));
        assert_eq!(payload.responses[&FieldId::from("6")], json!("false"));
    }

    #[test]
    fn restored_document_is_sent_as_metadata() {
        let drafts = Arc::new(InMemoryDraftStore::new());
        drafts
            .set(
                "form_42_page_1",
                r#"{"5":{"type":"Document Type","value":{"name":"cv.pdf","type":"application/pdf","size":3}}}"#.into(),
            )
            .unwrap();
        let mut store = store(drafts);
        store.restore("42", &PageId::from("1")).unwrap();

        let payload = build_payload(&store);

        assert!(payload.documents.is_empty());
        assert_eq!(
            payload.responses[&FieldId::from("5")],
            json!({"name": "cv.pdf", "type": "application/pdf", "size": 3})
        );
    }
}
