//! In-memory responses mirrored write-through to the durable draft store.
//!
//! [`ResponseStore::set`] is the single mutation entry point used by the
//! renderer's interaction handling. Every call replaces one entry and then
//! rewrites the whole mapping into the draft for the current page, so memory
//! and draft never disagree after a mutation returns.

use std::sync::Arc;

use formfill_types::{FieldId, FieldKind, PageId, Response, ResponseMap, ResponseValue, decode_draft, encode_draft};
use formfill_util::{DraftStore, DraftStoreError, draft_key};
use serde_json::Value;
use tracing::{debug, warn};

/// Page component of the draft key for forms published without pages.
pub const UNPAGED_DRAFT_PAGE: &str = "main";

/// Canonical answers for one form-filling session.
pub struct ResponseStore {
    form_id: String,
    page_id: Option<PageId>,
    responses: ResponseMap,
    drafts: Arc<dyn DraftStore>,
}

impl std::fmt::Debug for ResponseStore {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ResponseStore")
            .field("form_id", &self.form_id)
            .field("page_id", &self.page_id)
            .field("responses", &self.responses)
            .finish_non_exhaustive()
    }
}

impl ResponseStore {
    /// Create an empty store writing drafts for `form_id`.
    pub fn new(form_id: impl Into<String>, drafts: Arc<dyn DraftStore>) -> Self {
        Self {
            form_id: form_id.into(),
            page_id: None,
            responses: ResponseMap::new(),
            drafts,
        }
    }

    pub fn form_id(&self) -> &str {
        &self.form_id
    }

    /// Page whose draft receives subsequent writes.
    pub fn current_page(&self) -> Option<&PageId> {
        self.page_id.as_ref()
    }

    /// Direct subsequent draft writes to another page.
    pub fn switch_page(&mut self, page_id: Option<PageId>) {
        self.page_id = page_id;
    }

    pub fn get(&self, field_id: &FieldId) -> Option<&Response> {
        self.responses.get(field_id)
    }

    pub fn value(&self, field_id: &FieldId) -> Option<&ResponseValue> {
        self.responses.get(field_id).map(|response| &response.value)
    }

    pub fn responses(&self) -> &ResponseMap {
        &self.responses
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    /// Key of the draft written by [`Self::set`].
    pub fn draft_key(&self) -> String {
        let page = self
            .page_id
            .as_ref()
            .map(PageId::as_str)
            .unwrap_or(UNPAGED_DRAFT_PAGE);
        draft_key(&self.form_id, page)
    }

    /// Replace the answer for `field_id` and persist the whole mapping.
    ///
    /// When the draft write fails the in-memory entry is rolled back and the
    /// error returned, leaving both sides as they were.
    pub fn set(&mut self, field_id: FieldId, kind: FieldKind, value: ResponseValue) -> Result<(), DraftStoreError> {
        let previous = self.responses.insert(field_id.clone(), Response::new(kind, value));

        if let Err(error) = self.persist() {
            match previous {
                Some(previous) => {
                    self.responses.insert(field_id, previous);
                }
                None => {
                    self.responses.shift_remove(&field_id);
                }
            }
            return Err(error);
        }
        Ok(())
    }

    /// Merge the draft stored for `(form_id, page_id)` into memory.
    ///
    /// Returns the number of restored answers. Entries that fail to decode are
    /// skipped. A document restored from a draft carries metadata only; if the
    /// same file is already held in memory with its content, the in-memory
    /// copy wins.
    pub fn restore(&mut self, form_id: &str, page_id: &PageId) -> Result<usize, DraftStoreError> {
        let key = draft_key(form_id, page_id.as_str());
        self.restore_key(&key, |_| true)
    }

    /// Restore only the answers to `owned` from the draft of `page_id`.
    ///
    /// Every page draft holds a snapshot of the whole mapping, but a field is
    /// only written while its own page is current. That page's draft is the
    /// one holding its latest answer; other drafts may carry stale copies.
    pub fn restore_owned(
        &mut self,
        form_id: &str,
        page_id: &PageId,
        owned: &[&FieldId],
    ) -> Result<usize, DraftStoreError> {
        let key = draft_key(form_id, page_id.as_str());
        self.restore_key(&key, |field_id| owned.contains(&field_id))
    }

    /// Restore the draft of a form published without pages.
    pub fn restore_unpaged(&mut self, form_id: &str) -> Result<usize, DraftStoreError> {
        let key = draft_key(form_id, UNPAGED_DRAFT_PAGE);
        self.restore_key(&key, |_| true)
    }

    /// Remove every durable draft whose key starts with `prefix`.
    pub fn clear(&self, prefix: &str) -> Result<usize, DraftStoreError> {
        let removed = self.drafts.remove_prefix(prefix)?;
        debug!(prefix, removed, "cleared drafts");
        Ok(removed)
    }

    /// Drop every in-memory answer. Drafts are not touched.
    pub fn reset(&mut self) {
        self.responses.clear();
    }

    fn persist(&self) -> Result<(), DraftStoreError> {
        let content = serde_json::to_string(&encode_draft(&self.responses))?;
        let key = self.draft_key();
        debug!(%key, entries = self.responses.len(), "writing draft");
        self.drafts.set(&key, content)
    }

    fn restore_key(&mut self, key: &str, keep: impl Fn(&FieldId) -> bool) -> Result<usize, DraftStoreError> {
        let Some(content) = self.drafts.get(key)? else {
            return Ok(0);
        };
        let draft: Value = match serde_json::from_str(&content) {
            Ok(draft) => draft,
            Err(error) => {
                warn!(%key, %error, "ignoring unparseable draft");
                return Ok(0);
            }
        };

        let (restored, failures) = decode_draft(&draft);
        for (field, error) in failures {
            warn!(%key, %field, %error, "skipping draft entry");
        }

        let mut count = 0;
        for (field_id, response) in restored {
            if !keep(&field_id) {
                continue;
            }
            count += 1;
            if self.holds_same_document(&field_id, &response) {
                continue;
            }
            self.responses.insert(field_id, response);
        }
        debug!(%key, count, "restored draft");
        Ok(count)
    }

    fn holds_same_document(&self, field_id: &FieldId, restored: &Response) -> bool {
        match (self.value(field_id), &restored.value) {
            (Some(ResponseValue::Document(current)), ResponseValue::Document(incoming)) => {
                current.has_content() && current.name == incoming.name && current.size == incoming.size
            }
            _ => false,
        }
    }
}
