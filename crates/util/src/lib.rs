//! Persistence and path helpers shared by the Formfill engine and CLI.

pub mod draft_store;
pub mod path_processing;

pub use draft_store::{
    DRAFT_KEY_PREFIX, DRAFT_PATH_ENV, DraftStore, DraftStoreError, InMemoryDraftStore, JsonDraftStore, StoredDraft, draft_key,
    form_draft_prefix,
};
pub use path_processing::expand_tilde;
