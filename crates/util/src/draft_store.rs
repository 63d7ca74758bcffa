//! Durable draft persistence for in-progress form responses.
//!
//! Drafts are plain key-value pairs: the key identifies a form page
//! (`form_<formId>_page_<pageId>`) and the value is the JSON text of that
//! page's response mapping. The store does not interpret values.
//!
//! Two backends are provided: a JSON file under the user's config directory
//! and an in-memory map for tests and ephemeral sessions.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::serde::ts_seconds;
use chrono::{DateTime, Utc};
use dirs_next::config_dir;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::expand_tilde;

/// Environment variable controlling the draft file location.
pub const DRAFT_PATH_ENV: &str = "FORMFILL_DRAFT_PATH";

/// Default filename for the persisted draft store.
pub const DRAFT_FILE_NAME: &str = "drafts.json";

/// Prefix shared by every draft key written by the engine.
pub const DRAFT_KEY_PREFIX: &str = "form_";

/// Errors surfaced by draft store operations.
#[derive(Debug, Error)]
pub enum DraftStoreError {
    /// I/O failure while reading or writing the draft file.
    #[error("draft I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization or deserialization failure.
    #[error("draft serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Build the draft key for one page of a form.
pub fn draft_key(form_id: &str, page_id: &str) -> String {
    format!("{}{}_page_{}", DRAFT_KEY_PREFIX, form_id, page_id)
}

/// Prefix matching every page draft of a single form.
pub fn form_draft_prefix(form_id: &str) -> String {
    format!("{}{}_page_", DRAFT_KEY_PREFIX, form_id)
}

/// Stored draft text plus its last write time.
#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct StoredDraft {
    pub value: String,
    #[serde(with = "ts_seconds")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Default, Serialize, Deserialize)]
struct DraftFile {
    entries: IndexMap<String, StoredDraft>,
}

impl DraftFile {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    fn upsert(&mut self, key: &str, value: String) {
        let entry = StoredDraft {
            value,
            updated_at: Utc::now(),
        };
        self.entries.insert(key.to_string(), entry);
    }

    fn remove_prefix(&mut self, prefix: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !key.starts_with(prefix));
        before - self.entries.len()
    }

    fn records(&self) -> Vec<(String, StoredDraft)> {
        self.entries
            .iter()
            .map(|(key, entry)| (key.clone(), entry.clone()))
            .collect()
    }
}

/// Shared trait implemented by draft persistence backends.
///
/// Every call is synchronous and treated as instantaneous by the engine.
pub trait DraftStore: Send + Sync {
    /// Read the draft stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, DraftStoreError>;

    /// Store or replace the draft under `key`.
    fn set(&self, key: &str, value: String) -> Result<(), DraftStoreError>;

    /// Remove every draft whose key starts with `prefix`, returning how many were removed.
    fn remove_prefix(&self, prefix: &str) -> Result<usize, DraftStoreError>;

    /// List stored drafts in insertion order.
    fn entries(&self) -> Result<Vec<(String, StoredDraft)>, DraftStoreError>;
}

/// JSON-backed draft store persisted on disk.
pub struct JsonDraftStore {
    path: PathBuf,
    entries: Mutex<DraftFile>,
}

impl JsonDraftStore {
    /// Create a store at the provided path (or the default path when omitted).
    pub fn new<P: Into<Option<PathBuf>>>(path: P) -> Result<Self, DraftStoreError> {
        let resolved_path = match path.into() {
            Some(path) => expand_tilde(&path.to_string_lossy()),
            None => default_draft_path(),
        };

        let file = load_draft_file(&resolved_path)?;
        Ok(Self {
            path: resolved_path,
            entries: Mutex::new(file),
        })
    }

    /// Initialize a store using the default location.
    pub fn with_defaults() -> Result<Self, DraftStoreError> {
        Self::new(None::<PathBuf>)
    }

    /// Access the underlying draft file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save_locked(&self, draft_file: &DraftFile) -> Result<(), DraftStoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(draft_file)?;
        fs::write(&self.path, content)?;
        debug!(path = %self.path.display(), entries = draft_file.entries.len(), "saved drafts");
        Ok(())
    }
}

impl DraftStore for JsonDraftStore {
    fn get(&self, key: &str) -> Result<Option<String>, DraftStoreError> {
        let entries = self.entries.lock().expect("draft lock poisoned");
        Ok(entries.get(key))
    }

    fn set(&self, key: &str, value: String) -> Result<(), DraftStoreError> {
        let mut entries = self.entries.lock().expect("draft lock poisoned");
        let previous = entries.entries.get(key).cloned();
        entries.upsert(key, value);
        if let Err(error) = self.save_locked(&entries) {
            // Keep memory and disk in agreement when the write fails.
            match previous {
                Some(previous) => {
                    entries.entries.insert(key.to_string(), previous);
                }
                None => {
                    entries.entries.shift_remove(key);
                }
            }
            return Err(error);
        }
        Ok(())
    }

    fn remove_prefix(&self, prefix: &str) -> Result<usize, DraftStoreError> {
        let mut entries = self.entries.lock().expect("draft lock poisoned");
        let removed = entries.remove_prefix(prefix);
        if removed > 0 {
            self.save_locked(&entries)?;
        }
        Ok(removed)
    }

    fn entries(&self) -> Result<Vec<(String, StoredDraft)>, DraftStoreError> {
        let entries = self.entries.lock().expect("draft lock poisoned");
        Ok(entries.records())
    }
}

/// In-memory draft store used for tests and sessions without a config directory.
#[derive(Default)]
pub struct InMemoryDraftStore {
    entries: Mutex<DraftFile>,
}

impl InMemoryDraftStore {
    /// Create an empty in-memory draft store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl DraftStore for InMemoryDraftStore {
    fn get(&self, key: &str) -> Result<Option<String>, DraftStoreError> {
        let entries = self.entries.lock().expect("draft lock poisoned");
        Ok(entries.get(key))
    }

    fn set(&self, key: &str, value: String) -> Result<(), DraftStoreError> {
        let mut entries = self.entries.lock().expect("draft lock poisoned");
        entries.upsert(key, value);
        Ok(())
    }

    fn remove_prefix(&self, prefix: &str) -> Result<usize, DraftStoreError> {
        let mut entries = self.entries.lock().expect("draft lock poisoned");
        Ok(entries.remove_prefix(prefix))
    }

    fn entries(&self) -> Result<Vec<(String, StoredDraft)>, DraftStoreError> {
        let entries = self.entries.lock().expect("draft lock poisoned");
        Ok(entries.records())
    }
}

fn default_draft_path() -> PathBuf {
    if let Ok(path) = env::var(DRAFT_PATH_ENV)
        && !path.trim().is_empty()
    {
        return expand_tilde(&path);
    }

    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("formfill")
        .join(DRAFT_FILE_NAME)
}

fn load_draft_file(path: &Path) -> Result<DraftFile, DraftStoreError> {
    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<DraftFile>(&content) {
            Ok(file) => Ok(file),
            Err(error) => {
                warn!(path = %path.display(), %error, "Failed to parse draft file; starting empty");
                Ok(DraftFile::default())
            }
        },
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(DraftFile::default()),
        Err(error) => Err(DraftStoreError::Io(error)),
    }
}
