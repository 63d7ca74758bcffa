//! Answer files consumed by `formfill fill`.
//!
//! An answer file is a JSON object keyed by field id. Each value is one
//! interaction, a list of interactions applied in order, or a file to attach:
//!
//! ```json
//! {
//!   "1": {"set_text": "Ada"},
//!   "2": [{"toggle_option": 0}, {"toggle_option": 1}],
//!   "3": {"attach_file": "~/cv.pdf", "mime_type": "application/pdf"}
//! }
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use formfill_engine::Interaction;
use formfill_types::DocumentFile;
use formfill_util::expand_tilde;
use indexmap::IndexMap;
use serde::Deserialize;

const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum AnswerSpec {
    Attach {
        attach_file: String,
        #[serde(default)]
        mime_type: Option<String>,
    },
    Many(Vec<Interaction>),
    One(Interaction),
}

impl AnswerSpec {
    /// Resolve into interactions, reading attached files from disk.
    pub fn into_interactions(self) -> Result<Vec<Interaction>> {
        match self {
            AnswerSpec::Attach { attach_file, mime_type } => {
                let path = expand_tilde(&attach_file);
                let document = read_document(&path, mime_type)?;
                Ok(vec![Interaction::AttachDocument(document)])
            }
            AnswerSpec::Many(interactions) => Ok(interactions),
            AnswerSpec::One(interaction) => Ok(vec![interaction]),
        }
    }
}

pub fn load_answers(path: &Path) -> Result<IndexMap<String, AnswerSpec>> {
    let content = fs::read_to_string(path).with_context(|| format!("read answers from {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parse answers in {}", path.display()))
}

fn read_document(path: &Path, mime_type: Option<String>) -> Result<DocumentFile> {
    let bytes = fs::read(path).with_context(|| format!("read attachment {}", path.display()))?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "attachment".to_string());
    Ok(DocumentFile::attached(
        name,
        mime_type.unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string()),
        bytes,
    ))
}
