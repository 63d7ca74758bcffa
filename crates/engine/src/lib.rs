//! # Formfill Engine
//!
//! The engine turns a published form into something a respondent can fill
//! in. It renders fields as widget descriptors, keeps answers in a
//! write-through [`ResponseStore`] backed by durable drafts, walks pages in
//! `sort_order`, and submits the result.
//!
//! ## Architecture
//!
//! - **`store`**: canonical answers, mirrored to the draft store on every write
//! - **`render`**: field → widget dispatch and interaction write-back
//! - **`validation`**: required-field checks shared by navigation and submit
//! - **`navigation`**: page state machine with `start`/`end` sentinels
//! - **`submission`**: payload assembly and post-submit cleanup
//! - **`session`**: orchestrates the above for one respondent
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use formfill_engine::{FormSession, Interaction, TracingNotifier};
//! use formfill_types::{Field, FieldKind, FormDocument, Page};
//! use formfill_util::InMemoryDraftStore;
//!
//! let document = FormDocument {
//!     fields: vec![Field::new("1", FieldKind::Checkbox).with_required(true).with_page("1")],
//!     ..FormDocument::default()
//! };
//! let mut session = FormSession::from_parts(
//!     "42",
//!     document,
//!     vec![Page::new("1", 1, 1)],
//!     None,
//!     Arc::new(InMemoryDraftStore::new()),
//!     Arc::new(TracingNotifier),
//! )?;
//!
//! session.apply(&"1".into(), Interaction::Toggle)?;
//! assert_eq!(session.render_current_page().len(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod navigation;
pub mod notify;
pub mod render;
pub mod session;
pub mod store;
pub mod submission;
pub mod validation;

pub use navigation::{NavOutcome, NavPosition, NavigationError, PageNavigator};
pub use notify::{Notification, Notifier, Severity, TracingNotifier};
pub use render::{AddressPart, Interaction, InteractionError, RenderedField, Widget, apply_interaction, render};
pub use session::{FormSession, SessionError};
pub use store::{ResponseStore, UNPAGED_DRAFT_PAGE};
pub use submission::{SubmitError, SubmitOutcome, build_payload, submit};
pub use validation::{ValidationFailure, ValidationReason, check_field, first_failure};
