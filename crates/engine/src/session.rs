//! One respondent's pass through a form.
//!
//! [`FormSession`] owns the fetched schema, the navigator and the response
//! store, and reports validation and transport failures through a
//! [`Notifier`]. Front ends drive it with renders, interactions and
//! navigation requests.

use std::sync::Arc;

use formfill_api::{ApiError, FormService};
use formfill_types::{Field, FieldId, Form, FormDocument, Page};
use formfill_util::{DraftStore, DraftStoreError};
use thiserror::Error;
use tracing::{debug, info};

use crate::navigation::{NavOutcome, NavPosition, NavigationError, PageNavigator};
use crate::notify::{Notification, Notifier, Severity};
use crate::render::{Interaction, InteractionError, RenderedField, apply_interaction, render};
use crate::store::ResponseStore;
use crate::submission::{SubmitError, SubmitOutcome, submit};

const SUBMIT_FAILED_BODY: &str = "Something went wrong while submitting. Please try again.";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to load form: {0}")]
    Fetch(#[from] ApiError),
    #[error("failed to restore drafts: {0}")]
    Draft(#[from] DraftStoreError),
}

pub struct FormSession {
    form: Form,
    fields: Vec<Field>,
    navigator: PageNavigator,
    store: ResponseStore,
    notifier: Arc<dyn Notifier>,
}

impl FormSession {
    /// Fetch the form and its pages, then restore any saved drafts.
    pub async fn load(
        service: &dyn FormService,
        form_id: &str,
        route: Option<&str>,
        drafts: Arc<dyn DraftStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, SessionError> {
        let document = service.fetch_form(form_id).await?;
        let pages = service.fetch_pages(form_id).await?;
        info!(form_id, fields = document.fields.len(), pages = pages.len(), "loaded form");
        Ok(Self::from_parts(form_id, document, pages, route, drafts, notifier)?)
    }

    /// Build a session from already fetched parts.
    ///
    /// Each page's fields are restored from that page's draft, so answers
    /// given on other pages count toward whole-form validation.
    pub fn from_parts(
        form_id: &str,
        document: FormDocument,
        pages: Vec<Page>,
        route: Option<&str>,
        drafts: Arc<dyn DraftStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, DraftStoreError> {
        let navigator = PageNavigator::new(pages, route);
        let mut store = ResponseStore::new(form_id, drafts);

        let mut restored = 0;
        if navigator.pages().is_empty() {
            restored += store.restore_unpaged(form_id)?;
        }
        for page in navigator.pages() {
            let owned: Vec<&FieldId> = document
                .fields
                .iter()
                .filter(|field| field.is_on_page(&page.id))
                .map(|field| &field.id)
                .collect();
            restored += store.restore_owned(form_id, &page.id, &owned)?;
        }
        debug!(form_id, restored, "restored drafts");

        store.switch_page(navigator.current_page_id().cloned());
        Ok(Self {
            form: document.form,
            fields: document.fields,
            navigator,
            store,
            notifier,
        })
    }

    pub fn form_id(&self) -> &str {
        self.store.form_id()
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn navigator(&self) -> &PageNavigator {
        &self.navigator
    }

    pub fn store(&self) -> &ResponseStore {
        &self.store
    }

    pub fn position(&self) -> NavPosition {
        self.navigator.position()
    }

    /// Fields shown at the current position. Unpaged forms show everything;
    /// the sentinel pages show nothing.
    pub fn current_fields(&self) -> Vec<&Field> {
        if self.navigator.pages().is_empty() {
            return self.fields.iter().collect();
        }
        match self.navigator.current_page_id() {
            Some(page_id) => self.fields.iter().filter(|field| field.is_on_page(page_id)).collect(),
            None => Vec::new(),
        }
    }

    pub fn render_current_page(&self) -> Vec<RenderedField> {
        self.current_fields()
            .into_iter()
            .map(|field| render(field, &self.store, &self.form.styling))
            .collect()
    }

    pub fn render_field(&self, field_id: &FieldId) -> Option<RenderedField> {
        self.field(field_id)
            .map(|field| render(field, &self.store, &self.form.styling))
    }

    pub fn field(&self, field_id: &FieldId) -> Option<&Field> {
        self.fields.iter().find(|field| &field.id == field_id)
    }

    /// Apply a widget interaction to one field shown at the current position.
    ///
    /// Fields on other pages are rejected, and so is everything at the
    /// `start`/`end` sentinels.
    pub fn apply(&mut self, field_id: &FieldId, interaction: Interaction) -> Result<(), InteractionError> {
        let Some(field) = self.fields.iter().find(|field| &field.id == field_id) else {
            return Err(InteractionError::UnknownField(field_id.clone()));
        };
        let on_page = self.navigator.pages().is_empty()
            || self
                .navigator
                .current_page_id()
                .is_some_and(|page_id| field.is_on_page(page_id));
        if !on_page {
            return Err(InteractionError::NotOnCurrentPage(field_id.clone()));
        }
        apply_interaction(field, &mut self.store, interaction)
    }

    pub fn next(&mut self) -> Result<NavOutcome, NavigationError> {
        match self.navigator.next(&self.fields, &self.store) {
            Ok(outcome) => {
                self.follow(outcome);
                Ok(outcome)
            }
            Err(NavigationError::Validation(failure)) => {
                self.notifier.notify(Notification::new(
                    "Missing required field",
                    failure.to_string(),
                    Severity::Warning,
                ));
                Err(NavigationError::Validation(failure))
            }
        }
    }

    pub fn back(&mut self) -> NavOutcome {
        let outcome = self.navigator.back();
        self.follow(outcome);
        outcome
    }

    /// Submit every answer. On success the navigator moves to `End`.
    pub async fn submit(&mut self, service: &dyn FormService) -> Result<SubmitOutcome, SubmitError> {
        match submit(&self.fields, &mut self.store, service).await {
            Ok(outcome) => {
                self.navigator.finish();
                self.store.switch_page(None);
                self.notifier.notify(Notification::new(
                    "Form submitted",
                    "Thank you, your responses were recorded.",
                    Severity::Info,
                ));
                Ok(outcome)
            }
            Err(error) => {
                let notification = match &error {
                    SubmitError::Validation(failure) => {
                        Notification::new("Missing required field", failure.to_string(), Severity::Warning)
                    }
                    SubmitError::Transport(_) => Notification::new("Submission failed", SUBMIT_FAILED_BODY, Severity::Error),
                };
                self.notifier.notify(notification);
                Err(error)
            }
        }
    }

    fn follow(&mut self, outcome: NavOutcome) {
        if let NavOutcome::Advanced(_) | NavOutcome::Retreated(_) = outcome {
            self.store.switch_page(self.navigator.current_page_id().cloned());
        }
    }
}
