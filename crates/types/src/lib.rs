//! Shared form schema, response and submission types for the Formfill workspace.
//!
//! - [`form`]: fields, pages and styling as published by the form service.
//! - [`response`]: typed answers and the durable draft codec.
//! - [`submission`]: the multipart payload handed to the submission endpoint.

pub mod form;
pub mod response;
pub mod submission;

pub use form::{
    Alignment, Field, FieldId, FieldKind, FieldOption, FieldStyleOverrides, Form, FormDocument, FormStyling, Page, PageId, PageList,
};
pub use response::{
    AddressValue, CodecError, DateRangeValue, DocumentFile, FILE_ATTACHED_SENTINEL, Response, ResponseMap, ResponseValue, decode_draft,
    encode_draft, matrix_key,
};
pub use submission::{DOCUMENT_PART_PREFIX, DocumentPart, SubmissionPayload};
