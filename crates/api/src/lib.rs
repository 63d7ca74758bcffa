//! Formfill API client.
//!
//! This crate talks to the form service that publishes forms and accepts
//! responses. It focuses on:
//!
//! - Constructing an HTTP client with sensible defaults
//! - Reading the base URL, token and timeout from the environment
//! - Validating `FORMFILL_API_BASE` for safety
//! - Fetching form definitions and page lists
//! - Posting multipart submissions with document attachments
//!
//! The engine depends on the [`FormService`] trait rather than on
//! [`FormsClient`] directly, so sessions can be driven against a fake service
//! in tests.

use std::env;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use formfill_types::{FormDocument, Page, PageList, SubmissionPayload};
use reqwest::multipart::{Form as MultipartForm, Part};
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url, header};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

/// Environment variable holding the API base URL.
pub const API_BASE_ENV: &str = "FORMFILL_API_BASE";
/// Environment variable holding an optional bearer token.
pub const API_TOKEN_ENV: &str = "FORMFILL_API_TOKEN";
/// Environment variable overriding the request timeout, in seconds.
pub const HTTP_TIMEOUT_ENV: &str = "FORMFILL_HTTP_TIMEOUT_SECS";

/// Base URL used when `FORMFILL_API_BASE` is unset.
pub const DEFAULT_API_BASE: &str = "http://localhost:8000/api";
/// Request timeout used when `FORMFILL_HTTP_TIMEOUT_SECS` is unset.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Hostnames allowed for local development regardless of scheme.
const LOCALHOST_DOMAINS: &[&str] = &["localhost", "127.0.0.1"];

/// Failures talking to the form service.
///
/// Every variant is recoverable: callers surface a generic message and leave
/// local state untouched so the user can retry.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, connect, timeout, TLS).
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The service answered with a non-2xx status.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },
    /// The body was empty or could not be parsed.
    #[error("malformed response: {0}")]
    Malformed(String),
    /// The service accepted the request but reported an error.
    #[error("submission rejected: {0}")]
    Rejected(String),
    /// The request payload could not be encoded.
    #[error("could not encode request: {0}")]
    Encoding(String),
}

/// Connection settings for [`FormsClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_token: Option<String>,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            api_token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    /// Read settings from `FORMFILL_API_BASE`, `FORMFILL_API_TOKEN` and
    /// `FORMFILL_HTTP_TIMEOUT_SECS`, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(base_url) = env::var(API_BASE_ENV)
            && !base_url.trim().is_empty()
        {
            config.base_url = base_url.trim().to_string();
        }
        config.api_token = env::var(API_TOKEN_ENV).ok().filter(|token| !token.trim().is_empty());
        if let Ok(timeout) = env::var(HTTP_TIMEOUT_ENV) {
            let seconds = timeout
                .trim()
                .parse::<u64>()
                .with_context(|| format!("{} must be a whole number of seconds", HTTP_TIMEOUT_ENV))?;
            config.timeout = Duration::from_secs(seconds);
        }
        Ok(config)
    }

    /// Replace the base URL, keeping the other settings.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Outcome reported by the submission endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct SubmissionReceipt {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// Remote collaborator consumed by the engine.
#[async_trait]
pub trait FormService: Send + Sync {
    /// Fetch the form's styling and field list.
    async fn fetch_form(&self, form_id: &str) -> Result<FormDocument, ApiError>;

    /// Fetch the form's page list.
    async fn fetch_pages(&self, form_id: &str) -> Result<Vec<Page>, ApiError>;

    /// Post a submission. `Ok` means the service acknowledged it.
    async fn submit(&self, payload: &SubmissionPayload) -> Result<SubmissionReceipt, ApiError>;
}

#[derive(Debug, Clone)]
/// Thin wrapper around a configured `reqwest::Client` for the form service.
pub struct FormsClient {
    pub base_url: Url,
    pub http: Client,
    pub user_agent: String,
}

impl FormsClient {
    /// Construct a client from explicit settings.
    ///
    /// Non-localhost hosts must use HTTPS.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let base_url = validate_base_url(&config.base_url)?;

        let mut default_headers = header::HeaderMap::new();
        if let Some(api_token) = &config.api_token {
            let authorization = header::HeaderValue::from_str(&format!("Bearer {}", api_token))
                .context("API token contains characters not allowed in a header")?;
            default_headers.insert(header::AUTHORIZATION, authorization);
        }
        default_headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(default_headers)
            .timeout(config.timeout)
            .build()
            .context("build http client")?;

        Ok(Self {
            base_url,
            http,
            user_agent: format!("formfill/0.1; {}", env::consts::OS),
        })
    }

    /// Construct a client from the environment (see [`ClientConfig::from_env`]).
    pub fn from_env() -> Result<Self> {
        Self::new(&ClientConfig::from_env()?)
    }

    /// Build a request for the given path segments under the base URL.
    pub fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let url = endpoint_url(&self.base_url, segments);
        debug!(%url, %method, "building request");

        self.http
            .request(method, url)
            .header(header::USER_AGENT, &self.user_agent)
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        let response = self.request(Method::GET, segments).send().await?;
        let status = response.status();
        let text = response.text().await?;
        parse_json_body(status, &text)
    }
}

#[async_trait]
impl FormService for FormsClient {
    async fn fetch_form(&self, form_id: &str) -> Result<FormDocument, ApiError> {
        self.get_json(&["forms", form_id]).await
    }

    async fn fetch_pages(&self, form_id: &str) -> Result<Vec<Page>, ApiError> {
        let list: PageList = self.get_json(&["forms", form_id, "pages"]).await?;
        Ok(list.pages)
    }

    async fn submit(&self, payload: &SubmissionPayload) -> Result<SubmissionReceipt, ApiError> {
        let form = build_multipart(payload)?;
        let response = self
            .request(Method::POST, &["forms", &payload.form_id, "responses"])
            .multipart(form)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;
        let receipt: SubmissionReceipt = parse_json_body(status, &text)?;

        match (&receipt.error, receipt.ok) {
            (Some(message), _) => Err(ApiError::Rejected(message.clone())),
            (None, false) => Err(ApiError::Rejected("service did not acknowledge the submission".into())),
            (None, true) => Ok(receipt),
        }
    }
}

/// Assemble the multipart body: `form_id`, `responses` and one
/// `document_<fieldId>` part per attachment.
pub fn build_multipart(payload: &SubmissionPayload) -> Result<MultipartForm, ApiError> {
    let responses = payload
        .responses_json()
        .map_err(|error| ApiError::Encoding(error.to_string()))?;
    let mut form = MultipartForm::new()
        .text("form_id", payload.form_id.clone())
        .text("responses", responses);

    for document in &payload.documents {
        let mut part = Part::bytes(document.bytes.clone()).file_name(document.file_name.clone());
        if !document.mime_type.trim().is_empty() {
            part = part
                .mime_str(&document.mime_type)
                .map_err(|error| ApiError::Encoding(format!("invalid mime type '{}': {}", document.mime_type, error)))?;
        }
        form = form.part(document.part_name(), part);
    }
    Ok(form)
}

/// Join path segments onto the base URL, percent-encoding each segment.
pub fn endpoint_url(base_url: &Url, segments: &[&str]) -> Url {
    let mut url = base_url.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty();
        path.extend(segments);
    }
    url
}

/// Interpret a response body, mapping non-2xx, empty and unparseable bodies
/// to [`ApiError`].
pub fn parse_json_body<T: DeserializeOwned>(status: StatusCode, text: &str) -> Result<T, ApiError> {
    if !status.is_success() {
        let message = serde_json::from_str::<SubmissionReceipt>(text)
            .ok()
            .and_then(|body| body.error)
            .unwrap_or_else(|| text.trim().to_string());
        warn!(status = status.as_u16(), %message, "form service returned an error status");
        return Err(ApiError::Status {
            status: status.as_u16(),
            message,
        });
    }

    if text.trim().is_empty() {
        return Err(ApiError::Malformed("empty response body".into()));
    }

    serde_json::from_str(text).map_err(|error| ApiError::Malformed(error.to_string()))
}

/// Validate that a base URL is acceptable for use by the client.
///
/// Rules:
/// - `localhost` or `127.0.0.1`: any scheme is allowed
/// - otherwise: scheme must be HTTPS
pub fn validate_base_url(base: &str) -> Result<Url> {
    let parsed_base_url = Url::parse(base).map_err(|e| anyhow!("Invalid {} URL '{}': {}", API_BASE_ENV, base, e))?;

    let host_name = parsed_base_url
        .host_str()
        .ok_or_else(|| anyhow!("{} must include a host", API_BASE_ENV))?;

    if LOCALHOST_DOMAINS
        .iter()
        .any(|&allowed| host_name.eq_ignore_ascii_case(allowed))
    {
        return Ok(parsed_base_url);
    }

    if parsed_base_url.scheme() != "https" {
        return Err(anyhow!(
            "{} must use https for non-localhost hosts; got '{}://'",
            API_BASE_ENV,
            parsed_base_url.scheme()
        ));
    }

    Ok(parsed_base_url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use formfill_types::{DocumentPart, FieldId};
    use serde_json::json;

    #[test]
    fn localhost_accepts_plain_http() {
        assert!(validate_base_url("http://localhost:8000/api").is_ok());
        assert!(validate_base_url("http://127.0.0.1").is_ok());
    }

    #[test]
    fn remote_hosts_require_https() {
        assert!(validate_base_url("http://forms.example.com").is_err());
        assert!(validate_base_url("https://forms.example.com/api").is_ok());
        assert!(validate_base_url("not a url").is_err());
    }

    #[test]
    fn endpoint_url_appends_encoded_segments() {
        let base = Url::parse("https://forms.example.com/api/").unwrap();
        let url = endpoint_url(&base, &["forms", "a b", "pages"]);
        assert_eq!(url.as_str(), "https://forms.example.com/api/forms/a%20b/pages");
    }

    #[test]
    fn parse_body_maps_status_errors() {
        let result: Result<PageList, ApiError> =
            parse_json_body(StatusCode::INTERNAL_SERVER_ERROR, r#"{"error":"database unavailable"}"#);
        match result {
            Err(ApiError::Status { status, message }) => {
                assert_eq!(status, 500);
                assert_eq!(message, "database unavailable");
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[test]
    fn parse_body_treats_empty_and_garbage_as_malformed() {
        let empty: Result<PageList, ApiError> = parse_json_body(StatusCode::OK, "  ");
        assert!(matches!(empty, Err(ApiError::Malformed(_))));

        let garbage: Result<PageList, ApiError> = parse_json_body(StatusCode::OK, "<html>");
        assert!(matches!(garbage, Err(ApiError::Malformed(_))));
    }

    #[test]
    fn parse_body_reads_page_list() {
        let pages: PageList = parse_json_body(StatusCode::OK, r#"{"pages":[{"id":1,"sort_order":2}]}"#).unwrap();
        assert_eq!(pages.pages.len(), 1);
        assert_eq!(pages.pages[0].sort_order, 2);
    }

    #[test]
    fn multipart_rejects_invalid_mime_type() {
        let mut payload = SubmissionPayload {
            form_id: "1".into(),
            ..SubmissionPayload::default()
        };
        payload.responses.insert(FieldId::from("2"), json!("hello"));
        payload.documents.push(DocumentPart {
            field_id: FieldId::from("3"),
            file_name: "cv.pdf".into(),
            mime_type: "not a mime".into(),
            bytes: vec![1, 2, 3],
        });

        assert!(matches!(build_multipart(&payload), Err(ApiError::Encoding(_))));
    }

    #[test]
    fn config_reads_environment() {
        temp_env::with_vars(
            [
                (API_BASE_ENV, Some("https://forms.example.com/api")),
                (API_TOKEN_ENV, Some("secret")),
                (HTTP_TIMEOUT_ENV, Some("5")),
            ],
            || {
                let config = ClientConfig::from_env().unwrap();
                assert_eq!(config.base_url, "https://forms.example.com/api");
                assert_eq!(config.api_token.as_deref(), Some("secret"));
                assert_eq!(config.timeout, Duration::from_secs(5));
            },
        );
    }

    #[test]
    fn config_rejects_non_numeric_timeout() {
        temp_env::with_var(HTTP_TIMEOUT_ENV, Some("soon"), || {
            assert!(ClientConfig::from_env().is_err());
        });
    }
}
