//! HTTP client wrapper with identity injection and error normalization.
//!
//! # Design
//! `Api` splits every call into three steps, mirroring a host-does-IO client:
//! [`Api::build_request`] produces an `HttpRequest` as plain data (identity
//! headers included), the `Transport` executes it, and the response is
//! interpreted into `Result<R, ApiError>`. Errors are always returned to the
//! caller; the attached [`Notifier`], if any, is told about the ones a user
//! should see before the error is handed back.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::form_data::FormData;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, RequestBody, UploadProgress};
use crate::notify::{notification_for, Notifier};
use crate::session::SessionStore;
use crate::transport::Transport;
use crate::types::{BatchIds, ContactSubmission, PassportSubmission};

/// Header carrying the session token.
pub const SESSION_HEADER: &str = "session_id";
/// Header carrying the user id.
pub const USER_HEADER: &str = "user_id";

/// Per-call extras: query parameters and additional headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestConfig {
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
}

impl RequestConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Payloads accepted by [`Api::post`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostBody {
    Passport(PassportSubmission),
    Contact(ContactSubmission),
    FormData(FormData),
}

impl PostBody {
    fn encode(&self) -> Result<RequestBody, ApiError> {
        match self {
            PostBody::Passport(passport) => json_body(passport),
            PostBody::Contact(contact) => json_body(contact),
            PostBody::FormData(form) => Ok(form.encode()),
        }
    }
}

impl From<PassportSubmission> for PostBody {
    fn from(value: PassportSubmission) -> Self {
        PostBody::Passport(value)
    }
}

impl From<ContactSubmission> for PostBody {
    fn from(value: ContactSubmission) -> Self {
        PostBody::Contact(value)
    }
}

impl From<FormData> for PostBody {
    fn from(value: FormData) -> Self {
        PostBody::FormData(value)
    }
}

/// Client for the contacts backend.
pub struct Api<T> {
    base_url: String,
    session: SessionStore,
    transport: T,
    notifier: Option<Arc<dyn Notifier>>,
}

impl<T: Transport> Api<T> {
    pub fn new(base_url: &str, session: SessionStore, transport: T) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
            transport,
            notifier: None,
        }
    }

    /// Attach the observer told about user-facing failures.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Describe a request without sending it.
    ///
    /// The identity headers are read from the session store now, so a request
    /// built after `set_user_data` carries the new values.
    pub fn build_request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<RequestBody>,
        config: Option<&RequestConfig>,
    ) -> HttpRequest {
        let mut query = Vec::new();
        let mut headers = Vec::new();
        if let Some(config) = config {
            query.extend(config.query.iter().cloned());
            headers.extend(config.headers.iter().cloned());
        }

        let session = self.session.snapshot();
        headers.push((SESSION_HEADER.to_string(), session.session_token));
        headers.push((USER_HEADER.to_string(), session.user_id));

        if let Some(body) = &body {
            headers.push(("content-type".to_string(), body.content_type()));
        }

        HttpRequest {
            method,
            url: self.url(path),
            query,
            headers,
            body,
        }
    }

    pub fn get<R: DeserializeOwned>(
        &self,
        path: &str,
        config: Option<&RequestConfig>,
    ) -> Result<R, ApiError> {
        let request = self.build_request(HttpMethod::Get, path, None, config);
        self.send(request)
    }

    pub fn post<R: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&PostBody>,
        config: Option<&RequestConfig>,
    ) -> Result<R, ApiError> {
        let body = self.encode(body.map(PostBody::encode))?;
        let request = self.build_request(HttpMethod::Post, path, body, config);
        self.send(request)
    }

    /// POST while reporting upload progress; returns the full response so the
    /// caller can inspect status and headers.
    pub fn post_with_progress(
        &self,
        path: &str,
        body: Option<&PostBody>,
        config: Option<&RequestConfig>,
        on_progress: &mut dyn FnMut(UploadProgress),
    ) -> Result<HttpResponse, ApiError> {
        let body = self.encode(body.map(PostBody::encode))?;
        let request = self.build_request(HttpMethod::Post, path, body, config);
        tracing::debug!(
            method = request.method.as_str(),
            url = %request.url,
            "dispatch with progress"
        );

        let outcome = self
            .transport
            .execute_with_progress(&request, on_progress)
            .map_err(ApiError::from)
            .and_then(|response| {
                if response.is_success() {
                    Ok(response)
                } else {
                    Err(ApiError::from_response(&response))
                }
            });
        outcome.map_err(|error| self.report(request.method, &request.url, error))
    }

    pub fn put<R: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&ContactSubmission>,
    ) -> Result<R, ApiError> {
        let body = self.encode(body.map(json_body))?;
        let request = self.build_request(HttpMethod::Put, path, body, None);
        self.send(request)
    }

    /// PATCH without a body; the backend reads its arguments from the query.
    pub fn patch<R: DeserializeOwned>(
        &self,
        path: &str,
        config: Option<&RequestConfig>,
    ) -> Result<R, ApiError> {
        let request = self.build_request(HttpMethod::Patch, path, None, config);
        self.send(request)
    }

    /// DELETE, optionally carrying a batch of ids in the body.
    pub fn delete<R: DeserializeOwned>(
        &self,
        path: &str,
        data: Option<&BatchIds>,
    ) -> Result<R, ApiError> {
        let body = self.encode(data.map(json_body))?;
        let request = self.build_request(HttpMethod::Delete, path, body, None);
        self.send(request)
    }

    /// Execute a prepared request and decode its payload.
    pub fn send<R: DeserializeOwned>(&self, request: HttpRequest) -> Result<R, ApiError> {
        tracing::debug!(method = request.method.as_str(), url = %request.url, "dispatch");
        self.execute(&request)
            .map_err(|error| self.report(request.method, &request.url, error))
    }

    /// Decode a successful response obtained outside [`Api::send`], such as
    /// the one returned by [`Api::post_with_progress`].
    ///
    /// Follows the same rules as `send`: an empty body reads as JSON `null`
    /// and a decode failure is logged before being returned.
    pub fn decode<R: DeserializeOwned>(
        &self,
        method: HttpMethod,
        path: &str,
        response: &HttpResponse,
    ) -> Result<R, ApiError> {
        parse_payload(&response.body).map_err(|error| self.report(method, &self.url(path), error))
    }

    fn execute<R: DeserializeOwned>(&self, request: &HttpRequest) -> Result<R, ApiError> {
        let response = self.transport.execute(request)?;
        if !response.is_success() {
            return Err(ApiError::from_response(&response));
        }
        parse_payload(&response.body)
    }

    fn encode(
        &self,
        body: Option<Result<RequestBody, ApiError>>,
    ) -> Result<Option<RequestBody>, ApiError> {
        body.transpose().map_err(|error| {
            tracing::warn!(%error, "request body could not be encoded");
            error
        })
    }

    /// Raise the notification for `error`, or log it when there is none.
    fn report(&self, method: HttpMethod, url: &str, error: ApiError) -> ApiError {
        match notification_for(&error) {
            Some(notification) => {
                if let Some(notifier) = &self.notifier {
                    notifier.notify(notification);
                }
            }
            None => {
                tracing::warn!(method = method.as_str(), url, %error, "request failed");
            }
        }
        error
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }
}

fn json_body<S: Serialize>(value: &S) -> Result<RequestBody, ApiError> {
    serde_json::to_string(value)
        .map(RequestBody::Json)
        .map_err(|e| ApiError::Serialization(e.to_string()))
}

/// An empty body (204 and friends) decodes as JSON `null`.
fn parse_payload<R: DeserializeOwned>(body: &str) -> Result<R, ApiError> {
    let body = if body.trim().is_empty() { "null" } else { body };
    serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))
}
