//! Error types for the contacts API client.
//!
//! # Design
//! Every failed call ends up as one `ApiError`, built in exactly one place:
//! [`ApiError::from_response`] for non-2xx responses and `From` conversions
//! for transport and codec failures. The variants follow what the user gets
//! to see: `Backend` and `Server` carry a message worth surfacing, the rest
//! are only logged.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::http::HttpResponse;
use crate::notify::SERVER_ERROR_MESSAGE;

/// Failure body returned by the backend on validation and request errors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackendError {
    pub detail: Vec<ErrorDetail>,
}

/// One entry of a [`BackendError`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ErrorDetail {
    #[serde(rename = "type")]
    pub kind: String,
    pub loc: Vec<String>,
    pub msg: String,
    pub input: Value,
    pub ctx: Option<ErrorContext>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ErrorContext {
    pub reason: Option<String>,
}

impl BackendError {
    /// Parse a failure body; `None` unless it has a `detail` array.
    ///
    /// Entries are read field by field: a value of the wrong type is left
    /// empty instead of rejecting the whole body.
    pub fn parse(body: &str) -> Option<Self> {
        let value: Value = serde_json::from_str(body).ok()?;
        let entries = value.get("detail")?.as_array()?;
        Some(Self {
            detail: entries.iter().map(ErrorDetail::from_value).collect(),
        })
    }

    /// The message of the first detail entry, if it has one.
    pub fn first_message(&self) -> Option<&str> {
        self.detail
            .first()
            .map(|entry| entry.msg.as_str())
            .filter(|msg| !msg.is_empty())
    }
}

impl ErrorDetail {
    fn from_value(entry: &Value) -> Self {
        let text = |key: &str| {
            entry
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        Self {
            kind: text("type"),
            loc: entry
                .get("loc")
                .and_then(Value::as_array)
                .map(|parts| parts.iter().map(loc_part).collect())
                .unwrap_or_default(),
            msg: text("msg"),
            input: entry.get("input").cloned().unwrap_or(Value::Null),
            ctx: entry
                .get("ctx")
                .filter(|ctx| ctx.is_object())
                .map(|ctx| ErrorContext {
                    reason: ctx.get("reason").and_then(Value::as_str).map(str::to_string),
                }),
        }
    }
}

/// `loc` mixes field names and list indices on the wire.
fn loc_part(part: &Value) -> String {
    match part {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// The underlying HTTP capability failed before a response was received.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("transport failed: {0}")]
pub struct TransportError(pub String);

/// Errors returned by `Api` calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Structured backend error; `message` is the first detail entry's `msg`.
    #[error("{message}")]
    Backend {
        status: u16,
        message: String,
        detail: BackendError,
    },

    /// HTTP 500 whose body carried no usable detail.
    #[error("internal server error: {body}")]
    Server { body: String },

    /// HTTP 404 without a structured detail.
    #[error("resource not found")]
    NotFound,

    /// Any other non-2xx status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The request payload could not be serialized.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),
}

impl ApiError {
    /// Classify a non-2xx response.
    pub fn from_response(response: &HttpResponse) -> Self {
        if let Some(detail) = BackendError::parse(&response.body) {
            if let Some(message) = detail.first_message() {
                return ApiError::Backend {
                    status: response.status,
                    message: message.to_string(),
                    detail,
                };
            }
        }
        match response.status {
            500 => ApiError::Server {
                body: response.body.clone(),
            },
            404 => ApiError::NotFound,
            status => ApiError::Http {
                status,
                body: response.body.clone(),
            },
        }
    }

    /// Text a user should see for this failure; `None` for the silent kinds.
    pub fn user_message(&self) -> Option<&str> {
        match self {
            ApiError::Backend { message, .. } => Some(message.as_str()),
            ApiError::Server { .. } => Some(SERVER_ERROR_MESSAGE),
            _ => None,
        }
    }

    /// HTTP status of the failed response, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Backend { status, .. } | ApiError::Http { status, .. } => Some(*status),
            ApiError::Server { .. } => Some(500),
            ApiError::NotFound => Some(404),
            _ => None,
        }
    }
}
