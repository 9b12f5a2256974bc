use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Rejections shaped like the real backend's: a `detail` string for request
/// errors, a `detail` array for field validation.
#[derive(Error, Debug)]
pub enum MockError {
    #[error("Требуется авторизация")]
    Unauthorized,

    #[error("Требуются права администратора")]
    Forbidden,

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    BadRequest(String),

    #[error("{msg}")]
    Validation {
        field: &'static str,
        msg: String,
        input: String,
    },
}

impl IntoResponse for MockError {
    fn into_response(self) -> Response {
        let status = match self {
            MockError::Unauthorized => StatusCode::UNAUTHORIZED,
            MockError::Forbidden => StatusCode::FORBIDDEN,
            MockError::NotFound(_) => StatusCode::NOT_FOUND,
            MockError::BadRequest(_) => StatusCode::BAD_REQUEST,
            MockError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        };

        let body = match &self {
            MockError::Validation { field, msg, input } => json!({
                "detail": [{
                    "type": "value_error",
                    "loc": ["body", field],
                    "msg": msg,
                    "input": input,
                    "ctx": { "reason": msg },
                }]
            }),
            other => json!({ "detail": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
