use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::auth::AuthError;
use crate::error::CoreError;

/// Error type for HTTP handlers. Renders as `{"error": CODE, "message": text}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Request body that could not be parsed.
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

const INTERNAL_MESSAGE: &str = "an internal error occurred";

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::Core(err) => core_parts(err),
            ApiError::Auth(err) => match err {
                AuthError::Core(inner) => core_parts(inner),
                AuthError::InvalidCredentials => (
                    StatusCode::UNAUTHORIZED,
                    "INVALID_CREDENTIALS",
                    err.to_string(),
                ),
                AuthError::MissingToken
                | AuthError::InvalidToken(_)
                | AuthError::UnknownSubject(_) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", err.to_string())
                }
                AuthError::Signing(_) | AuthError::Hashing(_) => {
                    tracing::error!(error = %err, "auth failure");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL",
                        INTERNAL_MESSAGE.to_string(),
                    )
                }
            },
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "VALIDATION", msg.clone()),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    INTERNAL_MESSAGE.to_string(),
                )
            }
        };

        let body = json!({
            "error": code,
            "message": message,
        });

        (status, Json(body)).into_response()
    }
}

fn core_parts(err: &CoreError) -> (StatusCode, &'static str, String) {
    let status = match err {
        CoreError::Validation(_) => StatusCode::BAD_REQUEST,
        CoreError::NotFound { .. } => StatusCode::NOT_FOUND,
        CoreError::Conflict { .. } | CoreError::UsernameTaken(_) => StatusCode::CONFLICT,
        CoreError::Forbidden { .. } => StatusCode::FORBIDDEN,
        CoreError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        CoreError::Identifier(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    match err {
        CoreError::StoreUnavailable(_) => {
            tracing::error!(error = %err, "store failure");
            (status, err.code(), "store temporarily unavailable".to_string())
        }
        CoreError::Identifier(_) => {
            tracing::error!(error = %err, "id generation failure");
            (status, err.code(), INTERNAL_MESSAGE.to_string())
        }
        _ => (status, err.code(), err.to_string()),
    }
}
