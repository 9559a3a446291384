//! Error-code to HTTP mapping shared by all routers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::domain::foundation::ErrorCode;

/// Standard error body: a stable machine-readable code plus a
/// human-readable message.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "VALIDATION_FAILED".to_string(),
            message: message.into(),
        }
    }
}

/// Maps a domain error code to its HTTP status.
pub fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::ValidationFailed
        | ErrorCode::EmptyField
        | ErrorCode::OutOfRange
        | ErrorCode::InvalidFormat
        | ErrorCode::NotActive
        | ErrorCode::NotInCouple
        | ErrorCode::InvalidStateTransition => StatusCode::BAD_REQUEST,

        ErrorCode::Unauthorized | ErrorCode::Forbidden => StatusCode::FORBIDDEN,

        ErrorCode::CoupleNotFound
        | ErrorCode::AgreementNotFound
        | ErrorCode::SuggestionNotFound
        | ErrorCode::ProfileNotFound => StatusCode::NOT_FOUND,

        ErrorCode::AlreadyPaired
        | ErrorCode::AlreadyResolved
        | ErrorCode::InvalidOrExpiredCode
        | ErrorCode::StaleTransition => StatusCode::CONFLICT,

        ErrorCode::DatabaseError | ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Builds the error response for a domain error code and message.
pub fn error_response(code: ErrorCode, message: impl Into<String>) -> Response {
    (status_for(code), Json(ErrorResponse::new(code, message))).into_response()
}

/// 400 for malformed request input (bad UUIDs, unknown enum values).
pub fn invalid_input(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::bad_request(message)),
    )
        .into_response()
}
