//! Gateway error types with HTTP status code mapping.
//!
//! [`GatewayError`] is the central error type for the gateway. Each variant
//! maps to a specific HTTP status code and structured JSON error response.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{SeatId, SectionId};

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2001,
///     "message": "seat unavailable: section 3, seat 17",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges on [`GatewayError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category     | HTTP Status                 |
/// |-----------|--------------|-----------------------------|
/// | 1000–1999 | Validation   | 400 Bad Request / 401       |
/// | 2000–2999 | Inventory    | 409 Conflict                |
/// | 3000–3999 | Server       | 500 Internal Server Error   |
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The caller did not present a usable identity.
    #[error("missing or invalid user identity")]
    MissingIdentity,

    /// The seat is actively held, or has no price in the event's layout.
    #[error("seat unavailable: section {section_id}, seat {seat_id}")]
    SeatUnavailable {
        /// Section of the first seat that could not be claimed.
        section_id: SectionId,
        /// The seat that could not be claimed.
        seat_id: SeatId,
    },

    /// Storage failure outside a reservation transaction.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Storage failure inside a reservation transaction; every write of
    /// the request was rolled back.
    #[error("transaction aborted: {0}")]
    TransactionAborted(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::MissingIdentity => 1002,
            Self::SeatUnavailable { .. } => 2001,
            Self::PersistenceError(_) => 3001,
            Self::TransactionAborted(_) => 3002,
            Self::Internal(_) => 3000,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::MissingIdentity => StatusCode::UNAUTHORIZED,
            Self::SeatUnavailable { .. } => StatusCode::CONFLICT,
            Self::PersistenceError(_) | Self::TransactionAborted(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Reclassifies a failure raised while a reservation transaction was
    /// open. Storage failures become [`Self::TransactionAborted`]; request
    /// and inventory failures pass through unchanged.
    #[must_use]
    pub fn into_aborted(self) -> Self {
        match self {
            Self::PersistenceError(msg) => Self::TransactionAborted(msg),
            other => other,
        }
    }
}

impl From<sqlx::Error> for GatewayError {
    fn from(err: sqlx::Error) -> Self {
        Self::PersistenceError(err.to_string())
    }
}

impl From<JsonRejection> for GatewayError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidRequest(rejection.body_text())
    }
}

impl From<PathRejection> for GatewayError {
    fn from(rejection: PathRejection) -> Self {
        Self::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
