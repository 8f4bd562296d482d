// crates/pulse-server/src/error.rs
// ============================================================================
// Module: API Errors
// Description: HTTP error surface for the dashboard endpoints.
// Purpose: Map domain failures to status codes and JSON error bodies.
// Dependencies: pulse-core, axum
// ============================================================================

//! ## Overview
//! Every handler failure funnels through [`ApiError`], which renders as a
//! JSON body with a stable `error` message and the matching status code.
//! Invariants:
//! - Validation and parse failures are 400; they name the offending input.
//! - Store failures are 500 and never leak driver internals to the client.

// ============================================================================
// SECTION: Imports
// ============================================================================

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use pulse_core::CheckInError;
use pulse_core::SeriesError;
use pulse_core::StoreError;
use pulse_core::ValidationError;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Error Type
// ============================================================================

/// Errors surfaced by the dashboard HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A request parameter or body field failed validation.
    #[error("{0}")]
    Validation(ValidationError),
    /// A request parameter could not be parsed.
    #[error("{0}")]
    BadRequest(String),
    /// The request lacks a valid admin credential.
    #[error("unauthorized")]
    Unauthorized,
    /// The referenced resource does not exist.
    #[error("{0}")]
    NotFound(String),
    /// The durable store failed.
    #[error("store failure")]
    Store(#[from] StoreError),
    /// The response could not be serialized.
    #[error("serialization failed")]
    Serialization,
}

impl ApiError {
    /// Returns the HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Store(_) | Self::Serialization => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CheckInError> for ApiError {
    fn from(error: CheckInError) -> Self {
        match error {
            CheckInError::Validation(inner) => Self::Validation(inner),
            CheckInError::Store(inner) => Self::Store(inner),
        }
    }
}

impl From<SeriesError> for ApiError {
    fn from(error: SeriesError) -> Self {
        match error {
            SeriesError::UnknownMetric(key) => Self::NotFound(format!("unknown metric: {key}")),
            SeriesError::Store(inner) => Self::Store(inner),
        }
    }
}

// ============================================================================
// SECTION: Response Rendering
// ============================================================================

/// JSON error body returned to clients.
#[derive(Debug, Serialize)]
struct ErrorBody {
    /// Human-readable error message.
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
