//! Gateway error types with HTTP status code mapping.
//!
//! [`RentalError`] is the central error type for the gateway. Each variant
//! maps to a specific HTTP status code and structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::AppointmentStatus;
use crate::persistence::StoreError;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2101,
///     "message": "invalid transition: cancelled -> confirmed",
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
    /// Numeric error code (see code ranges on [`RentalError`]).
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
/// | Range     | Category            | HTTP Status               |
/// |-----------|---------------------|---------------------------|
/// | 1000–1999 | Validation          | 400 Bad Request           |
/// | 2000–2099 | Not Found           | 404 Not Found             |
/// | 2100–2199 | Lifecycle           | 409 Conflict              |
/// | 2200–2299 | Access              | 401 / 403                 |
/// | 3000–3999 | Server / Dependency | 500 / 503                 |
#[derive(Debug, thiserror::Error)]
pub enum RentalError {
    /// A required field is missing or malformed.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A referenced record does not exist.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Kind of record (`"appointment"`, `"room"`).
        kind: &'static str,
        /// The identifier that did not resolve.
        id: String,
    },

    /// The requested edge is not in the transition table for the current status.
    #[error("invalid transition: {from} -> {to}")]
    InvalidTransition {
        /// Status the record was in.
        from: AppointmentStatus,
        /// Status that was requested.
        to: AppointmentStatus,
    },

    /// The actor's role does not permit the requested operation.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// No caller identity was supplied.
    #[error("authentication required")]
    Unauthenticated,

    /// The storage or identity collaborator failed or was unreachable.
    #[error("dependency failure: {0}")]
    Dependency(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RentalError {
    /// Shorthand for a missing appointment.
    #[must_use]
    pub fn appointment_not_found(id: impl ToString) -> Self {
        Self::NotFound {
            kind: "appointment",
            id: id.to_string(),
        }
    }

    /// Shorthand for a missing room.
    #[must_use]
    pub fn room_not_found(id: impl ToString) -> Self {
        Self::NotFound {
            kind: "room",
            id: id.to_string(),
        }
    }

    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::Validation(_) => 1001,
            Self::NotFound { .. } => 2001,
            Self::InvalidTransition { .. } => 2101,
            Self::Forbidden(_) => 2201,
            Self::Unauthenticated => 2202,
            Self::Dependency(_) => 3001,
            Self::Internal(_) => 3000,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::InvalidTransition { .. } => StatusCode::CONFLICT,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Dependency(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether retrying the identical request could succeed.
    ///
    /// Only dependency failures qualify. Callers must still not blindly
    /// retry a booking creation, which is not deduplicated.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Dependency(_))
    }
}

impl From<StoreError> for RentalError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { kind, id } => Self::NotFound { kind, id },
            conflict @ StoreError::StatusConflict { .. } => Self::Internal(conflict.to_string()),
            StoreError::Backend(msg) => Self::Dependency(msg),
        }
    }
}

impl IntoResponse for RentalError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
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

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn categories_have_distinct_codes_and_messages() {
        let errors = [
            RentalError::Validation("depositAmount is required".to_string()),
            RentalError::appointment_not_found("a1"),
            RentalError::InvalidTransition {
                from: AppointmentStatus::Cancelled,
                to: AppointmentStatus::Confirmed,
            },
            RentalError::Forbidden("only the host may approve".to_string()),
            RentalError::Unauthenticated,
            RentalError::Dependency("store offline".to_string()),
            RentalError::Internal("boom".to_string()),
        ];
        let codes: std::collections::HashSet<u32> =
            errors.iter().map(RentalError::error_code).collect();
        assert_eq!(codes.len(), errors.len());
        let messages: std::collections::HashSet<String> =
            errors.iter().map(ToString::to_string).collect();
        assert_eq!(messages.len(), errors.len());
    }

    #[test]
    fn invalid_transition_and_forbidden_map_differently() {
        let invalid = RentalError::InvalidTransition {
            from: AppointmentStatus::Contracted,
            to: AppointmentStatus::Cancelled,
        };
        let forbidden = RentalError::Forbidden("tenant cannot reject".to_string());
        assert_eq!(invalid.status_code(), StatusCode::CONFLICT);
        assert_eq!(forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            invalid.to_string(),
            "invalid transition: contracted -> cancelled"
        );
    }

    #[test]
    fn unhandled_status_conflict_is_internal() {
        let err = RentalError::from(StoreError::StatusConflict {
            expected: AppointmentStatus::Pending,
            actual: AppointmentStatus::Confirmed,
        });
        let RentalError::Internal(message) = &err else {
            panic!("expected Internal, got {err:?}");
        };
        assert!(message.contains("expected pending, found confirmed"));
        assert_eq!(err.error_code(), 3000);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn only_dependency_is_retryable() {
        assert!(RentalError::Dependency("timeout".to_string()).is_retryable());
        assert!(!RentalError::Validation("x".to_string()).is_retryable());
        assert!(!RentalError::Unauthenticated.is_retryable());
    }

    #[test]
    fn store_backend_becomes_dependency() {
        let err = RentalError::from(StoreError::Backend("connection reset".to_string()));
        let RentalError::Dependency(msg) = err else {
            panic!("expected dependency error");
        };
        assert_eq!(msg, "connection reset");
    }
}
