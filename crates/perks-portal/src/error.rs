//! Error responses for the portal API.
//!
//! [`PortalError`] wraps the service error taxonomy plus the request
//! parsing failures that happen before a service is called, and renders
//! all of them as `{ "error", "kind", "status" }` JSON.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use perks_booking::{ErrorKind, ServiceError, StoreError};

/// Errors that can occur in the portal API layer.
#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    /// A service operation failed.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// A path segment was not a UUID.
    #[error("invalid UUID: {0}")]
    InvalidUuid(String),

    /// The request body was missing or malformed.
    #[error("invalid request body: {0}")]
    InvalidBody(String),
}

impl From<StoreError> for PortalError {
    fn from(err: StoreError) -> Self {
        Self::Service(err.into())
    }
}

impl From<JsonRejection> for PortalError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidBody(rejection.body_text())
    }
}

/// HTTP status for an error kind.
pub const fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
        ErrorKind::ActorDisabled | ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::ResourceInactive | ErrorKind::DatesUnavailable => StatusCode::CONFLICT,
        ErrorKind::PricingNotConfigured | ErrorKind::InsufficientBalance => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ErrorKind::PersistenceFailure => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl PortalError {
    /// The error kind reported to the client.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Service(err) => err.kind(),
            Self::InvalidUuid(_) | Self::InvalidBody(_) => ErrorKind::InvalidInput,
        }
    }
}

impl IntoResponse for PortalError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let status = status_for(kind);

        // Storage details stay in the log.
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
            "internal storage error".to_owned()
        } else {
            self.to_string()
        };

        let body = serde_json::json!({
            "error": message,
            "kind": kind,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_statuses() {
        assert_eq!(status_for(ErrorKind::Unauthenticated), StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(ErrorKind::ActorDisabled), StatusCode::FORBIDDEN);
        assert_eq!(status_for(ErrorKind::DatesUnavailable), StatusCode::CONFLICT);
        assert_eq!(
            status_for(ErrorKind::InsufficientBalance),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_for(ErrorKind::PersistenceFailure),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn parse_failures_are_invalid_input() {
        assert_eq!(
            PortalError::InvalidUuid("abc".to_owned()).kind(),
            ErrorKind::InvalidInput
        );
    }

    #[test]
    fn backend_details_are_not_exposed() {
        let err = PortalError::from(StoreError::Backend("password=hunter2".to_owned()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
