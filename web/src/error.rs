//! HTTP error responses.
//!
//! Every failure is rendered as `{error, code, status}`. Infrastructure errors
//! (configuration, authentication, persistence) are logged in full and shown
//! to the client as a generic message unless the server is configured to
//! expose them.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use regaccess_core::RegAccessError;
use serde::Serialize;
use std::fmt;

const GENERIC_MESSAGE: &str = "The update could not be completed";

/// Application error type for web handlers.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    code: String,
    /// Internal error (for logging, not exposed to client)
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            code: code.into(),
            source: None,
        }
    }

    /// Attaches an error that is logged but never sent to the client
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// Overrides the status code
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Maps a domain error, hiding infrastructure details unless `expose_internal`.
    #[must_use]
    pub fn from_domain(error: RegAccessError, expose_internal: bool) -> Self {
        let status = match &error {
            RegAccessError::NotFound { .. } => StatusCode::NOT_FOUND,
            RegAccessError::ImmutableField { .. }
            | RegAccessError::AlreadyMember { .. }
            | RegAccessError::AlreadyRedeemed => StatusCode::CONFLICT,
            RegAccessError::InvalidIntent(_) => StatusCode::UNPROCESSABLE_ENTITY,
            RegAccessError::Configuration { .. }
            | RegAccessError::Authentication(_)
            | RegAccessError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if error.is_internal() && !expose_internal {
            return Self::new(status, GENERIC_MESSAGE, error.code())
                .with_source(anyhow::Error::new(error));
        }
        Self::new(status, error.to_string(), error.code())
    }

    /// A 400 for malformed requests
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message, "BAD_REQUEST")
    }

    /// A 404 for unknown path parameters
    #[must_use]
    pub fn not_found(resource: impl fmt::Display, id: impl fmt::Display) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            format!("{resource} {id} not found"),
            "NOT_FOUND",
        )
    }

    /// A 503 for missing dependencies
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message, "SERVICE_UNAVAILABLE")
    }

    /// HTTP status of the response
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable code
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    code: String,
    status: u16,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            match &self.source {
                Some(source) => tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    error = %source,
                    "Request failed"
                ),
                None => tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    "Request failed"
                ),
            }
        }

        let body = ErrorResponse {
            error: self.message,
            code: self.code,
            status: self.status.as_u16(),
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "An internal error occurred",
            "INTERNAL_SERVER_ERROR",
        )
        .with_source(err)
    }
}
