use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use crate::services::TicketingError;
use crate::store::StoreError;
use crate::utils::response::error as error_response;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Unavailable: {0}")]
    Unavailable(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Too early: {0}")]
    TooEarly(String),

    #[error("Too late: {0}")]
    TooLate(String),

    #[error("Database error")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Internal server error")]
    InternalServerError(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::AuthError(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unavailable(_) => StatusCode::CONFLICT,
            AppError::Duplicate(_) => StatusCode::CONFLICT,
            AppError::InvalidState(_) => StatusCode::CONFLICT,
            AppError::TooEarly(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::TooLate(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::AuthError(_) => "AUTH_ERROR",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Unavailable(_) => "EVENT_UNAVAILABLE",
            AppError::Duplicate(_) => "DUPLICATE_TICKET",
            AppError::InvalidState(_) => "INVALID_STATE",
            AppError::TooEarly(_) => "TOO_EARLY",
            AppError::TooLate(_) => "TOO_LATE",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    fn log(&self) {
        match self {
            AppError::ValidationError(msg)
            | AppError::AuthError(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Unavailable(msg)
            | AppError::Duplicate(msg)
            | AppError::InvalidState(msg)
            | AppError::TooEarly(msg)
            | AppError::TooLate(msg)
            | AppError::InternalServerError(msg) => {
                error!(error = ?self, message = %msg, "Application error");
            }
            AppError::DatabaseError(e) => {
                error!(error = ?e, "Database error");
            }
        }
    }
}

impl From<TicketingError> for AppError {
    fn from(err: TicketingError) -> Self {
        let message = err.to_string();
        match err {
            TicketingError::NotFound(_) => AppError::NotFound(message),
            TicketingError::Unavailable(_) => AppError::Unavailable(message),
            TicketingError::Duplicate => AppError::Duplicate(message),
            TicketingError::InvalidState(_) => AppError::InvalidState(message),
            TicketingError::TooEarly(_) => AppError::TooEarly(message),
            TicketingError::TooLate(_) => AppError::TooLate(message),
            TicketingError::Forbidden(_) => AppError::Forbidden(message),
            TicketingError::Validation(_) => AppError::ValidationError(message),
            TicketingError::Store(StoreError::Database(e)) => AppError::DatabaseError(e),
            // A conflict that escapes the service layer means code
            // regeneration gave up; nothing the client can fix.
            TicketingError::Store(StoreError::Conflict(_)) => AppError::InternalServerError(message),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        // Log internal details
        self.log();

        // Only expose high-level message to the client
        let public_message = match &self {
            AppError::ValidationError(msg)
            | AppError::AuthError(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Unavailable(msg)
            | AppError::Duplicate(msg)
            | AppError::InvalidState(msg)
            | AppError::TooEarly(msg)
            | AppError::TooLate(msg)
            | AppError::InternalServerError(msg) => msg.clone(),
            AppError::DatabaseError(_) => "A database error occurred".to_string(),
        };

        // Do not expose internal details in the API response
        let details = None;

        error_response(code, public_message, details, status)
    }
}
