//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! Every layer (stores, usecases, the token and credential services, HTTP handlers) reports
//! failures through it, so a single `?` chain carries a store conflict or an expired token
//! all the way out to the HTTP response.
//!
//! `AppError` implements `actix_web::error::ResponseError` to convert application errors into
//! HTTP responses with a JSON `{"message": ...}` body. `From` implementations exist for
//! `sqlx::Error`, `validator::ValidationErrors`, `bcrypt::BcryptError` and
//! `tokio::task::JoinError`.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

/// Represents all possible errors that can occur within the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// A signup candidate or task payload failed field validation (HTTP 400).
    Validation(String),
    /// A username or email is already taken (HTTP 400). The message names the field.
    Conflict(String),
    /// No user or task matches the given key (HTTP 404).
    NotFound(String),
    /// Wrong password, incomplete profile, or a missing/invalid/expired token (HTTP 401).
    Unauthorized(String),
    /// The caller is authenticated but its role does not allow the operation (HTTP 403).
    Forbidden(String),
    /// The request deadline elapsed before the operation completed (HTTP 504).
    Timeout(String),
    /// Represents an unexpected server-side error (HTTP 500).
    InternalServerError(String),
    /// Represents an error originating from database operations (HTTP 500).
    /// Wraps errors from the `sqlx` crate.
    DatabaseError(String),
}

impl AppError {
    /// The human-readable reason without the category prefix used by `Display`.
    pub fn message(&self) -> &str {
        match self {
            AppError::Validation(msg)
            | AppError::Conflict(msg)
            | AppError::NotFound(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::Timeout(msg)
            | AppError::InternalServerError(msg)
            | AppError::DatabaseError(msg) => msg,
        }
    }

    /// True for failures of the service itself rather than of the caller's input.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            AppError::InternalServerError(_) | AppError::DatabaseError(_) | AppError::Timeout(_)
        )
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Validation(msg) => write!(f, "Validation Error: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::Timeout(msg) => write!(f, "Timeout: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

/// Converts `AppError` variants into `HttpResponse` objects.
///
/// Internal failures are logged here, once, on their way out.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Conflict(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.is_internal() {
            log::error!("{}", self);
        }
        HttpResponse::build(self.status_code()).json(json!({
            "message": self.message()
        }))
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `RowNotFound` becomes `NotFound`, a unique violation (SQLSTATE 23505) becomes a `Conflict`
/// naming the column behind the violated constraint, and a pool timeout becomes `Timeout`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match &error {
            sqlx::Error::RowNotFound => AppError::NotFound("record not found".into()),
            sqlx::Error::PoolTimedOut => AppError::Timeout("database pool timed out".into()),
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
                let field = match db_err.constraint() {
                    Some(c) if c.contains("username") => "username",
                    Some(c) if c.contains("email") => "email",
                    _ => "record",
                };
                AppError::Conflict(format!("this {} already exists", field))
            }
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

/// Converts `validator::ValidationErrors` into `AppError::Validation`.
///
/// The detailed validation messages are preserved.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::Validation(error.to_string())
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(format!("password hashing failed: {}", error))
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(error: tokio::task::JoinError) -> AppError {
        AppError::InternalServerError(format!("background task failed: {}", error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_responses() {
        let error = AppError::Unauthorized("Invalid token".into());
        assert_eq!(error.error_response().status(), 401);

        let error = AppError::Validation("Invalid input".into());
        assert_eq!(error.error_response().status(), 400);

        let error = AppError::Conflict("this username already exists".into());
        assert_eq!(error.error_response().status(), 400);

        let error = AppError::NotFound("user not found".into());
        assert_eq!(error.error_response().status(), 404);

        let error = AppError::Forbidden("admin role required".into());
        assert_eq!(error.error_response().status(), 403);

        let error = AppError::Timeout("deadline exceeded".into());
        assert_eq!(error.error_response().status(), 504);

        let error = AppError::InternalServerError("Server error".into());
        assert_eq!(error.error_response().status(), 500);
    }

    #[test]
    fn test_message_strips_category() {
        let error = AppError::Unauthorized("incorrect password".into());
        assert_eq!(error.message(), "incorrect password");
        assert_eq!(error.to_string(), "Unauthorized: incorrect password");
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let error: AppError = sqlx::Error::RowNotFound.into();
        assert!(matches!(error, AppError::NotFound(_)));
    }
}
