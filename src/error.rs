//!
//! # HTTP Error Handling
//!
//! This module defines `AppError`, the error type every handler and middleware
//! returns at the HTTP boundary. Domain errors (`AuthError` and validation
//! failures) are converted into it with `?`, and
//! `actix_web::error::ResponseError` turns each variant into a status code
//! with a JSON body of the form `{"error": "..."}`.
//!
//! Server-side failures are logged with their details and answered with a
//! generic message so internals never reach the client.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

use crate::auth::AuthError;

/// Represents all errors that can leave the application as an HTTP response.
#[derive(Debug)]
pub enum AppError {
    /// Authentication is missing or failed (HTTP 401).
    Unauthorized(String),
    /// Malformed request, e.g. a body that is not valid JSON (HTTP 400).
    BadRequest(String),
    /// The request collides with existing state, e.g. a taken email (HTTP 409).
    Conflict(String),
    /// Unexpected server-side failure (HTTP 500).
    InternalServerError(String),
    /// A storage backend failed (HTTP 500).
    DatabaseError(String),
    /// Input was well-formed but failed validation (HTTP 422).
    ValidationError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::InternalServerError(msg) | AppError::DatabaseError(msg) => {
                log::error!("{}: {}", self.status_code(), msg);
                "Internal server error"
            }
            AppError::Unauthorized(msg)
            | AppError::BadRequest(msg)
            | AppError::Conflict(msg)
            | AppError::ValidationError(msg) => msg.as_str(),
        };
        HttpResponse::build(self.status_code()).json(json!({ "error": message }))
    }
}

impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

/// Maps authentication failures onto their HTTP meaning.
///
/// Every credential failure becomes the same 401 so a caller cannot tell an
/// unknown email from a wrong password.
impl From<AuthError> for AppError {
    fn from(error: AuthError) -> AppError {
        match error {
            AuthError::DuplicateIdentifier(_) => {
                AppError::Conflict("Email already registered".into())
            }
            AuthError::InvalidCredentials => AppError::Unauthorized("Invalid credentials".into()),
            AuthError::UnknownSubject | AuthError::Token(_) => {
                AppError::Unauthorized("Authentication required".into())
            }
            AuthError::Store(e) => AppError::DatabaseError(e.to_string()),
            AuthError::Hashing(msg) => AppError::InternalServerError(msg),
        }
    }
}
