//! Registration, login and bearer-token authentication.
//!
//! Request flow: `RequestAuthenticator` decodes the bearer token and attaches
//! an `AuthenticatedContext`, then `RoutePolicy` turns away unauthenticated
//! requests to non-public paths. Handlers read the context through its
//! extractor.

pub mod extractors;
pub mod middleware;
pub mod password;
pub mod policy;
pub mod service;
pub mod token;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::store::StoreError;

pub use extractors::{AuthenticatedContext, AuthenticatedUser};
pub use middleware::{AuthOutcome, RequestAuthenticator, UnauthenticatedReason};
pub use password::PasswordHasher;
pub use policy::{AccessPolicy, RoutePolicy};
pub use service::{AuthService, IssuedToken};
pub use token::{Claims, TokenCodec, TokenError};

/// bcrypt ignores every byte past this point.
pub const MAX_PASSWORD_BYTES: usize = 72;

lazy_static! {
    // Display names: letters, digits, spaces, dots, underscores, hyphens
    static ref NAME_REGEX: regex::Regex = regex::Regex::new(r"^[\p{L}\p{N} ._-]+$").unwrap();
}

/// Authentication failures.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The email is already registered.
    #[error("identifier already registered: {0}")]
    DuplicateIdentifier(String),

    /// Unknown identifier or wrong password; the two are never told apart.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// A valid token names a user that no longer exists.
    #[error("token subject does not match any user")]
    UnknownSubject,

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Store(StoreError),

    /// bcrypt failed to hash or verify.
    #[error("{0}")]
    Hashing(String),
}

impl From<StoreError> for AuthError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Duplicate(identifier) => AuthError::DuplicateIdentifier(identifier),
            other => AuthError::Store(other),
        }
    }
}

/// Represents the payload for a user login request.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// User's email address.
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Represents the payload for a new user registration request.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address for the new account; also its login identifier.
    #[validate(email)]
    pub email: String,
    /// Password for the new account.
    /// bcrypt only reads the first 72 bytes, so longer input is refused.
    #[validate(length(min = 1), custom = "validate_password_bytes")]
    pub password: String,
    /// Optional display name.
    #[validate(
        length(min = 1, max = 50),
        regex(
            path = "NAME_REGEX",
            message = "Name may contain letters, digits, spaces, dots, underscores or hyphens"
        )
    )]
    #[serde(default)]
    pub name: Option<String>,
}

/// Rejects passwords whose UTF-8 encoding bcrypt would truncate.
fn validate_password_bytes(password: &str) -> Result<(), ValidationError> {
    if password.len() > MAX_PASSWORD_BYTES {
        let mut error = ValidationError::new("password_too_long");
        error.message = Some("Password must be at most 72 bytes".into());
        return Err(error);
    }
    Ok(())
}

/// Response returned after a successful registration.
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user_id: Uuid,
    pub email: String,
}

/// Response returned after a successful login.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// The JWT to present as `Authorization: Bearer <token>`.
    pub token: String,
    pub token_type: String,
    /// Seconds until the token expires.
    pub expires_in: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_login_request_validation() {
        let valid_login = LoginRequest {
            email: "test@example.com".to_string(),
            password: "pw123".to_string(),
        };
        assert!(valid_login.validate().is_ok());

        let invalid_email_login = LoginRequest {
            email: "testexample.com".to_string(),
            password: "password123".to_string(),
        };
        assert!(invalid_email_login.validate().is_err());

        let empty_password_login = LoginRequest {
            email: "test@example.com".to_string(),
            password: String::new(),
        };
        assert!(empty_password_login.validate().is_err());
    }

    #[test]
    fn test_register_request_validation() {
        let valid_register = RegisterRequest {
            email: "alice@example.com".to_string(),
            password: "pw123".to_string(),
            name: Some("Alice Liddell".to_string()),
        };
        assert!(valid_register.validate().is_ok());

        let nameless = RegisterRequest {
            email: "alice@example.com".to_string(),
            password: "pw123".to_string(),
            name: None,
        };
        assert!(nameless.validate().is_ok());

        let invalid_name = RegisterRequest {
            email: "test@example.com".to_string(),
            password: "password123".to_string(),
            name: Some("<script>".to_string()),
        };
        assert!(invalid_name.validate().is_err());

        let long_password = RegisterRequest {
            email: "test@example.com".to_string(),
            password: "p".repeat(73),
            name: None,
        };
        assert!(long_password.validate().is_err());
    }

    #[test]
    fn test_password_limit_counts_bytes() {
        let register = |password: String| RegisterRequest {
            email: "test@example.com".to_string(),
            password,
            name: None,
        };

        // 36 two-byte characters fill the limit exactly.
        assert!(register("é".repeat(36)).validate().is_ok());
        assert!(register("p".repeat(72)).validate().is_ok());

        let errors = register(format!("{}A", "é".repeat(36)))
            .validate()
            .unwrap_err();
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn test_store_duplicate_becomes_duplicate_identifier() {
        let error: AuthError = StoreError::Duplicate("a@example.com".into()).into();
        assert!(matches!(error, AuthError::DuplicateIdentifier(ref id) if id == "a@example.com"));

        let error: AuthError = StoreError::Database("down".into()).into();
        assert!(matches!(error, AuthError::Store(StoreError::Database(_))));
    }
}
