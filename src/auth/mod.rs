pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppError;

// Re-export necessary items
pub use extractors::{AdminUser, AuthenticatedUser};
pub use middleware::AuthMiddleware;
pub use password::{CredentialService, PasswordCheck};
pub use token::{RefreshClaims, SessionClaims, TokenError, TokenKind, TokenPair, TokenService};

lazy_static! {
    // Usernames: letters, digits, underscores, dots and hyphens. Intentionally stricter than a
    // bare 2..100 length rule: "alice smith" is refused.
    static ref USERNAME_REGEX: regex::Regex = regex::Regex::new(r"^[A-Za-z0-9_.-]+$").unwrap();
}

/// Payload of a registration request.
///
/// Every field is optional on the wire so that a missing field is reported as a `required`
/// validation error instead of a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SignupRequest {
    /// Display name, 2 to 100 characters.
    #[validate(required, length(min = 2, max = 100))]
    pub name: Option<String>,
    /// 2 to 100 characters from `[A-Za-z0-9_.-]`.
    #[validate(
        required,
        length(min = 2, max = 100),
        regex(
            path = "USERNAME_REGEX",
            message = "Username may only contain letters, digits, '_', '.' or '-'"
        )
    )]
    pub username: Option<String>,
    /// At least 6 characters.
    #[validate(required, length(min = 6))]
    pub password: Option<String>,
    #[validate(required, email)]
    pub email: Option<String>,
}

/// The validated fields of a `SignupRequest`, plaintext password included.
#[derive(Debug, Clone)]
pub struct SignupFields {
    pub name: String,
    pub username: String,
    pub password: String,
    pub email: String,
}

impl SignupRequest {
    /// Validates every field and unwraps them.
    pub fn into_fields(self) -> Result<SignupFields, AppError> {
        self.validate()?;
        let (Some(name), Some(username), Some(password), Some(email)) =
            (self.name, self.username, self.password, self.email)
        else {
            return Err(AppError::Validation("missing required field".into()));
        };
        Ok(SignupFields {
            name,
            username,
            password,
            email,
        })
    }
}

/// Username and plaintext password submitted at login. Never persisted.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Body returned by a successful login.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub refresh_token: String,
}

/// A bare `{"message": ...}` body.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
