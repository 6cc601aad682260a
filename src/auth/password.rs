use crate::error::AppError;
use bcrypt::{hash, verify};

/// Reason reported when a password does not match its stored hash.
pub const INCORRECT_PASSWORD: &str = "incorrect password";

/// Outcome of checking a plaintext password against a stored hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordCheck {
    Matched,
    /// Carries a human-readable reason for the caller.
    Mismatch(String),
}

/// One-way password hashing with bcrypt.
///
/// The cost is fixed at construction. Each hash embeds its own random salt, so hashing the
/// same plaintext twice yields different strings that both verify.
#[derive(Debug, Clone, Copy)]
pub struct CredentialService {
    cost: u32,
}

impl CredentialService {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        hash(password, self.cost)
            .map_err(|e| AppError::InternalServerError(format!("Failed to hash password: {}", e)))
    }

    /// Compares in constant time. Only a malformed `hashed_password` is an error.
    pub fn verify(&self, password: &str, hashed_password: &str) -> Result<PasswordCheck, AppError> {
        let matched = verify(password, hashed_password).map_err(|e| {
            AppError::InternalServerError(format!("Failed to verify password: {}", e))
        })?;
        if matched {
            Ok(PasswordCheck::Matched)
        } else {
            Ok(PasswordCheck::Mismatch(INCORRECT_PASSWORD.to_string()))
        }
    }
}

impl Default for CredentialService {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}
