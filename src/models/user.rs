use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

use crate::error::AppError;

/// Authorization role of an account.
/// Corresponds to the `user_role` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored account. The password hash never leaves the server.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    /// Assigned by the store at creation.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Unique, case-sensitive login name.
    pub username: String,
    /// Unique email address.
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Tokens are only issued for records whose identity fields are all present.
    pub fn ensure_complete(&self) -> Result<(), AppError> {
        if self.username.trim().is_empty() || self.email.trim().is_empty() {
            return Err(AppError::Unauthorized("incomplete user profile".into()));
        }
        Ok(())
    }
}

/// A validated signup, ready to be admitted by a `UserStore`.
///
/// Carries the bcrypt hash, never the plaintext. The store decides id, role and timestamps.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

impl NewUser {
    /// Builds the stored record once the store has decided the id and role.
    pub fn into_user(self, id: Uuid, role: Role, now: DateTime<Utc>) -> User {
        User {
            id,
            name: self.name,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            role,
            created_at: now,
            updated_at: now,
        }
    }
}
