use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::auth::{
    CredentialService, Credentials, PasswordCheck, SignupRequest, TokenPair, TokenService,
};
use crate::deadline::Deadline;
use crate::error::AppError;
use crate::models::{NewUser, User};
use crate::store::UserStore;

/// Signup, login and promotion.
///
/// Each operation takes the caller's deadline and hands it to every store call, so a slow
/// store is abandoned instead of finishing stale work.
pub struct AuthUsecase {
    users: Arc<dyn UserStore>,
    credentials: CredentialService,
    tokens: TokenService,
    timeout: Duration,
}

impl AuthUsecase {
    pub fn new(
        users: Arc<dyn UserStore>,
        credentials: CredentialService,
        tokens: TokenService,
        timeout: Duration,
    ) -> Self {
        Self {
            users,
            credentials,
            tokens,
            timeout,
        }
    }

    /// A fresh deadline for one request, `timeout` from now.
    pub fn deadline(&self) -> Deadline {
        Deadline::after(self.timeout)
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Validates the candidate, hashes its password and admits it to the store.
    ///
    /// Validation errors are reported verbatim; store conflicts pass through unchanged.
    pub async fn signup(
        &self,
        candidate: SignupRequest,
        deadline: Deadline,
    ) -> Result<User, AppError> {
        let fields = candidate.into_fields()?;

        let credentials = self.credentials;
        let password = fields.password;
        let password_hash = deadline
            .run(async move {
                tokio::task::spawn_blocking(move || credentials.hash(&password)).await?
            })
            .await?;

        let new_user = NewUser {
            name: fields.name,
            username: fields.username,
            email: fields.email,
            password_hash,
        };
        let user = deadline.run(self.users.create(new_user, deadline)).await?;
        log::info!("registered user {} with role {}", user.username, user.role);
        Ok(user)
    }

    /// Checks the credentials and issues an access/refresh token pair.
    pub async fn handle_login(
        &self,
        credentials: Credentials,
        deadline: Deadline,
    ) -> Result<TokenPair, AppError> {
        let user = deadline
            .run(self.users.find_by_username(&credentials.username, deadline))
            .await
            .map_err(|e| match e {
                AppError::NotFound(_) => AppError::NotFound("user not found".into()),
                other => other,
            })?;

        let service = self.credentials;
        let password = credentials.password;
        let hash = user.password_hash.clone();
        let check = deadline
            .run(async move {
                tokio::task::spawn_blocking(move || service.verify(&password, &hash)).await?
            })
            .await?;
        if let PasswordCheck::Mismatch(reason) = check {
            return Err(AppError::Unauthorized(reason));
        }

        user.ensure_complete()?;
        let pair = self.tokens.issue_pair(&user)?;
        log::info!("user {} logged in", user.username);
        Ok(pair)
    }

    /// Grants `Role::Admin` to the account with `user_id`.
    pub async fn promote(&self, user_id: Uuid, deadline: Deadline) -> Result<(), AppError> {
        deadline
            .run(self.users.promote_to_admin(user_id, deadline))
            .await?;
        log::info!("user {} promoted to ADMIN", user_id);
        Ok(())
    }
}
