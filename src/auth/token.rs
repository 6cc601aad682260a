use crate::error::AppError;
use crate::models::{Role, User};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Lifetime of an access token.
pub const ACCESS_TOKEN_TTL_HOURS: i64 = 24;
/// Lifetime of a refresh token.
pub const REFRESH_TOKEN_TTL_HOURS: i64 = 168;

/// Distinguishes the two tokens of a pair so one cannot stand in for the other.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Claims carried by an access token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    /// User id.
    pub sub: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
    /// Issued-at, seconds since epoch.
    pub iat: i64,
    /// Expiration, seconds since epoch.
    pub exp: i64,
    pub kind: TokenKind,
}

/// Claims carried by a refresh token.
///
/// Holds enough identity to find the account again when minting a new access token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct RefreshClaims {
    pub sub: Uuid,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
    pub kind: TokenKind,
}

/// An access token and its companion refresh token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    /// Bad signature, malformed structure, or the wrong kind of token.
    Invalid,
    /// The embedded expiry is in the past.
    Expired,
    /// The signing backend failed.
    Signing,
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenError::Invalid => f.write_str("the token is invalid"),
            TokenError::Expired => f.write_str("token is expired"),
            TokenError::Signing => f.write_str("failed to sign token"),
        }
    }
}

impl std::error::Error for TokenError {}

impl From<TokenError> for AppError {
    fn from(error: TokenError) -> AppError {
        match error {
            TokenError::Invalid | TokenError::Expired => AppError::Unauthorized(error.to_string()),
            TokenError::Signing => AppError::InternalServerError(error.to_string()),
        }
    }
}

trait Expiring {
    fn exp(&self) -> i64;
    fn kind(&self) -> TokenKind;
}

impl Expiring for SessionClaims {
    fn exp(&self) -> i64 {
        self.exp
    }
    fn kind(&self) -> TokenKind {
        self.kind
    }
}

impl Expiring for RefreshClaims {
    fn exp(&self) -> i64 {
        self.exp
    }
    fn kind(&self) -> TokenKind {
        self.kind
    }
}

/// Issues and verifies HS256-signed session tokens.
///
/// The secret is handed over once at startup and is never read from the environment here.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl: Duration::hours(ACCESS_TOKEN_TTL_HOURS),
            refresh_ttl: Duration::hours(REFRESH_TOKEN_TTL_HOURS),
        }
    }

    /// Signs an access token for `user` and a refresh token that resolves back to it.
    pub fn issue_pair(&self, user: &User) -> Result<TokenPair, TokenError> {
        let now = Utc::now().timestamp();

        let access = SessionClaims {
            sub: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            iat: now,
            exp: now + self.access_ttl.num_seconds(),
            kind: TokenKind::Access,
        };
        let refresh = RefreshClaims {
            sub: user.id,
            username: user.username.clone(),
            iat: now,
            exp: now + self.refresh_ttl.num_seconds(),
            kind: TokenKind::Refresh,
        };

        Ok(TokenPair {
            access_token: self.sign(&access)?,
            refresh_token: self.sign(&refresh)?,
        })
    }

    /// Verifies an access token and returns its claims.
    pub fn validate(&self, token: &str) -> Result<SessionClaims, TokenError> {
        self.verify(token, TokenKind::Access)
    }

    /// Verifies a refresh token and returns its claims.
    pub fn validate_refresh(&self, token: &str) -> Result<RefreshClaims, TokenError> {
        self.verify(token, TokenKind::Refresh)
    }

    pub(crate) fn sign<T: Serialize>(&self, claims: &T) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key).map_err(|e| {
            log::error!("token signing failed: {}", e);
            TokenError::Signing
        })
    }

    fn verify<T>(&self, token: &str, expected: TokenKind) -> Result<T, TokenError>
    where
        T: DeserializeOwned + Expiring,
    {
        let validation = Validation::new(Algorithm::HS256);
        let claims = decode::<T>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                log::debug!("token rejected: {}", e);
                match e.kind() {
                    ErrorKind::ExpiredSignature => TokenError::Expired,
                    _ => TokenError::Invalid,
                }
            })?;

        // The decoder allows some leeway on `exp`; this second check does not, and it keeps
        // expired tokens out even if the decoder's own validation is ever relaxed.
        if claims.exp() < Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }
        if claims.kind() != expected {
            return Err(TokenError::Invalid);
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewUser;

    const SECRET: &str = "test_secret_for_tokens";

    fn user(role: Role) -> User {
        NewUser {
            name: "Alice".to_string(),
            username: "alice".to_string(),
            email: "a@x.com".to_string(),
            password_hash: "hash".to_string(),
        }
        .into_user(Uuid::new_v4(), role, Utc::now())
    }

    fn claims_for(user: &User, exp: i64) -> SessionClaims {
        SessionClaims {
            sub: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            iat: Utc::now().timestamp(),
            exp,
            kind: TokenKind::Access,
        }
    }

    /// Replaces the first character of the signature segment.
    fn tamper(token: &str) -> String {
        let dot = token.rfind('.').unwrap();
        let (head, sig) = token.split_at(dot + 1);
        let first = sig.chars().next().unwrap();
        let replacement = if first == 'A' { 'B' } else { 'A' };
        format!("{}{}{}", head, replacement, &sig[1..])
    }

    #[test]
    fn test_issue_and_validate_round_trip() {
        let service = TokenService::new(SECRET);
        let user = user(Role::Admin);
        let pair = service.issue_pair(&user).unwrap();

        assert!(!pair.access_token.is_empty());
        assert!(!pair.refresh_token.is_empty());

        let claims = service.validate(&pair.access_token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
    }

    #[test]
    fn test_refresh_token_lifetime_and_identity() {
        let service = TokenService::new(SECRET);
        let user = user(Role::User);
        let pair = service.issue_pair(&user).unwrap();

        let refresh = service.validate_refresh(&pair.refresh_token).unwrap();
        assert_eq!(refresh.exp - refresh.iat, 168 * 60 * 60);
        // Refresh tokens identify the account so they can later be exchanged.
        assert_eq!(refresh.sub, user.id);
        assert_eq!(refresh.username, user.username);
    }

    #[test]
    fn test_token_kinds_are_not_interchangeable() {
        let service = TokenService::new(SECRET);
        let pair = service.issue_pair(&user(Role::User)).unwrap();

        assert_eq!(service.validate(&pair.refresh_token), Err(TokenError::Invalid));
        assert_eq!(
            service.validate_refresh(&pair.access_token),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn test_tampered_signature_is_invalid() {
        let service = TokenService::new(SECRET);
        let pair = service.issue_pair(&user(Role::User)).unwrap();

        let tampered = tamper(&pair.access_token);
        assert_eq!(service.validate(&tampered), Err(TokenError::Invalid));
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let pair = TokenService::new("some_other_secret")
            .issue_pair(&user(Role::User))
            .unwrap();
        assert_eq!(
            TokenService::new(SECRET).validate(&pair.access_token),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn test_malformed_token_is_invalid() {
        let service = TokenService::new(SECRET);
        assert_eq!(service.validate("not-a-token"), Err(TokenError::Invalid));
        assert_eq!(service.validate(""), Err(TokenError::Invalid));
    }

    #[test]
    fn test_token_expired_an_hour_ago() {
        let service = TokenService::new(SECRET);
        let user = user(Role::User);
        let token = service
            .sign(&claims_for(&user, Utc::now().timestamp() - 3600))
            .unwrap();

        assert_eq!(service.validate(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_expiry_inside_decoder_leeway_is_still_rejected() {
        // The decoder tolerates 60 seconds of skew; the explicit check does not.
        let service = TokenService::new(SECRET);
        let user = user(Role::User);
        let token = service
            .sign(&claims_for(&user, Utc::now().timestamp() - 10))
            .unwrap();

        assert_eq!(service.validate(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_token_errors_map_to_unauthorized() {
        assert_eq!(
            AppError::from(TokenError::Expired),
            AppError::Unauthorized("token is expired".into())
        );
        assert!(matches!(
            AppError::from(TokenError::Signing),
            AppError::InternalServerError(_)
        ));
    }
}
