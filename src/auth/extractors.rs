use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::auth::token::SessionClaims;
use crate::error::AppError;
use crate::models::Role;

/// The claims `AuthMiddleware` attached to the request.
///
/// Only usable on routes wrapped by `AuthMiddleware`; anywhere else extraction fails with
/// `AppError::Unauthorized`.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub SessionClaims);

impl FromRequest for AuthenticatedUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<SessionClaims>().cloned() {
            Some(claims) => ready(Ok(AuthenticatedUser(claims))),
            None => {
                let err = AppError::Unauthorized(
                    "no session claims on request. Ensure AuthMiddleware is active.".to_string(),
                );
                ready(Err(err.into()))
            }
        }
    }
}

/// Like `AuthenticatedUser`, but rejects callers whose token role is not `ADMIN`.
#[derive(Debug, Clone)]
pub struct AdminUser(pub SessionClaims);

impl FromRequest for AdminUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let claims = req.extensions().get::<SessionClaims>().cloned();
        let result = match claims {
            Some(claims) if claims.role == Role::Admin => Ok(AdminUser(claims)),
            Some(_) => Err(AppError::Forbidden("admin role required".into())),
            None => Err(AppError::Unauthorized(
                "no session claims on request. Ensure AuthMiddleware is active.".into(),
            )),
        };
        ready(result.map_err(Into::into))
    }
}
