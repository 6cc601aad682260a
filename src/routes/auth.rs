use crate::{
    auth::{AdminUser, AuthMiddleware, Credentials, LoginResponse, MessageResponse, SignupRequest},
    error::AppError,
    usecase::AuthUsecase,
};
use actix_web::{post, put, web, HttpResponse, Responder, ResponseError};
use serde_json::json;
use uuid::Uuid;

/// Register a new user
///
/// The first account ever registered becomes an administrator.
///
/// ## Responses:
/// - `201 Created`: `{"message": ...}`.
/// - `400 Bad Request`: validation failure or a taken username/email, as `{"message": ...}`.
#[post("/register")]
pub async fn register(
    usecase: web::Data<AuthUsecase>,
    candidate: web::Json<SignupRequest>,
) -> Result<impl Responder, AppError> {
    usecase
        .signup(candidate.into_inner(), usecase.deadline())
        .await?;

    Ok(HttpResponse::Created().json(MessageResponse::new("User registered successfully")))
}

/// Login user
///
/// ## Responses:
/// - `200 OK`: `{"message", "token", "refresh_token"}`.
/// - `400 Bad Request`: malformed body, unknown user, wrong password or incomplete profile,
///   as `{"error": ...}`.
/// - `5xx`: store or signing failure, as `{"error": ...}`.
#[post("/login")]
pub async fn login(
    usecase: web::Data<AuthUsecase>,
    credentials: Result<web::Json<Credentials>, actix_web::Error>,
) -> HttpResponse {
    let credentials = match credentials {
        Ok(credentials) => credentials,
        Err(err) => {
            let message = err
                .as_error::<AppError>()
                .map(|app_err| app_err.message().to_string())
                .unwrap_or_else(|| err.to_string());
            return HttpResponse::BadRequest().json(json!({ "error": message }));
        }
    };

    match usecase
        .handle_login(credentials.into_inner(), usecase.deadline())
        .await
    {
        Ok(pair) => HttpResponse::Ok().json(LoginResponse {
            message: "User logged in successfully!".to_string(),
            token: pair.access_token,
            refresh_token: pair.refresh_token,
        }),
        Err(err) if err.is_internal() => {
            log::error!("{}", err);
            HttpResponse::build(err.status_code()).json(json!({ "error": err.message() }))
        }
        Err(err) => HttpResponse::BadRequest().json(json!({ "error": err.message() })),
    }
}

/// Promote a user to `ADMIN`
///
/// Requires a valid access token whose role is `ADMIN`.
///
/// ## Responses:
/// - `200 OK`: `{"message": ...}`.
/// - `401`/`403`: missing or invalid token, or a caller that is not an admin.
/// - `404 Not Found`: no user has this id.
#[put("/promote/{id}", wrap = "AuthMiddleware")]
pub async fn promote(
    usecase: web::Data<AuthUsecase>,
    admin: AdminUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let user_id = path.into_inner();
    usecase.promote(user_id, usecase.deadline()).await?;
    log::info!("{} promoted user {}", admin.0.username, user_id);

    Ok(HttpResponse::Ok().json(MessageResponse::new("User promoted to ADMIN")))
}
