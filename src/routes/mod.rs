pub mod auth;
pub mod health;
pub mod tasks;

use actix_web::{error, web, HttpRequest};

use crate::error::AppError;

/// Malformed or mistyped JSON bodies answer 400 `{"message": ...}`.
fn json_error(err: error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    log::debug!("rejected request body: {}", err);
    AppError::Validation(err.to_string()).into()
}

/// A path segment that does not parse (e.g. a bad UUID) names no resource.
fn path_error(err: error::PathError, _req: &HttpRequest) -> actix_web::Error {
    log::debug!("rejected request path: {}", err);
    AppError::NotFound(err.to_string()).into()
}

/// Registers every route. Protected handlers carry `AuthMiddleware` themselves.
///
/// Expects `web::Data<AuthUsecase>`, `web::Data<TaskUsecase>` and `web::Data<TokenService>`
/// to be registered as app data.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::PathConfig::default().error_handler(path_error))
        .service(health::health)
        .service(auth::register)
        .service(auth::login)
        .service(auth::promote)
        .service(tasks::get_tasks)
        .service(tasks::get_task)
        .service(tasks::create_task)
        .service(tasks::update_task)
        .service(tasks::delete_task);
}
