#![allow(dead_code)]

use actix_web::web;
use std::sync::Arc;
use std::time::Duration;

use taskmanager::auth::{CredentialService, TokenService};
use taskmanager::routes;
use taskmanager::store::{MemoryTaskStore, MemoryUserStore};
use taskmanager::usecase::{AuthUsecase, TaskUsecase};

pub const SECRET: &str = "integration_test_secret";

/// Shared app data for one test, backed by in-memory stores.
#[derive(Clone)]
pub struct TestState {
    pub users: Arc<MemoryUserStore>,
    pub auth: web::Data<AuthUsecase>,
    pub tasks: web::Data<TaskUsecase>,
    pub tokens: web::Data<TokenService>,
}

impl TestState {
    pub fn new() -> Self {
        let users = Arc::new(MemoryUserStore::new());
        let tokens = TokenService::new(SECRET);
        let auth = AuthUsecase::new(
            users.clone(),
            CredentialService::new(4),
            tokens.clone(),
            Duration::from_secs(30),
        );
        let tasks = TaskUsecase::new(Arc::new(MemoryTaskStore::new()), Duration::from_secs(30));
        Self {
            users,
            auth: web::Data::new(auth),
            tasks: web::Data::new(tasks),
            tokens: web::Data::new(tokens),
        }
    }

    /// Registers the app data and every route, for `App::configure`.
    pub fn configure(&self) -> impl FnOnce(&mut web::ServiceConfig) + 'static {
        let state = self.clone();
        move |cfg: &mut web::ServiceConfig| {
            cfg.app_data(state.auth)
                .app_data(state.tasks)
                .app_data(state.tokens);
            routes::config(cfg);
        }
    }
}

pub fn bearer(token: &str) -> (actix_web::http::header::HeaderName, String) {
    (
        actix_web::http::header::AUTHORIZATION,
        format!("Bearer {}", token),
    )
}
