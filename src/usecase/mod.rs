pub mod auth;
pub mod tasks;

pub use auth::AuthUsecase;
pub use tasks::TaskUsecase;
