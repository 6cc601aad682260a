#![doc = "The `taskmanager` library crate."]
#![doc = ""]
#![doc = "A task management API with user accounts: bcrypt password credentials, HS256 session"]
#![doc = "tokens, a user store that elects the first account as administrator, and task CRUD."]
#![doc = "The binary (`main.rs`) wires configuration, stores and routes together."]

pub mod auth;
pub mod config;
pub mod deadline;
pub mod error;
pub mod models;
pub mod routes;
pub mod store;
pub mod usecase;

pub use crate::deadline::Deadline;
pub use crate::error::AppError;
