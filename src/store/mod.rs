//! Persistence contracts used by the usecases.
//!
//! Every method takes the caller's [`Deadline`]; implementations must not keep working past it.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::deadline::Deadline;
use crate::error::AppError;
use crate::models::{NewUser, Task, TaskInput, User};

pub use memory::{MemoryTaskStore, MemoryUserStore};
pub use postgres::{PgTaskStore, PgUserStore};

/// Durable user records.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Admits a new account.
    ///
    /// Atomically with respect to concurrent calls: rejects a taken username or email with
    /// `AppError::Conflict` naming the field, and assigns `Role::Admin` if and only if the
    /// store holds no users yet, `Role::User` otherwise.
    async fn create(&self, user: NewUser, deadline: Deadline) -> Result<User, AppError>;

    /// Exact, case-sensitive lookup. `AppError::NotFound` when absent.
    async fn find_by_username(&self, username: &str, deadline: Deadline)
        -> Result<User, AppError>;

    /// Sets the role to `Role::Admin`. Idempotent; `AppError::NotFound` for an unknown id.
    async fn promote_to_admin(&self, user_id: Uuid, deadline: Deadline) -> Result<(), AppError>;
}

/// Durable task records.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn create(&self, task: Task, deadline: Deadline) -> Result<Task, AppError>;

    /// All tasks, newest first.
    async fn fetch_all(&self, deadline: Deadline) -> Result<Vec<Task>, AppError>;

    async fn fetch_by_id(&self, task_id: Uuid, deadline: Deadline) -> Result<Task, AppError>;

    async fn update(
        &self,
        task_id: Uuid,
        input: TaskInput,
        deadline: Deadline,
    ) -> Result<Task, AppError>;

    async fn delete(&self, task_id: Uuid, deadline: Deadline) -> Result<(), AppError>;
}

pub(crate) fn user_not_found() -> AppError {
    AppError::NotFound("user not found".into())
}

pub(crate) fn task_not_found() -> AppError {
    AppError::NotFound("task not found".into())
}
