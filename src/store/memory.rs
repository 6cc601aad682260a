//! In-process stores, used when no `DATABASE_URL` is configured and throughout the tests.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use uuid::Uuid;

use super::{task_not_found, user_not_found, TaskStore, UserStore};
use crate::deadline::Deadline;
use crate::error::AppError;
use crate::models::{NewUser, Role, Task, TaskInput, User};

fn poisoned<T>(_: PoisonError<T>) -> AppError {
    AppError::InternalServerError("store lock poisoned".into())
}

#[derive(Default)]
struct Users {
    by_id: HashMap<Uuid, User>,
    by_username: HashMap<String, Uuid>,
    by_email: HashMap<String, Uuid>,
}

/// Users kept in memory behind one lock.
///
/// `create` checks both uniqueness indexes, decides the bootstrap role and inserts while
/// holding the write lock, so concurrent signups are linearized.
#[derive(Default)]
pub struct MemoryUserStore {
    inner: RwLock<Users>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|users| users.by_id.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, user: NewUser, deadline: Deadline) -> Result<User, AppError> {
        deadline.check()?;
        let mut users = self.inner.write().map_err(poisoned)?;

        if users.by_username.contains_key(&user.username) {
            return Err(AppError::Conflict("this username already exists".into()));
        }
        if users.by_email.contains_key(&user.email) {
            return Err(AppError::Conflict("this email already exists".into()));
        }

        let role = if users.by_id.is_empty() {
            Role::Admin
        } else {
            Role::User
        };
        let user = user.into_user(Uuid::new_v4(), role, Utc::now());
        if role == Role::Admin {
            log::info!("bootstrap admin assigned to {}", user.username);
        }

        users.by_username.insert(user.username.clone(), user.id);
        users.by_email.insert(user.email.clone(), user.id);
        users.by_id.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_username(
        &self,
        username: &str,
        deadline: Deadline,
    ) -> Result<User, AppError> {
        deadline.check()?;
        let users = self.inner.read().map_err(poisoned)?;
        users
            .by_username
            .get(username)
            .and_then(|id| users.by_id.get(id))
            .cloned()
            .ok_or_else(user_not_found)
    }

    async fn promote_to_admin(&self, user_id: Uuid, deadline: Deadline) -> Result<(), AppError> {
        deadline.check()?;
        let mut users = self.inner.write().map_err(poisoned)?;
        let user = users.by_id.get_mut(&user_id).ok_or_else(user_not_found)?;
        if user.role != Role::Admin {
            user.role = Role::Admin;
            user.updated_at = Utc::now();
        }
        Ok(())
    }
}

/// Tasks kept in memory.
#[derive(Default)]
pub struct MemoryTaskStore {
    tasks: RwLock<HashMap<Uuid, Task>>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn create(&self, task: Task, deadline: Deadline) -> Result<Task, AppError> {
        deadline.check()?;
        let mut tasks = self.tasks.write().map_err(poisoned)?;
        tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn fetch_all(&self, deadline: Deadline) -> Result<Vec<Task>, AppError> {
        deadline.check()?;
        let tasks = self.tasks.read().map_err(poisoned)?;
        let mut all: Vec<Task> = tasks.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn fetch_by_id(&self, task_id: Uuid, deadline: Deadline) -> Result<Task, AppError> {
        deadline.check()?;
        let tasks = self.tasks.read().map_err(poisoned)?;
        tasks.get(&task_id).cloned().ok_or_else(task_not_found)
    }

    async fn update(
        &self,
        task_id: Uuid,
        input: TaskInput,
        deadline: Deadline,
    ) -> Result<Task, AppError> {
        deadline.check()?;
        let mut tasks = self.tasks.write().map_err(poisoned)?;
        let task = tasks.get_mut(&task_id).ok_or_else(task_not_found)?;
        task.apply(input);
        Ok(task.clone())
    }

    async fn delete(&self, task_id: Uuid, deadline: Deadline) -> Result<(), AppError> {
        deadline.check()?;
        let mut tasks = self.tasks.write().map_err(poisoned)?;
        tasks.remove(&task_id).map(|_| ()).ok_or_else(task_not_found)
    }
}
