//! Postgres-backed stores.
//!
//! Uniqueness of `username` and `email` is enforced by `UNIQUE` constraints (see
//! `migrations/`). Signups additionally serialize on a transaction-scoped advisory lock so
//! that the "is the table empty" decision and the insert happen as one step.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use super::{task_not_found, user_not_found, TaskStore, UserStore};
use crate::deadline::Deadline;
use crate::error::AppError;
use crate::models::{NewUser, Task, TaskInput, User};

/// Advisory lock key held by every signup transaction.
const CREATE_USER_LOCK: i64 = 0x7573_6572_5f6e_6577;

const USER_COLUMNS: &str = "id, name, username, email, password_hash, role, created_at, updated_at";
const TASK_COLUMNS: &str =
    "id, title, description, priority, status, due_date, created_at, updated_at, created_by";

/// Opens a pool and brings the schema up to date.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("migration failed: {}", e)))?;
    Ok(pool)
}

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, user: NewUser, deadline: Deadline) -> Result<User, AppError> {
        deadline
            .run(async {
                let mut tx = self.pool.begin().await?;

                sqlx::query("SELECT pg_advisory_xact_lock($1)")
                    .bind(CREATE_USER_LOCK)
                    .execute(&mut *tx)
                    .await?;

                let sql = format!(
                    "INSERT INTO users (id, name, username, email, password_hash, role, created_at, updated_at) \
                     SELECT $1, $2, $3, $4, $5, \
                            CASE WHEN EXISTS (SELECT 1 FROM users) THEN 'USER'::user_role ELSE 'ADMIN'::user_role END, \
                            $6, $6 \
                     RETURNING {}",
                    USER_COLUMNS
                );
                let created = sqlx::query_as::<_, User>(&sql)
                    .bind(Uuid::new_v4())
                    .bind(&user.name)
                    .bind(&user.username)
                    .bind(&user.email)
                    .bind(&user.password_hash)
                    .bind(Utc::now())
                    .fetch_one(&mut *tx)
                    .await?;

                tx.commit().await?;
                Ok::<_, AppError>(created)
            })
            .await
    }

    async fn find_by_username(
        &self,
        username: &str,
        deadline: Deadline,
    ) -> Result<User, AppError> {
        deadline
            .run(async {
                let sql = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
                let user = sqlx::query_as::<_, User>(&sql)
                    .bind(username)
                    .fetch_optional(&self.pool)
                    .await?;
                user.ok_or_else(user_not_found)
            })
            .await
    }

    async fn promote_to_admin(&self, user_id: Uuid, deadline: Deadline) -> Result<(), AppError> {
        deadline
            .run(async {
                let result = sqlx::query(
                    "UPDATE users \
                     SET role = 'ADMIN', \
                         updated_at = CASE WHEN role = 'ADMIN' THEN updated_at ELSE NOW() END \
                     WHERE id = $1",
                )
                .bind(user_id)
                .execute(&self.pool)
                .await?;

                if result.rows_affected() == 0 {
                    return Err(user_not_found());
                }
                Ok::<_, AppError>(())
            })
            .await
    }
}

#[derive(Clone)]
pub struct PgTaskStore {
    pool: PgPool,
}

impl PgTaskStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn create(&self, task: Task, deadline: Deadline) -> Result<Task, AppError> {
        deadline
            .run(async {
                let sql = format!(
                    "INSERT INTO tasks ({cols}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {cols}",
                    cols = TASK_COLUMNS
                );
                let created = sqlx::query_as::<_, Task>(&sql)
                    .bind(task.id)
                    .bind(&task.title)
                    .bind(&task.description)
                    .bind(task.priority)
                    .bind(task.status)
                    .bind(task.due_date)
                    .bind(task.created_at)
                    .bind(task.updated_at)
                    .bind(task.created_by)
                    .fetch_one(&self.pool)
                    .await?;
                Ok::<_, AppError>(created)
            })
            .await
    }

    async fn fetch_all(&self, deadline: Deadline) -> Result<Vec<Task>, AppError> {
        deadline
            .run(async {
                let sql = format!("SELECT {} FROM tasks ORDER BY created_at DESC", TASK_COLUMNS);
                let tasks = sqlx::query_as::<_, Task>(&sql)
                    .fetch_all(&self.pool)
                    .await?;
                Ok::<_, AppError>(tasks)
            })
            .await
    }

    async fn fetch_by_id(&self, task_id: Uuid, deadline: Deadline) -> Result<Task, AppError> {
        deadline
            .run(async {
                let sql = format!("SELECT {} FROM tasks WHERE id = $1", TASK_COLUMNS);
                let task = sqlx::query_as::<_, Task>(&sql)
                    .bind(task_id)
                    .fetch_optional(&self.pool)
                    .await?;
                task.ok_or_else(task_not_found)
            })
            .await
    }

    async fn update(
        &self,
        task_id: Uuid,
        input: TaskInput,
        deadline: Deadline,
    ) -> Result<Task, AppError> {
        deadline
            .run(async {
                let sql = format!(
                    "UPDATE tasks \
                     SET title = $2, description = $3, priority = $4, status = $5, \
                         due_date = COALESCE($6, due_date), updated_at = NOW() \
                     WHERE id = $1 \
                     RETURNING {}",
                    TASK_COLUMNS
                );
                let task = sqlx::query_as::<_, Task>(&sql)
                    .bind(task_id)
                    .bind(&input.title)
                    .bind(&input.description)
                    .bind(input.priority)
                    .bind(input.status)
                    .bind(input.due_date)
                    .fetch_optional(&self.pool)
                    .await?;
                task.ok_or_else(task_not_found)
            })
            .await
    }

    async fn delete(&self, task_id: Uuid, deadline: Deadline) -> Result<(), AppError> {
        deadline
            .run(async {
                let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
                    .bind(task_id)
                    .execute(&self.pool)
                    .await?;
                if result.rows_affected() == 0 {
                    return Err(task_not_found());
                }
                Ok::<_, AppError>(())
            })
            .await
    }
}
