//! Store tests against a live Postgres. Run with `DATABASE_URL=... cargo test -- --ignored`.

use dotenv::dotenv;
use pretty_assertions::assert_eq;
use std::sync::Arc;

use taskmanager::models::{NewUser, Role, Task, TaskInput, TaskStatus};
use taskmanager::store::{self, PgTaskStore, PgUserStore, TaskStore, UserStore};
use taskmanager::{AppError, Deadline};

async fn pool() -> sqlx::PgPool {
    dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");
    store::postgres::connect(&database_url, 5)
        .await
        .expect("Failed to connect to test DB")
}

fn new_user(tag: &str) -> NewUser {
    NewUser {
        name: format!("Pg {}", tag),
        username: format!("pg_{}", tag),
        email: format!("pg_{}@example.com", tag),
        password_hash: "$2b$04$not-a-real-hash".to_string(),
    }
}

async fn cleanup(pool: &sqlx::PgPool, username: &str) {
    let _ = sqlx::query("DELETE FROM users WHERE username = $1")
        .bind(username)
        .execute(pool)
        .await;
}

#[actix_rt::test]
#[ignore = "requires DATABASE_URL"]
async fn test_pg_user_lifecycle() {
    let pool = pool().await;
    let tag = uuid::Uuid::new_v4().simple().to_string();
    let users = PgUserStore::new(pool.clone());

    let created = users.create(new_user(&tag), Deadline::none()).await.unwrap();
    let found = users
        .find_by_username(&created.username, Deadline::none())
        .await
        .unwrap();
    assert_eq!(found.id, created.id);
    assert_eq!(found.email, created.email);

    let mut duplicate = new_user(&tag);
    duplicate.email = format!("other_{}@example.com", tag);
    match users.create(duplicate, Deadline::none()).await {
        Err(AppError::Conflict(msg)) => assert!(msg.contains("username")),
        other => panic!("expected a username conflict, got {:?}", other),
    }

    users.promote_to_admin(created.id, Deadline::none()).await.unwrap();
    users.promote_to_admin(created.id, Deadline::none()).await.unwrap();
    let promoted = users
        .find_by_username(&created.username, Deadline::none())
        .await
        .unwrap();
    assert_eq!(promoted.role, Role::Admin);

    assert!(matches!(
        users
            .promote_to_admin(uuid::Uuid::new_v4(), Deadline::none())
            .await,
        Err(AppError::NotFound(_))
    ));

    cleanup(&pool, &created.username).await;
}

#[actix_rt::test]
#[ignore = "requires DATABASE_URL"]
async fn test_pg_concurrent_signups_have_one_winner() {
    let pool = pool().await;
    let tag = uuid::Uuid::new_v4().simple().to_string();
    let users: Arc<dyn UserStore> = Arc::new(PgUserStore::new(pool.clone()));

    let mut handles = Vec::new();
    for i in 0..8 {
        let users = users.clone();
        let mut candidate = new_user(&tag);
        candidate.email = format!("racer{}_{}@example.com", i, tag);
        handles.push(tokio::spawn(async move {
            users.create(candidate, Deadline::none()).await
        }));
    }

    let mut winners = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => winners += 1,
            Err(AppError::Conflict(_)) => {}
            Err(e) => panic!("unexpected error: {:?}", e),
        }
    }
    assert_eq!(winners, 1);

    cleanup(&pool, &format!("pg_{}", tag)).await;
}

#[actix_rt::test]
#[ignore = "requires DATABASE_URL"]
async fn test_pg_task_crud() {
    let pool = pool().await;
    let tag = uuid::Uuid::new_v4().simple().to_string();
    let owner = PgUserStore::new(pool.clone())
        .create(new_user(&tag), Deadline::none())
        .await
        .unwrap();
    let tasks = PgTaskStore::new(pool.clone());

    let input = TaskInput {
        title: "pg task".to_string(),
        description: None,
        priority: None,
        due_date: None,
        status: TaskStatus::Todo,
    };
    let task = tasks
        .create(Task::new(input.clone(), owner.id), Deadline::none())
        .await
        .unwrap();
    assert_eq!(tasks.fetch_by_id(task.id, Deadline::none()).await.unwrap().title, "pg task");

    let updated = tasks
        .update(
            task.id,
            TaskInput {
                status: TaskStatus::Done,
                ..input
            },
            Deadline::none(),
        )
        .await
        .unwrap();
    assert_eq!(updated.status, TaskStatus::Done);

    tasks.delete(task.id, Deadline::none()).await.unwrap();
    assert!(matches!(
        tasks.fetch_by_id(task.id, Deadline::none()).await,
        Err(AppError::NotFound(_))
    ));

    cleanup(&pool, &owner.username).await;
}
