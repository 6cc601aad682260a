use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;
use validator::Validate;

use crate::deadline::Deadline;
use crate::error::AppError;
use crate::models::{Task, TaskInput};
use crate::store::TaskStore;

/// Task CRUD on top of a `TaskStore`, bounded by the caller's deadline.
pub struct TaskUsecase {
    tasks: Arc<dyn TaskStore>,
    timeout: Duration,
}

impl TaskUsecase {
    pub fn new(tasks: Arc<dyn TaskStore>, timeout: Duration) -> Self {
        Self { tasks, timeout }
    }

    pub fn deadline(&self) -> Deadline {
        Deadline::after(self.timeout)
    }

    pub async fn create(
        &self,
        input: TaskInput,
        created_by: Uuid,
        deadline: Deadline,
    ) -> Result<Task, AppError> {
        input.validate()?;
        let task = Task::new(input, created_by);
        deadline.run(self.tasks.create(task, deadline)).await
    }

    pub async fn fetch_all(&self, deadline: Deadline) -> Result<Vec<Task>, AppError> {
        deadline.run(self.tasks.fetch_all(deadline)).await
    }

    pub async fn fetch_by_id(&self, task_id: Uuid, deadline: Deadline) -> Result<Task, AppError> {
        deadline.run(self.tasks.fetch_by_id(task_id, deadline)).await
    }

    pub async fn update(
        &self,
        task_id: Uuid,
        input: TaskInput,
        deadline: Deadline,
    ) -> Result<Task, AppError> {
        input.validate()?;
        deadline.run(self.tasks.update(task_id, input, deadline)).await
    }

    pub async fn delete(&self, task_id: Uuid, deadline: Deadline) -> Result<(), AppError> {
        deadline.run(self.tasks.delete(task_id, deadline)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskStatus;
    use crate::store::MemoryTaskStore;

    fn usecase() -> TaskUsecase {
        TaskUsecase::new(Arc::new(MemoryTaskStore::new()), Duration::from_secs(5))
    }

    fn input(title: &str) -> TaskInput {
        TaskInput {
            title: title.to_string(),
            description: None,
            priority: None,
            due_date: None,
            status: TaskStatus::Todo,
        }
    }

    #[actix_rt::test]
    async fn test_create_validates_input() {
        let usecase = usecase();
        let err = usecase
            .create(input(""), Uuid::new_v4(), usecase.deadline())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(usecase.fetch_all(usecase.deadline()).await.unwrap().is_empty());
    }

    #[actix_rt::test]
    async fn test_crud_cycle() {
        let usecase = usecase();
        let creator = Uuid::new_v4();
        let task = usecase
            .create(input("Ship it"), creator, usecase.deadline())
            .await
            .unwrap();
        assert_eq!(task.created_by, creator);

        let mut change = input("Ship it today");
        change.status = TaskStatus::InProgress;
        let updated = usecase
            .update(task.id, change, usecase.deadline())
            .await
            .unwrap();
        assert_eq!(updated.title, "Ship it today");
        assert_eq!(updated.status, TaskStatus::InProgress);

        usecase.delete(task.id, usecase.deadline()).await.unwrap();
        let err = usecase
            .fetch_by_id(task.id, usecase.deadline())
            .await
            .unwrap_err();
        assert_eq!(err, AppError::NotFound("task not found".into()));
    }
}
