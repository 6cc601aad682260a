use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Represents the priority of a task.
/// Corresponds to the `task_priority` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Urgent,
}

/// Represents the status of a task.
/// Corresponds to the `task_status` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task is yet to be started.
    #[default]
    Todo,
    /// Task is currently being worked on.
    InProgress,
    /// Task is completed and under review.
    Review,
    /// Task is completed.
    Done,
}

/// Input structure for creating or updating a task.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    /// Must be between 1 and 200 characters.
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    /// Maximum length of 1000 characters if provided.
    #[validate(length(max = 1000))]
    pub description: Option<String>,

    pub priority: Option<TaskPriority>,

    /// Defaults to the creation time when omitted.
    pub due_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub status: TaskStatus,
}

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub status: TaskStatus,
    pub due_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Identifier of the user who created the task.
    pub created_by: Uuid,
}

impl Task {
    /// Creates a new `Task` from `TaskInput` and the creator's id.
    pub fn new(input: TaskInput, created_by: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            priority: input.priority,
            status: input.status,
            due_date: input.due_date.unwrap_or(now),
            created_at: now,
            updated_at: now,
            created_by,
        }
    }

    /// Overwrites the editable fields, keeping id, creator and creation time.
    pub fn apply(&mut self, input: TaskInput) {
        self.title = input.title;
        self.description = input.description;
        self.priority = input.priority;
        self.status = input.status;
        if let Some(due_date) = input.due_date {
            self.due_date = due_date;
        }
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(title: &str) -> TaskInput {
        TaskInput {
            title: title.to_string(),
            description: Some("Test Description".to_string()),
            priority: Some(TaskPriority::High),
            status: TaskStatus::Todo,
            due_date: None,
        }
    }

    #[test]
    fn test_task_creation() {
        let creator = Uuid::new_v4();
        let task = Task::new(input("Test Task"), creator);
        assert_eq!(task.title, "Test Task");
        assert_eq!(task.created_by, creator);
        assert_eq!(task.due_date, task.created_at);
    }

    #[test]
    fn test_task_validation() {
        assert!(input("Valid Task").validate().is_ok());
        assert!(input("").validate().is_err());
        assert!(input(&"t".repeat(201)).validate().is_err());
    }

    #[test]
    fn test_status_defaults_to_todo() {
        let input: TaskInput = serde_json::from_str(r#"{"title":"x"}"#).unwrap();
        assert_eq!(input.status, TaskStatus::Todo);
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
    }

    #[test]
    fn test_apply_keeps_identity() {
        let mut task = Task::new(input("Before"), Uuid::new_v4());
        let id = task.id;
        let mut update = input("After");
        update.status = TaskStatus::Done;
        task.apply(update);
        assert_eq!(task.id, id);
        assert_eq!(task.title, "After");
        assert_eq!(task.status, TaskStatus::Done);
    }
}
