use crate::{
    auth::{AuthMiddleware, AuthenticatedUser},
    error::AppError,
    models::TaskInput,
    usecase::TaskUsecase,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde::Serialize;
use uuid::Uuid;

/// Envelope for successful task responses.
#[derive(Debug, Serialize)]
pub struct SuccessResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
}

impl<T: Serialize> SuccessResponse<T> {
    fn new(message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }
}

/// Lists every task, newest first.
///
/// ## Responses:
/// - `200 OK`: `{"success", "message", "data": [Task]}`.
#[get("/tasks")]
pub async fn get_tasks(usecase: web::Data<TaskUsecase>) -> Result<impl Responder, AppError> {
    let tasks = usecase.fetch_all(usecase.deadline()).await?;
    Ok(HttpResponse::Ok().json(SuccessResponse::new("Success to get all tasks", Some(tasks))))
}

/// Retrieves a single task by id.
///
/// ## Responses:
/// - `200 OK`: `{"success", "message", "data": Task}`.
/// - `404 Not Found`: no task has this id.
#[get("/tasks/{id}")]
pub async fn get_task(
    usecase: web::Data<TaskUsecase>,
    path: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let task_id = path.into_inner();
    let task = usecase.fetch_by_id(task_id, usecase.deadline()).await?;
    Ok(HttpResponse::Ok().json(SuccessResponse::new(
        format!("Success to get task with id {}", task_id),
        Some(task),
    )))
}

/// Creates a task owned by the authenticated user.
///
/// ## Responses:
/// - `201 Created`: `{"success", "message", "data": Task}`.
/// - `400 Bad Request`: the payload failed validation.
/// - `401 Unauthorized`: missing, invalid or expired token.
#[post("/tasks", wrap = "AuthMiddleware")]
pub async fn create_task(
    usecase: web::Data<TaskUsecase>,
    user: AuthenticatedUser,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    let task = usecase
        .create(task_data.into_inner(), user.0.sub, usecase.deadline())
        .await?;
    Ok(HttpResponse::Created().json(SuccessResponse::new("Task created successfully", Some(task))))
}

/// Replaces the editable fields of a task.
///
/// ## Responses:
/// - `200 OK`: `{"success", "message", "data": Task}`.
/// - `400 Bad Request`, `401 Unauthorized`, `404 Not Found`.
#[put("/tasks/{id}", wrap = "AuthMiddleware")]
pub async fn update_task(
    usecase: web::Data<TaskUsecase>,
    _user: AuthenticatedUser,
    path: web::Path<Uuid>,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    let task = usecase
        .update(path.into_inner(), task_data.into_inner(), usecase.deadline())
        .await?;
    Ok(HttpResponse::Ok().json(SuccessResponse::new("Task updated successfully", Some(task))))
}

/// Deletes a task.
///
/// ## Responses:
/// - `200 OK`, `401 Unauthorized`, `404 Not Found`.
#[delete("/tasks/{id}", wrap = "AuthMiddleware")]
pub async fn delete_task(
    usecase: web::Data<TaskUsecase>,
    _user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    usecase
        .delete(path.into_inner(), usecase.deadline())
        .await?;
    Ok(HttpResponse::Ok().json(SuccessResponse::<()>::new("Task deleted", None)))
}
