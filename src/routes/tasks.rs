use crate::{
    auth::VerifiedPayload,
    error::AppError,
    models::{NewTask, TaskChanges, TaskListQuery, TaskStatus},
    services::TaskService,
};
use actix_multipart::form::{tempfile::TempFile, text::Text, MultipartForm};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use tokio::io::AsyncReadExt;
use uuid::Uuid;
use validator::Validate;

/// Multipart body of `POST /tasks`.
#[derive(MultipartForm)]
pub struct CreateTaskForm {
    pub title: Text<String>,
    pub description: Option<Text<String>>,
    /// `IN_PROGRESS` or `COMPLETED`.
    pub status: Text<TaskStatus>,
    /// RFC 3339, e.g. `2024-09-01T00:00:00Z`.
    pub date: Text<DateTime<Utc>>,
    #[multipart(limit = "5MB")]
    pub image: Option<TempFile>,
}

/// Multipart body of `PUT /tasks/{id}`; every field is optional.
#[derive(MultipartForm)]
pub struct UpdateTaskForm {
    pub title: Option<Text<String>>,
    pub description: Option<Text<String>>,
    pub status: Option<Text<TaskStatus>>,
    pub date: Option<Text<DateTime<Utc>>>,
    #[multipart(limit = "5MB")]
    pub image: Option<TempFile>,
}

/// Reads an uploaded image and returns its standard base64 encoding.
///
/// An absent or empty upload is `None`.
async fn encode_image(image: Option<TempFile>) -> Result<Option<String>, AppError> {
    let image = match image {
        Some(image) if image.size > 0 => image,
        _ => return Ok(None),
    };

    let mut file = tokio::fs::File::open(image.file.path())
        .await
        .map_err(|e| AppError::ImageOpen(e.to_string()))?;
    let mut bytes = Vec::with_capacity(image.size);
    file.read_to_end(&mut bytes)
        .await
        .map_err(|e| AppError::ImageEncode(e.to_string()))?;

    Ok(Some(STANDARD.encode(bytes)))
}

/// Lists the caller's tasks.
///
/// ## Query Parameters:
/// - `search` (optional): case-insensitive substring of the title or description.
/// - `sort_by` (optional): `title`, `created_at` (default), `status` or `date`.
/// - `order` (optional): `asc` or `desc` (default).
/// - `limit` (optional): 1 to 100, default 10.
/// - `offset` (optional): 0 or more, default 0.
///
/// ## Responses:
/// - `200 OK`: `{"total": n, "tasks": [...]}` where `total` counts every match.
/// - `400 Bad Request` (`2005`): a parameter could not be parsed.
/// - `422 Unprocessable Entity` (`2003`): a parameter is out of range.
#[get("")]
pub async fn list_tasks(
    tasks: web::Data<TaskService>,
    caller: VerifiedPayload,
    query: web::Query<TaskListQuery>,
) -> Result<impl Responder, AppError> {
    query.validate()?;

    let page = tasks.list(&caller, &query).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// Creates a task owned by the caller.
///
/// ## Responses:
/// - `201 Created`: the stored task.
/// - `400 Bad Request` (`2001`): the form is missing a field or a value does not parse.
/// - `422 Unprocessable Entity` (`2003`): the title is blank or too long.
#[post("")]
pub async fn create_task(
    tasks: web::Data<TaskService>,
    caller: VerifiedPayload,
    MultipartForm(form): MultipartForm<CreateTaskForm>,
) -> Result<impl Responder, AppError> {
    let input = NewTask {
        title: form.title.into_inner(),
        description: form.description.map(Text::into_inner),
        status: form.status.into_inner(),
        date: form.date.into_inner(),
        image: encode_image(form.image).await?,
    };
    input.validate()?;

    let task = tasks.create(&caller, input).await?;
    Ok(HttpResponse::Created().json(task))
}

/// Retrieves one task.
///
/// ## Responses:
/// - `200 OK`: the task.
/// - `401 Unauthorized` (`1007`): the task belongs to another user.
/// - `404 Not Found` (`3001`): no such task.
#[get("/{id}")]
pub async fn get_task(
    tasks: web::Data<TaskService>,
    caller: VerifiedPayload,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let task = tasks.get(&caller, task_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Updates the fields present in the form and returns the stored task.
#[put("/{id}")]
pub async fn update_task(
    tasks: web::Data<TaskService>,
    caller: VerifiedPayload,
    task_id: web::Path<Uuid>,
    MultipartForm(form): MultipartForm<UpdateTaskForm>,
) -> Result<impl Responder, AppError> {
    let changes = TaskChanges {
        title: form.title.map(Text::into_inner),
        description: form.description.map(Text::into_inner),
        status: form.status.map(Text::into_inner),
        date: form.date.map(Text::into_inner),
        image: encode_image(form.image).await?,
    };
    changes.validate()?;

    let task = tasks.update(&caller, task_id.into_inner(), changes).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Deletes a task. Responds `204 No Content`.
#[delete("/{id}")]
pub async fn delete_task(
    tasks: web::Data<TaskService>,
    caller: VerifiedPayload,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    tasks.delete(&caller, task_id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
