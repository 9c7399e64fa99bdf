use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Represents the status of a task.
/// Corresponds to the `task_status` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Task is currently being worked on.
    InProgress,
    /// Task is completed.
    Completed,
}

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Task {
    /// Unique identifier for the task (UUID v4).
    pub id: Uuid,
    /// Identifier of the user who owns the task.
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    /// When the task is scheduled.
    pub date: DateTime<Utc>,
    /// Standard base64 encoding of the uploaded image bytes.
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Builds a task from validated input, stamping a fresh id and creation time.
    pub fn new(input: NewTask, user_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            title: input.title,
            description: input.description,
            status: input.status,
            date: input.date,
            image: input.image,
            created_at: Utc::now(),
        }
    }
}

/// Input for creating a task.
#[derive(Debug, Clone, Validate)]
pub struct NewTask {
    /// Must be between 1 and 100 characters and not only whitespace.
    #[validate(length(min = 1, max = 100), custom = "validate_not_blank")]
    pub title: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    pub status: TaskStatus,
    pub date: DateTime<Utc>,
    pub image: Option<String>,
}

/// Partial update of a task. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, Validate)]
pub struct TaskChanges {
    #[validate(length(min = 1, max = 100), custom = "validate_not_blank")]
    pub title: Option<String>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub date: Option<DateTime<Utc>>,
    pub image: Option<String>,
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Column a task listing is ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskSortBy {
    Title,
    #[default]
    CreatedAt,
    Status,
    Date,
}

impl TaskSortBy {
    pub fn column(self) -> &'static str {
        match self {
            TaskSortBy::Title => "title",
            TaskSortBy::CreatedAt => "created_at",
            TaskSortBy::Status => "status",
            TaskSortBy::Date => "date",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

fn default_limit() -> i64 {
    10
}

/// Represents query parameters for listing the caller's tasks.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TaskListQuery {
    /// Case-insensitive substring of the title or description.
    #[validate(length(max = 100))]
    pub search: Option<String>,
    #[serde(default)]
    pub sort_by: TaskSortBy,
    #[serde(default)]
    pub order: SortOrder,
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 100))]
    pub limit: i64,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub offset: i64,
}

impl Default for TaskListQuery {
    fn default() -> Self {
        Self {
            search: None,
            sort_by: TaskSortBy::default(),
            order: SortOrder::default(),
            limit: default_limit(),
            offset: 0,
        }
    }
}

impl TaskListQuery {
    /// The search term, or `None` when it is absent or only whitespace.
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }
}

/// One page of tasks plus the number of tasks matching the filter.
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskListResponse {
    pub total: i64,
    pub tasks: Vec<Task>,
}
