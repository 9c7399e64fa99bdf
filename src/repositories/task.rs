use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::logging::Logger;
use crate::models::{Task, TaskChanges, TaskListQuery};

const TASK_COLUMNS: &str = "id, user_id, title, description, status, date, image, created_at";

#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Round-trips to the store.
    async fn health_check(&self) -> Result<(), AppError>;

    async fn create(&self, task: Task) -> Result<Task, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, AppError>;

    /// Returns the number of tasks owned by `user_id` that match the query's search, and
    /// the requested page of them.
    async fn list(&self, user_id: Uuid, query: &TaskListQuery)
        -> Result<(i64, Vec<Task>), AppError>;

    /// Applies `changes` and returns the stored task, or `None` if it no longer exists.
    async fn update(&self, id: Uuid, changes: TaskChanges) -> Result<Option<Task>, AppError>;

    /// Returns whether a task was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}

/// Escapes `LIKE` wildcards so `term` only ever matches itself, and wraps it for a
/// substring match.
pub fn escape_like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

pub struct PgTaskRepository {
    pool: PgPool,
    logger: Logger,
}

impl PgTaskRepository {
    pub fn new(pool: PgPool, logger: Logger) -> Self {
        Self { pool, logger }
    }
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn health_check(&self) -> Result<(), AppError> {
        self.logger.debug("[Repository: HealthCheck] Called");

        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn create(&self, task: Task) -> Result<Task, AppError> {
        self.logger.debug("[Repository: CreateTask] Called");

        let sql = format!(
            "INSERT INTO tasks (id, user_id, title, description, status, date, image, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {}",
            TASK_COLUMNS
        );
        let created = sqlx::query_as::<_, Task>(&sql)
            .bind(task.id)
            .bind(task.user_id)
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.status)
            .bind(task.date)
            .bind(&task.image)
            .bind(task.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                self.logger.error(&format!(
                    "[Repository: CreateTask] Failed to create task: {}",
                    e
                ));
                e
            })?;

        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, AppError> {
        self.logger.debug("[Repository: GetTask] Called");

        let sql = format!("SELECT {} FROM tasks WHERE id = $1", TASK_COLUMNS);
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(task)
    }

    async fn list(
        &self,
        user_id: Uuid,
        query: &TaskListQuery,
    ) -> Result<(i64, Vec<Task>), AppError> {
        self.logger.debug("[Repository: GetAllTasks] Called");

        let pattern = query.search_term().map(escape_like_pattern);
        let filter = "WHERE user_id = $1 AND ($2::text IS NULL \
                      OR title ILIKE $2 ESCAPE '\\' \
                      OR description ILIKE $2 ESCAPE '\\')";

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM tasks {}", filter))
            .bind(user_id)
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await?;

        // Sort column and direction come from closed enums, never from raw input.
        let sql = format!(
            "SELECT {} FROM tasks {} ORDER BY {} {}, id ASC LIMIT $3 OFFSET $4",
            TASK_COLUMNS,
            filter,
            query.sort_by.column(),
            query.order.as_sql()
        );
        let tasks = sqlx::query_as::<_, Task>(&sql)
            .bind(user_id)
            .bind(&pattern)
            .bind(query.limit)
            .bind(query.offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                self.logger.error(&format!(
                    "[Repository: GetAllTasks] Failed to get all tasks: {}",
                    e
                ));
                e
            })?;

        Ok((total, tasks))
    }

    async fn update(&self, id: Uuid, changes: TaskChanges) -> Result<Option<Task>, AppError> {
        self.logger.debug("[Repository: UpdateTask] Called");

        let sql = format!(
            "UPDATE tasks SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                status = COALESCE($4, status),
                date = COALESCE($5, date),
                image = COALESCE($6, image)
             WHERE id = $1
             RETURNING {}",
            TASK_COLUMNS
        );
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .bind(changes.title)
            .bind(changes.description)
            .bind(changes.status)
            .bind(changes.date)
            .bind(changes.image)
            .fetch_optional(&self.pool)
            .await?;

        Ok(task)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        self.logger.debug("[Repository: DeleteTask] Called");

        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
