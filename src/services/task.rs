use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{AuthError, Payload};
use crate::error::AppError;
use crate::logging::Logger;
use crate::models::{NewTask, Task, TaskChanges, TaskListQuery, TaskListResponse};
use crate::repositories::TaskRepository;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

/// Task CRUD scoped to the caller named by a verified token payload.
pub struct TaskService {
    tasks: Arc<dyn TaskRepository>,
    logger: Logger,
}

impl TaskService {
    pub fn new(tasks: Arc<dyn TaskRepository>, logger: Logger) -> Self {
        Self { tasks, logger }
    }

    pub async fn health_check(&self) -> Result<HealthResponse, AppError> {
        self.logger.debug("[Service: HealthCheck] Called");

        self.tasks.health_check().await?;
        Ok(HealthResponse {
            status: "Healthy".to_string(),
            timestamp: Utc::now(),
        })
    }

    pub async fn create(&self, caller: &Payload, input: NewTask) -> Result<Task, AppError> {
        self.logger.debug("[Service: CreateTask] Called");

        let owner = owner_id(caller)?;
        let task = self.tasks.create(Task::new(input, owner)).await?;

        self.logger
            .info(&format!("[Service: CreateTask] Created task {}", task.id));
        Ok(task)
    }

    pub async fn get(&self, caller: &Payload, id: Uuid) -> Result<Task, AppError> {
        self.logger.debug("[Service: GetTask] Called");

        self.owned_task(caller, id).await
    }

    pub async fn list(
        &self,
        caller: &Payload,
        query: &TaskListQuery,
    ) -> Result<TaskListResponse, AppError> {
        self.logger.debug("[Service: GetAllTasks] Called");

        let owner = owner_id(caller)?;
        let (total, tasks) = self.tasks.list(owner, query).await?;
        Ok(TaskListResponse { total, tasks })
    }

    pub async fn update(
        &self,
        caller: &Payload,
        id: Uuid,
        changes: TaskChanges,
    ) -> Result<Task, AppError> {
        self.logger.debug("[Service: UpdateTask] Called");

        self.owned_task(caller, id).await?;
        let task = self
            .tasks
            .update(id, changes)
            .await?
            .ok_or(AppError::TaskNotFound)?;

        self.logger
            .info(&format!("[Service: UpdateTask] Updated task {}", task.id));
        Ok(task)
    }

    pub async fn delete(&self, caller: &Payload, id: Uuid) -> Result<(), AppError> {
        self.logger.debug("[Service: DeleteTask] Called");

        self.owned_task(caller, id).await?;
        if !self.tasks.delete(id).await? {
            return Err(AppError::TaskNotFound);
        }

        self.logger
            .info(&format!("[Service: DeleteTask] Deleted task {}", id));
        Ok(())
    }

    async fn owned_task(&self, caller: &Payload, id: Uuid) -> Result<Task, AppError> {
        let owner = owner_id(caller)?;
        let task = self
            .tasks
            .find_by_id(id)
            .await?
            .ok_or(AppError::TaskNotFound)?;

        if task.user_id != owner {
            self.logger.warn(&format!(
                "[Service: OwnedTask] User {} asked for task {} owned by someone else",
                owner, id
            ));
            return Err(AppError::UserIdMismatch);
        }
        Ok(task)
    }
}

/// Tokens are only issued for user ids, so a subject that is not a UUID is not a caller.
fn owner_id(caller: &Payload) -> Result<Uuid, AppError> {
    Uuid::parse_str(caller.subject_id()).map_err(|_| AppError::from(AuthError::Unauthorized))
}
