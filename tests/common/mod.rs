#![allow(dead_code)]

use std::cmp::Ordering;
use std::sync::{Arc, Mutex};

use actix_web::{
    body::{to_bytes, MessageBody},
    dev::{Service, ServiceResponse},
    http::{header, StatusCode},
    test,
};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tasklane::{
    config::TokenConfig,
    error::AppError,
    logging::Logger,
    models::{NewUser, SortOrder, Task, TaskChanges, TaskListQuery, TaskSortBy, User},
    repositories::{TaskRepository, UserRepository},
    startup::{build_services, build_token_maker, AppServices},
};
use uuid::Uuid;

pub const TEST_KEY: &str = "12345678901234567890123456789012";
pub const PASSWORD: &str = "password123";
pub const BOUNDARY: &str = "----tasklane-test-boundary";

/// User store backed by a vector; emails are unique like the real table.
#[derive(Default)]
pub struct InMemoryUsers {
    users: Mutex<Vec<User>>,
}

impl InMemoryUsers {
    pub fn by_email(&self, email: &str) -> Option<User> {
        let users = self.users.lock().unwrap();
        users.iter().find(|user| user.email == email).cloned()
    }
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|existing| existing.email == user.email) {
            return Err(AppError::UserAlreadyExists);
        }

        let stored = User {
            id: Uuid::new_v4(),
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        users.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self.by_email(email))
    }
}

/// Task store mirroring the filtering, ordering and paging of the SQL implementation.
#[derive(Default)]
pub struct InMemoryTasks {
    tasks: Mutex<Vec<Task>>,
}

impl InMemoryTasks {
    pub fn len(&self) -> usize {
        self.tasks.lock().unwrap().len()
    }
}

/// Overwrites every field present in `changes`, like the SQL `COALESCE` update.
fn apply(task: &mut Task, changes: TaskChanges) {
    if let Some(title) = changes.title {
        task.title = title;
    }
    if let Some(description) = changes.description {
        task.description = Some(description);
    }
    if let Some(status) = changes.status {
        task.status = status;
    }
    if let Some(date) = changes.date {
        task.date = date;
    }
    if let Some(image) = changes.image {
        task.image = Some(image);
    }
}

fn status_rank(task: &Task) -> u8 {
    task.status as u8
}

fn compare(a: &Task, b: &Task, query: &TaskListQuery) -> Ordering {
    let primary = match query.sort_by {
        TaskSortBy::Title => a.title.cmp(&b.title),
        TaskSortBy::CreatedAt => a.created_at.cmp(&b.created_at),
        TaskSortBy::Status => status_rank(a).cmp(&status_rank(b)),
        TaskSortBy::Date => a.date.cmp(&b.date),
    };
    let primary = match query.order {
        SortOrder::Asc => primary,
        SortOrder::Desc => primary.reverse(),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

#[async_trait]
impl TaskRepository for InMemoryTasks {
    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn create(&self, task: Task) -> Result<Task, AppError> {
        self.tasks.lock().unwrap().push(task.clone());
        Ok(task)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, AppError> {
        let tasks = self.tasks.lock().unwrap();
        Ok(tasks.iter().find(|task| task.id == id).cloned())
    }

    async fn list(
        &self,
        user_id: Uuid,
        query: &TaskListQuery,
    ) -> Result<(i64, Vec<Task>), AppError> {
        let tasks = self.tasks.lock().unwrap();
        let needle = query.search_term().map(str::to_lowercase);

        let mut matching: Vec<Task> = tasks
            .iter()
            .filter(|task| task.user_id == user_id)
            .filter(|task| match &needle {
                None => true,
                Some(needle) => {
                    task.title.to_lowercase().contains(needle)
                        || task
                            .description
                            .as_deref()
                            .map(|d| d.to_lowercase().contains(needle))
                            .unwrap_or(false)
                }
            })
            .cloned()
            .collect();
        matching.sort_by(|a, b| compare(a, b, query));

        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .collect();
        Ok((total, page))
    }

    async fn update(&self, id: Uuid, changes: TaskChanges) -> Result<Option<Task>, AppError> {
        let mut tasks = self.tasks.lock().unwrap();
        Ok(tasks.iter_mut().find(|task| task.id == id).map(|task| {
            apply(task, changes);
            task.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tasks = self.tasks.lock().unwrap();
        let before = tasks.len();
        tasks.retain(|task| task.id != id);
        Ok(tasks.len() < before)
    }
}

pub struct TestApp {
    pub services: AppServices,
    pub users: Arc<InMemoryUsers>,
    pub tasks: Arc<InMemoryTasks>,
}

pub fn test_app() -> TestApp {
    test_app_with_duration(Duration::minutes(15))
}

pub fn test_app_with_duration(access_token_duration: Duration) -> TestApp {
    let logger = Logger::init("test");
    let token_config = TokenConfig {
        symmetric_key: TEST_KEY.to_string(),
        access_token_duration,
    };
    let token_maker = build_token_maker(&token_config, logger).expect("test key is 32 bytes");

    let users = Arc::new(InMemoryUsers::default());
    let tasks = Arc::new(InMemoryTasks::default());
    let services = build_services(
        token_maker,
        access_token_duration,
        users.clone(),
        tasks.clone(),
        logger,
    );

    TestApp {
        services,
        users,
        tasks,
    }
}

/// Calls the service and renders errors the way the HTTP dispatcher would, since
/// middleware rejections come back as `Err` rather than as responses.
pub async fn send<S, B>(app: &S, req: actix_http::Request) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, body) = match app.call(req).await {
        Ok(resp) => (resp.status(), test::read_body(resp).await),
        Err(err) => {
            let resp = err.error_response();
            (resp.status(), to_bytes(resp.into_body()).await.unwrap())
        }
    };
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

pub async fn register<S, B>(app: &S, email: &str) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/v1/users")
        .set_json(json!({
            "first_name": "Ada",
            "last_name": "Lovelace",
            "email": email,
            "password": PASSWORD
        }))
        .to_request();
    send(app, req).await
}

pub async fn login<S, B>(app: &S, email: &str, password: &str) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/v1/users/login")
        .set_json(json!({ "email": email, "password": password }))
        .to_request();
    send(app, req).await
}

/// Registers `email` and returns a bearer token for it.
pub async fn token_for<S, B>(app: &S, email: &str) -> String
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, body) = register(app, email).await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);

    let (status, body) = login(app, email, PASSWORD).await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    body["token"]
        .as_str()
        .expect("login response carries a token")
        .to_string()
}

pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
}

/// One part of a hand-built `multipart/form-data` body.
pub enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a [u8]),
}

pub fn multipart_body(parts: &[Part]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name)
                        .as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File(name, filename, bytes) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                        name, filename
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_content_type() -> (header::HeaderName, String) {
    (
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={}", BOUNDARY),
    )
}
