use actix_web::{get, web, HttpResponse, Responder};

use crate::{error::AppError, services::TaskService};

/// Health check endpoint
///
/// Pings the store and returns `{"status": "Healthy", "timestamp": ...}`.
#[get("/health")]
pub async fn health(tasks: web::Data<TaskService>) -> Result<impl Responder, AppError> {
    let response = tasks.health_check().await?;
    Ok(HttpResponse::Ok().json(response))
}
