//! Composition root.
//!
//! `main` and the integration tests wire the application through the same two calls:
//! [`build_token_maker`] validates the key, then [`build_services`] hands every component
//! its dependencies and a logger scoped to it.

use std::sync::Arc;

use actix_web::web;
use chrono::Duration;

use crate::auth::{AuthError, SealedTokenMaker, SystemPayloadFactory, TokenMaker};
use crate::config::TokenConfig;
use crate::logging::Logger;
use crate::repositories::{TaskRepository, UserRepository};
use crate::services::{TaskService, UserService};

/// Everything `routes::configure` needs, cheap to clone into each worker.
#[derive(Clone)]
pub struct AppServices {
    pub users: web::Data<UserService>,
    pub tasks: web::Data<TaskService>,
    pub token_maker: Arc<dyn TokenMaker>,
    pub logger: Logger,
}

/// Builds the token maker from configuration.
///
/// Fails with [`AuthError::KeyConfiguration`] when the key is not exactly 32 bytes; the
/// process must not start in that case.
pub fn build_token_maker(
    token: &TokenConfig,
    logger: Logger,
) -> Result<Arc<dyn TokenMaker>, AuthError> {
    let payloads = Arc::new(SystemPayloadFactory::new(
        logger.scoped("tasklane::payload"),
    ));
    let maker = SealedTokenMaker::new(
        token.symmetric_key.as_bytes(),
        payloads,
        logger.scoped("tasklane::token"),
    )?;
    Ok(Arc::new(maker))
}

pub fn build_services(
    token_maker: Arc<dyn TokenMaker>,
    access_token_duration: Duration,
    users: Arc<dyn UserRepository>,
    tasks: Arc<dyn TaskRepository>,
    logger: Logger,
) -> AppServices {
    let user_service = UserService::new(
        users,
        token_maker.clone(),
        access_token_duration,
        logger.scoped("tasklane::users"),
    );
    let task_service = TaskService::new(tasks, logger.scoped("tasklane::tasks"));

    AppServices {
        users: web::Data::new(user_service),
        tasks: web::Data::new(task_service),
        token_maker,
        logger,
    }
}
