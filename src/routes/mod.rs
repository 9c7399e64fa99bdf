pub mod health;
pub mod tasks;
pub mod users;

use actix_multipart::form::MultipartFormConfig;
use actix_web::web;

use crate::auth::AuthMiddleware;
use crate::error::AppError;
use crate::startup::AppServices;

/// Upper bound for a whole multipart task form.
const MAX_FORM_SIZE: usize = 10 * 1024 * 1024;

/// Registers every `/api/v1` route, the services they use, and the extractor error
/// handlers that turn malformed input into structured [`AppError`]s.
///
/// Everything under `/api/v1/tasks` sits behind [`AuthMiddleware`].
pub fn configure(cfg: &mut web::ServiceConfig, services: &AppServices) {
    cfg.app_data(services.users.clone())
        .app_data(services.tasks.clone())
        .app_data(
            web::JsonConfig::default()
                .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
        )
        .app_data(
            web::QueryConfig::default()
                .error_handler(|err, _req| AppError::InvalidQuery(err.to_string()).into()),
        )
        .app_data(
            web::PathConfig::default()
                .error_handler(|err, _req| AppError::InvalidPath(err.to_string()).into()),
        )
        .app_data(
            MultipartFormConfig::default()
                .total_limit(MAX_FORM_SIZE)
                .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
        )
        .service(
            web::scope("/api/v1")
                .service(health::health)
                .service(
                    web::scope("/users")
                        .service(users::register)
                        .service(users::login),
                )
                .service(
                    web::scope("/tasks")
                        .wrap(AuthMiddleware::new(
                            services.token_maker.clone(),
                            services.logger.scoped("tasklane::middleware"),
                        ))
                        .service(tasks::list_tasks)
                        .service(tasks::create_task)
                        .service(tasks::get_task)
                        .service(tasks::update_task)
                        .service(tasks::delete_task),
                ),
        );
}
