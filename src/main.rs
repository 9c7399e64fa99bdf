use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger as AccessLog, App, HttpServer};
use sqlx::postgres::PgPoolOptions;

use tasklane::{
    config::Config,
    logging::Logger,
    repositories::{PgTaskRepository, PgUserRepository},
    routes,
    startup::{build_services, build_token_maker},
};

fn startup_error<E>(logger: Logger, stage: &str, error: E) -> io::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    logger.error(&format!("[Main] {}: {}", stage, error));
    io::Error::new(io::ErrorKind::Other, error)
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();

    let config = Config::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let logger = Logger::init(&config.app_env);

    let token_maker = build_token_maker(&config.token, logger)
        .map_err(|e| startup_error(logger, "Invalid token configuration", e))?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .map_err(|e| startup_error(logger, "Failed to connect to database", e))?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| startup_error(logger, "Failed to run migrations", e))?;

    let repository_logger = logger.scoped("tasklane::repository");
    let services = build_services(
        token_maker,
        config.token.access_token_duration,
        Arc::new(PgUserRepository::new(pool.clone(), repository_logger)),
        Arc::new(PgTaskRepository::new(pool, repository_logger)),
        logger,
    );

    let allowed_origin = config.cors_allowed_origin.clone();
    logger.info(&format!(
        "Starting tasklane server at {}",
        config.server_url()
    ));

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&allowed_origin)
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![header::AUTHORIZATION, header::ACCEPT, header::CONTENT_TYPE])
            .max_age(3600);
        let services = services.clone();

        App::new()
            .wrap(cors)
            .wrap(AccessLog::default())
            .configure(move |cfg| routes::configure(cfg, &services))
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
