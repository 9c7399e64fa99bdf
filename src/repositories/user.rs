use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::AppError;
use crate::logging::Logger;
use crate::models::{NewUser, User};

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Stores a new user. Fails with [`AppError::UserAlreadyExists`] when the email is taken.
    async fn create(&self, user: NewUser) -> Result<User, AppError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
}

pub struct PgUserRepository {
    pool: PgPool,
    logger: Logger,
}

impl PgUserRepository {
    pub fn new(pool: PgPool, logger: Logger) -> Self {
        Self { pool, logger }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        self.logger.debug("[Repository: CreateUser] Called");

        sqlx::query_as::<_, User>(
            "INSERT INTO users (first_name, last_name, email, password_hash)
             VALUES ($1, $2, $3, $4)
             RETURNING id, first_name, last_name, email, password_hash, created_at",
        )
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::UserAlreadyExists
            }
            other => {
                self.logger.error(&format!(
                    "[Repository: CreateUser] Failed to create user: {}",
                    other
                ));
                AppError::from(other)
            }
        })
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        self.logger.debug("[Repository: FindUserByEmail] Called");

        let user = sqlx::query_as::<_, User>(
            "SELECT id, first_name, last_name, email, password_hash, created_at
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}
