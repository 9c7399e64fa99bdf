use std::sync::Arc;

use actix_web::web;
use chrono::Duration;

use crate::auth::{
    hash_password, verify_password, LoginRequest, LoginResponse, RegisterRequest, TokenMaker,
};
use crate::error::AppError;
use crate::logging::Logger;
use crate::models::{NewUser, UserResponse};
use crate::repositories::UserRepository;

/// Registration and login.
pub struct UserService {
    users: Arc<dyn UserRepository>,
    token_maker: Arc<dyn TokenMaker>,
    access_token_duration: Duration,
    logger: Logger,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        token_maker: Arc<dyn TokenMaker>,
        access_token_duration: Duration,
        logger: Logger,
    ) -> Self {
        Self {
            users,
            token_maker,
            access_token_duration,
            logger,
        }
    }

    /// Stores a new account. The caller is expected to have validated `request`.
    pub async fn register(&self, request: RegisterRequest) -> Result<UserResponse, AppError> {
        self.logger.debug("[Service: RegisterUser] Called");

        let password = request.password;
        // bcrypt blocks; run it on the blocking pool.
        let password_hash = web::block(move || hash_password(&password))
            .await
            .map_err(|e| AppError::InternalServerError(e.to_string()))?
            .map_err(|e| {
                self.logger
                    .error(&format!("[Service: RegisterUser] Failed to hash password: {}", e));
                e
            })?;

        let user = self
            .users
            .create(NewUser {
                first_name: request.first_name,
                last_name: request.last_name,
                email: request.email,
                password_hash,
            })
            .await?;

        self.logger
            .info(&format!("[Service: RegisterUser] Registered user {}", user.id));
        Ok(UserResponse::from(user))
    }

    /// Checks the credentials and issues an access token for the user's id.
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AppError> {
        self.logger.debug("[Service: LoginUser] Called");

        let user = self
            .users
            .find_by_email(&request.email)
            .await?
            .ok_or(AppError::UserNotFound)?;

        let password = request.password;
        let password_hash = user.password_hash.clone();
        let matches = web::block(move || verify_password(&password, &password_hash))
            .await
            .map_err(|e| AppError::InternalServerError(e.to_string()))??;
        if !matches {
            self.logger.warn(&format!(
                "[Service: LoginUser] Wrong password for user {}",
                user.id
            ));
            return Err(AppError::PasswordIncorrect);
        }

        let token = self
            .token_maker
            .create_token(&user.id.to_string(), self.access_token_duration)?;

        self.logger
            .info(&format!("[Service: LoginUser] Issued token for user {}", user.id));
        Ok(LoginResponse { token })
    }
}
