//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application,
//! together with the stable numeric [`ErrorCode`]s clients use to tell failures apart.
//!
//! `AppError` implements `actix_web::error::ResponseError`, so every handler, extractor
//! and middleware failure renders as
//!
//! ```json
//! { "error": { "code": 1001, "message": "token has expired" } }
//! ```
//!
//! Validation failures additionally carry a `details` object. Internal failures are logged
//! server-side and reach the client only as the generic code `5000`.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt;
use validator::ValidationErrors;

use crate::auth::AuthError;

/// Stable, machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "u16")]
pub enum ErrorCode {
    TokenExpired = 1001,
    TokenInvalid = 1002,
    AuthHeaderMissing = 1004,
    AuthHeaderFormatInvalid = 1005,
    AuthHeaderMissingBearer = 1006,
    UserIdMismatch = 1007,
    Unauthorized = 1008,

    InvalidRequestBody = 2001,
    InvalidFieldFormat = 2003,
    InvalidQueryRequestParam = 2005,
    InvalidRequestParam = 2006,
    HashPassword = 2007,
    ConvertFileToBase64 = 2008,
    OpenFileContext = 2009,

    TaskNotFound = 3001,

    UserNotFound = 4001,
    PasswordIncorrect = 4002,
    UserAlreadyExists = 4003,

    InternalServerError = 5000,
}

impl ErrorCode {
    pub fn as_u16(self) -> u16 {
        self as u16
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> u16 {
        code.as_u16()
    }
}

/// Represents all possible errors that can occur within the application.
///
/// Each variant maps to exactly one [`ErrorCode`] and one HTTP status.
#[derive(Debug)]
pub enum AppError {
    /// Token issuance/verification or bearer-header failure.
    Auth(AuthError),
    /// The authenticated caller does not own the requested resource (HTTP 401).
    UserIdMismatch,
    /// The request body could not be read or deserialized (HTTP 400).
    BadRequest(String),
    /// A query-string parameter could not be parsed (HTTP 400).
    InvalidQuery(String),
    /// A path parameter could not be parsed (HTTP 400).
    InvalidPath(String),
    /// Input failed field-level validation (HTTP 422).
    ValidationError(ValidationErrors),
    /// An uploaded image could not be opened (HTTP 400).
    ImageOpen(String),
    /// An uploaded image could not be encoded (HTTP 400).
    ImageEncode(String),
    /// Password hashing failed (HTTP 500).
    HashPassword(String),
    TaskNotFound,
    UserNotFound,
    PasswordIncorrect,
    UserAlreadyExists,
    /// Errors originating from `sqlx` (HTTP 500).
    DatabaseError(String),
    /// Any other unexpected server-side error (HTTP 500).
    InternalServerError(String),
}

impl AppError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Auth(err) => match err {
                AuthError::ExpiredToken => ErrorCode::TokenExpired,
                AuthError::InvalidToken => ErrorCode::TokenInvalid,
                AuthError::AuthHeaderMissing => ErrorCode::AuthHeaderMissing,
                AuthError::AuthHeaderFormatInvalid => ErrorCode::AuthHeaderFormatInvalid,
                AuthError::AuthHeaderMissingBearer => ErrorCode::AuthHeaderMissingBearer,
                AuthError::Unauthorized => ErrorCode::Unauthorized,
                AuthError::KeyConfiguration { .. } | AuthError::Entropy(_) | AuthError::Seal(_) => {
                    ErrorCode::InternalServerError
                }
            },
            AppError::UserIdMismatch => ErrorCode::UserIdMismatch,
            AppError::BadRequest(_) => ErrorCode::InvalidRequestBody,
            AppError::InvalidQuery(_) => ErrorCode::InvalidQueryRequestParam,
            AppError::InvalidPath(_) => ErrorCode::InvalidRequestParam,
            AppError::ValidationError(_) => ErrorCode::InvalidFieldFormat,
            AppError::ImageOpen(_) => ErrorCode::OpenFileContext,
            AppError::ImageEncode(_) => ErrorCode::ConvertFileToBase64,
            AppError::HashPassword(_) => ErrorCode::HashPassword,
            AppError::TaskNotFound => ErrorCode::TaskNotFound,
            AppError::UserNotFound => ErrorCode::UserNotFound,
            AppError::PasswordIncorrect => ErrorCode::PasswordIncorrect,
            AppError::UserAlreadyExists => ErrorCode::UserAlreadyExists,
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                ErrorCode::InternalServerError
            }
        }
    }

    /// The message shown to clients. Server-side failures never leak their cause.
    fn public_message(&self) -> String {
        match self {
            AppError::Auth(err) if err.is_client_error() => err.to_string(),
            AppError::Auth(_)
            | AppError::HashPassword(_)
            | AppError::DatabaseError(_)
            | AppError::InternalServerError(_) => "internal server error".to_string(),
            AppError::UserIdMismatch => {
                "user id of this task does not match with your account".to_string()
            }
            AppError::BadRequest(msg) => format!("invalid request body: {}", msg),
            AppError::InvalidQuery(msg) => format!("invalid query request param: {}", msg),
            AppError::InvalidPath(msg) => format!("invalid request param: {}", msg),
            AppError::ValidationError(_) => "invalid field format".to_string(),
            AppError::ImageOpen(_) => "failed to open file context".to_string(),
            AppError::ImageEncode(_) => "failed to convert file header to base64".to_string(),
            AppError::TaskNotFound => "task not found".to_string(),
            AppError::UserNotFound => "user not found".to_string(),
            AppError::PasswordIncorrect => "password is incorrect".to_string(),
            AppError::UserAlreadyExists => "user already exists".to_string(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Auth(err) => write!(f, "Auth: {}", err),
            AppError::UserIdMismatch => write!(f, "Unauthorized: user id mismatch"),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::InvalidQuery(msg) => write!(f, "Invalid Query: {}", msg),
            AppError::InvalidPath(msg) => write!(f, "Invalid Path: {}", msg),
            AppError::ValidationError(errors) => write!(f, "Validation Error: {}", errors),
            AppError::ImageOpen(msg) => write!(f, "Image Open: {}", msg),
            AppError::ImageEncode(msg) => write!(f, "Image Encode: {}", msg),
            AppError::HashPassword(msg) => write!(f, "Hash Password: {}", msg),
            AppError::TaskNotFound => write!(f, "Not Found: task"),
            AppError::UserNotFound => write!(f, "Not Found: user"),
            AppError::PasswordIncorrect => write!(f, "Unauthorized: password is incorrect"),
            AppError::UserAlreadyExists => write!(f, "Conflict: user already exists"),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
        }
    }
}

/// Converts `AppError` variants into `HttpResponse` objects.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Auth(err) if err.is_client_error() => StatusCode::UNAUTHORIZED,
            AppError::UserIdMismatch | AppError::PasswordIncorrect => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_)
            | AppError::InvalidQuery(_)
            | AppError::InvalidPath(_)
            | AppError::ImageOpen(_)
            | AppError::ImageEncode(_) => StatusCode::BAD_REQUEST,
            AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::TaskNotFound | AppError::UserNotFound => StatusCode::NOT_FOUND,
            AppError::UserAlreadyExists => StatusCode::CONFLICT,
            AppError::Auth(_)
            | AppError::HashPassword(_)
            | AppError::DatabaseError(_)
            | AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!(target: "tasklane::error", "{}", self);
        }

        let mut body = json!({
            "code": self.code(),
            "message": self.public_message(),
        });
        if let AppError::ValidationError(errors) = self {
            body["details"] = serde_json::to_value(errors).unwrap_or(Value::Null);
        }

        HttpResponse::build(status).json(json!({ "error": body }))
    }
}

impl From<AuthError> for AppError {
    fn from(error: AuthError) -> AppError {
        AppError::Auth(error)
    }
}

/// Converts `sqlx::Error` into `AppError::DatabaseError`.
///
/// Not-found cases are decided by the repositories, which query with `fetch_optional`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        AppError::DatabaseError(error.to_string())
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> AppError {
        AppError::ValidationError(errors)
    }
}

/// Converts `bcrypt::BcryptError` into `AppError::HashPassword`.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::HashPassword(error.to_string())
    }
}
