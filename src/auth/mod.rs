//! Authenticated sessions.
//!
//! Login mints a [`Payload`] through a [`PayloadFactory`] and seals it with a [`TokenMaker`].
//! Protected scopes are wrapped in [`AuthMiddleware`], which opens the bearer token and
//! stores the payload in the request extensions for [`VerifiedPayload`] to hand out.

pub mod error;
pub mod extractors;
pub mod factory;
pub mod middleware;
pub mod password;
pub mod payload;
pub mod token;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use validator::Validate;

// Re-export necessary items
pub use error::AuthError;
pub use extractors::{get_verified_payload, VerifiedPayload};
pub use factory::{PayloadFactory, SystemPayloadFactory};
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use payload::Payload;
pub use token::{SealedTokenMaker, TokenMaker};

lazy_static! {
    // Letters (any script), spaces, apostrophes, dots and hyphens
    static ref NAME_REGEX: regex::Regex = regex::Regex::new(r"^[\p{L}][\p{L} .'-]*$").unwrap();
}

/// Represents the payload for a user login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    /// Must be at least 8 characters long.
    #[validate(length(min = 8))]
    pub password: String,
}

/// Represents the payload for a new user registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(
        length(min = 1, max = 100),
        regex(path = "NAME_REGEX", message = "First name must only contain letters")
    )]
    pub first_name: String,
    #[validate(
        length(min = 1, max = 100),
        regex(path = "NAME_REGEX", message = "Last name must only contain letters")
    )]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    /// Must be at least 8 characters long.
    #[validate(length(min = 8))]
    pub password: String,
}

/// Response returned by a successful login.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Opaque bearer token for the `authorization` header.
    pub token: String,
}
