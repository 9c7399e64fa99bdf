use thiserror::Error;

/// Failures of token issuance, verification and bearer-header presentation.
///
/// Request-time variants are converted into `AppError::Auth` and rendered as
/// `401 Unauthorized` with a distinct numeric code. `KeyConfiguration` only happens while
/// building the token maker and aborts startup.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The token could not be decoded, decrypted or parsed. Carries no detail.
    #[error("token is invalid")]
    InvalidToken,

    #[error("token has expired")]
    ExpiredToken,

    /// No verified payload was attached to the request.
    #[error("unauthorized: token payload is invalid")]
    Unauthorized,

    #[error("authorization header is not provided")]
    AuthHeaderMissing,

    #[error("invalid authorization header format")]
    AuthHeaderFormatInvalid,

    #[error("authorization header must start with bearer")]
    AuthHeaderMissingBearer,

    #[error("invalid key size: must be exactly {expected} bytes, got {actual}")]
    KeyConfiguration { expected: usize, actual: usize },

    #[error("failed to draw secure random bytes: {0}")]
    Entropy(#[from] rand::Error),

    #[error("failed to seal token: {0}")]
    Seal(String),
}

impl AuthError {
    /// Whether the failure is the client's (401) rather than ours (500).
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            AuthError::KeyConfiguration { .. } | AuthError::Entropy(_) | AuthError::Seal(_)
        )
    }
}
