use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::AuthError;

/// The claims sealed inside a session token.
///
/// A payload is minted once by a [`PayloadFactory`](super::factory::PayloadFactory) and
/// never mutated afterwards; the copy returned by token verification is a fresh value
/// decoded from the token bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    id: Uuid,
    subject_id: String,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl Payload {
    pub(crate) fn new(
        id: Uuid,
        subject_id: String,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            subject_id,
            issued_at,
            expires_at,
        }
    }

    /// Unique identifier of this issuance.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Identifier of the authenticated principal.
    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Fails with [`AuthError::ExpiredToken`] once the current time is past `expires_at`.
    pub fn valid(&self) -> Result<(), AuthError> {
        self.valid_at(Utc::now())
    }

    pub(crate) fn valid_at(&self, now: DateTime<Utc>) -> Result<(), AuthError> {
        if now > self.expires_at {
            return Err(AuthError::ExpiredToken);
        }
        Ok(())
    }
}
