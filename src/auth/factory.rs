use chrono::{DateTime, Duration, Utc};
use rand::{rngs::OsRng, RngCore};
use uuid::{Builder, Uuid};

use super::error::AuthError;
use super::payload::Payload;
use crate::logging::Logger;

/// Mints payloads and decides whether a decoded payload is still acceptable.
///
/// The token maker depends on this trait rather than on [`Payload`] directly so that
/// tests can swap the validity rule without touching the cipher.
pub trait PayloadFactory: Send + Sync {
    /// Creates a payload for `subject_id` that expires `duration` after now.
    ///
    /// A non-positive `duration` produces a payload that is already expired. An expiry
    /// past the representable range saturates at the calendar's bound.
    fn create(&self, subject_id: &str, duration: Duration) -> Result<Payload, AuthError>;

    fn is_valid(&self, payload: &Payload) -> Result<(), AuthError> {
        payload.valid()
    }
}

/// The production factory: ids from the OS CSPRNG, timestamps from the system clock.
#[derive(Debug, Clone)]
pub struct SystemPayloadFactory {
    logger: Logger,
}

impl SystemPayloadFactory {
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }

    fn random_id() -> Result<Uuid, AuthError> {
        let mut bytes = [0u8; 16];
        OsRng.try_fill_bytes(&mut bytes)?;
        Ok(Builder::from_random_bytes(bytes).into_uuid())
    }
}

impl PayloadFactory for SystemPayloadFactory {
    fn create(&self, subject_id: &str, duration: Duration) -> Result<Payload, AuthError> {
        let id = Self::random_id().map_err(|e| {
            self.logger
                .error(&format!("[PayloadFactory: create] Failed to generate token id: {}", e));
            e
        })?;

        let issued_at = Utc::now();
        let expires_at = expiry(issued_at, duration);

        self.logger
            .debug(&format!("[PayloadFactory: create] Created payload {}", id));
        Ok(Payload::new(id, subject_id.to_string(), issued_at, expires_at))
    }
}

fn expiry(issued_at: DateTime<Utc>, duration: Duration) -> DateTime<Utc> {
    match issued_at.checked_add_signed(duration) {
        Some(expires_at) => expires_at,
        None if duration > Duration::zero() => DateTime::<Utc>::MAX_UTC,
        None => DateTime::<Utc>::MIN_UTC,
    }
}
