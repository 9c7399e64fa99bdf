use std::fmt;
use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chacha20poly1305::{
    aead::{Aead, KeyInit, Payload as AeadPayload},
    XChaCha20Poly1305, XNonce,
};
use chrono::Duration;
use rand::{rngs::OsRng, RngCore};

use super::error::AuthError;
use super::factory::PayloadFactory;
use super::payload::Payload;
use crate::logging::Logger;

/// Required length of the symmetric key, in bytes.
pub const KEY_SIZE: usize = 32;

const NONCE_SIZE: usize = 24;
const TAG_SIZE: usize = 16;

/// Fixed prefix of every token. It is authenticated as associated data, so a token cannot
/// be replayed under a different header.
pub const TOKEN_HEADER: &str = "tasklane.v1.";

/// Issues and verifies opaque bearer tokens.
pub trait TokenMaker: Send + Sync {
    /// Mints a payload for `subject_id` valid for `duration` and seals it into a token.
    fn create_token(&self, subject_id: &str, duration: Duration) -> Result<String, AuthError>;

    /// Opens `token` and returns its payload.
    ///
    /// Returns [`AuthError::InvalidToken`] for anything that does not decrypt to a payload
    /// and [`AuthError::ExpiredToken`] for a genuine token past its expiry.
    fn verify_token(&self, token: &str) -> Result<Payload, AuthError>;
}

/// Token maker sealing JSON payloads with XChaCha20-Poly1305.
///
/// Token layout: `tasklane.v1.` followed by the unpadded base64url encoding of
/// `nonce (24 bytes) || ciphertext || tag (16 bytes)`. Every token gets a fresh random
/// nonce, so sealing the same payload twice never yields the same string.
pub struct SealedTokenMaker {
    cipher: XChaCha20Poly1305,
    payloads: Arc<dyn PayloadFactory>,
    logger: Logger,
}

impl SealedTokenMaker {
    /// Builds a maker around `symmetric_key`.
    ///
    /// Fails with [`AuthError::KeyConfiguration`] unless the key is exactly [`KEY_SIZE`]
    /// bytes long; no maker exists until the key is right.
    pub fn new(
        symmetric_key: &[u8],
        payloads: Arc<dyn PayloadFactory>,
        logger: Logger,
    ) -> Result<Self, AuthError> {
        let key_error = || AuthError::KeyConfiguration {
            expected: KEY_SIZE,
            actual: symmetric_key.len(),
        };

        if symmetric_key.len() != KEY_SIZE {
            logger.error(&format!(
                "[TokenMaker: new] Rejected symmetric key of {} bytes",
                symmetric_key.len()
            ));
            return Err(key_error());
        }

        let cipher = XChaCha20Poly1305::new_from_slice(symmetric_key).map_err(|_| key_error())?;

        Ok(Self {
            cipher,
            payloads,
            logger,
        })
    }

    fn seal(&self, payload: &Payload) -> Result<String, AuthError> {
        let plaintext =
            serde_json::to_vec(payload).map_err(|e| AuthError::Seal(e.to_string()))?;

        let mut nonce = [0u8; NONCE_SIZE];
        OsRng.try_fill_bytes(&mut nonce)?;

        let sealed = self
            .cipher
            .encrypt(
                XNonce::from_slice(&nonce),
                AeadPayload {
                    msg: &plaintext,
                    aad: TOKEN_HEADER.as_bytes(),
                },
            )
            .map_err(|_| AuthError::Seal("encryption failed".into()))?;

        let mut raw = Vec::with_capacity(NONCE_SIZE + sealed.len());
        raw.extend_from_slice(&nonce);
        raw.extend_from_slice(&sealed);

        Ok(format!("{}{}", TOKEN_HEADER, URL_SAFE_NO_PAD.encode(raw)))
    }

    // Every failure collapses into InvalidToken.
    fn open(&self, token: &str) -> Result<Payload, AuthError> {
        let body = token
            .strip_prefix(TOKEN_HEADER)
            .ok_or(AuthError::InvalidToken)?;

        let raw = URL_SAFE_NO_PAD
            .decode(body)
            .map_err(|_| AuthError::InvalidToken)?;
        if raw.len() < NONCE_SIZE + TAG_SIZE {
            return Err(AuthError::InvalidToken);
        }

        let (nonce, sealed) = raw.split_at(NONCE_SIZE);
        let plaintext = self
            .cipher
            .decrypt(
                XNonce::from_slice(nonce),
                AeadPayload {
                    msg: sealed,
                    aad: TOKEN_HEADER.as_bytes(),
                },
            )
            .map_err(|_| AuthError::InvalidToken)?;

        serde_json::from_slice(&plaintext).map_err(|_| AuthError::InvalidToken)
    }
}

impl TokenMaker for SealedTokenMaker {
    fn create_token(&self, subject_id: &str, duration: Duration) -> Result<String, AuthError> {
        let payload = self.payloads.create(subject_id, duration)?;
        let token = self.seal(&payload)?;
        self.logger.debug(&format!(
            "[TokenMaker: create_token] Issued token {}",
            payload.id()
        ));
        Ok(token)
    }

    fn verify_token(&self, token: &str) -> Result<Payload, AuthError> {
        let payload = self.open(token).map_err(|e| {
            self.logger
                .debug("[TokenMaker: verify_token] Token could not be opened");
            e
        })?;

        self.payloads.is_valid(&payload).map_err(|e| {
            self.logger.debug(&format!(
                "[TokenMaker: verify_token] Token {} rejected: {}",
                payload.id(),
                e
            ));
            e
        })?;

        Ok(payload)
    }
}

// Key material stays out of debug output.
impl fmt::Debug for SealedTokenMaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SealedTokenMaker").finish_non_exhaustive()
    }
}
