use actix_web::dev::Payload as RequestBody;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};
use std::ops::Deref;

use super::error::AuthError;
use super::payload::Payload;

/// Returns the payload `AuthMiddleware` attached to this request.
///
/// This is the only way handlers learn who is calling; a subject id sent in a request body
/// is never trusted. Fails with [`AuthError::Unauthorized`] when the middleware did not run.
pub fn get_verified_payload(req: &HttpRequest) -> Result<Payload, AuthError> {
    req.extensions()
        .get::<Payload>()
        .cloned()
        .ok_or(AuthError::Unauthorized)
}

/// Extracts the verified token payload from request extensions.
///
/// Intended for routes wrapped by `AuthMiddleware`. If the payload is missing the request
/// is rejected with `401` and code `1008`.
#[derive(Debug, Clone)]
pub struct VerifiedPayload(pub Payload);

impl VerifiedPayload {
    pub fn into_inner(self) -> Payload {
        self.0
    }
}

impl Deref for VerifiedPayload {
    type Target = Payload;

    fn deref(&self) -> &Payload {
        &self.0
    }
}

impl FromRequest for VerifiedPayload {
    type Error = ActixError; // AppError is converted into ActixError via ResponseError
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut RequestBody) -> Self::Future {
        let result: Result<Self, ActixError> = get_verified_payload(req)
            .map(VerifiedPayload)
            .map_err(|e| crate::error::AppError::from(e).into());
        ready(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::factory::{PayloadFactory, SystemPayloadFactory};
    use crate::logging::Logger;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use chrono::Duration;

    #[actix_rt::test]
    async fn test_verified_payload_extractor_success() {
        let payload = SystemPayloadFactory::new(Logger::root())
            .create("user-123", Duration::minutes(5))
            .unwrap();

        let req = test::TestRequest::default().to_http_request();
        req.extensions_mut().insert(payload.clone());

        let mut body = RequestBody::None;
        let extracted = VerifiedPayload::from_request(&req, &mut body).await;
        assert!(extracted.is_ok());

        let extracted = extracted.unwrap();
        assert_eq!(extracted.subject_id(), "user-123");
        assert_eq!(extracted.into_inner(), payload);
    }

    #[actix_rt::test]
    async fn test_verified_payload_extractor_failure() {
        let req = test::TestRequest::default().to_http_request();
        // No payload inserted into extensions

        let mut body = RequestBody::None;
        let extracted = VerifiedPayload::from_request(&req, &mut body).await;
        assert!(extracted.is_err());

        let response = extracted.unwrap_err().error_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[::core::prelude::v1::test]
    fn test_wrong_type_in_extensions_is_unauthorized() {
        let req = test::TestRequest::default().to_http_request();
        req.extensions_mut().insert("user-123".to_string());

        assert!(matches!(
            get_verified_payload(&req),
            Err(AuthError::Unauthorized)
        ));
    }
}
