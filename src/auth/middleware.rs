use std::sync::Arc;

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{self, HeaderValue},
    Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use super::error::AuthError;
use super::token::TokenMaker;
use crate::error::AppError;
use crate::logging::Logger;

/// Case-insensitive scheme expected in front of the token.
pub const AUTHORIZATION_TYPE_BEARER: &str = "bearer";

/// Extracts the token from an `authorization` header value.
///
/// The header must contain at least two whitespace-separated fields, the first of which
/// is `bearer` in any letter case. Fields after the token are ignored.
pub fn parse_bearer_token(value: Option<&HeaderValue>) -> Result<&str, AuthError> {
    // Only a zero-length value counts as missing; whitespace alone is a malformed header.
    let value = match value {
        Some(value) if !value.is_empty() => value,
        _ => return Err(AuthError::AuthHeaderMissing),
    };

    let value = value
        .to_str()
        .map_err(|_| AuthError::AuthHeaderFormatInvalid)?;

    let mut fields = value.split_whitespace();
    let (scheme, token) = match (fields.next(), fields.next()) {
        (Some(scheme), Some(token)) => (scheme, token),
        _ => return Err(AuthError::AuthHeaderFormatInvalid),
    };

    if !scheme.eq_ignore_ascii_case(AUTHORIZATION_TYPE_BEARER) {
        return Err(AuthError::AuthHeaderMissingBearer);
    }

    Ok(token)
}

/// Gates a scope behind a valid bearer token.
///
/// On success the verified [`Payload`](super::Payload) is inserted into the request
/// extensions, where [`VerifiedPayload`](super::VerifiedPayload) picks it up. On failure the
/// wrapped service is never called and the client receives `401` with the failure's code.
#[derive(Clone)]
pub struct AuthMiddleware {
    token_maker: Arc<dyn TokenMaker>,
    logger: Logger,
}

impl AuthMiddleware {
    pub fn new(token_maker: Arc<dyn TokenMaker>, logger: Logger) -> Self {
        Self {
            token_maker,
            logger,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            token_maker: self.token_maker.clone(),
            logger: self.logger,
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    token_maker: Arc<dyn TokenMaker>,
    logger: Logger,
}

impl<S> AuthMiddlewareService<S> {
    fn authorize(&self, req: &ServiceRequest) -> Result<(), AuthError> {
        let token = parse_bearer_token(req.headers().get(header::AUTHORIZATION))?;
        let payload = self.token_maker.verify_token(token)?;

        self.logger.debug(&format!(
            "[Middleware: AuthMiddleware] Token {} verified for {} {}",
            payload.id(),
            req.method(),
            req.path()
        ));
        req.extensions_mut().insert(payload);
        Ok(())
    }
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match self.authorize(&req) {
            Ok(()) => Box::pin(self.service.call(req)),
            Err(auth_err) => {
                self.logger.error(&format!(
                    "[Middleware: AuthMiddleware] Rejected {} {}: {}",
                    req.method(),
                    req.path(),
                    auth_err
                ));
                let error = Error::from(AppError::from(auth_err));
                Box::pin(async move { Err(error) })
            }
        }
    }
}
