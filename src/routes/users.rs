use crate::{
    auth::{LoginRequest, RegisterRequest},
    error::AppError,
    services::UserService,
};
use actix_web::{post, web, HttpResponse, Responder};
use validator::Validate;

/// Register a new user
///
/// ## Responses:
/// - `201 Created`: `{id, first_name, last_name, email}`.
/// - `409 Conflict` (`4003`): the email is already registered.
/// - `422 Unprocessable Entity` (`2003`): field validation failed.
#[post("")]
pub async fn register(
    users: web::Data<UserService>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;

    let user = users.register(register_data.into_inner()).await?;
    Ok(HttpResponse::Created().json(user))
}

/// Login user
///
/// Returns `{"token": "..."}` for the `authorization: Bearer` header. Unknown emails fail
/// with `4001`, wrong passwords with `4002`.
#[post("/login")]
pub async fn login(
    users: web::Data<UserService>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;

    let response = users.login(login_data.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}
