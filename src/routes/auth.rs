use crate::{
    auth::{
        AuthService, AuthenticatedContext, LoginRequest, LoginResponse, RegisterRequest,
        RegisterResponse,
    },
    error::AppError,
};
use actix_web::{get, post, web, HttpResponse, Responder};
use serde_json::json;
use validator::Validate;

/// Register a new user
///
/// Served at both `/auth/register` and `/auth/new-user`. Hashes the password
/// and stores the account; a taken email answers 409.
pub async fn register(
    auth: web::Data<AuthService>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;
    let RegisterRequest {
        email,
        password,
        name,
    } = register_data.into_inner();

    let user = auth.register(&email, &password, name).await?;

    Ok(HttpResponse::Ok().json(RegisterResponse {
        message: "User registered successfully".to_string(),
        user_id: user.id,
        email: user.email,
    }))
}

/// Login user
///
/// Verifies the credentials and returns a bearer token. Unknown email and
/// wrong password produce the same 401.
#[post("/login")]
pub async fn login(
    auth: web::Data<AuthService>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;

    let issued = auth.login(&login_data.email, &login_data.password).await?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        token: issued.token,
        token_type: "Bearer".to_string(),
        expires_in: issued.expires_in,
    }))
}

/// Current principal
///
/// Returns the user and authorities bound to the request's bearer token.
#[get("/me")]
pub async fn me(context: AuthenticatedContext) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "id": context.user.id,
        "email": context.user.email,
        "name": context.user.name,
        "authorities": context.authorities,
    }))
}
