#![allow(dead_code)]

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::middleware::Logger;
use actix_web::{test, web, App};
use serde_json::json;
use taskkeeper::auth::{
    AccessPolicy, AuthService, LoginResponse, PasswordHasher, RequestAuthenticator, RoutePolicy,
    TokenCodec,
};
use taskkeeper::routes;
use taskkeeper::store::InMemoryCredentialStore;

pub const TEST_SECRET: &[u8] = b"integration_test_secret_32_bytes!";

/// Shared state behind one test application.
#[derive(Clone)]
pub struct TestContext {
    pub auth: web::Data<AuthService>,
    pub authenticator: RequestAuthenticator,
    pub store: Arc<InMemoryCredentialStore>,
    pub codec: Arc<TokenCodec>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_ttl(chrono::Duration::hours(1))
    }

    pub fn with_ttl(ttl: chrono::Duration) -> Self {
        let store = Arc::new(InMemoryCredentialStore::new());
        let codec = Arc::new(TokenCodec::new(TEST_SECRET, ttl));
        let auth = AuthService::new(store.clone(), codec.clone(), PasswordHasher::new(4))
            .expect("Failed to build auth service");
        let authenticator = RequestAuthenticator::new(codec.clone(), store.clone());

        Self {
            auth: web::Data::new(auth),
            authenticator,
            store,
            codec,
        }
    }
}

/// Builds the application exactly as `main` does, minus the database.
pub async fn init_app(
    ctx: &TestContext,
) -> impl Service<
    actix_http::Request,
    Response = ServiceResponse<impl MessageBody>,
    Error = actix_web::Error,
> {
    test::init_service(
        App::new()
            .app_data(ctx.auth.clone())
            .wrap(RoutePolicy::new(AccessPolicy::default()))
            .wrap(ctx.authenticator.clone())
            .wrap(Logger::default())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .configure(routes::config),
    )
    .await
}

pub async fn register_user(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    email: &str,
    password: &str,
) -> actix_web::http::StatusCode {
    let req = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({ "email": email, "password": password }))
        .to_request();
    test::call_service(app, req).await.status()
}

pub async fn login_user(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    email: &str,
    password: &str,
) -> Result<LoginResponse, String> {
    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "email": email, "password": password }))
        .to_request();
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;

    if !status.is_success() {
        return Err(format!(
            "Login failed. Status: {}. Body: {}",
            status,
            String::from_utf8_lossy(&body)
        ));
    }
    serde_json::from_slice(&body).map_err(|e| format!("Failed to parse login response: {}", e))
}
