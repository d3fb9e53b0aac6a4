pub mod auth;
pub mod health;

use actix_web::{error::JsonPayloadError, web, HttpRequest};

use crate::error::AppError;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config()).service(health::health).service(
        web::scope("/auth")
            .route("/register", web::post().to(auth::register))
            .route("/new-user", web::post().to(auth::register))
            .service(auth::login)
            .service(auth::me),
    );
}

/// Body extraction settings; malformed or incomplete JSON answers 400 with
/// the usual `{"error": ...}` body.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(16 * 1024)
        .error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
            AppError::BadRequest(err.to_string()).into()
        })
}
