use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use taskkeeper::auth::{
    AccessPolicy, AuthService, PasswordHasher, RequestAuthenticator, RoutePolicy, TokenCodec,
};
use taskkeeper::config::Config;
use taskkeeper::routes;
use taskkeeper::store::{CredentialStore, PgCredentialStore};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().context("failed to load configuration")?;
    log::info!(
        "Configuration loaded (token ttl {}s, bcrypt cost {})",
        config.auth.token_ttl.num_seconds(),
        config.auth.bcrypt_cost
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .context("failed to connect to database")?;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("failed to run database migrations")?;
    log::info!("Database ready");

    let store: Arc<dyn CredentialStore> = Arc::new(PgCredentialStore::new(pool));
    let codec = TokenCodec::from_config(&config.auth);
    let auth_service = web::Data::new(AuthService::new(
        Arc::clone(&store),
        Arc::clone(&codec),
        PasswordHasher::new(config.auth.bcrypt_cost),
    )?);
    let authenticator = RequestAuthenticator::new(codec, store);

    log::info!("Starting taskkeeper server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .app_data(auth_service.clone())
            // Registered inner-first: the authenticator runs before the policy.
            .wrap(RoutePolicy::new(AccessPolicy::default()))
            .wrap(authenticator.clone())
            .wrap(Logger::default())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .configure(routes::config)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await?;

    Ok(())
}
