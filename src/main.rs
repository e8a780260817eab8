//! InternHub Server
//!
//! Serves every API route group with permissive-by-default CORS. Configuration
//! comes from the environment (a `.env` file is honoured).

use std::sync::Arc;

use axum::http::HeaderValue;
use dotenv::dotenv;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use internhub_service::{
    api::{AppState, RouterBuilder},
    config::AppConfig,
    database::{run_migrations, DatabaseConfig},
    service::{IdentityProvider, JwtIdentityProvider},
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file if present
    dotenv().ok();

    let config = AppConfig::from_env();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.server.log_level.as_str()),
    )
    .init();

    log::info!("Starting InternHub service v{}", internhub_service::VERSION);

    config.validate()?;
    log::info!("Configuration loaded and validated");

    let database_pool = DatabaseConfig::from(&config.database).create_pool().await?;

    log::info!("Running database migrations...");
    run_migrations(&database_pool).await?;
    log::info!("Database migrations completed");

    let identity: Arc<dyn IdentityProvider> =
        Arc::new(JwtIdentityProvider::from_config(&config.identity)?);
    if config.profile_sync_enabled() {
        log::info!("Display name sync enabled");
    } else {
        log::info!("Display name sync disabled (IDENTITY_PROFILE_SYNC_URL not set)");
    }

    let app_state = AppState::new(database_pool, identity);

    let app = RouterBuilder::with_all_routes().build(app_state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors_layer(&config.server.cors_origins))
            .into_inner(),
    );

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    log::info!("Listening on {}", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.is_empty() || origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                log::warn!("Ignoring invalid CORS origin {}", origin);
                None
            }
        })
        .collect();

    layer.allow_origin(allowed)
}
