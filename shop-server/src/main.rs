//! shop-server — multi-tenant shop ordering backend
//!
//! Long-running service that:
//! - Manages shops (tenants), their catalogs, tags, and customer accounts
//! - Builds orders with immutable catalog snapshots and guarded stock
//! - Drives per-shop configurable order status flows (JWT authenticated)

mod api;
mod auth;
mod config;
mod db;
mod error;
mod logger;
mod pricing;
mod state;
mod tasks;
mod validation;

use config::Config;
use state::AppState;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    logger::init();

    let config = Config::from_env()?;

    tracing::info!("Starting shop-server (env: {})", config.environment);

    // Connect, migrate, build state
    let state = AppState::new(&config).await?;

    tasks::spawn_cleanup(state.pool.clone());

    let app = api::router(state, &config.base_path, &config.allowed_origins);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("shop-server listening on {addr}{}", config.base_path);

    axum::serve(listener, app).await?;

    Ok(())
}
