//! gut-diary server entry point.
//!
//! Starts the Axum HTTP server with the REST endpoints.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use gut_diary::api;
use gut_diary::app_state::AppState;
use gut_diary::config::DiaryConfig;
use gut_diary::persistence::{DiaryStore, MemoryStore, PostgresStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    if json_logs {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    // Load configuration
    let config = DiaryConfig::from_env().context("invalid configuration")?;
    tracing::info!(
        addr = %config.listen_addr,
        production = config.is_production(),
        timezone = %config.timezone,
        "starting gut-diary"
    );

    // Build persistence layer
    let store: Arc<dyn DiaryStore> = if config.persistence_enabled {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await
            .context("failed to connect to PostgreSQL")?;
        let store = PostgresStore::new(pool);
        store.migrate().await.context("failed to run migrations")?;
        tracing::info!("using PostgreSQL store");
        Arc::new(store)
    } else {
        tracing::warn!("persistence disabled, entries are kept in memory only");
        Arc::new(MemoryStore::new())
    };

    // Build application state
    let app_state = AppState::new(&config, store);

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
