//! Tradepost server - customer and order CRM API.
//!
//! # Architecture
//!
//! - Axum web framework, JSON request/response bodies
//! - `SQLite` via sqlx for persistence (schema ensured at startup)
//! - tracing for structured logs
//!
//! Configuration comes from `TRADEPOST_*` environment variables; see
//! [`tradepost_server::config`].

#![cfg_attr(not(test), forbid(unsafe_code))]

use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tradepost_server::{config::Config, db, routes, state::AppState};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config = Config::from_env().expect("Failed to load configuration");

    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tradepost_server=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let pool = db::create_pool(&config.database_url)
        .await
        .expect("Failed to create database pool");
    tracing::info!("Database pool created");

    db::schema::ensure_schema(&pool)
        .await
        .expect("Failed to ensure database schema");

    let addr = config.socket_addr();
    let state = AppState::new(config, pool);

    let app = routes::router()
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    tracing::info!("tradepost-server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .await
        .expect("Server error");
}
