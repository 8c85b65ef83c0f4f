//! Bot wizard HTTP Server
//!
//! Axum-based server that walks users through the five-step bot setup
//! conversation and creates paper trading bots from the offered variants.

mod config;
mod handlers;
mod state;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ServerConfig;
use crate::handlers::{chat_handler, create_bot, get_conversation, health_check, list_strategies};
use crate::state::AppState;

/// Build the router around the given state
pub fn app(state: AppState, config: &ServerConfig) -> Router {
    let router = Router::new()
        // Health & info
        .route("/health", get(health_check))
        .route("/api/strategies", get(list_strategies))
        // Wizard API
        .route("/api/chat", post(chat_handler))
        .route("/api/conversations/{id}", get(get_conversation))
        .route("/api/bots", post(create_bot));

    let router = if config.cors_allow_any {
        router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        router
    };

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();
    let tables = config.load_tables()?;
    match &config.tables_path {
        Some(path) => tracing::info!("✓ Wizard tables loaded from {}", path.display()),
        None => tracing::info!("✓ Using built-in wizard tables"),
    }
    for strategy in tables.strategies.iter() {
        tracing::info!("  • {} (min ${})", strategy.display_name, strategy.min_capital);
    }
    if !config.cors_allow_any {
        tracing::warn!("⚠ CORS disabled - browser clients on other origins will be refused");
    }

    let state = AppState::new(tables);
    let app = app(state, &config);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 bot wizard running on http://{}", config.bind_addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health                  - Health check");
    tracing::info!("  GET  /api/strategies          - Strategy catalog");
    tracing::info!("  POST /api/chat                - Send message");
    tracing::info!("  GET  /api/conversations/{{id}}  - Stored conversation");
    tracing::info!("  POST /api/bots                - Deploy a bot option");
    tracing::info!("");

    axum::serve(listener, app).await?;

    Ok(())
}
