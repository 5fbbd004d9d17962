use std::sync::Arc;

use anyhow::Context;
use axum::{
    http::StatusCode,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod handlers;
mod keygen;
mod lifecycle;
mod registry;
mod snapshot;

use config::AppConfig;
use registry::UrlRegistry;

// ── Shared application state ───────────────────────────────────────────────

pub struct AppState {
    pub registry: UrlRegistry,
    pub config: AppConfig,
}

// ── Router ─────────────────────────────────────────────────────────────────

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::shorten::index))
        // Liveness probe, no body
        .route("/health", get(|| async { StatusCode::OK }))
        .route(
            "/shorten",
            post(handlers::shorten::shorten).fallback(handlers::shorten::method_not_allowed),
        )
        .route("/short/:key", get(handlers::redirect::redirect))
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

// ── Entry point ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present; env vars may already be set
    dotenvy::dotenv().ok();

    // Initialise structured logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "urlshort=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!("Starting urlshort on {}", config.bind_addr());
    tracing::info!("Base URL: {}", config.base_url);

    let registry = UrlRegistry::new();
    lifecycle::hydrate(&registry, &config.snapshot_path);

    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr()))?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    let state = Arc::new(AppState { registry, config });

    lifecycle::serve(
        listener,
        app(state.clone()),
        state,
        lifecycle::shutdown_signal(),
    )
    .await
}
