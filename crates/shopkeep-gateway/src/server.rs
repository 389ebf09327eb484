// SPDX-FileCopyrightText: 2026 Shopkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use shopkeep_agent::{CatalogService, ChatOrchestrator};
use shopkeep_core::{PluginAdapter, ShopError};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::handlers;

/// Room for multipart framing and text fields on top of the image itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Health state for the unauthenticated health endpoint.
#[derive(Clone)]
pub struct HealthState {
    /// Process start time for uptime calculation.
    pub start_time: std::time::Instant,
    /// Adapters whose health is reported.
    pub adapters: Vec<Arc<dyn PluginAdapter>>,
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub orchestrator: Arc<ChatOrchestrator>,
    pub catalog: Arc<CatalogService>,
    /// Default number of turns returned by the history endpoint.
    pub history_limit: usize,
    pub health: HealthState,
}

/// Gateway server configuration (mirrors `GatewayConfig` and `MediaConfig`).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Directory stored images are served from.
    pub media_root: PathBuf,
    /// URL prefix the media directory is mounted at.
    pub public_prefix: String,
    /// Largest accepted image upload in bytes.
    pub max_upload_bytes: usize,
}

/// Builds the application router.
///
/// Routes:
/// - GET /health
/// - POST /v1/chat, POST /v1/chat/image
/// - GET /v1/history
/// - GET|POST /v1/products, POST /v1/products/filter, GET /v1/products/retrieve
/// - GET {public_prefix}/* (stored images)
pub fn build_router(config: &ServerConfig, state: GatewayState) -> Router {
    let upload_limit = DefaultBodyLimit::max(config.max_upload_bytes + MULTIPART_OVERHEAD);

    let api_routes = Router::new()
        .route("/v1/chat", post(handlers::post_chat))
        .route(
            "/v1/chat/image",
            post(handlers::post_chat_image).layer(upload_limit.clone()),
        )
        .route("/v1/history", get(handlers::get_history))
        .route(
            "/v1/products",
            get(handlers::get_products).post(handlers::post_product).layer(upload_limit),
        )
        .route("/v1/products/filter", post(handlers::post_filter_products))
        .route("/v1/products/retrieve", get(handlers::get_retrieve_products))
        .route("/health", get(handlers::get_health))
        .with_state(state);

    let prefix = normalized_prefix(&config.public_prefix);
    Router::new()
        .merge(api_routes)
        .nest_service(&prefix, ServeDir::new(&config.media_root))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Start the gateway HTTP server and serve until Ctrl-C.
pub async fn start_server(config: &ServerConfig, state: GatewayState) -> Result<(), ShopError> {
    let app = build_router(config, state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ShopError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("Gateway server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ShopError::Internal(format!("gateway server error: {e}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

/// `"/media/"` and `"media"` both mount at `"/media"`.
fn normalized_prefix(prefix: &str) -> String {
    format!("/{}", prefix.trim_matches('/'))
}
