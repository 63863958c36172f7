/**
 * Server Initialization
 *
 * This module handles the initialization and setup of the Axum HTTP server,
 * including backend connection, grid initialization, the fanout bridge and
 * route configuration.
 *
 * # Initialization Process
 *
 * 1. Connect the backend (Redis, or in-memory without `REDIS_URL`)
 * 2. Make sure the packed grid exists, zero-filled if new
 * 3. Subscribe the fanout bridge to the update topic
 * 4. Create and configure the router
 *
 * Any failure in steps 1-3 stops startup: a node that cannot read the grid
 * or hear updates must not accept clients.
 */

use std::sync::Arc;

use axum::Router;

use crate::backend::canvas::Canvas;
use crate::backend::error::BackendError;
use crate::backend::realtime::FanoutBridge;
use crate::backend::routes::router::create_router;
use crate::backend::server::config::{connect_backend, Backend};
use crate::backend::server::state::AppState;
use crate::backend::session::{ConnectionRegistry, RateLimiterConfig};
use crate::shared::ServerConfig;

/// Build the application state on an already connected backend
///
/// Initializes the grid and starts the fanout bridge. The bridge task runs
/// for the life of the runtime.
pub async fn create_state(config: &ServerConfig, backend: Backend) -> Result<AppState, BackendError> {
    let canvas = Canvas::new(backend.store, config.grid_key.clone(), config.geometry);
    canvas.initialize().await?;
    tracing::info!(
        key = %config.grid_key,
        size = config.geometry.size,
        bytes = config.geometry.byte_len(),
        "Grid initialized"
    );

    let registry = Arc::new(ConnectionRegistry::new(config.max_sessions));

    FanoutBridge::new(backend.channel.clone(), config.channel.clone(), registry.clone())
        .start()
        .await?;

    Ok(AppState {
        canvas,
        registry,
        channel: backend.channel,
        topic: config.channel.clone(),
        rate_limit: RateLimiterConfig::from(config),
    })
}

/// Create and configure the Axum application
///
/// # Errors
///
/// Returns `BackendError` if the backend is unreachable, the grid cannot be
/// initialized or the update topic cannot be subscribed.
pub async fn create_app(config: &ServerConfig) -> Result<Router<()>, BackendError> {
    tracing::info!("Initializing grid server");

    let backend = connect_backend(config).await?;
    let state = create_state(config, backend).await?;

    let app = create_router(state, &config.static_dir);
    tracing::info!(static_dir = %config.static_dir, "Router configured");

    Ok(app)
}
