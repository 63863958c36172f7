/**
 * Router Configuration
 *
 * This module provides the main router creation function that combines
 * all route configurations into a single Axum router.
 *
 * # Route Order
 *
 * 1. Grid routes (WebSocket upgrade)
 * 2. API routes (health)
 * 3. Fallback service (static client build)
 *
 * Every request passes through `TraceLayer`, so upgrades and static file
 * hits show up under the `tower_http` log target.
 */

use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::routes::grid_routes::configure_grid_routes;
use crate::backend::server::state::AppState;

/// Create the Axum router with all routes configured
///
/// # Arguments
///
/// * `app_state` - Application state shared by every handler
/// * `static_dir` - Directory served for any path no route matches
///
/// # Route Details
///
/// - `GET /ws` - Grid session over WebSocket
/// - `GET /api/health` - Health check
/// - everything else - files under `static_dir` (404 if absent)
pub fn create_router(app_state: AppState, static_dir: &str) -> Router<()> {
    let router = configure_grid_routes(Router::new());
    let router = configure_api_routes(router);

    router
        .fallback_service(ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
