/**
 * API Route Handlers
 *
 * This module defines the JSON API endpoints.
 *
 * # Routes
 *
 * - `GET /api/health` - Liveness and current session count
 */

use std::sync::Arc;

use axum::{extract::State, Json, Router};
use serde::Serialize;

use crate::backend::server::state::AppState;
use crate::backend::session::ConnectionRegistry;

/// Health check response body
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub sessions: usize,
}

/// Handle health check (GET /api/health)
///
/// # Example Response
///
/// ```json
/// {"status":"ok","sessions":3}
/// ```
pub async fn health(State(registry): State<Arc<ConnectionRegistry>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        sessions: registry.len(),
    })
}

/// Configure API routes
///
/// This function adds the following routes to the router:
/// - `GET /api/health` - Health check
pub fn configure_api_routes(router: Router<AppState>) -> Router<AppState> {
    router.route("/api/health", axum::routing::get(health))
}
