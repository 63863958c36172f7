/**
 * Application State Management
 *
 * This module defines the application state structure and implements
 * the necessary `FromRef` traits for Axum state extraction.
 *
 * # Architecture
 *
 * The `AppState` struct serves as the central state container for the
 * application, holding:
 * - The canvas (grid store, key and geometry)
 * - The connection registry of live sessions
 * - The update channel and topic applied updates are published on
 * - The per-session rate limit
 *
 * # Thread Safety
 *
 * Every field is cheap to clone and safe to share:
 * - `Canvas` wraps an `Arc<dyn GridStore>`
 * - `Arc<ConnectionRegistry>` guards membership with its own mutex
 * - `Arc<dyn UpdateChannel>` is `Send + Sync` by trait bound
 *
 * # State Extraction
 *
 * The `FromRef` implementations allow Axum handlers to extract specific
 * parts of the state without needing the entire `AppState`.
 */

use std::sync::Arc;

use axum::extract::FromRef;

use crate::backend::canvas::Canvas;
use crate::backend::session::{ConnectionRegistry, RateLimiterConfig};
use crate::backend::store::UpdateChannel;

/// Application state shared by every handler and session
#[derive(Clone)]
pub struct AppState {
    /// The shared grid
    pub canvas: Canvas,

    /// Live sessions that receive broadcast updates
    pub registry: Arc<ConnectionRegistry>,

    /// Channel applied updates are published on
    pub channel: Arc<dyn UpdateChannel>,

    /// Topic on `channel` carrying grid updates
    pub topic: String,

    /// Token bucket settings for each new session
    pub rate_limit: RateLimiterConfig,
}

impl FromRef<AppState> for Arc<ConnectionRegistry> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.registry.clone()
    }
}

impl FromRef<AppState> for Canvas {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.canvas.clone()
    }
}
