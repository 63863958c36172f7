//! Route Configuration Module
//!
//! This module configures all HTTP routes for the backend server.
//! Routes are organized by functionality into focused submodules.
//!
//! # Architecture
//!
//! - **`router`** - Main router creation and route assembly
//! - **`grid_routes`** - WebSocket grid sessions
//! - **`api_routes`** - JSON API endpoints (health)
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs          - Module exports and documentation
//! ├── router.rs       - Main router creation
//! ├── grid_routes.rs  - GET /ws
//! └── api_routes.rs   - GET /api/health
//! ```
//!
//! # Route Organization
//!
//! 1. **Grid Routes** - `GET /ws`
//! 2. **API Routes** - `GET /api/health`
//! 3. **Fallback** - static client build from `STATIC_DIR`
//!
//! # Dependencies
//!
//! - `backend::server::state` - Application state
//! - `backend::session` - WebSocket upgrade handler

/// Main router creation
pub mod router;

/// Grid session routes
pub mod grid_routes;

/// API endpoint handlers
pub mod api_routes;

// Re-export commonly used functions
pub use router::create_router;
