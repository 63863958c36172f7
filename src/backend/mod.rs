//! Backend Module
//!
//! This module contains all server-side code for Gridcast. It provides an
//! Axum HTTP server that hosts grid sessions over WebSockets and keeps every
//! node sharing a backend in sync through a pub/sub update channel.
//!
//! This module is only compiled when the `ssr` feature is enabled.
//!
//! # Architecture
//!
//! The backend is organized into focused submodules:
//!
//! - **`store`** - `GridStore` and `UpdateChannel` traits, Redis and in-memory backends
//! - **`canvas`** - The shared grid: snapshot, cell reads, write-once updates
//! - **`session`** - Rate limiter, connection registry, session protocol, `/ws` handler
//! - **`realtime`** - Update publishing and the fanout bridge
//! - **`server`** - Configuration, application state, initialization
//! - **`routes`** - HTTP route configuration and router assembly
//! - **`error`** - Backend-specific error types
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── main.rs         - Server binary
//! ├── store/          - Grid store and update channel
//! ├── canvas/         - Grid operations
//! ├── session/        - Per-connection protocol
//! ├── realtime/       - Publish and fanout
//! ├── server/         - Server initialization and state
//! ├── routes/         - Route configuration
//! └── error/          - Error types
//! ```
//!
//! # Grid Layout
//!
//! The grid is one bit string in the store: 1000 x 1000 cells of 16 bits,
//! row-major, most significant bit first. Cell `(row, col)` starts at bit
//! `(row * 1000 + col) * 16`. A cell value of 0 means empty; values above 0
//! are emoji indices up to 1644.
//!
//! # Update Flow
//!
//! ```text
//! client A ──{"row","col","value"}──▶ session A
//!     session A: rate limit, validate, write-if-empty, publish
//! update channel ──▶ fanout bridge (every node) ──▶ every session ──▶ every client
//! ```
//!
//! # Thread Safety
//!
//! - The grid lives in the store; sessions hold no grid state
//! - `ConnectionRegistry` guards membership with a mutex that is never held
//!   across an `.await`
//! - Each session has its own rate limiter and a single socket writer task
//!
//! # Error Handling
//!
//! - `BackendError` for everything the backend can fail with
//! - Protocol errors go back to the client as `Error: ...` text frames
//! - Startup errors propagate to `main` with `?`

/// Grid store and update channel backends
pub mod store;

/// Shared grid operations
pub mod canvas;

/// Per-connection session handling
pub mod session;

/// Real-time update publishing and fanout
pub mod realtime;

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Backend error types
pub mod error;

/// Re-export commonly used types
pub use canvas::Canvas;
pub use error::BackendError;
pub use server::{create_app, AppState};
pub use session::ConnectionRegistry;
