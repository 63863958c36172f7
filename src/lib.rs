//! Gridcast - Main Library
//!
//! Gridcast is a real-time collaborative canvas server. Many clients view and
//! mutate one large shared grid of cells over WebSockets, and every accepted
//! write is fanned out to every connected client, including clients attached to
//! other server processes that share the same backing store.
//!
//! # Module Structure
//!
//! - **`shared`** - Types shared between the server and clients
//!   - `UpdateMessage`, the unit of client input and broadcast output
//!   - Grid geometry and the bit-packed cell codec used to decode snapshots
//!   - Validation and configuration error types
//!
//! - **`backend`** - Server-side code (only compiled with the `ssr` feature)
//!   - Grid store abstraction with Redis and in-memory backends
//!   - Per-session rate limiting, the connection registry and session protocol
//!   - The fanout bridge that drains the shared update channel
//!   - Axum router, server state and startup
//!
//! # Feature Flags
//!
//! - **`ssr`** (default) - Enables the backend modules and the server binary.
//!   Without it only the `shared` types are compiled, which is enough for a
//!   client that needs to decode snapshots and build update messages.
//!
//! # Usage
//!
//! ```rust,no_run
//! use gridcast::shared::{GridGeometry, UpdateMessage};
//!
//! let geometry = GridGeometry::default();
//! let update = UpdateMessage::new(5, 5, 42);
//! assert!(geometry.validate(&update).is_ok());
//! ```

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;
