//! Session Module
//!
//! Everything that happens on one client connection, plus the registry that
//! ties the live connections together.
//!
//! # Architecture
//!
//! - **`frame`** - Transport-neutral frame type
//! - **`rate_limiter`** - Per-session token bucket (slow mode by delay)
//! - **`registry`** - Set of live sessions used for broadcast
//! - **`protocol`** - Session lifecycle and per-frame update handling
//! - **`handlers`** - Axum WebSocket upgrade and message conversion
//!
//! # Module Structure
//!
//! ```text
//! session/
//! ├── mod.rs          - Module exports and documentation
//! ├── frame.rs        - Frame enum
//! ├── rate_limiter.rs - Token bucket
//! ├── registry.rs     - ConnectionRegistry
//! ├── protocol.rs     - run_session
//! └── handlers.rs     - GET /ws
//! ```
//!
//! # Data Flow
//!
//! ```text
//! client ──frame──▶ rate limiter ──▶ parse ──▶ canvas.update ──▶ publish
//!                                      │             │
//!                                   (logged)   Error: ... frame
//!
//! fanout bridge ──▶ registry.broadcast ──▶ session queue ──▶ writer ──▶ client
//! ```

/// Transport-neutral frame type
pub mod frame;

/// Token bucket rate limiter
pub mod rate_limiter;

/// Live session registry
pub mod registry;

/// Session protocol
pub mod protocol;

/// WebSocket upgrade handler
pub mod handlers;

// Re-export commonly used types
pub use frame::Frame;
pub use handlers::handle_ws_upgrade;
pub use protocol::{run_session, SessionPhase, SessionStats};
pub use rate_limiter::{RateLimiter, RateLimiterConfig};
pub use registry::{ConnectionRegistry, SessionHandle, SessionId, OUTBOUND_QUEUE_CAPACITY};
