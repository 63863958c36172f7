//! Real-time Update Module
//!
//! This module moves applied updates from the node that applied them to
//! every client on every node.
//!
//! # Architecture
//!
//! - **`broadcast`** - Publishing applied updates on the update channel
//! - **`bridge`** - Fanout bridge: channel subscription to registry broadcast
//!
//! # Module Structure
//!
//! ```text
//! realtime/
//! ├── mod.rs          - Module exports and documentation
//! ├── broadcast.rs    - publish_update
//! └── bridge.rs       - FanoutBridge
//! ```
//!
//! # Update Path
//!
//! ```text
//! session ──publish──▶ update channel ──▶ FanoutBridge (every node) ──▶ ConnectionRegistry
//! ```
//!
//! Sessions never broadcast locally. With a shared channel (Redis pub/sub)
//! several nodes serve the same grid and all of them see the same updates.
//!
//! # Dependencies
//!
//! - `backend::store::UpdateChannel` - publish/subscribe backend
//! - `backend::session::ConnectionRegistry` - local broadcast target

/// Update publishing
pub mod broadcast;

/// Channel-to-registry fanout
pub mod bridge;

// Re-export commonly used types and functions
pub use bridge::{deliver, FanoutBridge, RESUBSCRIBE_DELAY};
pub use broadcast::publish_update;
