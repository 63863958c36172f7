//! Shared Module
//!
//! This module contains types and data structures that are shared between
//! the server and its clients. Nothing in here depends on the async runtime,
//! so it compiles without the `ssr` feature.

/// Update message exchanged over WebSockets and the pub/sub channel
pub mod update;

/// Grid geometry and bit-packed cell codec
pub mod grid;

/// Shared error types
pub mod error;

/// Server configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use update::UpdateMessage;
pub use grid::{CellAddress, GridGeometry, BITS_PER_CELL, GRID_SIZE, MAX_CELL_VALUE};
pub use error::GridError;
pub use config::{ConfigError, ServerConfig, ServerConfigBuilder};
