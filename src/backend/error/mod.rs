//! Backend Error Module
//!
//! This module defines error types specific to the backend server.
//!
//! # Module Structure
//!
//! ```text
//! error/
//! ├── mod.rs        - Module exports and documentation
//! ├── types.rs      - Error type definitions
//! └── conversion.rs - IntoResponse implementation
//! ```
//!
//! # Error Types
//!
//! - `Grid` - validation failures from `shared::GridError`
//! - `AlreadySet` - write-once violations
//! - `Store` - grid store and update channel failures
//! - `Capacity` - connection registry full
//! - `Transport` - WebSocket read/write failures
//! - `Config` - invalid configuration at startup
//! - `SerializationError` - JSON encoding errors

/// Error type definitions
pub mod types;

/// Error conversion implementations
pub mod conversion;

// Re-export commonly used types
pub use types::BackendError;
