//! Grid Store Module
//!
//! The grid itself and the cross-process update channel live outside the
//! server process. This module defines the two seams the rest of the backend
//! talks to, and ships two implementations of both.
//!
//! # Architecture
//!
//! - **`GridStore`** - key-addressed, bit-packed storage: existence check,
//!   idempotent initialization, range reads, single-field reads and an atomic
//!   "write only if the field is still zero" operation.
//! - **`UpdateChannel`** - a named pub/sub topic carrying JSON updates.
//!
//! # Module Structure
//!
//! ```text
//! store/
//! ├── mod.rs     - Traits and StoreError
//! ├── memory.rs  - In-process backend (tests, single-node development)
//! └── redis.rs   - Redis backend (GETRANGE / BITFIELD / PUBLISH / SUBSCRIBE)
//! ```
//!
//! # Error Handling
//!
//! Every operation can fail because the store is remote. Failures surface as
//! `StoreError`; a failed read is never reported as a zero value.

use std::ops::Range;

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use thiserror::Error;

/// In-process backend
pub mod memory;

/// Redis backend
pub mod redis;

pub use memory::MemoryBackend;
pub use self::redis::RedisBackend;

/// Stream of raw payloads received on a subscribed topic
pub type PayloadStream = BoxStream<'static, Vec<u8>>;

/// Errors raised by grid store and channel operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// The Redis server rejected the command or the connection failed
    #[error("store unavailable: {0}")]
    Redis(#[from] ::redis::RedisError),

    /// The key has never been initialized
    #[error("grid key '{0}' does not exist")]
    MissingKey(String),

    /// A field or range falls outside the stored buffer
    #[error("access outside grid buffer at bit {bit_offset} (width {width})")]
    OutOfBounds { bit_offset: u64, width: u32 },

    /// A snapshot came back shorter than the grid
    #[error("snapshot truncated: expected {expected} bytes, got {actual}")]
    Truncated { expected: u64, actual: u64 },

    /// The store answered with something the protocol does not allow
    #[error("unexpected store reply: {0}")]
    UnexpectedReply(String),
}

/// Key-addressed bit-packed grid storage
#[async_trait]
pub trait GridStore: Send + Sync {
    /// Whether `key` currently exists
    async fn exists(&self, key: &str) -> Result<bool, StoreError>;

    /// Ensure a zero-filled buffer of at least `size_in_bits` exists at `key`
    ///
    /// Must not disturb an existing buffer, and must be safe when several
    /// processes call it at once during startup.
    async fn initialize(&self, key: &str, size_in_bits: u64) -> Result<(), StoreError>;

    /// Read the bytes in `range` (half-open)
    async fn read_range(&self, key: &str, range: Range<u64>) -> Result<Vec<u8>, StoreError>;

    /// Read one unsigned field of `width` bits at `bit_offset`
    async fn read_field(&self, key: &str, bit_offset: u64, width: u32) -> Result<u64, StoreError>;

    /// Atomically set the field to `value` if it currently holds zero
    ///
    /// Returns `true` when the write happened, `false` when the field was
    /// already nonzero.
    async fn write_field_if_zero(
        &self,
        key: &str,
        bit_offset: u64,
        width: u32,
        value: u64,
    ) -> Result<bool, StoreError>;
}

/// Shared publish/subscribe channel
#[async_trait]
pub trait UpdateChannel: Send + Sync {
    /// Publish `payload` to every subscriber of `topic`, in every process
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), StoreError>;

    /// Open a standing subscription to `topic`
    ///
    /// The stream ends only when the underlying connection is lost.
    async fn subscribe(&self, topic: &str) -> Result<PayloadStream, StoreError>;
}
