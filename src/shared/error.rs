//! Shared Error Types
//!
//! This module defines error types that are shared between the server and
//! clients. They cover the failures that can be detected without touching the
//! grid store: malformed frames and out-of-range writes.
//!
//! # Error Categories
//!
//! - `SerializationError` - JSON serialization/deserialization failures
//! - `InvalidCell` - Row or column outside the grid
//! - `ValueOutOfRange` - Value outside `[0, V_max]`
//!
//! The `Display` text of the validation variants is what a client sees in an
//! `Error: ...` text frame, so it is kept short.
//!
//! # Usage
//!
//! ```rust
//! use gridcast::shared::error::GridError;
//!
//! let error = GridError::invalid_cell(-1, 4);
//! assert_eq!(error.to_string(), "invalid row or column");
//! ```
use thiserror::Error;

/// Errors detected while decoding or validating an update
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GridError {
    /// JSON serialization or deserialization error
    #[error("Serialization error: {message}")]
    SerializationError {
        /// Human-readable error message
        message: String,
    },

    /// Row or column is outside `[0, N)`
    #[error("invalid row or column")]
    InvalidCell {
        /// Requested row
        row: i64,
        /// Requested column
        col: i64,
    },

    /// Value is outside `[0, V_max]`
    #[error("value out of range for emoji list")]
    ValueOutOfRange {
        /// Requested value
        value: i64,
        /// Largest accepted value
        max: u64,
    },
}

impl GridError {
    /// Create a new serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }

    /// Create a new invalid cell error
    pub fn invalid_cell(row: i64, col: i64) -> Self {
        Self::InvalidCell { row, col }
    }

    /// Create a new value range error
    pub fn value_out_of_range(value: i64, max: u64) -> Self {
        Self::ValueOutOfRange { value, max }
    }
}

impl From<serde_json::Error> for GridError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(format!("JSON error: {}", err))
    }
}
