/**
 * Backend Error Types
 *
 * This module defines the error type used across the backend: grid updates,
 * session management and startup all return `BackendError`.
 *
 * # Error Categories
 *
 * ## Protocol Errors
 *
 * Raised while handling one client frame. They are reported back to the
 * offending client as an `Error: ...` text frame and the session continues:
 * - out-of-range row, column or value (`Grid`)
 * - write to a cell that already holds a value (`AlreadySet`)
 *
 * ## Store Errors
 *
 * The grid store or update channel failed. Reported to the client for writes,
 * logged for publishes, fatal during startup.
 *
 * ## Startup Errors
 *
 * Invalid configuration or an unreachable backend. `main` returns these and
 * the process exits.
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::backend::store::StoreError;
use crate::shared::{ConfigError, GridError};

/// Backend-specific error types
///
/// The `Display` text of the protocol variants is exactly what clients see
/// after the `Error: ` prefix.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Update failed validation
    #[error(transparent)]
    Grid(#[from] GridError),

    /// Write-once policy: the cell already holds a nonzero value
    #[error("value already set")]
    AlreadySet {
        /// Row of the rejected write
        row: i64,
        /// Column of the rejected write
        col: i64,
    },

    /// Grid store or update channel failure
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The connection registry is at its configured limit
    #[error("server is full ({limit} sessions)")]
    Capacity {
        /// Configured maximum number of sessions
        limit: usize,
    },

    /// A WebSocket read or write failed
    #[error("transport error: {message}")]
    Transport {
        /// Human-readable error message
        message: String,
    },

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl BackendError {
    /// Create a write-once violation for `(row, col)`
    pub fn already_set(row: i64, col: i64) -> Self {
        Self::AlreadySet { row, col }
    }

    /// Create a capacity error
    pub fn capacity(limit: usize) -> Self {
        Self::Capacity { limit }
    }

    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Whether the error is the client's fault rather than the server's
    pub fn is_protocol_error(&self) -> bool {
        matches!(self, Self::Grid(_) | Self::AlreadySet { .. })
    }

    /// Get the HTTP status code for this error
    ///
    /// # Status Code Mapping
    ///
    /// - `Grid` - 400 Bad Request
    /// - `AlreadySet` - 409 Conflict
    /// - `Store`, `Capacity` - 503 Service Unavailable
    /// - everything else - 500 Internal Server Error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Grid(_) => StatusCode::BAD_REQUEST,
            Self::AlreadySet { .. } => StatusCode::CONFLICT,
            Self::Store(_) | Self::Capacity { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::Transport { .. } | Self::Config(_) | Self::SerializationError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get the error message
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Text of the error frame sent to the client that caused it
    pub fn client_frame(&self) -> String {
        format!("Error: {}", self)
    }
}
