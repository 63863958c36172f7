/**
 * Session Frames
 *
 * The session protocol does not talk to axum or tungstenite directly. Each
 * transport converts its own message type to and from `Frame`, which keeps
 * the protocol loop testable with plain channels.
 *
 * Control frames (ping/pong) never reach the protocol; the transport layer
 * answers or drops them.
 */

use bytes::Bytes;

/// One WebSocket data frame as the session protocol sees it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// UTF-8 text frame: update JSON or an `Error: ...` message
    Text(String),
    /// Binary frame: the packed grid snapshot
    Binary(Bytes),
    /// The peer closed the connection
    Close,
}

impl Frame {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn binary(bytes: impl Into<Bytes>) -> Self {
        Self::Binary(bytes.into())
    }

    /// Payload bytes of a data frame, `None` for `Close`
    pub fn payload(&self) -> Option<&[u8]> {
        match self {
            Self::Text(text) => Some(text.as_bytes()),
            Self::Binary(bytes) => Some(bytes),
            Self::Close => None,
        }
    }

    pub fn is_close(&self) -> bool {
        matches!(self, Self::Close)
    }
}
