/**
 * Update Message
 *
 * This module defines the UpdateMessage struct, the unit of both client
 * input and broadcast output. The same JSON shape travels in three places:
 * inbound WebSocket frames, payloads on the shared pub/sub channel, and
 * outbound update frames.
 *
 * ```json
 * {"row": 5, "col": 5, "value": 42}
 * ```
 */
use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::shared::error::GridError;

/// A single cell write: `(row, col, value)`
///
/// Coordinates and value are kept as signed 64-bit integers so that a client
/// sending `-1` gets a bounds error from validation instead of a parse error.
/// Integers too large for `i64` saturate for the same reason. Fractional
/// numbers are rejected. All three fields are required when deserializing.
///
/// # Example
/// ```rust
/// use gridcast::shared::UpdateMessage;
///
/// let update = UpdateMessage::from_slice(br#"{"row":1,"col":2,"value":3}"#).unwrap();
/// assert_eq!(update, UpdateMessage::new(1, 2, 3));
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct UpdateMessage {
    /// Row index, valid range `[0, N)`
    #[serde(deserialize_with = "saturating_integer")]
    pub row: i64,
    /// Column index, valid range `[0, N)`
    #[serde(deserialize_with = "saturating_integer")]
    pub col: i64,
    /// Cell value, valid range `[0, V_max]`
    #[serde(deserialize_with = "saturating_integer")]
    pub value: i64,
}

/// Accept any integral JSON number, clamped to the `i64` range
fn saturating_integer<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    struct SaturatingVisitor;

    impl<'de> Visitor<'de> for SaturatingVisitor {
        type Value = i64;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("an integer")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<i64, E> {
            Ok(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<i64, E> {
            Ok(i64::try_from(v).unwrap_or(i64::MAX))
        }

        // Literals beyond u64 arrive as floats
        fn visit_f64<E: de::Error>(self, v: f64) -> Result<i64, E> {
            if v.is_finite() && v.fract() == 0.0 {
                Ok(v as i64)
            } else {
                Err(E::invalid_type(de::Unexpected::Float(v), &self))
            }
        }
    }

    deserializer.deserialize_any(SaturatingVisitor)
}

impl UpdateMessage {
    pub fn new(row: i64, col: i64, value: i64) -> Self {
        Self { row, col, value }
    }

    /// Parse an update from a raw frame or channel payload
    pub fn from_slice(payload: &[u8]) -> Result<Self, GridError> {
        Ok(serde_json::from_slice(payload)?)
    }

    /// Encode the update as the JSON text sent to clients and the channel
    pub fn to_json(&self) -> Result<String, GridError> {
        Ok(serde_json::to_string(self)?)
    }
}
