/**
 * Redis Grid Backend
 *
 * Production implementation of `GridStore` and `UpdateChannel`. The grid is a
 * single Redis string manipulated with bit commands:
 *
 * - `EXISTS` / `SETBIT key <last-bit> 0` for idempotent initialization
 * - `GETRANGE` for snapshots
 * - `BITFIELD GET u16` for single-cell reads
 * - a Lua script running `BITFIELD GET` + `BITFIELD SET` for the atomic
 *   write-if-empty
 *
 * Updates travel over Redis pub/sub so that every server process attached
 * to the same Redis sees every accepted write.
 */
use std::ops::Range;

use ::redis::aio::MultiplexedConnection;
use ::redis::{Client, Script};
use async_trait::async_trait;
use futures_util::StreamExt;

use crate::backend::store::{GridStore, PayloadStream, StoreError, UpdateChannel};

/// Compare-and-set on one bitfield. KEYS[1] = grid key, ARGV = type, offset, value.
const SET_IF_EMPTY: &str = r#"
local current = redis.call('BITFIELD', KEYS[1], 'GET', ARGV[1], ARGV[2])[1]
if current ~= 0 then
  return 0
end
redis.call('BITFIELD', KEYS[1], 'SET', ARGV[1], ARGV[2], ARGV[3])
return 1
"#;

/// Redis-backed grid store and pub/sub channel
#[derive(Clone)]
pub struct RedisBackend {
    client: Client,
    conn: MultiplexedConnection,
    set_if_empty: Script,
}

impl RedisBackend {
    /// Connect to Redis at `url`
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = Client::open(url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        tracing::info!("[Store] Connected to Redis");
        Ok(Self {
            client,
            conn,
            set_if_empty: Script::new(SET_IF_EMPTY),
        })
    }
}

/// BITFIELD type name for an unsigned field
fn field_type(width: u32) -> String {
    format!("u{width}")
}

#[async_trait]
impl GridStore for RedisBackend {
    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let count: i64 = ::redis::cmd("EXISTS").arg(key).query_async(&mut conn).await?;
        Ok(count > 0)
    }

    async fn initialize(&self, key: &str, size_in_bits: u64) -> Result<(), StoreError> {
        if size_in_bits == 0 || self.exists(key).await? {
            return Ok(());
        }
        // Clearing the last bit allocates a zeroed string and never clobbers
        // a buffer another process created in the meantime
        let mut conn = self.conn.clone();
        let _previous: i64 = ::redis::cmd("SETBIT")
            .arg(key)
            .arg(size_in_bits - 1)
            .arg(0)
            .query_async(&mut conn)
            .await?;
        tracing::info!(key, size_in_bits, "[Store] Initialized grid");
        Ok(())
    }

    async fn read_range(&self, key: &str, range: Range<u64>) -> Result<Vec<u8>, StoreError> {
        if range.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.conn.clone();
        let bytes: Vec<u8> = ::redis::cmd("GETRANGE")
            .arg(key)
            .arg(range.start)
            .arg(range.end - 1)
            .query_async(&mut conn)
            .await?;
        Ok(bytes)
    }

    async fn read_field(&self, key: &str, bit_offset: u64, width: u32) -> Result<u64, StoreError> {
        let mut conn = self.conn.clone();
        let values: Vec<i64> = ::redis::cmd("BITFIELD")
            .arg(key)
            .arg("GET")
            .arg(field_type(width))
            .arg(bit_offset)
            .query_async(&mut conn)
            .await?;
        let value = values
            .first()
            .copied()
            .ok_or_else(|| StoreError::UnexpectedReply("no value returned".to_string()))?;
        u64::try_from(value).map_err(|_| StoreError::UnexpectedReply(format!("negative field value {value}")))
    }

    async fn write_field_if_zero(
        &self,
        key: &str,
        bit_offset: u64,
        width: u32,
        value: u64,
    ) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let mut invocation = self.set_if_empty.key(key);
        invocation.arg(field_type(width)).arg(bit_offset).arg(value);
        let applied: i64 = invocation.invoke_async(&mut conn).await?;
        Ok(applied == 1)
    }
}

#[async_trait]
impl UpdateChannel for RedisBackend {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let receivers: i64 = ::redis::cmd("PUBLISH")
            .arg(topic)
            .arg(payload)
            .query_async(&mut conn)
            .await?;
        tracing::trace!(topic, receivers, "[Store] Published update");
        Ok(())
    }

    async fn subscribe(&self, topic: &str) -> Result<PayloadStream, StoreError> {
        // Pub/sub needs a dedicated connection; the multiplexed one keeps
        // serving commands
        let mut pubsub = self.client.get_async_pubsub().await?;
        pubsub.subscribe(topic).await?;
        tracing::info!(topic, "[Store] Subscribed to update channel");
        let stream = pubsub
            .into_on_message()
            .map(|msg| msg.get_payload_bytes().to_vec());
        Ok(Box::pin(stream))
    }
}
