/**
 * In-Memory Grid Backend
 *
 * A process-local implementation of both `GridStore` and `UpdateChannel`.
 * Grids are plain byte buffers and topics are `tokio::sync::broadcast`
 * channels. Cloning a `MemoryBackend` shares the same buffers and topics,
 * so two `AppState`s built from clones of one backend behave like two server
 * processes attached to the same Redis.
 *
 * Used when no `REDIS_URL` is configured and throughout the test suite.
 */
use std::collections::HashMap;
use std::ops::Range;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

use crate::backend::store::{GridStore, PayloadStream, StoreError, UpdateChannel};
use crate::shared::grid::{read_bits, write_bits};

/// Per-topic buffer; subscribers that fall further behind than this lag
const TOPIC_CAPACITY: usize = 1024;

#[derive(Default)]
struct Inner {
    grids: Mutex<HashMap<String, Vec<u8>>>,
    topics: Mutex<HashMap<String, broadcast::Sender<Vec<u8>>>>,
}

/// Shared in-process grid store and pub/sub channel
#[derive(Clone, Default)]
pub struct MemoryBackend {
    inner: Arc<Inner>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn grids(&self) -> MutexGuard<'_, HashMap<String, Vec<u8>>> {
        self.inner.grids.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn topic(&self, topic: &str) -> broadcast::Sender<Vec<u8>> {
        let mut topics = self.inner.topics.lock().unwrap_or_else(PoisonError::into_inner);
        topics
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(TOPIC_CAPACITY).0)
            .clone()
    }

    /// Number of live subscriptions on `topic`
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topic(topic).receiver_count()
    }
}

#[async_trait]
impl GridStore for MemoryBackend {
    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.grids().contains_key(key))
    }

    async fn initialize(&self, key: &str, size_in_bits: u64) -> Result<(), StoreError> {
        let len = size_in_bits.div_ceil(8) as usize;
        let mut grids = self.grids();
        let buffer = grids.entry(key.to_string()).or_default();
        // Grow like SETBIT would; existing bytes are never touched
        if buffer.len() < len {
            buffer.resize(len, 0);
        }
        Ok(())
    }

    async fn read_range(&self, key: &str, range: Range<u64>) -> Result<Vec<u8>, StoreError> {
        let grids = self.grids();
        let buffer = grids
            .get(key)
            .ok_or_else(|| StoreError::MissingKey(key.to_string()))?;
        let end = (range.end as usize).min(buffer.len());
        let start = (range.start as usize).min(end);
        Ok(buffer[start..end].to_vec())
    }

    async fn read_field(&self, key: &str, bit_offset: u64, width: u32) -> Result<u64, StoreError> {
        let grids = self.grids();
        let buffer = grids
            .get(key)
            .ok_or_else(|| StoreError::MissingKey(key.to_string()))?;
        read_bits(buffer, bit_offset, width).ok_or(StoreError::OutOfBounds { bit_offset, width })
    }

    async fn write_field_if_zero(
        &self,
        key: &str,
        bit_offset: u64,
        width: u32,
        value: u64,
    ) -> Result<bool, StoreError> {
        let mut grids = self.grids();
        let buffer = grids
            .get_mut(key)
            .ok_or_else(|| StoreError::MissingKey(key.to_string()))?;
        let current = read_bits(buffer, bit_offset, width)
            .ok_or(StoreError::OutOfBounds { bit_offset, width })?;
        if current != 0 {
            return Ok(false);
        }
        write_bits(buffer, bit_offset, width, value)
            .ok_or(StoreError::OutOfBounds { bit_offset, width })?;
        Ok(true)
    }
}

#[async_trait]
impl UpdateChannel for MemoryBackend {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), StoreError> {
        // Publishing with nobody listening is not an error, same as Redis
        let _ = self.topic(topic).send(payload);
        Ok(())
    }

    async fn subscribe(&self, topic: &str) -> Result<PayloadStream, StoreError> {
        let topic_name = topic.to_string();
        let stream = BroadcastStream::new(self.topic(topic).subscribe()).filter_map(move |item| {
            match item {
                Ok(payload) => Some(payload),
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    tracing::warn!(topic = %topic_name, skipped, "[Store] Subscriber lagged, updates dropped");
                    None
                }
            }
        });
        Ok(Box::pin(stream))
    }
}
