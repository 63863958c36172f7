//! Grid store that fails on demand

use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use gridcast::backend::store::{GridStore, MemoryBackend, StoreError};

/// Wraps a `MemoryBackend`; reads or writes can be switched to fail
pub struct FailingStore {
    inner: MemoryBackend,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl FailingStore {
    pub fn new(inner: MemoryBackend) -> Self {
        Self {
            inner,
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
        }
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check(&self, flag: &AtomicBool) -> Result<(), StoreError> {
        if flag.load(Ordering::SeqCst) {
            Err(StoreError::UnexpectedReply("injected failure".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl GridStore for FailingStore {
    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        self.inner.exists(key).await
    }

    async fn initialize(&self, key: &str, size_in_bits: u64) -> Result<(), StoreError> {
        self.inner.initialize(key, size_in_bits).await
    }

    async fn read_range(&self, key: &str, range: Range<u64>) -> Result<Vec<u8>, StoreError> {
        self.check(&self.fail_reads)?;
        self.inner.read_range(key, range).await
    }

    async fn read_field(&self, key: &str, bit_offset: u64, width: u32) -> Result<u64, StoreError> {
        self.check(&self.fail_reads)?;
        self.inner.read_field(key, bit_offset, width).await
    }

    async fn write_field_if_zero(
        &self,
        key: &str,
        bit_offset: u64,
        width: u32,
        value: u64,
    ) -> Result<bool, StoreError> {
        self.check(&self.fail_writes)?;
        self.inner.write_field_if_zero(key, bit_offset, width, value).await
    }
}
