//! Canvas Module
//!
//! The canvas is the grid as the session protocol sees it: one store key, one
//! geometry, and the operations a session needs. It owns no grid data of its
//! own; every call goes to the `GridStore`, and a snapshot is stale as soon as
//! it has been read.
//!
//! # Write-once Updates
//!
//! `Canvas::update` enforces the write-once policy in two steps:
//!
//! 1. read the current value and reject early if it is nonzero
//! 2. issue the store's atomic write-if-zero, which is authoritative
//!
//! Two sessions racing on the same empty cell can both pass step 1, but only
//! one of them wins step 2; the loser gets `AlreadySet` and never publishes.

use std::sync::Arc;

use crate::backend::error::BackendError;
use crate::backend::store::{GridStore, StoreError};
use crate::shared::{GridGeometry, UpdateMessage};

/// The shared grid behind one store key
#[derive(Clone)]
pub struct Canvas {
    store: Arc<dyn GridStore>,
    key: String,
    geometry: GridGeometry,
}

impl Canvas {
    pub fn new(store: Arc<dyn GridStore>, key: impl Into<String>, geometry: GridGeometry) -> Self {
        Self {
            store,
            key: key.into(),
            geometry,
        }
    }

    pub fn geometry(&self) -> GridGeometry {
        self.geometry
    }

    /// Make sure the packed grid exists, creating it zero-filled if absent
    ///
    /// The store checks for an existing buffer itself, so this is one call.
    pub async fn initialize(&self) -> Result<(), BackendError> {
        self.store
            .initialize(&self.key, self.geometry.total_bits())
            .await?;
        tracing::info!(key = %self.key, bits = self.geometry.total_bits(), "Grid ready");
        Ok(())
    }

    /// Read the full packed grid
    ///
    /// Fails if the store returns fewer bytes than the grid occupies.
    pub async fn snapshot(&self) -> Result<Vec<u8>, BackendError> {
        let expected = self.geometry.byte_len();
        let bytes = self.store.read_range(&self.key, 0..expected).await?;
        if bytes.len() as u64 != expected {
            return Err(StoreError::Truncated {
                expected,
                actual: bytes.len() as u64,
            }
            .into());
        }
        Ok(bytes)
    }

    /// Current value of one cell
    pub async fn value_at(&self, row: i64, col: i64) -> Result<u64, BackendError> {
        let cell = self.geometry.cell(row, col)?;
        let value = self
            .store
            .read_field(&self.key, self.geometry.bit_offset(cell), self.geometry.bits_per_cell)
            .await?;
        Ok(value)
    }

    /// Validate and apply one update under the write-once policy
    ///
    /// Nothing is written unless validation passes and the cell is empty.
    pub async fn update(&self, update: &UpdateMessage) -> Result<(), BackendError> {
        let cell = self.geometry.validate(update)?;
        let offset = self.geometry.bit_offset(cell);
        let width = self.geometry.bits_per_cell;

        let current = self.store.read_field(&self.key, offset, width).await?;
        if current != 0 {
            return Err(BackendError::already_set(update.row, update.col));
        }

        // validate() guarantees 0 <= value <= max_value
        let written = self
            .store
            .write_field_if_zero(&self.key, offset, width, update.value as u64)
            .await?;
        if !written {
            tracing::debug!(row = update.row, col = update.col, "Lost write race on cell");
            return Err(BackendError::already_set(update.row, update.col));
        }
        Ok(())
    }
}
