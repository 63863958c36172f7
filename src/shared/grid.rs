/**
 * Grid Geometry and Bit-Packed Codec
 *
 * The grid is a square matrix of fixed-width unsigned cells stored as one
 * contiguous bit-packed buffer. Cell `(row, col)` lives at bit offset
 * `(row * N + col) * W`, most significant bit first, which matches the
 * layout Redis uses for `BITFIELD ... u16`.
 *
 * The same helpers are used by the in-memory store to mutate its buffer and
 * by clients (and tests) to decode a snapshot frame.
 */
use serde::{Deserialize, Serialize};

use crate::shared::error::GridError;
use crate::shared::update::UpdateMessage;

/// Grid dimension N (the grid is N x N)
pub const GRID_SIZE: u32 = 1000;

/// Cell width W in bits
pub const BITS_PER_CELL: u32 = 16;

/// Largest value a cell may hold; 0 means empty
pub const MAX_CELL_VALUE: u64 = 1644;

/// A validated cell location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellAddress {
    pub row: u32,
    pub col: u32,
}

/// Shape of the shared grid
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GridGeometry {
    /// Grid dimension N
    pub size: u32,
    /// Cell width W in bits (1..=64)
    pub bits_per_cell: u32,
    /// Largest accepted cell value
    pub max_value: u64,
}

impl Default for GridGeometry {
    fn default() -> Self {
        Self::new(GRID_SIZE, BITS_PER_CELL, MAX_CELL_VALUE)
    }
}

impl GridGeometry {
    pub const fn new(size: u32, bits_per_cell: u32, max_value: u64) -> Self {
        Self {
            size,
            bits_per_cell,
            max_value,
        }
    }

    /// Number of cells in the grid
    pub fn cell_count(&self) -> u64 {
        self.size as u64 * self.size as u64
    }

    /// Size of the packed buffer in bits
    pub fn total_bits(&self) -> u64 {
        self.cell_count() * self.bits_per_cell as u64
    }

    /// Size of the packed buffer (and of a snapshot frame) in bytes
    pub fn byte_len(&self) -> u64 {
        self.total_bits().div_ceil(8)
    }

    /// Bit offset of a cell inside the packed buffer
    pub fn bit_offset(&self, cell: CellAddress) -> u64 {
        (cell.row as u64 * self.size as u64 + cell.col as u64) * self.bits_per_cell as u64
    }

    /// Check that `(row, col)` lies inside the grid
    pub fn cell(&self, row: i64, col: i64) -> Result<CellAddress, GridError> {
        let in_range = |v: i64| v >= 0 && v < self.size as i64;
        if !in_range(row) || !in_range(col) {
            return Err(GridError::invalid_cell(row, col));
        }
        Ok(CellAddress {
            row: row as u32,
            col: col as u32,
        })
    }

    /// Validate an update's coordinates and value
    ///
    /// Coordinates are checked before the value, so an update that is wrong
    /// on both counts reports the bad cell.
    pub fn validate(&self, update: &UpdateMessage) -> Result<CellAddress, GridError> {
        let cell = self.cell(update.row, update.col)?;
        if update.value < 0 || update.value as u64 > self.max_value {
            return Err(GridError::value_out_of_range(update.value, self.max_value));
        }
        Ok(cell)
    }

    /// Decode one cell from a snapshot buffer
    ///
    /// Returns `None` when the buffer is too short to contain the cell.
    pub fn decode_cell(&self, snapshot: &[u8], cell: CellAddress) -> Option<u64> {
        read_bits(snapshot, self.bit_offset(cell), self.bits_per_cell)
    }
}

/// Read a `width`-bit unsigned field, MSB first, starting at `bit_offset`
///
/// Returns `None` if the width is not in `1..=64` or the field runs past the
/// end of the buffer.
pub fn read_bits(buf: &[u8], bit_offset: u64, width: u32) -> Option<u64> {
    if width == 0 || width > 64 {
        return None;
    }
    let end = bit_offset.checked_add(width as u64)?;
    if end > buf.len() as u64 * 8 {
        return None;
    }

    let mut value = 0u64;
    for bit in bit_offset..end {
        let byte = buf[(bit / 8) as usize];
        let set = (byte >> (7 - (bit % 8))) & 1;
        value = (value << 1) | set as u64;
    }
    Some(value)
}

/// Write a `width`-bit unsigned field, MSB first, starting at `bit_offset`
///
/// Returns `None` (leaving the buffer untouched) if the width is invalid, the
/// value does not fit in `width` bits, or the field runs past the buffer.
pub fn write_bits(buf: &mut [u8], bit_offset: u64, width: u32, value: u64) -> Option<()> {
    if width == 0 || width > 64 {
        return None;
    }
    if width < 64 && value >> width != 0 {
        return None;
    }
    let end = bit_offset.checked_add(width as u64)?;
    if end > buf.len() as u64 * 8 {
        return None;
    }

    for (k, bit) in (bit_offset..end).enumerate() {
        let set = (value >> (width as u64 - 1 - k as u64)) & 1 == 1;
        let mask = 1u8 << (7 - (bit % 8));
        let byte = &mut buf[(bit / 8) as usize];
        if set {
            *byte |= mask;
        } else {
            *byte &= !mask;
        }
    }
    Some(())
}
