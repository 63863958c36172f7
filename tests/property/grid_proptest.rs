//! Property tests for grid geometry and the cell codec

use proptest::prelude::*;

use gridcast::shared::grid::{read_bits, write_bits};
use gridcast::shared::{GridError, GridGeometry, UpdateMessage};

proptest! {
    #[test]
    fn test_validate_accepts_exactly_in_range(
        row in -5i64..1005,
        col in -5i64..1005,
        value in -5i64..1650,
    ) {
        let geometry = GridGeometry::default();
        let result = geometry.validate(&UpdateMessage::new(row, col, value));

        let cell_ok = (0..1000).contains(&row) && (0..1000).contains(&col);
        let value_ok = (0..=1644).contains(&value);

        match result {
            Ok(cell) => {
                prop_assert!(cell_ok && value_ok);
                prop_assert_eq!(geometry.bit_offset(cell), ((row * 1000 + col) * 16) as u64);
            }
            Err(GridError::InvalidCell { .. }) => prop_assert!(!cell_ok),
            Err(GridError::ValueOutOfRange { .. }) => prop_assert!(cell_ok && !value_ok),
            Err(other) => prop_assert!(false, "unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_write_leaves_neighbours_untouched(
        cell in 1u64..62,
        value in 0u64..=0xffff,
        fill in any::<u8>(),
    ) {
        // 64 cells of 16 bits, pre-filled with a pattern
        let mut buf = vec![fill; 128];
        let before = buf.clone();
        let offset = cell * 16;

        write_bits(&mut buf, offset, 16, value).unwrap();

        prop_assert_eq!(read_bits(&buf, offset, 16), Some(value));
        prop_assert_eq!(read_bits(&buf, offset - 16, 16), read_bits(&before, offset - 16, 16));
        prop_assert_eq!(read_bits(&buf, offset + 16, 16), read_bits(&before, offset + 16, 16));
        let start = (offset / 8) as usize;
        prop_assert_eq!(&buf[..start], &before[..start]);
        prop_assert_eq!(&buf[start + 2..], &before[start + 2..]);
    }

    #[test]
    fn test_unaligned_fields_round_trip(
        offset in 0u64..200,
        width in 1u32..=16,
        raw in any::<u64>(),
    ) {
        let value = raw & ((1u64 << width) - 1);
        let mut buf = vec![0u8; 32];
        write_bits(&mut buf, offset, width, value).unwrap();
        prop_assert_eq!(read_bits(&buf, offset, width), Some(value));
        // Every other bit stays zero
        let ones: u32 = buf.iter().map(|b| b.count_ones()).sum();
        prop_assert_eq!(ones, value.count_ones());
    }

    #[test]
    fn test_decode_matches_layout(row in 0i64..1000, col in 0i64..1000, value in 0u64..=1644) {
        let geometry = GridGeometry::default();
        let cell = geometry.cell(row, col).unwrap();
        let index = ((row * 1000 + col) * 2) as usize;

        // Only the two bytes of this cell are materialized
        let mut snapshot = vec![0u8; index + 2];
        snapshot[index] = (value >> 8) as u8;
        snapshot[index + 1] = value as u8;

        prop_assert_eq!(geometry.decode_cell(&snapshot, cell), Some(value));
    }
}
