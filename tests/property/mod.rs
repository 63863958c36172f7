//! Property-based tests
//!
//! Grid validation and the bit-packed cell codec

mod grid_proptest;
