//! Test suite for Gridcast
//!
//! This module organizes all tests

pub mod property;
