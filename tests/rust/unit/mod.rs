//! Unit tests - Tests that exercise library components without touching disk
//!
//! These tests run quickly and cover the normalization rules in isolation.

mod node_expansion_tests;
mod raw_reader_tests;
mod unification_property_tests;
