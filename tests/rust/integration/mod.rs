//! Integration tests - Full stage runs over a temporary base directory
//!
//! These tests drive the pipeline through the artifact store exactly as the
//! CLI does.

mod end_to_end_tests;
mod stage_recovery_tests;
