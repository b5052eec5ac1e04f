//! Integration tests for hostsync
//!
//! These tests verify the engine against the fixture rules and the API
//! endpoints with a real (temporary) database.

mod api_tests;
mod engine_tests;
mod folder_pool_tests;
mod persistence_tests;
