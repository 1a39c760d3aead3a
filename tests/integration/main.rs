//! Integration test harness
//!
//! Cargo only discovers `tests/*.rs` and `tests/*/main.rs`, so every
//! integration module is declared here.

mod crawl_tests;
