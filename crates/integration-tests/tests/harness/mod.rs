//! Shared integration test harness; each test binary uses a subset
#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

pub mod config;
pub mod mock_google;
pub mod server;
