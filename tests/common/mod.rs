//! Common test utilities and helpers
//!
//! This module provides shared functionality for all integration tests.

pub mod db;
pub mod fixtures;

pub use db::TestDb;
pub use fixtures::{create_test_config, create_test_user, session_cookie, set_counter_state};
