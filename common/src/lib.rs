pub mod config;
pub mod yaml_include;

/// Common utilities shared across the marketplace workspace
///
/// This crate provides shared functionality used by the backend service and
/// its test suites:
///
/// - Configuration loading (YAML with `!include` merging)
/// - Shared test utilities and data helpers

// Test helpers module - available for both development and test builds
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

// Re-export commonly used test utilities for easier access
#[cfg(any(test, feature = "test-helpers"))]
pub use test_helpers::{generate_unique_id, get_test_database_name, get_test_database_url};
