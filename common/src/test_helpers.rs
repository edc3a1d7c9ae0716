/// Shared Test Helpers for Cross-Crate Use
///
/// Centralized test utilities used by the `marketplace` test suites to avoid
/// duplicating identity and database plumbing across test files.
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

// Global counter for truly unique test identifiers across parallel tests
static GLOBAL_TEST_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Generate globally unique test identifiers that won't conflict across
/// parallel tests.
///
/// IDs combine a timestamp with an atomic counter so parallel test threads
/// never collide.
///
/// # Arguments
/// * `prefix` - A string prefix to identify the test type (e.g., "BUYER", "SELLER")
///
/// # Returns
/// A unique string in the format: "{prefix}-{timestamp}-{counter}"
pub fn generate_unique_id(prefix: &str) -> String {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis();
    let counter = GLOBAL_TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("{}-{}-{}", prefix, timestamp, counter)
}

/// Get the test database URL from environment or default
pub fn get_test_database_url() -> String {
    std::env::var("MONGODB_URL").unwrap_or_else(|_| "mongodb://localhost:27017".to_string())
}

/// Get a unique database name so integration tests can run side by side
/// against one MongoDB instance without stepping on each other.
pub fn get_test_database_name() -> String {
    let counter = GLOBAL_TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("marketplace_test_{}", counter)
}
