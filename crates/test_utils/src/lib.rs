//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! identity test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built test data for common entities
//! - `builders`: Builder patterns for test data construction
//! - `assertions`: Custom assertion helpers for versioned records

pub mod fixtures;
pub mod builders;
pub mod assertions;

pub use fixtures::*;
pub use builders::*;
pub use assertions::*;

// Re-exported so integration tests get the in-memory adapter without
// feature plumbing of their own.
pub use domain_identity::ports::mock::MemoryIdentityStore;

use once_cell::sync::Lazy;

static TRACING: Lazy<()> = Lazy::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
});

/// Initialises the tracing subscriber once for the whole test binary
pub fn init_tracing() {
    Lazy::force(&TRACING);
}
