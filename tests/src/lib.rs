//! # RePoW Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── integration/      # Multi-block flows through the public engine API
//! │   ├── chain_flow.rs
//! │   ├── batch_import.rs
//! │   └── reputation_lifecycle.rs
//! │
//! └── properties.rs     # Proptest invariants of the reputation arithmetic
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p repow-tests
//! cargo test -p repow-tests integration::
//!
//! # Benchmarks
//! cargo bench -p repow-tests
//! ```

pub mod integration;
pub mod properties;

/// Route engine logs to the test writer once per process.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}
