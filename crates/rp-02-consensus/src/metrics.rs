//! # Consensus Metrics
//!
//! Prometheus metrics for monitoring header verification and reputation.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! rp-02-consensus = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `repow_headers_verified_total` - Counter of accepted headers
//! - `repow_headers_rejected_total` - Counter of rejected headers (by reason)
//! - `repow_seal_verification_seconds` - Histogram of seal check latency
//! - `repow_reputation_rewarded_total` - Sum of reputation points awarded
//! - `repow_reputation_decayed_total` - Sum of reputation points decayed

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{
    register_counter_vec, register_histogram, register_int_counter, CounterVec, Histogram,
    IntCounter,
};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Total headers that passed verification
    pub static ref HEADERS_VERIFIED: IntCounter = register_int_counter!(
        "repow_headers_verified_total",
        "Total number of headers that passed verification"
    )
    .expect("Failed to create HEADERS_VERIFIED metric");

    /// Total headers rejected, labeled by rejection reason
    pub static ref HEADERS_REJECTED: CounterVec = register_counter_vec!(
        "repow_headers_rejected_total",
        "Total number of headers rejected",
        &["reason"]
    )
    .expect("Failed to create HEADERS_REJECTED metric");

    /// Histogram of seal verification latency
    pub static ref SEAL_LATENCY: Histogram = register_histogram!(
        "repow_seal_verification_seconds",
        "Time taken to verify a seal in seconds",
        vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]
    )
    .expect("Failed to create SEAL_LATENCY metric");

    /// Reputation points awarded on finalize
    pub static ref REPUTATION_REWARDED: IntCounter = register_int_counter!(
        "repow_reputation_rewarded_total",
        "Total reputation points awarded to block authors"
    )
    .expect("Failed to create REPUTATION_REWARDED metric");

    /// Reputation points removed by periodic decay
    pub static ref REPUTATION_DECAYED: IntCounter = register_int_counter!(
        "repow_reputation_decayed_total",
        "Total reputation points removed by decay"
    )
    .expect("Failed to create REPUTATION_DECAYED metric");
}

/// Record an accepted header
#[cfg(feature = "metrics")]
pub fn record_header_verified() {
    HEADERS_VERIFIED.inc();
}

/// Record a rejected header with reason
#[cfg(feature = "metrics")]
pub fn record_header_rejected(reason: &str) {
    HEADERS_REJECTED.with_label_values(&[reason]).inc();
}

/// Record seal verification latency
#[cfg(feature = "metrics")]
pub fn record_seal_latency(seconds: f64) {
    SEAL_LATENCY.observe(seconds);
}

#[cfg(feature = "metrics")]
pub fn record_reputation_rewarded(points: u64) {
    REPUTATION_REWARDED.inc_by(points);
}

#[cfg(feature = "metrics")]
pub fn record_reputation_decayed(points: u64) {
    REPUTATION_DECAYED.inc_by(points);
}

// No-op implementations when metrics feature is disabled
#[cfg(not(feature = "metrics"))]
pub fn record_header_verified() {}

#[cfg(not(feature = "metrics"))]
pub fn record_header_rejected(_reason: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_seal_latency(_seconds: f64) {}

#[cfg(not(feature = "metrics"))]
pub fn record_reputation_rewarded(_points: u64) {}

#[cfg(not(feature = "metrics"))]
pub fn record_reputation_decayed(_points: u64) {}
