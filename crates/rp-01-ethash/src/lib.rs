//! # rp-01-ethash
//!
//! Seal-hashing primitives for the reputation-weighted PoW engine.
//!
//! ## Architecture
//!
//! ```text
//! seal_hash + nonce ──→ hashimoto ──→ (mix digest, result)
//!                          │
//!            ┌─────────────┴─────────────┐
//!            ↓                           ↓
//!    light: Cache (small,         full: Dataset (large,
//!    items derived on demand)     items precomputed)
//! ```
//!
//! Both paths produce identical output for identical input; choosing one
//! is a speed/memory trade-off only.
//!
//! ## Ownership
//!
//! Caches and datasets are handed out as `Arc` handles by an
//! [`EthashProvider`]. A handle held by a verifier keeps the memory alive
//! until the hashing call returns, no matter how the provider's LRU evicts
//! in the meantime. Several consensus engines may share one provider.

pub mod algorithm;
pub mod error;
pub mod params;
pub mod provider;

pub use algorithm::{hashimoto_full, hashimoto_light};
pub use error::EthashError;
pub use params::{cache_size, dataset_size, seed_hash, EPOCH_LENGTH};
pub use provider::{Cache, Dataset, EthashConfig, EthashProvider};
