//! # Shared Types Crate
//!
//! Chain primitives used by every `repow` crate.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: headers and blocks are defined once, here.
//! - **Canonical Encoding**: every hash is Keccak256 over the RLP encoding,
//!   so two nodes that agree on the fields agree on the hash.

pub mod encoding;
pub mod entities;

pub use encoding::*;
pub use entities::*;
