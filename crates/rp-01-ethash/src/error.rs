//! Error types for the ethash primitives

use thiserror::Error;

/// Errors raised while configuring an [`crate::EthashProvider`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EthashError {
    #[error("Invalid cache size: {0} bytes is not a positive multiple of 64")]
    InvalidCacheSize(u64),

    #[error("Invalid dataset size: {0} bytes is not a positive multiple of 128")]
    InvalidDatasetSize(u64),

    #[error("Invalid capacity for {0}: must be at least 1")]
    InvalidCapacity(&'static str),
}
