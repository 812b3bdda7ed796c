//! Error types for the consensus engine

use shared_types::Hash;

/// Reasons a header, uncle set or configuration is rejected.
///
/// Every variant is terminal for the item under test; the caller decides
/// whether to drop the block or penalize the peer that sent it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConsensusError {
    #[error("unknown ancestor")]
    UnknownAncestor,

    #[error("block in the future: timestamp {time}, latest allowed {limit}")]
    FutureBlock { time: u64, limit: u64 },

    #[error("timestamp {time} not after parent's {parent}")]
    ZeroBlockTime { time: u64, parent: u64 },

    #[error("too many uncles: {count} > {max}")]
    TooManyUncles { count: usize, max: usize },

    #[error("duplicate uncle: {0:?}")]
    DuplicateUncle(Hash),

    #[error("uncle is ancestor: {0:?}")]
    UncleIsAncestor(Hash),

    #[error("uncle's parent is not ancestor: {0:?}")]
    DanglingUncle(Hash),

    #[error("non-positive difficulty")]
    InvalidDifficulty,

    #[error("invalid difficulty: have {have}, want {want}")]
    DifficultyMismatch { have: String, want: String },

    #[error("invalid mix digest")]
    InvalidMixDigest,

    #[error("invalid proof-of-work")]
    InvalidPoW,

    #[error("reputation is too low: {reputation}")]
    ReputationTooLow { reputation: u64 },

    #[error("extra-data too long: {size} > {max}")]
    ExtraDataTooLong { size: usize, max: usize },

    #[error("invalid gasLimit: have {have}, max {max}")]
    GasLimitTooHigh { have: u64, max: u64 },

    #[error("invalid gasUsed: have {used}, gasLimit {limit}")]
    GasUsedExceedsLimit { used: u64, limit: u64 },

    #[error("invalid gas limit: have {have}, want {parent} +- {bound}")]
    InvalidGasLimit { have: u64, parent: u64, bound: u64 },

    #[error("invalid block number")]
    InvalidNumber,

    #[error("bad DAO pro-fork extra-data")]
    BadProDaoExtra,

    #[error("bad DAO no-fork extra-data")]
    BadNoDaoExtra,

    #[error("fork hash mismatch at block {number}: have {have:?}, want {want:?}")]
    ForkHashMismatch { number: u64, have: Hash, want: Hash },

    #[error("miner registry error: {0}")]
    Registry(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("verification task failed: {0}")]
    VerificationTask(String),
}

impl ConsensusError {
    /// Stable, low-cardinality label for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::UnknownAncestor => "unknown_ancestor",
            Self::FutureBlock { .. } => "future_block",
            Self::ZeroBlockTime { .. } => "zero_block_time",
            Self::TooManyUncles { .. } => "too_many_uncles",
            Self::DuplicateUncle(_) => "duplicate_uncle",
            Self::UncleIsAncestor(_) => "uncle_is_ancestor",
            Self::DanglingUncle(_) => "dangling_uncle",
            Self::InvalidDifficulty => "invalid_difficulty",
            Self::DifficultyMismatch { .. } => "difficulty_mismatch",
            Self::InvalidMixDigest => "invalid_mix_digest",
            Self::InvalidPoW => "invalid_pow",
            Self::ReputationTooLow { .. } => "reputation_too_low",
            Self::ExtraDataTooLong { .. } => "extra_data_too_long",
            Self::GasLimitTooHigh { .. } => "gas_limit_too_high",
            Self::GasUsedExceedsLimit { .. } => "gas_used_exceeds_limit",
            Self::InvalidGasLimit { .. } => "invalid_gas_limit",
            Self::InvalidNumber => "invalid_number",
            Self::BadProDaoExtra => "bad_pro_dao_extra",
            Self::BadNoDaoExtra => "bad_no_dao_extra",
            Self::ForkHashMismatch { .. } => "fork_hash_mismatch",
            Self::Registry(_) => "registry",
            Self::InvalidConfig(_) => "invalid_config",
            Self::VerificationTask(_) => "verification_task",
        }
    }
}

/// Result type for consensus operations
pub type ConsensusResult<T> = Result<T, ConsensusError>;
