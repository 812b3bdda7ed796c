//! # rp-02-consensus
//!
//! Proof-of-work consensus in which each miner's reputation rescales the
//! target its seals must meet.
//!
//! ## Architecture
//!
//! ```text
//! verify_header ──→ structural checks ──→ expected difficulty ──→ seal
//!                                                                  │
//!                      reputation (read) ←── ChainReader::state ───┘
//!
//! finalize ──→ block/uncle rewards ──→ reputation reward ──→ decay ──→ root
//!                                 (StateLedger, single writer)
//! ```
//!
//! - Reputation never bypasses PoW: a score above `init` lowers the
//!   effective difficulty, a score below raises it, both bounded by
//!   `difficulty_ratio`.
//! - Each appearance of the author among the last `calc_diff_block_count`
//!   blocks divides its usable reputation by `continuous_block_usable`.
//! - Finalization rewards authors who have not been over-represented
//!   recently and periodically decays idle miners.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rp_02_consensus::{ConsensusEngine, EngineConfig, ReputationEngine};
//!
//! let engine = ReputationEngine::new(EngineConfig::default())?;
//! engine.verify_header(chain.as_ref(), &header, true)?;
//!
//! let (abort, mut results) = engine.verify_headers(chain, headers, seals);
//! while let Some(result) = results.recv().await {
//!     result?;
//! }
//! ```

pub mod adapters;
pub mod config;
pub mod domain;
pub mod metrics;
pub mod ports;
pub mod service;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use adapters::{ChainForkRules, InMemoryChain, InMemoryState, StaticMinerList};
pub use config::{EngineConfig, PowMode, Ratio, ReputationParams, RewardSchedule, VerificationParams};
pub use domain::{calc_difficulty, ChainConfig, ConsensusError, ConsensusResult, DifficultyParams, Epoch};
pub use ports::{
    AbortHandle, ChainReader, ConsensusEngine, ForkValidator, MinerRegistry, ReputationOracle,
    StateLedger, StateReader, SystemTimeSource, TimeSource, VerifyResults,
};
pub use service::{ReputationEngine, ReputationSource};
