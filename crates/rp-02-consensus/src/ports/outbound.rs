//! Driven ports (Outbound dependencies)
//!
//! The engine reads chain history and state through these traits and
//! never owns either.

use crate::domain::{ChainConfig, ConsensusResult};
use primitive_types::U256;
use shared_types::{Address, Block, Hash, Header};
use std::sync::Arc;

/// Read access to the local chain.
pub trait ChainReader: Send + Sync {
    /// Fork schedule of this chain.
    fn config(&self) -> &ChainConfig;

    /// Header by hash and number, `None` if unknown.
    fn get_header(&self, hash: &Hash, number: u64) -> Option<Header>;

    /// Header by hash alone.
    fn get_header_by_hash(&self, hash: &Hash) -> Option<Header>;

    /// Full block by hash and number.
    fn get_block(&self, hash: &Hash, number: u64) -> Option<Block>;

    /// Reputation view of the current state, if the chain has one.
    ///
    /// Callers treat `None` as "every address holds the initial score".
    fn state(&self) -> Option<Arc<dyn StateReader>>;
}

/// Read-only reputation view.
pub trait StateReader: Send + Sync {
    /// Current score of `address`; untouched addresses hold the initial score.
    fn get_reputation(&self, address: &Address) -> u64;
}

/// Mutable state used while finalizing a block.
///
/// Only `finalize` mutates; callers serialize finalization per chain.
pub trait StateLedger: StateReader {
    /// Add to a score, saturating.
    fn add_reputation(&mut self, address: &Address, delta: u64);

    /// Subtract from a score, saturating at zero.
    fn sub_reputation(&mut self, address: &Address, delta: u64);

    fn add_balance(&mut self, address: &Address, amount: U256);

    fn balance(&self, address: &Address) -> U256;

    /// Root hash of the current state. With `delete_empty`, accounts
    /// indistinguishable from untouched ones are pruned first.
    fn intermediate_root(&mut self, delete_empty: bool) -> Hash;
}

/// Source of the known-miner set used by decay.
pub trait MinerRegistry: Send + Sync {
    fn get_miners(&self) -> ConsensusResult<Vec<Address>>;
}

/// External registry that also scores miners.
pub trait ReputationOracle: MinerRegistry {
    fn get_reputation(&self, address: &Address) -> ConsensusResult<u64>;
}

/// Fork-specific header rules applied after the generic checks.
pub trait ForkValidator: Send + Sync {
    fn verify_fork_rules(
        &self,
        config: &ChainConfig,
        header: &Header,
        uncle: bool,
    ) -> ConsensusResult<()>;
}

/// Time source for timestamp validation
pub trait TimeSource: Send + Sync {
    /// Get current unix timestamp in seconds
    fn now(&self) -> u64;
}

/// Default time source using system time
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}
