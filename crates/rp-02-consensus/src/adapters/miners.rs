//! Static miner registry

use crate::domain::ConsensusResult;
use crate::ports::MinerRegistry;
use shared_types::Address;

/// A fixed list of known miners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticMinerList {
    miners: Vec<Address>,
}

impl StaticMinerList {
    pub fn new(miners: Vec<Address>) -> Self {
        Self { miners }
    }
}

impl Default for StaticMinerList {
    /// Addresses `0x..01` through `0x..05`.
    fn default() -> Self {
        Self::new((1..=5).map(Address::from_low_u64_be).collect())
    }
}

impl MinerRegistry for StaticMinerList {
    fn get_miners(&self) -> ConsensusResult<Vec<Address>> {
        Ok(self.miners.clone())
    }
}
