//! Default fork validator

use crate::domain::fork_rules::{verify_dao_header_extra_data, verify_fork_hashes};
use crate::domain::{ChainConfig, ConsensusResult};
use crate::ports::ForkValidator;
use shared_types::Header;

/// DAO extra-data and EIP-150 hash pinning, driven by the chain config.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChainForkRules;

impl ForkValidator for ChainForkRules {
    fn verify_fork_rules(
        &self,
        config: &ChainConfig,
        header: &Header,
        uncle: bool,
    ) -> ConsensusResult<()> {
        verify_dao_header_extra_data(config, header)?;
        verify_fork_hashes(config, header, uncle)
    }
}
