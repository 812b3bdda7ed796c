//! Fork-specific header rules
//!
//! - DAO fork: headers in the ten blocks from the fork block must carry
//!   (pro-fork) or must not carry (no-fork) the `dao-hard-fork` marker.
//! - EIP-150: the header at the activation block must hash to the pinned
//!   value, if one is configured. Uncles are exempt.

use super::chain_config::ChainConfig;
use super::{ConsensusError, ConsensusResult};
use shared_types::Header;

/// Blocks from the DAO fork block that must carry the marker.
pub const DAO_FORK_EXTRA_RANGE: u64 = 10;

/// Extra-data marker of the DAO hard fork.
pub const DAO_FORK_BLOCK_EXTRA: &[u8] = b"dao-hard-fork";

pub fn verify_dao_header_extra_data(config: &ChainConfig, header: &Header) -> ConsensusResult<()> {
    let Some(fork_block) = config.dao_fork_block else {
        return Ok(());
    };
    let limit = fork_block.saturating_add(DAO_FORK_EXTRA_RANGE);
    if header.number < fork_block || header.number >= limit {
        return Ok(());
    }
    let marked = header.extra == DAO_FORK_BLOCK_EXTRA;
    match (config.dao_fork_support, marked) {
        (true, false) => Err(ConsensusError::BadProDaoExtra),
        (false, true) => Err(ConsensusError::BadNoDaoExtra),
        _ => Ok(()),
    }
}

pub fn verify_fork_hashes(config: &ChainConfig, header: &Header, uncle: bool) -> ConsensusResult<()> {
    if uncle {
        return Ok(());
    }
    match (config.eip150_block, config.eip150_hash) {
        (Some(block), Some(want)) if block == header.number && !want.is_zero() => {
            let have = header.hash();
            if have != want {
                return Err(ConsensusError::ForkHashMismatch {
                    number: header.number,
                    have,
                    want,
                });
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::Hash;

    fn dao_config(support: bool) -> ChainConfig {
        ChainConfig {
            dao_fork_block: Some(100),
            dao_fork_support: support,
            ..ChainConfig::default()
        }
    }

    fn header(number: u64, extra: &[u8]) -> Header {
        Header {
            number,
            extra: extra.to_vec(),
            ..Default::default()
        }
    }

    #[test]
    fn test_pro_fork_requires_marker_in_range() {
        let config = dao_config(true);
        assert_eq!(
            verify_dao_header_extra_data(&config, &header(100, b"")),
            Err(ConsensusError::BadProDaoExtra)
        );
        assert!(verify_dao_header_extra_data(&config, &header(109, DAO_FORK_BLOCK_EXTRA)).is_ok());
        // Outside the range anything goes.
        assert!(verify_dao_header_extra_data(&config, &header(99, b"")).is_ok());
        assert!(verify_dao_header_extra_data(&config, &header(110, b"")).is_ok());
    }

    #[test]
    fn test_no_fork_rejects_marker() {
        let config = dao_config(false);
        assert_eq!(
            verify_dao_header_extra_data(&config, &header(105, DAO_FORK_BLOCK_EXTRA)),
            Err(ConsensusError::BadNoDaoExtra)
        );
        assert!(verify_dao_header_extra_data(&config, &header(105, b"other")).is_ok());
    }

    #[test]
    fn test_fork_hash_pinning() {
        let pinned = header(50, b"canonical");
        let config = ChainConfig {
            eip150_block: Some(50),
            eip150_hash: Some(pinned.hash()),
            ..ChainConfig::default()
        };
        assert!(verify_fork_hashes(&config, &pinned, false).is_ok());

        let other = header(50, b"fork");
        assert!(matches!(
            verify_fork_hashes(&config, &other, false),
            Err(ConsensusError::ForkHashMismatch { number: 50, .. })
        ));
        assert!(verify_fork_hashes(&config, &other, true).is_ok());
    }

    #[test]
    fn test_zero_pin_is_ignored() {
        let config = ChainConfig {
            eip150_block: Some(50),
            eip150_hash: Some(Hash::zero()),
            ..ChainConfig::default()
        };
        assert!(verify_fork_hashes(&config, &header(50, b""), false).is_ok());
    }
}
