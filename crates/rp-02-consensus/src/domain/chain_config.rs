//! Protocol epochs and chain-wide constants
//!
//! Each optional activation block switches on a fork from that block number
//! onward. `None` means the fork never activates.

use super::{ConsensusError, ConsensusResult};
use serde::Deserialize;
use shared_types::Hash;

/// Difficulty formula family selected by block number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Epoch {
    Frontier,
    Homestead,
    Byzantium,
    Constantinople,
}

/// Tunables of the difficulty formulas.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DifficultyParams {
    pub bound_divisor: u64,
    /// Floor for every computed difficulty.
    pub minimum_difficulty: u64,
    /// Frontier: blocks faster than this many seconds raise difficulty.
    pub duration_limit: u64,
    /// Blocks per ice-age period.
    pub exp_diff_period: u64,
    pub byzantium_bomb_delay: u64,
    pub constantinople_bomb_delay: u64,
}

impl Default for DifficultyParams {
    fn default() -> Self {
        Self {
            bound_divisor: 2048,
            minimum_difficulty: 131_072,
            duration_limit: 13,
            exp_diff_period: 100_000,
            byzantium_bomb_delay: 3_000_000,
            constantinople_bomb_delay: 5_000_000,
        }
    }
}

/// Fork schedule of a chain.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    pub homestead_block: Option<u64>,
    pub dao_fork_block: Option<u64>,
    /// Whether this node sides with the DAO hard fork.
    pub dao_fork_support: bool,
    pub eip150_block: Option<u64>,
    /// Header hash pinned at `eip150_block`, if any.
    pub eip150_hash: Option<Hash>,
    pub eip158_block: Option<u64>,
    pub byzantium_block: Option<u64>,
    pub constantinople_block: Option<u64>,
    pub difficulty: DifficultyParams,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            homestead_block: Some(0),
            dao_fork_block: None,
            dao_fork_support: false,
            eip150_block: None,
            eip150_hash: None,
            eip158_block: None,
            byzantium_block: None,
            constantinople_block: None,
            difficulty: DifficultyParams::default(),
        }
    }
}

fn is_forked(activation: Option<u64>, number: u64) -> bool {
    activation.is_some_and(|block| block <= number)
}

impl ChainConfig {
    /// Frontier rules only, every fork disabled.
    pub fn frontier() -> Self {
        Self {
            homestead_block: None,
            ..Self::default()
        }
    }

    /// Every fork active from genesis.
    pub fn all_forks() -> Self {
        Self {
            homestead_block: Some(0),
            eip150_block: Some(0),
            eip158_block: Some(0),
            byzantium_block: Some(0),
            constantinople_block: Some(0),
            ..Self::default()
        }
    }

    pub fn is_homestead(&self, number: u64) -> bool {
        is_forked(self.homestead_block, number)
    }

    pub fn is_dao_fork(&self, number: u64) -> bool {
        is_forked(self.dao_fork_block, number)
    }

    pub fn is_eip150(&self, number: u64) -> bool {
        is_forked(self.eip150_block, number)
    }

    pub fn is_eip158(&self, number: u64) -> bool {
        is_forked(self.eip158_block, number)
    }

    pub fn is_byzantium(&self, number: u64) -> bool {
        is_forked(self.byzantium_block, number)
    }

    pub fn is_constantinople(&self, number: u64) -> bool {
        is_forked(self.constantinople_block, number)
    }

    /// The single epoch whose rules govern block `number`.
    pub fn epoch_at(&self, number: u64) -> Epoch {
        if self.is_constantinople(number) {
            Epoch::Constantinople
        } else if self.is_byzantium(number) {
            Epoch::Byzantium
        } else if self.is_homestead(number) {
            Epoch::Homestead
        } else {
            Epoch::Frontier
        }
    }

    /// Reject schedules whose later forks activate before earlier ones, or
    /// whose difficulty constants would divide by zero.
    pub fn validate(&self) -> ConsensusResult<()> {
        let ordered = [
            ("homestead_block", self.homestead_block),
            ("byzantium_block", self.byzantium_block),
            ("constantinople_block", self.constantinople_block),
        ];
        let mut last: Option<(&str, u64)> = None;
        let mut unset: Option<&str> = None;
        for (name, activation) in ordered {
            let Some(block) = activation else {
                unset.get_or_insert(name);
                continue;
            };
            if let Some(missing) = unset {
                return Err(ConsensusError::InvalidConfig(format!(
                    "{name} scheduled while {missing} is not"
                )));
            }
            if let Some((prev_name, prev)) = last {
                if block < prev {
                    return Err(ConsensusError::InvalidConfig(format!(
                        "{name} ({block}) activates before {prev_name} ({prev})"
                    )));
                }
            }
            last = Some((name, block));
        }

        let params = &self.difficulty;
        if params.bound_divisor == 0 {
            return Err(ConsensusError::InvalidConfig(
                "difficulty.bound_divisor must be positive".into(),
            ));
        }
        if params.exp_diff_period == 0 {
            return Err(ConsensusError::InvalidConfig(
                "difficulty.exp_diff_period must be positive".into(),
            ));
        }
        if params.minimum_difficulty == 0 {
            return Err(ConsensusError::InvalidConfig(
                "difficulty.minimum_difficulty must be positive".into(),
            ));
        }
        if params.byzantium_bomb_delay == 0 || params.constantinople_bomb_delay == 0 {
            return Err(ConsensusError::InvalidConfig(
                "bomb delays must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_selection_most_recent_first() {
        let config = ChainConfig {
            homestead_block: Some(10),
            byzantium_block: Some(20),
            constantinople_block: Some(30),
            ..ChainConfig::default()
        };
        assert_eq!(config.epoch_at(9), Epoch::Frontier);
        assert_eq!(config.epoch_at(10), Epoch::Homestead);
        assert_eq!(config.epoch_at(25), Epoch::Byzantium);
        assert_eq!(config.epoch_at(30), Epoch::Constantinople);
        assert_eq!(config.epoch_at(u64::MAX), Epoch::Constantinople);
    }

    #[test]
    fn test_unscheduled_fork_never_activates() {
        let config = ChainConfig::frontier();
        assert!(!config.is_homestead(u64::MAX));
        assert_eq!(config.epoch_at(1_000_000), Epoch::Frontier);
    }

    #[test]
    fn test_validate_rejects_inverted_schedule() {
        let config = ChainConfig {
            homestead_block: Some(100),
            byzantium_block: Some(50),
            ..ChainConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConsensusError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_validate_rejects_gap_in_schedule() {
        let config = ChainConfig {
            homestead_block: Some(0),
            byzantium_block: None,
            constantinople_block: Some(10),
            ..ChainConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_presets() {
        assert!(ChainConfig::default().validate().is_ok());
        assert!(ChainConfig::frontier().validate().is_ok());
        assert!(ChainConfig::all_forks().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_divisor() {
        let mut config = ChainConfig::default();
        config.difficulty.bound_divisor = 0;
        assert!(config.validate().is_err());
    }
}
