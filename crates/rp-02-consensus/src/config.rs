//! Configuration types for the consensus engine
//!
//! Every constant that needs per-deployment tuning lives here. The engine
//! takes an immutable `EngineConfig` at construction and never mutates it.

use crate::domain::{ConsensusError, ConsensusResult};
use primitive_types::U256;
use rp_01_ethash::EthashConfig;
use serde::Deserialize;
use shared_types::Address;
use std::path::Path;
use std::time::Duration;

/// How seals are checked.
#[derive(Copy, Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PowMode {
    /// Full ethash verification with epoch-sized caches.
    #[default]
    Normal,
    /// Full verification against a 32 KiB dataset.
    Test,
    /// Seals always pass after `fake_delay_ms`, except at `fake_fail`.
    Fake,
    /// Headers, uncles and seals are all accepted without inspection.
    FullFake,
}

impl PowMode {
    pub fn is_fake(self) -> bool {
        matches!(self, Self::Fake | Self::FullFake)
    }
}

/// An exact ratio `numerator / denominator`.
#[derive(Copy, Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Ratio {
    pub numerator: u64,
    pub denominator: u64,
}

/// Reputation thresholds and scoring constants.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ReputationParams {
    /// At or below this score a miner may not seal blocks.
    pub low_threshold: u64,
    /// Ceiling of every score.
    pub high_threshold: u64,
    /// Score of an address never touched before.
    pub init: u64,
    /// Ancestor window for the reward frequency check.
    pub frontier_block_count: u64,
    /// Decay period and its ancestor window. Zero disables decay.
    pub black_block_count: u64,
    pub reward_formula_optimize_param: u64,
    pub decay_formula_optimize_param: u64,
    /// Ancestor window for the seal-time competition penalty.
    pub calc_diff_block_count: u64,
    /// May seal with exhausted reputation and never earns any.
    pub whitelist: Address,
    pub expected_reward_account: u64,
    pub expected_decay_account: u64,
    /// Scales the maximum difficulty swing; 1 allows +-100%.
    pub difficulty_ratio: u64,
    /// Per-appearance divisor applied to reputation at seal time.
    pub continuous_block_usable: Ratio,
}

impl Default for ReputationParams {
    fn default() -> Self {
        Self {
            low_threshold: 0,
            high_threshold: 2000,
            init: 1000,
            frontier_block_count: 20,
            black_block_count: 40,
            reward_formula_optimize_param: 100,
            decay_formula_optimize_param: 30,
            calc_diff_block_count: 10,
            whitelist: Address::zero(),
            expected_reward_account: 6,
            expected_decay_account: 2,
            difficulty_ratio: 1,
            continuous_block_usable: Ratio {
                numerator: 13,
                denominator: 10,
            },
        }
    }
}

impl ReputationParams {
    pub fn validate(&self) -> ConsensusResult<()> {
        if self.low_threshold >= self.high_threshold {
            return Err(invalid(format!(
                "reputation.low_threshold ({}) must be below high_threshold ({})",
                self.low_threshold, self.high_threshold
            )));
        }
        if self.init <= self.low_threshold || self.init > self.high_threshold {
            return Err(invalid(format!(
                "reputation.init ({}) must lie in ({}, {}]",
                self.init, self.low_threshold, self.high_threshold
            )));
        }
        if self.reward_formula_optimize_param == 0 {
            return Err(invalid("reputation.reward_formula_optimize_param must be positive"));
        }
        if self.decay_formula_optimize_param == 0 {
            return Err(invalid("reputation.decay_formula_optimize_param must be positive"));
        }
        if self.difficulty_ratio == 0 {
            return Err(invalid("reputation.difficulty_ratio must be positive"));
        }
        let usable = self.continuous_block_usable;
        if usable.numerator == 0 || usable.denominator == 0 {
            return Err(invalid("reputation.continuous_block_usable must be a positive ratio"));
        }
        Ok(())
    }
}

/// Structural header limits.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct VerificationParams {
    pub max_extra_data_size: usize,
    pub allowed_future_block_time_secs: u64,
    pub max_uncles: usize,
    /// How many ancestors an uncle may reach back.
    pub uncle_generations: u64,
    pub max_gas_limit: u64,
    pub gas_limit_bound_divisor: u64,
    pub min_gas_limit: u64,
}

impl Default for VerificationParams {
    fn default() -> Self {
        Self {
            max_extra_data_size: 32,
            allowed_future_block_time_secs: 15,
            max_uncles: 2,
            uncle_generations: 7,
            max_gas_limit: 0x7fff_ffff_ffff_ffff,
            gas_limit_bound_divisor: 1024,
            min_gas_limit: 5000,
        }
    }
}

/// Monetary block rewards in wei, by epoch.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RewardSchedule {
    pub frontier: U256,
    pub byzantium: U256,
    pub constantinople: U256,
}

impl Default for RewardSchedule {
    fn default() -> Self {
        let ether = U256::exp10(18);
        Self {
            frontier: ether * 5,
            byzantium: ether * 3,
            constantinople: ether * 2,
        }
    }
}

/// Top-level engine configuration.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EngineConfig {
    pub pow_mode: PowMode,
    /// Artificial seal verification latency in fake modes.
    pub fake_delay_ms: u64,
    /// Block number whose seal fails in fake modes.
    pub fake_fail: Option<u64>,
    /// Batch verification workers; defaults to available parallelism.
    pub verify_threads: Option<usize>,
    /// Verify seals against the full dataset once it has been generated.
    pub full_dag: bool,
    pub reputation: ReputationParams,
    pub verification: VerificationParams,
    pub rewards: RewardSchedule,
    pub ethash: EthashConfig,
}

impl EngineConfig {
    /// Small ethash memory for fast local mining.
    pub fn test() -> Self {
        Self {
            pow_mode: PowMode::Test,
            ethash: EthashConfig::test(),
            ..Self::default()
        }
    }

    /// Seals accepted after `delay`, failing only at `fail`.
    pub fn fake(delay: Duration, fail: Option<u64>) -> Self {
        Self {
            pow_mode: PowMode::Fake,
            fake_delay_ms: delay.as_millis() as u64,
            fake_fail: fail,
            ..Self::default()
        }
    }

    pub fn full_fake() -> Self {
        Self {
            pow_mode: PowMode::FullFake,
            ..Self::default()
        }
    }

    pub fn fake_delay(&self) -> Duration {
        Duration::from_millis(self.fake_delay_ms)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(raw: &str) -> ConsensusResult<Self> {
        let config: Self = toml::from_str(raw).map_err(|e| invalid(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> ConsensusResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| invalid(format!("reading {}: {e}", path.display())))?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> ConsensusResult<()> {
        self.reputation.validate()?;
        if self.verify_threads == Some(0) {
            return Err(invalid("verify_threads must be positive"));
        }
        if self.verification.gas_limit_bound_divisor == 0 {
            return Err(invalid("verification.gas_limit_bound_divisor must be positive"));
        }
        if self.verification.uncle_generations == 0 {
            return Err(invalid("verification.uncle_generations must be positive"));
        }
        self.ethash.validate().map_err(|e| invalid(e.to_string()))
    }
}

fn invalid(message: impl Into<String>) -> ConsensusError {
    ConsensusError::InvalidConfig(message.into())
}
