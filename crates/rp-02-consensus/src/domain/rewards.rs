//! Monetary block and uncle rewards

use super::chain_config::{ChainConfig, Epoch};
use crate::config::RewardSchedule;
use primitive_types::U256;
use shared_types::{Address, Header};

/// Base reward for mining block `number`.
pub fn block_reward(schedule: &RewardSchedule, config: &ChainConfig, number: u64) -> U256 {
    match config.epoch_at(number) {
        Epoch::Constantinople => schedule.constantinople,
        Epoch::Byzantium => schedule.byzantium,
        Epoch::Homestead | Epoch::Frontier => schedule.frontier,
    }
}

/// Balance credits for a block and its uncles, miner last.
///
/// Each uncle author receives `(uncle + 8 - number) / 8` of the base reward;
/// the miner receives the base reward plus `1/32` of it per uncle.
pub fn accumulate_rewards(
    schedule: &RewardSchedule,
    config: &ChainConfig,
    header: &Header,
    uncles: &[Header],
) -> Vec<(Address, U256)> {
    let base = block_reward(schedule, config, header.number);
    let mut credits = Vec::with_capacity(uncles.len() + 1);
    let mut miner_reward = base;

    for uncle in uncles {
        let depth_share = uncle.number.saturating_add(8).saturating_sub(header.number);
        credits.push((uncle.coinbase, U256::from(depth_share) * base / 8));
        miner_reward += base / 32;
    }
    credits.push((header.coinbase, miner_reward));
    credits
}
