//! Difficulty retargeting
//!
//! Four formulas, selected by the epoch of `parent.number + 1`. All
//! arithmetic is arbitrary precision; a single bit of drift from other
//! nodes forks the chain.
//!
//! The time delta is signed and divided with floor semantics, so a
//! timestamp at or before the parent's (possible during `prepare`) yields a
//! well-defined result instead of underflowing.

use super::chain_config::{ChainConfig, DifficultyParams, Epoch};
use num_bigint::{BigInt, BigUint};
use num_traits::{One, Zero};
use shared_types::Header;

/// Largest ice-age exponent evaluated.
///
/// This deliberately departs from the uncapped formula: past the cap the
/// result is no longer bit-exact with an unbounded implementation. Reaching
/// it needs billions of blocks past the bomb delay, so only forged block
/// numbers are affected, and for those the cap bounds allocation.
const MAX_BOMB_EXPONENT: u64 = u16::MAX as u64;

/// Expected difficulty of a child of `parent` stamped at `time`.
pub fn calc_difficulty(config: &ChainConfig, time: u64, parent: &Header) -> BigUint {
    let params = &config.difficulty;
    match config.epoch_at(parent.number.saturating_add(1)) {
        Epoch::Constantinople => {
            calc_difficulty_bomb_delayed(params, params.constantinople_bomb_delay, time, parent)
        }
        Epoch::Byzantium => {
            calc_difficulty_bomb_delayed(params, params.byzantium_bomb_delay, time, parent)
        }
        Epoch::Homestead => calc_difficulty_homestead(params, time, parent),
        Epoch::Frontier => calc_difficulty_frontier(params, time, parent),
    }
}

fn time_delta(time: u64, parent: &Header) -> i128 {
    i128::from(time) - i128::from(parent.time)
}

/// Ice-age period of `number`; zero when `exp_diff_period` is unset.
fn bomb_period(params: &DifficultyParams, number: u64) -> u64 {
    number.checked_div(params.exp_diff_period).unwrap_or(0)
}

/// `2^(period - 2)` when `period > 1`.
fn ice_age(period: u64) -> Option<BigUint> {
    (period > 1).then(|| BigUint::one() << (period - 2).min(MAX_BOMB_EXPONENT))
}

/// `parent + (parent / bound_divisor) * factor`, floored at the minimum.
///
/// A zero divisor, which `ChainConfig::validate` rejects, takes no step.
fn adjust(params: &DifficultyParams, parent: &Header, factor: i128) -> BigUint {
    let parent_diff = BigInt::from(parent.difficulty.clone());
    let step = if params.bound_divisor == 0 {
        BigInt::zero()
    } else {
        &parent_diff / BigInt::from(params.bound_divisor)
    };
    let adjusted = parent_diff + step * BigInt::from(factor);
    floor(params, adjusted)
}

fn floor(params: &DifficultyParams, value: BigInt) -> BigUint {
    let minimum = BigInt::from(params.minimum_difficulty);
    if value < minimum {
        BigUint::from(params.minimum_difficulty)
    } else {
        value.into_parts().1
    }
}

/// Frontier: fixed step up or down around `duration_limit`.
pub fn calc_difficulty_frontier(params: &DifficultyParams, time: u64, parent: &Header) -> BigUint {
    let factor = if time_delta(time, parent) < i128::from(params.duration_limit) {
        1
    } else {
        -1
    };
    let mut diff = adjust(params, parent, factor);

    let period = bomb_period(params, parent.number.saturating_add(1));
    if let Some(bomb) = ice_age(period) {
        diff += bomb;
    }
    diff
}

/// Homestead: `max(1 - delta / 10, -99)` steps.
pub fn calc_difficulty_homestead(params: &DifficultyParams, time: u64, parent: &Header) -> BigUint {
    let factor = (1 - time_delta(time, parent).div_euclid(10)).max(-99);
    let mut diff = adjust(params, parent, factor);

    let period = bomb_period(params, parent.number.saturating_add(1));
    if let Some(bomb) = ice_age(period) {
        diff += bomb;
    }
    diff
}

/// Byzantium and later: uncle-aware steps and an ice age computed from a
/// block number pushed back by `bomb_delay`.
pub fn calc_difficulty_bomb_delayed(
    params: &DifficultyParams,
    bomb_delay: u64,
    time: u64,
    parent: &Header,
) -> BigUint {
    let base = if parent.has_uncles() { 2 } else { 1 };
    let factor = (base - time_delta(time, parent).div_euclid(9)).max(-99);
    let mut diff = adjust(params, parent, factor);

    let fake_block_number = parent.number.saturating_sub(bomb_delay.saturating_sub(1));
    let period = bomb_period(params, fake_block_number);
    if let Some(bomb) = ice_age(period) {
        diff += bomb;
    }
    diff
}
