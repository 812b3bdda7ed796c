//! Reputation scoring
//!
//! Pure functions of (parameters, current score, recent authorship). The
//! ancestor walk is parameterized by a parent lookup so the same code serves
//! verification and finalization.
//!
//! All ratios are evaluated exactly over arbitrary-precision integers and
//! floored once at the end, so every node derives the same score.

use crate::config::ReputationParams;
use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};
use shared_types::{Address, Hash, Header};
use std::collections::HashMap;

/// Appearances of `author` as coinbase among up to `window` ancestors of
/// `header`, nearest first. The walk stops early at the first missing parent.
pub fn count_appearances<F>(header: &Header, author: &Address, window: u64, parent_of: F) -> u64
where
    F: FnMut(&Hash) -> Option<Header>,
{
    ancestors(header, window, parent_of)
        .filter(|ancestor| ancestor.coinbase == *author)
        .count() as u64
}

/// Per-coinbase appearance counts among up to `window` ancestors.
pub fn appearance_counts<F>(header: &Header, window: u64, parent_of: F) -> HashMap<Address, u64>
where
    F: FnMut(&Hash) -> Option<Header>,
{
    let mut counts = HashMap::new();
    for ancestor in ancestors(header, window, parent_of) {
        *counts.entry(ancestor.coinbase).or_insert(0) += 1;
    }
    counts
}

fn ancestors<F>(header: &Header, window: u64, mut parent_of: F) -> impl Iterator<Item = Header>
where
    F: FnMut(&Hash) -> Option<Header>,
{
    let mut next = header.parent_hash;
    let mut remaining = window;
    std::iter::from_fn(move || {
        if remaining == 0 {
            return None;
        }
        remaining -= 1;
        let parent = parent_of(&next)?;
        next = parent.parent_hash;
        Some(parent)
    })
}

/// `1 - expected` as an exact fraction `(numerator, denominator)`.
///
/// `expected = appearances * calc_diff_block_count * high
///           / (window * current * expected_accounts)`, capped at 1, and
/// taken as 0 when any denominator term is 0.
fn unexpected_share(
    params: &ReputationParams,
    appearances: u64,
    window: u64,
    current: u64,
    expected_accounts: u64,
) -> (BigUint, BigUint) {
    let denominator =
        BigUint::from(window) * BigUint::from(current) * BigUint::from(expected_accounts);
    if denominator.is_zero() {
        return (BigUint::from(1u8), BigUint::from(1u8));
    }
    let numerator = BigUint::from(appearances)
        * BigUint::from(params.calc_diff_block_count)
        * BigUint::from(params.high_threshold);
    if numerator >= denominator {
        return (BigUint::zero(), denominator);
    }
    (&denominator - numerator, denominator)
}

/// Reputation to add to `author` whose score is `current` and who authored
/// `appearances` of the last `frontier_block_count` blocks.
///
/// The result never lifts the score above `high_threshold`.
pub fn compute_reward(
    params: &ReputationParams,
    author: &Address,
    current: u64,
    appearances: u64,
) -> u64 {
    if *author == params.whitelist || current >= params.high_threshold {
        return 0;
    }
    let headroom = params.high_threshold - current;
    let (share, total) = unexpected_share(
        params,
        appearances,
        params.frontier_block_count,
        current,
        params.expected_reward_account,
    );
    let reward = share * BigUint::from(headroom)
        / (total * BigUint::from(params.reward_formula_optimize_param));
    reward.to_u64().unwrap_or(headroom).min(headroom)
}

/// Reputation to remove from a miner whose score is `current` and who
/// authored `appearances` of the last `black_block_count` blocks.
///
/// The result never exceeds `current`.
pub fn compute_decay(params: &ReputationParams, current: u64, appearances: u64) -> u64 {
    let (share, total) = unexpected_share(
        params,
        appearances,
        params.black_block_count,
        current,
        params.expected_decay_account,
    );
    let decay = share * BigUint::from(current)
        / (total * BigUint::from(params.decay_formula_optimize_param));
    decay.to_u64().unwrap_or(current).min(current)
}

/// Whether block `number` triggers periodic decay.
pub fn is_decay_block(params: &ReputationParams, number: u64) -> bool {
    number > 0 && params.black_block_count != 0 && number % params.black_block_count == 0
}
