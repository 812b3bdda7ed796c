//! Reputation-adjusted PoW targets
//!
//! Reputation never bypasses proof-of-work; it rescales the acceptance
//! threshold. Above `init` the effective difficulty shrinks, below it grows,
//! each by at most `1 / difficulty_ratio` of the nominal value.

use super::{ConsensusError, ConsensusResult};
use crate::config::ReputationParams;
use num_bigint::BigUint;
use num_traits::{One, ToPrimitive, Zero};
use shared_types::{Address, Hash};

/// `2^256`, the numerator of every PoW target.
pub fn two_pow_256() -> BigUint {
    BigUint::one() << 256u32
}

/// Canonical ethash target `2^256 / difficulty`.
pub fn canonical_target(difficulty: &BigUint) -> BigUint {
    two_pow_256() / difficulty
}

/// Admit an author whose score is `reputation`.
///
/// At or below `low_threshold` only the whitelist may seal, and it does so
/// as if it held `init`.
pub fn gate_reputation(
    params: &ReputationParams,
    author: &Address,
    reputation: u64,
) -> ConsensusResult<u64> {
    if reputation > params.low_threshold {
        return Ok(reputation);
    }
    if *author == params.whitelist {
        Ok(params.init)
    } else {
        Err(ConsensusError::ReputationTooLow { reputation })
    }
}

/// `R / usable^k`, floored once: `R * den^k / num^k`.
pub fn competition_penalty(params: &ReputationParams, reputation: u64, appearances: u64) -> u64 {
    if appearances == 0 || reputation == 0 {
        return reputation;
    }
    let usable = params.continuous_block_usable;
    let k = u32::try_from(appearances).unwrap_or(u32::MAX);
    let penalized = BigUint::from(reputation) * BigUint::from(usable.denominator).pow(k)
        / BigUint::from(usable.numerator).pow(k);
    penalized.to_u64().unwrap_or(reputation)
}

/// Difficulty the seal must actually meet for an author holding
/// `reputation` (after the competition penalty).
///
/// Never below one.
pub fn effective_difficulty(
    params: &ReputationParams,
    difficulty: &BigUint,
    reputation: u64,
) -> BigUint {
    let scale = BigUint::from(params.init) * BigUint::from(params.difficulty_ratio);
    let effective = if reputation > params.init {
        let relief = difficulty * BigUint::from(reputation - params.init) / &scale;
        if relief >= *difficulty {
            BigUint::zero()
        } else {
            difficulty - relief
        }
    } else if reputation < params.init {
        difficulty + difficulty * BigUint::from(params.init - reputation) / &scale
    } else {
        difficulty.clone()
    };
    effective.max(BigUint::one())
}

/// Target for `difficulty` adjusted by `reputation`.
pub fn reputation_target(
    params: &ReputationParams,
    difficulty: &BigUint,
    reputation: u64,
) -> BigUint {
    two_pow_256() / effective_difficulty(params, difficulty, reputation)
}

/// Whether the hashimoto `result` is at or below `target`.
pub fn meets_target(result: &Hash, target: &BigUint) -> bool {
    BigUint::from_bytes_be(result.as_bytes()) <= *target
}
