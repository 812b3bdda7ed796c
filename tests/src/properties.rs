//! Property-based tests using proptest.
//!
//! Invariants of the reputation arithmetic and difficulty retargeting over
//! randomly generated scores, windows and headers.

#[cfg(test)]
mod tests {
    use num_bigint::BigUint;
    use proptest::prelude::*;
    use rp_02_consensus::domain::reputation::{compute_decay, compute_reward};
    use rp_02_consensus::domain::seal::{
        canonical_target, competition_penalty, effective_difficulty, reputation_target,
    };
    use rp_02_consensus::{calc_difficulty, ChainConfig, ReputationParams};
    use shared_types::{Address, Header};

    // ============================================================================
    // Strategies
    // ============================================================================

    fn arb_params() -> impl Strategy<Value = ReputationParams> {
        (1u64..=20, 1u64..=80, 1u64..=200, 1u64..=60, 1u64..=4).prop_map(
            |(frontier, black, reward_opt, decay_opt, ratio)| ReputationParams {
                frontier_block_count: frontier,
                black_block_count: black,
                reward_formula_optimize_param: reward_opt,
                decay_formula_optimize_param: decay_opt,
                difficulty_ratio: ratio,
                ..ReputationParams::default()
            },
        )
    }

    fn arb_author() -> impl Strategy<Value = Address> {
        (1u64..=1_000).prop_map(Address::from_low_u64_be)
    }

    fn arb_parent() -> impl Strategy<Value = Header> {
        (1u64..=5_000_000, 131_072u64..=u64::MAX / 2, 0u64..=u32::MAX as u64, any::<bool>())
            .prop_map(|(number, difficulty, time, uncles)| {
                let mut header = Header {
                    number,
                    difficulty: BigUint::from(difficulty),
                    time,
                    ..Default::default()
                };
                if uncles {
                    header.uncle_hash = shared_types::keccak256(b"uncles");
                }
                header
            })
    }

    // ============================================================================
    // Reputation
    // ============================================================================

    proptest! {
        /// Rewards never lift a score past the ceiling.
        #[test]
        fn reward_respects_ceiling(
            params in arb_params(),
            author in arb_author(),
            current in 0u64..=2_000,
            appearances in 0u64..=40,
        ) {
            let reward = compute_reward(&params, &author, current, appearances);
            prop_assert!(current.saturating_add(reward) <= params.high_threshold.max(current));
        }

        /// Decay never drives a score below zero.
        #[test]
        fn decay_bounded_by_score(
            params in arb_params(),
            current in 0u64..=2_000,
            appearances in 0u64..=80,
        ) {
            prop_assert!(compute_decay(&params, current, appearances) <= current);
        }

        /// More recent appearances never earn a larger reward.
        #[test]
        fn reward_non_increasing_in_appearances(
            params in arb_params(),
            author in arb_author(),
            current in 1u64..=1_999,
            appearances in 0u64..=39,
        ) {
            let fewer = compute_reward(&params, &author, current, appearances);
            let more = compute_reward(&params, &author, current, appearances + 1);
            prop_assert!(more <= fewer);
        }

        /// Each extra appearance shrinks usable reputation.
        #[test]
        fn penalty_monotone(reputation in 1u64..=2_000, k in 0u64..=30) {
            let params = ReputationParams::default();
            let now = competition_penalty(&params, reputation, k);
            let next = competition_penalty(&params, reputation, k + 1);
            prop_assert!(next <= now);
            prop_assert!(now <= reputation);
        }
    }

    // ============================================================================
    // Targets and difficulty
    // ============================================================================

    proptest! {
        /// Higher reputation never makes the seal harder.
        #[test]
        fn target_monotone_in_reputation(
            difficulty in 1u64..=u64::MAX,
            low in 0u64..=2_000,
            delta in 0u64..=2_000,
        ) {
            let params = ReputationParams::default();
            let difficulty = BigUint::from(difficulty);
            let lower = reputation_target(&params, &difficulty, low);
            let higher = reputation_target(&params, &difficulty, low + delta);
            prop_assert!(lower <= higher);
        }

        /// The effective difficulty stays positive and the initial score
        /// leaves the canonical target untouched.
        #[test]
        fn effective_difficulty_positive(difficulty in 1u64..=u64::MAX, reputation in 0u64..=4_000) {
            let params = ReputationParams::default();
            let difficulty = BigUint::from(difficulty);
            prop_assert!(effective_difficulty(&params, &difficulty, reputation) >= BigUint::from(1u8));
            prop_assert_eq!(
                reputation_target(&params, &difficulty, params.init),
                canonical_target(&difficulty)
            );
        }

        /// Retargeting never drops below the minimum difficulty.
        #[test]
        fn difficulty_respects_floor(parent in arb_parent(), gap in 1u64..=100_000) {
            for config in [ChainConfig::frontier(), ChainConfig::default(), ChainConfig::all_forks()] {
                let floor = BigUint::from(config.difficulty.minimum_difficulty);
                let difficulty = calc_difficulty(&config, parent.time + gap, &parent);
                prop_assert!(difficulty >= floor);
            }
        }
    }
}
