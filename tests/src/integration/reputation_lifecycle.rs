//! # Reputation Lifecycle
//!
//! Long runs over fake seals: scores stay inside their bounds, idle miners
//! decay on schedule, and the reward ceiling holds.

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use rp_02_consensus::testing::{addr, test_chain_config, TestChain};
    use rp_02_consensus::{EngineConfig, ReputationEngine, StateReader};
    use std::time::Duration;

    const GENESIS_TIME: u64 = 1_600_000_000;

    fn fake_node(config: EngineConfig) -> TestChain {
        crate::init_tracing();
        TestChain::new(
            ReputationEngine::new(config).unwrap(),
            test_chain_config(),
            32,
            GENESIS_TIME,
        )
    }

    #[test]
    fn test_skewed_mining_keeps_scores_bounded() {
        let mut node = fake_node(EngineConfig::fake(Duration::ZERO, None));
        let high = node.engine.config().reputation.high_threshold;
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..200 {
            // addr(1) takes roughly 70% of blocks; addr(5) never mines.
            let author = if rng.gen_bool(0.7) {
                addr(1)
            } else {
                addr(rng.gen_range(2..=4))
            };
            node.mine(author, 13).unwrap();
            for miner in 1..=5 {
                assert!(node.state.get_reputation(&addr(miner)) <= high);
            }
        }

        // Five decay rounds at blocks 40..=200 on an idle miner.
        assert_eq!(node.state.get_reputation(&addr(5)), 845);
    }

    #[test]
    fn test_idle_miner_decays_each_period() {
        let mut node = fake_node(EngineConfig::fake(Duration::ZERO, None));
        let mut seen = Vec::new();
        for _ in 0..3 {
            node.mine_many(&[addr(1)], 40).unwrap();
            seen.push(node.state.get_reputation(&addr(2)));
        }
        assert_eq!(seen, vec![967, 935, 904]);
    }

    #[test]
    fn test_reward_stops_at_ceiling() {
        let mut config = EngineConfig::fake(Duration::ZERO, None);
        config.reputation.high_threshold = 1010;
        config.reputation.reward_formula_optimize_param = 1;
        let mut node = fake_node(config);

        node.mine(addr(1), 13).unwrap();
        assert_eq!(node.state.get_reputation(&addr(1)), 1010);

        node.mine_many(&[addr(1), addr(2)], 10).unwrap();
        assert_eq!(node.state.get_reputation(&addr(1)), 1010);
        assert_eq!(node.state.get_reputation(&addr(2)), 1010);
    }

    #[test]
    fn test_whitelist_never_accrues() {
        let mut node = fake_node(EngineConfig::fake(Duration::ZERO, None));
        let whitelist = node.engine.config().reputation.whitelist;
        node.mine_many(&[whitelist], 15).unwrap();
        assert_eq!(node.state.get_reputation(&whitelist), 1000);
    }
}
