//! # Chain Import Flow
//!
//! A mining node builds a chain; an independent verifying node replays it
//! block by block and must reach the same state roots.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use primitive_types::U256;
    use rp_02_consensus::testing::{addr, test_chain_config, TestChain};
    use rp_02_consensus::{
        ConsensusEngine, ConsensusError, EngineConfig, InMemoryChain, InMemoryState, PowMode,
        ReputationEngine, StateLedger, StateReader,
    };
    use shared_types::Block;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    const GENESIS_TIME: u64 = 1_600_000_000;

    struct Verifier {
        engine: ReputationEngine,
        chain: Arc<InMemoryChain>,
        state: InMemoryState,
    }

    impl Verifier {
        /// Fresh node sharing only the genesis block with the miner.
        fn following(miner: &TestChain) -> Self {
            let genesis = miner.chain.genesis();
            let engine = ReputationEngine::new(miner.engine.config().clone()).unwrap();
            let init = engine.config().reputation.init;
            Self {
                chain: Arc::new(InMemoryChain::new(test_chain_config(), genesis)),
                engine,
                state: InMemoryState::new(init),
            }
        }

        fn import(&mut self, block: &Block) -> Result<(), ConsensusError> {
            self.engine
                .verify_header(self.chain.as_ref(), block.header(), true)?;
            self.engine.verify_uncles(self.chain.as_ref(), block)?;

            let mut state = self.state.clone();
            let replayed = self.engine.finalize(
                self.chain.as_ref(),
                block.header().clone(),
                &mut state,
                block.transactions().to_vec(),
                block.uncles().to_vec(),
            )?;
            assert_eq!(
                replayed.header().root,
                block.header().root,
                "state root diverged at block {}",
                block.number()
            );

            self.chain.insert_block(block.clone());
            self.chain.commit_state(Arc::new(state.clone()));
            self.state = state;
            Ok(())
        }
    }

    fn mining_node(config: EngineConfig) -> TestChain {
        crate::init_tracing();
        let engine = ReputationEngine::new(config).unwrap();
        TestChain::new(engine, test_chain_config(), 32, GENESIS_TIME)
    }

    // =============================================================================
    // INTEGRATION TESTS
    // =============================================================================

    #[test]
    fn test_verifier_replays_mined_chain() {
        let mut miner = mining_node(EngineConfig::test());
        let authors = [addr(1), addr(2), addr(3)];
        let blocks = miner.mine_many(&authors, 9).unwrap();

        let mut verifier = Verifier::following(&miner);
        for block in &blocks {
            verifier.import(block).unwrap();
        }

        assert_eq!(verifier.chain.head().hash(), miner.head().hash());
        for author in authors {
            assert_eq!(
                verifier.state.get_reputation(&author),
                miner.state.get_reputation(&author)
            );
            assert_eq!(verifier.state.balance(&author), U256::exp10(18) * 15);
        }
    }

    #[test]
    fn test_verifier_rejects_block_from_banned_author() {
        let mut miner = mining_node(EngineConfig::test());
        let blocks = miner.mine_many(&[addr(1)], 2).unwrap();

        let mut verifier = Verifier::following(&miner);
        verifier.import(&blocks[0]).unwrap();

        // The verifier's view of the author drops to the floor before block 2.
        verifier.state.set_reputation(&addr(1), 0);
        verifier
            .chain
            .commit_state(Arc::new(verifier.state.clone()));

        assert_eq!(
            verifier.import(&blocks[1]),
            Err(ConsensusError::ReputationTooLow { reputation: 0 })
        );
    }

    #[test]
    fn test_uncle_rewarded_on_replay() {
        let mut miner = mining_node(EngineConfig::fake(std::time::Duration::ZERO, None));
        let blocks = miner.mine_many(&[addr(1)], 2).unwrap();
        let (stale, _) = miner
            .build_on(blocks[0].header(), addr(9), blocks[0].header().time + 11, vec![])
            .unwrap();
        let nephew = miner
            .mine_with_uncles(addr(1), 13, vec![stale.header().clone()])
            .unwrap();

        let mut verifier = Verifier::following(&miner);
        for block in blocks.iter().chain([&nephew]) {
            verifier.import(block).unwrap();
        }
        assert_eq!(
            verifier.state.balance(&addr(9)),
            U256::exp10(18) * 5 * 7 / 8
        );
    }

    #[test]
    fn test_toml_config_drives_decay_period() {
        let config = EngineConfig::from_toml_str(
            r#"
            pow_mode = "fake"

            [reputation]
            black_block_count = 4
            "#,
        )
        .unwrap();
        assert_eq!(config.pow_mode, PowMode::Fake);

        let mut miner = mining_node(config);
        miner.mine_many(&[addr(1)], 3).unwrap();
        assert_eq!(miner.state.get_reputation(&addr(4)), 1000);

        miner.mine(addr(1), 13).unwrap();
        assert_eq!(miner.state.get_reputation(&addr(4)), 967);

        miner.mine_many(&[addr(1)], 4).unwrap();
        assert_eq!(miner.state.get_reputation(&addr(4)), 935);
    }
}
