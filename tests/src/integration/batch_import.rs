//! # Batch Header Import
//!
//! Headers mined with real seals are verified concurrently by a node that
//! holds only genesis. Reputation comes from a registry whose scores do not
//! move, so miner and verifier agree on every seal target.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use primitive_types::H256;
    use rp_02_consensus::testing::{addr, test_chain_config, TestChain};
    use rp_02_consensus::{
        ConsensusEngine, ConsensusError, ConsensusResult, EngineConfig, InMemoryChain,
        MinerRegistry, ReputationEngine, ReputationOracle, ReputationSource,
    };
    use shared_types::{Address, Block, Header};
    use tokio::time::timeout;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    const GENESIS_TIME: u64 = 1_600_000_000;

    /// Every address holds the same score.
    struct FlatScores(u64);

    impl MinerRegistry for FlatScores {
        fn get_miners(&self) -> ConsensusResult<Vec<Address>> {
            Ok(Vec::new())
        }
    }

    impl ReputationOracle for FlatScores {
        fn get_reputation(&self, _address: &Address) -> ConsensusResult<u64> {
            Ok(self.0)
        }
    }

    fn engine(threads: usize) -> ReputationEngine {
        let mut config = EngineConfig::test();
        config.verify_threads = Some(threads);
        ReputationEngine::new(config)
            .unwrap()
            .with_reputation_source(ReputationSource::Contract(Arc::new(FlatScores(1200))))
    }

    /// Mine `count` headers and a genesis-only chain to verify them against.
    fn mined_headers(count: usize) -> (Arc<InMemoryChain>, Vec<Header>) {
        crate::init_tracing();
        let mut miner = TestChain::new(engine(1), test_chain_config(), 32, GENESIS_TIME);
        let blocks = miner
            .mine_many(&[addr(1), addr(2), addr(1), addr(3)], count)
            .unwrap();
        let verifier = Arc::new(InMemoryChain::new(test_chain_config(), miner.chain.genesis()));
        (
            verifier,
            blocks.into_iter().map(Block::into_header).collect(),
        )
    }

    async fn collect(
        mut results: rp_02_consensus::VerifyResults,
    ) -> Vec<ConsensusResult<()>> {
        let mut out = Vec::new();
        while let Some(result) = results.recv().await {
            out.push(result);
        }
        out
    }

    // =============================================================================
    // INTEGRATION TESTS
    // =============================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_mined_batch_verifies() {
        let (chain, headers) = mined_headers(12);
        let total = headers.len();
        let (_abort, results) = engine(4).verify_headers(chain, headers, vec![true; total]);

        let results = timeout(Duration::from_secs(30), collect(results))
            .await
            .unwrap();
        assert_eq!(results, vec![Ok(()); total]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_tampered_member_breaks_only_its_link() {
        let (chain, mut headers) = mined_headers(10);
        headers[5].mix_digest = H256::repeat_byte(0xab);
        let total = headers.len();

        let (_abort, results) = engine(3).verify_headers(chain, headers, Vec::new());
        let results = timeout(Duration::from_secs(30), collect(results))
            .await
            .unwrap();

        assert_eq!(results.len(), total);
        for (index, result) in results.iter().enumerate() {
            match index {
                5 => assert_eq!(result, &Err(ConsensusError::InvalidMixDigest)),
                // Its successor points at the original hash.
                6 => assert_eq!(result, &Err(ConsensusError::UnknownAncestor)),
                _ => assert_eq!(result, &Ok(()), "index {index}"),
            }
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_unsealed_batch_skips_pow() {
        let (chain, mut headers) = mined_headers(6);
        for header in &mut headers {
            header.mix_digest = H256::zero();
        }
        // Re-link after the hash change.
        for i in 1..headers.len() {
            headers[i].parent_hash = headers[i - 1].hash();
        }
        let total = headers.len();

        let (_abort, results) = engine(2).verify_headers(chain, headers, vec![false; total]);
        let results = timeout(Duration::from_secs(30), collect(results))
            .await
            .unwrap();
        assert_eq!(results, vec![Ok(()); total]);
    }
}
