//! Chain building helpers for tests and benchmarks
//!
//! Mining is real ethash in `Test` mode, so difficulties must stay tiny:
//! build chains with [`test_chain_config`].

use crate::adapters::{InMemoryChain, InMemoryState};
use crate::domain::{ChainConfig, ConsensusError, ConsensusResult};
use crate::domain::seal::meets_target;
use crate::ports::{ChainReader, ConsensusEngine};
use crate::service::ReputationEngine;
use num_bigint::BigUint;
use shared_types::{Address, Block, Header};
use std::sync::Arc;

/// Gas limit of every block built here.
pub const TEST_GAS_LIMIT: u64 = 8_000_000;

/// Homestead from genesis with a difficulty floor of one.
pub fn test_chain_config() -> ChainConfig {
    let mut config = ChainConfig::default();
    config.difficulty.minimum_difficulty = 1;
    config
}

pub fn addr(n: u64) -> Address {
    Address::from_low_u64_be(n)
}

/// Search nonces until the seal meets the reputation-adjusted target.
///
/// Fake modes skip the search.
pub fn seal_header(
    engine: &ReputationEngine,
    chain: &dyn ChainReader,
    mut header: Header,
) -> ConsensusResult<Header> {
    if engine.config().pow_mode.is_fake() {
        return Ok(header);
    }
    let target = engine.seal_target(chain, &header)?;
    let cache = engine.ethash().cache(header.number);
    let seal_hash = header.seal_hash();
    for nonce in 0..u64::MAX {
        let (digest, result) = cache.hashimoto(&seal_hash, nonce);
        if meets_target(&result, &target) {
            header.nonce = nonce;
            header.mix_digest = digest;
            return Ok(header);
        }
    }
    Err(ConsensusError::InvalidPoW)
}

/// A growing in-memory chain plus the state its head commits to.
pub struct TestChain {
    pub engine: ReputationEngine,
    pub chain: Arc<InMemoryChain>,
    pub state: InMemoryState,
}

impl TestChain {
    /// Start from a genesis block of `difficulty` stamped at `time`.
    pub fn new(engine: ReputationEngine, config: ChainConfig, difficulty: u64, time: u64) -> Self {
        let genesis = Header {
            difficulty: BigUint::from(difficulty),
            time,
            gas_limit: TEST_GAS_LIMIT,
            extra: b"genesis".to_vec(),
            ..Default::default()
        };
        let init = engine.config().reputation.init;
        let chain = Arc::new(InMemoryChain::new(
            config,
            Block::new(genesis, Vec::new(), Vec::new()),
        ));
        Self {
            engine,
            chain,
            state: InMemoryState::new(init),
        }
    }

    pub fn head(&self) -> Header {
        self.chain.head()
    }

    /// Unsealed child of `parent`, difficulty prepared.
    pub fn child_of(&self, parent: &Header, coinbase: Address, time: u64) -> ConsensusResult<Header> {
        let mut header = Header {
            parent_hash: parent.hash(),
            coinbase,
            number: parent.number + 1,
            gas_limit: parent.gas_limit,
            time,
            ..Default::default()
        };
        self.engine.prepare(self.chain.as_ref(), &mut header)?;
        Ok(header)
    }

    /// Build, finalize and seal a child of `parent` without inserting it.
    ///
    /// Returns the block and the state it commits to.
    pub fn build_on(
        &self,
        parent: &Header,
        coinbase: Address,
        time: u64,
        uncles: Vec<Header>,
    ) -> ConsensusResult<(Block, InMemoryState)> {
        let header = self.child_of(parent, coinbase, time)?;
        let mut state = self.state.clone();
        let block =
            self.engine
                .finalize(self.chain.as_ref(), header, &mut state, Vec::new(), uncles)?;
        let sealed = seal_header(&self.engine, self.chain.as_ref(), block.header().clone())?;
        Ok((
            Block::from_parts(sealed, block.transactions().to_vec(), block.uncles().to_vec()),
            state,
        ))
    }

    /// Mine a block on the head `interval` seconds later and import it.
    pub fn mine(&mut self, coinbase: Address, interval: u64) -> ConsensusResult<Block> {
        self.mine_with_uncles(coinbase, interval, Vec::new())
    }

    pub fn mine_with_uncles(
        &mut self,
        coinbase: Address,
        interval: u64,
        uncles: Vec<Header>,
    ) -> ConsensusResult<Block> {
        let head = self.head();
        let (block, state) = self.build_on(&head, coinbase, head.time + interval, uncles)?;
        self.chain.insert_block(block.clone());
        self.chain.commit_state(Arc::new(state.clone()));
        self.state = state;
        Ok(block)
    }

    /// Mine `count` blocks, one per author in turn, 13 seconds apart.
    pub fn mine_many(&mut self, authors: &[Address], count: usize) -> ConsensusResult<Vec<Block>> {
        (0..count)
            .map(|i| self.mine(authors[i % authors.len()], 13))
            .collect()
    }
}
