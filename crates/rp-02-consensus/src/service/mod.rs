//! Reputation-weighted ethash engine
//!
//! # Lifecycle of a header
//! `Unverified -> StructurallyValid -> DifficultyValid -> SealValid -> Final`
//!
//! Verification only reads reputation; `finalize` is the single place where
//! balances and scores change.

mod batch;

use crate::config::{EngineConfig, PowMode};
use crate::domain::reputation::{
    appearance_counts, compute_decay, compute_reward, count_appearances, is_decay_block,
};
use crate::domain::seal::{
    competition_penalty, gate_reputation, meets_target, reputation_target,
};
use crate::domain::{accumulate_rewards, calc_difficulty, ConsensusError, ConsensusResult};
use crate::adapters::{ChainForkRules, StaticMinerList};
use crate::metrics;
use crate::ports::{
    AbortHandle, ChainReader, ConsensusEngine, ForkValidator, MinerRegistry, ReputationOracle,
    StateLedger, StateReader, SystemTimeSource, TimeSource, VerifyResults,
};
use num_bigint::BigUint;
use num_traits::Zero;
use rp_01_ethash::{EthashConfig, EthashProvider};
use shared_types::{Address, Block, Hash, Header};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument};

/// Where seal verification reads reputation from.
#[derive(Clone, Default)]
pub enum ReputationSource {
    /// Committed chain state (`ChainReader::state`).
    #[default]
    Ledger,
    /// An external registry, which also supplies the miner set for decay.
    Contract(Arc<dyn ReputationOracle>),
}

impl std::fmt::Debug for ReputationSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ledger => f.write_str("Ledger"),
            Self::Contract(_) => f.write_str("Contract"),
        }
    }
}

/// The consensus engine. Cheap to clone; clones share the ethash provider.
#[derive(Clone)]
pub struct ReputationEngine {
    config: Arc<EngineConfig>,
    ethash: EthashProvider,
    miners: Arc<dyn MinerRegistry>,
    reputation: ReputationSource,
    fork_rules: Arc<dyn ForkValidator>,
    time_source: Arc<dyn TimeSource>,
}

impl ReputationEngine {
    /// Create an engine with its own ethash provider.
    pub fn new(config: EngineConfig) -> ConsensusResult<Self> {
        let ethash = EthashProvider::new(ethash_config(&config))
            .map_err(|e| ConsensusError::InvalidConfig(e.to_string()))?;
        Self::with_provider(config, ethash)
    }

    /// Create an engine sharing an existing ethash provider.
    pub fn with_provider(config: EngineConfig, ethash: EthashProvider) -> ConsensusResult<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            ethash,
            miners: Arc::new(StaticMinerList::default()),
            reputation: ReputationSource::Ledger,
            fork_rules: Arc::new(ChainForkRules),
            time_source: Arc::new(SystemTimeSource),
        })
    }

    /// Known-miner set used by decay under the ledger source.
    pub fn with_miner_registry(mut self, miners: Arc<dyn MinerRegistry>) -> Self {
        self.miners = miners;
        self
    }

    pub fn with_reputation_source(mut self, source: ReputationSource) -> Self {
        self.reputation = source;
        self
    }

    pub fn with_fork_validator(mut self, rules: Arc<dyn ForkValidator>) -> Self {
        self.fork_rules = rules;
        self
    }

    /// Set custom time source (for testing)
    pub fn with_time_source(mut self, time_source: Arc<dyn TimeSource>) -> Self {
        self.time_source = time_source;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Shared ethash memory; hand to other engines via [`Self::with_provider`].
    pub fn ethash(&self) -> &EthashProvider {
        &self.ethash
    }

    /// Reputation of `address` as seen by seal verification.
    pub fn reputation_of(&self, chain: &dyn ChainReader, address: &Address) -> ConsensusResult<u64> {
        match &self.reputation {
            ReputationSource::Ledger => Ok(chain
                .state()
                .map_or(self.config.reputation.init, |state| state.get_reputation(address))),
            ReputationSource::Contract(oracle) => oracle.get_reputation(address),
        }
    }

    /// The reputation-adjusted target `header`'s seal must meet.
    pub fn seal_target(&self, chain: &dyn ChainReader, header: &Header) -> ConsensusResult<BigUint> {
        if header.difficulty.is_zero() {
            return Err(ConsensusError::InvalidDifficulty);
        }
        let params = &self.config.reputation;
        let author = header.coinbase;
        let reputation = gate_reputation(params, &author, self.reputation_of(chain, &author)?)?;
        let appearances = count_appearances(header, &author, params.calc_diff_block_count, |hash| {
            chain.get_header_by_hash(hash)
        });
        let penalized = competition_penalty(params, reputation, appearances);
        debug!(
            number = header.number,
            author = ?author,
            reputation,
            appearances,
            penalized,
            "Computed seal target"
        );
        Ok(reputation_target(params, &header.difficulty, penalized))
    }

    fn known_miners(&self) -> ConsensusResult<Vec<Address>> {
        match &self.reputation {
            ReputationSource::Ledger => self.miners.get_miners(),
            ReputationSource::Contract(oracle) => oracle.get_miners(),
        }
    }

    fn verify_seal_inner(&self, chain: &dyn ChainReader, header: &Header) -> ConsensusResult<()> {
        if self.config.pow_mode.is_fake() {
            let delay = self.config.fake_delay();
            if !delay.is_zero() {
                std::thread::sleep(delay);
            }
            if self.config.fake_fail == Some(header.number) {
                return Err(ConsensusError::InvalidPoW);
            }
            return Ok(());
        }
        if header.difficulty.is_zero() {
            return Err(ConsensusError::InvalidDifficulty);
        }

        let started = Instant::now();
        let seal_hash = header.seal_hash();
        let full = self
            .config
            .full_dag
            .then(|| self.ethash.dataset(header.number, false))
            .and_then(|dataset| dataset.hashimoto(&seal_hash, header.nonce));
        let (digest, result) = match full {
            Some(outcome) => outcome,
            None => self.ethash.cache(header.number).hashimoto(&seal_hash, header.nonce),
        };
        metrics::record_seal_latency(started.elapsed().as_secs_f64());

        if digest != header.mix_digest {
            return Err(ConsensusError::InvalidMixDigest);
        }
        let target = self.seal_target(chain, header)?;
        if !meets_target(&result, &target) {
            return Err(ConsensusError::InvalidPoW);
        }
        Ok(())
    }

    /// Checks of a header against a known parent, first failure wins.
    fn verify_header_with_parent(
        &self,
        chain: &dyn ChainReader,
        header: &Header,
        parent: &Header,
        uncle: bool,
        seal: bool,
    ) -> ConsensusResult<()> {
        chain.config().validate()?;
        let limits = &self.config.verification;
        if header.extra.len() > limits.max_extra_data_size {
            return Err(ConsensusError::ExtraDataTooLong {
                size: header.extra.len(),
                max: limits.max_extra_data_size,
            });
        }
        if !uncle {
            let limit = self
                .time_source
                .now()
                .saturating_add(limits.allowed_future_block_time_secs);
            if header.time > limit {
                return Err(ConsensusError::FutureBlock {
                    time: header.time,
                    limit,
                });
            }
        }
        if header.time <= parent.time {
            return Err(ConsensusError::ZeroBlockTime {
                time: header.time,
                parent: parent.time,
            });
        }

        let expected = calc_difficulty(chain.config(), header.time, parent);
        if expected != header.difficulty {
            return Err(ConsensusError::DifficultyMismatch {
                have: header.difficulty.to_string(),
                want: expected.to_string(),
            });
        }

        if header.gas_limit > limits.max_gas_limit {
            return Err(ConsensusError::GasLimitTooHigh {
                have: header.gas_limit,
                max: limits.max_gas_limit,
            });
        }
        if header.gas_used > header.gas_limit {
            return Err(ConsensusError::GasUsedExceedsLimit {
                used: header.gas_used,
                limit: header.gas_limit,
            });
        }
        let bound = parent.gas_limit / limits.gas_limit_bound_divisor;
        if header.gas_limit.abs_diff(parent.gas_limit) >= bound
            || header.gas_limit < limits.min_gas_limit
        {
            return Err(ConsensusError::InvalidGasLimit {
                have: header.gas_limit,
                parent: parent.gas_limit,
                bound,
            });
        }
        if parent.number.checked_add(1) != Some(header.number) {
            return Err(ConsensusError::InvalidNumber);
        }

        if seal {
            self.verify_seal_inner(chain, header)?;
        }
        self.fork_rules
            .verify_fork_rules(chain.config(), header, uncle)
    }

    /// Verify `headers[index]`, taking its parent from the batch when linked.
    fn verify_batch_member(
        &self,
        chain: &dyn ChainReader,
        headers: &[Header],
        seals: &[bool],
        index: usize,
    ) -> ConsensusResult<()> {
        let header = &headers[index];
        if chain.get_header(&header.hash(), header.number).is_some() {
            return Ok(());
        }
        let parent = if index == 0 {
            header
                .number
                .checked_sub(1)
                .and_then(|number| chain.get_header(&header.parent_hash, number))
        } else {
            let previous = &headers[index - 1];
            (previous.hash() == header.parent_hash).then(|| previous.clone())
        };
        let Some(parent) = parent else {
            return Err(ConsensusError::UnknownAncestor);
        };
        let seal = seals.get(index).copied().unwrap_or(true);
        self.verify_header_with_parent(chain, header, &parent, false, seal)
    }
}

fn ethash_config(config: &EngineConfig) -> EthashConfig {
    let mut ethash = config.ethash.clone();
    if config.pow_mode == PowMode::Test {
        let test = EthashConfig::test();
        ethash.cache_bytes = ethash.cache_bytes.or(test.cache_bytes);
        ethash.dataset_bytes = ethash.dataset_bytes.or(test.dataset_bytes);
    }
    ethash
}

fn observe(number: u64, result: &ConsensusResult<()>) {
    match result {
        Ok(()) => metrics::record_header_verified(),
        Err(err) => {
            debug!(number, reason = err.reason(), error = %err, "Header rejected");
            metrics::record_header_rejected(err.reason());
        }
    }
}

impl ConsensusEngine for ReputationEngine {
    fn author(&self, header: &Header) -> Address {
        header.coinbase
    }

    #[instrument(skip_all, fields(number = header.number))]
    fn verify_header(
        &self,
        chain: &dyn ChainReader,
        header: &Header,
        seal: bool,
    ) -> ConsensusResult<()> {
        if self.config.pow_mode == PowMode::FullFake {
            return Ok(());
        }
        if chain.get_header(&header.hash(), header.number).is_some() {
            return Ok(());
        }
        let result = match header
            .number
            .checked_sub(1)
            .and_then(|number| chain.get_header(&header.parent_hash, number))
        {
            Some(parent) => self.verify_header_with_parent(chain, header, &parent, false, seal),
            None => Err(ConsensusError::UnknownAncestor),
        };
        observe(header.number, &result);
        result
    }

    fn verify_headers(
        &self,
        chain: Arc<dyn ChainReader>,
        headers: Vec<Header>,
        seals: Vec<bool>,
    ) -> (AbortHandle, VerifyResults) {
        batch::verify_headers(self, chain, headers, seals)
    }

    #[instrument(skip_all, fields(number = block.number(), uncles = block.uncles().len()))]
    fn verify_uncles(&self, chain: &dyn ChainReader, block: &Block) -> ConsensusResult<()> {
        if self.config.pow_mode == PowMode::FullFake {
            return Ok(());
        }
        let max = self.config.verification.max_uncles;
        if block.uncles().len() > max {
            return Err(ConsensusError::TooManyUncles {
                count: block.uncles().len(),
                max,
            });
        }
        if block.uncles().is_empty() {
            return Ok(());
        }

        let mut uncles: HashSet<Hash> = HashSet::new();
        let mut ancestors: HashMap<Hash, Header> = HashMap::new();
        let mut parent = block.parent_hash();
        let mut number = block.number().checked_sub(1);
        for _ in 0..self.config.verification.uncle_generations {
            let Some(ancestor) = number.and_then(|n| chain.get_block(&parent, n)) else {
                break;
            };
            uncles.extend(ancestor.uncles().iter().map(Header::hash));
            parent = ancestor.parent_hash();
            number = ancestor.number().checked_sub(1);
            ancestors.insert(ancestor.hash(), ancestor.into_header());
        }
        let block_hash = block.hash();
        ancestors.insert(block_hash, block.header().clone());
        uncles.insert(block_hash);

        for uncle in block.uncles() {
            let hash = uncle.hash();
            if !uncles.insert(hash) {
                return Err(ConsensusError::DuplicateUncle(hash));
            }
            if ancestors.contains_key(&hash) {
                return Err(ConsensusError::UncleIsAncestor(hash));
            }
            let uncle_parent = match ancestors.get(&uncle.parent_hash) {
                Some(p) if uncle.parent_hash != block.parent_hash() => p,
                _ => return Err(ConsensusError::DanglingUncle(hash)),
            };
            self.verify_header_with_parent(chain, uncle, uncle_parent, true, true)?;
        }
        Ok(())
    }

    #[instrument(skip_all, fields(number = header.number))]
    fn verify_seal(&self, chain: &dyn ChainReader, header: &Header) -> ConsensusResult<()> {
        self.verify_seal_inner(chain, header)
    }

    fn prepare(&self, chain: &dyn ChainReader, header: &mut Header) -> ConsensusResult<()> {
        let parent = header
            .number
            .checked_sub(1)
            .and_then(|number| chain.get_header(&header.parent_hash, number))
            .ok_or(ConsensusError::UnknownAncestor)?;
        chain.config().validate()?;
        header.difficulty = calc_difficulty(chain.config(), header.time, &parent);
        Ok(())
    }

    #[instrument(skip_all, fields(number = header.number, author = ?header.coinbase))]
    fn finalize(
        &self,
        chain: &dyn ChainReader,
        mut header: Header,
        state: &mut dyn StateLedger,
        transactions: Vec<Vec<u8>>,
        uncles: Vec<Header>,
    ) -> ConsensusResult<Block> {
        for (address, amount) in
            accumulate_rewards(&self.config.rewards, chain.config(), &header, &uncles)
        {
            state.add_balance(&address, amount);
        }

        let params = &self.config.reputation;
        let lookup = |hash: &Hash| chain.get_header_by_hash(hash);

        let author = header.coinbase;
        let appearances =
            count_appearances(&header, &author, params.frontier_block_count, lookup);
        let current = state.get_reputation(&author);
        let reward = compute_reward(params, &author, current, appearances);
        if reward > 0 {
            state.add_reputation(&author, reward);
            metrics::record_reputation_rewarded(reward);
        }
        info!(reward, current, appearances, "Applied reputation reward");

        if is_decay_block(params, header.number) {
            let miners: BTreeSet<Address> = self.known_miners()?.into_iter().collect();
            let counts = appearance_counts(&header, params.black_block_count, lookup);
            let mut total = 0u64;
            for miner in &miners {
                let current = state.get_reputation(miner);
                let seen = counts.get(miner).copied().unwrap_or(0);
                let decay = compute_decay(params, current, seen);
                if decay > 0 {
                    state.sub_reputation(miner, decay);
                    total = total.saturating_add(decay);
                }
            }
            metrics::record_reputation_decayed(total);
            info!(miners = miners.len(), total, "Applied reputation decay");
        }

        header.root = state.intermediate_root(chain.config().is_eip158(header.number));
        Ok(Block::new(header, transactions, uncles))
    }

    fn calc_difficulty(&self, chain: &dyn ChainReader, time: u64, parent: &Header) -> BigUint {
        calc_difficulty(chain.config(), time, parent)
    }

    fn seal_hash(&self, header: &Header) -> Hash {
        header.seal_hash()
    }
}

impl std::fmt::Debug for ReputationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReputationEngine")
            .field("config", &self.config)
            .field("reputation", &self.reputation)
            .finish()
    }
}
