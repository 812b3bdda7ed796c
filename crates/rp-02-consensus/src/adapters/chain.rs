//! In-memory chain store
//!
//! Holds every inserted block by hash plus the most recently committed
//! state snapshot. Suitable for tests and tooling, not for persistence.

use crate::domain::ChainConfig;
use crate::ports::{ChainReader, StateReader};
use parking_lot::RwLock;
use shared_types::{Block, Hash, Header};
use std::collections::HashMap;
use std::sync::Arc;

pub struct InMemoryChain {
    config: ChainConfig,
    genesis: Hash,
    blocks: RwLock<HashMap<Hash, Block>>,
    head: RwLock<Hash>,
    state: RwLock<Option<Arc<dyn StateReader>>>,
}

impl InMemoryChain {
    /// A chain containing only `genesis`.
    pub fn new(config: ChainConfig, genesis: Block) -> Self {
        let hash = genesis.hash();
        let mut blocks = HashMap::new();
        blocks.insert(hash, genesis);
        Self {
            config,
            genesis: hash,
            blocks: RwLock::new(blocks),
            head: RwLock::new(hash),
            state: RwLock::new(None),
        }
    }

    /// Store a block and make it the head.
    pub fn insert_block(&self, block: Block) -> Hash {
        let hash = block.hash();
        self.blocks.write().insert(hash, block);
        *self.head.write() = hash;
        hash
    }

    /// Store a bare header as a body-less block, without moving the head.
    pub fn insert_header(&self, header: Header) -> Hash {
        let hash = header.hash();
        self.blocks
            .write()
            .insert(hash, Block::from_parts(header, Vec::new(), Vec::new()));
        hash
    }

    /// Publish a new state snapshot for readers.
    pub fn commit_state(&self, state: Arc<dyn StateReader>) {
        *self.state.write() = Some(state);
    }

    pub fn genesis(&self) -> Block {
        self.blocks
            .read()
            .get(&self.genesis)
            .cloned()
            .unwrap_or_else(|| Block::from_parts(Header::default(), Vec::new(), Vec::new()))
    }

    pub fn head(&self) -> Header {
        let head = *self.head.read();
        self.blocks
            .read()
            .get(&head)
            .map(|block| block.header().clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.blocks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.read().is_empty()
    }
}

impl ChainReader for InMemoryChain {
    fn config(&self) -> &ChainConfig {
        &self.config
    }

    fn get_header(&self, hash: &Hash, number: u64) -> Option<Header> {
        self.blocks
            .read()
            .get(hash)
            .filter(|block| block.number() == number)
            .map(|block| block.header().clone())
    }

    fn get_header_by_hash(&self, hash: &Hash) -> Option<Header> {
        self.blocks
            .read()
            .get(hash)
            .map(|block| block.header().clone())
    }

    fn get_block(&self, hash: &Hash, number: u64) -> Option<Block> {
        self.blocks
            .read()
            .get(hash)
            .filter(|block| block.number() == number)
            .cloned()
    }

    fn state(&self) -> Option<Arc<dyn StateReader>> {
        self.state.read().clone()
    }
}
