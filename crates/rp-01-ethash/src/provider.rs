//! Epoch-keyed cache and dataset provider
//!
//! Generated memory is kept in two small LRUs keyed by epoch. Entries are
//! inserted empty and filled lazily outside the LRU lock, so a slow
//! generation never blocks lookups for other epochs.

use crate::algorithm::{self, generate_cache, generate_dataset};
use crate::error::EthashError;
use crate::params::{self, HASH_BYTES, MIX_BYTES};
use lru::LruCache;
use parking_lot::Mutex;
use primitive_types::H256;
use serde::Deserialize;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Instant;
use tracing::{debug, info};

/// Sizing and retention of generated ethash memory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EthashConfig {
    /// Verification caches kept in memory.
    pub max_caches: usize,
    /// Full datasets kept in memory.
    pub max_datasets: usize,
    /// Fixed cache size for every epoch, overriding the schedule.
    pub cache_bytes: Option<u64>,
    /// Fixed dataset size for every epoch, overriding the schedule.
    pub dataset_bytes: Option<u64>,
}

impl Default for EthashConfig {
    fn default() -> Self {
        Self {
            max_caches: 3,
            max_datasets: 1,
            cache_bytes: None,
            dataset_bytes: None,
        }
    }
}

impl EthashConfig {
    /// Tiny fixed sizes so test chains can be mined in milliseconds.
    pub fn test() -> Self {
        Self {
            max_caches: 1,
            max_datasets: 1,
            cache_bytes: Some(1024),
            dataset_bytes: Some(32 * 1024),
        }
    }

    pub fn validate(&self) -> Result<(), EthashError> {
        if self.max_caches == 0 {
            return Err(EthashError::InvalidCapacity("max_caches"));
        }
        if self.max_datasets == 0 {
            return Err(EthashError::InvalidCapacity("max_datasets"));
        }
        if let Some(bytes) = self.cache_bytes {
            if bytes == 0 || bytes % HASH_BYTES != 0 {
                return Err(EthashError::InvalidCacheSize(bytes));
            }
        }
        if let Some(bytes) = self.dataset_bytes {
            if bytes == 0 || bytes % MIX_BYTES != 0 {
                return Err(EthashError::InvalidDatasetSize(bytes));
            }
        }
        Ok(())
    }

    fn cache_size(&self, block: u64) -> u64 {
        self.cache_bytes.unwrap_or_else(|| params::cache_size(block))
    }

    fn dataset_size(&self, block: u64) -> u64 {
        self.dataset_bytes
            .unwrap_or_else(|| params::dataset_size(block))
    }
}

/// Verification cache for one epoch.
#[derive(Debug)]
pub struct Cache {
    epoch: u64,
    size: u64,
    dataset_size: u64,
    seed: H256,
    words: OnceLock<Vec<u32>>,
}

impl Cache {
    fn new(epoch: u64, size: u64, dataset_size: u64) -> Self {
        Self {
            epoch,
            size,
            dataset_size,
            seed: params::seed_hash(epoch * params::EPOCH_LENGTH),
            words: OnceLock::new(),
        }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Cache words, generating them on first access.
    pub fn words(&self) -> &[u32] {
        self.words.get_or_init(|| {
            let started = Instant::now();
            let words = generate_cache(self.size, &self.seed);
            info!(
                epoch = self.epoch,
                bytes = self.size,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Generated ethash verification cache"
            );
            words
        })
    }

    /// Light hashimoto against this cache.
    pub fn hashimoto(&self, hash: &H256, nonce: u64) -> (H256, H256) {
        algorithm::hashimoto_light(self.dataset_size, self.words(), hash, nonce)
    }
}

/// Full mining dataset for one epoch.
#[derive(Debug)]
pub struct Dataset {
    epoch: u64,
    size: u64,
    words: OnceLock<Vec<u32>>,
    generating: AtomicBool,
}

impl Dataset {
    fn new(epoch: u64, size: u64) -> Self {
        Self {
            epoch,
            size,
            words: OnceLock::new(),
            generating: AtomicBool::new(false),
        }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Whether generation has finished.
    pub fn generated(&self) -> bool {
        self.words.get().is_some()
    }

    fn generate(&self, cache: &Cache) -> &[u32] {
        self.words.get_or_init(|| {
            let started = Instant::now();
            let mut words = vec![0u32; (self.size / 4) as usize];
            generate_dataset(&mut words, cache.words());
            info!(
                epoch = self.epoch,
                bytes = self.size,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Generated ethash dataset"
            );
            words
        })
    }

    /// Full hashimoto, or `None` while the dataset is still being built.
    pub fn hashimoto(&self, hash: &H256, nonce: u64) -> Option<(H256, H256)> {
        self.words
            .get()
            .map(|words| algorithm::hashimoto_full(words, hash, nonce))
    }
}

/// Shared source of caches and datasets.
///
/// Cloning is cheap; clones share the same LRUs.
#[derive(Clone)]
pub struct EthashProvider {
    config: EthashConfig,
    caches: Arc<Mutex<LruCache<u64, Arc<Cache>>>>,
    datasets: Arc<Mutex<LruCache<u64, Arc<Dataset>>>>,
}

impl EthashProvider {
    pub fn new(config: EthashConfig) -> Result<Self, EthashError> {
        config.validate()?;
        let caches = NonZeroUsize::new(config.max_caches)
            .ok_or(EthashError::InvalidCapacity("max_caches"))?;
        let datasets = NonZeroUsize::new(config.max_datasets)
            .ok_or(EthashError::InvalidCapacity("max_datasets"))?;
        Ok(Self {
            config,
            caches: Arc::new(Mutex::new(LruCache::new(caches))),
            datasets: Arc::new(Mutex::new(LruCache::new(datasets))),
        })
    }

    pub fn config(&self) -> &EthashConfig {
        &self.config
    }

    /// Verification cache for the epoch of `block`, generated on demand.
    pub fn cache(&self, block: u64) -> Arc<Cache> {
        let epoch = params::epoch(block);
        let cache = {
            let mut caches = self.caches.lock();
            if let Some(cache) = caches.get(&epoch) {
                Arc::clone(cache)
            } else {
                debug!(epoch, "Allocating ethash cache slot");
                let cache = Arc::new(Cache::new(
                    epoch,
                    self.config.cache_size(block),
                    self.config.dataset_size(block),
                ));
                caches.put(epoch, Arc::clone(&cache));
                cache
            }
        };
        cache.words();
        cache
    }

    /// Full dataset for the epoch of `block`.
    ///
    /// With `wait` the call blocks until generation completes; otherwise
    /// generation is started on a background thread and the handle returned
    /// immediately.
    pub fn dataset(&self, block: u64, wait: bool) -> Arc<Dataset> {
        let epoch = params::epoch(block);
        let dataset = {
            let mut datasets = self.datasets.lock();
            if let Some(dataset) = datasets.get(&epoch) {
                Arc::clone(dataset)
            } else {
                let dataset = Arc::new(Dataset::new(epoch, self.config.dataset_size(block)));
                datasets.put(epoch, Arc::clone(&dataset));
                dataset
            }
        };

        if dataset.generated() {
            return dataset;
        }
        let cache = self.cache(block);
        if wait {
            dataset.generate(&cache);
        } else if !dataset.generating.swap(true, Ordering::AcqRel) {
            let background = Arc::clone(&dataset);
            std::thread::spawn(move || {
                background.generate(&cache);
            });
        }
        dataset
    }

    /// Light hashimoto for `block`'s epoch.
    pub fn hashimoto_light(&self, block: u64, hash: &H256, nonce: u64) -> (H256, H256) {
        self.cache(block).hashimoto(hash, nonce)
    }

    /// Full hashimoto if the epoch's dataset is already generated.
    pub fn hashimoto_full(&self, block: u64, hash: &H256, nonce: u64) -> Option<(H256, H256)> {
        let epoch = params::epoch(block);
        let dataset = self.datasets.lock().get(&epoch).cloned()?;
        dataset.hashimoto(hash, nonce)
    }
}

impl std::fmt::Debug for EthashProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EthashProvider")
            .field("config", &self.config)
            .finish()
    }
}
