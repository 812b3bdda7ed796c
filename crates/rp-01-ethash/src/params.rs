//! Ethash sizing parameters
//!
//! Cache and dataset sizes grow linearly per epoch and are trimmed so the
//! row count is prime, which keeps the access pattern free of short cycles.

use primitive_types::H256;
use shared_types::keccak256;

/// Blocks per ethash epoch.
pub const EPOCH_LENGTH: u64 = 30_000;

/// Bytes in a cache/dataset item.
pub const HASH_BYTES: u64 = 64;

/// Bytes in a hashimoto mix page.
pub const MIX_BYTES: u64 = 128;

const CACHE_INIT_BYTES: u64 = 1 << 24;
const CACHE_GROWTH_BYTES: u64 = 1 << 17;
const DATASET_INIT_BYTES: u64 = 1 << 30;
const DATASET_GROWTH_BYTES: u64 = 1 << 23;

/// Epoch a block belongs to.
pub fn epoch(block: u64) -> u64 {
    block / EPOCH_LENGTH
}

/// Verification cache size in bytes for the epoch of `block`.
pub fn cache_size(block: u64) -> u64 {
    let mut size = CACHE_INIT_BYTES + CACHE_GROWTH_BYTES * epoch(block) - HASH_BYTES;
    while !is_prime(size / HASH_BYTES) {
        size -= 2 * HASH_BYTES;
    }
    size
}

/// Full dataset size in bytes for the epoch of `block`.
pub fn dataset_size(block: u64) -> u64 {
    let mut size = DATASET_INIT_BYTES + DATASET_GROWTH_BYTES * epoch(block) - MIX_BYTES;
    while !is_prime(size / MIX_BYTES) {
        size -= 2 * MIX_BYTES;
    }
    size
}

/// Seed for the epoch of `block`: Keccak256 applied once per elapsed epoch.
pub fn seed_hash(block: u64) -> H256 {
    let mut seed = H256::zero();
    for _ in 0..epoch(block) {
        seed = keccak256(seed.as_bytes());
    }
    seed
}

fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    if n % 2 == 0 {
        return n == 2;
    }
    let mut d = 3;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 2;
    }
    true
}
