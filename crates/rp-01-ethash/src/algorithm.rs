//! Ethash cache/dataset generation and the hashimoto loop
//!
//! All words are little-endian `u32`, independent of host byte order.

use crate::params::{HASH_BYTES, MIX_BYTES};
use primitive_types::H256;
use rayon::prelude::*;
use shared_types::{keccak256, keccak512};

const HASH_WORDS: usize = (HASH_BYTES / 4) as usize;
const MIX_WORDS: usize = (MIX_BYTES / 4) as usize;
const DATASET_PARENTS: u32 = 256;
const CACHE_ROUNDS: usize = 3;
const LOOP_ACCESSES: usize = 64;
const FNV_PRIME: u32 = 0x0100_0193;

/// A single 64-byte dataset item.
pub type Item = [u32; HASH_WORDS];

#[inline]
fn fnv(a: u32, b: u32) -> u32 {
    a.wrapping_mul(FNV_PRIME) ^ b
}

#[inline]
fn fnv_hash(mix: &mut [u32], data: &[u32]) {
    for (m, d) in mix.iter_mut().zip(data) {
        *m = m.wrapping_mul(FNV_PRIME) ^ d;
    }
}

#[inline]
fn le_word(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

fn words_to_bytes(words: &[u32], out: &mut [u8]) {
    for (i, word) in words.iter().enumerate() {
        out[i * 4..i * 4 + 4].copy_from_slice(&word.to_le_bytes());
    }
}

/// Build a verification cache of `size` bytes from the epoch seed.
///
/// Sequential Keccak512 fill followed by `CACHE_ROUNDS` passes of
/// RandMemoHash. `size` must be a multiple of 64.
pub fn generate_cache(size: u64, seed: &H256) -> Vec<u32> {
    let hash_bytes = HASH_BYTES as usize;
    let rows = (size / HASH_BYTES) as usize;
    let mut cache = vec![0u8; rows * hash_bytes];

    cache[..hash_bytes].copy_from_slice(&keccak512(seed.as_bytes()));
    for offset in (hash_bytes..cache.len()).step_by(hash_bytes) {
        let next = keccak512(&cache[offset - hash_bytes..offset]);
        cache[offset..offset + hash_bytes].copy_from_slice(&next);
    }

    let mut temp = [0u8; HASH_BYTES as usize];
    for _ in 0..CACHE_ROUNDS {
        for j in 0..rows {
            let src = ((j + rows - 1) % rows) * hash_bytes;
            let dst = j * hash_bytes;
            let xor = (le_word(&cache, dst) as usize % rows) * hash_bytes;
            for k in 0..hash_bytes {
                temp[k] = cache[src + k] ^ cache[xor + k];
            }
            cache[dst..dst + hash_bytes].copy_from_slice(&keccak512(&temp));
        }
    }

    cache.chunks_exact(4).map(|c| le_word(c, 0)).collect()
}

/// Derive dataset item `index` from the cache.
pub fn generate_dataset_item(cache: &[u32], index: u32) -> Item {
    let rows = (cache.len() / HASH_WORDS) as u32;
    let base = (index % rows) as usize * HASH_WORDS;

    let mut seed = [0u32; HASH_WORDS];
    seed.copy_from_slice(&cache[base..base + HASH_WORDS]);
    seed[0] ^= index;

    let mut bytes = [0u8; HASH_BYTES as usize];
    words_to_bytes(&seed, &mut bytes);
    let hashed = keccak512(&bytes);

    let mut mix = [0u32; HASH_WORDS];
    for (i, word) in mix.iter_mut().enumerate() {
        *word = le_word(&hashed, i * 4);
    }
    for i in 0..DATASET_PARENTS {
        let parent = fnv(index ^ i, mix[i as usize % HASH_WORDS]) % rows;
        let offset = parent as usize * HASH_WORDS;
        fnv_hash(&mut mix, &cache[offset..offset + HASH_WORDS]);
    }

    words_to_bytes(&mix, &mut bytes);
    let hashed = keccak512(&bytes);
    for (i, word) in mix.iter_mut().enumerate() {
        *word = le_word(&hashed, i * 4);
    }
    mix
}

/// Fill `dataset` (a whole number of items) from the cache in parallel.
pub fn generate_dataset(dataset: &mut [u32], cache: &[u32]) {
    dataset
        .par_chunks_mut(HASH_WORDS)
        .enumerate()
        .for_each(|(index, chunk)| {
            chunk.copy_from_slice(&generate_dataset_item(cache, index as u32));
        });
}

/// Core hashimoto loop over a dataset of `size` bytes.
///
/// Returns `(mix_digest, result)`; `result` is the value compared with the
/// target.
fn hashimoto<F>(hash: &H256, nonce: u64, size: u64, lookup: F) -> (H256, H256)
where
    F: Fn(u32) -> Item,
{
    let rows = (size / MIX_BYTES) as u32;

    let mut seed_input = [0u8; 40];
    seed_input[..32].copy_from_slice(hash.as_bytes());
    seed_input[32..].copy_from_slice(&nonce.to_le_bytes());
    let seed = keccak512(&seed_input);
    let seed_head = le_word(&seed, 0);

    let mut mix = [0u32; MIX_WORDS];
    for (i, word) in mix.iter_mut().enumerate() {
        *word = le_word(&seed, (i % HASH_WORDS) * 4);
    }

    let mut temp = [0u32; MIX_WORDS];
    let pages = MIX_WORDS / HASH_WORDS;
    for i in 0..LOOP_ACCESSES {
        let parent = fnv(i as u32 ^ seed_head, mix[i % MIX_WORDS]) % rows;
        for j in 0..pages {
            let item = lookup(pages as u32 * parent + j as u32);
            temp[j * HASH_WORDS..(j + 1) * HASH_WORDS].copy_from_slice(&item);
        }
        fnv_hash(&mut mix, &temp);
    }

    let mut digest = [0u8; 32];
    for i in (0..MIX_WORDS).step_by(4) {
        let word = fnv(fnv(fnv(mix[i], mix[i + 1]), mix[i + 2]), mix[i + 3]);
        digest[i..i + 4].copy_from_slice(&word.to_le_bytes());
    }

    let mut result_input = Vec::with_capacity(seed.len() + digest.len());
    result_input.extend_from_slice(&seed);
    result_input.extend_from_slice(&digest);

    (H256(digest), keccak256(&result_input))
}

/// Hashimoto using only the cache; items are derived on demand.
pub fn hashimoto_light(size: u64, cache: &[u32], hash: &H256, nonce: u64) -> (H256, H256) {
    hashimoto(hash, nonce, size, |index| generate_dataset_item(cache, index))
}

/// Hashimoto against a fully generated dataset.
pub fn hashimoto_full(dataset: &[u32], hash: &H256, nonce: u64) -> (H256, H256) {
    let size = dataset.len() as u64 * 4;
    hashimoto(hash, nonce, size, |index| {
        let offset = index as usize * HASH_WORDS;
        let mut item = [0u32; HASH_WORDS];
        item.copy_from_slice(&dataset[offset..offset + HASH_WORDS]);
        item
    })
}
