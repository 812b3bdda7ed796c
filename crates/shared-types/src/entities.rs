//! # Core Domain Entities
//!
//! Header and block types for an Ethash-style chain.
//!
//! ## Clusters
//!
//! - **Identifiers**: `Hash`, `Address`
//! - **Chain**: `Header`, `Block`

use crate::encoding::{calc_list_hash, calc_uncle_hash, empty_uncle_hash, keccak256, rlp_encode_header};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};

pub use primitive_types::{H160, H256, U256};

/// A 32-byte Keccak hash.
pub type Hash = H256;

/// A 20-byte account address.
pub type Address = H160;

/// Size of the header log bloom in bytes.
pub const BLOOM_BYTES: usize = 256;

/// Block header.
///
/// The engine treats everything as read-only except `difficulty`
/// (set during prepare) and `root` (set during finalize).
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub parent_hash: Hash,
    pub uncle_hash: Hash,
    /// Block author; receives block rewards and reputation.
    pub coinbase: Address,
    pub root: Hash,
    pub tx_hash: Hash,
    pub receipt_hash: Hash,
    #[serde_as(as = "Bytes")]
    pub bloom: [u8; BLOOM_BYTES],
    pub difficulty: BigUint,
    pub number: u64,
    pub gas_limit: u64,
    pub gas_used: u64,
    /// Unix timestamp in seconds.
    pub time: u64,
    pub extra: Vec<u8>,
    pub mix_digest: Hash,
    pub nonce: u64,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            parent_hash: Hash::zero(),
            uncle_hash: empty_uncle_hash(),
            coinbase: Address::zero(),
            root: Hash::zero(),
            tx_hash: Hash::zero(),
            receipt_hash: Hash::zero(),
            bloom: [0u8; BLOOM_BYTES],
            difficulty: BigUint::default(),
            number: 0,
            gas_limit: 0,
            gas_used: 0,
            time: 0,
            extra: Vec::new(),
            mix_digest: Hash::zero(),
            nonce: 0,
        }
    }
}

impl Header {
    /// Keccak256 of the full RLP encoding, seal included.
    pub fn hash(&self) -> Hash {
        keccak256(&rlp_encode_header(self, true))
    }

    /// Keccak256 of the header without mix digest and nonce.
    pub fn seal_hash(&self) -> Hash {
        keccak256(&rlp_encode_header(self, false))
    }

    /// Whether the header commits to at least one uncle.
    pub fn has_uncles(&self) -> bool {
        self.uncle_hash != empty_uncle_hash()
    }

    pub fn is_genesis(&self) -> bool {
        self.number == 0
    }
}

/// A sealed block: header, opaque transaction payloads and uncle headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    header: Header,
    transactions: Vec<Vec<u8>>,
    uncles: Vec<Header>,
}

impl Block {
    /// Assemble a block, committing the header to its body.
    ///
    /// `tx_hash` and `uncle_hash` are recomputed from the supplied body.
    pub fn new(mut header: Header, transactions: Vec<Vec<u8>>, uncles: Vec<Header>) -> Self {
        header.tx_hash = calc_list_hash(&transactions);
        header.uncle_hash = calc_uncle_hash(&uncles);
        Self {
            header,
            transactions,
            uncles,
        }
    }

    /// Wrap a header whose body hashes are already final.
    pub fn from_parts(header: Header, transactions: Vec<Vec<u8>>, uncles: Vec<Header>) -> Self {
        Self {
            header,
            transactions,
            uncles,
        }
    }

    pub fn hash(&self) -> Hash {
        self.header.hash()
    }

    pub fn number(&self) -> u64 {
        self.header.number
    }

    pub fn parent_hash(&self) -> Hash {
        self.header.parent_hash
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn transactions(&self) -> &[Vec<u8>] {
        &self.transactions
    }

    pub fn uncles(&self) -> &[Header] {
        &self.uncles
    }

    pub fn into_header(self) -> Header {
        self.header
    }
}
