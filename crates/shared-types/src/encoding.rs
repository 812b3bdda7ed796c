//! # Canonical Encoding
//!
//! RLP and Keccak helpers. Header and list hashes are computed here so the
//! consensus engine and the PoW crate never disagree on byte layout.

use crate::entities::{Hash, Header};
use num_bigint::BigUint;
use num_traits::Zero;
use rlp::RlpStream;
use sha3::{Digest, Keccak256, Keccak512};

// =============================================================================
// KECCAK
// =============================================================================

/// Compute Keccak256 hash.
pub fn keccak256(data: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    Hash::from_slice(&hasher.finalize())
}

/// Compute Keccak512 hash.
pub fn keccak512(data: &[u8]) -> [u8; 64] {
    let mut hasher = Keccak512::new();
    hasher.update(data);
    let mut out = [0u8; 64];
    out.copy_from_slice(&hasher.finalize());
    out
}

// =============================================================================
// RLP HELPERS
// =============================================================================

/// Minimal big-endian bytes of an arbitrary-precision integer.
///
/// Zero encodes as the empty string, matching RLP integer rules.
pub fn big_uint_bytes(value: &BigUint) -> Vec<u8> {
    if value.is_zero() {
        Vec::new()
    } else {
        value.to_bytes_be()
    }
}

/// Append header fields to an open RLP list.
///
/// The first 13 fields form the seal pre-image; `with_seal` appends the
/// mix digest and nonce as well.
pub(crate) fn append_header_fields(stream: &mut RlpStream, header: &Header, with_seal: bool) {
    stream.append(&header.parent_hash);
    stream.append(&header.uncle_hash);
    stream.append(&header.coinbase);
    stream.append(&header.root);
    stream.append(&header.tx_hash);
    stream.append(&header.receipt_hash);
    stream.append(&header.bloom.to_vec());
    stream.append(&big_uint_bytes(&header.difficulty));
    stream.append(&header.number);
    stream.append(&header.gas_limit);
    stream.append(&header.gas_used);
    stream.append(&header.time);
    stream.append(&header.extra);
    if with_seal {
        stream.append(&header.mix_digest);
        stream.append(&header.nonce.to_be_bytes().to_vec());
    }
}

/// RLP-encode a header, with or without its seal fields.
pub fn rlp_encode_header(header: &Header, with_seal: bool) -> Vec<u8> {
    let mut stream = RlpStream::new_list(if with_seal { 15 } else { 13 });
    append_header_fields(&mut stream, header, with_seal);
    stream.out().to_vec()
}

/// Hash of the RLP list of uncle headers.
pub fn calc_uncle_hash(uncles: &[Header]) -> Hash {
    let mut stream = RlpStream::new_list(uncles.len());
    for uncle in uncles {
        stream.append_raw(&rlp_encode_header(uncle, true), 1);
    }
    keccak256(&stream.out())
}

/// Hash of an ordered list of opaque payloads (transactions, receipts).
pub fn calc_list_hash(items: &[Vec<u8>]) -> Hash {
    let mut stream = RlpStream::new_list(items.len());
    for item in items {
        stream.append(item);
    }
    keccak256(&stream.out())
}

/// Keccak256 of the empty RLP list, the uncle hash of an uncle-less block.
pub fn empty_uncle_hash() -> Hash {
    keccak256(&[0xc0])
}
