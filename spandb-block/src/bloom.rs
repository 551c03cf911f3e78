//! Bloom filter sidecars for trace-id membership.
//!
//! Each sealed block carries `bloom_shard_count` independent filters; a trace
//! id belongs to exactly one shard, chosen by
//! [`spandb_types::shard_key_for_trace_id`]. A filter answer of "absent" is
//! definitive; "present" falls through to the columnar search.
//!
//! Double hashing: probe `i` tests bit `h1 + i * h2` reduced into the bitset
//! with a 128-bit multiply, which stays unbiased for bitset sizes that are
//! not powers of two.

use std::hash::Hasher;

use rustc_hash::FxHasher;
use spandb_result::{Error, Result};
use spandb_types::{TraceId, shard_key_for_trace_id};

// Stable salts for the two base hashes; part of the on-disk format.
const BLOOM_SEED_A: u64 = 0xA0_76_1D_64_78_BD_64_2F;
const BLOOM_SEED_B: u64 = 0xE7_03_7E_D1_A0_B4_28_DB;

/// Target bits per inserted id. ~10 bits/id lands around 1% false positives.
const BITS_PER_ID: f64 = 10.0;

/// One self-contained bloom shard, serialized as a sidecar blob.
#[derive(Debug, Clone, bitcode::Encode, bitcode::Decode)]
pub struct TraceBloom {
    /// Number of bits in the filter.
    num_bits: u32,
    /// Number of probes per membership test.
    num_hashes: u8,
    /// Packed bitset, little-endian bytes.
    bits: Vec<u8>,
}

#[inline(always)]
fn hash_with_seed(seed: u64, bytes: &[u8]) -> u64 {
    let mut h = FxHasher::default();
    h.write_u64(seed);
    h.write(bytes);
    h.finish()
}

/// Unbiased reduction of a 64-bit hash into `[0, num_bits)`.
#[inline(always)]
fn reduce(x: u64, num_bits: u32) -> u32 {
    ((x as u128).wrapping_mul(num_bits as u128) >> 64) as u32
}

impl TraceBloom {
    /// Build a filter over the given ids.
    pub fn from_ids<'a, I>(ids: I) -> TraceBloom
    where
        I: IntoIterator<Item = &'a TraceId>,
    {
        let ids: Vec<&TraceId> = ids.into_iter().collect();
        let n = ids.len().max(1);

        let num_bits = (((n as f64) * BITS_PER_ID).ceil() as u32).max(8);

        // k ≈ (m/n) ln 2, clamped to [1, 16].
        let k = ((num_bits as f64 / n as f64) * std::f64::consts::LN_2).round() as i64;
        let num_hashes = k.clamp(1, 16) as u8;

        let mut bits = vec![0u8; num_bits.div_ceil(8) as usize];
        for id in ids {
            let h1 = hash_with_seed(BLOOM_SEED_A, id.as_bytes());
            let h2 = hash_with_seed(BLOOM_SEED_B, id.as_bytes()) | 1;
            let mut x = h1;
            for _ in 0..num_hashes {
                let bit = reduce(x, num_bits);
                bits[(bit >> 3) as usize] |= 1 << (bit & 7);
                x = x.wrapping_add(h2);
            }
        }

        TraceBloom {
            num_bits,
            num_hashes,
            bits,
        }
    }

    /// Membership test. May return false positives, never false negatives.
    pub fn check(&self, id: &TraceId) -> bool {
        if self.num_bits == 0 {
            return true;
        }
        let h1 = hash_with_seed(BLOOM_SEED_A, id.as_bytes());
        let h2 = hash_with_seed(BLOOM_SEED_B, id.as_bytes()) | 1;
        let mut x = h1;
        for _ in 0..self.num_hashes {
            let bit = reduce(x, self.num_bits);
            if self.bits[(bit >> 3) as usize] & (1 << (bit & 7)) == 0 {
                return false;
            }
            x = x.wrapping_add(h2);
        }
        true
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        bitcode::encode(self)
    }

    /// Decode a sidecar blob. Failure means the shard is corrupt, not absent.
    pub fn from_bytes(bytes: &[u8]) -> Result<TraceBloom> {
        bitcode::decode(bytes)
            .map_err(|e| Error::Corruption(format!("bloom shard decode failed: {e}")))
    }
}

/// Partition `ids` across `shard_count` filters by their stable shard key.
pub fn build_shards(ids: &[TraceId], shard_count: u32) -> Vec<TraceBloom> {
    let shard_count = shard_count.max(1);
    let mut partitions: Vec<Vec<&TraceId>> = vec![Vec::new(); shard_count as usize];
    for id in ids {
        partitions[shard_key_for_trace_id(id, shard_count) as usize].push(id);
    }
    partitions.into_iter().map(TraceBloom::from_ids).collect()
}
