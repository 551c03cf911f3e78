//! Trace identifiers and their stable shard mapping.

use std::fmt;
use std::hash::Hasher;

use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};
use spandb_result::{Error, Result};

/// Identifier of a single trace.
///
/// Trace ids are opaque byte strings; blocks keep them sorted in byte-wise
/// lexicographic order, which is exactly what the derived `Ord` gives us.
#[derive(
    Debug,
    Clone,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    bitcode::Encode,
    bitcode::Decode,
)]
pub struct TraceId(Vec<u8>);

impl TraceId {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render the id as lowercase hex, the form used in logs and APIs.
    pub fn to_hex(&self) -> String {
        let mut out = String::with_capacity(self.0.len() * 2);
        for b in &self.0 {
            out.push_str(&format!("{b:02x}"));
        }
        out
    }

    /// Parse a hex string into a trace id. The input must have even length.
    pub fn from_hex(s: &str) -> Result<Self> {
        if s.len() % 2 != 0 {
            return Err(Error::InvalidArgument(format!(
                "trace id hex string has odd length: {s}"
            )));
        }
        let mut bytes = Vec::with_capacity(s.len() / 2);
        for i in (0..s.len()).step_by(2) {
            let byte = u8::from_str_radix(&s[i..i + 2], 16).map_err(|e| {
                Error::InvalidArgument(format!("invalid trace id hex string {s}: {e}"))
            })?;
            bytes.push(byte);
        }
        Ok(Self(bytes))
    }
}

impl From<Vec<u8>> for TraceId {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for TraceId {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// Salt for the shard hash, fixed forever: shard assignment is part of the
// on-disk format.
const SHARD_SEED: u64 = 0x51_7C_C1_B7_27_22_0A_95;

/// Map a trace id to its bloom shard in `[0, shard_count)`.
///
/// Seeded FxHash64 over the id bytes, reduced with a 128-bit multiply so the
/// spread stays unbiased for shard counts that are not powers of two.
pub fn shard_key_for_trace_id(id: &TraceId, shard_count: u32) -> u32 {
    if shard_count <= 1 {
        return 0;
    }
    let mut h = FxHasher::default();
    h.write_u64(SHARD_SEED);
    h.write(id.as_bytes());
    let x = h.finish();
    ((x as u128).wrapping_mul(shard_count as u128) >> 64) as u32
}

/// Name of the bloom sidecar blob for a shard.
pub fn bloom_name(shard: u32) -> String {
    format!("bloom-{shard}")
}
