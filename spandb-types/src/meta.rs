//! Sealed block metadata, persisted as the `meta` sidecar blob.

use serde::{Deserialize, Serialize};
use spandb_result::{Error, Result};

use crate::ids::TraceId;

/// Name of the columnar encoding this metadata describes.
pub const ENCODING_VBLOCK: &str = "vblock";

/// Metadata describing one immutable, sealed block.
///
/// `min_id` and `max_id` are the exact byte-wise bounds of trace ids stored in
/// the block; `max_id` is inclusive. Metadata never changes after sealing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, bitcode::Encode, bitcode::Decode)]
pub struct BlockMeta {
    pub block_id: String,
    pub tenant_id: String,
    /// Size of the columnar data blob in bytes.
    pub size: u64,
    pub min_id: TraceId,
    pub max_id: TraceId,
    pub bloom_shard_count: u32,
    pub row_group_count: u32,
    pub total_traces: u64,
    pub created_at_unix_nanos: u64,
    pub encoding: String,
}

impl BlockMeta {
    /// Serialize the metadata blob.
    pub fn to_bytes(&self) -> Vec<u8> {
        bitcode::encode(self)
    }

    /// Deserialize the metadata blob. Failure means the sidecar is corrupt.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        bitcode::decode(bytes)
            .map_err(|e| Error::Corruption(format!("block meta decode failed: {e}")))
    }
}
