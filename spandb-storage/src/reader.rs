//! Block sidecar access traits and the in-memory implementation.

use std::io;
use std::sync::RwLock;

use bytes::Bytes;
use rustc_hash::FxHashMap;
use spandb_result::{Error, Result};
use spandb_types::QueryContext;

/// Caller's expectation about a blob's cache residency.
///
/// Purely advisory: backends may use it to pick a cache tier or skip caching
/// entirely. `Hit` marks hot blobs like bloom shards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CacheHint {
    Hit,
    #[default]
    Miss,
    Bypass,
}

/// Read access to the named blobs of sealed blocks.
pub trait BlockReader: Send + Sync {
    /// Fetch the blob `name` belonging to `(tenant_id, block_id)`.
    ///
    /// A missing blob is an I/O error, not an empty result; absence of a
    /// *trace* is signalled higher up, never here.
    fn read(
        &self,
        ctx: &QueryContext,
        name: &str,
        block_id: &str,
        tenant_id: &str,
        hint: CacheHint,
    ) -> Result<Bytes>;
}

impl<R: BlockReader + ?Sized> BlockReader for std::sync::Arc<R> {
    fn read(
        &self,
        ctx: &QueryContext,
        name: &str,
        block_id: &str,
        tenant_id: &str,
        hint: CacheHint,
    ) -> Result<Bytes> {
        (**self).read(ctx, name, block_id, tenant_id, hint)
    }
}

/// Write access used when sealing a block.
pub trait BlockWriter: Send + Sync {
    fn write(&self, name: &str, block_id: &str, tenant_id: &str, data: Vec<u8>) -> Result<()>;
}

/// In-memory block store used for tests and benchmarks.
#[derive(Default)]
pub struct MemBlockStore {
    blobs: RwLock<FxHashMap<(String, String, String), Bytes>>,
}

impl MemBlockStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(name: &str, block_id: &str, tenant_id: &str) -> (String, String, String) {
        (
            tenant_id.to_string(),
            block_id.to_string(),
            name.to_string(),
        )
    }
}

impl BlockReader for MemBlockStore {
    fn read(
        &self,
        ctx: &QueryContext,
        name: &str,
        block_id: &str,
        tenant_id: &str,
        _hint: CacheHint,
    ) -> Result<Bytes> {
        ctx.check()?;
        let blobs = self
            .blobs
            .read()
            .expect("MemBlockStore blobs read lock poisoned");
        match blobs.get(&Self::key(name, block_id, tenant_id)) {
            Some(bytes) => Ok(bytes.clone()),
            None => Err(Error::block_io(
                name,
                tenant_id,
                block_id,
                io::Error::new(io::ErrorKind::NotFound, "blob not found"),
            )),
        }
    }
}

impl BlockWriter for MemBlockStore {
    fn write(&self, name: &str, block_id: &str, tenant_id: &str, data: Vec<u8>) -> Result<()> {
        let mut blobs = self
            .blobs
            .write()
            .expect("MemBlockStore blobs write lock poisoned");
        blobs.insert(Self::key(name, block_id, tenant_id), Bytes::from(data));
        Ok(())
    }
}
