//! A [`BlockReader`] wrapper that counts reads and bytes.
//!
//! Lookups report how much they touched; the wrapper is also how tests assert
//! that a bloom miss never opens the columnar file.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use spandb_result::Result;
use spandb_types::QueryContext;

use crate::reader::{BlockReader, CacheHint};

/// Thread-safe read counters.
#[derive(Debug, Default)]
pub struct ReadStats {
    pub reads: AtomicU64,
    pub bytes_read: AtomicU64,
}

impl ReadStats {
    /// Capture a point-in-time snapshot of the accumulated counters.
    pub fn snapshot(&self) -> ReadStatsSnapshot {
        ReadStatsSnapshot {
            reads: self.reads.load(Ordering::Relaxed),
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        self.reads.store(0, Ordering::Relaxed);
        self.bytes_read.store(0, Ordering::Relaxed);
    }
}

/// Immutable copy of [`ReadStats`] captured at a specific moment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadStatsSnapshot {
    pub reads: u64,
    pub bytes_read: u64,
}

impl ReadStatsSnapshot {
    /// Compute the delta between two snapshots (`newer - older`).
    pub fn delta_since(&self, older: &Self) -> Self {
        Self {
            reads: self.reads.saturating_sub(older.reads),
            bytes_read: self.bytes_read.saturating_sub(older.bytes_read),
        }
    }
}

/// Wraps any [`BlockReader`] and records per-read statistics.
pub struct InstrumentedReader<R: BlockReader> {
    inner: R,
    stats: Arc<ReadStats>,
}

impl<R: BlockReader> InstrumentedReader<R> {
    /// Wrap a reader, returning it along with a handle to its statistics.
    pub fn new(inner: R) -> (Self, Arc<ReadStats>) {
        let stats = Arc::new(ReadStats::default());
        (
            Self {
                inner,
                stats: Arc::clone(&stats),
            },
            stats,
        )
    }
}

impl<R: BlockReader> BlockReader for InstrumentedReader<R> {
    fn read(
        &self,
        ctx: &QueryContext,
        name: &str,
        block_id: &str,
        tenant_id: &str,
        hint: CacheHint,
    ) -> Result<Bytes> {
        let bytes = self.inner.read(ctx, name, block_id, tenant_id, hint)?;
        self.stats.reads.fetch_add(1, Ordering::Relaxed);
        self.stats
            .bytes_read
            .fetch_add(bytes.len() as u64, Ordering::Relaxed);
        Ok(bytes)
    }
}
