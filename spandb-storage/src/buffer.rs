//! Levelled buffer pool with reference-counted buffers.
//!
//! The pool keeps 16 size classes starting at 1024 bytes and doubling. The
//! table below shows the buckets consulted for different buffer sizes when
//! getting and putting. A returned buffer is filed one level *below* its
//! capacity, which guarantees that any buffer pulled from a non-empty bucket
//! is large enough for the request that hit that bucket.
//!
//! ```text
//! [bucket] : <get range>  : <put range>  : <alloc size>
//! [0]      : 0    -> 1023 : 1024 -> 2047 : 1024
//! [1]      : 1024 -> 2047 : 2048 -> 4095 : 2048
//! [2]      : 2048 -> 4095 : 4096 -> 8191 : 4096
//! ...
//! ```

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

pub const NUM_POOL_BUCKETS: usize = 16;
pub const BASE_POOL_INCREMENT: usize = 1024;

static NEXT_POOL_ID: AtomicU64 = AtomicU64::new(1);

/// A byte buffer owned by a [`BufferPool`], with a manual reference count.
///
/// The count tracks logical owners (pages and their slices), not `Arc`
/// handles. It starts at 1 on `get`; [`PoolBuffer::retain`] adds an owner and
/// [`BufferPool::release`] removes one, returning the buffer to its pool when
/// the count crosses zero.
#[derive(Debug)]
pub struct PoolBuffer {
    data: Vec<u8>,
    refc: AtomicU32,
    pool_id: u64,
}

impl PoolBuffer {
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    pub fn ref_count(&self) -> u32 {
        self.refc.load(Ordering::Acquire)
    }

    /// Add a logical owner.
    pub fn retain(&self) {
        self.refc.fetch_add(1, Ordering::AcqRel);
    }
}

/// Process-wide levelled buffer pool.
///
/// Cloning shares the underlying buckets. Buffers must be released to the
/// pool they were drawn from; returning one elsewhere is a programming error
/// and traps.
#[derive(Debug, Clone)]
pub struct BufferPool {
    inner: Arc<PoolInner>,
}

#[derive(Debug)]
struct PoolInner {
    id: u64,
    buckets: [Mutex<Vec<Arc<PoolBuffer>>>; NUM_POOL_BUCKETS],
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new()
    }
}

impl BufferPool {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(PoolInner {
                id: NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed),
                buckets: std::array::from_fn(|_| Mutex::new(Vec::new())),
            }),
        }
    }

    /// The shared process-wide pool.
    pub fn global() -> &'static BufferPool {
        static GLOBAL: OnceLock<BufferPool> = OnceLock::new();
        GLOBAL.get_or_init(BufferPool::new)
    }

    fn bucket(&self, idx: usize) -> std::sync::MutexGuard<'_, Vec<Arc<PoolBuffer>>> {
        self.inner.buckets[idx]
            .lock()
            .expect("buffer pool bucket lock poisoned")
    }

    /// Get a zero-filled buffer of exactly `size` bytes, refcount 1.
    pub fn get(&self, size: usize) -> Arc<PoolBuffer> {
        let idx = levelled_pool_index(size);
        let candidate = self.bucket(idx).pop();

        if let Some(mut arc) = candidate {
            if let Some(buf) = Arc::get_mut(&mut arc) {
                // Buffers in the top bucket may still be too small.
                if buf.data.capacity() >= size {
                    buf.data.clear();
                    buf.data.resize(size, 0);
                    buf.refc.store(1, Ordering::Release);
                    return arc;
                }
            }
            // Too small, or a stale handle still exists somewhere; put it
            // back and fall through to a fresh allocation.
            self.bucket(idx).push(arc);
        }

        // Align fresh allocations to the bucket floor so the buffer is
        // poolable on return; oversize requests get exactly what they asked.
        let capacity = (BASE_POOL_INCREMENT << idx).max(size);
        let mut data = Vec::with_capacity(capacity);
        data.resize(size, 0);
        Arc::new(PoolBuffer {
            data,
            refc: AtomicU32::new(1),
            pool_id: self.inner.id,
        })
    }

    /// Get a buffer holding a copy of `src`, refcount 1.
    pub fn get_copy(&self, src: &[u8]) -> Arc<PoolBuffer> {
        let mut arc = self.get(src.len());
        let buf = Arc::get_mut(&mut arc).expect("freshly acquired buffer is uniquely owned");
        buf.data.copy_from_slice(src);
        arc
    }

    /// Drop one logical owner. The owner that crosses zero returns the buffer
    /// to the pool; a release below zero is a refcounting bug and traps.
    pub fn release(&self, buf: Arc<PoolBuffer>) {
        let prev = buf
            .refc
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |c| c.checked_sub(1));
        match prev {
            Err(_) => panic!("BUG: buffer reference count underflow"),
            Ok(1) => self.put(buf),
            Ok(_) => {}
        }
    }

    fn put(&self, buf: Arc<PoolBuffer>) {
        if buf.pool_id != self.inner.id {
            panic!("BUG: buffer returned to a different pool than the one it was allocated from");
        }
        let capacity = buf.capacity();
        // Undersized buffers are not worth keeping.
        if capacity < BASE_POOL_INCREMENT {
            return;
        }
        // File one level below capacity so a later get from this bucket is
        // always large enough.
        let idx = levelled_pool_index(capacity / 2);
        self.bucket(idx).push(buf);
    }

    /// Number of idle buffers currently parked across all buckets.
    pub fn idle_count(&self) -> usize {
        self.inner
            .buckets
            .iter()
            .map(|b| b.lock().expect("buffer pool bucket lock poisoned").len())
            .sum()
    }
}

/// Bucket index for a buffer of `size` bytes. Never out of range.
fn levelled_pool_index(size: usize) -> usize {
    let i = (size / BASE_POOL_INCREMENT) as u32;
    let i = (32 - i.leading_zeros()) as usize;
    i.min(NUM_POOL_BUCKETS - 1)
}
