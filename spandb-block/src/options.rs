//! Per-call options for block reads.

use spandb_storage::CacheHint;

/// Cache residency hints per sidecar kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheControl {
    pub bloom: CacheHint,
    pub footer: CacheHint,
}

impl Default for CacheControl {
    fn default() -> Self {
        // Bloom shards are tiny and probed on every lookup; keep them hot.
        CacheControl {
            bloom: CacheHint::Hit,
            footer: CacheHint::Miss,
        }
    }
}

/// Options recognized by [`Block::find_trace_by_id`] and [`Block::search`].
///
/// The read-granularity fields are advisory; backends and future formats may
/// use them to size fetches.
///
/// [`Block::find_trace_by_id`]: crate::Block::find_trace_by_id
/// [`Block::search`]: crate::Block::search
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub chunk_size_bytes: usize,
    pub read_buffer_count: usize,
    pub read_buffer_size: usize,
    /// Load every row group's min trace id up front instead of lazily
    /// during the bracket search.
    pub prefetch_trace_id: bool,
    pub cache_control: CacheControl,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            chunk_size_bytes: 1 << 20,
            read_buffer_count: 8,
            read_buffer_size: 4 << 20,
            prefetch_trace_id: false,
            cache_control: CacheControl::default(),
        }
    }
}
