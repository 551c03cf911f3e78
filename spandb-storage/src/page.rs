//! Column pages backed by pooled, reference-counted arenas.
//!
//! A page holds four byte arenas: the value bytes, the value offsets, and
//! the repetition and definition levels. Slicing a page shares the arenas
//! and bumps every refcount; releasing a page (or dropping it) drops one
//! owner from each arena, and the owner that crosses zero hands the arena
//! back to the pool.

use std::sync::Arc;

use crate::buffer::{BufferPool, PoolBuffer};

/// A view over a run of byte-array values inside pooled arenas.
pub struct BufferedPage {
    pool: BufferPool,
    values: Option<Arc<PoolBuffer>>,
    offsets: Option<Arc<PoolBuffer>>,
    repetition_levels: Option<Arc<PoolBuffer>>,
    definition_levels: Option<Arc<PoolBuffer>>,
    /// First value index visible through this view.
    start: usize,
    /// Number of values visible through this view.
    len: usize,
}

impl BufferedPage {
    /// Build a page by copying the raw column slices into pooled arenas.
    ///
    /// `offsets` must hold `n + 1` little-endian `u32`s delimiting `n` values
    /// inside `values`.
    pub fn new(
        pool: &BufferPool,
        values: &[u8],
        offsets: &[u8],
        repetition_levels: &[u8],
        definition_levels: &[u8],
    ) -> BufferedPage {
        debug_assert!(offsets.len() % 4 == 0 && !offsets.is_empty());
        let num_values = offsets.len() / 4 - 1;
        BufferedPage {
            pool: pool.clone(),
            values: Some(pool.get_copy(values)),
            offsets: Some(pool.get_copy(offsets)),
            repetition_levels: Some(pool.get_copy(repetition_levels)),
            definition_levels: Some(pool.get_copy(definition_levels)),
            start: 0,
            len: num_values,
        }
    }

    /// Number of values visible through this view.
    pub fn num_values(&self) -> usize {
        self.len
    }

    /// The `i`-th visible value.
    pub fn value(&self, i: usize) -> &[u8] {
        assert!(i < self.len, "value index {i} out of range {}", self.len);
        let offsets = self
            .offsets
            .as_ref()
            .expect("page already released")
            .as_slice();
        let values = self
            .values
            .as_ref()
            .expect("page already released")
            .as_slice();
        let at = |n: usize| -> usize {
            let b = &offsets[n * 4..n * 4 + 4];
            u32::from_le_bytes([b[0], b[1], b[2], b[3]]) as usize
        };
        let lo = at(self.start + i);
        let hi = at(self.start + i + 1);
        &values[lo..hi]
    }

    /// Add one owner to every arena.
    pub fn retain(&self) {
        for arena in [
            &self.values,
            &self.offsets,
            &self.repetition_levels,
            &self.definition_levels,
        ]
        .into_iter()
        .flatten()
        {
            arena.retain();
        }
    }

    /// A new view of values `[from, to)` sharing this page's arenas.
    pub fn slice(&self, from: usize, to: usize) -> BufferedPage {
        assert!(from <= to && to <= self.len, "slice {from}..{to} out of range");
        self.retain();
        BufferedPage {
            pool: self.pool.clone(),
            values: self.values.clone(),
            offsets: self.offsets.clone(),
            repetition_levels: self.repetition_levels.clone(),
            definition_levels: self.definition_levels.clone(),
            start: self.start + from,
            len: to - from,
        }
    }

    /// Drop this view's ownership of the arenas.
    ///
    /// Releasing a page twice is a bug; it traps in debug builds and is a
    /// no-op otherwise.
    pub fn release(&mut self) {
        if self.values.is_none() {
            debug_assert!(false, "BUG: buffered page released twice");
            return;
        }
        for arena in [
            self.values.take(),
            self.offsets.take(),
            self.repetition_levels.take(),
            self.definition_levels.take(),
        ]
        .into_iter()
        .flatten()
        {
            self.pool.release(arena);
        }
    }
}

impl Drop for BufferedPage {
    fn drop(&mut self) {
        if self.values.is_some() {
            self.release();
        }
    }
}

/// Encode a list of byte-array values into `(values, offsets)` arenas.
pub fn encode_byte_arrays<'a, I>(items: I) -> (Vec<u8>, Vec<u8>)
where
    I: IntoIterator<Item = &'a [u8]>,
{
    let mut values = Vec::new();
    let mut offsets = Vec::new();
    offsets.extend_from_slice(&0u32.to_le_bytes());
    for item in items {
        values.extend_from_slice(item);
        offsets.extend_from_slice(&(values.len() as u32).to_le_bytes());
    }
    (values, offsets)
}
