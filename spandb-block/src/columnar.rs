//! The `vblock` columnar file: row groups of byte-array columns.
//!
//! The data blob of a sealed block decodes into a `BlockData`: a flat
//! schema of dotted column paths and a list of row groups, each holding one
//! `ByteColumn` per schema entry. Two columns exist today: the trace id
//! (first in sort order) and the encoded trace payload, whose shape is
//! opaque to the scan machinery.
//!
//! [`VBlockFile`] implements the [`ColumnarFile`] properties the lookup
//! engine relies on: row-group enumeration, column lookup by dotted path,
//! per-call predicate iterators with row numbers relative to the scanned
//! row group, and a random-access [`RowReader`].

use std::sync::Arc;

use spandb_result::{Error, Result};
use spandb_storage::{BlockReader, BufferPool, CacheHint};
use spandb_types::{BlockMeta, QueryContext, Trace};

use crate::iter::{ColumnIterator, ColumnPredicate};

/// Dotted path of the trace-id column.
pub const TRACE_ID_COLUMN: &str = "TraceID";
/// Dotted path of the encoded trace payload column.
pub const TRACE_COLUMN: &str = "Trace";

/// Blob name of the columnar data file.
pub const DATA_BLOB: &str = "data";
/// Blob name of the metadata sidecar.
pub const META_BLOB: &str = "meta";

/// One column of byte-array values.
#[derive(Debug, Clone, bitcode::Encode, bitcode::Decode)]
pub(crate) struct ByteColumn {
    /// `len + 1` offsets delimiting the values.
    offsets: Vec<u32>,
    values: Vec<u8>,
}

impl ByteColumn {
    pub(crate) fn new() -> ByteColumn {
        ByteColumn {
            offsets: vec![0],
            values: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, value: &[u8]) {
        self.values.extend_from_slice(value);
        self.offsets.push(self.values.len() as u32);
    }

    pub(crate) fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    pub(crate) fn get(&self, i: usize) -> &[u8] {
        let lo = self.offsets[i] as usize;
        let hi = self.offsets[i + 1] as usize;
        &self.values[lo..hi]
    }

    /// Raw page arenas for rows `[start, end)`: the value bytes plus
    /// little-endian offsets rebased to the slice.
    pub(crate) fn page_arenas(&self, start: usize, end: usize) -> (&[u8], Vec<u8>) {
        let base = self.offsets[start];
        let values = &self.values[base as usize..self.offsets[end] as usize];
        let mut offsets = Vec::with_capacity((end - start + 1) * 4);
        for o in &self.offsets[start..=end] {
            offsets.extend_from_slice(&(o - base).to_le_bytes());
        }
        (values, offsets)
    }
}

/// One row group: all columns share a row count.
#[derive(Debug, Clone, bitcode::Encode, bitcode::Decode)]
pub(crate) struct RowGroupData {
    pub(crate) columns: Vec<ByteColumn>,
}

impl RowGroupData {
    pub(crate) fn num_rows(&self) -> u64 {
        self.columns.first().map_or(0, |c| c.len() as u64)
    }
}

/// The decoded columnar data file.
#[derive(Debug, Clone, bitcode::Encode, bitcode::Decode)]
pub(crate) struct BlockData {
    /// Dotted column paths, index-aligned with every row group's columns.
    pub(crate) schema: Vec<String>,
    pub(crate) row_groups: Vec<RowGroupData>,
}

/// Properties the lookup engine requires of a columnar file.
pub trait ColumnarFile {
    fn num_row_groups(&self) -> usize;

    fn num_rows(&self, row_group: usize) -> Result<u64>;

    /// Column index for a dotted path, or `None` when the schema lacks it.
    fn column_index(&self, dotted_path: &str) -> Option<usize>;

    /// A fresh iterator over one column of one row group. Iterators are
    /// per-call: concurrent scans of the same file are safe.
    fn column_iter(
        &self,
        ctx: &QueryContext,
        row_group: usize,
        column: usize,
        batch_size: usize,
        predicate: Option<ColumnPredicate>,
    ) -> Result<ColumnIterator>;
}

/// An open `vblock` data file.
pub struct VBlockFile {
    data: Arc<BlockData>,
    pool: BufferPool,
}

impl VBlockFile {
    /// Fetch and decode the data blob of a sealed block.
    pub fn open<R: BlockReader>(
        ctx: &QueryContext,
        reader: &R,
        meta: &BlockMeta,
        hint: CacheHint,
    ) -> Result<VBlockFile> {
        let bytes = reader.read(ctx, DATA_BLOB, &meta.block_id, &meta.tenant_id, hint)?;
        let data: BlockData = bitcode::decode(bytes.as_ref()).map_err(|e| {
            Error::Corruption(format!(
                "columnar data decode failed (tenant {}, block {}): {e}",
                meta.tenant_id, meta.block_id
            ))
        })?;
        if data.row_groups.len() != meta.row_group_count as usize {
            return Err(Error::Corruption(format!(
                "row group count mismatch: data has {}, meta says {}",
                data.row_groups.len(),
                meta.row_group_count
            )));
        }
        for (i, rg) in data.row_groups.iter().enumerate() {
            if rg.columns.len() != data.schema.len() {
                return Err(Error::Corruption(format!(
                    "row group {i} has {} columns, schema has {}",
                    rg.columns.len(),
                    data.schema.len()
                )));
            }
        }
        Ok(VBlockFile {
            data: Arc::new(data),
            pool: BufferPool::global().clone(),
        })
    }

    pub(crate) fn from_data(data: BlockData, pool: BufferPool) -> VBlockFile {
        VBlockFile {
            data: Arc::new(data),
            pool,
        }
    }

    /// Random-access reader over this file's rows.
    pub fn row_reader(&self) -> RowReader {
        RowReader {
            data: Arc::clone(&self.data),
            row: 0,
        }
    }
}

impl ColumnarFile for VBlockFile {
    fn num_row_groups(&self) -> usize {
        self.data.row_groups.len()
    }

    fn num_rows(&self, row_group: usize) -> Result<u64> {
        let rg = self.data.row_groups.get(row_group).ok_or_else(|| {
            Error::Invariant(format!("row group {row_group} out of range"))
        })?;
        Ok(rg.num_rows())
    }

    fn column_index(&self, dotted_path: &str) -> Option<usize> {
        self.data.schema.iter().position(|p| p == dotted_path)
    }

    fn column_iter(
        &self,
        ctx: &QueryContext,
        row_group: usize,
        column: usize,
        batch_size: usize,
        predicate: Option<ColumnPredicate>,
    ) -> Result<ColumnIterator> {
        if row_group >= self.data.row_groups.len() {
            return Err(Error::Invariant(format!(
                "row group {row_group} out of range"
            )));
        }
        if column >= self.data.schema.len() {
            return Err(Error::Invariant(format!("column {column} out of range")));
        }
        Ok(ColumnIterator::new(
            Arc::clone(&self.data),
            self.pool.clone(),
            ctx.clone(),
            row_group,
            column,
            batch_size,
            predicate,
        ))
    }
}

/// Random-access reader: seek to an absolute row, decode one trace.
pub struct RowReader {
    data: Arc<BlockData>,
    row: u64,
}

impl RowReader {
    pub fn seek_to_row(&mut self, row: u64) -> Result<()> {
        let total: u64 = self.data.row_groups.iter().map(|rg| rg.num_rows()).sum();
        if row >= total {
            return Err(Error::Invariant(format!(
                "seek to row {row} beyond file end {total}"
            )));
        }
        self.row = row;
        Ok(())
    }

    /// Decode the trace record at the current row and advance.
    pub fn read_trace(&mut self) -> Result<Trace> {
        let mut remaining = self.row;
        for rg in &self.data.row_groups {
            let rows = rg.num_rows();
            if remaining < rows {
                let payload_column = rg.columns.len() - 1;
                let bytes = rg.columns[payload_column].get(remaining as usize);
                let trace: Trace = bitcode::decode(bytes).map_err(|e| {
                    Error::Corruption(format!("trace row decode failed at row {}: {e}", self.row))
                })?;
                self.row += 1;
                return Ok(trace);
            }
            remaining -= rows;
        }
        Err(Error::Invariant(format!(
            "read past file end at row {}",
            self.row
        )))
    }
}
