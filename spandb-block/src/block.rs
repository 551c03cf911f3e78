//! Point lookup: bloom probe, row-group bracket search, in-group scan.

use std::cmp::Ordering;
use std::sync::Arc;

use spandb_result::{Error, Result};
use spandb_storage::{BlockReader, CacheHint};
use spandb_types::{BlockMeta, QueryContext, Trace, TraceId, bloom_name, shard_key_for_trace_id};

use crate::bloom::TraceBloom;
use crate::columnar::{ColumnarFile, META_BLOB, TRACE_ID_COLUMN, VBlockFile};
use crate::iter::ColumnPredicate;
use crate::options::SearchOptions;
use crate::search::binary_search_by;

/// Batch hint for the in-group predicate scan.
const FIND_BATCH_SIZE: usize = 1024;

/// A sealed block opened for reads.
pub struct Block<R: BlockReader> {
    meta: BlockMeta,
    reader: Arc<R>,
}

impl<R: BlockReader> Block<R> {
    pub fn new(meta: BlockMeta, reader: Arc<R>) -> Block<R> {
        Block { meta, reader }
    }

    /// Open a block by fetching and decoding its metadata sidecar.
    pub fn open(
        ctx: &QueryContext,
        block_id: &str,
        tenant_id: &str,
        reader: Arc<R>,
    ) -> Result<Block<R>> {
        let bytes = reader.read(ctx, META_BLOB, block_id, tenant_id, CacheHint::Hit)?;
        let meta = BlockMeta::from_bytes(bytes.as_ref())?;
        Ok(Block::new(meta, reader))
    }

    pub fn meta(&self) -> &BlockMeta {
        &self.meta
    }

    pub(crate) fn reader(&self) -> &R {
        self.reader.as_ref()
    }

    /// Probe the bloom shard owning `id`. A read or decode failure is an
    /// error, never a miss.
    fn check_bloom(&self, ctx: &QueryContext, id: &TraceId, hint: CacheHint) -> Result<bool> {
        let shard = shard_key_for_trace_id(id, self.meta.bloom_shard_count);
        let bytes = self.reader.read(
            ctx,
            &bloom_name(shard),
            &self.meta.block_id,
            &self.meta.tenant_id,
            hint,
        )?;
        let filter = TraceBloom::from_bytes(bytes.as_ref())?;
        Ok(filter.check(id))
    }

    /// Look up one trace by id. Absence is `Ok(None)`.
    ///
    /// The bloom probe strictly precedes any column read; a miss returns
    /// without ever opening the columnar file.
    pub fn find_trace_by_id(
        &self,
        ctx: &QueryContext,
        trace_id: &TraceId,
        opts: &SearchOptions,
    ) -> Result<Option<Trace>> {
        if !self.check_bloom(ctx, trace_id, opts.cache_control.bloom)? {
            return Ok(None);
        }

        let file = VBlockFile::open(
            ctx,
            self.reader.as_ref(),
            &self.meta,
            opts.cache_control.footer,
        )?;
        let Some(trace_id_col) = file.column_index(TRACE_ID_COLUMN) else {
            return Err(Error::Corruption(format!(
                "unable to get index for column: {TRACE_ID_COLUMN}"
            )));
        };

        let num_row_groups = file.num_row_groups();
        if num_row_groups == 0 {
            return Ok(None);
        }

        // Call-local cache of row group lower bounds. The slot past the end
        // holds the block max, which is inclusive; the bracket comparator
        // below special-cases the final group accordingly.
        let mut mins: Vec<Option<TraceId>> = vec![None; num_row_groups + 1];
        mins[0] = Some(self.meta.min_id.clone());
        mins[num_row_groups] = Some(self.meta.max_id.clone());

        if opts.prefetch_trace_id {
            for r in 1..num_row_groups {
                load_row_group_min(&file, ctx, trace_id_col, &mut mins, r)?;
            }
        }

        let row_group = binary_search_by(num_row_groups, |r| {
            let lo = load_row_group_min(&file, ctx, trace_id_col, &mut mins, r)?;
            let check = trace_id.cmp(&lo);
            if check != Ordering::Greater {
                // Before this group, or exactly at its first id.
                return Ok(check);
            }

            // The upper bound is the next group's min, exclusive — the next
            // group owns an equal boundary — except for the final group,
            // whose bound is the block max, inclusive.
            let hi = load_row_group_min(&file, ctx, trace_id_col, &mut mins, r + 1)?;
            match trace_id.cmp(&hi) {
                Ordering::Greater => Ok(Ordering::Greater),
                Ordering::Equal if r < num_row_groups - 1 => Ok(Ordering::Greater),
                _ => Ok(Ordering::Equal),
            }
        })?;

        let Some(row_group) = row_group else {
            // Not within the bounds of any row group.
            return Ok(None);
        };

        let mut iter = file.column_iter(
            ctx,
            row_group,
            trace_id_col,
            FIND_BATCH_SIZE,
            Some(ColumnPredicate::BytesEq(trace_id.as_bytes().to_vec())),
        )?;
        let Some(hit) = iter.next()? else {
            // Bloom false positive: the id is bracketed but not stored.
            return Ok(None);
        };
        iter.close();

        // The row number out of the iterator is relative to the row group;
        // offset it by the rows of all preceding groups.
        let mut row = hit.row_number;
        for rg in 0..row_group {
            row += file.num_rows(rg)?;
        }

        let mut row_reader = file.row_reader();
        row_reader.seek_to_row(row)?;
        let trace = row_reader.read_trace()?;
        Ok(Some(trace))
    }
}

fn load_row_group_min(
    file: &VBlockFile,
    ctx: &QueryContext,
    column: usize,
    mins: &mut [Option<TraceId>],
    r: usize,
) -> Result<TraceId> {
    if let Some(min) = &mins[r] {
        return Ok(min.clone());
    }

    // Read the first value of the row group. Row groups are never empty, so
    // an empty read means the block lies about itself.
    let mut iter = file.column_iter(ctx, r, column, 1, None)?;
    let value = iter.next()?.ok_or_else(|| {
        Error::Corruption(format!("failed to read 1 value from row group {r}"))
    })?;

    let min = TraceId::new(value.value);
    mins[r] = Some(min.clone());
    Ok(min)
}
