//! Batched, predicate-filtered iteration over one column of one row group.

use std::sync::Arc;

use spandb_result::Result;
use spandb_storage::{BufferPool, BufferedPage};
use spandb_types::QueryContext;

use crate::columnar::BlockData;

/// Predicate applied to each value during a scan.
#[derive(Debug, Clone)]
pub enum ColumnPredicate {
    /// Exact byte equality.
    BytesEq(Vec<u8>),
    /// Membership in a set of byte strings.
    BytesIn(Vec<Vec<u8>>),
}

impl ColumnPredicate {
    pub fn matches(&self, value: &[u8]) -> bool {
        match self {
            ColumnPredicate::BytesEq(target) => value == target.as_slice(),
            ColumnPredicate::BytesIn(targets) => targets.iter().any(|t| value == t.as_slice()),
        }
    }
}

/// One matching value and its row number *relative to the scanned row group*.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnValue {
    pub row_number: u64,
    pub value: Vec<u8>,
}

/// Scans a column in batches, materializing each batch as a pooled
/// [`BufferedPage`] and emitting values the predicate accepts.
pub struct ColumnIterator {
    data: Arc<BlockData>,
    pool: BufferPool,
    ctx: QueryContext,
    row_group: usize,
    column: usize,
    batch_size: usize,
    predicate: Option<ColumnPredicate>,
    /// Next row (relative to the row group) to load into a page.
    next_row: usize,
    page: Option<BufferedPage>,
    page_first_row: usize,
    page_cursor: usize,
}

impl ColumnIterator {
    pub(crate) fn new(
        data: Arc<BlockData>,
        pool: BufferPool,
        ctx: QueryContext,
        row_group: usize,
        column: usize,
        batch_size: usize,
        predicate: Option<ColumnPredicate>,
    ) -> ColumnIterator {
        ColumnIterator {
            data,
            pool,
            ctx,
            row_group,
            column,
            batch_size: batch_size.max(1),
            predicate,
            next_row: 0,
            page: None,
            page_first_row: 0,
            page_cursor: 0,
        }
    }

    /// The next matching value, or `None` when the row group is exhausted.
    pub fn next(&mut self) -> Result<Option<ColumnValue>> {
        loop {
            if self.page.is_none() {
                let column = &self.data.row_groups[self.row_group].columns[self.column];
                if self.next_row >= column.len() {
                    return Ok(None);
                }
                // Page loads are the suspension points of a scan.
                self.ctx.check()?;
                let end = (self.next_row + self.batch_size).min(column.len());
                let (values, offsets) = column.page_arenas(self.next_row, end);
                self.page = Some(BufferedPage::new(&self.pool, values, &offsets, &[], &[]));
                self.page_first_row = self.next_row;
                self.page_cursor = 0;
                self.next_row = end;
            }

            let page = self.page.as_ref().expect("page loaded above");
            while self.page_cursor < page.num_values() {
                let i = self.page_cursor;
                self.page_cursor += 1;
                let value = page.value(i);
                let keep = match &self.predicate {
                    Some(p) => p.matches(value),
                    None => true,
                };
                if keep {
                    return Ok(Some(ColumnValue {
                        row_number: (self.page_first_row + i) as u64,
                        value: value.to_vec(),
                    }));
                }
            }

            if let Some(mut page) = self.page.take() {
                page.release();
            }
        }
    }

    /// Release the in-flight page. Also runs on drop.
    pub fn close(&mut self) {
        if let Some(mut page) = self.page.take() {
            page.release();
        }
    }
}

impl Drop for ColumnIterator {
    fn drop(&mut self) {
        self.close();
    }
}
