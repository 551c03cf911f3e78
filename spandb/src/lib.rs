//! spandb: the read core of a trace store.
//!
//! This crate is the workspace entrypoint. It re-exports the two engines and
//! their shared model from the underlying `spandb-*` crates so applications
//! see a single surface:
//!
//! - **Expression engine** (`spandb-traceql`): a typed AST for the span
//!   query language with a bottom-up validator and a pipeline evaluator over
//!   spansets. It consumes a built tree; parsing lives with the caller.
//! - **Block lookup engine** (`spandb-block`): the sealed `vblock` columnar
//!   layout plus [`Block::find_trace_by_id`] — bloom probe, tri-state binary
//!   search over row-group bounds, in-group predicate scan — and
//!   [`Block::search`], a block-wide scan piped through the expression
//!   pipeline.
//! - **Shared model** (`spandb-types`): trace ids and their bloom shard
//!   mapping, the wire trace record, sealed block metadata, and the
//!   per-query cancellation context.
//! - **Storage** (`spandb-storage`): the [`BlockReader`] sidecar trait with
//!   in-memory and instrumented implementations, and the levelled buffer
//!   pool backing column pages.
//!
//! Absence is never an error: looking up a trace id that no block stores
//! yields `Ok(None)`. Everything else surfaces one of the variants of
//! [`Error`].
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use spandb::{
//!     Block, BlockBuilder, BlockConfig, MemBlockStore, QueryContext, ResourceSpans,
//!     SearchOptions, Trace, TraceId, TraceSpan,
//! };
//!
//! # fn main() -> spandb::Result<()> {
//! let store = Arc::new(MemBlockStore::new());
//!
//! let mut builder = BlockBuilder::new(BlockConfig::default());
//! builder.push(Trace {
//!     trace_id: TraceId::from_hex("deadbeef")?,
//!     resource_spans: vec![ResourceSpans {
//!         resource_attrs: vec![],
//!         spans: vec![TraceSpan {
//!             span_id: vec![1],
//!             name: "GET /".into(),
//!             status_code: 1,
//!             ..Default::default()
//!         }],
//!     }],
//! });
//! let meta = builder.seal("block-1", "tenant-1", store.as_ref())?;
//!
//! let block = Block::new(meta, store);
//! let ctx = QueryContext::new();
//! let trace = block.find_trace_by_id(&ctx, &TraceId::from_hex("deadbeef")?, &SearchOptions::default())?;
//! assert!(trace.is_some());
//! # Ok(())
//! # }
//! ```

pub use spandb_result::{Error, Result};

pub use spandb_types::{
    AttrValue, BlockMeta, QueryContext, ResourceSpans, Trace, TraceId, TraceSpan, bloom_name,
    shard_key_for_trace_id,
};

pub use spandb_traceql as traceql;
pub use spandb_traceql::{
    Aggregate, AggregateOp, Attribute, AttributeScope, BinaryOperation, CoalesceOperation,
    FieldExpression, GroupOperation, Intrinsic, Operator, Pipeline, PipelineElement, RootExpr,
    ScalarExpression, ScalarFilter, ScalarOperation, Span, Spanset, SpansetExpression,
    SpansetFilter, SpansetOperation, Static, StaticType, Status, UnaryOperation,
};

pub use spandb_storage::{
    BlockReader, BlockWriter, BufferPool, BufferedPage, CacheHint, InstrumentedReader,
    MemBlockStore, PoolBuffer, ReadStats, ReadStatsSnapshot,
};

pub use spandb_block::{
    Block, BlockBuilder, BlockConfig, CacheControl, ColumnIterator, ColumnPredicate, ColumnValue,
    ColumnarFile, RowReader, SearchOptions, TraceBloom, VBlockFile, spanset_from_trace,
};
