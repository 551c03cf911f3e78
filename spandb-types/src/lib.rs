//! Shared data model for the spandb trace store.
//!
//! These types live in `spandb-types` so the expression engine and the block
//! lookup engine can share them without depending on each other: trace
//! identifiers and their bloom shard mapping, the wire trace record, sealed
//! block metadata, and the per-query cancellation context.

pub mod ids;
pub mod meta;
pub mod query_context;
pub mod trace;

pub use ids::{TraceId, bloom_name, shard_key_for_trace_id};
pub use meta::BlockMeta;
pub use query_context::QueryContext;
pub use trace::{AttrValue, ResourceSpans, Trace, TraceSpan};
