//! Wire form of a trace, as returned to the query frontend.
//!
//! A trace groups spans by the resource that produced them. Attribute values
//! are kept as ordered key/value pairs so the record serializes with a stable
//! layout; consumers that want map semantics build them per span.

use serde::{Deserialize, Serialize};

use crate::ids::TraceId;

/// An attribute value attached to a span or a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, bitcode::Encode, bitcode::Decode)]
pub enum AttrValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

/// One span of a trace.
#[derive(
    Debug, Clone, Default, PartialEq, Serialize, Deserialize, bitcode::Encode, bitcode::Decode,
)]
pub struct TraceSpan {
    pub span_id: Vec<u8>,
    /// Empty for root spans.
    pub parent_span_id: Vec<u8>,
    pub name: String,
    pub start_unix_nanos: u64,
    pub end_unix_nanos: u64,
    /// Status code: 0 = error, 1 = ok, 2 = unset.
    pub status_code: i32,
    pub attrs: Vec<(String, AttrValue)>,
}

/// Spans emitted by one resource, plus the resource's own attributes.
#[derive(
    Debug, Clone, Default, PartialEq, Serialize, Deserialize, bitcode::Encode, bitcode::Decode,
)]
pub struct ResourceSpans {
    pub resource_attrs: Vec<(String, AttrValue)>,
    pub spans: Vec<TraceSpan>,
}

/// A complete trace.
#[derive(
    Debug, Clone, Default, PartialEq, Serialize, Deserialize, bitcode::Encode, bitcode::Decode,
)]
pub struct Trace {
    pub trace_id: TraceId,
    pub resource_spans: Vec<ResourceSpans>,
}

impl Trace {
    /// Total number of spans across all resources.
    pub fn span_count(&self) -> usize {
        self.resource_spans.iter().map(|rs| rs.spans.len()).sum()
    }

    /// Earliest span start across the trace, or 0 when the trace is empty.
    pub fn start_unix_nanos(&self) -> u64 {
        self.resource_spans
            .iter()
            .flat_map(|rs| rs.spans.iter())
            .map(|s| s.start_unix_nanos)
            .min()
            .unwrap_or(0)
    }

    /// Latest span end across the trace, or 0 when the trace is empty.
    pub fn end_unix_nanos(&self) -> u64 {
        self.resource_spans
            .iter()
            .flat_map(|rs| rs.spans.iter())
            .map(|s| s.end_unix_nanos)
            .max()
            .unwrap_or(0)
    }
}
