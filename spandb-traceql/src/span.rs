//! Span and spanset containers: the data a query filters.

use std::time::Duration;

use rustc_hash::FxHashMap;
use spandb_types::{AttrValue, TraceId};

use crate::attribute::{Attribute, AttributeScope, Intrinsic};
use crate::statics::{Static, Status};

/// One span, decoded into a lookup surface for attribute references.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Span {
    pub id: Vec<u8>,
    pub parent_id: Vec<u8>,
    pub start_unix_nanos: u64,
    pub end_unix_nanos: u64,
    pub name: String,
    pub status: Status,
    pub child_count: u32,
    pub resource_attrs: FxHashMap<String, Static>,
    pub span_attrs: FxHashMap<String, Static>,
}

impl Span {
    pub fn duration(&self) -> Duration {
        Duration::from_nanos(self.end_unix_nanos.saturating_sub(self.start_unix_nanos))
    }

    /// Resolve an attribute reference against this span.
    ///
    /// Intrinsics dispatch first. Scoped references hit one map; unscoped
    /// references fall through span attributes and then resource attributes.
    /// Anything missing resolves to `Nil` — filters treat that as non-match.
    pub fn attribute_for(&self, attr: &Attribute) -> Static {
        match attr.intrinsic {
            Intrinsic::Duration => return Static::Duration(self.duration()),
            Intrinsic::ChildCount => return Static::Int(self.child_count as i64),
            Intrinsic::Name => return Static::String(self.name.clone()),
            Intrinsic::Status => return Static::Status(self.status),
            Intrinsic::Parent => return Static::Nil,
            Intrinsic::None => {}
        }

        // Parent attributes are not materialized on the decoded span.
        if attr.parent {
            return Static::Nil;
        }

        match attr.scope {
            AttributeScope::Span => self
                .span_attrs
                .get(&attr.name)
                .cloned()
                .unwrap_or(Static::Nil),
            AttributeScope::Resource => self
                .resource_attrs
                .get(&attr.name)
                .cloned()
                .unwrap_or(Static::Nil),
            AttributeScope::None => self
                .span_attrs
                .get(&attr.name)
                .or_else(|| self.resource_attrs.get(&attr.name))
                .cloned()
                .unwrap_or(Static::Nil),
        }
    }
}

/// An ordered collection of spans sharing one trace id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Spanset {
    pub trace_id: TraceId,
    pub root_span_name: String,
    pub root_service_name: String,
    pub duration_nanos: u64,
    pub spans: Vec<Span>,
}

impl From<&AttrValue> for Static {
    fn from(v: &AttrValue) -> Static {
        match v {
            AttrValue::String(s) => Static::String(s.clone()),
            AttrValue::Int(n) => Static::Int(*n),
            AttrValue::Float(f) => Static::Float(*f),
            AttrValue::Bool(b) => Static::Bool(*b),
        }
    }
}
