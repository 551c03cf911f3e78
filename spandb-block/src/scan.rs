//! Block-wide scans feeding the expression engine.

use rustc_hash::FxHashMap;
use spandb_result::Result;
use spandb_storage::BlockReader;
use spandb_traceql::{RootExpr, Span, Spanset, Static, Status};
use spandb_types::{QueryContext, Trace};

use crate::block::Block;
use crate::columnar::{ColumnarFile, VBlockFile};
use crate::options::SearchOptions;

impl<R: BlockReader> Block<R> {
    /// Run a validated expression over every trace stored in the block.
    ///
    /// The scan materializes one spanset per trace and pipes the full list
    /// through the pipeline. Validation runs first so a bad tree never costs
    /// a block read.
    pub fn search(
        &self,
        ctx: &QueryContext,
        root: &RootExpr,
        opts: &SearchOptions,
    ) -> Result<Vec<Spanset>> {
        root.validate()?;

        let file = VBlockFile::open(ctx, self.reader(), self.meta(), opts.cache_control.footer)?;
        let mut total: u64 = 0;
        for rg in 0..file.num_row_groups() {
            total += file.num_rows(rg)?;
        }

        let mut row_reader = file.row_reader();
        let mut input = Vec::with_capacity(total as usize);
        for _ in 0..total {
            ctx.check()?;
            let trace = row_reader.read_trace()?;
            input.push(spanset_from_trace(&trace));
        }

        root.evaluate(ctx, input)
    }
}

/// Flatten a wire trace into one spanset.
///
/// Resource attributes are copied onto each span so scoped lookups work
/// without chasing the resource record; child counts are computed across the
/// whole trace.
pub fn spanset_from_trace(trace: &Trace) -> Spanset {
    let mut child_counts: FxHashMap<&[u8], u32> = FxHashMap::default();
    for rs in &trace.resource_spans {
        for s in &rs.spans {
            if !s.parent_span_id.is_empty() {
                *child_counts.entry(s.parent_span_id.as_slice()).or_default() += 1;
            }
        }
    }

    let mut spans = Vec::with_capacity(trace.span_count());
    let mut root_span_name = String::new();
    let mut root_service_name = String::new();

    for rs in &trace.resource_spans {
        let resource_attrs: FxHashMap<String, Static> = rs
            .resource_attrs
            .iter()
            .map(|(k, v)| (k.clone(), Static::from(v)))
            .collect();

        for s in &rs.spans {
            if s.parent_span_id.is_empty() && root_span_name.is_empty() {
                root_span_name = s.name.clone();
                if let Some(Static::String(service)) = resource_attrs.get("service.name") {
                    root_service_name = service.clone();
                }
            }

            spans.push(Span {
                id: s.span_id.clone(),
                parent_id: s.parent_span_id.clone(),
                start_unix_nanos: s.start_unix_nanos,
                end_unix_nanos: s.end_unix_nanos,
                name: s.name.clone(),
                status: Status::from_code(s.status_code),
                child_count: child_counts.get(s.span_id.as_slice()).copied().unwrap_or(0),
                resource_attrs: resource_attrs.clone(),
                span_attrs: s
                    .attrs
                    .iter()
                    .map(|(k, v)| (k.clone(), Static::from(v)))
                    .collect(),
            });
        }
    }

    Spanset {
        trace_id: trace.trace_id.clone(),
        root_span_name,
        root_service_name,
        duration_nanos: trace
            .end_unix_nanos()
            .saturating_sub(trace.start_unix_nanos()),
        spans,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spandb_types::{AttrValue, ResourceSpans, TraceId, TraceSpan};

    #[test]
    fn spanset_carries_root_and_child_counts() {
        let trace = Trace {
            trace_id: TraceId::new(vec![7]),
            resource_spans: vec![ResourceSpans {
                resource_attrs: vec![(
                    "service.name".into(),
                    AttrValue::String("frontend".into()),
                )],
                spans: vec![
                    TraceSpan {
                        span_id: vec![1],
                        parent_span_id: vec![],
                        name: "GET /".into(),
                        start_unix_nanos: 100,
                        end_unix_nanos: 900,
                        status_code: 1,
                        attrs: vec![],
                    },
                    TraceSpan {
                        span_id: vec![2],
                        parent_span_id: vec![1],
                        name: "auth".into(),
                        start_unix_nanos: 150,
                        end_unix_nanos: 300,
                        status_code: 1,
                        attrs: vec![("user".into(), AttrValue::String("u1".into()))],
                    },
                    TraceSpan {
                        span_id: vec![3],
                        parent_span_id: vec![1],
                        name: "db".into(),
                        start_unix_nanos: 300,
                        end_unix_nanos: 800,
                        status_code: 0,
                        attrs: vec![],
                    },
                ],
            }],
        };

        let ss = spanset_from_trace(&trace);
        assert_eq!(ss.trace_id, TraceId::new(vec![7]));
        assert_eq!(ss.root_span_name, "GET /");
        assert_eq!(ss.root_service_name, "frontend");
        assert_eq!(ss.duration_nanos, 800);
        assert_eq!(ss.spans.len(), 3);

        let root = &ss.spans[0];
        assert_eq!(root.child_count, 2);
        assert_eq!(root.status, Status::Ok);
        let db = &ss.spans[2];
        assert_eq!(db.status, Status::Error);
        assert_eq!(db.child_count, 0);
        // Resource attributes are visible from every span.
        assert_eq!(
            db.resource_attrs.get("service.name"),
            Some(&Static::String("frontend".into()))
        );
    }
}
