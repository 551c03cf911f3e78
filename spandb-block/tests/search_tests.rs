//! Structured search over sealed blocks: block scan piped through the
//! expression pipeline.

use std::sync::Arc;

use spandb_block::{Block, BlockBuilder, BlockConfig, SearchOptions};
use spandb_result::Error;
use spandb_storage::MemBlockStore;
use spandb_traceql::{
    Aggregate, AggregateOp, Attribute, FieldExpression, Intrinsic, Operator, Pipeline,
    PipelineElement, RootExpr, SpansetFilter, Static,
};
use spandb_types::{AttrValue, QueryContext, ResourceSpans, Trace, TraceId, TraceSpan};

const TENANT: &str = "single-tenant";
const BLOCK: &str = "block-1";

fn trace_with(id: u8, service: &str, route: &str, status_code: i32) -> Trace {
    Trace {
        trace_id: TraceId::new(vec![id]),
        resource_spans: vec![ResourceSpans {
            resource_attrs: vec![(
                "service.name".to_string(),
                AttrValue::String(service.to_string()),
            )],
            spans: vec![
                TraceSpan {
                    span_id: vec![1],
                    parent_span_id: vec![],
                    name: route.to_string(),
                    start_unix_nanos: 0,
                    end_unix_nanos: 5_000_000,
                    status_code,
                    attrs: vec![(
                        "http.route".to_string(),
                        AttrValue::String(route.to_string()),
                    )],
                },
                TraceSpan {
                    span_id: vec![2],
                    parent_span_id: vec![1],
                    name: "db.query".to_string(),
                    start_unix_nanos: 1_000_000,
                    end_unix_nanos: 2_000_000,
                    status_code: 1,
                    attrs: vec![],
                },
            ],
        }],
    }
}

fn sealed_block() -> Block<MemBlockStore> {
    let store = Arc::new(MemBlockStore::new());
    let mut builder = BlockBuilder::new(BlockConfig {
        row_group_rows: 2,
        bloom_shard_count: 2,
    });
    builder.push(trace_with(1, "frontend", "/cart", 1));
    builder.push(trace_with(2, "frontend", "/checkout", 0));
    builder.push(trace_with(3, "backend", "/cart", 1));
    builder.push(trace_with(4, "backend", "/admin", 0));
    let meta = builder.seal(BLOCK, TENANT, store.as_ref()).unwrap();
    Block::new(meta, store)
}

fn filter(expression: FieldExpression) -> RootExpr {
    RootExpr::new(Pipeline::new(vec![PipelineElement::Filter(
        SpansetFilter::new(expression),
    )]))
}

#[test]
fn search_filters_by_span_attribute() {
    let block = sealed_block();
    let root = filter(FieldExpression::binary(
        Operator::Equal,
        FieldExpression::Attribute(Attribute::new("http.route")),
        FieldExpression::Static(Static::String("/cart".into())),
    ));

    let results = block
        .search(&QueryContext::new(), &root, &SearchOptions::default())
        .unwrap();

    let mut trace_ids: Vec<TraceId> = results.iter().map(|ss| ss.trace_id.clone()).collect();
    trace_ids.sort();
    assert_eq!(trace_ids, vec![TraceId::new(vec![1]), TraceId::new(vec![3])]);
    // Only the span carrying the attribute survives the filter.
    for ss in &results {
        assert_eq!(ss.spans.len(), 1);
        assert_eq!(ss.spans[0].name, "/cart");
    }
}

#[test]
fn search_filters_by_resource_scope_fallthrough() {
    let block = sealed_block();
    let root = filter(FieldExpression::binary(
        Operator::Equal,
        FieldExpression::Attribute(Attribute::new("service.name")),
        FieldExpression::Static(Static::String("backend".into())),
    ));

    let results = block
        .search(&QueryContext::new(), &root, &SearchOptions::default())
        .unwrap();
    assert_eq!(results.len(), 2);
    // Resource attributes apply to every span of the resource.
    for ss in &results {
        assert_eq!(ss.spans.len(), 2);
    }
}

#[test]
fn search_filters_by_status_code_literal() {
    let block = sealed_block();
    let root = filter(FieldExpression::binary(
        Operator::Equal,
        FieldExpression::Attribute(Attribute::intrinsic(Intrinsic::Status)),
        FieldExpression::Static(Static::Int(0)),
    ));

    let results = block
        .search(&QueryContext::new(), &root, &SearchOptions::default())
        .unwrap();
    let mut trace_ids: Vec<TraceId> = results.iter().map(|ss| ss.trace_id.clone()).collect();
    trace_ids.sort();
    assert_eq!(trace_ids, vec![TraceId::new(vec![2]), TraceId::new(vec![4])]);
}

#[test]
fn search_with_no_matches_returns_empty() {
    let block = sealed_block();
    let root = filter(FieldExpression::binary(
        Operator::Equal,
        FieldExpression::Attribute(Attribute::new("http.route")),
        FieldExpression::Static(Static::String("/missing".into())),
    ));
    let results = block
        .search(&QueryContext::new(), &root, &SearchOptions::default())
        .unwrap();
    assert!(results.is_empty());
}

#[test]
fn search_with_empty_pipeline_returns_every_trace() {
    let block = sealed_block();
    let root = RootExpr::new(Pipeline::default());
    let results = block
        .search(&QueryContext::new(), &root, &SearchOptions::default())
        .unwrap();
    assert_eq!(results.len(), 4);
    for ss in &results {
        assert_eq!(ss.spans.len(), 2);
        assert!(!ss.root_span_name.is_empty());
        assert!(!ss.root_service_name.is_empty());
        assert_eq!(ss.duration_nanos, 5_000_000);
    }
}

#[test]
fn invalid_queries_never_touch_the_block() {
    let block = sealed_block();
    // Int compared to String with both sides concrete.
    let root = filter(FieldExpression::binary(
        Operator::Equal,
        FieldExpression::Static(Static::Int(1)),
        FieldExpression::Static(Static::String("1".into())),
    ));
    let err = block
        .search(&QueryContext::new(), &root, &SearchOptions::default())
        .unwrap_err();
    assert!(matches!(err, Error::QueryInvalid(_)));
}

#[test]
fn trailing_aggregate_stub_passes_filtered_spansets_through() {
    let block = sealed_block();
    let root = RootExpr::new(Pipeline::new(vec![
        PipelineElement::Filter(SpansetFilter::new(FieldExpression::binary(
            Operator::Equal,
            FieldExpression::Attribute(Attribute::new("service.name")),
            FieldExpression::Static(Static::String("frontend".into())),
        ))),
        PipelineElement::Aggregate(Aggregate::new(AggregateOp::Count, None)),
    ]));
    let results = block
        .search(&QueryContext::new(), &root, &SearchOptions::default())
        .unwrap();
    assert_eq!(results.len(), 2);
}

#[test]
fn cancelled_search_stops_early() {
    let block = sealed_block();
    let ctx = QueryContext::new();
    ctx.cancel();
    let root = RootExpr::new(Pipeline::default());
    let err = block
        .search(&ctx, &root, &SearchOptions::default())
        .unwrap_err();
    assert!(matches!(err, Error::Cancelled));
}
