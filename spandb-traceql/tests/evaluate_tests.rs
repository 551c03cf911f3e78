//! Evaluator integration tests: pipeline semantics, filter behavior,
//! runtime type resolution, and cancellation.

use rustc_hash::FxHashMap;
use spandb_result::Error;
use spandb_traceql::{
    Aggregate, AggregateOp, Attribute, FieldExpression, Operator, Pipeline, PipelineElement,
    RootExpr, Span, Spanset, SpansetFilter, Static, Status,
};
use spandb_types::{QueryContext, TraceId};

fn span_with(name: &str, attrs: &[(&str, Static)]) -> Span {
    let mut span_attrs = FxHashMap::default();
    for (k, v) in attrs {
        span_attrs.insert(k.to_string(), v.clone());
    }
    Span {
        id: vec![name.len() as u8],
        name: name.to_string(),
        status: Status::Ok,
        start_unix_nanos: 0,
        end_unix_nanos: 1_000_000,
        span_attrs,
        ..Default::default()
    }
}

fn spanset(id: u8, spans: Vec<Span>) -> Spanset {
    Spanset {
        trace_id: TraceId::new(vec![id]),
        spans,
        ..Default::default()
    }
}

fn filter_eq(name: &str, value: Static) -> PipelineElement {
    PipelineElement::Filter(SpansetFilter::new(FieldExpression::binary(
        Operator::Equal,
        FieldExpression::Attribute(Attribute::new(name)),
        FieldExpression::Static(value),
    )))
}

#[test]
fn filter_keeps_matching_spans_only() {
    let input = vec![spanset(
        1,
        vec![
            span_with("a", &[("x", Static::Int(1))]),
            span_with("b", &[("x", Static::Int(2))]),
            span_with("c", &[("x", Static::Int(1))]),
        ],
    )];

    let root = RootExpr::new(Pipeline::new(vec![filter_eq("x", Static::Int(1))]));
    root.validate().unwrap();
    let out = root.evaluate(&QueryContext::new(), input.clone()).unwrap();

    assert_eq!(out.len(), 1);
    assert_eq!(out[0].trace_id, input[0].trace_id);
    assert_eq!(out[0].spans.len(), 2);
    // Output spans are drawn from the input, never fabricated.
    for span in &out[0].spans {
        assert!(input[0].spans.contains(span));
    }
}

#[test]
fn empty_spansets_are_dropped() {
    let input = vec![
        spanset(1, vec![]),
        spanset(2, vec![span_with("a", &[("x", Static::Int(1))])]),
    ];
    let root = RootExpr::new(Pipeline::new(vec![filter_eq("x", Static::Int(1))]));
    let out = root.evaluate(&QueryContext::new(), input).unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].trace_id, TraceId::new(vec![2]));
}

#[test]
fn evaluator_is_identity_on_empty_input() {
    let root = RootExpr::new(Pipeline::new(vec![
        filter_eq("x", Static::Int(1)),
        PipelineElement::Aggregate(Aggregate::new(AggregateOp::Count, None)),
    ]));
    root.validate().unwrap();
    let out = root.evaluate(&QueryContext::new(), Vec::new()).unwrap();
    assert!(out.is_empty());
}

#[test]
fn empty_pipeline_is_a_no_op() {
    let input = vec![spanset(1, vec![span_with("a", &[])])];
    let root = RootExpr::new(Pipeline::default());
    let out = root.evaluate(&QueryContext::new(), input.clone()).unwrap();
    assert_eq!(out, input);
}

#[test]
fn pipeline_short_circuits_on_empty_intermediate() {
    // { false } | count() returns [] without reaching the aggregate.
    let input = vec![spanset(1, vec![span_with("a", &[])])];
    let root = RootExpr::new(Pipeline::new(vec![
        PipelineElement::Filter(SpansetFilter::new(FieldExpression::Static(Static::Bool(
            false,
        )))),
        PipelineElement::Aggregate(Aggregate::new(AggregateOp::Count, None)),
    ]));
    root.validate().unwrap();
    let out = root.evaluate(&QueryContext::new(), input).unwrap();
    assert!(out.is_empty());
}

#[test]
fn runtime_type_mismatch_is_a_non_match() {
    // { x = "1" } validates (x defers), then drops a span where x is an int
    // and a span where x is missing.
    let filter = SpansetFilter::new(FieldExpression::binary(
        Operator::Equal,
        FieldExpression::Attribute(Attribute::new("x")),
        FieldExpression::Static(Static::String("1".into())),
    ));
    filter.validate().unwrap();

    let int_span = span_with("int", &[("x", Static::Int(1))]);
    let missing_span = span_with("missing", &[]);
    let matching_span = span_with("match", &[("x", Static::String("1".into()))]);

    assert_eq!(
        filter.expression.execute(&int_span).unwrap(),
        Static::Bool(false)
    );
    assert_eq!(
        filter.expression.execute(&missing_span).unwrap(),
        Static::Bool(false)
    );

    let out = filter
        .evaluate(
            &QueryContext::new(),
            vec![spanset(1, vec![int_span, missing_span, matching_span.clone()])],
        )
        .unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].spans, vec![matching_span]);
}

#[test]
fn stub_stages_pass_input_through() {
    let input = vec![spanset(3, vec![span_with("a", &[])])];
    let root = RootExpr::new(Pipeline::new(vec![
        PipelineElement::Aggregate(Aggregate::new(AggregateOp::Count, None)),
        PipelineElement::Coalesce(spandb_traceql::CoalesceOperation),
    ]));
    root.validate().unwrap();
    let out = root.evaluate(&QueryContext::new(), input.clone()).unwrap();
    assert_eq!(out, input);
}

#[test]
fn arithmetic_promotes_to_float() {
    let e = FieldExpression::binary(
        Operator::Add,
        FieldExpression::Attribute(Attribute::new("x")),
        FieldExpression::Static(Static::Int(2)),
    );
    let span = span_with("a", &[("x", Static::Int(3))]);
    assert_eq!(e.execute(&span).unwrap(), Static::Float(5.0));
}

#[test]
fn regex_matches_and_bad_patterns_fail_loudly() {
    let matching = FieldExpression::binary(
        Operator::Regex,
        FieldExpression::Attribute(Attribute::new("url")),
        FieldExpression::Static(Static::String("^/api/".into())),
    );
    let span = span_with("a", &[("url", Static::String("/api/cart".into()))]);
    assert_eq!(matching.execute(&span).unwrap(), Static::Bool(true));

    let negated = FieldExpression::binary(
        Operator::NotRegex,
        FieldExpression::Attribute(Attribute::new("url")),
        FieldExpression::Static(Static::String("^/api/".into())),
    );
    assert_eq!(negated.execute(&span).unwrap(), Static::Bool(false));

    let broken = FieldExpression::binary(
        Operator::Regex,
        FieldExpression::Attribute(Attribute::new("url")),
        FieldExpression::Static(Static::String("(".into())),
    );
    assert!(matches!(
        broken.execute(&span),
        Err(Error::QueryRuntime(_))
    ));
}

#[test]
fn status_literal_comparison() {
    let by_code = FieldExpression::binary(
        Operator::Equal,
        FieldExpression::Attribute(Attribute::intrinsic(
            spandb_traceql::Intrinsic::Status,
        )),
        FieldExpression::Static(Static::Int(1)),
    );
    let ok_span = span_with("a", &[]);
    assert_eq!(by_code.execute(&ok_span).unwrap(), Static::Bool(true));

    let mut err_span = ok_span.clone();
    err_span.status = Status::Error;
    assert_eq!(by_code.execute(&err_span).unwrap(), Static::Bool(false));
}

#[test]
fn unary_execution() {
    let span = span_with("a", &[("flag", Static::Bool(false)), ("n", Static::Int(4))]);
    let not_flag = FieldExpression::unary(
        Operator::Not,
        FieldExpression::Attribute(Attribute::new("flag")),
    );
    assert_eq!(not_flag.execute(&span).unwrap(), Static::Bool(true));

    let neg = FieldExpression::unary(
        Operator::Sub,
        FieldExpression::Attribute(Attribute::new("n")),
    );
    assert_eq!(neg.execute(&span).unwrap(), Static::Int(-4));

    // Undefined unary combinations yield nil.
    let not_int = FieldExpression::unary(
        Operator::Not,
        FieldExpression::Attribute(Attribute::new("n")),
    );
    assert_eq!(not_int.execute(&span).unwrap(), Static::Nil);
}

#[test]
fn implied_type_matches_execution_result() {
    // For any validated expression, execution produces the implied type
    // unless the implied type is deferred.
    let span = span_with(
        "a",
        &[
            ("s", Static::String("v".into())),
            ("n", Static::Int(2)),
            ("f", Static::Float(1.5)),
        ],
    );
    let cases = vec![
        FieldExpression::binary(
            Operator::Equal,
            FieldExpression::Attribute(Attribute::new("s")),
            FieldExpression::Static(Static::String("v".into())),
        ),
        FieldExpression::binary(
            Operator::Mult,
            FieldExpression::Static(Static::Float(2.0)),
            FieldExpression::Static(Static::Float(3.0)),
        ),
        FieldExpression::Static(Static::Duration(std::time::Duration::from_secs(1))),
        FieldExpression::unary(Operator::Not, FieldExpression::Static(Static::Bool(true))),
    ];
    for e in cases {
        e.validate().unwrap();
        let implied = e.implied_type();
        let got = e.execute(&span).unwrap().static_type();
        assert_eq!(got, implied, "expression {e}");
    }
}

#[test]
fn cancelled_context_stops_evaluation() {
    let ctx = QueryContext::new();
    ctx.cancel();
    let root = RootExpr::new(Pipeline::new(vec![filter_eq("x", Static::Int(1))]));
    let err = root
        .evaluate(&ctx, vec![spanset(1, vec![span_with("a", &[])])])
        .unwrap_err();
    assert!(matches!(err, Error::Cancelled));
}
