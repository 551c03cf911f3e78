//! Validator integration tests: accepted and rejected expression shapes.

use spandb_result::Error;
use spandb_traceql::{
    Aggregate, AggregateOp, Attribute, CoalesceOperation, FieldExpression, GroupOperation,
    Intrinsic, Operator, Pipeline, PipelineElement, RootExpr, ScalarExpression, ScalarFilter,
    ScalarOperation, SpansetExpression, SpansetFilter, SpansetOperation, Static, StaticType,
};

fn attr(name: &str) -> FieldExpression {
    FieldExpression::Attribute(Attribute::new(name))
}

fn int(n: i64) -> FieldExpression {
    FieldExpression::Static(Static::Int(n))
}

fn assert_invalid(err: Error, needle: &str) {
    match err {
        Error::QueryInvalid(msg) => {
            assert!(msg.contains(needle), "message {msg:?} missing {needle:?}")
        }
        other => panic!("expected QueryInvalid, got {other:?}"),
    }
}

#[test]
fn static_and_attribute_always_validate() {
    assert!(attr("anything").validate().is_ok());
    assert!(int(42).validate().is_ok());
}

#[test]
fn mixed_concrete_types_are_rejected() {
    let e = FieldExpression::binary(Operator::Equal, int(1), FieldExpression::Static(
        Static::String("1".into()),
    ));
    assert_invalid(
        e.validate().unwrap_err(),
        "binary operations must operate on the same type",
    );
}

#[test]
fn attribute_operand_defers_type_checks() {
    // The same comparison validates when one side is only known at runtime.
    let e = FieldExpression::binary(
        Operator::Equal,
        attr("x"),
        FieldExpression::Static(Static::String("1".into())),
    );
    assert!(e.validate().is_ok());
}

#[test]
fn illegal_operator_for_types_is_rejected() {
    let e = FieldExpression::binary(
        Operator::Greater,
        FieldExpression::Static(Static::String("a".into())),
        FieldExpression::Static(Static::String("b".into())),
    );
    assert_invalid(
        e.validate().unwrap_err(),
        "illegal operation for the given types",
    );

    let e = FieldExpression::binary(
        Operator::Add,
        FieldExpression::Static(Static::Bool(true)),
        FieldExpression::Static(Static::Bool(false)),
    );
    assert_invalid(
        e.validate().unwrap_err(),
        "illegal operation for the given types",
    );
}

#[test]
fn int_compares_against_status_literals() {
    // Filters write numeric status codes; { status = 1 } must validate.
    let e = FieldExpression::binary(
        Operator::Equal,
        FieldExpression::Attribute(Attribute::intrinsic(Intrinsic::Status)),
        int(1),
    );
    assert!(e.validate().is_ok());
}

#[test]
fn unary_checks_concrete_types_only() {
    assert!(FieldExpression::unary(Operator::Not, attr("flag")).validate().is_ok());
    assert!(
        FieldExpression::unary(Operator::Not, FieldExpression::Static(Static::Bool(true)))
            .validate()
            .is_ok()
    );
    assert!(FieldExpression::unary(Operator::Sub, int(3)).validate().is_ok());
    assert_invalid(
        FieldExpression::unary(
            Operator::Not,
            FieldExpression::Static(Static::String("x".into())),
        )
        .validate()
        .unwrap_err(),
        "illegal operation for the given type",
    );
}

#[test]
fn validation_reports_the_offending_subtree() {
    let err = FieldExpression::binary(
        Operator::Equal,
        int(1),
        FieldExpression::Static(Static::String("one".into())),
    )
    .validate()
    .unwrap_err();
    assert_invalid(err, "1 = \"one\"");
}

#[test]
fn spanset_filter_requires_boolean_or_deferred() {
    let ok = SpansetFilter::new(FieldExpression::binary(Operator::Equal, attr("x"), int(1)));
    assert!(ok.validate().is_ok());

    let deferred = SpansetFilter::new(attr("x"));
    assert!(deferred.validate().is_ok());

    let not_boolean = SpansetFilter::new(int(1));
    assert_invalid(
        not_boolean.validate().unwrap_err(),
        "span filter field expressions must resolve to a boolean",
    );
}

#[test]
fn group_requires_span_reference() {
    let ok = GroupOperation { expression: attr("service") };
    assert!(ok.validate().is_ok());

    let constant = GroupOperation { expression: int(1) };
    assert_invalid(
        constant.validate().unwrap_err(),
        "grouping field expressions must reference the span",
    );
}

#[test]
fn aggregate_rules() {
    // No field expression: fine.
    assert!(Aggregate::new(AggregateOp::Count, None).validate().is_ok());

    // Numeric intrinsic: fine.
    assert!(
        Aggregate::new(
            AggregateOp::Avg,
            Some(FieldExpression::Attribute(Attribute::intrinsic(
                Intrinsic::Duration
            ))),
        )
        .validate()
        .is_ok()
    );

    // Non-numeric argument rejected.
    assert_invalid(
        Aggregate::new(
            AggregateOp::Max,
            Some(FieldExpression::Attribute(Attribute::intrinsic(
                Intrinsic::Name
            ))),
        )
        .validate()
        .unwrap_err(),
        "aggregate field expressions must resolve to a number type",
    );

    // Constant argument rejected.
    assert_invalid(
        Aggregate::new(AggregateOp::Sum, Some(int(1))).validate().unwrap_err(),
        "aggregate field expressions must reference the span",
    );
}

#[test]
fn scalar_operation_and_filter_check_types() {
    let bad = ScalarOperation {
        op: Operator::Add,
        lhs: ScalarExpression::Static(Static::Int(1)),
        rhs: ScalarExpression::Static(Static::String("x".into())),
    };
    assert_invalid(
        bad.validate().unwrap_err(),
        "binary operations must operate on the same type",
    );

    let ok = ScalarFilter {
        op: Operator::Greater,
        lhs: ScalarExpression::Aggregate(Aggregate::new(AggregateOp::Count, None)),
        rhs: ScalarExpression::Static(Static::Int(10)),
    };
    assert!(ok.validate().is_ok());
}

#[test]
fn spanset_operation_and_coalesce_recurse_only() {
    let bad_inner = SpansetFilter::new(int(7));
    let op = SpansetOperation {
        op: Operator::And,
        lhs: SpansetExpression::Filter(SpansetFilter::new(attr("x"))),
        rhs: SpansetExpression::Filter(bad_inner),
    };
    // The failure bubbles out of the right-hand child.
    assert!(op.validate().is_err());

    assert!(CoalesceOperation.validate().is_ok());
}

#[test]
fn validation_is_bottom_up_through_the_root() {
    let root = RootExpr::new(Pipeline::new(vec![
        PipelineElement::Filter(SpansetFilter::new(FieldExpression::binary(
            Operator::Equal,
            attr("x"),
            int(1),
        ))),
        PipelineElement::Filter(SpansetFilter::new(int(3))),
    ]));
    assert!(root.validate().is_err());
}

#[test]
fn embedded_pipeline_types_as_scalar() {
    let inner = Pipeline::new(vec![PipelineElement::Aggregate(Aggregate::new(
        AggregateOp::Count,
        None,
    ))]);
    assert_eq!(inner.implied_type(), StaticType::Int);
    let filter = ScalarFilter {
        op: Operator::Greater,
        lhs: ScalarExpression::Pipeline(inner),
        rhs: ScalarExpression::Static(Static::Int(3)),
    };
    assert!(filter.validate().is_ok());
}
