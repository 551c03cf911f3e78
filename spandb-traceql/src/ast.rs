//! Expression tree node definitions.
//!
//! One enum per expression category replaces the marker-interface scheme a
//! dynamically typed tree would need: [`PipelineElement`] for pipeline
//! stages, [`SpansetExpression`] for operands of spanset algebra,
//! [`ScalarExpression`] for scalar positions, and [`FieldExpression`] for
//! per-span expressions. Validation lives in `validate`, evaluation in
//! `evaluate`, rendering in `format`.

use crate::attribute::Attribute;
use crate::ops::{AggregateOp, Operator};
use crate::statics::{Static, StaticType};

/// The root of a query expression: a pipeline of spanset stages.
#[derive(Debug, Clone, PartialEq)]
pub struct RootExpr {
    pub pipeline: Pipeline,
}

impl RootExpr {
    pub fn new(pipeline: Pipeline) -> RootExpr {
        RootExpr { pipeline }
    }
}

impl From<PipelineElement> for RootExpr {
    /// Wrap a single stage into a one-element pipeline.
    fn from(element: PipelineElement) -> RootExpr {
        RootExpr {
            pipeline: Pipeline::new(vec![element]),
        }
    }
}

/// An ordered list of stages; output of one feeds the next.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pipeline {
    pub elements: Vec<PipelineElement>,
}

impl Pipeline {
    pub fn new(elements: Vec<PipelineElement>) -> Pipeline {
        Pipeline { elements }
    }

    pub fn add_item(mut self, element: PipelineElement) -> Pipeline {
        self.elements.push(element);
        self
    }

    /// A pipeline produces spansets unless its final stage is an aggregate.
    /// The empty pipeline is a no-op and types as `Spanset`.
    pub fn implied_type(&self) -> StaticType {
        match self.elements.last() {
            Some(PipelineElement::Aggregate(a)) => a.implied_type(),
            _ => StaticType::Spanset,
        }
    }
}

/// One stage of a pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineElement {
    Filter(SpansetFilter),
    SpansetOp(SpansetOperation),
    ScalarFilter(ScalarFilter),
    Aggregate(Aggregate),
    Group(GroupOperation),
    Coalesce(CoalesceOperation),
}

/// Keeps the spans for which a boolean field expression holds.
#[derive(Debug, Clone, PartialEq)]
pub struct SpansetFilter {
    pub expression: FieldExpression,
}

impl SpansetFilter {
    pub fn new(expression: FieldExpression) -> SpansetFilter {
        SpansetFilter { expression }
    }
}

/// Set algebra over two spanset expressions.
#[derive(Debug, Clone, PartialEq)]
pub struct SpansetOperation {
    pub op: Operator,
    pub lhs: SpansetExpression,
    pub rhs: SpansetExpression,
}

/// Operand position of spanset algebra.
#[derive(Debug, Clone, PartialEq)]
pub enum SpansetExpression {
    Pipeline(Pipeline),
    Operation(Box<SpansetOperation>),
    Filter(SpansetFilter),
    ScalarFilter(ScalarFilter),
}

/// Compares two scalar expressions, dropping spansets that fail.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarFilter {
    pub op: Operator,
    pub lhs: ScalarExpression,
    pub rhs: ScalarExpression,
}

/// A scalar-valued expression.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarExpression {
    Operation(Box<ScalarOperation>),
    Aggregate(Aggregate),
    Static(Static),
    /// A pipeline may be embedded where a scalar is expected.
    Pipeline(Pipeline),
}

impl ScalarExpression {
    pub fn implied_type(&self) -> StaticType {
        match self {
            ScalarExpression::Operation(o) => o.implied_type(),
            ScalarExpression::Aggregate(a) => a.implied_type(),
            ScalarExpression::Static(s) => s.static_type(),
            ScalarExpression::Pipeline(p) => p.implied_type(),
        }
    }
}

/// Binary operation in scalar position.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarOperation {
    pub op: Operator,
    pub lhs: ScalarExpression,
    pub rhs: ScalarExpression,
}

impl ScalarOperation {
    /// Boolean operators yield booleans; the rest inherit the operand type,
    /// preferring whichever side is already concrete.
    pub fn implied_type(&self) -> StaticType {
        if self.op.is_boolean() {
            return StaticType::Boolean;
        }
        let t = self.lhs.implied_type();
        if t != StaticType::Attribute {
            return t;
        }
        self.rhs.implied_type()
    }
}

/// An aggregation over the spans of each spanset.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    pub op: AggregateOp,
    pub expression: Option<FieldExpression>,
}

impl Aggregate {
    pub fn new(op: AggregateOp, expression: Option<FieldExpression>) -> Aggregate {
        Aggregate { op, expression }
    }

    /// `count` always yields an integer; the others inherit their argument.
    pub fn implied_type(&self) -> StaticType {
        if self.op == AggregateOp::Count {
            return StaticType::Int;
        }
        match &self.expression {
            Some(e) => e.implied_type(),
            None => StaticType::Int,
        }
    }
}

/// Groups spansets by a field expression.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupOperation {
    pub expression: FieldExpression,
}

/// Merges adjacent spansets of the same trace.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoalesceOperation;

/// An expression evaluated against a single span.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldExpression {
    Binary(Box<BinaryOperation>),
    Unary(Box<UnaryOperation>),
    Attribute(Attribute),
    Static(Static),
}

impl FieldExpression {
    pub fn binary(op: Operator, lhs: FieldExpression, rhs: FieldExpression) -> FieldExpression {
        FieldExpression::Binary(Box::new(BinaryOperation { op, lhs, rhs }))
    }

    pub fn unary(op: Operator, expression: FieldExpression) -> FieldExpression {
        FieldExpression::Unary(Box::new(UnaryOperation { op, expression }))
    }

    pub fn implied_type(&self) -> StaticType {
        match self {
            FieldExpression::Binary(o) => o.implied_type(),
            FieldExpression::Unary(o) => o.implied_type(),
            FieldExpression::Attribute(a) => a.implied_type(),
            FieldExpression::Static(s) => s.static_type(),
        }
    }

    /// True when the expression reads anything off the span itself.
    pub fn references_span(&self) -> bool {
        match self {
            FieldExpression::Binary(o) => o.lhs.references_span() || o.rhs.references_span(),
            FieldExpression::Unary(o) => o.expression.references_span(),
            FieldExpression::Attribute(a) => a.references_span(),
            FieldExpression::Static(_) => false,
        }
    }
}

/// Binary operation over two field expressions.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryOperation {
    pub op: Operator,
    pub lhs: FieldExpression,
    pub rhs: FieldExpression,
}

impl BinaryOperation {
    pub fn implied_type(&self) -> StaticType {
        if self.op.is_boolean() {
            return StaticType::Boolean;
        }
        let t = self.lhs.implied_type();
        if t != StaticType::Attribute {
            return t;
        }
        self.rhs.implied_type()
    }
}

/// Unary operation over a field expression.
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryOperation {
    pub op: Operator,
    pub expression: FieldExpression,
}

impl UnaryOperation {
    pub fn implied_type(&self) -> StaticType {
        self.expression.implied_type()
    }
}
