//! Typed expression engine for the span query language.
//!
//! The engine consumes a built AST; it parses nothing itself. Expressions are
//! plain enums per category — pipeline elements, spanset expressions, scalar
//! expressions, field expressions — each carrying `validate`, `evaluate` /
//! `execute`, `implied_type`, `references_span`, and `Display`.
//!
//! Validation is a pure bottom-up walk that surfaces the first type error
//! together with the offending subtree. Evaluation pipes a list of spansets
//! through the pipeline elements in declared order, short-circuiting as soon
//! as an intermediate result is empty.

pub mod ast;
pub mod attribute;
mod evaluate;
mod format;
pub mod ops;
pub mod span;
pub mod statics;
mod validate;

pub use ast::{
    Aggregate, BinaryOperation, CoalesceOperation, FieldExpression, GroupOperation, Pipeline,
    PipelineElement, RootExpr, ScalarExpression, ScalarFilter, ScalarOperation, SpansetExpression,
    SpansetFilter, SpansetOperation, UnaryOperation,
};
pub use attribute::{Attribute, AttributeScope, Intrinsic};
pub use ops::{AggregateOp, Operator};
pub use span::{Span, Spanset};
pub use statics::{Static, StaticType, Status};
