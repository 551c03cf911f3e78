//! Display rendering for expression trees.
//!
//! The rendered form feeds validation errors, so every node prints something
//! a person can map back onto the query they built.

use std::fmt;

use crate::ast::*;
use crate::attribute::{Attribute, AttributeScope};
use crate::ops::{AggregateOp, Operator};
use crate::statics::{Static, Status};

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Error => write!(f, "error"),
            Status::Ok => write!(f, "ok"),
            Status::Unset => write!(f, "unset"),
        }
    }
}

impl fmt::Display for Static {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Static::Int(n) => write!(f, "{n}"),
            Static::Float(x) => write!(f, "{x}"),
            Static::String(s) => write!(f, "\"{s}\""),
            Static::Bool(b) => write!(f, "{b}"),
            Static::Nil => write!(f, "nil"),
            Static::Duration(d) => write!(f, "{d:?}"),
            Static::Status(s) => write!(f, "{s}"),
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.parent {
            write!(f, "parent.")?;
        }
        match self.scope {
            AttributeScope::None => {}
            AttributeScope::Resource => write!(f, "resource.")?,
            AttributeScope::Span => write!(f, "span.")?,
        }
        write!(f, "{}", self.name)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for AggregateOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for RootExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pipeline)
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for element in &self.elements {
            if !first {
                write!(f, " | ")?;
            }
            first = false;
            write!(f, "{element}")?;
        }
        Ok(())
    }
}

impl fmt::Display for PipelineElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineElement::Filter(x) => write!(f, "{x}"),
            PipelineElement::SpansetOp(x) => write!(f, "{x}"),
            PipelineElement::ScalarFilter(x) => write!(f, "{x}"),
            PipelineElement::Aggregate(x) => write!(f, "{x}"),
            PipelineElement::Group(x) => write!(f, "{x}"),
            PipelineElement::Coalesce(x) => write!(f, "{x}"),
        }
    }
}

impl fmt::Display for SpansetFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{ {} }}", self.expression)
    }
}

impl fmt::Display for SpansetOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.lhs, self.op, self.rhs)
    }
}

impl fmt::Display for SpansetExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpansetExpression::Pipeline(x) => write!(f, "({x})"),
            SpansetExpression::Operation(x) => write!(f, "{x}"),
            SpansetExpression::Filter(x) => write!(f, "{x}"),
            SpansetExpression::ScalarFilter(x) => write!(f, "{x}"),
        }
    }
}

impl fmt::Display for ScalarFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.lhs, self.op, self.rhs)
    }
}

impl fmt::Display for ScalarExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarExpression::Operation(x) => write!(f, "{x}"),
            ScalarExpression::Aggregate(x) => write!(f, "{x}"),
            ScalarExpression::Static(x) => write!(f, "{x}"),
            ScalarExpression::Pipeline(x) => write!(f, "({x})"),
        }
    }
}

impl fmt::Display for ScalarOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.lhs, self.op, self.rhs)
    }
}

impl fmt::Display for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.expression {
            Some(e) => write!(f, "{}({e})", self.op),
            None => write!(f, "{}()", self.op),
        }
    }
}

impl fmt::Display for GroupOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "by({})", self.expression)
    }
}

impl fmt::Display for CoalesceOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "coalesce()")
    }
}

impl fmt::Display for FieldExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldExpression::Binary(x) => write!(f, "{x}"),
            FieldExpression::Unary(x) => write!(f, "{x}"),
            FieldExpression::Attribute(x) => write!(f, "{x}"),
            FieldExpression::Static(x) => write!(f, "{x}"),
        }
    }
}

impl fmt::Display for BinaryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.lhs, self.op, self.rhs)
    }
}

impl fmt::Display for UnaryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op, self.expression)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_rendering() {
        let filter = SpansetFilter::new(FieldExpression::binary(
            Operator::Equal,
            FieldExpression::Attribute(Attribute::new("http.status")),
            FieldExpression::Static(Static::Int(500)),
        ));
        assert_eq!(filter.to_string(), "{ http.status = 500 }");
    }

    #[test]
    fn scoped_attribute_rendering() {
        let a = Attribute::scoped(AttributeScope::Resource, true, "service.name");
        assert_eq!(a.to_string(), "parent.resource.service.name");
    }

    #[test]
    fn pipeline_rendering() {
        let p = Pipeline::new(vec![
            PipelineElement::Filter(SpansetFilter::new(FieldExpression::Static(Static::Bool(
                true,
            )))),
            PipelineElement::Aggregate(Aggregate::new(AggregateOp::Count, None)),
        ]);
        assert_eq!(p.to_string(), "{ true } | count()");
    }

    #[test]
    fn unary_rendering() {
        let e = FieldExpression::unary(
            Operator::Not,
            FieldExpression::Attribute(Attribute::new("ok")),
        );
        assert_eq!(e.to_string(), "!ok");
    }
}
