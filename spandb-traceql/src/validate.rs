//! Semantic validation: a pure bottom-up walk surfacing the first failure.

use spandb_result::{Error, Result};

use crate::ast::*;
use crate::statics::StaticType;

impl RootExpr {
    pub fn validate(&self) -> Result<()> {
        self.pipeline.validate()
    }
}

impl Pipeline {
    pub fn validate(&self) -> Result<()> {
        for element in &self.elements {
            element.validate()?;
        }
        Ok(())
    }
}

impl PipelineElement {
    pub fn validate(&self) -> Result<()> {
        match self {
            PipelineElement::Filter(f) => f.validate(),
            PipelineElement::SpansetOp(o) => o.validate(),
            PipelineElement::ScalarFilter(f) => f.validate(),
            PipelineElement::Aggregate(a) => a.validate(),
            PipelineElement::Group(g) => g.validate(),
            PipelineElement::Coalesce(c) => c.validate(),
        }
    }
}

impl SpansetFilter {
    pub fn validate(&self) -> Result<()> {
        self.expression.validate()?;

        let t = self.expression.implied_type();
        if t != StaticType::Attribute && t != StaticType::Boolean {
            return Err(Error::QueryInvalid(format!(
                "span filter field expressions must resolve to a boolean: {self}"
            )));
        }
        Ok(())
    }
}

impl SpansetOperation {
    // Operand constraints beyond recursion are an open question upstream.
    pub fn validate(&self) -> Result<()> {
        self.lhs.validate()?;
        self.rhs.validate()
    }
}

impl SpansetExpression {
    pub fn validate(&self) -> Result<()> {
        match self {
            SpansetExpression::Pipeline(p) => p.validate(),
            SpansetExpression::Operation(o) => o.validate(),
            SpansetExpression::Filter(f) => f.validate(),
            SpansetExpression::ScalarFilter(f) => f.validate(),
        }
    }
}

impl ScalarFilter {
    pub fn validate(&self) -> Result<()> {
        self.lhs.validate()?;
        self.rhs.validate()?;

        let lhs_t = self.lhs.implied_type();
        let rhs_t = self.rhs.implied_type();
        if !lhs_t.is_matching_operand(rhs_t) {
            return Err(Error::QueryInvalid(format!(
                "binary operations must operate on the same type: {self}"
            )));
        }
        if !self.op.binary_types_valid(lhs_t, rhs_t) {
            return Err(Error::QueryInvalid(format!(
                "illegal operation for the given types: {self}"
            )));
        }
        Ok(())
    }
}

impl ScalarExpression {
    pub fn validate(&self) -> Result<()> {
        match self {
            ScalarExpression::Operation(o) => o.validate(),
            ScalarExpression::Aggregate(a) => a.validate(),
            ScalarExpression::Static(_) => Ok(()),
            ScalarExpression::Pipeline(p) => p.validate(),
        }
    }
}

impl ScalarOperation {
    pub fn validate(&self) -> Result<()> {
        self.lhs.validate()?;
        self.rhs.validate()?;

        let lhs_t = self.lhs.implied_type();
        let rhs_t = self.rhs.implied_type();
        if !lhs_t.is_matching_operand(rhs_t) {
            return Err(Error::QueryInvalid(format!(
                "binary operations must operate on the same type: {self}"
            )));
        }
        if !self.op.binary_types_valid(lhs_t, rhs_t) {
            return Err(Error::QueryInvalid(format!(
                "illegal operation for the given types: {self}"
            )));
        }
        Ok(())
    }
}

impl Aggregate {
    pub fn validate(&self) -> Result<()> {
        let Some(e) = &self.expression else {
            return Ok(());
        };
        e.validate()?;

        // Aggregate field expressions require a number or a deferred type.
        let t = e.implied_type();
        if t != StaticType::Attribute && !t.is_numeric() {
            return Err(Error::QueryInvalid(format!(
                "aggregate field expressions must resolve to a number type: {self}"
            )));
        }
        if !e.references_span() {
            return Err(Error::QueryInvalid(format!(
                "aggregate field expressions must reference the span: {self}"
            )));
        }
        Ok(())
    }
}

impl GroupOperation {
    pub fn validate(&self) -> Result<()> {
        // One cannot group by a constant.
        if !self.expression.references_span() {
            return Err(Error::QueryInvalid(format!(
                "grouping field expressions must reference the span: {self}"
            )));
        }
        self.expression.validate()
    }
}

impl CoalesceOperation {
    pub fn validate(&self) -> Result<()> {
        Ok(())
    }
}

impl FieldExpression {
    pub fn validate(&self) -> Result<()> {
        match self {
            FieldExpression::Binary(o) => o.validate(),
            FieldExpression::Unary(o) => o.validate(),
            FieldExpression::Attribute(_) | FieldExpression::Static(_) => Ok(()),
        }
    }
}

impl BinaryOperation {
    pub fn validate(&self) -> Result<()> {
        self.lhs.validate()?;
        self.rhs.validate()?;

        let lhs_t = self.lhs.implied_type();
        let rhs_t = self.rhs.implied_type();
        if !lhs_t.is_matching_operand(rhs_t) {
            return Err(Error::QueryInvalid(format!(
                "binary operations must operate on the same type: {self}"
            )));
        }
        if !self.op.binary_types_valid(lhs_t, rhs_t) {
            return Err(Error::QueryInvalid(format!(
                "illegal operation for the given types: {self}"
            )));
        }
        Ok(())
    }
}

impl UnaryOperation {
    pub fn validate(&self) -> Result<()> {
        self.expression.validate()?;

        let t = self.expression.implied_type();
        if t == StaticType::Attribute {
            // Defer to execute time.
            return Ok(());
        }
        if !self.op.unary_types_valid(t) {
            return Err(Error::QueryInvalid(format!(
                "illegal operation for the given type: {self}"
            )));
        }
        Ok(())
    }
}
