//! Evaluation: piping spansets through a pipeline and executing field
//! expressions against individual spans.

use regex::Regex;
use spandb_result::{Error, Result};
use spandb_types::QueryContext;

use crate::ast::*;
use crate::ops::Operator;
use crate::span::{Span, Spanset};
use crate::statics::Static;

impl RootExpr {
    pub fn evaluate(&self, ctx: &QueryContext, input: Vec<Spanset>) -> Result<Vec<Spanset>> {
        self.pipeline.evaluate(ctx, input)
    }
}

impl Pipeline {
    /// Apply each element left to right. An empty intermediate result
    /// short-circuits the rest of the pipeline.
    pub fn evaluate(&self, ctx: &QueryContext, input: Vec<Spanset>) -> Result<Vec<Spanset>> {
        let mut result = input;
        for element in &self.elements {
            result = element.evaluate(ctx, result)?;
            if result.is_empty() {
                return Ok(Vec::new());
            }
        }
        Ok(result)
    }
}

impl PipelineElement {
    pub fn evaluate(&self, ctx: &QueryContext, input: Vec<Spanset>) -> Result<Vec<Spanset>> {
        match self {
            PipelineElement::Filter(f) => f.evaluate(ctx, input),
            // Identity until these stages are lit up; the validator already
            // enforces their shape so callers can build them today.
            PipelineElement::SpansetOp(_)
            | PipelineElement::ScalarFilter(_)
            | PipelineElement::Aggregate(_)
            | PipelineElement::Group(_)
            | PipelineElement::Coalesce(_) => Ok(input),
        }
    }
}

impl SpansetFilter {
    pub fn evaluate(&self, ctx: &QueryContext, input: Vec<Spanset>) -> Result<Vec<Spanset>> {
        let mut output = Vec::new();

        for spanset in input {
            ctx.check()?;
            if spanset.spans.is_empty() {
                continue;
            }

            let mut matching: Vec<Span> = Vec::new();
            for span in &spanset.spans {
                ctx.check()?;
                let result = self.expression.execute(span)?;
                // Anything but a boolean true is a non-match.
                if matches!(result, Static::Bool(true)) {
                    matching.push(span.clone());
                }
            }

            if matching.is_empty() {
                continue;
            }
            let mut kept = spanset.clone();
            kept.spans = matching;
            output.push(kept);
        }

        Ok(output)
    }
}

impl FieldExpression {
    pub fn execute(&self, span: &Span) -> Result<Static> {
        match self {
            FieldExpression::Binary(o) => o.execute(span),
            FieldExpression::Unary(o) => o.execute(span),
            FieldExpression::Attribute(a) => Ok(span.attribute_for(a)),
            FieldExpression::Static(s) => Ok(s.clone()),
        }
    }
}

impl BinaryOperation {
    pub fn execute(&self, span: &Span) -> Result<Static> {
        let lhs = self.lhs.execute(span)?;
        let rhs = self.rhs.execute(span)?;

        // Types deferred at validation resolve here. A mismatch is a
        // non-match, not a failure.
        let lhs_t = lhs.static_type();
        let rhs_t = rhs.static_type();
        if !lhs_t.is_matching_operand(rhs_t) {
            return Ok(Static::Bool(false));
        }
        if !self.op.binary_types_valid(lhs_t, rhs_t) {
            return Ok(Static::Bool(false));
        }

        match self.op {
            Operator::Add => Ok(Static::Float(lhs.as_float()? + rhs.as_float()?)),
            Operator::Sub => Ok(Static::Float(lhs.as_float()? - rhs.as_float()?)),
            Operator::Div => Ok(Static::Float(lhs.as_float()? / rhs.as_float()?)),
            Operator::Mod => Ok(Static::Float(lhs.as_float()? % rhs.as_float()?)),
            Operator::Mult => Ok(Static::Float(lhs.as_float()? * rhs.as_float()?)),
            Operator::Power => Ok(Static::Float(lhs.as_float()?.powf(rhs.as_float()?))),
            Operator::Greater => Ok(Static::Bool(lhs.as_float()? > rhs.as_float()?)),
            Operator::GreaterEqual => Ok(Static::Bool(lhs.as_float()? >= rhs.as_float()?)),
            Operator::Less => Ok(Static::Bool(lhs.as_float()? < rhs.as_float()?)),
            Operator::LessEqual => Ok(Static::Bool(lhs.as_float()? <= rhs.as_float()?)),
            Operator::Equal => Ok(Static::Bool(lhs.equals(&rhs))),
            Operator::NotEqual => Ok(Static::Bool(!lhs.equals(&rhs))),
            Operator::And => match (&lhs, &rhs) {
                (Static::Bool(l), Static::Bool(r)) => Ok(Static::Bool(*l && *r)),
                _ => Ok(Static::Bool(false)),
            },
            Operator::Or => match (&lhs, &rhs) {
                (Static::Bool(l), Static::Bool(r)) => Ok(Static::Bool(*l || *r)),
                _ => Ok(Static::Bool(false)),
            },
            Operator::Regex | Operator::NotRegex => {
                let (Static::String(value), Static::String(pattern)) = (&lhs, &rhs) else {
                    return Ok(Static::Bool(false));
                };
                let re = Regex::new(pattern).map_err(Error::query_runtime)?;
                let matched = re.is_match(value);
                Ok(Static::Bool(if self.op == Operator::Regex {
                    matched
                } else {
                    !matched
                }))
            }
            Operator::Not => Err(Error::QueryRuntime(format!(
                "binary operation not supported: {}",
                self.op
            ))),
        }
    }
}

impl UnaryOperation {
    /// `!` inverts booleans, `-` negates numerics. Anything else is
    /// undefined and yields `Nil`.
    pub fn execute(&self, span: &Span) -> Result<Static> {
        let value = self.expression.execute(span)?;
        match self.op {
            Operator::Not => match value {
                Static::Bool(b) => Ok(Static::Bool(!b)),
                _ => Ok(Static::Nil),
            },
            Operator::Sub => match value {
                Static::Int(n) => Ok(Static::Int(-n)),
                Static::Float(f) => Ok(Static::Float(-f)),
                Static::Duration(_) => Ok(Static::Float(-value.as_float()?)),
                _ => Ok(Static::Nil),
            },
            _ => Ok(Static::Nil),
        }
    }
}
