//! Operators and their purely type-driven legality rules.

use crate::statics::StaticType;

/// Binary and unary operator symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Div,
    Mod,
    Mult,
    Equal,
    NotEqual,
    Regex,
    NotRegex,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
    Power,
    And,
    Or,
    Not,
}

impl Operator {
    /// True for operators that produce a boolean: comparisons, logical
    /// connectives, and regex matches.
    pub fn is_boolean(self) -> bool {
        matches!(
            self,
            Operator::Equal
                | Operator::NotEqual
                | Operator::Regex
                | Operator::NotRegex
                | Operator::Greater
                | Operator::GreaterEqual
                | Operator::Less
                | Operator::LessEqual
                | Operator::And
                | Operator::Or
                | Operator::Not
        )
    }

    /// Whether this operator is legal for the given operand types. Purely
    /// type-driven; value-level concerns (division by zero, bad regex) are
    /// execute-time business.
    pub fn binary_types_valid(self, lhs: StaticType, rhs: StaticType) -> bool {
        self.binary_type_valid(lhs) && self.binary_type_valid(rhs)
    }

    fn binary_type_valid(self, t: StaticType) -> bool {
        match t {
            // Type deferred until execute time.
            StaticType::Attribute => true,
            StaticType::Boolean => matches!(
                self,
                Operator::And | Operator::Or | Operator::Equal | Operator::NotEqual
            ),
            StaticType::Int | StaticType::Float | StaticType::Duration => matches!(
                self,
                Operator::Add
                    | Operator::Sub
                    | Operator::Div
                    | Operator::Mod
                    | Operator::Mult
                    | Operator::Power
                    | Operator::Equal
                    | Operator::NotEqual
                    | Operator::Greater
                    | Operator::GreaterEqual
                    | Operator::Less
                    | Operator::LessEqual
            ),
            StaticType::String => matches!(
                self,
                Operator::Equal | Operator::NotEqual | Operator::Regex | Operator::NotRegex
            ),
            StaticType::Nil | StaticType::Status => {
                matches!(self, Operator::Equal | Operator::NotEqual)
            }
            StaticType::Spanset => false,
        }
    }

    /// Legality of this operator as a unary prefix.
    pub fn unary_types_valid(self, t: StaticType) -> bool {
        if t == StaticType::Attribute {
            return true;
        }
        match self {
            Operator::Sub => t.is_numeric(),
            Operator::Not => t == StaticType::Boolean,
            _ => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Div => "/",
            Operator::Mod => "%",
            Operator::Mult => "*",
            Operator::Equal => "=",
            Operator::NotEqual => "!=",
            Operator::Regex => "=~",
            Operator::NotRegex => "!~",
            Operator::Greater => ">",
            Operator::GreaterEqual => ">=",
            Operator::Less => "<",
            Operator::LessEqual => "<=",
            Operator::Power => "^",
            Operator::And => "&&",
            Operator::Or => "||",
            Operator::Not => "!",
        }
    }
}

/// Aggregation functions over a spanset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateOp {
    Count,
    Max,
    Min,
    Sum,
    Avg,
}

impl AggregateOp {
    pub fn as_str(self) -> &'static str {
        match self {
            AggregateOp::Count => "count",
            AggregateOp::Max => "max",
            AggregateOp::Min => "min",
            AggregateOp::Sum => "sum",
            AggregateOp::Avg => "avg",
        }
    }
}
