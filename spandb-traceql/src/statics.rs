//! Static values: the typed constants that flow through expressions.

use std::time::Duration;

use spandb_result::{Error, Result};

/// Kind of value an expression produces.
///
/// `Attribute` is the sentinel for "not known until the expression runs
/// against a span"; `Spanset` is the type of a pipeline stage that emits
/// spansets rather than a scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaticType {
    Nil,
    Spanset,
    Attribute,
    Int,
    Float,
    String,
    Boolean,
    Duration,
    Status,
}

impl StaticType {
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            StaticType::Int | StaticType::Float | StaticType::Duration
        )
    }

    /// Whether two operand types may appear on either side of a binary
    /// operator. Equal types always match; `Attribute` defers the decision to
    /// execute time; `Int` and `Status` are interchangeable so filters can
    /// write numeric status codes as literals.
    pub fn is_matching_operand(self, other: StaticType) -> bool {
        if self == other {
            return true;
        }
        if self == StaticType::Attribute || other == StaticType::Attribute {
            return true;
        }
        (self == StaticType::Int && other == StaticType::Status)
            || (self == StaticType::Status && other == StaticType::Int)
    }
}

/// Span status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Status {
    Error = 0,
    Ok = 1,
    #[default]
    Unset = 2,
}

impl Status {
    /// Map a wire status code onto the enum. Unknown codes read as `Unset`.
    pub fn from_code(code: i32) -> Status {
        match code {
            0 => Status::Error,
            1 => Status::Ok,
            _ => Status::Unset,
        }
    }
}

/// A single immutable typed value.
///
/// The tag and the payload are one and the same, so a payload can never be
/// read under the wrong type.
#[derive(Debug, Clone, PartialEq)]
pub enum Static {
    Int(i64),
    Float(f64),
    String(String),
    Bool(bool),
    Nil,
    Duration(Duration),
    Status(Status),
}

impl Static {
    pub fn static_type(&self) -> StaticType {
        match self {
            Static::Int(_) => StaticType::Int,
            Static::Float(_) => StaticType::Float,
            Static::String(_) => StaticType::String,
            Static::Bool(_) => StaticType::Boolean,
            Static::Nil => StaticType::Nil,
            Static::Duration(_) => StaticType::Duration,
            Static::Status(_) => StaticType::Status,
        }
    }

    /// Equality with the one intentional cross-type rule: `Int(n)` equals
    /// `Status(s)` when `n` is `s`'s code.
    pub fn equals(&self, other: &Static) -> bool {
        match (self, other) {
            (Static::Int(n), Static::Status(s)) | (Static::Status(s), Static::Int(n)) => {
                *n == *s as i64
            }
            _ => self == other,
        }
    }

    /// Numeric coercion used by arithmetic and ordering comparisons.
    /// Durations coerce to their nanosecond count.
    pub fn as_float(&self) -> Result<f64> {
        match self {
            Static::Int(n) => Ok(*n as f64),
            Static::Float(f) => Ok(*f),
            Static::Duration(d) => Ok(d.as_nanos() as f64),
            other => Err(Error::QueryRuntime(format!(
                "as_float on non-numeric static: {other}"
            ))),
        }
    }
}
