//! Attribute references: how an expression names a field of a span.

use crate::statics::StaticType;

/// Which attribute map a reference targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AttributeScope {
    /// Unscoped: resolution falls through span attributes, then resource.
    #[default]
    None,
    Resource,
    Span,
}

/// Built-in span properties addressable without an attribute lookup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Intrinsic {
    #[default]
    None,
    Duration,
    ChildCount,
    Name,
    Status,
    Parent,
}

impl Intrinsic {
    pub fn from_name(name: &str) -> Intrinsic {
        match name {
            "duration" => Intrinsic::Duration,
            "childCount" => Intrinsic::ChildCount,
            "name" => Intrinsic::Name,
            "status" => Intrinsic::Status,
            "parent" => Intrinsic::Parent,
            _ => Intrinsic::None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Intrinsic::None => "",
            Intrinsic::Duration => "duration",
            Intrinsic::ChildCount => "childCount",
            Intrinsic::Name => "name",
            Intrinsic::Status => "status",
            Intrinsic::Parent => "parent",
        }
    }
}

/// A reference to a field of a span.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Attribute {
    pub scope: AttributeScope,
    /// Resolve against the parent span of the current span.
    pub parent: bool,
    pub name: String,
    pub intrinsic: Intrinsic,
}

impl Attribute {
    /// An unscoped attribute reference with the given identifier.
    pub fn new(name: impl Into<String>) -> Attribute {
        Attribute {
            scope: AttributeScope::None,
            parent: false,
            name: name.into(),
            intrinsic: Intrinsic::None,
        }
    }

    /// A scoped attribute reference. Intrinsics are only recognized when the
    /// caller did not pin an explicit resource or span scope.
    pub fn scoped(scope: AttributeScope, parent: bool, name: impl Into<String>) -> Attribute {
        let name = name.into();
        let intrinsic = match scope {
            AttributeScope::Resource | AttributeScope::Span => Intrinsic::None,
            AttributeScope::None => Intrinsic::from_name(&name),
        };
        Attribute {
            scope,
            parent,
            name,
            intrinsic,
        }
    }

    /// A direct intrinsic reference.
    pub fn intrinsic(intrinsic: Intrinsic) -> Attribute {
        Attribute {
            scope: AttributeScope::None,
            parent: false,
            name: intrinsic.as_str().to_string(),
            intrinsic,
        }
    }

    /// The type this reference is known to produce, or `Attribute` when it is
    /// only resolvable at execute time.
    pub fn implied_type(&self) -> StaticType {
        match self.intrinsic {
            Intrinsic::Duration => StaticType::Duration,
            Intrinsic::ChildCount => StaticType::Int,
            Intrinsic::Name => StaticType::String,
            Intrinsic::Status => StaticType::Status,
            Intrinsic::Parent => StaticType::Nil,
            Intrinsic::None => StaticType::Attribute,
        }
    }

    pub fn references_span(&self) -> bool {
        true
    }
}
