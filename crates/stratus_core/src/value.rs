//! Property values carried by resource definitions.
//!
//! A property value is either a literal (scalar, list, or mapping), an
//! intrinsic function expression, or a relationship pointing at another
//! resource in the same stack. Relationships are explicit data, never
//! live references between definitions, so resolving a stack is a pure
//! function of its declared values.

use indexmap::IndexMap;

use crate::expr::Expr;
use crate::name::LogicalName;

/// The kind of relationship one resource declares toward another
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RelationshipKind {
    /// Substitute the target's identifier into the property
    Identifier,
    /// Substitute a named computed attribute of the target
    Attribute(String),
    /// No substitution; the target must only be created first
    OrderOnly,
}

/// A property value pointing at another resource definition
#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    /// Logical name of the target resource
    pub target: LogicalName,
    /// What the relationship asks of the target
    pub kind: RelationshipKind,
}

impl Relationship {
    /// Relationship that resolves to the target's identifier
    #[must_use]
    pub fn to(target: LogicalName) -> Self {
        Self {
            target,
            kind: RelationshipKind::Identifier,
        }
    }

    /// Relationship that resolves to a named attribute of the target
    #[must_use]
    pub fn attr(target: LogicalName, attribute: impl Into<String>) -> Self {
        Self {
            target,
            kind: RelationshipKind::Attribute(attribute.into()),
        }
    }

    /// Ordering-only relationship, no value substitution
    #[must_use]
    pub fn after(target: LogicalName) -> Self {
        Self {
            target,
            kind: RelationshipKind::OrderOnly,
        }
    }
}

/// A declared property value
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// Explicit null
    Null,
    /// Boolean literal
    Bool(bool),
    /// Integer literal
    Int(i64),
    /// Floating point literal
    Float(f64),
    /// String literal
    Str(String),
    /// List of values, resolved element by element
    List(Vec<PropertyValue>),
    /// Insertion-ordered mapping of values
    Map(IndexMap<String, PropertyValue>),
    /// Relationship to another resource definition
    Rel(Relationship),
    /// Intrinsic function expression
    Fn(Box<Expr>),
}

impl PropertyValue {
    /// Value that resolves to the identifier of another resource
    #[must_use]
    pub fn reference(target: LogicalName) -> Self {
        Self::Rel(Relationship::to(target))
    }

    /// Value that resolves to a named attribute of another resource
    #[must_use]
    pub fn attribute(target: LogicalName, attribute: impl Into<String>) -> Self {
        Self::Rel(Relationship::attr(target, attribute))
    }

    /// Ordering-only marker; elided from rendered properties
    #[must_use]
    pub fn after(target: LogicalName) -> Self {
        Self::Rel(Relationship::after(target))
    }

    /// Wrap an intrinsic function expression
    #[must_use]
    pub fn intrinsic(expr: Expr) -> Self {
        Self::Fn(Box::new(expr))
    }

    /// Whether this value (or anything nested in it) is a relationship
    #[must_use]
    pub fn has_relationship(&self) -> bool {
        match self {
            Self::Rel(_) => true,
            Self::List(items) => items.iter().any(PropertyValue::has_relationship),
            Self::Map(entries) => entries.values().any(PropertyValue::has_relationship),
            Self::Fn(expr) => expr.arguments().iter().any(|v| v.has_relationship()),
            _ => false,
        }
    }

    /// Human-readable shape tag, used in type-mismatch diagnostics
    #[must_use]
    pub fn shape_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::Float(_) => "number",
            Self::Str(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Rel(_) => "relationship",
            Self::Fn(_) => "intrinsic",
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl<T: Into<PropertyValue>> From<Vec<T>> for PropertyValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

impl From<Expr> for PropertyValue {
    fn from(expr: Expr) -> Self {
        Self::Fn(Box::new(expr))
    }
}
