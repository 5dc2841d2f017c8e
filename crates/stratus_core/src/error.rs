//! Compile-side error taxonomy.
//!
//! Field- and resource-level errors are collected per compilation attempt
//! so one attempt reports every independent problem at once; reference and
//! graph errors abort, since no later stage can proceed without a complete
//! edge set and a valid order. Every variant carries the logical name,
//! field, or cycle path needed to locate the offending declaration.

use crate::name::LogicalName;

/// Result alias for compile-side operations
pub type CompileResult<T> = Result<T, CompileError>;

/// Errors raised while assembling or compiling a stack
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompileError {
    /// Logical name failed validation at construction
    #[error("invalid logical name `{name}`: {reason}")]
    InvalidLogicalName {
        /// The rejected name
        name: String,
        /// Why it was rejected
        reason: String,
    },

    /// A required field has neither a value nor a declared default
    #[error("resource `{resource}` is missing required field `{field}`")]
    MissingRequiredField {
        /// Resource the field belongs to
        resource: LogicalName,
        /// Field name
        field: String,
    },

    /// A value's shape does not match the field's declared shape
    #[error("resource `{resource}` field `{field}`: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Resource the field belongs to
        resource: LogicalName,
        /// Field name
        field: String,
        /// Declared shape
        expected: String,
        /// Supplied shape
        actual: String,
    },

    /// A relationship value was supplied where the field forbids one
    #[error("resource `{resource}` field `{field}` does not accept relationships")]
    RelationshipNotAllowed {
        /// Resource the field belongs to
        resource: LogicalName,
        /// Field name
        field: String,
    },

    /// Two stack entries share a logical name
    #[error("duplicate logical name `{name}`")]
    DuplicateLogicalName {
        /// The colliding name
        name: LogicalName,
    },

    /// A relationship names a logical name absent from the stack
    #[error("resource `{resource}` field `{field}` references unknown resource `{target}`")]
    DanglingReference {
        /// Resource holding the relationship
        resource: LogicalName,
        /// Field holding the relationship
        field: String,
        /// The missing target
        target: LogicalName,
    },

    /// The relationship graph contains a cycle
    #[error("dependency cycle: {}", format_cycle(.path))]
    DependencyCycle {
        /// Minimal cycle, in order
        path: Vec<LogicalName>,
    },
}

fn format_cycle(path: &[LogicalName]) -> String {
    let mut parts: Vec<&str> = path.iter().map(LogicalName::as_str).collect();
    if let Some(first) = parts.first().copied() {
        parts.push(first);
    }
    parts.join(" -> ")
}
