//! STRATUS Core Types
//!
//! This crate contains pure types and logic with no I/O.
//! Everything here is a plain value: logical names, property values,
//! relationship values, reference expressions, and the error taxonomy
//! shared by the compiler stages.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod expr;
pub mod name;
pub mod value;

// Re-exports
pub use error::{CompileError, CompileResult};
pub use expr::Expr;
pub use name::LogicalName;
pub use value::{PropertyValue, Relationship, RelationshipKind};
