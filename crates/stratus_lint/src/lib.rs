//! Validation adapter for STRATUS.
//!
//! Compiled documents can be handed to an external linter before
//! deployment. This crate owns that boundary: the [`Linter`] trait the
//! external tool implements, the [`Diagnostic`] model its findings are
//! normalized into, and the [`LintAdapter`] that applies severity
//! policy and timeout handling. Whether the tool ran and objected is
//! kept distinct from whether the tool could run at all.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapter;
pub mod diagnostic;
pub mod linter;

pub use adapter::{LintAdapter, LintConfig, LintError};
pub use diagnostic::{Diagnostic, Severity};
pub use linter::{Finding, Linter};
