//! STRATUS Compiler
//!
//! Takes a stack of declared resource definitions, resolves every
//! cross-resource relationship into a reference expression, orders the
//! resources deterministically, and renders the canonical template
//! document. Compiling the same stack twice yields byte-identical
//! output; the caller's stack is never mutated, so one stack may be
//! compiled repeatedly.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod compiler;
pub mod render;
pub mod resolver;
pub mod stack;

pub use compiler::{CompileReport, Compiler, DeploymentInput, ParameterBinding};
pub use render::{Document, TemplateRenderer};
pub use resolver::{ReferenceResolver, Resolution};
pub use stack::{OutputSpec, ParameterSpec, ResourceDef, Stack};
