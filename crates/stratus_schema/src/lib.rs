//! STRATUS Schema Layer
//!
//! Field descriptors and the resource-kind registry. Kinds are an open
//! set: a kind is a string tag, its field schema is registered data, and
//! a kind with no registered schema passes its properties through
//! unvalidated. Nothing in here is process-global; a registry is plain
//! data handed to the compiler by reference.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod descriptor;
pub mod registry;

pub use descriptor::{FieldDescriptor, FieldShape, FieldViolation};
pub use registry::{KindRegistry, KindSchema};
