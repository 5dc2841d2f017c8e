//! The compile pipeline: validate, resolve, order, render.

use indexmap::IndexMap;
use stratus_core::{CompileError, LogicalName, PropertyValue};
use stratus_schema::KindRegistry;

use crate::render::{Document, TemplateRenderer};
use crate::resolver::ReferenceResolver;
use crate::stack::Stack;

/// Every error one compilation attempt produced.
///
/// Field- and resource-level problems are collected across the whole
/// stack before failing, so structurally independent mistakes surface
/// together. Reference and graph errors abort and arrive alone.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("compilation failed: {}", summarize(.errors))]
pub struct CompileReport {
    /// The collected errors, in stack declaration order
    pub errors: Vec<CompileError>,
}

fn summarize(errors: &[CompileError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<CompileError> for CompileReport {
    fn from(error: CompileError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

/// Compiles stacks to template documents.
///
/// Stateless; one compiler may serve any number of stacks, and
/// concurrent compilations share nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Compiler;

impl Compiler {
    /// Create a compiler
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Compile a stack into its rendered document.
    ///
    /// The stack is read-only throughout; validation and resolution work
    /// on derived property maps, so the same stack compiles repeatedly
    /// and always to byte-identical output.
    ///
    /// # Errors
    ///
    /// Returns a report with every field/resource validation error, or a
    /// single `DanglingReference`/`DependencyCycle` when resolution or
    /// ordering fails. No document is produced on any error.
    pub fn compile(&self, stack: &Stack, registry: &KindRegistry) -> Result<Document, CompileReport> {
        let mut errors = Vec::new();
        let mut validated: IndexMap<LogicalName, IndexMap<String, PropertyValue>> =
            IndexMap::new();

        for (name, resource) in &stack.resources {
            match registry.get(&resource.kind) {
                Some(schema) => match schema.validate_properties(name, &resource.properties) {
                    Ok(properties) => {
                        validated.insert(name.clone(), properties);
                    }
                    Err(violations) => errors.extend(violations),
                },
                // Open kind set: no schema means properties pass through.
                None => {
                    validated.insert(name.clone(), resource.properties.clone());
                }
            }
        }
        if !errors.is_empty() {
            tracing::debug!(count = errors.len(), "schema validation failed");
            return Err(CompileReport { errors });
        }

        let resolution =
            ReferenceResolver::resolve(stack, &validated).map_err(CompileReport::from)?;
        let order = resolution
            .graph
            .topo_order()
            .map_err(|err| CompileReport::from(CompileError::from(err)))?;
        tracing::debug!(resources = order.len(), "stack ordered");

        Ok(TemplateRenderer::render(stack, &resolution, &order))
    }
}

/// A parameter the deployment collaborator must supply or default
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterBinding {
    /// Parameter logical name
    pub name: LogicalName,
    /// Declared parameter type tag
    pub param_type: String,
}

/// Handoff to the deployment boundary: the rendered document plus the
/// stack's declared parameter names and types. Nothing here assumes how
/// the deployer authenticates, retries, or reports events.
#[derive(Debug, Clone)]
pub struct DeploymentInput {
    /// Deployable stack name
    pub stack_name: String,
    /// Declared parameters, in declaration order
    pub parameters: Vec<ParameterBinding>,
    /// The rendered document
    pub document: Document,
}

impl DeploymentInput {
    /// Assemble the handoff for a compiled stack
    #[must_use]
    pub fn new(stack: &Stack, document: Document) -> Self {
        Self {
            stack_name: stack.stack_name(),
            parameters: stack
                .parameters
                .iter()
                .map(|(name, spec)| ParameterBinding {
                    name: name.clone(),
                    param_type: spec.param_type.clone(),
                })
                .collect(),
            document,
        }
    }
}
