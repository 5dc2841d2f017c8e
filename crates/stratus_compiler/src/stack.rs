//! Stack assembly: resource definitions and top-level collections.
//!
//! A stack is the unit being compiled. All of its collections are
//! insertion-ordered, and one namespace of logical names spans every
//! collection: a resource and a parameter may not share a name.
//! Once compilation begins the stack is read-only; the compiler works
//! on derived copies of the property maps.

use indexmap::IndexMap;
use serde_json::Value;
use stratus_core::name::format_stack_name;
use stratus_core::{CompileError, CompileResult, LogicalName, PropertyValue};

/// A declared unit of infrastructure: kind tag plus properties.
///
/// Kinds are an open set of string tags; the compiler never enumerates
/// them. Two definitions are distinct even when structurally identical;
/// identity is the logical name within its stack.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceDef {
    /// Logical name, unique within the stack
    pub name: LogicalName,
    /// Resource kind tag, e.g. `Storage::Bucket`
    pub kind: String,
    /// Declared property values
    pub properties: IndexMap<String, PropertyValue>,
    /// Explicit ordering hints: create these targets first
    pub depends_on: Vec<LogicalName>,
}

impl ResourceDef {
    /// Create a definition with no properties
    #[must_use]
    pub fn new(name: LogicalName, kind: impl Into<String>) -> Self {
        Self {
            name,
            kind: kind.into(),
            properties: IndexMap::new(),
            depends_on: Vec::new(),
        }
    }

    /// Declare a property value
    #[must_use]
    pub fn with_property(
        mut self,
        name: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Declare a raw ordering hint toward another resource
    #[must_use]
    pub fn with_depends_on(mut self, target: LogicalName) -> Self {
        self.depends_on.push(target);
        self
    }
}

/// Declared stack parameter
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSpec {
    /// Parameter type tag, e.g. `String`
    pub param_type: String,
    /// Default value
    pub default: Option<Value>,
    /// Permitted values
    pub allowed_values: Vec<Value>,
    /// Human-readable description
    pub description: Option<String>,
    /// Whether the value is masked in consoles and events
    pub no_echo: bool,
}

impl ParameterSpec {
    /// Create a parameter of the given type
    #[must_use]
    pub fn new(param_type: impl Into<String>) -> Self {
        Self {
            param_type: param_type.into(),
            default: None,
            allowed_values: Vec::new(),
            description: None,
            no_echo: false,
        }
    }

    /// Set the default value
    #[must_use]
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Restrict to an allowed-values list
    #[must_use]
    pub fn with_allowed_values(mut self, values: Vec<Value>) -> Self {
        self.allowed_values = values;
        self
    }

    /// Set the description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Mask the value in consoles and events
    #[must_use]
    pub fn no_echo(mut self) -> Self {
        self.no_echo = true;
        self
    }
}

/// Declared stack output
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSpec {
    /// The output value; may hold relationships and intrinsics
    pub value: PropertyValue,
    /// Human-readable description
    pub description: Option<String>,
    /// Cross-stack export name
    pub export_name: Option<PropertyValue>,
}

impl OutputSpec {
    /// Create an output with the given value
    #[must_use]
    pub fn new(value: impl Into<PropertyValue>) -> Self {
        Self {
            value: value.into(),
            description: None,
            export_name: None,
        }
    }

    /// Set the description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Export the output under the given name
    #[must_use]
    pub fn with_export(mut self, name: impl Into<PropertyValue>) -> Self {
        self.export_name = Some(name.into());
        self
    }
}

/// The top-level unit being compiled
#[derive(Debug, Clone, Default)]
pub struct Stack {
    /// Title the deployable stack name derives from
    pub title: String,
    /// Explicit deploy-name override
    pub deploy_name: Option<String>,
    /// Template description
    pub description: Option<String>,
    /// Parameter name to parameter spec, insertion-ordered
    pub parameters: IndexMap<LogicalName, ParameterSpec>,
    /// Mapping name to mapping body, insertion-ordered
    pub mappings: IndexMap<LogicalName, PropertyValue>,
    /// Condition name to condition body, insertion-ordered
    pub conditions: IndexMap<LogicalName, PropertyValue>,
    /// Logical name to resource definition, insertion-ordered
    pub resources: IndexMap<LogicalName, ResourceDef>,
    /// Output name to output spec, insertion-ordered
    pub outputs: IndexMap<LogicalName, OutputSpec>,
}

impl Stack {
    /// Create an empty stack with the given title
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Set the template description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Override the derived deploy name
    #[must_use]
    pub fn with_deploy_name(mut self, name: impl Into<String>) -> Self {
        self.deploy_name = Some(name.into());
        self
    }

    /// Deployable stack name: the explicit override if set, otherwise
    /// the title converted from camel case to dash case
    /// (`TestStack` -> `test-stack`).
    #[must_use]
    pub fn stack_name(&self) -> String {
        self.deploy_name
            .clone()
            .unwrap_or_else(|| format_stack_name(&self.title))
    }

    /// Add a resource definition
    ///
    /// # Errors
    ///
    /// Returns `DuplicateLogicalName` if the name is taken by any
    /// collection in this stack.
    pub fn add_resource(&mut self, resource: ResourceDef) -> CompileResult<()> {
        self.ensure_unique(&resource.name)?;
        self.resources.insert(resource.name.clone(), resource);
        Ok(())
    }

    /// Add a parameter
    ///
    /// # Errors
    ///
    /// Returns `DuplicateLogicalName` if the name is taken.
    pub fn add_parameter(&mut self, name: LogicalName, spec: ParameterSpec) -> CompileResult<()> {
        self.ensure_unique(&name)?;
        self.parameters.insert(name, spec);
        Ok(())
    }

    /// Add an output
    ///
    /// # Errors
    ///
    /// Returns `DuplicateLogicalName` if the name is taken.
    pub fn add_output(&mut self, name: LogicalName, spec: OutputSpec) -> CompileResult<()> {
        self.ensure_unique(&name)?;
        self.outputs.insert(name, spec);
        Ok(())
    }

    /// Add a condition
    ///
    /// # Errors
    ///
    /// Returns `DuplicateLogicalName` if the name is taken.
    pub fn add_condition(
        &mut self,
        name: LogicalName,
        body: impl Into<PropertyValue>,
    ) -> CompileResult<()> {
        self.ensure_unique(&name)?;
        self.conditions.insert(name, body.into());
        Ok(())
    }

    /// Add a mappings block
    ///
    /// # Errors
    ///
    /// Returns `DuplicateLogicalName` if the name is taken.
    pub fn add_mapping(
        &mut self,
        name: LogicalName,
        body: impl Into<PropertyValue>,
    ) -> CompileResult<()> {
        self.ensure_unique(&name)?;
        self.mappings.insert(name, body.into());
        Ok(())
    }

    /// Whether a logical name identifies a resource in this stack
    #[must_use]
    pub fn has_resource(&self, name: &LogicalName) -> bool {
        self.resources.contains_key(name)
    }

    fn ensure_unique(&self, name: &LogicalName) -> CompileResult<()> {
        let taken = self.resources.contains_key(name)
            || self.parameters.contains_key(name)
            || self.outputs.contains_key(name)
            || self.conditions.contains_key(name)
            || self.mappings.contains_key(name);
        if taken {
            return Err(CompileError::DuplicateLogicalName { name: name.clone() });
        }
        Ok(())
    }
}
