//! Deterministic template rendering.
//!
//! The renderer walks the stack's top-level collections in insertion
//! order and the resources in their topological order, producing one
//! canonical document. Rendering is referentially transparent: the same
//! stack state always renders to byte-identical text. No timestamps, no
//! hash-order iteration.

use serde_json::{Map, Value};
use stratus_core::LogicalName;

use crate::resolver::Resolution;
use crate::stack::Stack;

/// The rendered template document. Immutable once produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Value,
}

impl Document {
    /// The document as a JSON value tree
    #[must_use]
    pub fn as_value(&self) -> &Value {
        &self.root
    }

    /// Canonical JSON text, 2-space indented
    #[must_use]
    pub fn to_json(&self) -> String {
        // serde_json's pretty printer is deterministic given the
        // insertion-ordered value tree underneath, and serializing an
        // in-memory `Value` cannot fail.
        serde_json::to_string_pretty(&self.root).expect("value tree serializes to JSON")
    }

    /// YAML rendering of the same value tree
    ///
    /// # Errors
    ///
    /// Returns error if the tree cannot be expressed as YAML.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(&self.root)
    }
}

/// Walks a resolved stack and emits the canonical document
pub struct TemplateRenderer;

impl TemplateRenderer {
    /// Render the document.
    ///
    /// `order` is the deterministic total order from the dependency
    /// graph; the resources block follows it exactly. Empty top-level
    /// sections are omitted.
    #[must_use]
    pub fn render(stack: &Stack, resolution: &Resolution, order: &[LogicalName]) -> Document {
        let mut root = Map::new();

        if let Some(description) = &stack.description {
            root.insert("Description".to_string(), Value::from(description.clone()));
        }

        if !stack.parameters.is_empty() {
            let mut parameters = Map::new();
            for (name, spec) in &stack.parameters {
                parameters.insert(name.as_str().to_string(), render_parameter(spec));
            }
            root.insert("Parameters".to_string(), Value::Object(parameters));
        }

        if !resolution.mappings.is_empty() {
            let mut mappings = Map::new();
            for (name, body) in &resolution.mappings {
                mappings.insert(name.as_str().to_string(), body.clone());
            }
            root.insert("Mappings".to_string(), Value::Object(mappings));
        }

        if !resolution.conditions.is_empty() {
            let mut conditions = Map::new();
            for (name, body) in &resolution.conditions {
                conditions.insert(name.as_str().to_string(), body.clone());
            }
            root.insert("Conditions".to_string(), Value::Object(conditions));
        }

        let mut resources = Map::new();
        for name in order {
            let Some(resource) = stack.resources.get(name) else {
                continue;
            };
            let mut entry = Map::new();
            entry.insert("Type".to_string(), Value::from(resource.kind.clone()));
            let properties = resolution
                .properties
                .get(name)
                .map(|props| {
                    props
                        .iter()
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect::<Map<String, Value>>()
                })
                .unwrap_or_default();
            entry.insert("Properties".to_string(), Value::Object(properties));

            let depends_on = resolution.graph.depends_on_for(name);
            if !depends_on.is_empty() {
                let list: Vec<Value> = depends_on
                    .iter()
                    .map(|n| Value::from(n.as_str().to_string()))
                    .collect();
                entry.insert("DependsOn".to_string(), Value::Array(list));
            }
            resources.insert(name.as_str().to_string(), Value::Object(entry));
        }
        root.insert("Resources".to_string(), Value::Object(resources));

        if !resolution.outputs.is_empty() {
            let mut outputs = Map::new();
            for (name, entry) in &resolution.outputs {
                outputs.insert(name.as_str().to_string(), entry.clone());
            }
            root.insert("Outputs".to_string(), Value::Object(outputs));
        }

        Document {
            root: Value::Object(root),
        }
    }
}

fn render_parameter(spec: &crate::stack::ParameterSpec) -> Value {
    let mut entry = Map::new();
    entry.insert("Type".to_string(), Value::from(spec.param_type.clone()));
    if let Some(default) = &spec.default {
        entry.insert("Default".to_string(), default.clone());
    }
    if !spec.allowed_values.is_empty() {
        entry.insert(
            "AllowedValues".to_string(),
            Value::Array(spec.allowed_values.clone()),
        );
    }
    if let Some(description) = &spec.description {
        entry.insert("Description".to_string(), Value::from(description.clone()));
    }
    if spec.no_echo {
        entry.insert("NoEcho".to_string(), Value::Bool(true));
    }
    Value::Object(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::ReferenceResolver;
    use crate::stack::{ParameterSpec, ResourceDef};
    use serde_json::json;

    fn name(s: &str) -> LogicalName {
        LogicalName::new(s).unwrap()
    }

    fn render(stack: &Stack) -> Document {
        let properties = stack
            .resources
            .iter()
            .map(|(n, r)| (n.clone(), r.properties.clone()))
            .collect();
        let resolution = ReferenceResolver::resolve(stack, &properties).unwrap();
        let order = resolution.graph.topo_order().unwrap();
        TemplateRenderer::render(stack, &resolution, &order)
    }

    #[test]
    fn test_minimal_document_shape() {
        let mut stack = Stack::new("S");
        stack
            .add_resource(
                ResourceDef::new(name("Bucket"), "Storage::Bucket")
                    .with_property("BucketName", "test"),
            )
            .unwrap();

        let document = render(&stack);
        assert_eq!(
            document.as_value(),
            &json!({
                "Resources": {
                    "Bucket": {
                        "Type": "Storage::Bucket",
                        "Properties": { "BucketName": "test" }
                    }
                }
            })
        );
    }

    #[test]
    fn test_empty_sections_omitted() {
        let mut stack = Stack::new("S");
        stack
            .add_resource(ResourceDef::new(name("A"), "Storage::Bucket"))
            .unwrap();
        let document = render(&stack);
        let root = document.as_value().as_object().unwrap();
        assert!(!root.contains_key("Parameters"));
        assert!(!root.contains_key("Outputs"));
        assert!(!root.contains_key("Conditions"));
        assert!(!root.contains_key("Mappings"));
    }

    #[test]
    fn test_description_first() {
        let mut stack = Stack::new("S").with_description("A stack");
        stack
            .add_resource(ResourceDef::new(name("A"), "Storage::Bucket"))
            .unwrap();
        let json = render(&stack).to_json();
        assert!(json.find("Description").unwrap() < json.find("Resources").unwrap());
    }

    #[test]
    fn test_parameter_rendering() {
        let mut stack = Stack::new("S");
        stack
            .add_parameter(
                name("Environment"),
                ParameterSpec::new("String")
                    .with_default("dev")
                    .with_allowed_values(vec![json!("dev"), json!("prod")]),
            )
            .unwrap();
        stack
            .add_resource(ResourceDef::new(name("A"), "Storage::Bucket"))
            .unwrap();

        let document = render(&stack);
        assert_eq!(
            document.as_value()["Parameters"]["Environment"],
            json!({
                "Type": "String",
                "Default": "dev",
                "AllowedValues": ["dev", "prod"]
            })
        );
    }

    #[test]
    fn test_depends_on_rendered_as_list() {
        let mut stack = Stack::new("S");
        stack
            .add_resource(ResourceDef::new(name("A"), "Storage::Bucket"))
            .unwrap();
        stack
            .add_resource(
                ResourceDef::new(name("B"), "Queue::Standard").with_depends_on(name("A")),
            )
            .unwrap();

        let document = render(&stack);
        assert_eq!(
            document.as_value()["Resources"]["B"]["DependsOn"],
            json!(["A"])
        );
    }

    #[test]
    fn test_resources_follow_topological_order() {
        let mut stack = Stack::new("S");
        stack
            .add_resource(
                ResourceDef::new(name("B"), "Queue::Standard")
                    .with_property("owner", stratus_core::PropertyValue::reference(name("A"))),
            )
            .unwrap();
        stack
            .add_resource(ResourceDef::new(name("A"), "Storage::Bucket"))
            .unwrap();

        let json = render(&stack).to_json();
        let a = json.find("\"A\"").unwrap();
        let b = json.find("\"B\"").unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_yaml_renders() {
        let mut stack = Stack::new("S");
        stack
            .add_resource(
                ResourceDef::new(name("A"), "Storage::Bucket")
                    .with_property("BucketName", "test"),
            )
            .unwrap();
        let yaml = render(&stack).to_yaml().unwrap();
        assert!(yaml.contains("Storage::Bucket"));
    }
}
