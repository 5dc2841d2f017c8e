//! Reference resolution: relationship values to reference expressions.
//!
//! The resolver walks every property value of every resource (and the
//! stack's outputs, conditions, and mappings), rewriting relationship
//! values into the schema's two reference forms and registering a
//! dependency edge for each one it finds. Values nested in lists, maps,
//! and intrinsic-function arguments are resolved to any depth. The
//! caller's stack is untouched; resolution produces derived JSON trees.

use indexmap::IndexMap;
use serde_json::{json, Map, Value};
use stratus_core::{
    CompileError, CompileResult, Expr, LogicalName, PropertyValue, RelationshipKind,
};
use stratus_graph::{DependencyEdge, DependencyGraph, EdgeKind};

use crate::stack::Stack;

/// Everything resolution derives from a stack: rewritten property trees
/// plus the complete dependency graph. Disposable, owned by one pass.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Resolved property maps, keyed by resource logical name
    pub properties: IndexMap<LogicalName, IndexMap<String, Value>>,
    /// The full dependency graph
    pub graph: DependencyGraph,
    /// Resolved condition bodies
    pub conditions: IndexMap<LogicalName, Value>,
    /// Resolved mapping bodies
    pub mappings: IndexMap<LogicalName, Value>,
    /// Fully rendered output entries
    pub outputs: IndexMap<LogicalName, Value>,
}

/// Scans a stack for relationships and rewrites them
pub struct ReferenceResolver<'a> {
    stack: &'a Stack,
    graph: DependencyGraph,
}

impl<'a> ReferenceResolver<'a> {
    /// Resolve a stack against its validated property maps.
    ///
    /// `properties` is the per-resource output of schema validation
    /// (defaults applied); the stack itself supplies outputs, conditions,
    /// mappings, and explicit ordering hints.
    ///
    /// # Errors
    ///
    /// `DanglingReference` as soon as any relationship or ordering hint
    /// names a logical name absent from the stack's resources;
    /// `DependencyCycle` when a resource relates to itself;
    /// `TypeMismatch` when a float value is not finite.
    pub fn resolve(
        stack: &'a Stack,
        properties: &IndexMap<LogicalName, IndexMap<String, PropertyValue>>,
    ) -> CompileResult<Resolution> {
        let mut graph = DependencyGraph::new();
        for name in stack.resources.keys() {
            graph.add_node(name.clone())?;
        }
        let mut resolver = Self { stack, graph };

        let mut resolved = IndexMap::new();
        for (name, resource) in &stack.resources {
            let props = properties.get(name).unwrap_or(&resource.properties);
            let mut out = IndexMap::new();
            for (field, value) in props {
                if let Some(value) = resolver.resolve_value(name, field, value, true)? {
                    out.insert(field.clone(), value);
                }
            }
            for target in &resource.depends_on {
                resolver.relate(name, "DependsOn", target, EdgeKind::OrderOnly)?;
            }
            resolved.insert(name.clone(), out);
        }

        // Outputs, conditions, and mappings may hold relationships and
        // intrinsics but are not graph nodes: expressions are synthesized
        // and targets existence-checked, with no edges recorded.
        let mut outputs = IndexMap::new();
        for (name, spec) in &stack.outputs {
            let mut entry = Map::new();
            if let Some(description) = &spec.description {
                entry.insert("Description".to_string(), Value::from(description.clone()));
            }
            let value = resolver.resolve_required(name, "Value", &spec.value, false)?;
            entry.insert("Value".to_string(), value);
            if let Some(export) = &spec.export_name {
                let export = resolver.resolve_required(name, "Export", export, false)?;
                entry.insert("Export".to_string(), json!({ "Name": export }));
            }
            outputs.insert(name.clone(), Value::Object(entry));
        }

        let mut conditions = IndexMap::new();
        for (name, body) in &stack.conditions {
            let value = resolver.resolve_required(name, "Condition", body, false)?;
            conditions.insert(name.clone(), value);
        }

        let mut mappings = IndexMap::new();
        for (name, body) in &stack.mappings {
            let value = resolver.resolve_required(name, "Mapping", body, false)?;
            mappings.insert(name.clone(), value);
        }

        tracing::debug!(
            resources = resolved.len(),
            edges = resolver.graph.edge_count(),
            "resolved stack references"
        );

        Ok(Resolution {
            properties: resolved,
            graph: resolver.graph,
            conditions,
            mappings,
            outputs,
        })
    }

    /// Resolve one value. `None` means the value was an ordering-only
    /// relationship and is elided from the rendered tree.
    fn resolve_value(
        &mut self,
        owner: &LogicalName,
        field: &str,
        value: &PropertyValue,
        emit_edges: bool,
    ) -> CompileResult<Option<Value>> {
        match value {
            PropertyValue::Null => Ok(Some(Value::Null)),
            PropertyValue::Bool(b) => Ok(Some(Value::from(*b))),
            PropertyValue::Int(i) => Ok(Some(Value::from(*i))),
            PropertyValue::Float(f) => match serde_json::Number::from_f64(*f) {
                Some(number) => Ok(Some(Value::Number(number))),
                // NaN and infinities have no JSON form.
                None => Err(CompileError::TypeMismatch {
                    resource: owner.clone(),
                    field: field.to_string(),
                    expected: "finite number".to_string(),
                    actual: "non-finite number".to_string(),
                }),
            },
            PropertyValue::Str(s) => Ok(Some(Value::from(s.clone()))),
            PropertyValue::List(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    if let Some(value) = self.resolve_value(owner, field, item, emit_edges)? {
                        out.push(value);
                    }
                }
                Ok(Some(Value::Array(out)))
            }
            PropertyValue::Map(entries) => {
                let mut out = Map::new();
                for (key, item) in entries {
                    if let Some(value) = self.resolve_value(owner, field, item, emit_edges)? {
                        out.insert(key.clone(), value);
                    }
                }
                Ok(Some(Value::Object(out)))
            }
            PropertyValue::Rel(rel) => {
                let kind = match &rel.kind {
                    RelationshipKind::Identifier => EdgeKind::ValueRef,
                    RelationshipKind::Attribute(_) => EdgeKind::AttributeRef,
                    RelationshipKind::OrderOnly => EdgeKind::OrderOnly,
                };
                if emit_edges {
                    self.relate(owner, field, &rel.target, kind)?;
                } else {
                    self.ensure_target(owner, field, &rel.target)?;
                }
                match &rel.kind {
                    RelationshipKind::Identifier => {
                        Ok(Some(json!({ "Ref": rel.target.as_str() })))
                    }
                    RelationshipKind::Attribute(attribute) => Ok(Some(
                        json!({ "Fn::GetAtt": [rel.target.as_str(), attribute] }),
                    )),
                    RelationshipKind::OrderOnly => Ok(None),
                }
            }
            PropertyValue::Fn(expr) => {
                let value = self.resolve_expr(owner, field, expr, emit_edges)?;
                Ok(Some(value))
            }
        }
    }

    /// Resolve a value that must produce something; an elided
    /// ordering-only relationship degrades to null.
    fn resolve_required(
        &mut self,
        owner: &LogicalName,
        field: &str,
        value: &PropertyValue,
        emit_edges: bool,
    ) -> CompileResult<Value> {
        Ok(self
            .resolve_value(owner, field, value, emit_edges)?
            .unwrap_or(Value::Null))
    }

    /// Render an intrinsic expression in its canonical JSON form,
    /// recursing into its arguments.
    fn resolve_expr(
        &mut self,
        owner: &LogicalName,
        field: &str,
        expr: &Expr,
        emit: bool,
    ) -> CompileResult<Value> {
        let mut arg =
            |resolver: &mut Self, value: &PropertyValue| -> CompileResult<Value> {
                resolver.resolve_required(owner, field, value, emit)
            };
        let value = match expr {
            Expr::Ref(target) => json!({ "Ref": target }),
            Expr::GetAtt { target, attribute } => {
                json!({ "Fn::GetAtt": [target, attribute] })
            }
            Expr::Base64(v) => json!({ "Fn::Base64": arg(self, v)? }),
            Expr::Cidr {
                ip_block,
                count,
                cidr_bits,
            } => json!({
                "Fn::Cidr": [arg(self, ip_block)?, arg(self, count)?, arg(self, cidr_bits)?]
            }),
            Expr::And(conditions) => {
                json!({ "Fn::And": self.resolve_all(owner, field, conditions, emit)? })
            }
            Expr::Or(conditions) => {
                json!({ "Fn::Or": self.resolve_all(owner, field, conditions, emit)? })
            }
            Expr::Not(condition) => json!({ "Fn::Not": [arg(self, condition)?] }),
            Expr::Equals(lhs, rhs) => {
                json!({ "Fn::Equals": [arg(self, lhs)?, arg(self, rhs)?] })
            }
            Expr::If {
                condition,
                if_true,
                if_false,
            } => json!({
                "Fn::If": [arg(self, condition)?, arg(self, if_true)?, arg(self, if_false)?]
            }),
            Expr::FindInMap {
                map_name,
                top_key,
                second_key,
            } => json!({
                "Fn::FindInMap": [arg(self, map_name)?, arg(self, top_key)?, arg(self, second_key)?]
            }),
            Expr::GetAzs(region) => json!({ "Fn::GetAZs": arg(self, region)? }),
            Expr::ImportValue(export) => json!({ "Fn::ImportValue": arg(self, export)? }),
            Expr::Join { delimiter, parts } => json!({
                "Fn::Join": [arg(self, delimiter)?, self.resolve_all(owner, field, parts, emit)?]
            }),
            Expr::Select { index, options } => {
                json!({ "Fn::Select": [arg(self, index)?, arg(self, options)?] })
            }
            Expr::Split { delimiter, source } => {
                json!({ "Fn::Split": [arg(self, delimiter)?, arg(self, source)?] })
            }
            Expr::Sub {
                template,
                variables,
            } => {
                let mut vars = Map::new();
                for (name, value) in variables {
                    vars.insert(name.clone(), arg(self, value)?);
                }
                json!({ "Fn::Sub": [arg(self, template)?, Value::Object(vars)] })
            }
            Expr::Transform { name, parameters } => {
                let mut params = Map::new();
                for (key, value) in parameters {
                    params.insert(key.clone(), arg(self, value)?);
                }
                json!({
                    "Fn::Transform": { "Name": arg(self, name)?, "Parameters": Value::Object(params) }
                })
            }
        };
        Ok(value)
    }

    fn resolve_all(
        &mut self,
        owner: &LogicalName,
        field: &str,
        values: &[PropertyValue],
        emit: bool,
    ) -> CompileResult<Vec<Value>> {
        values
            .iter()
            .map(|value| self.resolve_required(owner, field, value, emit))
            .collect()
    }

    /// Record an edge after checking the target exists
    fn relate(
        &mut self,
        owner: &LogicalName,
        field: &str,
        target: &LogicalName,
        kind: EdgeKind,
    ) -> CompileResult<()> {
        self.ensure_target(owner, field, target)?;
        self.graph
            .add_edge(DependencyEdge::new(owner.clone(), target.clone(), kind))?;
        Ok(())
    }

    fn ensure_target(
        &self,
        owner: &LogicalName,
        field: &str,
        target: &LogicalName,
    ) -> CompileResult<()> {
        if !self.stack.has_resource(target) {
            return Err(CompileError::DanglingReference {
                resource: owner.clone(),
                field: field.to_string(),
                target: target.clone(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::ResourceDef;

    fn name(s: &str) -> LogicalName {
        LogicalName::new(s).unwrap()
    }

    fn resolve(stack: &Stack) -> CompileResult<Resolution> {
        let properties = stack
            .resources
            .iter()
            .map(|(n, r)| (n.clone(), r.properties.clone()))
            .collect();
        ReferenceResolver::resolve(stack, &properties)
    }

    #[test]
    fn test_identifier_relationship_becomes_ref() {
        let mut stack = Stack::new("S");
        stack
            .add_resource(ResourceDef::new(name("A"), "Storage::Bucket"))
            .unwrap();
        stack
            .add_resource(
                ResourceDef::new(name("B"), "Queue::Standard")
                    .with_property("owner", PropertyValue::reference(name("A"))),
            )
            .unwrap();

        let resolution = resolve(&stack).unwrap();
        assert_eq!(
            resolution.properties[&name("B")]["owner"],
            json!({ "Ref": "A" })
        );
        assert_eq!(resolution.graph.edge_count(), 1);
    }

    #[test]
    fn test_attribute_relationship_becomes_get_att() {
        let mut stack = Stack::new("S");
        stack
            .add_resource(ResourceDef::new(name("A"), "Storage::Bucket"))
            .unwrap();
        stack
            .add_resource(
                ResourceDef::new(name("B"), "Queue::Standard")
                    .with_property("ownerArn", PropertyValue::attribute(name("A"), "Arn")),
            )
            .unwrap();

        let resolution = resolve(&stack).unwrap();
        assert_eq!(
            resolution.properties[&name("B")]["ownerArn"],
            json!({ "Fn::GetAtt": ["A", "Arn"] })
        );
    }

    #[test]
    fn test_order_only_is_elided() {
        let mut stack = Stack::new("S");
        stack
            .add_resource(ResourceDef::new(name("A"), "Storage::Bucket"))
            .unwrap();
        stack
            .add_resource(
                ResourceDef::new(name("B"), "Queue::Standard")
                    .with_property("creation", PropertyValue::after(name("A"))),
            )
            .unwrap();

        let resolution = resolve(&stack).unwrap();
        assert!(!resolution.properties[&name("B")].contains_key("creation"));
        assert_eq!(resolution.graph.depends_on_for(&name("B")), vec![name("A")]);
    }

    #[test]
    fn test_non_finite_float_rejected() {
        let mut stack = Stack::new("S");
        stack
            .add_resource(
                ResourceDef::new(name("A"), "Storage::Bucket")
                    .with_property("ratio", PropertyValue::Float(f64::NAN)),
            )
            .unwrap();

        let err = resolve(&stack).unwrap_err();
        assert_eq!(
            err,
            CompileError::TypeMismatch {
                resource: name("A"),
                field: "ratio".to_string(),
                expected: "finite number".to_string(),
                actual: "non-finite number".to_string(),
            }
        );
    }

    #[test]
    fn test_dangling_reference() {
        let mut stack = Stack::new("S");
        stack
            .add_resource(
                ResourceDef::new(name("B"), "Queue::Standard")
                    .with_property("owner", PropertyValue::reference(name("Ghost"))),
            )
            .unwrap();

        let err = resolve(&stack).unwrap_err();
        assert_eq!(
            err,
            CompileError::DanglingReference {
                resource: name("B"),
                field: "owner".to_string(),
                target: name("Ghost"),
            }
        );
    }

    #[test]
    fn test_deeply_nested_relationship_found() {
        let mut stack = Stack::new("S");
        stack
            .add_resource(ResourceDef::new(name("A"), "Storage::Bucket"))
            .unwrap();
        let nested = PropertyValue::List(vec![PropertyValue::Map(
            [(
                "inner".to_string(),
                PropertyValue::List(vec![PropertyValue::reference(name("A"))]),
            )]
            .into_iter()
            .collect(),
        )]);
        stack
            .add_resource(
                ResourceDef::new(name("B"), "Queue::Standard").with_property("deep", nested),
            )
            .unwrap();

        let resolution = resolve(&stack).unwrap();
        assert_eq!(resolution.graph.edge_count(), 1);
        assert_eq!(
            resolution.properties[&name("B")]["deep"],
            json!([{ "inner": [{ "Ref": "A" }] }])
        );
    }

    #[test]
    fn test_relationship_inside_intrinsic() {
        let mut stack = Stack::new("S");
        stack
            .add_resource(ResourceDef::new(name("A"), "Storage::Bucket"))
            .unwrap();
        let join = Expr::Join {
            delimiter: PropertyValue::from("/"),
            parts: vec![
                PropertyValue::from("prefix"),
                PropertyValue::attribute(name("A"), "Arn"),
            ],
        };
        stack
            .add_resource(
                ResourceDef::new(name("B"), "Queue::Standard").with_property("path", join),
            )
            .unwrap();

        let resolution = resolve(&stack).unwrap();
        assert_eq!(
            resolution.properties[&name("B")]["path"],
            json!({ "Fn::Join": ["/", ["prefix", { "Fn::GetAtt": ["A", "Arn"] }]] })
        );
        assert_eq!(resolution.graph.edge_count(), 1);
    }

    #[test]
    fn test_parameter_ref_is_not_an_edge() {
        let mut stack = Stack::new("S");
        stack
            .add_resource(
                ResourceDef::new(name("A"), "Storage::Bucket")
                    .with_property("namespace", Expr::Ref("Namespace".to_string())),
            )
            .unwrap();

        let resolution = resolve(&stack).unwrap();
        assert_eq!(
            resolution.properties[&name("A")]["namespace"],
            json!({ "Ref": "Namespace" })
        );
        assert_eq!(resolution.graph.edge_count(), 0);
    }

    #[test]
    fn test_sub_renders_template_and_variables() {
        let mut stack = Stack::new("S");
        let sub = Expr::Sub {
            template: PropertyValue::from("${Env}-suffix"),
            variables: [("Env".to_string(), PropertyValue::from("prod"))]
                .into_iter()
                .collect(),
        };
        stack
            .add_resource(
                ResourceDef::new(name("A"), "Storage::Bucket").with_property("name", sub),
            )
            .unwrap();

        let resolution = resolve(&stack).unwrap();
        assert_eq!(
            resolution.properties[&name("A")]["name"],
            json!({ "Fn::Sub": ["${Env}-suffix", { "Env": "prod" }] })
        );
    }

    #[test]
    fn test_output_relationship_checked_but_no_edge() {
        let mut stack = Stack::new("S");
        stack
            .add_resource(ResourceDef::new(name("A"), "Storage::Bucket"))
            .unwrap();
        stack
            .add_output(
                name("BucketId"),
                crate::stack::OutputSpec::new(PropertyValue::reference(name("A"))),
            )
            .unwrap();

        let resolution = resolve(&stack).unwrap();
        assert_eq!(
            resolution.outputs[&name("BucketId")],
            json!({ "Value": { "Ref": "A" } })
        );
        assert_eq!(resolution.graph.edge_count(), 0);
    }

    #[test]
    fn test_dangling_output_reference() {
        let mut stack = Stack::new("S");
        stack
            .add_output(
                name("Broken"),
                crate::stack::OutputSpec::new(PropertyValue::reference(name("Ghost"))),
            )
            .unwrap();
        assert!(resolve(&stack).is_err());
    }

    #[test]
    fn test_explicit_depends_on_hint() {
        let mut stack = Stack::new("S");
        stack
            .add_resource(ResourceDef::new(name("A"), "Storage::Bucket"))
            .unwrap();
        stack
            .add_resource(
                ResourceDef::new(name("B"), "Queue::Standard").with_depends_on(name("A")),
            )
            .unwrap();

        let resolution = resolve(&stack).unwrap();
        assert_eq!(resolution.graph.depends_on_for(&name("B")), vec![name("A")]);
    }
}
