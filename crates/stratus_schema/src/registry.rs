//! Kind registry: resource-kind tag to ordered field descriptors.
//!
//! Kind-specific field schemas are registered data, not compiled
//! branches, so new kinds appear without touching the compiler.

use indexmap::IndexMap;
use stratus_core::{CompileError, LogicalName, PropertyValue};

use crate::descriptor::{FieldDescriptor, FieldViolation};

/// Error from registry operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Kind already has a registered schema
    #[error("kind already registered: {kind}")]
    AlreadyRegistered {
        /// The colliding kind tag
        kind: String,
    },
}

/// Ordered field schema for a single resource kind
#[derive(Debug, Clone, PartialEq)]
pub struct KindSchema {
    /// Kind tag, e.g. `Storage::Bucket`
    pub kind: String,
    /// Field descriptors in declaration order
    pub fields: Vec<FieldDescriptor>,
}

impl KindSchema {
    /// Create an empty schema for a kind
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            fields: Vec::new(),
        }
    }

    /// Append a field descriptor
    #[must_use]
    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Validate a resource's property map against this schema.
    ///
    /// Schema-declared fields come first in declaration order with
    /// defaults applied; undeclared properties pass through afterwards in
    /// their insertion order (kinds are open, extra properties are not an
    /// error). Violations are collected across all fields rather than
    /// stopping at the first, so one attempt reports every problem.
    ///
    /// # Errors
    ///
    /// Returns every field violation, each wrapped with the owning
    /// resource's logical name.
    pub fn validate_properties(
        &self,
        resource: &LogicalName,
        properties: &IndexMap<String, PropertyValue>,
    ) -> Result<IndexMap<String, PropertyValue>, Vec<CompileError>> {
        let mut validated = IndexMap::new();
        let mut errors = Vec::new();

        for field in &self.fields {
            match field.validate(properties.get(&field.name)) {
                Ok(Some(value)) => {
                    validated.insert(field.name.clone(), value);
                }
                Ok(None) => {}
                Err(violation) => {
                    errors.push(contextualize(violation, resource, &field.name));
                }
            }
        }

        for (name, value) in properties {
            if !self.fields.iter().any(|f| &f.name == name) {
                validated.insert(name.clone(), value.clone());
            }
        }

        if errors.is_empty() {
            Ok(validated)
        } else {
            Err(errors)
        }
    }
}

fn contextualize(
    violation: FieldViolation,
    resource: &LogicalName,
    field: &str,
) -> CompileError {
    match violation {
        FieldViolation::MissingRequired => CompileError::MissingRequiredField {
            resource: resource.clone(),
            field: field.to_string(),
        },
        FieldViolation::TypeMismatch { expected, actual } => CompileError::TypeMismatch {
            resource: resource.clone(),
            field: field.to_string(),
            expected,
            actual,
        },
        FieldViolation::RelationshipNotAllowed => CompileError::RelationshipNotAllowed {
            resource: resource.clone(),
            field: field.to_string(),
        },
    }
}

/// Registry of kind schemas, passed explicitly through compilation.
///
/// Unregistered kinds are legal: their properties pass through
/// unvalidated, keeping the kind set open.
#[derive(Debug, Clone, Default)]
pub struct KindRegistry {
    kinds: IndexMap<String, KindSchema>,
}

impl KindRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            kinds: IndexMap::new(),
        }
    }

    /// Register a kind schema
    ///
    /// # Errors
    ///
    /// Returns error if the kind already has a schema.
    pub fn register(&mut self, schema: KindSchema) -> Result<(), RegistryError> {
        if self.kinds.contains_key(&schema.kind) {
            return Err(RegistryError::AlreadyRegistered { kind: schema.kind });
        }
        tracing::debug!(kind = %schema.kind, fields = schema.fields.len(), "registered kind schema");
        self.kinds.insert(schema.kind.clone(), schema);
        Ok(())
    }

    /// Look up the schema for a kind tag
    #[must_use]
    pub fn get(&self, kind: &str) -> Option<&KindSchema> {
        self.kinds.get(kind)
    }

    /// Whether a kind has a registered schema
    #[must_use]
    pub fn contains(&self, kind: &str) -> bool {
        self.kinds.contains_key(kind)
    }

    /// Registered kind tags, in registration order
    #[must_use]
    pub fn list(&self) -> Vec<&str> {
        self.kinds.keys().map(String::as_str).collect()
    }

    /// Number of registered kinds
    #[must_use]
    pub fn count(&self) -> usize {
        self.kinds.len()
    }

    /// Whether the registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::FieldShape;

    fn name(s: &str) -> LogicalName {
        LogicalName::new(s).unwrap()
    }

    fn bucket_schema() -> KindSchema {
        KindSchema::new("Storage::Bucket")
            .with_field(FieldDescriptor::new("BucketName", FieldShape::String).required())
            .with_field(
                FieldDescriptor::new("Versioning", FieldShape::String)
                    .with_default("Suspended"),
            )
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = KindRegistry::new();
        registry.register(bucket_schema()).unwrap();
        assert!(registry.contains("Storage::Bucket"));
        assert_eq!(registry.count(), 1);
        assert_eq!(registry.get("Storage::Bucket").unwrap().fields.len(), 2);
    }

    #[test]
    fn test_register_duplicate_kind() {
        let mut registry = KindRegistry::new();
        registry.register(bucket_schema()).unwrap();
        let result = registry.register(bucket_schema());
        assert_eq!(
            result,
            Err(RegistryError::AlreadyRegistered {
                kind: "Storage::Bucket".to_string(),
            })
        );
    }

    #[test]
    fn test_validate_applies_default() {
        let schema = bucket_schema();
        let mut properties = IndexMap::new();
        properties.insert("BucketName".to_string(), PropertyValue::from("logs"));

        let validated = schema
            .validate_properties(&name("Bucket"), &properties)
            .unwrap();
        assert_eq!(
            validated.get("Versioning"),
            Some(&PropertyValue::from("Suspended"))
        );
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let schema = KindSchema::new("Queue::Standard")
            .with_field(FieldDescriptor::new("Name", FieldShape::String).required())
            .with_field(FieldDescriptor::new("Retention", FieldShape::Integer).required());

        let properties = IndexMap::new();
        let errors = schema
            .validate_properties(&name("Queue"), &properties)
            .unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_validate_passes_through_undeclared_fields() {
        let schema = bucket_schema();
        let mut properties = IndexMap::new();
        properties.insert("BucketName".to_string(), PropertyValue::from("logs"));
        properties.insert("Extra".to_string(), PropertyValue::from(true));

        let validated = schema
            .validate_properties(&name("Bucket"), &properties)
            .unwrap();
        assert_eq!(validated.get("Extra"), Some(&PropertyValue::Bool(true)));
    }
}
