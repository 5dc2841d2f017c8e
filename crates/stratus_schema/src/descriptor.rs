//! Field descriptors: typed, validated attributes of a resource kind.

use stratus_core::PropertyValue;

/// Expected value shape for a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldShape {
    /// Any value
    Any,
    /// String literal
    String,
    /// Integer literal
    Integer,
    /// Any numeric literal
    Number,
    /// Boolean literal
    Boolean,
    /// List whose elements match the inner shape
    List(Box<FieldShape>),
    /// Mapping whose values match the inner shape
    Map(Box<FieldShape>),
}

impl FieldShape {
    /// Whether a property value matches this shape.
    ///
    /// Relationships and intrinsic expressions always match: their
    /// resolved runtime type is only known to the external linter, so
    /// shape checks are deferred to it.
    #[must_use]
    pub fn matches(&self, value: &PropertyValue) -> bool {
        match (self, value) {
            (_, PropertyValue::Rel(_) | PropertyValue::Fn(_)) => true,
            (Self::Any, _) => true,
            (Self::String, PropertyValue::Str(_)) => true,
            (Self::Integer, PropertyValue::Int(_)) => true,
            (Self::Number, PropertyValue::Int(_) | PropertyValue::Float(_)) => true,
            (Self::Boolean, PropertyValue::Bool(_)) => true,
            (Self::List(inner), PropertyValue::List(items)) => {
                items.iter().all(|item| inner.matches(item))
            }
            (Self::Map(inner), PropertyValue::Map(entries)) => {
                entries.values().all(|item| inner.matches(item))
            }
            _ => false,
        }
    }

    /// Shape tag used in type-mismatch diagnostics
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Any => "any".to_string(),
            Self::String => "string".to_string(),
            Self::Integer => "integer".to_string(),
            Self::Number => "number".to_string(),
            Self::Boolean => "boolean".to_string(),
            Self::List(inner) => format!("list of {}", inner.describe()),
            Self::Map(inner) => format!("map of {}", inner.describe()),
        }
    }
}

/// Violation reported by a single field descriptor.
///
/// Carries no resource context; the kind schema attaches the owning
/// resource's logical name when it maps violations into compile errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldViolation {
    /// No value supplied and no default declared
    #[error("missing required value")]
    MissingRequired,
    /// Value shape does not match the declared shape
    #[error("expected {expected}, got {actual}")]
    TypeMismatch {
        /// Declared shape
        expected: String,
        /// Supplied shape
        actual: String,
    },
    /// Relationship supplied where the field forbids one
    #[error("relationship values are not allowed")]
    RelationshipNotAllowed,
}

/// Declared metadata for one property of a resource kind
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Property name
    pub name: String,
    /// Expected value shape
    pub shape: FieldShape,
    /// Whether a value (or default) must be present
    pub required: bool,
    /// Default applied when no value is supplied
    pub default: Option<PropertyValue>,
    /// Whether the field accepts relationship values
    pub allow_relationship: bool,
}

impl FieldDescriptor {
    /// Create an optional field with the given shape
    #[must_use]
    pub fn new(name: impl Into<String>, shape: FieldShape) -> Self {
        Self {
            name: name.into(),
            shape,
            required: false,
            default: None,
            allow_relationship: true,
        }
    }

    /// Mark the field required
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Declare a default value
    #[must_use]
    pub fn with_default(mut self, default: impl Into<PropertyValue>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Forbid relationship values for this field
    #[must_use]
    pub fn literal_only(mut self) -> Self {
        self.allow_relationship = false;
        self
    }

    /// Validate a supplied value against this descriptor.
    ///
    /// Pure: no value is mutated. `Ok(None)` means the field is unset and
    /// permitted to be; `Ok(Some(_))` is the value to carry forward, with
    /// the declared default substituted when nothing was supplied.
    ///
    /// # Errors
    ///
    /// `MissingRequired` when a required field has no value and no
    /// default; `TypeMismatch` on shape disagreement;
    /// `RelationshipNotAllowed` when a relationship is embedded anywhere
    /// in the value and the field forbids them.
    pub fn validate(
        &self,
        value: Option<&PropertyValue>,
    ) -> Result<Option<PropertyValue>, FieldViolation> {
        let Some(value) = value else {
            if let Some(default) = &self.default {
                return Ok(Some(default.clone()));
            }
            if self.required {
                return Err(FieldViolation::MissingRequired);
            }
            return Ok(None);
        };

        if !self.allow_relationship && value.has_relationship() {
            return Err(FieldViolation::RelationshipNotAllowed);
        }

        if !self.shape.matches(value) {
            return Err(FieldViolation::TypeMismatch {
                expected: self.shape.describe(),
                actual: value.shape_name().to_string(),
            });
        }

        Ok(Some(value.clone()))
    }
}
