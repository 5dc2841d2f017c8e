//! Logical names for stack entities.
//!
//! A logical name is the caller-chosen identifier a resource, parameter,
//! or output is keyed by inside a rendered template. Names are validated
//! once at construction and ordered lexicographically, so every
//! tie-break in the compiler is a plain `Ord` comparison.

use serde::{Deserialize, Serialize};

use crate::error::{CompileError, CompileResult};

/// Validated logical name, unique within a stack.
///
/// The external template schema keys entries by alphanumeric identifiers,
/// so the same rule is enforced here: non-empty, ASCII alphanumeric.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogicalName(String);

impl LogicalName {
    /// Create a validated logical name
    ///
    /// # Errors
    ///
    /// Returns `InvalidLogicalName` if the name is empty or contains
    /// characters outside ASCII alphanumerics.
    pub fn new(name: impl Into<String>) -> CompileResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(CompileError::InvalidLogicalName {
                name,
                reason: "must not be empty".to_string(),
            });
        }
        if !name.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(CompileError::InvalidLogicalName {
                name,
                reason: "must contain only ASCII letters and digits".to_string(),
            });
        }
        Ok(Self(name))
    }

    /// Get the name as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LogicalName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for LogicalName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for LogicalName {
    type Error = CompileError;

    fn try_from(value: &str) -> CompileResult<Self> {
        Self::new(value)
    }
}

/// Derive a deployable stack name from a camel-case type name.
///
/// `format_stack_name("TestStack") == "test-stack"`. Callers that want
/// full control pass an explicit name instead.
#[must_use]
pub fn format_stack_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let chars: Vec<char> = name.chars().collect();
    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() {
            let follows_lower = i > 0 && chars[i - 1].is_ascii_lowercase();
            let follows_digit = i > 0 && chars[i - 1].is_ascii_digit();
            let starts_word = i > 0
                && i + 1 < chars.len()
                && chars[i - 1].is_ascii_uppercase()
                && chars[i + 1].is_ascii_lowercase();
            if follows_lower || follows_digit || starts_word {
                out.push('-');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_valid() {
        let name = LogicalName::new("Bucket1").unwrap();
        assert_eq!(name.as_str(), "Bucket1");
        assert_eq!(format!("{}", name), "Bucket1");
    }

    #[test]
    fn test_name_empty() {
        assert!(LogicalName::new("").is_err());
    }

    #[test]
    fn test_name_rejects_punctuation() {
        assert!(LogicalName::new("my-bucket").is_err());
        assert!(LogicalName::new("a b").is_err());
    }

    #[test]
    fn test_name_ordering_is_lexicographic() {
        let a = LogicalName::new("Alpha").unwrap();
        let b = LogicalName::new("Beta").unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_format_stack_name() {
        assert_eq!(format_stack_name("TestStack"), "test-stack");
        assert_eq!(format_stack_name("S3Stack"), "s3-stack");
        assert_eq!(format_stack_name("AnotherTestStack"), "another-test-stack");
    }
}
