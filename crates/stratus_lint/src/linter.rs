//! The external linter boundary.

use async_trait::async_trait;

use crate::diagnostic::Severity;

/// A raw finding as the external tool reports it, before severity
/// policy and path mapping are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    /// Tool severity
    pub severity: Severity,
    /// Tool rule identifier
    pub rule: String,
    /// Tool message
    pub message: String,
    /// Document path the tool reported, if any
    pub path: Option<String>,
}

impl Finding {
    /// Create a finding
    #[must_use]
    pub fn new(severity: Severity, rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            rule: rule.into(),
            message: message.into(),
            path: None,
        }
    }

    /// Attach the document path the tool reported
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

/// An external template linter.
///
/// Implementations receive the canonical JSON serialization of a
/// compiled document and return whatever findings the tool produced.
/// A run that completes with findings is a success at this level;
/// `Err` means the tool itself could not run.
#[async_trait]
pub trait Linter: Send + Sync {
    /// Tool name, for logs and error messages
    fn name(&self) -> &str;

    /// Run the tool against a serialized document.
    ///
    /// # Errors
    ///
    /// Returns the tool's own failure message when it could not execute
    async fn run(&self, template_json: &str) -> Result<Vec<Finding>, String>;
}
