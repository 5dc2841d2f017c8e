//! Normalized linter diagnostics.

use serde::{Deserialize, Serialize};

/// How serious a finding is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    /// Informational only
    Info,
    /// Suspicious but deployable
    Warning,
    /// Deployment would fail or misbehave
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// One normalized finding from an external linter.
///
/// When the tool reports a `Resources.<name>.Properties.<field>` path,
/// the location is mapped back onto the originating resource so callers
/// never have to parse tool-specific paths themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Finding severity
    pub severity: Severity,
    /// Human-readable message
    pub message: String,
    /// Tool rule identifier, e.g. `E3002`
    pub rule: String,
    /// Logical name of the resource the finding points at, when the
    /// reported path identifies one
    pub logical_name: Option<String>,
    /// Property field within that resource, when present in the path
    pub field: Option<String>,
}

impl Diagnostic {
    /// Create a diagnostic with no location
    #[must_use]
    pub fn new(severity: Severity, rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            rule: rule.into(),
            logical_name: None,
            field: None,
        }
    }

    /// Attach a document path reported by the tool.
    ///
    /// Paths of the form `Resources.<name>` map the logical name;
    /// `Resources.<name>.Properties.<field>` also maps the field. Any
    /// other path leaves the location empty.
    #[must_use]
    pub fn with_path(mut self, path: &str) -> Self {
        let mut parts = path.split('.');
        if parts.next() == Some("Resources") {
            if let Some(name) = parts.next() {
                self.logical_name = Some(name.to_string());
                if parts.next() == Some("Properties") {
                    if let Some(field) = parts.next() {
                        self.field = Some(field.to_string());
                    }
                }
            }
        }
        self
    }

    /// True when the finding is at or above the given threshold
    #[must_use]
    pub fn at_least(&self, threshold: Severity) -> bool {
        self.severity >= threshold
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}: {}", self.severity, self.rule, self.message)?;
        if let Some(name) = &self.logical_name {
            write!(f, " (at {name}")?;
            if let Some(field) = &self.field {
                write!(f, ".{field}")?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}
