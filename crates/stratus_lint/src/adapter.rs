//! Adapter applying severity policy and timeouts around a linter.

use std::sync::Arc;
use std::time::Duration;

use stratus_compiler::Document;

use crate::diagnostic::{Diagnostic, Severity};
use crate::linter::Linter;

/// Error from a lint run
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LintError {
    /// The tool ran and found problems at or above the fatal threshold
    #[error("template failed validation with {} fatal finding(s)", count_fatal(.diagnostics, .threshold))]
    ValidationFailure {
        /// Every retained diagnostic from the run, fatal or not
        diagnostics: Vec<Diagnostic>,
        /// The threshold that was in force
        threshold: Severity,
    },
    /// The tool itself could not run
    #[error("linter {tool} could not run: {reason}")]
    InfrastructureError {
        /// Tool name
        tool: String,
        /// What went wrong
        reason: String,
    },
}

fn count_fatal(diagnostics: &[Diagnostic], threshold: &Severity) -> usize {
    diagnostics.iter().filter(|d| d.at_least(*threshold)).count()
}

/// Severity policy for a lint run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintConfig {
    /// Findings at or above this severity fail the run
    pub fatal_threshold: Severity,
    /// Rule identifiers to drop entirely
    pub ignored_rules: Vec<String>,
}

impl LintConfig {
    /// Default policy: errors are fatal, nothing ignored
    #[must_use]
    pub fn new() -> Self {
        Self {
            fatal_threshold: Severity::Error,
            ignored_rules: Vec::new(),
        }
    }

    /// Set the fatal severity threshold
    #[must_use]
    pub fn with_fatal_threshold(mut self, threshold: Severity) -> Self {
        self.fatal_threshold = threshold;
        self
    }

    /// Ignore a rule identifier
    #[must_use]
    pub fn with_ignored_rule(mut self, rule: impl Into<String>) -> Self {
        self.ignored_rules.push(rule.into());
        self
    }
}

impl Default for LintConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs an external linter against compiled documents.
///
/// The adapter serializes the document once, runs the tool under a
/// timeout, and normalizes its findings. The document is never mutated;
/// validation is observation only.
pub struct LintAdapter {
    linter: Arc<dyn Linter>,
    config: LintConfig,
    timeout: Duration,
}

impl LintAdapter {
    /// Create an adapter with the default policy and a 30 second timeout
    #[must_use]
    pub fn new(linter: Arc<dyn Linter>) -> Self {
        Self {
            linter,
            config: LintConfig::new(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Set the severity policy
    #[must_use]
    pub fn with_config(mut self, config: LintConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the tool timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run the linter against a compiled document.
    ///
    /// Returns the retained diagnostics when none reach the fatal
    /// threshold, so callers can still report warnings.
    ///
    /// # Errors
    ///
    /// `ValidationFailure` when the tool ran and found fatal problems;
    /// `InfrastructureError` when the tool failed to execute or timed
    /// out.
    pub async fn check(&self, document: &Document) -> Result<Vec<Diagnostic>, LintError> {
        let template_json = document.to_json();
        tracing::debug!(tool = self.linter.name(), "running linter");

        let findings = match tokio::time::timeout(self.timeout, self.linter.run(&template_json))
            .await
        {
            Ok(Ok(findings)) => findings,
            Ok(Err(reason)) => {
                return Err(LintError::InfrastructureError {
                    tool: self.linter.name().to_string(),
                    reason,
                });
            }
            Err(_) => {
                return Err(LintError::InfrastructureError {
                    tool: self.linter.name().to_string(),
                    reason: format!("timed out after {:?}", self.timeout),
                });
            }
        };

        let diagnostics: Vec<Diagnostic> = findings
            .into_iter()
            .filter(|finding| !self.config.ignored_rules.contains(&finding.rule))
            .map(|finding| {
                let diag = Diagnostic::new(finding.severity, finding.rule, finding.message);
                match finding.path {
                    Some(path) => diag.with_path(&path),
                    None => diag,
                }
            })
            .collect();

        let fatal = count_fatal(&diagnostics, &self.config.fatal_threshold);
        if fatal > 0 {
            tracing::debug!(tool = self.linter.name(), fatal, "validation failed");
            return Err(LintError::ValidationFailure {
                diagnostics,
                threshold: self.config.fatal_threshold,
            });
        }
        Ok(diagnostics)
    }
}

/// Builtin linters for tests and wiring checks
pub mod builtin {
    use super::*;
    use crate::linter::Finding;
    use async_trait::async_trait;

    /// Linter that always reports a clean template
    pub struct CleanLinter;

    #[async_trait]
    impl Linter for CleanLinter {
        fn name(&self) -> &str {
            "clean"
        }

        async fn run(&self, _template_json: &str) -> Result<Vec<Finding>, String> {
            Ok(Vec::new())
        }
    }

    /// Linter that replays a fixed set of findings
    pub struct FixedLinter {
        /// Findings returned on every run
        pub findings: Vec<Finding>,
    }

    #[async_trait]
    impl Linter for FixedLinter {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn run(&self, _template_json: &str) -> Result<Vec<Finding>, String> {
            Ok(self.findings.clone())
        }
    }

    /// Linter that fails to execute
    pub struct BrokenLinter;

    #[async_trait]
    impl Linter for BrokenLinter {
        fn name(&self) -> &str {
            "broken"
        }

        async fn run(&self, _template_json: &str) -> Result<Vec<Finding>, String> {
            Err("executable not found".to_string())
        }
    }

    /// Linter that never completes within any short timeout
    pub struct StalledLinter;

    #[async_trait]
    impl Linter for StalledLinter {
        fn name(&self) -> &str {
            "stalled"
        }

        async fn run(&self, _template_json: &str) -> Result<Vec<Finding>, String> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(Vec::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::builtin::*;
    use super::*;
    use crate::linter::Finding;
    use stratus_compiler::{Compiler, ResourceDef, Stack};
    use stratus_core::LogicalName;
    use stratus_schema::KindRegistry;

    fn compiled_document() -> Document {
        let mut stack = Stack::new("Demo");
        stack
            .add_resource(ResourceDef::new(
                LogicalName::new("A").unwrap(),
                "bucket",
            ))
            .unwrap();
        Compiler::new().compile(&stack, &KindRegistry::new()).unwrap()
    }

    #[tokio::test]
    async fn test_clean_run_returns_no_diagnostics() {
        let adapter = LintAdapter::new(Arc::new(CleanLinter));
        let diagnostics = adapter.check(&compiled_document()).await.unwrap();
        assert!(diagnostics.is_empty());
    }

    #[tokio::test]
    async fn test_fatal_finding_fails_validation() {
        let linter = FixedLinter {
            findings: vec![Finding::new(Severity::Error, "E3002", "unknown property")
                .with_path("Resources.A.Properties.Name")],
        };
        let adapter = LintAdapter::new(Arc::new(linter));
        let err = adapter.check(&compiled_document()).await.unwrap_err();
        match err {
            LintError::ValidationFailure { diagnostics, .. } => {
                assert_eq!(diagnostics.len(), 1);
                assert_eq!(diagnostics[0].logical_name.as_deref(), Some("A"));
                assert_eq!(diagnostics[0].field.as_deref(), Some("Name"));
            }
            other => panic!("expected validation failure, got {other}"),
        }
    }

    #[tokio::test]
    async fn test_warning_below_threshold_is_returned() {
        let linter = FixedLinter {
            findings: vec![Finding::new(Severity::Warning, "W3005", "redundant DependsOn")],
        };
        let adapter = LintAdapter::new(Arc::new(linter));
        let diagnostics = adapter.check(&compiled_document()).await.unwrap();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, Severity::Warning);
    }

    #[tokio::test]
    async fn test_warning_fatal_under_strict_threshold() {
        let linter = FixedLinter {
            findings: vec![Finding::new(Severity::Warning, "W3005", "redundant DependsOn")],
        };
        let adapter = LintAdapter::new(Arc::new(linter))
            .with_config(LintConfig::new().with_fatal_threshold(Severity::Warning));
        assert!(adapter.check(&compiled_document()).await.is_err());
    }

    #[tokio::test]
    async fn test_ignored_rule_is_dropped() {
        let linter = FixedLinter {
            findings: vec![Finding::new(Severity::Error, "E3002", "unknown property")],
        };
        let adapter = LintAdapter::new(Arc::new(linter))
            .with_config(LintConfig::new().with_ignored_rule("E3002"));
        let diagnostics = adapter.check(&compiled_document()).await.unwrap();
        assert!(diagnostics.is_empty());
    }

    #[tokio::test]
    async fn test_broken_tool_is_infrastructure_error() {
        let adapter = LintAdapter::new(Arc::new(BrokenLinter));
        let err = adapter.check(&compiled_document()).await.unwrap_err();
        match err {
            LintError::InfrastructureError { tool, reason } => {
                assert_eq!(tool, "broken");
                assert!(reason.contains("not found"));
            }
            other => panic!("expected infrastructure error, got {other}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_infrastructure_error() {
        let adapter = LintAdapter::new(Arc::new(StalledLinter))
            .with_timeout(Duration::from_millis(50));
        let err = adapter.check(&compiled_document()).await.unwrap_err();
        assert!(matches!(err, LintError::InfrastructureError { .. }));
    }

    #[tokio::test]
    async fn test_document_is_unchanged_by_lint() {
        let document = compiled_document();
        let before = document.to_json();
        let adapter = LintAdapter::new(Arc::new(CleanLinter));
        adapter.check(&document).await.unwrap();
        assert_eq!(document.to_json(), before);
    }
}
