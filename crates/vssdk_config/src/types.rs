//! Configuration types deserialized from `vssdk.toml`.

use serde::Deserialize;

/// The top-level analyzer configuration.
#[derive(Debug, Default, Deserialize)]
pub struct VssdkConfig {
    /// Per-rule severity overrides.
    #[serde(default)]
    pub analyzers: AnalyzerConfig,
    /// Additional files handed to the analysis session.
    #[serde(default)]
    pub additional_files: AdditionalFilesConfig,
    /// Settings for diagnosing failures inside rules.
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
}

/// Per-rule severity overrides, keyed by rule id.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct AnalyzerConfig {
    /// Rule ids reported as errors.
    #[serde(default)]
    pub deny: Vec<String>,
    /// Rule ids that are not run at all.
    #[serde(default)]
    pub allow: Vec<String>,
    /// Rule ids reported as warnings regardless of their default.
    #[serde(default)]
    pub warn: Vec<String>,
}

impl AnalyzerConfig {
    /// Returns `true` if the rule is suppressed.
    pub fn is_allowed(&self, rule_id: &str) -> bool {
        self.allow.iter().any(|r| r == rule_id)
    }

    /// Returns `true` if the rule is promoted to an error.
    pub fn is_denied(&self, rule_id: &str) -> bool {
        self.deny.iter().any(|r| r == rule_id)
    }

    /// Returns `true` if the rule is pinned to warning severity.
    pub fn is_warned(&self, rule_id: &str) -> bool {
        self.warn.iter().any(|r| r == rule_id)
    }
}

/// Paths of additional files, relative to the configuration directory.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct AdditionalFilesConfig {
    /// The files to load.
    #[serde(default)]
    pub paths: Vec<String>,
}

/// Settings for diagnosing failures inside rules.
#[derive(Debug, Clone, Deserialize)]
pub struct DiagnosticsConfig {
    /// Log every rule failure through `tracing` before it is propagated.
    #[serde(default = "default_true")]
    pub trace_rule_failures: bool,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            trace_rule_failures: true,
        }
    }
}

fn default_true() -> bool {
    true
}
