//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::VssdkConfig;
use std::collections::HashSet;
use std::path::Path;
use vssdk_diagnostics::{Category, DiagnosticCode};

/// Name of the configuration file looked up in a project directory.
pub const CONFIG_FILE_NAME: &str = "vssdk.toml";

/// Highest rule number in the catalog (`VSSDK001` through `VSSDK008`).
const LAST_RULE: u16 = 8;

/// Loads and validates `<project_dir>/vssdk.toml`.
///
/// A missing file yields the default configuration.
pub fn load_config(project_dir: &Path) -> Result<VssdkConfig, ConfigError> {
    let config_path = project_dir.join(CONFIG_FILE_NAME);
    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "no configuration file, using defaults");
        return Ok(VssdkConfig::default());
    }
    let content = std::fs::read_to_string(&config_path)?;
    load_config_from_str(&content)
}

/// Parses and validates a `vssdk.toml` configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<VssdkConfig, ConfigError> {
    let config: VssdkConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Checks that every rule id is well formed and that no rule is both
/// denied and allowed.
fn validate_config(config: &VssdkConfig) -> Result<(), ConfigError> {
    let lists = [
        &config.analyzers.deny,
        &config.analyzers.allow,
        &config.analyzers.warn,
    ];
    for id in lists.into_iter().flatten() {
        match id.parse::<DiagnosticCode>() {
            Ok(code)
                if code.category == Category::Vssdk
                    && (1..=LAST_RULE).contains(&code.number) => {}
            _ => return Err(ConfigError::InvalidRuleId(id.clone())),
        }
    }

    let denied: HashSet<&str> = config.analyzers.deny.iter().map(String::as_str).collect();
    if let Some(both) = config
        .analyzers
        .allow
        .iter()
        .find(|id| denied.contains(id.as_str()))
    {
        return Err(ConfigError::ValidationError(format!(
            "rule {both} is listed in both deny and allow"
        )));
    }

    if config.additional_files.paths.iter().any(|p| p.trim().is_empty()) {
        return Err(ConfigError::ValidationError(
            "additional_files.paths contains an empty path".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_is_default() {
        let config = load_config_from_str("").unwrap();
        assert!(config.analyzers.deny.is_empty());
        assert!(config.additional_files.paths.is_empty());
        assert!(config.diagnostics.trace_rule_failures);
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[analyzers]
deny = ["VSSDK006"]
allow = ["VSSDK003"]
warn = ["VSSDK002"]

[additional_files]
paths = ["vs-threading.MembersRequiringMainThread.txt"]

[diagnostics]
trace_rule_failures = false
"#;
        let config = load_config_from_str(toml).unwrap();
        assert!(config.analyzers.is_denied("VSSDK006"));
        assert!(config.analyzers.is_allowed("VSSDK003"));
        assert!(config.analyzers.is_warned("VSSDK002"));
        assert!(!config.analyzers.is_denied("VSSDK001"));
        assert_eq!(config.additional_files.paths.len(), 1);
        assert!(!config.diagnostics.trace_rule_failures);
    }

    #[test]
    fn rejects_foreign_rule_id() {
        let err = load_config_from_str("[analyzers]\ndeny = [\"CA2007\"]\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRuleId(id) if id == "CA2007"));
    }

    #[test]
    fn rejects_unknown_rule_number() {
        let err = load_config_from_str("[analyzers]\nwarn = [\"VSSDK042\"]\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRuleId(id) if id == "VSSDK042"));
    }

    #[test]
    fn rejects_syntax_category_in_lists() {
        let err = load_config_from_str("[analyzers]\nallow = [\"SYN001\"]\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRuleId(_)));
    }

    #[test]
    fn rejects_deny_and_allow_of_same_rule() {
        let toml = "[analyzers]\ndeny = [\"VSSDK007\"]\nallow = [\"VSSDK007\"]\n";
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn rejects_empty_additional_path() {
        let err = load_config_from_str("[additional_files]\npaths = [\" \"]\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = load_config_from_str("[analyzers\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[analyzers]\nwarn = [\"VSSDK004\"]\n",
        )
        .unwrap();
        let config = load_config(dir.path()).unwrap();
        assert!(config.analyzers.is_warned("VSSDK004"));
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(dir.path()).unwrap();
        assert!(config.analyzers.allow.is_empty());
    }
}
