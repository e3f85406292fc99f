//! Error types for configuration loading and validation.

use std::path::PathBuf;

/// Errors that can occur when loading or validating a `vssdk.toml` configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An I/O error occurred while reading the configuration file.
    #[error("failed to read configuration: {0}")]
    IoError(#[from] std::io::Error),

    /// The TOML content could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// A rule id in a severity list is not of the form `VSSDKnnn`.
    #[error("invalid rule id '{0}'")]
    InvalidRuleId(String),

    /// An additional file named in the configuration could not be read.
    #[error("failed to read additional file {}: {source}", path.display())]
    AdditionalFile {
        /// The path that was being read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A configuration value failed validation.
    #[error("validation error: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_rule_id() {
        let err = ConfigError::InvalidRuleId("W101".to_string());
        assert_eq!(format!("{err}"), "invalid rule id 'W101'");
    }

    #[test]
    fn display_parse_error() {
        let err = ConfigError::ParseError("expected '=' at line 3".to_string());
        assert_eq!(
            format!("{err}"),
            "failed to parse configuration: expected '=' at line 3"
        );
    }

    #[test]
    fn display_additional_file() {
        let err = ConfigError::AdditionalFile {
            path: PathBuf::from("lists/vs-threading.MembersRequiringMainThread.txt"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        let display = format!("{err}");
        assert!(display.starts_with("failed to read additional file lists/"));
        assert!(display.ends_with("missing"));
    }

    #[test]
    fn display_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let display = format!("{}", ConfigError::IoError(io_err));
        assert!(display.starts_with("failed to read configuration:"));
    }
}
