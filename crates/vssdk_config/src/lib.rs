//! Parsing and validation of `vssdk.toml` analyzer configuration.
//!
//! The configuration controls per-rule severity overrides, names the
//! additional files (thread-affinity lists) handed to the analysis session,
//! and toggles rule-failure tracing.

#![warn(missing_docs)]

pub mod additional_files;
pub mod error;
pub mod loader;
pub mod types;

pub use additional_files::{load_additional_files, AdditionalFile};
pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE_NAME};
pub use types::*;
