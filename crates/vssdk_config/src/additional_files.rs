//! Loading the additional files named by a configuration.

use crate::error::ConfigError;
use crate::types::VssdkConfig;
use std::path::{Path, PathBuf};

/// An auxiliary text file handed to the analysis session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdditionalFile {
    /// The resolved path of the file.
    pub path: PathBuf,
    /// The file's text.
    pub text: String,
}

impl AdditionalFile {
    /// Creates an additional file from an in-memory path and text.
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }

    /// Returns the final path component, or the empty string.
    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }
}

/// Reads every file listed under `[additional_files]`, resolving relative
/// paths against `base_dir`.
pub fn load_additional_files(
    config: &VssdkConfig,
    base_dir: &Path,
) -> Result<Vec<AdditionalFile>, ConfigError> {
    let mut files = Vec::with_capacity(config.additional_files.paths.len());
    for relative in &config.additional_files.paths {
        let path = base_dir.join(relative);
        let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::AdditionalFile {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), bytes = text.len(), "loaded additional file");
        files.push(AdditionalFile { path, text });
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_config_from_str;

    #[test]
    fn file_name_is_last_component() {
        let file = AdditionalFile::new(
            "lists/vs-threading.MainThreadAssertingMethods.txt",
            "",
        );
        assert_eq!(file.file_name(), "vs-threading.MainThreadAssertingMethods.txt");
    }

    #[test]
    fn loads_relative_to_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("vs-threading.MembersRequiringMainThread.txt"),
            "[Contoso.IFoo]\n",
        )
        .unwrap();
        let config = load_config_from_str(
            "[additional_files]\npaths = [\"vs-threading.MembersRequiringMainThread.txt\"]\n",
        )
        .unwrap();
        let files = load_additional_files(&config, dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].text, "[Contoso.IFoo]\n");
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let config =
            load_config_from_str("[additional_files]\npaths = [\"absent.txt\"]\n").unwrap();
        let err = load_additional_files(&config, dir.path()).unwrap_err();
        match err {
            ConfigError::AdditionalFile { path, .. } => assert!(path.ends_with("absent.txt")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
