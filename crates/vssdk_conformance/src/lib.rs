//! End-to-end helpers for the VSSDK analyzers and code fixes.
//!
//! Each helper compiles C# source text together with reference declarations
//! of the Visual Studio SDK, runs the analyzers, and optionally applies a
//! code fix and analyzes the printed result again.

#![warn(missing_docs)]

use vssdk_analyzers::AnalyzerEngine;
use vssdk_common::CancellationToken;
use vssdk_config::{load_config_from_str, AdditionalFile, VssdkConfig};
use vssdk_diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink, Severity};
use vssdk_fixes::{FixContext, FixDriver, FixError};
use vssdk_semantic::Compilation;
use vssdk_source::{FileId, SourceDb, Span};

/// Reference declarations of the framework types the rules recognize.
pub const SDK: &str = include_str!("../../vssdk_analyzers/testdata/sdk.cs");

/// Name under which the source under test is added.
pub const TEST_FILE: &str = "Test.cs";

/// The outcome of analyzing one source file.
pub struct AnalysisResult {
    /// The loaded files: the SDK first, then the source under test.
    pub source_db: SourceDb,
    /// The compilation over both files.
    pub compilation: Compilation,
    /// The file of the source under test.
    pub file: FileId,
    /// Diagnostics reported in the source under test, in emission order.
    pub diagnostics: Vec<Diagnostic>,
}

impl AnalysisResult {
    /// The diagnostics of rule `code`.
    pub fn of(&self, code: DiagnosticCode) -> Vec<&Diagnostic> {
        self.diagnostics.iter().filter(|d| d.code == code).collect()
    }

    /// How many diagnostics rule `code` reported.
    pub fn count(&self, code: DiagnosticCode) -> usize {
        self.of(code).len()
    }

    /// The source text under `span`.
    pub fn span_text(&self, span: Span) -> &str {
        self.source_db.snippet(span)
    }

    /// Number of diagnostics at `severity`.
    pub fn severity_count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }
}

/// Shorthand for `DiagnosticCode::vssdk(number)`.
pub fn rule(number: u16) -> DiagnosticCode {
    DiagnosticCode::vssdk(number)
}

/// Analyzes `source` with every built-in rule at default severities.
pub fn analyze(source: &str) -> AnalysisResult {
    analyze_with(source, &VssdkConfig::default(), &[])
}

/// Analyzes `source` with a `vssdk.toml` given as text.
pub fn analyze_with_config(source: &str, config_toml: &str) -> AnalysisResult {
    let config = load_config_from_str(config_toml).expect("invalid test configuration");
    analyze_with(source, &config, &[])
}

/// Analyzes `source` under `config`, handing `additional_files` to the rules.
pub fn analyze_with(
    source: &str,
    config: &VssdkConfig,
    additional_files: &[AdditionalFile],
) -> AnalysisResult {
    let mut source_db = SourceDb::new();
    source_db.add_source("Sdk.cs", SDK.to_string());
    let file = source_db.add_source(TEST_FILE, source.to_string());
    let sink = DiagnosticSink::new();
    let compilation = Compilation::from_source_db(&source_db, &sink);
    assert!(
        !sink.has_errors(),
        "parse errors: {:?}",
        sink.diagnostics().iter().map(|d| &d.message).collect::<Vec<_>>()
    );

    let engine = AnalyzerEngine::new(config);
    let sink = DiagnosticSink::new();
    engine
        .run(&compilation, additional_files, &CancellationToken::new(), &sink)
        .expect("analysis failed");
    let diagnostics = sink
        .take_all()
        .into_iter()
        .filter(|d| d.primary_span.file == file)
        .collect();

    AnalysisResult {
        source_db,
        compilation,
        file,
        diagnostics,
    }
}

/// Applies the fix for the first `code` diagnostic in `source` and returns
/// the printed result, or `Ok(None)` when `code` is not reported.
pub fn fix_first(source: &str, code: DiagnosticCode) -> Result<Option<String>, FixError> {
    let result = analyze(source);
    let Some(diagnostic) = result.of(code).into_iter().next() else {
        return Ok(None);
    };
    let driver = FixDriver::new();
    let cancel = CancellationToken::new();
    let ctx = FixContext::new(&result.compilation, &cancel);
    let Some(action) = driver.code_actions(&ctx, diagnostic).pop() else {
        return Err(FixError::NotApplicable {
            code,
            span: diagnostic.primary_span,
        });
    };
    let tree = driver.apply(&result.compilation, &action, &cancel)?;
    Ok(Some(tree.text()))
}

/// Applies the fix for every `code` diagnostic in `source` and returns the
/// printed result with the number of fixes applied.
pub fn fix_all(source: &str, code: DiagnosticCode) -> Result<(String, usize), FixError> {
    let result = analyze(source);
    let documents = FixDriver::new().fix_all(
        &result.compilation,
        code,
        &result.diagnostics,
        &CancellationToken::new(),
    )?;
    Ok(documents
        .into_iter()
        .find(|d| d.file == result.file)
        .map(|d| (d.tree.text(), d.applied))
        .unwrap_or_else(|| (source.to_string(), 0)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sdk_compiles_cleanly() {
        let result = analyze("class Empty { }");
        assert!(result.diagnostics.is_empty());
        assert_eq!(result.source_db.len(), 2);
    }

    #[test]
    fn span_text_reads_the_test_file() {
        let source = "using Microsoft.VisualStudio.Shell;\nclass P : Package { }\n";
        let result = analyze(source);
        let diagnostic = result.of(rule(1))[0];
        assert_eq!(result.span_text(diagnostic.primary_span), "Package");
    }

    #[test]
    fn fix_first_without_diagnostic_is_none() {
        assert_eq!(fix_first("class Empty { }", rule(1)), Ok(None));
    }
}
