//! Shared fixtures for unit tests.

use vssdk_diagnostics::{Diagnostic, DiagnosticSink};
use vssdk_semantic::Compilation;
use vssdk_source::{FileId, SourceDb};
use vssdk_syntax::{NodeRef, SyntaxKind, SyntaxTree};

use crate::engine::AnalyzerEngine;
use crate::AnalyzerRule;

/// Framework reference declarations compiled alongside every test source.
pub(crate) const SDK: &str = include_str!("../testdata/sdk.cs");

/// Compiles `source` together with the SDK stubs. Panics on parse errors.
pub(crate) fn compile(source: &str) -> (Compilation, FileId) {
    let mut db = SourceDb::new();
    db.add_source("Sdk.cs", SDK.to_string());
    let file = db.add_source("Test.cs", source.to_string());
    let sink = DiagnosticSink::new();
    let compilation = Compilation::from_source_db(&db, &sink);
    assert!(
        !sink.has_errors(),
        "parse errors: {:?}",
        sink.diagnostics().iter().map(|d| &d.message).collect::<Vec<_>>()
    );
    (compilation, file)
}

/// Compiles `source` without the SDK stubs.
pub(crate) fn compile_bare(source: &str) -> (Compilation, FileId) {
    let mut db = SourceDb::new();
    let file = db.add_source("Test.cs", source.to_string());
    let sink = DiagnosticSink::new();
    (Compilation::from_source_db(&db, &sink), file)
}

/// The first node of `kind` whose trimmed text is `text`.
pub(crate) fn find<'t>(tree: &'t SyntaxTree, kind: SyntaxKind, text: &str) -> NodeRef<'t> {
    tree.nodes()
        .find(|n| n.kind() == kind && n.text() == text)
        .unwrap_or_else(|| panic!("no {kind:?} `{text}`"))
}

/// Runs a single rule over `source` and returns its diagnostics.
pub(crate) fn run_rule(rule: impl AnalyzerRule + 'static, source: &str) -> Vec<Diagnostic> {
    let (compilation, file) = compile(source);
    let mut engine = AnalyzerEngine::empty();
    engine.register(Box::new(rule));
    let sink = DiagnosticSink::new();
    engine
        .run(&compilation, &[], &Default::default(), &sink)
        .expect("analysis failed");
    sink.take_all()
        .into_iter()
        .filter(|d| d.primary_span.file == file)
        .collect()
}

/// The source text covered by a diagnostic span.
pub(crate) fn span_text(source: &str, span: vssdk_source::Span) -> &str {
    &source[span.start as usize..span.end as usize]
}
