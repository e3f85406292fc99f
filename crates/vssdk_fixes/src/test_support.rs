//! Shared fixtures for unit tests.

use vssdk_analyzers::AnalyzerEngine;
use vssdk_common::CancellationToken;
use vssdk_diagnostics::{Diagnostic, DiagnosticSink};
use vssdk_semantic::Compilation;
use vssdk_source::{FileId, SourceDb};
use vssdk_syntax::{Annotation, NodeRef, SyntaxKind, SyntaxTree};

use crate::error::FixError;
use crate::{CodeFixProvider, FixContext, FixDriver};

/// Framework reference declarations compiled alongside every test source.
const SDK: &str = include_str!("../../vssdk_analyzers/testdata/sdk.cs");

/// Parses `source` on its own.
pub(crate) fn parse(source: &str) -> SyntaxTree {
    let sink = DiagnosticSink::new();
    vssdk_syntax::parse_text(FileId::from_raw(0), source, &sink)
}

/// The first node of `kind` whose trimmed text is `text`.
pub(crate) fn node_with_text<'t>(
    tree: &'t SyntaxTree,
    kind: SyntaxKind,
    text: &str,
) -> Option<NodeRef<'t>> {
    tree.nodes().find(|n| n.kind() == kind && n.text() == text)
}

/// Annotates the first node of `kind` with text `text`.
pub(crate) fn annotate(tree: &SyntaxTree, kind: SyntaxKind, text: &str) -> (SyntaxTree, Annotation) {
    let node = node_with_text(tree, kind, text).unwrap_or_else(|| panic!("no {kind:?} `{text}`"));
    let ann = Annotation::fresh();
    (tree.with_annotations(&[(node.id(), ann)]), ann)
}

/// Compiles `source` together with the SDK stubs.
pub(crate) fn compile(source: &str) -> (Compilation, FileId) {
    let mut db = SourceDb::new();
    db.add_source("Sdk.cs", SDK.to_string());
    let file = db.add_source("Test.cs", source.to_string());
    let sink = DiagnosticSink::new();
    let compilation = Compilation::from_source_db(&db, &sink);
    assert!(!sink.has_errors(), "parse errors in test source");
    (compilation, file)
}

fn diagnostics_of(compilation: &Compilation, file: FileId) -> Vec<Diagnostic> {
    let sink = DiagnosticSink::new();
    AnalyzerEngine::with_defaults()
        .run(compilation, &[], &CancellationToken::new(), &sink)
        .expect("analysis failed");
    sink.take_all()
        .into_iter()
        .filter(|d| d.primary_span.file == file)
        .collect()
}

/// Runs every built-in rule over `source`.
pub(crate) fn analyze(source: &str) -> Vec<Diagnostic> {
    let (compilation, file) = compile(source);
    diagnostics_of(&compilation, file)
}

/// Applies `provider` to the first of its diagnostics in `source` and
/// returns the fixed text.
pub(crate) fn fix_single(
    provider: impl CodeFixProvider + 'static,
    source: &str,
) -> Result<String, FixError> {
    let (compilation, file) = compile(source);
    let code = provider.fixable_code();
    let diagnostic = diagnostics_of(&compilation, file)
        .into_iter()
        .find(|d| d.code == code)
        .unwrap_or_else(|| panic!("{code} was not reported"));

    let mut driver = FixDriver::empty();
    driver.register(Box::new(provider));
    let cancel = CancellationToken::new();
    let ctx = FixContext::new(&compilation, &cancel);
    let action = match driver.code_actions(&ctx, &diagnostic).pop() {
        Some(action) => action,
        None => crate::CodeAction {
            title: String::new(),
            equivalence_key: code.to_string(),
            diagnostic,
        },
    };
    driver.apply(&compilation, &action, &cancel).map(|tree| tree.text())
}
