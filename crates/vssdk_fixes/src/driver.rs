//! Applying prepared fixes to syntax trees.

use std::collections::BTreeMap;

use tracing::{debug, trace};
use vssdk_common::{CancellationToken, ContentHash};
use vssdk_diagnostics::{Diagnostic, DiagnosticCode};
use vssdk_semantic::Compilation;
use vssdk_source::FileId;
use vssdk_syntax::SyntaxTree;

use crate::error::FixError;
use crate::providers::builtin_providers;
use crate::{CodeAction, CodeFixProvider, FixContext, PreparedFix};

/// The result of fixing every diagnostic of a rule in one file.
#[derive(Debug)]
pub struct FixedDocument {
    /// The file.
    pub file: FileId,
    /// The rewritten tree.
    pub tree: SyntaxTree,
    /// How many of the file's diagnostics were fixed. Fixes that left the
    /// text unchanged are not counted.
    pub applied: usize,
    /// Hash of the rewritten text.
    pub content_hash: ContentHash,
}

impl FixedDocument {
    /// Returns `true` if the rewritten text differs from `original`.
    pub fn changed_from(&self, original: ContentHash) -> bool {
        self.content_hash != original
    }
}

/// Routes diagnostics to their providers and applies the fixes.
pub struct FixDriver {
    providers: Vec<Box<dyn CodeFixProvider>>,
}

impl Default for FixDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl FixDriver {
    /// A driver with every built-in provider.
    pub fn new() -> Self {
        FixDriver {
            providers: builtin_providers(),
        }
    }

    /// A driver without providers.
    pub fn empty() -> Self {
        FixDriver {
            providers: Vec::new(),
        }
    }

    /// Adds a provider. A later provider for the same rule is ignored.
    pub fn register(&mut self, provider: Box<dyn CodeFixProvider>) {
        self.providers.push(provider);
    }

    /// The provider for `code`.
    pub fn provider_for(&self, code: DiagnosticCode) -> Option<&dyn CodeFixProvider> {
        self.providers
            .iter()
            .find(|p| p.fixable_code() == code)
            .map(|p| p.as_ref())
    }

    /// The actions offered for `diagnostic`.
    pub fn code_actions(&self, ctx: &FixContext<'_>, diagnostic: &Diagnostic) -> Vec<CodeAction> {
        self.provider_for(diagnostic.code)
            .map(|p| p.register(ctx, diagnostic))
            .unwrap_or_default()
    }

    /// Applies one action and returns the rewritten tree of its file.
    pub fn apply(
        &self,
        compilation: &Compilation,
        action: &CodeAction,
        cancel: &CancellationToken,
    ) -> Result<SyntaxTree, FixError> {
        let diagnostic = &action.diagnostic;
        let provider = self
            .provider_for(diagnostic.code)
            .ok_or(FixError::NoProvider(diagnostic.code))?;
        let ctx = FixContext::new(compilation, cancel);
        let prepared = provider
            .prepare(&ctx, diagnostic)?
            .ok_or(FixError::NotApplicable {
                code: diagnostic.code,
                span: diagnostic.primary_span,
            })?;
        let tree = ctx
            .tree(prepared.file())?
            .with_annotations(prepared.tracked());
        debug!(code = %diagnostic.code, edits = prepared.edits().len(), "applying code fix");
        apply_prepared(tree, &prepared, cancel)?.ok_or(FixError::NotApplicable {
            code: diagnostic.code,
            span: diagnostic.primary_span,
        })
    }

    /// Fixes every diagnostic of `code` among `diagnostics`, file by file.
    ///
    /// All fixes of a file are prepared against its original tree, whose
    /// tracked nodes are annotated in one pass; the fixes then run in
    /// sequence. A fix whose nodes an earlier fix removed is skipped.
    pub fn fix_all(
        &self,
        compilation: &Compilation,
        code: DiagnosticCode,
        diagnostics: &[Diagnostic],
        cancel: &CancellationToken,
    ) -> Result<Vec<FixedDocument>, FixError> {
        let provider = self.provider_for(code).ok_or(FixError::NoProvider(code))?;
        let ctx = FixContext::new(compilation, cancel);

        let mut by_file: BTreeMap<FileId, Vec<&Diagnostic>> = BTreeMap::new();
        for diagnostic in diagnostics.iter().filter(|d| d.code == code) {
            by_file
                .entry(diagnostic.primary_span.file)
                .or_default()
                .push(diagnostic);
        }

        let mut documents = Vec::new();
        for (file, diagnostics) in by_file {
            cancel.check()?;
            let mut prepared = Vec::new();
            for diagnostic in diagnostics {
                match provider.prepare(&ctx, diagnostic)? {
                    Some(fix) => prepared.push(fix),
                    None => trace!(span = ?diagnostic.primary_span, "fix does not apply"),
                }
            }
            let tracked: Vec<_> = prepared
                .iter()
                .flat_map(|p| p.tracked().iter().copied())
                .collect();
            let mut tree = ctx.tree(file)?.with_annotations(&tracked);
            let mut content_hash = hash_of(&tree);

            let mut applied = 0;
            for fix in &prepared {
                match apply_prepared(tree.clone(), fix, cancel)? {
                    Some(next) => {
                        let next_hash = hash_of(&next);
                        if next_hash == content_hash {
                            trace!(file = file.as_raw(), "fix left the document unchanged");
                        } else {
                            applied += 1;
                        }
                        tree = next;
                        content_hash = next_hash;
                    }
                    None => trace!(file = file.as_raw(), "skipping fix whose target is gone"),
                }
            }
            debug!(%code, file = file.as_raw(), applied, %content_hash, "fixed document");
            documents.push(FixedDocument {
                file,
                tree,
                applied,
                content_hash,
            });
        }
        Ok(documents)
    }
}

fn hash_of(tree: &SyntaxTree) -> ContentHash {
    ContentHash::of_text(&tree.text())
}

/// Runs the edits of `fix` in order. Returns `Ok(None)` when an edit's
/// target cannot be found.
fn apply_prepared(
    mut tree: SyntaxTree,
    fix: &PreparedFix,
    cancel: &CancellationToken,
) -> Result<Option<SyntaxTree>, FixError> {
    for edit in fix.edits() {
        cancel.check()?;
        match edit.apply(&tree)? {
            Some(next) => tree = next,
            None => return Ok(None),
        }
    }
    Ok(Some(tree))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{analyze, compile};
    use crate::FixEdit;
    use vssdk_syntax::SyntaxKind;

    /// Rewrites each `new JoinableTaskContext()` to the same text.
    struct SameText;

    impl CodeFixProvider for SameText {
        fn fixable_code(&self) -> DiagnosticCode {
            DiagnosticCode::vssdk(5)
        }

        fn title(&self, _: &Diagnostic) -> String {
            "same".into()
        }

        fn prepare(
            &self,
            ctx: &FixContext<'_>,
            diagnostic: &Diagnostic,
        ) -> Result<Option<PreparedFix>, FixError> {
            let Some(node) = ctx.node_at(diagnostic.primary_span)? else {
                return Ok(None);
            };
            let Some(creation) = node
                .ancestors_and_self()
                .find(|n| n.kind() == SyntaxKind::ObjectCreationExpression)
            else {
                return Ok(None);
            };
            let mut fix = PreparedFix::new(diagnostic.primary_span.file);
            let ann = fix.track(creation);
            fix.push(FixEdit::ReplaceExpression {
                node: ann,
                replacement: creation.text(),
            });
            Ok(Some(fix))
        }
    }

    const SOURCE: &str = "using Microsoft.VisualStudio.Threading;\n\
                          using Microsoft.VisualStudio.Shell;\n\
                          class C\n\
                          {\n\
                          JoinableTaskContext a = new JoinableTaskContext();\n\
                          JoinableTaskContext b = new JoinableTaskContext();\n\
                          }\n";

    #[test]
    fn fix_all_rewrites_every_occurrence() {
        let (compilation, file) = compile(SOURCE);
        let diagnostics = analyze(SOURCE);
        let driver = FixDriver::new();
        let documents = driver
            .fix_all(&compilation, DiagnosticCode::vssdk(5), &diagnostics, &CancellationToken::new())
            .unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].file, file);
        assert_eq!(documents[0].applied, 2);
        let text = documents[0].tree.text();
        assert_eq!(text.matches("ThreadHelper.JoinableTaskContext").count(), 2);
        assert!(!text.contains("new JoinableTaskContext"));
        let original = compilation.tree(file).unwrap().text();
        assert!(documents[0].changed_from(ContentHash::of_text(&original)));
    }

    #[test]
    fn unchanged_rewrites_are_not_counted() {
        let (compilation, file) = compile(SOURCE);
        let diagnostics = analyze(SOURCE);
        let mut driver = FixDriver::empty();
        driver.register(Box::new(SameText));
        let documents = driver
            .fix_all(&compilation, DiagnosticCode::vssdk(5), &diagnostics, &CancellationToken::new())
            .unwrap();
        assert_eq!(documents[0].applied, 0);
        assert_eq!(documents[0].tree.text(), SOURCE);
        assert!(!documents[0].changed_from(ContentHash::of_text(SOURCE)));
        assert_eq!(documents[0].file, file);
    }

    #[test]
    fn cancelled_fix_produces_nothing() {
        let (compilation, _) = compile(SOURCE);
        let diagnostics = analyze(SOURCE);
        let driver = FixDriver::new();
        let ctx_cancel = CancellationToken::new();
        let ctx = FixContext::new(&compilation, &ctx_cancel);
        let diagnostic = diagnostics
            .iter()
            .find(|d| d.code == DiagnosticCode::vssdk(5))
            .unwrap();
        let action = driver.code_actions(&ctx, diagnostic).remove(0);
        assert_eq!(action.title, "Use ThreadHelper.JoinableTaskContext");
        assert_eq!(action.equivalence_key, "VSSDK005");

        let cancel = CancellationToken::new();
        cancel.cancel();
        assert!(matches!(
            driver.apply(&compilation, &action, &cancel),
            Err(FixError::Cancelled)
        ));
    }

    #[test]
    fn unfixable_rules_have_no_provider() {
        let (compilation, _) = compile(SOURCE);
        let driver = FixDriver::new();
        assert!(driver.provider_for(DiagnosticCode::vssdk(3)).is_none());
        assert_eq!(
            driver
                .fix_all(&compilation, DiagnosticCode::vssdk(7), &[], &CancellationToken::new())
                .unwrap_err(),
            FixError::NoProvider(DiagnosticCode::vssdk(7))
        );
    }
}
