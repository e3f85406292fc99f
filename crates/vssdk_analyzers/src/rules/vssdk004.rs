//! VSSDK004: `ProvideAutoLoad` on an async package without the
//! `BackgroundLoad` flag.

use vssdk_common::VssdkResult;
use vssdk_diagnostics::{DiagnosticCode, Label, Severity};
use vssdk_semantic::{Compilation, SemanticModel, SymbolId};
use vssdk_syntax::{NodeRef, SyntaxKind};

use super::attributes_of;
use crate::hierarchy::is_equal_to_or_derived_from;
use crate::matcher::matches_member;
use crate::well_known::WellKnownType;
use crate::{AnalyzerRule, TreeAnalyzer, TreeContext};

/// Detects auto-load registrations of an `AsyncPackage` that do not pass
/// `PackageAutoLoadFlags.BackgroundLoad`, which makes the shell load the
/// package synchronously.
pub struct BackgroundLoadFlag;

struct Analyzer {
    async_package: SymbolId,
    provide_auto_load: SymbolId,
}

impl AnalyzerRule for BackgroundLoadFlag {
    fn code(&self) -> DiagnosticCode {
        DiagnosticCode::vssdk(4)
    }

    fn name(&self) -> &str {
        "background-load-flag"
    }

    fn description(&self) -> &str {
        "auto-load registrations of async packages should include PackageAutoLoadFlags.BackgroundLoad"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn on_compilation_start(&self, compilation: &Compilation) -> Option<Box<dyn TreeAnalyzer>> {
        WellKnownType::PackageAutoLoadFlags.resolve(compilation)?;
        Some(Box::new(Analyzer {
            async_package: WellKnownType::AsyncPackage.resolve(compilation)?,
            provide_auto_load: WellKnownType::ProvideAutoLoadAttribute.resolve(compilation)?,
        }))
    }
}

/// Returns `true` if an argument of `attribute` mentions the
/// `BackgroundLoad` flag.
pub fn has_background_load_flag(model: &SemanticModel<'_>, attribute: NodeRef<'_>) -> bool {
    let flag = WellKnownType::PackageAutoLoadFlags.member("BackgroundLoad");
    attribute.arguments().any(|argument| {
        argument.descendants().any(|n| {
            matches!(
                n.kind(),
                SyntaxKind::MemberAccessExpression | SyntaxKind::IdentifierName
            ) && matches_member(model.compilation(), model.symbol_info(n), &flag)
        })
    })
}

impl TreeAnalyzer for Analyzer {
    fn analyze_tree(&self, ctx: &TreeContext<'_>) -> VssdkResult<()> {
        let c = ctx.compilation();
        let model = ctx.model();
        for class in ctx.nodes_of(&[SyntaxKind::ClassDeclaration]) {
            if !is_equal_to_or_derived_from(c, model.declared_symbol(class), self.async_package) {
                continue;
            }
            for attribute in attributes_of(model, class, self.provide_auto_load) {
                ctx.enter(attribute);
                if has_background_load_flag(model, attribute) {
                    continue;
                }
                let span = attribute.span();
                ctx.report(
                    ctx.diagnostic(
                        format!(
                            "`{}` derives from AsyncPackage but auto-loads without PackageAutoLoadFlags.BackgroundLoad",
                            class.identifier_text()
                        ),
                        span,
                    )
                    .with_label(Label::primary(span, "loads synchronously"))
                    .with_help("pass PackageAutoLoadFlags.BackgroundLoad"),
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{run_rule, span_text};

    fn source(attribute: &str, base: &str) -> String {
        format!(
            "using Microsoft.VisualStudio.Shell;\n\
             [{attribute}]\n\
             class Test : {base} {{ }}"
        )
    }

    #[test]
    fn missing_flag_reports_at_attribute() {
        let src = source("ProvideAutoLoad(UIContextGuids80.SolutionExists)", "AsyncPackage");
        let diags = run_rule(BackgroundLoadFlag, &src);
        assert_eq!(diags.len(), 1);
        assert_eq!(
            span_text(&src, diags[0].primary_span),
            "ProvideAutoLoad(UIContextGuids80.SolutionExists)"
        );
    }

    #[test]
    fn other_flags_do_not_count() {
        let src = source(
            "ProvideAutoLoad(UIContextGuids80.SolutionExists, PackageAutoLoadFlags.SkipWhenUIContextRulesActive)",
            "AsyncPackage",
        );
        assert_eq!(run_rule(BackgroundLoadFlag, &src).len(), 1);
    }

    #[test]
    fn background_flag_passes() {
        for flags in [
            "PackageAutoLoadFlags.BackgroundLoad",
            "PackageAutoLoadFlags.SkipWhenUIContextRulesActive | PackageAutoLoadFlags.BackgroundLoad",
        ] {
            let src = source(
                &format!("ProvideAutoLoad(UIContextGuids80.NoSolution, {flags})"),
                "AsyncPackage",
            );
            assert!(run_rule(BackgroundLoadFlag, &src).is_empty(), "{flags}");
        }
    }

    #[test]
    fn sync_packages_are_not_checked() {
        let src = source("ProvideAutoLoad(UIContextGuids80.SolutionExists)", "Package");
        assert!(run_rule(BackgroundLoadFlag, &src).is_empty());
    }
}
