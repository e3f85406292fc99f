//! VSSDK001: Package class derives from the synchronous `Package` base.

use vssdk_common::VssdkResult;
use vssdk_diagnostics::{DiagnosticCode, Label, Severity};
use vssdk_semantic::{Compilation, SymbolId};
use vssdk_syntax::SyntaxKind;

use crate::hierarchy::direct_base;
use crate::well_known::WellKnownType;
use crate::{AnalyzerRule, TreeAnalyzer, TreeContext};

/// Detects classes whose direct base class is
/// `Microsoft.VisualStudio.Shell.Package`.
///
/// Synchronous packages load on the UI thread and block it while they
/// initialize. Classes deriving indirectly are not reported; their own base
/// is the one to change.
pub struct DeriveFromAsyncPackage;

struct Analyzer {
    package: SymbolId,
    async_package: SymbolId,
}

impl AnalyzerRule for DeriveFromAsyncPackage {
    fn code(&self) -> DiagnosticCode {
        DiagnosticCode::vssdk(1)
    }

    fn name(&self) -> &str {
        "derive-from-async-package"
    }

    fn description(&self) -> &str {
        "package classes should derive from AsyncPackage instead of Package"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn on_compilation_start(&self, compilation: &Compilation) -> Option<Box<dyn TreeAnalyzer>> {
        Some(Box::new(Analyzer {
            package: WellKnownType::Package.resolve(compilation)?,
            async_package: WellKnownType::AsyncPackage.resolve(compilation)?,
        }))
    }
}

impl TreeAnalyzer for Analyzer {
    fn analyze_tree(&self, ctx: &TreeContext<'_>) -> VssdkResult<()> {
        let c = ctx.compilation();
        let model = ctx.model();
        for class in ctx.nodes_of(&[SyntaxKind::ClassDeclaration]) {
            let Some(symbol) = model.declared_symbol(class) else {
                continue;
            };
            if symbol == self.async_package || direct_base(c, symbol) != Some(self.package) {
                continue;
            }
            // Partial classes name the base on one part only.
            let Some(base) = class.base_types().find(|b| {
                model
                    .bind_type(*b)
                    .and_then(|t| c.original_definition(&t))
                    == Some(self.package)
            }) else {
                continue;
            };
            let span = base.span();
            ctx.report(
                ctx.diagnostic(
                    format!(
                        "package `{}` derives from Package; derive from AsyncPackage to load in the background",
                        class.identifier_text()
                    ),
                    span,
                )
                .with_property(crate::properties::TYPE_NAME_PROPERTY, class.identifier_text())
                .with_label(Label::primary(span, "synchronous package base"))
                .with_help("derive from AsyncPackage and override InitializeAsync"),
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{compile_bare, run_rule, span_text};

    #[test]
    fn sync_package_fires() {
        let source = "using Microsoft.VisualStudio.Shell;\n\
                      class MyPackage : Package { }\n\
                      class Qualified : Microsoft.VisualStudio.Shell.Package { }";
        let diags = run_rule(DeriveFromAsyncPackage, source);
        assert_eq!(diags.len(), 2);
        assert_eq!(diags[0].code, DiagnosticCode::vssdk(1));
        assert_eq!(diags[0].severity, Severity::Warning);
        assert_eq!(span_text(source, diags[0].primary_span), "Package");
        assert_eq!(diags[0].property("TypeName"), Some("MyPackage"));
        assert_eq!(
            span_text(source, diags[1].primary_span),
            "Microsoft.VisualStudio.Shell.Package"
        );
    }

    #[test]
    fn async_and_indirect_packages_pass() {
        let source = "using Microsoft.VisualStudio.Shell;\n\
                      class Good : AsyncPackage { }\n\
                      class Base : Package { }\n\
                      class Indirect : Base { }\n\
                      class Plain { }";
        let diags = run_rule(DeriveFromAsyncPackage, source);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].property("TypeName"), Some("Base"));
    }

    #[test]
    fn partial_class_reports_on_the_part_naming_the_base() {
        let source = "using Microsoft.VisualStudio.Shell;\n\
                      partial class Split { }\n\
                      partial class Split : Package { }";
        let diags = run_rule(DeriveFromAsyncPackage, source);
        assert_eq!(diags.len(), 1);
        assert!(diags[0].primary_span.start > source.find(": Package").unwrap() as u32);
    }

    #[test]
    fn declines_without_the_framework() {
        let (c, _) = compile_bare("class Package { }");
        assert!(DeriveFromAsyncPackage.on_compilation_start(&c).is_none());
    }
}
