//! VSSDK005: A new `JoinableTaskContext` is created instead of using the
//! shared one.

use vssdk_common::VssdkResult;
use vssdk_diagnostics::{DiagnosticCode, Label, Severity};
use vssdk_semantic::{Compilation, SymbolId};
use vssdk_syntax::SyntaxKind;

use crate::well_known::WellKnownType;
use crate::{AnalyzerRule, TreeAnalyzer, TreeContext};

/// Detects `new JoinableTaskContext(...)`. Extensions must share the
/// context owned by the shell, `ThreadHelper.JoinableTaskContext`, or
/// their joinable tasks can deadlock against the shell's.
pub struct JoinableTaskContextSingleton;

struct Analyzer {
    context: SymbolId,
}

impl AnalyzerRule for JoinableTaskContextSingleton {
    fn code(&self) -> DiagnosticCode {
        DiagnosticCode::vssdk(5)
    }

    fn name(&self) -> &str {
        "use-joinable-task-context-singleton"
    }

    fn description(&self) -> &str {
        "use ThreadHelper.JoinableTaskContext instead of creating a JoinableTaskContext"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn on_compilation_start(&self, compilation: &Compilation) -> Option<Box<dyn TreeAnalyzer>> {
        WellKnownType::ThreadHelper.resolve(compilation)?;
        Some(Box::new(Analyzer {
            context: WellKnownType::JoinableTaskContext.resolve(compilation)?,
        }))
    }
}

impl TreeAnalyzer for Analyzer {
    fn analyze_tree(&self, ctx: &TreeContext<'_>) -> VssdkResult<()> {
        let c = ctx.compilation();
        let model = ctx.model();
        for creation in ctx.nodes_of(&[SyntaxKind::ObjectCreationExpression]) {
            let created = creation
                .declared_type()
                .and_then(|t| model.bind_type(t))
                .and_then(|t| c.original_definition(&t));
            if created != Some(self.context) {
                continue;
            }
            let span = creation.span();
            ctx.report(
                ctx.diagnostic(
                    "use ThreadHelper.JoinableTaskContext instead of creating a new JoinableTaskContext",
                    span,
                )
                .with_label(Label::primary(span, "new context created here"))
                .with_help("replace with ThreadHelper.JoinableTaskContext"),
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{compile, run_rule, span_text};

    #[test]
    fn creation_reports() {
        let source = "using Microsoft.VisualStudio.Threading;\n\
                      class Test\n\
                      {\n\
                          JoinableTaskContext context = new JoinableTaskContext();\n\
                          void M() { var f = new Microsoft.VisualStudio.Threading.JoinableTaskContext().Factory; }\n\
                      }";
        let diags = run_rule(JoinableTaskContextSingleton, source);
        assert_eq!(diags.len(), 2);
        assert_eq!(span_text(source, diags[0].primary_span), "new JoinableTaskContext()");
        assert!(diags[0]
            .help_uri
            .as_deref()
            .is_some_and(|u| u.ends_with("/VSSDK005.md")));
    }

    #[test]
    fn singleton_use_passes() {
        let source = "using Microsoft.VisualStudio.Shell;\n\
                      using Microsoft.VisualStudio.Threading;\n\
                      class JoinableTaskContextHolder { }\n\
                      class Test\n\
                      {\n\
                          JoinableTaskContext context = ThreadHelper.JoinableTaskContext;\n\
                          object other = new JoinableTaskContextHolder();\n\
                      }";
        assert!(run_rule(JoinableTaskContextSingleton, source).is_empty());
    }

    #[test]
    fn activation_needs_the_shell() {
        let (c, _) = compile("class Empty { }");
        assert!(JoinableTaskContextSingleton.on_compilation_start(&c).is_some());
    }
}
