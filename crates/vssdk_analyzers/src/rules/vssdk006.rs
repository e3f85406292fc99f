//! VSSDK006: Service lookup result used without a null check.

use vssdk_common::VssdkResult;
use vssdk_diagnostics::{DiagnosticCode, Label, Severity};
use vssdk_semantic::Compilation;
use vssdk_syntax::SyntaxKind;

use crate::null_guard::scan_lookup;
use crate::well_known::SERVICE_LOOKUP_METHODS;
use crate::{AnalyzerRule, TreeAnalyzer, TreeContext};

/// Property describing where the lookup result went: `Local`, `Parameter`,
/// `Field`, `Property` or `DirectDereference`.
pub const TARGET_PROPERTY: &str = "Target";

/// Property holding the name of the variable that stores the result.
pub const VARIABLE_PROPERTY: &str = "Variable";

/// The [`TARGET_PROPERTY`] value for a result dereferenced on the spot.
pub const DIRECT_DEREFERENCE: &str = "DirectDereference";

/// Detects service lookups (`GetService`, `GetGlobalService`,
/// `GetServiceAsync`, ...) whose result is dereferenced without first being
/// checked for null.
///
/// The diagnostic sits on the lookup call and lists every unguarded
/// dereference as an additional location. A result dereferenced on the spot
/// is reported at the member access instead.
pub struct CheckServicesExist;

struct Analyzer;

impl AnalyzerRule for CheckServicesExist {
    fn code(&self) -> DiagnosticCode {
        DiagnosticCode::vssdk(6)
    }

    fn name(&self) -> &str {
        "check-services-exist"
    }

    fn description(&self) -> &str {
        "results of service lookups may be null and must be checked before use"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn on_compilation_start(&self, compilation: &Compilation) -> Option<Box<dyn TreeAnalyzer>> {
        SERVICE_LOOKUP_METHODS
            .iter()
            .any(|(ty, _)| ty.resolve(compilation).is_some())
            .then(|| Box::new(Analyzer) as Box<dyn TreeAnalyzer>)
    }
}

impl TreeAnalyzer for Analyzer {
    fn analyze_tree(&self, ctx: &TreeContext<'_>) -> VssdkResult<()> {
        let c = ctx.compilation();
        let model = ctx.model();
        for invocation in ctx.nodes_of(&[SyntaxKind::InvocationExpression]) {
            let Some(finding) = scan_lookup(model, invocation) else {
                continue;
            };
            let method = model
                .symbol_info(invocation)
                .map(|m| c.name(m).to_string())
                .unwrap_or_default();

            let primary = match finding.binding {
                Some(_) => finding.lookup,
                None => finding.primary,
            };
            let span = primary.span();
            let mut diagnostic = ctx
                .diagnostic(
                    format!("the result of `{method}` may be null; check it before dereferencing"),
                    span,
                )
                .with_label(Label::primary(span, "service may not exist"));

            match finding.binding {
                Some(binding) => {
                    diagnostic = diagnostic
                        .with_property(TARGET_PROPERTY, binding.target.as_str())
                        .with_property(VARIABLE_PROPERTY, c.name(binding.symbol))
                        .with_help(format!(
                            "add `Assumes.Present({});` after the assignment or test it for null",
                            c.name(binding.symbol)
                        ));
                }
                None => {
                    diagnostic = diagnostic
                        .with_property(TARGET_PROPERTY, DIRECT_DEREFERENCE)
                        .with_help("store the service in a variable and check it, or use `?.`");
                }
            }
            for dereference in finding.dereferences.iter().filter(|d| **d != primary) {
                diagnostic = diagnostic
                    .with_additional_span(dereference.span())
                    .with_label(Label::secondary(dereference.span(), "dereferenced here"));
            }
            ctx.report(diagnostic);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{run_rule, span_text};

    fn source(members: &str) -> String {
        format!(
            "using System;\n\
             using Microsoft;\n\
             using Microsoft.VisualStudio.Shell;\n\
             using Microsoft.VisualStudio.Shell.Interop;\n\
             class Test : Package\n\
             {{\n\
             {members}\n\
             }}"
        )
    }

    #[test]
    fn unguarded_local_reports_at_lookup_with_uses() {
        let src = source(
            "void M()\n\
             {\n\
                 var solution = GetService(typeof(SVsSolution)) as IVsSolution;\n\
                 solution.GetProjectEnum();\n\
                 solution.GetProjectEnum();\n\
             }",
        );
        let diags = run_rule(CheckServicesExist, &src);
        assert_eq!(diags.len(), 1);
        let d = &diags[0];
        assert_eq!(span_text(&src, d.primary_span), "GetService(typeof(SVsSolution))");
        assert_eq!(d.additional_spans.len(), 2);
        assert_eq!(span_text(&src, d.additional_spans[0]), "solution.GetProjectEnum");
        assert_eq!(d.property(TARGET_PROPERTY), Some("Local"));
        assert_eq!(d.property(VARIABLE_PROPERTY), Some("solution"));
    }

    #[test]
    fn guarded_lookups_pass() {
        let src = source(
            "void Asserted()\n\
             {\n\
                 var solution = GetService(typeof(SVsSolution)) as IVsSolution;\n\
                 Assumes.Present(solution);\n\
                 solution.GetProjectEnum();\n\
             }\n\
             void Tested()\n\
             {\n\
                 var solution = GetService(typeof(SVsSolution)) as IVsSolution;\n\
                 if (solution != null) { solution.GetProjectEnum(); }\n\
             }\n\
             void Conditional()\n\
             {\n\
                 (GetService(typeof(SVsSolution)) as IVsSolution)?.GetProjectEnum();\n\
             }",
        );
        assert!(run_rule(CheckServicesExist, &src).is_empty());
    }

    #[test]
    fn direct_dereference_reports_at_the_access() {
        let src = source(
            "void M()\n\
             {\n\
                 ((IVsSolution)GetService(typeof(SVsSolution))).GetProjectEnum();\n\
             }",
        );
        let diags = run_rule(CheckServicesExist, &src);
        assert_eq!(diags.len(), 1);
        assert_eq!(
            span_text(&src, diags[0].primary_span),
            "((IVsSolution)GetService(typeof(SVsSolution))).GetProjectEnum"
        );
        assert_eq!(diags[0].property(TARGET_PROPERTY), Some(DIRECT_DEREFERENCE));
        assert!(diags[0].additional_spans.is_empty());
    }

    #[test]
    fn field_target_collects_uses_from_other_members() {
        let src = source(
            "IVsSolution solution;\n\
             void Init() { solution = GetService(typeof(SVsSolution)) as IVsSolution; }\n\
             void Use() { solution.GetProjectEnum(); }",
        );
        let diags = run_rule(CheckServicesExist, &src);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].property(TARGET_PROPERTY), Some("Field"));
        assert_eq!(diags[0].additional_spans.len(), 1);
        assert_eq!(diags[0].labels.len(), 2);
    }
}
