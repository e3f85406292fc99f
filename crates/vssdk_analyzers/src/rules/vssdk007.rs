//! VSSDK007: `ThreadHelper.JoinableTaskFactory.RunAsync` result is dropped.

use vssdk_common::VssdkResult;
use vssdk_diagnostics::{DiagnosticCode, Label, Severity};
use vssdk_semantic::Compilation;
use vssdk_syntax::SyntaxKind;

use crate::fire_and_forget::{scan_run_async, RunAsyncUse};
use crate::well_known::WellKnownType;
use crate::{AnalyzerRule, TreeAnalyzer, TreeContext};

/// Detects `RunAsync` calls on the shell's joinable task factory whose
/// task is discarded, or stored and then neither awaited, joined nor
/// handed to a method that does so. Unobserved tasks swallow exceptions and
/// can outlive the package.
pub struct UntrackedRunAsync;

struct Analyzer;

impl AnalyzerRule for UntrackedRunAsync {
    fn code(&self) -> DiagnosticCode {
        DiagnosticCode::vssdk(7)
    }

    fn name(&self) -> &str {
        "avoid-untracked-run-async"
    }

    fn description(&self) -> &str {
        "tasks started with ThreadHelper.JoinableTaskFactory.RunAsync should be awaited or joined"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn on_compilation_start(&self, compilation: &Compilation) -> Option<Box<dyn TreeAnalyzer>> {
        WellKnownType::ThreadHelper.resolve(compilation)?;
        WellKnownType::JoinableTaskFactory.resolve(compilation)?;
        Some(Box::new(Analyzer))
    }
}

impl TreeAnalyzer for Analyzer {
    fn analyze_tree(&self, ctx: &TreeContext<'_>) -> VssdkResult<()> {
        let model = ctx.model();
        for invocation in ctx.nodes_of(&[SyntaxKind::InvocationExpression]) {
            let Some(finding) = scan_run_async(model, invocation) else {
                continue;
            };
            let span = finding.name.span();
            let label = match finding.usage {
                RunAsyncUse::Discarded => "task is discarded",
                _ => "task is never awaited or joined",
            };
            ctx.report(
                ctx.diagnostic(
                    "the task returned by RunAsync is not tracked; await it, join it or pass it to code that does",
                    span,
                )
                .with_label(Label::primary(span, label))
                .with_help("await the JoinableTask, call Join/JoinAsync, or store it and observe it later"),
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{run_rule, span_text};

    fn source(body: &str) -> String {
        format!(
            "using System.Threading.Tasks;\n\
             using Microsoft.VisualStudio.Shell;\n\
             using Microsoft.VisualStudio.Threading;\n\
             class Test\n\
             {{\n\
                 async Task M()\n\
                 {{\n\
             {body}\n\
                 }}\n\
             }}"
        )
    }

    #[test]
    fn discarded_task_reports_at_run_async() {
        let src = source("ThreadHelper.JoinableTaskFactory.RunAsync(async () => { });");
        let diags = run_rule(UntrackedRunAsync, &src);
        assert_eq!(diags.len(), 1);
        assert_eq!(span_text(&src, diags[0].primary_span), "RunAsync");
        assert_eq!(diags[0].labels[0].message, "task is discarded");
    }

    #[test]
    fn stored_but_unobserved_reports() {
        let src = source("var task = ThreadHelper.JoinableTaskFactory.RunAsync(async () => { });");
        let diags = run_rule(UntrackedRunAsync, &src);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].labels[0].message, "task is never awaited or joined");
    }

    #[test]
    fn observed_tasks_pass() {
        let src = source(
            "await ThreadHelper.JoinableTaskFactory.RunAsync(async () => { });\n\
             ThreadHelper.JoinableTaskFactory.RunAsync(async () => { }).Join();\n\
             var task = ThreadHelper.JoinableTaskFactory.RunAsync(async () => { });\n\
             await task.JoinAsync();",
        );
        assert!(run_rule(UntrackedRunAsync, &src).is_empty());
    }
}
