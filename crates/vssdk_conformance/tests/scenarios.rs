//! The four reference scenarios, from source text to fixed source text.

use vssdk_conformance::{analyze, fix_first, rule};
use vssdk_diagnostics::Severity;

#[test]
fn sync_base_type_becomes_async_package() {
    let source = "using Microsoft.VisualStudio.Shell;\nclass Test : Package { }\n";
    let result = analyze(source);
    assert_eq!(result.diagnostics.len(), 1);
    let diagnostic = &result.diagnostics[0];
    assert_eq!(diagnostic.code, rule(1));
    assert_eq!(result.span_text(diagnostic.primary_span), "Package");

    let fixed = fix_first(source, rule(1)).unwrap().unwrap();
    assert_eq!(fixed, "using Microsoft.VisualStudio.Shell;\nclass Test : AsyncPackage { }\n");
    assert!(analyze(&fixed).diagnostics.is_empty());
}

#[test]
fn registration_mismatch_gains_the_flag() {
    let source = "using Microsoft.VisualStudio.Shell;\n\
                  [PackageRegistration(UseManagedResourcesOnly = true)]\n\
                  class Test : AsyncPackage { }\n";
    let result = analyze(source);
    let reported = result.of(rule(2));
    assert_eq!(reported.len(), 1);
    assert_eq!(reported[0].severity, Severity::Error);
    assert_eq!(
        result.span_text(reported[0].primary_span),
        "PackageRegistration(UseManagedResourcesOnly = true)"
    );

    let fixed = fix_first(source, rule(2)).unwrap().unwrap();
    assert!(fixed.contains(
        "[PackageRegistration(UseManagedResourcesOnly = true, AllowsBackgroundLoading = true)]"
    ));
    assert_eq!(analyze(&fixed).count(rule(2)), 0);
}

#[test]
fn unguarded_service_gets_an_assertion() {
    let source = r#"using System;
using Microsoft.VisualStudio.Shell;
using Microsoft.VisualStudio.Shell.Interop;

class Test : AsyncPackage
{
    void M()
    {
        var svc = this.GetService(typeof(SVsSolution)) as IVsSolution;
        svc.GetProjectEnum();
    }
}
"#;
    let result = analyze(source);
    let reported = result.of(rule(6));
    assert_eq!(reported.len(), 1);
    assert_eq!(
        result.span_text(reported[0].primary_span),
        "this.GetService(typeof(SVsSolution))"
    );
    let related: Vec<&str> = reported[0]
        .additional_spans
        .iter()
        .map(|s| result.span_text(*s))
        .collect();
    assert_eq!(related, ["svc.GetProjectEnum"]);

    let fixed = fix_first(source, rule(6)).unwrap().unwrap();
    assert!(fixed.contains(
        "as IVsSolution;\n        Assumes.Present(svc);\n        svc.GetProjectEnum();"
    ));
    assert!(fixed.contains("using Microsoft;\n"));
    assert_eq!(analyze(&fixed).count(rule(6)), 0);
}

#[test]
fn discarded_run_async_reports_at_the_method_name() {
    let source = r#"using System.Threading.Tasks;
using Microsoft.VisualStudio.Shell;
using Microsoft.VisualStudio.Threading;

class Test
{
    void M()
    {
        ThreadHelper.JoinableTaskFactory.RunAsync(async () => { await Task.Delay(1); });
    }
}
"#;
    let result = analyze(source);
    let reported = result.of(rule(7));
    assert_eq!(reported.len(), 1);
    assert_eq!(result.span_text(reported[0].primary_span), "RunAsync");
    assert!(reported[0].additional_spans.is_empty());
    assert_eq!(fix_first(source, rule(7)), Err(vssdk_fixes::FixError::NotApplicable {
        code: rule(7),
        span: reported[0].primary_span,
    }));
}
