//! Fix for VSSDK001: derive from `AsyncPackage`.

use vssdk_analyzers::matcher::matches_member;
use vssdk_analyzers::properties::ALLOWS_BACKGROUND_LOADING;
use vssdk_analyzers::well_known::WellKnownType;
use vssdk_diagnostics::{Diagnostic, DiagnosticCode};
use vssdk_semantic::SemanticModel;
use vssdk_syntax::{NodeRef, SyntaxKind};

use super::{ensure_usings, SHELL_NAMESPACE};
use crate::error::FixError;
use crate::rewrite::{unique_name, FixEdit, InitializeConversion, UsingSpec};
use crate::{CodeFixProvider, FixContext, PreparedFix};

/// Changes the base class to `AsyncPackage`.
///
/// A block-bodied `override void Initialize()` becomes
/// `InitializeAsync(CancellationToken, IProgress<ServiceProgressData>)`,
/// with its `GetService` calls awaited through `GetServiceAsync`. The
/// package registration is updated to allow background loading.
pub struct AsyncPackageFix;

impl CodeFixProvider for AsyncPackageFix {
    fn fixable_code(&self) -> DiagnosticCode {
        DiagnosticCode::vssdk(1)
    }

    fn title(&self, _diagnostic: &Diagnostic) -> String {
        "Derive from AsyncPackage".to_string()
    }

    fn prepare(
        &self,
        ctx: &FixContext<'_>,
        diagnostic: &Diagnostic,
    ) -> Result<Option<PreparedFix>, FixError> {
        let file = diagnostic.primary_span.file;
        let model = ctx.model(file)?;
        let Some(base) = ctx.node_at(diagnostic.primary_span)? else {
            return Ok(None);
        };
        let Some(class) = base
            .ancestors()
            .find(|n| n.kind() == SyntaxKind::ClassDeclaration)
        else {
            return Ok(None);
        };

        let mut fix = PreparedFix::new(file);
        let mut usings = Vec::new();
        if let Some(initialize) = initialize_override(class) {
            let conversion = conversion(&mut fix, &model, class, initialize);
            fix.push(FixEdit::ConvertInitialize(conversion));
            usings.extend([
                UsingSpec::namespace("System"),
                UsingSpec::namespace("System.Threading"),
                UsingSpec::namespace(SHELL_NAMESPACE),
                UsingSpec::alias("Task", "System.Threading.Tasks.Task"),
            ]);
        }

        let node = fix.track(base);
        fix.push(FixEdit::RenameTypeReference {
            node,
            name: "AsyncPackage".to_string(),
        });

        let registration = WellKnownType::PackageRegistrationAttribute.resolve(ctx.compilation());
        if let Some(registration) = registration {
            for attribute in class
                .attributes()
                .filter(|a| model.attribute_class(*a) == Some(registration))
            {
                let attribute = fix.track(attribute);
                fix.push(FixEdit::SetNamedArgument {
                    attribute,
                    name: ALLOWS_BACKGROUND_LOADING.to_string(),
                    value: "true".to_string(),
                });
            }
        }

        ensure_usings(&mut fix, class, &usings);
        Ok(Some(fix))
    }
}

/// The class's `protected override void Initialize()` with a block body.
fn initialize_override(class: NodeRef<'_>) -> Option<NodeRef<'_>> {
    class.members().find(|m| {
        m.kind() == SyntaxKind::MethodDeclaration
            && m.identifier_text() == "Initialize"
            && m.has_modifier(SyntaxKind::OverrideKeyword)
            && m.parameters().next().is_none()
            && m.body().is_some()
    })
}

fn conversion(
    fix: &mut PreparedFix,
    model: &SemanticModel<'_>,
    class: NodeRef<'_>,
    method: NodeRef<'_>,
) -> InitializeConversion {
    let body = method.body();
    let base_call = body
        .into_iter()
        .flat_map(|b| b.statements())
        .find(|s| is_base_initialize(*s))
        .map(|s| fix.track(s));
    let get_service = WellKnownType::Package.member("GetService");
    let lookups = body
        .into_iter()
        .flat_map(|b| b.descendants())
        .filter(|n| {
            n.kind() == SyntaxKind::InvocationExpression
                && has_own_receiver(*n)
                && !in_nested_function(*n, method)
                && matches_member(model.compilation(), model.symbol_info(*n), &get_service)
        })
        .collect::<Vec<_>>()
        .into_iter()
        .map(|n| fix.track(n))
        .collect();
    InitializeConversion {
        method: fix.track(method),
        base_call,
        lookups,
        cancellation_token: unique_name(class, "cancellationToken"),
        progress: unique_name(class, "progress"),
    }
}

/// `base.Initialize();`
fn is_base_initialize(statement: NodeRef<'_>) -> bool {
    statement.kind() == SyntaxKind::ExpressionStatement
        && statement
            .expression()
            .filter(|e| e.kind() == SyntaxKind::InvocationExpression)
            .filter(|e| e.arguments().next().is_none())
            .and_then(|e| e.expression())
            .is_some_and(|callee| {
                callee.kind() == SyntaxKind::MemberAccessExpression
                    && callee
                        .expression()
                        .is_some_and(|r| r.kind() == SyntaxKind::BaseExpression)
                    && callee.name().is_some_and(|n| n.text() == "Initialize")
            })
}

/// `GetService(...)`, `this.GetService(...)` or `base.GetService(...)`.
fn has_own_receiver(invocation: NodeRef<'_>) -> bool {
    match invocation.expression() {
        Some(callee) if callee.kind() == SyntaxKind::IdentifierName => true,
        Some(callee) if callee.kind() == SyntaxKind::MemberAccessExpression => {
            callee.expression().is_some_and(|r| {
                matches!(
                    r.kind(),
                    SyntaxKind::ThisExpression | SyntaxKind::BaseExpression
                )
            })
        }
        _ => false,
    }
}

fn in_nested_function(node: NodeRef<'_>, method: NodeRef<'_>) -> bool {
    node.ancestors()
        .take_while(|a| *a != method)
        .any(|a| {
            a.kind().is_anonymous_function() || a.kind() == SyntaxKind::LocalFunctionStatement
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fix_single;

    #[test]
    fn converts_package_and_initialize() {
        let source = r#"using Microsoft.VisualStudio.Shell;
using Microsoft.VisualStudio.Shell.Interop;

[PackageRegistration(UseManagedResourcesOnly = true)]
public sealed class MyPackage : Package
{
    protected override void Initialize()
    {
        base.Initialize();
        var shell = GetService(typeof(SVsShell)) as IVsShell;
        System.Action later = () => GetService(typeof(SVsShell));
    }
}
"#;
        let fixed = fix_single(AsyncPackageFix, source).unwrap();
        assert_eq!(
            fixed,
            r#"using Microsoft.VisualStudio.Shell;
using Microsoft.VisualStudio.Shell.Interop;
using System;
using System.Threading;
using Task = System.Threading.Tasks.Task;

[PackageRegistration(UseManagedResourcesOnly = true, AllowsBackgroundLoading = true)]
public sealed class MyPackage : AsyncPackage
{
    protected override async Task InitializeAsync(CancellationToken cancellationToken, IProgress<ServiceProgressData> progress)
    {
        await base.InitializeAsync(cancellationToken, progress);

        // The package may now be initialized on a background thread. Switch to the UI thread
        // before using UI-bound services, or remove the switch if nothing below needs it.
        await this.JoinableTaskFactory.SwitchToMainThreadAsync(cancellationToken);
        var shell = await GetServiceAsync(typeof(SVsShell)) as IVsShell;
        System.Action later = () => GetService(typeof(SVsShell));
    }
}
"#
        );
    }

    #[test]
    fn package_without_initialize_only_changes_the_base() {
        let source = "using Microsoft.VisualStudio.Shell;\n\
                      class MyPackage : Microsoft.VisualStudio.Shell.Package { }\n";
        let fixed = fix_single(AsyncPackageFix, source).unwrap();
        assert_eq!(
            fixed,
            "using Microsoft.VisualStudio.Shell;\n\
             class MyPackage : Microsoft.VisualStudio.Shell.AsyncPackage { }\n"
        );
    }

    #[test]
    fn expression_bodied_initialize_is_left_alone() {
        let source = r#"using Microsoft.VisualStudio.Shell;
class MyPackage : Package
{
    protected override void Initialize() => Setup();
    void Setup() { }
}
"#;
        let fixed = fix_single(AsyncPackageFix, source).unwrap();
        assert!(fixed.contains("class MyPackage : AsyncPackage"));
        assert!(fixed.contains("protected override void Initialize() => Setup();"));
        assert!(!fixed.contains("using Task"));
    }
}
