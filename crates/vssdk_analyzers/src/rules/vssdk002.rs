//! VSSDK002: `PackageRegistration` background-loading flag disagrees with the
//! package base class.

use vssdk_common::VssdkResult;
use vssdk_diagnostics::{DiagnosticCode, Label, Severity};
use vssdk_semantic::{Compilation, SymbolId};
use vssdk_syntax::SyntaxKind;

use super::{attributes_of, bool_literal, named_argument};
use crate::hierarchy::is_equal_to_or_derived_from;
use crate::well_known::WellKnownType;
use crate::{AnalyzerRule, TreeAnalyzer, TreeContext};

/// Property naming the base class family of the package.
pub const BASE_TYPE_PROPERTY: &str = "BaseType";

/// The named argument this rule inspects.
pub const ALLOWS_BACKGROUND_LOADING: &str = "AllowsBackgroundLoading";

/// Detects `[PackageRegistration]` attributes whose
/// `AllowsBackgroundLoading` value does not match the base class.
///
/// An `AsyncPackage` must set it to `true` or the shell loads it
/// synchronously; a synchronous `Package` must not set it. Values that are
/// not a literal are left alone.
pub struct RegistrationMatchesBase;

struct Analyzer {
    package: SymbolId,
    async_package: SymbolId,
    registration: SymbolId,
}

impl AnalyzerRule for RegistrationMatchesBase {
    fn code(&self) -> DiagnosticCode {
        DiagnosticCode::vssdk(2)
    }

    fn name(&self) -> &str {
        "package-registration-matches-base"
    }

    fn description(&self) -> &str {
        "AllowsBackgroundLoading must be true exactly when the package derives from AsyncPackage"
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn on_compilation_start(&self, compilation: &Compilation) -> Option<Box<dyn TreeAnalyzer>> {
        Some(Box::new(Analyzer {
            package: WellKnownType::Package.resolve(compilation)?,
            async_package: WellKnownType::AsyncPackage.resolve(compilation)?,
            registration: WellKnownType::PackageRegistrationAttribute.resolve(compilation)?,
        }))
    }
}

impl TreeAnalyzer for Analyzer {
    fn analyze_tree(&self, ctx: &TreeContext<'_>) -> VssdkResult<()> {
        let c = ctx.compilation();
        let model = ctx.model();
        for class in ctx.nodes_of(&[SyntaxKind::ClassDeclaration]) {
            let symbol = model.declared_symbol(class);
            if !is_equal_to_or_derived_from(c, symbol, self.package) {
                continue;
            }
            let is_async = is_equal_to_or_derived_from(c, symbol, self.async_package);
            let base_type = if is_async { "AsyncPackage" } else { "Package" };

            for attribute in attributes_of(model, class, self.registration) {
                let argument = named_argument(attribute, ALLOWS_BACKGROUND_LOADING);
                let value = argument.and_then(|a| a.expression()).map(bool_literal);
                let (location, message) = match (is_async, argument, value) {
                    (true, None, _) => (
                        attribute,
                        format!(
                            "`{}` derives from AsyncPackage but its registration does not set AllowsBackgroundLoading = true",
                            class.identifier_text()
                        ),
                    ),
                    (true, Some(argument), Some(Some(false))) => (
                        argument,
                        format!(
                            "`{}` derives from AsyncPackage but its registration sets AllowsBackgroundLoading = false",
                            class.identifier_text()
                        ),
                    ),
                    (false, Some(argument), Some(Some(true))) => (
                        argument,
                        format!(
                            "`{}` derives from Package but its registration sets AllowsBackgroundLoading = true",
                            class.identifier_text()
                        ),
                    ),
                    _ => continue,
                };
                let span = location.span();
                ctx.report(
                    ctx.diagnostic(message, span)
                        .with_property(BASE_TYPE_PROPERTY, base_type)
                        .with_label(Label::primary(span, format!("package derives from {base_type}")))
                        .with_help(if is_async {
                            "set AllowsBackgroundLoading = true"
                        } else {
                            "remove AllowsBackgroundLoading or derive from AsyncPackage"
                        }),
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
    fn async_package_without_flag_reports_at_attribute() {
        let src = source("PackageRegistration(UseManagedResourcesOnly = true)", "AsyncPackage");
        let diags = run_rule(RegistrationMatchesBase, &src);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].severity, Severity::Error);
        assert_eq!(
            span_text(&src, diags[0].primary_span),
            "PackageRegistration(UseManagedResourcesOnly = true)"
        );
        assert_eq!(diags[0].property(BASE_TYPE_PROPERTY), Some("AsyncPackage"));
    }

    #[test]
    fn async_package_with_false_reports_at_argument() {
        let src = source("PackageRegistration(AllowsBackgroundLoading = false)", "AsyncPackage");
        let diags = run_rule(RegistrationMatchesBase, &src);
        assert_eq!(diags.len(), 1);
        assert_eq!(
            span_text(&src, diags[0].primary_span),
            "AllowsBackgroundLoading = false"
        );
    }

    #[test]
    fn sync_package_with_true_reports() {
        let src = source("PackageRegistration(AllowsBackgroundLoading = true)", "Package");
        let diags = run_rule(RegistrationMatchesBase, &src);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].property(BASE_TYPE_PROPERTY), Some("Package"));
    }

    #[test]
    fn consistent_registrations_pass() {
        for (attribute, base) in [
            ("PackageRegistration(AllowsBackgroundLoading = true)", "AsyncPackage"),
            ("PackageRegistration(UseManagedResourcesOnly = true)", "Package"),
            ("PackageRegistration(AllowsBackgroundLoading = false)", "Package"),
            ("PackageRegistration", "Package"),
            ("System.Flags", "AsyncPackage"),
        ] {
            let src = source(attribute, base);
            assert!(run_rule(RegistrationMatchesBase, &src).is_empty(), "{attribute} on {base}");
        }
    }

    #[test]
    fn derived_async_package_counts_as_async() {
        let src = "using Microsoft.VisualStudio.Shell;\n\
                   abstract class Mid : AsyncPackage { }\n\
                   [PackageRegistration(UseManagedResourcesOnly = true)]\n\
                   class Test : Mid { }";
        let diags = run_rule(RegistrationMatchesBase, src);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].property(BASE_TYPE_PROPERTY), Some("AsyncPackage"));
    }
}
