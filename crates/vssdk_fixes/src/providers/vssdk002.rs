//! Fix for VSSDK002: make `AllowsBackgroundLoading` match the base class.

use vssdk_analyzers::properties::{ALLOWS_BACKGROUND_LOADING, BASE_TYPE_PROPERTY};
use vssdk_diagnostics::{Diagnostic, DiagnosticCode};
use vssdk_syntax::SyntaxKind;

use crate::error::FixError;
use crate::rewrite::FixEdit;
use crate::{CodeFixProvider, FixContext, PreparedFix};

/// Sets `AllowsBackgroundLoading = true` on async packages and removes the
/// argument from synchronous ones.
pub struct RegistrationFix;

impl CodeFixProvider for RegistrationFix {
    fn fixable_code(&self) -> DiagnosticCode {
        DiagnosticCode::vssdk(2)
    }

    fn title(&self, diagnostic: &Diagnostic) -> String {
        match diagnostic.property(BASE_TYPE_PROPERTY) {
            Some("Package") => format!("Remove {ALLOWS_BACKGROUND_LOADING}"),
            _ => format!("Set {ALLOWS_BACKGROUND_LOADING} = true"),
        }
    }

    fn prepare(
        &self,
        ctx: &FixContext<'_>,
        diagnostic: &Diagnostic,
    ) -> Result<Option<PreparedFix>, FixError> {
        let Some(node) = ctx.node_at(diagnostic.primary_span)? else {
            return Ok(None);
        };
        let Some(attribute) = node
            .ancestors_and_self()
            .find(|n| n.kind() == SyntaxKind::Attribute)
        else {
            return Ok(None);
        };
        let mut fix = PreparedFix::new(diagnostic.primary_span.file);
        let target = fix.track(attribute);
        let edit = match diagnostic.property(BASE_TYPE_PROPERTY) {
            Some("AsyncPackage") => FixEdit::SetNamedArgument {
                attribute: target,
                name: ALLOWS_BACKGROUND_LOADING.to_string(),
                value: "true".to_string(),
            },
            Some("Package") => FixEdit::RemoveNamedArgument {
                attribute: target,
                name: ALLOWS_BACKGROUND_LOADING.to_string(),
            },
            _ => return Ok(None),
        };
        fix.push(edit);
        Ok(Some(fix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fix_single;

    fn package(attribute: &str, base: &str) -> String {
        format!("using Microsoft.VisualStudio.Shell;\n[{attribute}]\nclass P : {base} {{ }}\n")
    }

    #[test]
    fn async_package_gets_the_flag() {
        let fixed = fix_single(RegistrationFix, &package("PackageRegistration", "AsyncPackage"));
        assert_eq!(
            fixed.unwrap(),
            package("PackageRegistration(AllowsBackgroundLoading = true)", "AsyncPackage")
        );

        let fixed = fix_single(
            RegistrationFix,
            &package("PackageRegistration(AllowsBackgroundLoading = false)", "AsyncPackage"),
        );
        assert_eq!(
            fixed.unwrap(),
            package("PackageRegistration(AllowsBackgroundLoading = true)", "AsyncPackage")
        );
    }

    #[test]
    fn sync_package_loses_the_flag() {
        let fixed = fix_single(
            RegistrationFix,
            &package(
                "PackageRegistration(UseManagedResourcesOnly = true, AllowsBackgroundLoading = true)",
                "Package",
            ),
        );
        assert_eq!(
            fixed.unwrap(),
            package("PackageRegistration(UseManagedResourcesOnly = true)", "Package")
        );
    }

    #[test]
    fn titles_follow_the_base_type() {
        let diagnostic = Diagnostic::error(
            DiagnosticCode::vssdk(2),
            "",
            vssdk_source::Span::new(vssdk_source::FileId::DUMMY, 0, 0),
        )
        .with_property(BASE_TYPE_PROPERTY, "Package");
        assert_eq!(RegistrationFix.title(&diagnostic), "Remove AllowsBackgroundLoading");
    }
}
