//! Fix for VSSDK004: add `PackageAutoLoadFlags.BackgroundLoad`.

use vssdk_diagnostics::{Diagnostic, DiagnosticCode};
use vssdk_syntax::SyntaxKind;

use super::{ensure_usings, SHELL_NAMESPACE};
use crate::error::FixError;
use crate::rewrite::{FixEdit, UsingSpec};
use crate::{CodeFixProvider, FixContext, PreparedFix};

const FLAG: &str = "PackageAutoLoadFlags.BackgroundLoad";

/// Ors `PackageAutoLoadFlags.BackgroundLoad` into the flags of a
/// `ProvideAutoLoad` attribute, or passes it as the flags argument.
pub struct BackgroundLoadFlagFix;

impl CodeFixProvider for BackgroundLoadFlagFix {
    fn fixable_code(&self) -> DiagnosticCode {
        DiagnosticCode::vssdk(4)
    }

    fn title(&self, _diagnostic: &Diagnostic) -> String {
        format!("Add {FLAG}")
    }

    fn prepare(
        &self,
        ctx: &FixContext<'_>,
        diagnostic: &Diagnostic,
    ) -> Result<Option<PreparedFix>, FixError> {
        let Some(attribute) = ctx
            .tree(diagnostic.primary_span.file)?
            .find_node(diagnostic.primary_span, SyntaxKind::Attribute)
        else {
            return Ok(None);
        };
        // The context guid comes first; without it there is nowhere to put the flag.
        let has_context = attribute
            .arguments()
            .any(|a| a.child_node(SyntaxKind::NameEquals).is_none());
        if !has_context {
            return Ok(None);
        }
        let mut fix = PreparedFix::new(diagnostic.primary_span.file);
        let target = fix.track(attribute);
        fix.push(FixEdit::AddFlag {
            attribute: target,
            flag: FLAG.to_string(),
        });
        ensure_usings(&mut fix, attribute, &[UsingSpec::namespace(SHELL_NAMESPACE)]);
        Ok(Some(fix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fix_single;

    fn package(attribute: &str) -> String {
        format!(
            "using Microsoft.VisualStudio.Shell;\n\
             [PackageRegistration(AllowsBackgroundLoading = true)]\n\
             [{attribute}]\n\
             class P : AsyncPackage {{ }}\n"
        )
    }

    #[test]
    fn flag_is_appended_after_the_context() {
        let fixed = fix_single(BackgroundLoadFlagFix, &package("ProvideAutoLoad(UIContextGuids80.NoSolution)"));
        assert_eq!(
            fixed.unwrap(),
            package("ProvideAutoLoad(UIContextGuids80.NoSolution, PackageAutoLoadFlags.BackgroundLoad)")
        );
    }

    #[test]
    fn flag_is_ored_into_existing_flags() {
        let fixed = fix_single(
            BackgroundLoadFlagFix,
            &package("ProvideAutoLoad(UIContextGuids80.NoSolution, PackageAutoLoadFlags.None)"),
        );
        assert_eq!(
            fixed.unwrap(),
            package("ProvideAutoLoad(UIContextGuids80.NoSolution, PackageAutoLoadFlags.None | PackageAutoLoadFlags.BackgroundLoad)")
        );
    }
}
