//! Fix for VSSDK005: use the shell's `JoinableTaskContext`.

use vssdk_diagnostics::{Diagnostic, DiagnosticCode};
use vssdk_syntax::SyntaxKind;

use super::{ensure_usings, SHELL_NAMESPACE};
use crate::error::FixError;
use crate::rewrite::{FixEdit, UsingSpec};
use crate::{CodeFixProvider, FixContext, PreparedFix};

/// Replaces `new JoinableTaskContext(...)` with
/// `ThreadHelper.JoinableTaskContext`.
pub struct JoinableTaskContextFix;

impl CodeFixProvider for JoinableTaskContextFix {
    fn fixable_code(&self) -> DiagnosticCode {
        DiagnosticCode::vssdk(5)
    }

    fn title(&self, _diagnostic: &Diagnostic) -> String {
        "Use ThreadHelper.JoinableTaskContext".to_string()
    }

    fn prepare(
        &self,
        ctx: &FixContext<'_>,
        diagnostic: &Diagnostic,
    ) -> Result<Option<PreparedFix>, FixError> {
        let Some(creation) = ctx
            .tree(diagnostic.primary_span.file)?
            .find_node(diagnostic.primary_span, SyntaxKind::ObjectCreationExpression)
        else {
            return Ok(None);
        };
        let mut fix = PreparedFix::new(diagnostic.primary_span.file);
        let node = fix.track(creation);
        fix.push(FixEdit::ReplaceExpression {
            node,
            replacement: "ThreadHelper.JoinableTaskContext".to_string(),
        });
        ensure_usings(&mut fix, creation, &[UsingSpec::namespace(SHELL_NAMESPACE)]);
        Ok(Some(fix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fix_single;

    #[test]
    fn creation_becomes_the_singleton() {
        let source = "using Microsoft.VisualStudio.Threading;\n\
                      class C\n\
                      {\n\
                      JoinableTaskContext context = new JoinableTaskContext();\n\
                      }\n";
        let fixed = fix_single(JoinableTaskContextFix, source).unwrap();
        assert_eq!(
            fixed,
            "using Microsoft.VisualStudio.Threading;\n\
             using Microsoft.VisualStudio.Shell;\n\
             class C\n\
             {\n\
             JoinableTaskContext context = ThreadHelper.JoinableTaskContext;\n\
             }\n"
        );
    }
}
