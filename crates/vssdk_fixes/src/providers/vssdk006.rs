//! Fix for VSSDK006: assert that a looked-up service is present.

use vssdk_analyzers::ancestor::enclosing_statement;
use vssdk_analyzers::null_guard::{classify_consumption, Consumption};
use vssdk_analyzers::properties::{DIRECT_DEREFERENCE, TARGET_PROPERTY};
use vssdk_analyzers::well_known::WellKnownType;
use vssdk_diagnostics::{Diagnostic, DiagnosticCode};
use vssdk_syntax::SyntaxKind;

use super::ensure_usings;
use crate::error::FixError;
use crate::rewrite::{FixEdit, UsingSpec};
use crate::{CodeFixProvider, FixContext, PreparedFix};

/// Inserts `Assumes.Present(x);` right after the statement that stores a
/// service lookup in `x`.
///
/// Results dereferenced on the spot have no variable to assert on and are
/// not fixed.
pub struct AssumePresentFix;

impl CodeFixProvider for AssumePresentFix {
    fn fixable_code(&self) -> DiagnosticCode {
        DiagnosticCode::vssdk(6)
    }

    fn title(&self, _diagnostic: &Diagnostic) -> String {
        "Assert the service is present".to_string()
    }

    fn prepare(
        &self,
        ctx: &FixContext<'_>,
        diagnostic: &Diagnostic,
    ) -> Result<Option<PreparedFix>, FixError> {
        if diagnostic.property(TARGET_PROPERTY) == Some(DIRECT_DEREFERENCE) {
            return Ok(None);
        }
        if WellKnownType::Assumes.resolve(ctx.compilation()).is_none() {
            return Ok(None);
        }
        let file = diagnostic.primary_span.file;
        let model = ctx.model(file)?;
        let Some(lookup) = ctx
            .tree(file)?
            .find_node(diagnostic.primary_span, SyntaxKind::InvocationExpression)
        else {
            return Ok(None);
        };
        let Consumption::Bound(binding) = classify_consumption(&model, lookup) else {
            return Ok(None);
        };
        let Some(statement) = enclosing_statement(binding.site)
            .filter(|s| s.parent().is_some_and(|p| p.kind() == SyntaxKind::Block))
        else {
            return Ok(None);
        };
        let guarded = match binding.site.kind() {
            SyntaxKind::VariableDeclarator => binding.site.identifier_text().to_string(),
            _ => match binding.site.left() {
                Some(left) => left.text(),
                None => return Ok(None),
            },
        };

        let mut fix = PreparedFix::new(file);
        let anchor = fix.track(statement);
        fix.push(FixEdit::InsertStatementAfter {
            anchor,
            statement: format!("Assumes.Present({guarded});"),
        });
        ensure_usings(&mut fix, statement, &[UsingSpec::namespace("Microsoft")]);
        Ok(Some(fix))
    }
}
