//! Errors raised while applying code fixes.

use thiserror::Error;
use vssdk_common::Cancelled;
use vssdk_diagnostics::DiagnosticCode;
use vssdk_source::{FileId, Span};
use vssdk_syntax::make::MakeError;

/// A fix that could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FixError {
    /// The cancellation token fired. No tree is produced.
    #[error("code fix was cancelled")]
    Cancelled,

    /// No provider is registered for the diagnostic's rule.
    #[error("no code fix is registered for {0}")]
    NoProvider(DiagnosticCode),

    /// The provider's preconditions no longer hold at the diagnostic.
    #[error("the fix for {code} does not apply at {span:?}")]
    NotApplicable {
        /// The rule of the diagnostic.
        code: DiagnosticCode,
        /// Its primary span.
        span: Span,
    },

    /// The diagnostic points into a file the compilation does not contain.
    #[error("file #{} is not part of the compilation", .0.as_raw())]
    UnknownFile(FileId),

    /// A replacement snippet did not parse.
    #[error(transparent)]
    Snippet(#[from] MakeError),
}

impl From<Cancelled> for FixError {
    fn from(_: Cancelled) -> Self {
        FixError::Cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellation_converts() {
        let token = vssdk_common::CancellationToken::new();
        token.cancel();
        let err: FixError = token.check().unwrap_err().into();
        assert_eq!(err, FixError::Cancelled);
    }

    #[test]
    fn messages_name_the_rule() {
        let err = FixError::NoProvider(DiagnosticCode::vssdk(3));
        assert_eq!(err.to_string(), "no code fix is registered for VSSDK003");
        let err = FixError::UnknownFile(FileId::from_raw(4));
        assert_eq!(err.to_string(), "file #4 is not part of the compilation");
    }
}
