//! Errors that abort an analysis session.

use std::fmt;

use thiserror::Error;
use vssdk_common::Cancelled;
use vssdk_source::FileId;

use crate::thread_affinity::ClassificationError;

/// Where a rule was when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureLocation {
    /// The file being analyzed.
    pub file: FileId,
    /// 1-based line.
    pub line: u32,
    /// 1-based column, in bytes.
    pub column: u32,
}

impl FailureLocation {
    /// Computes the line and column of `offset` in `text`.
    pub fn at_offset(file: FileId, text: &str, offset: u32) -> Self {
        let offset = (offset as usize).min(text.len());
        let before = &text.as_bytes()[..offset];
        let line = before.iter().filter(|&&b| b == b'\n').count() as u32 + 1;
        let line_start = before
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |p| p + 1);
        Self {
            file,
            line,
            column: (offset - line_start) as u32 + 1,
        }
    }
}

impl fmt::Display for FailureLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "file #{} line {} column {}",
            self.file.as_raw(),
            self.line,
            self.column
        )
    }
}

/// A failure that stops an analysis session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// A classification list could not be parsed; no rule ran.
    #[error("cannot load classification lists: {0}")]
    Classification(#[from] ClassificationError),

    /// A rule returned an internal error or panicked.
    #[error("rule {rule} failed at {location} while analyzing `{node_text}`: {message}")]
    RuleFailed {
        /// The rule id.
        rule: String,
        /// The location of the node the rule was visiting.
        location: FailureLocation,
        /// The text of that node, shortened.
        node_text: String,
        /// The error or panic message.
        message: String,
    },

    /// The session observed a cancellation request.
    #[error("analysis was cancelled")]
    Cancelled,
}

impl From<Cancelled> for AnalysisError {
    fn from(_: Cancelled) -> Self {
        AnalysisError::Cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_is_one_based() {
        let text = "class C\n{\n    void M() { }\n}";
        let offset = text.find("void").unwrap() as u32;
        let location = FailureLocation::at_offset(FileId::from_raw(3), text, offset);
        assert_eq!((location.line, location.column), (3, 5));
        assert_eq!(location.to_string(), "file #3 line 3 column 5");
        let start = FailureLocation::at_offset(FileId::from_raw(0), text, 0);
        assert_eq!((start.line, start.column), (1, 1));
    }

    #[test]
    fn display_rule_failure() {
        let err = AnalysisError::RuleFailed {
            rule: "VSSDK006".to_string(),
            location: FailureLocation {
                file: FileId::from_raw(1),
                line: 4,
                column: 9,
            },
            node_text: "svc.Bar()".to_string(),
            message: "boom".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "rule VSSDK006 failed at file #1 line 4 column 9 while analyzing `svc.Bar()`: boom"
        );
    }

    #[test]
    fn classification_error_converts() {
        let err: AnalysisError = ClassificationError {
            file: "list.txt".to_string(),
            line: 2,
            text: "oops".to_string(),
            reason: "expected `[`".to_string(),
        }
        .into();
        assert!(err.to_string().starts_with("cannot load classification lists: list.txt:2"));
    }
}
