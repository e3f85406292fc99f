//! Common result and error types.

/// The standard result type for fallible internal operations.
///
/// `Err` indicates a bug in an analyzer or rewrite, never a problem in the
/// analyzed program. Problems in the analyzed program are reported as
/// diagnostics and the operation still returns `Ok`.
pub type VssdkResult<T> = Result<T, InternalError>;

/// An internal error indicating a logic bug, not a user input problem.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("internal analyzer error: {message}")]
pub struct InternalError {
    /// Description of the internal error.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_format() {
        let err = InternalError::new("node has no parent");
        assert_eq!(format!("{err}"), "internal analyzer error: node has no parent");
    }

    #[test]
    fn question_mark_converts_strings() {
        fn fails() -> VssdkResult<()> {
            Err::<(), String>(String::from("boom"))?;
            Ok(())
        }
        assert_eq!(fails().unwrap_err().message, "boom");
    }
}
