//! Structured diagnostics with severity, codes, locations, and properties.

use crate::code::DiagnosticCode;
use crate::label::Label;
use crate::severity::Severity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use vssdk_source::Span;

/// A finding reported by a rule or by the C# front end.
///
/// Besides the rendering data (message, labels, notes), a diagnostic carries
/// the data a code fix needs to act on it without re-running the rule:
/// - `additional_spans` lists related locations in a fixed order
///   (for example the unguarded dereferences of a service lookup)
/// - `properties` records facts the rule already established
///   (for example which package base class it saw)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The severity level of this diagnostic.
    pub severity: Severity,
    /// The rule code identifying the kind of diagnostic.
    pub code: DiagnosticCode,
    /// The main diagnostic message.
    pub message: String,
    /// The primary source span where the issue was detected.
    pub primary_span: Span,
    /// Related locations, in the order the rule reported them.
    pub additional_spans: Vec<Span>,
    /// String facts recorded by the rule for its code fix.
    pub properties: BTreeMap<String, String>,
    /// Annotated source spans rendered under the message.
    pub labels: Vec<Label>,
    /// Explanatory footnotes.
    pub notes: Vec<String>,
    /// Actionable suggestions.
    pub help: Vec<String>,
    /// Link to the rule's documentation page.
    pub help_uri: Option<String>,
}

impl Diagnostic {
    /// Creates a diagnostic with the given severity, code, message, and span.
    pub fn new(
        severity: Severity,
        code: DiagnosticCode,
        message: impl Into<String>,
        span: Span,
    ) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            primary_span: span,
            additional_spans: Vec::new(),
            properties: BTreeMap::new(),
            labels: Vec::new(),
            notes: Vec::new(),
            help: Vec::new(),
            help_uri: None,
        }
    }

    /// Creates a new error diagnostic.
    pub fn error(code: DiagnosticCode, message: impl Into<String>, span: Span) -> Self {
        Self::new(Severity::Error, code, message, span)
    }

    /// Creates a new warning diagnostic.
    pub fn warning(code: DiagnosticCode, message: impl Into<String>, span: Span) -> Self {
        Self::new(Severity::Warning, code, message, span)
    }

    /// Creates a new informational diagnostic.
    pub fn info(code: DiagnosticCode, message: impl Into<String>, span: Span) -> Self {
        Self::new(Severity::Info, code, message, span)
    }

    /// Returns the rule id (`VSSDK006`, `SYN001`, ...).
    pub fn rule_id(&self) -> String {
        self.code.to_string()
    }

    /// Returns the property recorded under `key`, if any.
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Appends an additional location.
    pub fn with_additional_span(mut self, span: Span) -> Self {
        self.additional_spans.push(span);
        self
    }

    /// Records a property for the code fix.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Adds a label to this diagnostic.
    pub fn with_label(mut self, label: Label) -> Self {
        self.labels.push(label);
        self
    }

    /// Adds a note to this diagnostic.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Adds a help message to this diagnostic.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help.push(help.into());
        self
    }

    /// Sets the documentation link.
    pub fn with_help_uri(mut self, uri: impl Into<String>) -> Self {
        self.help_uri = Some(uri.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_warning() {
        let diag = Diagnostic::warning(DiagnosticCode::vssdk(1), "use AsyncPackage", Span::DUMMY);
        assert_eq!(diag.severity, Severity::Warning);
        assert_eq!(diag.rule_id(), "VSSDK001");
        assert!(diag.additional_spans.is_empty());
    }

    #[test]
    fn properties_roundtrip_through_builder() {
        let diag = Diagnostic::error(DiagnosticCode::vssdk(2), "mismatch", Span::DUMMY)
            .with_property("BaseType", "AsyncPackage");
        assert_eq!(diag.property("BaseType"), Some("AsyncPackage"));
        assert_eq!(diag.property("Missing"), None);
    }

    #[test]
    fn additional_spans_keep_order() {
        use vssdk_source::FileId;
        let f = FileId::from_raw(0);
        let diag = Diagnostic::info(DiagnosticCode::vssdk(6), "check", Span::new(f, 0, 3))
            .with_additional_span(Span::new(f, 20, 25))
            .with_additional_span(Span::new(f, 10, 15));
        assert_eq!(diag.additional_spans[0].start, 20);
        assert_eq!(diag.additional_spans[1].start, 10);
    }

    #[test]
    fn builder_methods() {
        let diag = Diagnostic::error(DiagnosticCode::vssdk(5), "new context", Span::DUMMY)
            .with_label(Label::primary(Span::DUMMY, "constructed here"))
            .with_note("a second context can deadlock")
            .with_help("use ThreadHelper.JoinableTaskContext")
            .with_help_uri("https://example.invalid/VSSDK005.md");
        assert_eq!(diag.labels.len(), 1);
        assert_eq!(diag.notes.len(), 1);
        assert_eq!(diag.help.len(), 1);
        assert!(diag.help_uri.is_some());
    }
}
