//! Diagnostic rendering backends for human-readable and machine-readable output.

use crate::diagnostic::Diagnostic;
use crate::label::LabelStyle;
use vssdk_source::{SourceDb, Span};

/// Trait for rendering diagnostics into formatted output strings.
pub trait DiagnosticRenderer {
    /// Renders a single diagnostic into a formatted string.
    fn render(&self, diag: &Diagnostic, source_db: &SourceDb) -> String;
}

/// Renders diagnostics in a rustc-style terminal format.
///
/// ```text
/// warning[VSSDK006]: check whether the service 'svc' is null before using it
///   --> src/MyPackage.cs:14:17
///    |
/// 14 |             var svc = GetService(typeof(SVsShell)) as IVsShell;
///    |                 ^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^
///   ::: src/MyPackage.cs:15:13
///    = help: insert Assumes.Present(svc) after the assignment
///    = see: https://github.com/Microsoft/VSSDK-Analyzers/blob/main/doc/VSSDK006.md
/// ```
pub struct TerminalRenderer {
    /// Whether to use ANSI color codes in output.
    pub color: bool,
}

impl TerminalRenderer {
    /// Creates a new terminal renderer.
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn header(&self, diag: &Diagnostic) -> String {
        let tag = format!("{}[{}]", diag.severity, diag.code);
        if self.color {
            let color = match diag.severity {
                crate::Severity::Error => "31",
                crate::Severity::Warning => "33",
                crate::Severity::Info => "36",
            };
            format!("\x1b[1;{color}m{tag}\x1b[0m: {}\n", diag.message)
        } else {
            format!("{tag}: {}\n", diag.message)
        }
    }
}

impl DiagnosticRenderer for TerminalRenderer {
    fn render(&self, diag: &Diagnostic, source_db: &SourceDb) -> String {
        let mut out = self.header(diag);

        if let Some(file) = located(diag.primary_span, source_db) {
            let resolved = source_db.resolve_span(diag.primary_span);
            out.push_str(&format!("  --> {resolved}\n"));

            let (line, col) = file.line_col(diag.primary_span.start);
            let line_num = line.to_string();
            let padding = " ".repeat(line_num.len());
            let line_content = file.line_text(diag.primary_span.start);

            out.push_str(&format!("{padding} |\n"));
            out.push_str(&format!("{line_num} | {line_content}\n"));

            let line_rest = line_content.len().saturating_sub(col as usize - 1).max(1);
            let span_len = (diag.primary_span.len() as usize).clamp(1, line_rest);
            let carets = "^".repeat(span_len);
            let col_padding = " ".repeat((col as usize).saturating_sub(1));
            let primary_msg = diag
                .labels
                .iter()
                .find(|l| l.style == LabelStyle::Primary)
                .map(|l| format!(" {}", l.message))
                .unwrap_or_default();
            out.push_str(&format!("{padding} | {col_padding}{carets}{primary_msg}\n"));
        }

        for span in &diag.additional_spans {
            if located(*span, source_db).is_some() {
                out.push_str(&format!("  ::: {}\n", source_db.resolve_span(*span)));
            }
        }

        for label in diag.labels.iter().filter(|l| l.style == LabelStyle::Secondary) {
            if located(label.span, source_db).is_some() {
                let resolved = source_db.resolve_span(label.span);
                out.push_str(&format!("  ::: {resolved}: {}\n", label.message));
            }
        }

        for note in &diag.notes {
            out.push_str(&format!("   = note: {note}\n"));
        }
        for help in &diag.help {
            out.push_str(&format!("   = help: {help}\n"));
        }
        if let Some(uri) = &diag.help_uri {
            out.push_str(&format!("   = see: {uri}\n"));
        }

        out
    }
}

/// Renders each diagnostic as a single-line JSON object.
///
/// The object carries the rule id, severity, message, resolved primary and
/// additional locations, the property bag, and the help link, so that
/// editors and CI tooling can consume it without the source database.
pub struct JsonRenderer;

impl DiagnosticRenderer for JsonRenderer {
    fn render(&self, diag: &Diagnostic, source_db: &SourceDb) -> String {
        let location = |span: Span| {
            located(span, source_db).map(|_| source_db.resolve_span(span))
        };
        let additional: Vec<_> = diag
            .additional_spans
            .iter()
            .filter_map(|s| location(*s))
            .collect();
        let value = serde_json::json!({
            "id": diag.code.to_string(),
            "severity": diag.severity.to_string(),
            "message": diag.message,
            "location": location(diag.primary_span),
            "additionalLocations": additional,
            "properties": diag.properties,
            "notes": diag.notes,
            "help": diag.help,
            "helpUri": diag.help_uri,
        });
        value.to_string()
    }
}

fn located(span: Span, source_db: &SourceDb) -> Option<&vssdk_source::SourceFile> {
    if span.is_dummy() {
        return None;
    }
    source_db.try_get_file(span.file)
}
