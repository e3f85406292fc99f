//! Diagnostic creation, severity management, and rendering.
//!
//! This crate provides structured [`Diagnostic`] values carrying a rule code,
//! severity, primary and additional locations, and a string property bag
//! that code fixes read back. The thread-safe [`DiagnosticSink`] accumulates
//! diagnostics during parsing and analysis, and [`DiagnosticRenderer`]
//! implementations format them for terminals or JSON consumers.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod label;
pub mod renderer;
pub mod severity;
pub mod sink;

pub use code::{Category, DiagnosticCode, ParseCodeError};
pub use diagnostic::Diagnostic;
pub use label::{Label, LabelStyle};
pub use renderer::{DiagnosticRenderer, JsonRenderer, TerminalRenderer};
pub use severity::Severity;
pub use sink::DiagnosticSink;
