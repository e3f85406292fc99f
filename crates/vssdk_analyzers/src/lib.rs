//! Analyzers for Visual Studio extension code.
//!
//! This crate holds the analyzer engine, the scanners the rules share, and
//! the VSSDK rule catalog. Rules run over a [`Compilation`] and report
//! [`Diagnostic`](vssdk_diagnostics::Diagnostic)s with ids `VSSDK001` to
//! `VSSDK008`.
//!
//! # Rules
//!
//! - **Package base class:** VSSDK001 (derive from `AsyncPackage`),
//!   VSSDK002 (registration matches base), VSSDK003 (async tool windows),
//!   VSSDK004 (background auto-load)
//! - **Threading:** VSSDK005 (`JoinableTaskContext` singleton), VSSDK007
//!   (untracked `RunAsync`), VSSDK008 (UI thread in MEF construction)
//! - **Services:** VSSDK006 (check services exist)
//!
//! # Shared scanners
//!
//! - [`matcher`]: namespace-qualified symbol matching
//! - [`hierarchy`]: base-class and interface walks
//! - [`ancestor`]: bounded upward tree search
//! - [`null_guard`]: null-check dataflow after service lookups
//! - [`fire_and_forget`]: reachability of `RunAsync` tasks
//! - [`thread_affinity`]: the main-thread classification tables

#![warn(missing_docs)]

pub mod ancestor;
mod context;
mod engine;
mod error;
pub mod fire_and_forget;
pub mod hierarchy;
pub mod matcher;
pub mod null_guard;
mod rules;
pub mod thread_affinity;
pub mod well_known;

#[cfg(test)]
mod test_support;

pub use context::{help_uri, TreeContext};
pub use engine::{AnalyzerEngine, FailureHook};
pub use error::{AnalysisError, FailureLocation};
pub use rules::{has_background_load_flag, register_builtin_rules};
pub use rules::{
    AsyncToolWindow, BackgroundLoadFlag, CheckServicesExist, DeriveFromAsyncPackage,
    JoinableTaskContextSingleton, NoUiThreadInMefConstruction, RegistrationMatchesBase,
    UntrackedRunAsync,
};

/// Diagnostic property keys and values read by code fixes.
pub mod properties {
    pub use crate::rules::{
        ALLOWS_BACKGROUND_LOADING, BASE_TYPE_PROPERTY, DIRECT_DEREFERENCE, TARGET_PROPERTY,
        VARIABLE_PROPERTY,
    };

    /// Property naming the class a VSSDK001 diagnostic was reported on.
    pub const TYPE_NAME_PROPERTY: &str = "TypeName";
}

use vssdk_common::VssdkResult;
use vssdk_diagnostics::{DiagnosticCode, Severity};
use vssdk_semantic::Compilation;

/// A single analyzer rule.
///
/// Each rule has a unique diagnostic code, a human-readable name, a
/// description and a default severity. At the start of a session the engine
/// asks the rule for a [`TreeAnalyzer`]; a rule whose framework types are
/// missing from the compilation declines and does not run.
pub trait AnalyzerRule: Send + Sync {
    /// Returns the diagnostic code for this rule (e.g., VSSDK006).
    fn code(&self) -> DiagnosticCode;

    /// Returns the short kebab-case name of this rule.
    fn name(&self) -> &str;

    /// Returns a human-readable description of what this rule checks.
    fn description(&self) -> &str;

    /// Returns the default severity for diagnostics emitted by this rule.
    fn default_severity(&self) -> Severity;

    /// Resolves what the rule needs from `compilation`. Returns `None` when
    /// the rule cannot apply.
    fn on_compilation_start(&self, compilation: &Compilation) -> Option<Box<dyn TreeAnalyzer>>;
}

/// The per-session half of a rule, run once for every syntax tree.
///
/// Analyzers only read shared state; several trees are analyzed in parallel.
pub trait TreeAnalyzer: Send + Sync {
    /// Analyzes one tree and reports through `ctx`.
    fn analyze_tree(&self, ctx: &TreeContext<'_>) -> VssdkResult<()>;
}
