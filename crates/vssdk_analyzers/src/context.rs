//! Per-tree state handed to a running rule.

use std::cell::{Cell, RefCell};

use vssdk_common::CancellationToken;
use vssdk_diagnostics::{Diagnostic, DiagnosticCode, Severity};
use vssdk_semantic::{Compilation, SemanticModel};
use vssdk_source::Span;
use vssdk_syntax::{NodeId, NodeRef, SyntaxKind, SyntaxTree};

use crate::thread_affinity::ThreadAffinityTables;

/// Documentation link for a rule id.
pub fn help_uri(code: DiagnosticCode) -> String {
    format!("https://github.com/Microsoft/VSSDK-Analyzers/blob/main/doc/{code}.md")
}

/// What a [`TreeAnalyzer`](crate::TreeAnalyzer) sees while analyzing one tree.
///
/// The context records the node the rule is visiting, so a failure can be
/// reported with its location, and collects the rule's diagnostics.
pub struct TreeContext<'a> {
    model: SemanticModel<'a>,
    tables: &'a ThreadAffinityTables,
    cancel: &'a CancellationToken,
    code: DiagnosticCode,
    severity: Severity,
    reports: RefCell<Vec<Diagnostic>>,
    current: Cell<Option<NodeId>>,
}

impl<'a> TreeContext<'a> {
    /// Creates a context for one rule over the tree of `model`.
    pub fn new(
        model: SemanticModel<'a>,
        tables: &'a ThreadAffinityTables,
        cancel: &'a CancellationToken,
        code: DiagnosticCode,
        severity: Severity,
    ) -> Self {
        Self {
            model,
            tables,
            cancel,
            code,
            severity,
            reports: RefCell::new(Vec::new()),
            current: Cell::new(None),
        }
    }

    /// The compilation under analysis.
    pub fn compilation(&self) -> &'a Compilation {
        self.model.compilation()
    }

    /// The binder for this tree.
    pub fn model(&self) -> &SemanticModel<'a> {
        &self.model
    }

    /// The tree under analysis.
    pub fn tree(&self) -> &'a SyntaxTree {
        self.model.tree()
    }

    /// The session's thread-affinity tables.
    pub fn tables(&self) -> &'a ThreadAffinityTables {
        self.tables
    }

    /// Every node of the tree in pre-order. Each node becomes the current
    /// node as it is yielded. Iteration ends early on cancellation.
    pub fn nodes(&self) -> impl Iterator<Item = NodeRef<'a>> + '_ {
        self.tree()
            .nodes()
            .take_while(move |_| !self.cancel.is_cancelled())
            .inspect(move |node| self.current.set(Some(node.id())))
    }

    /// [`nodes`](Self::nodes) restricted to the given kinds.
    pub fn nodes_of<'k>(
        &'k self,
        kinds: &'k [SyntaxKind],
    ) -> impl Iterator<Item = NodeRef<'a>> + 'k {
        self.nodes().filter(move |n| kinds.contains(&n.kind()))
    }

    /// Marks `node` as the node being visited.
    pub fn enter(&self, node: NodeRef<'_>) {
        self.current.set(Some(node.id()));
    }

    /// The node most recently visited.
    pub fn current_node(&self) -> Option<NodeId> {
        self.current.get()
    }

    /// Returns `true` once the session has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// A diagnostic for this rule with its effective severity and help link.
    pub fn diagnostic(&self, message: impl Into<String>, span: Span) -> Diagnostic {
        Diagnostic::new(self.severity, self.code, message, span).with_help_uri(help_uri(self.code))
    }

    /// Records a diagnostic.
    pub fn report(&self, diag: Diagnostic) {
        self.reports.borrow_mut().push(diag);
    }

    /// Number of diagnostics recorded so far.
    pub fn report_count(&self) -> usize {
        self.reports.borrow().len()
    }

    /// Consumes the context, returning the recorded diagnostics.
    pub fn into_reports(self) -> Vec<Diagnostic> {
        self.reports.into_inner()
    }
}
