//! Code fixes for VSSDK diagnostics.
//!
//! A [`CodeFixProvider`] inspects one diagnostic and, when its preconditions
//! hold, describes the fix as a [`PreparedFix`]: the nodes it needs to find
//! again, and the [`FixEdit`]s that rewrite them. The [`FixDriver`] applies
//! prepared fixes, one at a time or for every diagnostic of a rule in a
//! document.
//!
//! Fixes are two-phase. Preparation reads the original tree and the
//! compilation; nothing is rewritten yet. Application annotates the tracked
//! nodes, then runs the edits in order, each one locating its target by
//! annotation in the tree produced by the edit before it.
//!
//! # Fixes
//!
//! - VSSDK001: derive from `AsyncPackage` and convert `Initialize`
//! - VSSDK002: set or remove `AllowsBackgroundLoading`
//! - VSSDK004: add `PackageAutoLoadFlags.BackgroundLoad`
//! - VSSDK005: use `ThreadHelper.JoinableTaskContext`
//! - VSSDK006: insert `Assumes.Present(...)` after the lookup

#![warn(missing_docs)]

mod driver;
mod error;
mod providers;
pub mod rewrite;

#[cfg(test)]
mod test_support;

pub use driver::{FixDriver, FixedDocument};
pub use error::FixError;
pub use providers::{
    builtin_providers, AssumePresentFix, AsyncPackageFix, BackgroundLoadFlagFix,
    JoinableTaskContextFix, RegistrationFix,
};
pub use rewrite::{FixEdit, InitializeConversion, UsingSpec};

use vssdk_common::CancellationToken;
use vssdk_diagnostics::{Diagnostic, DiagnosticCode};
use vssdk_semantic::{Compilation, SemanticModel};
use vssdk_source::{FileId, Span};
use vssdk_syntax::{Annotation, NodeId, NodeRef, SyntaxTree};

/// What a provider sees while preparing a fix.
pub struct FixContext<'a> {
    compilation: &'a Compilation,
    cancel: &'a CancellationToken,
}

impl<'a> FixContext<'a> {
    /// Creates a context over `compilation`.
    pub fn new(compilation: &'a Compilation, cancel: &'a CancellationToken) -> Self {
        FixContext {
            compilation,
            cancel,
        }
    }

    /// The compilation the diagnostic was reported against.
    pub fn compilation(&self) -> &'a Compilation {
        self.compilation
    }

    /// The cancellation token of the request.
    pub fn cancel(&self) -> &'a CancellationToken {
        self.cancel
    }

    /// The syntax tree of `file`.
    pub fn tree(&self, file: FileId) -> Result<&'a SyntaxTree, FixError> {
        self.compilation
            .tree(file)
            .ok_or(FixError::UnknownFile(file))
    }

    /// The semantic model of `file`.
    pub fn model(&self, file: FileId) -> Result<SemanticModel<'a>, FixError> {
        self.compilation
            .semantic_model(file)
            .ok_or(FixError::UnknownFile(file))
    }

    /// The innermost node whose span is exactly `span`.
    pub fn node_at(&self, span: Span) -> Result<Option<NodeRef<'a>>, FixError> {
        let tree = self.tree(span.file)?;
        Ok(tree
            .covering_node(span)
            .ancestors_and_self()
            .find(|n| n.span() == span))
    }
}

/// A fix offered for one diagnostic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodeAction {
    /// The text shown to the user.
    pub title: String,
    /// Actions with the same key fix the same kind of problem and can be
    /// applied together.
    pub equivalence_key: String,
    /// The diagnostic the action fixes.
    pub diagnostic: Diagnostic,
}

/// A fix described against the original tree of a file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreparedFix {
    file: FileId,
    tracked: Vec<(NodeId, Annotation)>,
    edits: Vec<FixEdit>,
}

impl PreparedFix {
    /// Starts an empty fix for `file`.
    pub fn new(file: FileId) -> Self {
        PreparedFix {
            file,
            tracked: Vec::new(),
            edits: Vec::new(),
        }
    }

    /// The file the fix rewrites.
    pub fn file(&self) -> FileId {
        self.file
    }

    /// Returns the annotation that identifies `node` once the fix is
    /// applied. Tracking the same node twice returns the same annotation.
    pub fn track(&mut self, node: NodeRef<'_>) -> Annotation {
        if let Some((_, ann)) = self.tracked.iter().find(|(id, _)| *id == node.id()) {
            return *ann;
        }
        let ann = Annotation::fresh();
        self.tracked.push((node.id(), ann));
        ann
    }

    /// Appends an edit. Edits run in the order they were pushed.
    pub fn push(&mut self, edit: FixEdit) {
        self.edits.push(edit);
    }

    /// The nodes to annotate before the first edit.
    pub fn tracked(&self) -> &[(NodeId, Annotation)] {
        &self.tracked
    }

    /// The edits, in order.
    pub fn edits(&self) -> &[FixEdit] {
        &self.edits
    }
}

/// Offers and prepares fixes for the diagnostics of one rule.
pub trait CodeFixProvider: Send + Sync {
    /// The rule whose diagnostics this provider fixes.
    fn fixable_code(&self) -> DiagnosticCode;

    /// The title of the action offered for `diagnostic`.
    fn title(&self, diagnostic: &Diagnostic) -> String;

    /// Describes the fix for `diagnostic`, or returns `Ok(None)` when the
    /// code no longer has the shape the fix expects.
    fn prepare(
        &self,
        ctx: &FixContext<'_>,
        diagnostic: &Diagnostic,
    ) -> Result<Option<PreparedFix>, FixError>;

    /// The actions to offer for `diagnostic`: one when the fix applies,
    /// none otherwise.
    fn register(&self, ctx: &FixContext<'_>, diagnostic: &Diagnostic) -> Vec<CodeAction> {
        match self.prepare(ctx, diagnostic) {
            Ok(Some(_)) => vec![CodeAction {
                title: self.title(diagnostic),
                equivalence_key: diagnostic.code.to_string(),
                diagnostic: diagnostic.clone(),
            }],
            Ok(None) => Vec::new(),
            Err(err) => {
                tracing::debug!(code = %diagnostic.code, %err, "code fix not offered");
                Vec::new()
            }
        }
    }
}
