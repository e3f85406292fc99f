//! `ThreadHelper.JoinableTaskFactory.RunAsync` calls whose task nobody joins.

use vssdk_semantic::{Compilation, SemanticModel, SymbolId};
use vssdk_syntax::{NodeRef, SyntaxKind};

use crate::ancestor::{enclosing_block, strip_wrappers, Boundary, ScanScope};
use crate::matcher::matches_member;
use crate::null_guard::refers_to;
use crate::well_known::WellKnownType;

/// What happens to the task a `RunAsync` call returns.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RunAsyncUse {
    /// The call is the operand of `await`.
    Awaited,
    /// The call is immediately followed by `.Join()` or an awaited `.JoinAsync()`.
    Joined,
    /// The call is an expression statement or assigned to `_`.
    Discarded,
    /// Stored in a variable that is later awaited, joined or handed off.
    Tracked,
    /// Stored in a variable that nothing in the block awaits or joins.
    Untracked,
    /// Returned, passed as an argument or used as a lambda body.
    Escapes,
}

impl RunAsyncUse {
    /// Returns `true` for uses that leave the task unobserved.
    pub fn is_fire_and_forget(self) -> bool {
        matches!(self, RunAsyncUse::Discarded | RunAsyncUse::Untracked)
    }
}

/// An unobserved `RunAsync` call.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct FireAndForgetFinding<'a> {
    /// The invocation.
    pub invocation: NodeRef<'a>,
    /// The `RunAsync` name, where the finding is reported.
    pub name: NodeRef<'a>,
    /// How the task is dropped.
    pub usage: RunAsyncUse,
}

const CONSUMER_KINDS: &[SyntaxKind] = &[
    SyntaxKind::AwaitExpression,
    SyntaxKind::MemberAccessExpression,
    SyntaxKind::ExpressionStatement,
    SyntaxKind::EqualsValueClause,
    SyntaxKind::AssignmentExpression,
];

/// Returns `true` if `invocation` is `JoinableTaskFactory.RunAsync` on the
/// `ThreadHelper.JoinableTaskFactory` singleton.
pub fn is_factory_run_async(model: &SemanticModel<'_>, invocation: NodeRef<'_>) -> bool {
    let c = model.compilation();
    if invocation.kind() != SyntaxKind::InvocationExpression {
        return false;
    }
    let Some(access) = invocation
        .expression()
        .filter(|e| e.kind() == SyntaxKind::MemberAccessExpression)
    else {
        return false;
    };
    matches_member(
        c,
        model.symbol_info(invocation),
        &WellKnownType::JoinableTaskFactory.member("RunAsync"),
    ) && access.expression().is_some_and(|receiver| {
        matches_member(
            c,
            model.symbol_info(receiver),
            &WellKnownType::ThreadHelper.member("JoinableTaskFactory"),
        )
    })
}

/// Classifies what happens to the task returned by `invocation`. Returns
/// `None` when the call is not a factory `RunAsync`.
pub fn classify_run_async(model: &SemanticModel<'_>, invocation: NodeRef<'_>) -> Option<RunAsyncUse> {
    if !is_factory_run_async(model, invocation) {
        return None;
    }
    Some(task_use(model, invocation))
}

/// Follows the task produced by `task` to the expression that consumes it.
fn task_use(model: &SemanticModel<'_>, task: NodeRef<'_>) -> RunAsyncUse {
    let consumer = ScanScope::new(task, Boundary::TransparentWrappers).find_ancestor(
        CONSUMER_KINDS,
        |node, previous| match node.kind() {
            SyntaxKind::EqualsValueClause => true,
            SyntaxKind::AssignmentExpression => {
                node.right() == Some(previous) && node.operator_kind() == Some(SyntaxKind::Equals)
            }
            _ => node.expression() == Some(previous),
        },
    );
    let Some(consumer) = consumer else {
        return RunAsyncUse::Escapes;
    };
    match consumer.kind() {
        SyntaxKind::AwaitExpression => RunAsyncUse::Awaited,
        SyntaxKind::MemberAccessExpression => {
            let call = consumer.parent().filter(|p| {
                p.kind() == SyntaxKind::InvocationExpression && p.expression() == Some(consumer)
            });
            match (consumer.name().map(|n| n.identifier_text()), call) {
                (Some("Join"), Some(_)) => RunAsyncUse::Joined,
                // JoinAsync starts another task; only its own consumer observes the first.
                (Some("JoinAsync"), Some(call)) => match task_use(model, call) {
                    RunAsyncUse::Awaited => RunAsyncUse::Joined,
                    other => other,
                },
                _ => RunAsyncUse::Escapes,
            }
        }
        SyntaxKind::ExpressionStatement => RunAsyncUse::Discarded,
        SyntaxKind::EqualsValueClause => {
            let declarator = consumer
                .parent()
                .filter(|d| d.kind() == SyntaxKind::VariableDeclarator);
            match declarator.and_then(|d| model.declared_symbol(d).map(|s| (d, s))) {
                Some((declarator, symbol)) => stored(model, declarator, symbol),
                None => RunAsyncUse::Escapes,
            }
        }
        _ => {
            let Some(left) = consumer.left() else {
                return RunAsyncUse::Escapes;
            };
            match model.symbol_info(left) {
                Some(symbol) => stored(model, consumer, symbol),
                None if is_discard(left) => discarded_assignment(consumer),
                None => RunAsyncUse::Escapes,
            }
        }
    }
}

fn is_discard(node: NodeRef<'_>) -> bool {
    node.kind() == SyntaxKind::IdentifierName && node.identifier_text() == "_"
}

fn discarded_assignment(assignment: NodeRef<'_>) -> RunAsyncUse {
    match assignment.parent() {
        Some(p) if p.kind() == SyntaxKind::ExpressionStatement => RunAsyncUse::Discarded,
        _ => RunAsyncUse::Escapes,
    }
}

fn stored(model: &SemanticModel<'_>, site: NodeRef<'_>, symbol: SymbolId) -> RunAsyncUse {
    let Some(block) = enclosing_block(site) else {
        return RunAsyncUse::Escapes;
    };
    if has_tracking_evidence(model, block, symbol, true) {
        RunAsyncUse::Tracked
    } else {
        RunAsyncUse::Untracked
    }
}

/// Looks in `scope` for `await v`, `v.Join()`, `await v.JoinAsync()` or
/// `await v.Task`. With `follow_handoff`, `v` passed to a method declared
/// in the compilation counts when that method tracks its parameter.
fn has_tracking_evidence(
    model: &SemanticModel<'_>,
    scope: NodeRef<'_>,
    symbol: SymbolId,
    follow_handoff: bool,
) -> bool {
    scope.descendants().any(|node| match node.kind() {
        SyntaxKind::AwaitExpression => node
            .expression()
            .map(strip_wrappers)
            .is_some_and(|awaited| {
                refers_to(model, awaited, symbol)
                    || is_member_of(model, awaited, symbol, "Task")
                    || awaited
                        .expression()
                        .filter(|_| awaited.kind() == SyntaxKind::InvocationExpression)
                        .is_some_and(|callee| is_member_of(model, callee, symbol, "JoinAsync"))
            }),
        SyntaxKind::InvocationExpression => {
            node.expression()
                .is_some_and(|callee| is_member_of(model, callee, symbol, "Join"))
                || (follow_handoff && hands_off(model, node, symbol))
        }
        _ => false,
    })
}

/// `v.name` where `v` is `symbol`.
fn is_member_of(model: &SemanticModel<'_>, node: NodeRef<'_>, symbol: SymbolId, name: &str) -> bool {
    node.kind() == SyntaxKind::MemberAccessExpression
        && node.name().is_some_and(|n| n.identifier_text() == name)
        && node
            .expression()
            .is_some_and(|receiver| refers_to(model, strip_wrappers(receiver), symbol))
}

/// `symbol` passed to a compilation method whose matching parameter is
/// awaited or joined in that method's body.
fn hands_off(model: &SemanticModel<'_>, invocation: NodeRef<'_>, symbol: SymbolId) -> bool {
    let c = model.compilation();
    let Some(method) = model
        .symbol_info(invocation)
        .filter(|&m| c.symbol(m).is_method())
    else {
        return false;
    };
    invocation.arguments().enumerate().any(|(index, argument)| {
        let passes = argument
            .expression()
            .is_some_and(|e| refers_to(model, strip_wrappers(e), symbol));
        passes
            && parameter_for(c, method, argument, index)
                .is_some_and(|parameter| parameter_is_tracked(c, method, parameter))
    })
}

fn parameter_for(
    c: &Compilation,
    method: SymbolId,
    argument: NodeRef<'_>,
    index: usize,
) -> Option<SymbolId> {
    let parameters = &c.symbol(method).parameters;
    match argument.child_node(SyntaxKind::NameColon).and_then(|nc| nc.name()) {
        Some(name) => parameters
            .iter()
            .copied()
            .find(|&p| c.name(p) == name.identifier_text()),
        None => parameters.get(index).copied(),
    }
}

fn parameter_is_tracked(c: &Compilation, method: SymbolId, parameter: SymbolId) -> bool {
    c.declaring_nodes(method).any(|declaration| {
        c.semantic_model(declaration.tree().file())
            .is_some_and(|callee| has_tracking_evidence(&callee, declaration, parameter, false))
    })
}

/// Scans one invocation. Returns a finding when it is a factory `RunAsync`
/// whose task is dropped.
pub fn scan_run_async<'c>(
    model: &SemanticModel<'c>,
    invocation: NodeRef<'c>,
) -> Option<FireAndForgetFinding<'c>> {
    let usage = classify_run_async(model, invocation)?;
    if !usage.is_fire_and_forget() {
        return None;
    }
    let name = invocation.expression().and_then(|access| access.name())?;
    Some(FireAndForgetFinding {
        invocation,
        name,
        usage,
    })
}
