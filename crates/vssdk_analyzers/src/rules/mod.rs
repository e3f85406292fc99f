//! All built-in analyzer rule implementations.
//!
//! This module re-exports the individual rule types and provides
//! `register_builtin_rules` to add all 8 rules to an `AnalyzerEngine`.

mod vssdk001;
mod vssdk002;
mod vssdk003;
mod vssdk004;
mod vssdk005;
mod vssdk006;
mod vssdk007;
mod vssdk008;

pub use vssdk001::DeriveFromAsyncPackage;
pub use vssdk002::{RegistrationMatchesBase, ALLOWS_BACKGROUND_LOADING, BASE_TYPE_PROPERTY};
pub use vssdk003::AsyncToolWindow;
pub use vssdk004::{has_background_load_flag, BackgroundLoadFlag};
pub use vssdk005::JoinableTaskContextSingleton;
pub use vssdk006::{CheckServicesExist, DIRECT_DEREFERENCE, TARGET_PROPERTY, VARIABLE_PROPERTY};
pub use vssdk007::UntrackedRunAsync;
pub use vssdk008::NoUiThreadInMefConstruction;

use vssdk_semantic::{SemanticModel, SymbolId};
use vssdk_syntax::{NodeRef, SyntaxKind};

use crate::engine::AnalyzerEngine;

/// Registers all 8 built-in rules with the engine, in id order.
pub fn register_builtin_rules(engine: &mut AnalyzerEngine) {
    engine.register(Box::new(DeriveFromAsyncPackage));
    engine.register(Box::new(RegistrationMatchesBase));
    engine.register(Box::new(AsyncToolWindow));
    engine.register(Box::new(BackgroundLoadFlag));
    engine.register(Box::new(JoinableTaskContextSingleton));
    engine.register(Box::new(CheckServicesExist));
    engine.register(Box::new(UntrackedRunAsync));
    engine.register(Box::new(NoUiThreadInMefConstruction));
}

/// Attributes on `declaration` that bind to `class`.
fn attributes_of<'a>(
    model: &'a SemanticModel<'_>,
    declaration: NodeRef<'a>,
    class: SymbolId,
) -> impl Iterator<Item = NodeRef<'a>> + 'a {
    declaration
        .attributes()
        .filter(move |a| model.attribute_class(*a) == Some(class))
}

/// The named argument `name = value` of an attribute.
fn named_argument<'a>(attribute: NodeRef<'a>, name: &str) -> Option<NodeRef<'a>> {
    attribute.arguments().find(|argument| {
        argument
            .child_node(SyntaxKind::NameEquals)
            .and_then(|ne| ne.name())
            .is_some_and(|n| n.identifier_text() == name)
    })
}

/// `true` or `false` literal value.
fn bool_literal(expr: NodeRef<'_>) -> Option<bool> {
    if expr.kind() != SyntaxKind::LiteralExpression {
        return None;
    }
    match expr.child_tokens().next()?.kind() {
        SyntaxKind::TrueKeyword => Some(true),
        SyntaxKind::FalseKeyword => Some(false),
        _ => None,
    }
}
