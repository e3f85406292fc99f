//! Upward tree search bounded by a caller-supplied predicate.
//!
//! Most detectors start at an interesting node (a service lookup, a factory
//! call) and ask "what consumes this": an assignment, a declarator, an
//! `await`, a member access. [`find_ancestor`] is the single traversal they
//! share. It hands the matcher the child it came from, so callers can tell
//! the left side of an assignment from its right side.

use vssdk_syntax::{NodeRef, SyntaxKind};

/// Walks up from `start`'s parent. At each node whose kind is in `kinds`,
/// `is_match(node, previous_child)` decides whether to return it. Otherwise
/// the walk continues while `continue_ascending(node)` holds.
pub fn find_ancestor<'a>(
    start: NodeRef<'a>,
    kinds: &[SyntaxKind],
    mut continue_ascending: impl FnMut(NodeRef<'a>) -> bool,
    mut is_match: impl FnMut(NodeRef<'a>, NodeRef<'a>) -> bool,
) -> Option<NodeRef<'a>> {
    let mut previous = start;
    let mut current = start.parent();
    while let Some(node) = current {
        if kinds.contains(&node.kind()) && is_match(node, previous) {
            return Some(node);
        }
        if !continue_ascending(node) {
            return None;
        }
        previous = node;
        current = node.parent();
    }
    None
}

/// How far a scan may travel.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Boundary {
    /// Only through parentheses, casts, `as`, `await` and `!`.
    TransparentWrappers,
    /// Anywhere inside the enclosing expression, stopping at statements,
    /// declarators and lambdas.
    Expression,
    /// Up to the nearest enclosing block.
    Block,
}

impl Boundary {
    /// Returns `true` if a scan bounded by `self` may ascend past `node`.
    pub fn allows(self, node: NodeRef<'_>) -> bool {
        match self {
            Boundary::TransparentWrappers => through_transparent_wrappers(node),
            Boundary::Expression => within_expression(node),
            Boundary::Block => node.kind() != SyntaxKind::Block,
        }
    }
}

/// A start node plus the boundary of a single query.
#[derive(Clone, Copy, Debug)]
pub struct ScanScope<'a> {
    /// Where the scan starts.
    pub root: NodeRef<'a>,
    /// Where the scan stops.
    pub boundary: Boundary,
}

impl<'a> ScanScope<'a> {
    /// Creates a scope.
    pub fn new(root: NodeRef<'a>, boundary: Boundary) -> Self {
        Self { root, boundary }
    }

    /// [`find_ancestor`] from `root`, ascending while the boundary allows.
    pub fn find_ancestor(
        &self,
        kinds: &[SyntaxKind],
        is_match: impl FnMut(NodeRef<'a>, NodeRef<'a>) -> bool,
    ) -> Option<NodeRef<'a>> {
        let boundary = self.boundary;
        find_ancestor(self.root, kinds, |n| boundary.allows(n), is_match)
    }
}

/// Boundary predicate that only ascends through expressions which pass
/// their operand's value through unchanged.
pub fn through_transparent_wrappers(node: NodeRef<'_>) -> bool {
    is_transparent_wrapper(node)
}

/// Boundary predicate that ascends through any expression-level node.
pub fn within_expression(node: NodeRef<'_>) -> bool {
    let kind = node.kind();
    !(kind.is_statement()
        || kind.is_anonymous_function()
        || kind.is_type_declaration()
        || matches!(
            kind,
            SyntaxKind::Block
                | SyntaxKind::VariableDeclarator
                | SyntaxKind::VariableDeclaration
                | SyntaxKind::EqualsValueClause
                | SyntaxKind::ArrowExpressionClause
                | SyntaxKind::FieldDeclaration
                | SyntaxKind::PropertyDeclaration
                | SyntaxKind::MethodDeclaration
                | SyntaxKind::ConstructorDeclaration
                | SyntaxKind::AccessorDeclaration
                | SyntaxKind::CompilationUnit
        ))
}

/// Returns `true` for `(e)`, `(T)e`, `e as T`, `await e` and `e!`.
pub fn is_transparent_wrapper(node: NodeRef<'_>) -> bool {
    match node.kind() {
        SyntaxKind::ParenthesizedExpression
        | SyntaxKind::CastExpression
        | SyntaxKind::AwaitExpression => true,
        SyntaxKind::BinaryExpression => node.token(SyntaxKind::AsKeyword).is_some(),
        SyntaxKind::PostfixUnaryExpression => {
            node.operator_kind() == Some(SyntaxKind::Exclamation)
        }
        _ => false,
    }
}

/// The operand a transparent wrapper passes through.
fn wrapped_operand<'a>(wrapper: NodeRef<'a>) -> Option<NodeRef<'a>> {
    match wrapper.kind() {
        SyntaxKind::BinaryExpression | SyntaxKind::PostfixUnaryExpression => {
            wrapper.nth_child_node(0)
        }
        _ => wrapper.expression(),
    }
}

/// The outermost chain of transparent wrappers around `expr`, or `expr`
/// itself. Only follows the operand position, so the type of an `as` is
/// never mistaken for its value.
pub fn outermost_wrapper(expr: NodeRef<'_>) -> NodeRef<'_> {
    let mut current = expr;
    while let Some(parent) = current.parent() {
        if is_transparent_wrapper(parent) && wrapped_operand(parent) == Some(current) {
            current = parent;
        } else {
            break;
        }
    }
    current
}

/// Strips transparent wrappers from `expr`, innermost value last.
pub fn strip_wrappers(expr: NodeRef<'_>) -> NodeRef<'_> {
    let mut current = expr;
    while is_transparent_wrapper(current) {
        match wrapped_operand(current) {
            Some(inner) => current = inner,
            None => break,
        }
    }
    current
}

/// The nearest enclosing block of `node`.
pub fn enclosing_block(node: NodeRef<'_>) -> Option<NodeRef<'_>> {
    node.ancestors().find(|a| a.kind() == SyntaxKind::Block)
}

/// The statement directly containing `node`.
pub fn enclosing_statement(node: NodeRef<'_>) -> Option<NodeRef<'_>> {
    node.ancestors_and_self().find(|a| a.kind().is_statement())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::find;
    use vssdk_diagnostics::DiagnosticSink;
    use vssdk_source::FileId;
    use vssdk_syntax::{parse_text, SyntaxTree};

    fn parse(source: &str) -> SyntaxTree {
        let sink = DiagnosticSink::new();
        let tree = parse_text(FileId::from_raw(0), source, &sink);
        assert!(!sink.has_errors());
        tree
    }

    const SOURCE: &str = "class C\n\
        {\n\
            void M()\n\
            {\n\
                x = (IFoo)(await GetServiceAsync(typeof(IFoo)))!;\n\
                var y = GetService(null) as IFoo;\n\
            }\n\
        }";

    #[test]
    fn previous_child_distinguishes_sides() {
        let tree = parse(SOURCE);
        let call = find(&tree, SyntaxKind::InvocationExpression, "GetServiceAsync(typeof(IFoo))");
        let assignment = find_ancestor(
            call,
            &[SyntaxKind::AssignmentExpression],
            through_transparent_wrappers,
            |node, previous| node.right() == Some(previous),
        );
        assert_eq!(assignment.map(|a| a.kind()), Some(SyntaxKind::AssignmentExpression));

        let target = find(&tree, SyntaxKind::IdentifierName, "x");
        let as_left = find_ancestor(
            target,
            &[SyntaxKind::AssignmentExpression],
            |_| true,
            |node, previous| node.right() == Some(previous),
        );
        assert!(as_left.is_none());
    }

    #[test]
    fn boundary_stops_the_walk() {
        let tree = parse(SOURCE);
        let call = find(&tree, SyntaxKind::InvocationExpression, "GetService(null)");
        let declarator = ScanScope::new(call, Boundary::TransparentWrappers)
            .find_ancestor(&[SyntaxKind::VariableDeclarator], |_, _| true);
        assert!(declarator.is_none());

        let through_clause = find_ancestor(
            call,
            &[SyntaxKind::VariableDeclarator],
            |n| through_transparent_wrappers(n) || n.kind() == SyntaxKind::EqualsValueClause,
            |_, _| true,
        );
        assert_eq!(through_clause.map(|d| d.identifier_text()), Some("y"));

        let method = ScanScope::new(call, Boundary::Block)
            .find_ancestor(&[SyntaxKind::MethodDeclaration], |_, _| true);
        assert!(method.is_none());
        let block = ScanScope::new(call, Boundary::Expression)
            .find_ancestor(&[SyntaxKind::BinaryExpression], |_, _| true);
        assert!(block.is_some());
    }

    #[test]
    fn wrappers_follow_operand_position_only() {
        let tree = parse(SOURCE);
        let call = find(&tree, SyntaxKind::InvocationExpression, "GetServiceAsync(typeof(IFoo))");
        let outer = outermost_wrapper(call);
        assert_eq!(outer.text(), "(IFoo)(await GetServiceAsync(typeof(IFoo)))!");
        assert_eq!(strip_wrappers(outer), call);

        let ty = find(&tree, SyntaxKind::IdentifierName, "IFoo");
        let as_type = tree
            .nodes()
            .filter(|n| n.kind() == SyntaxKind::IdentifierName && n.text() == "IFoo")
            .last()
            .unwrap();
        assert_eq!(outermost_wrapper(as_type), as_type);
        assert_eq!(outermost_wrapper(ty).kind(), SyntaxKind::IdentifierName);
    }

    #[test]
    fn enclosing_helpers() {
        let tree = parse(SOURCE);
        let call = find(&tree, SyntaxKind::InvocationExpression, "GetService(null)");
        assert_eq!(
            enclosing_statement(call).map(|s| s.kind()),
            Some(SyntaxKind::LocalDeclarationStatement)
        );
        assert_eq!(enclosing_block(call).map(|b| b.kind()), Some(SyntaxKind::Block));
    }
}
