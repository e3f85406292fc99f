//! Dereferences of service lookups that were never checked for null.
//!
//! A lookup such as `GetService(typeof(SFoo)) as IFoo` may return null. The
//! scanner finds how the result is consumed, then collects every member or
//! element access on the variable holding it that no null test or assertion
//! precedes.

use vssdk_semantic::{SemanticModel, SymbolId, SymbolKind};
use vssdk_syntax::{NodeRef, SyntaxKind};

use crate::ancestor::{enclosing_block, enclosing_statement, strip_wrappers, Boundary, ScanScope};
use crate::well_known::{is_any_member, NULL_ASSERTION_METHODS, SERVICE_LOOKUP_METHODS};

/// Where a lookup result ends up.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TargetKind {
    /// A local variable.
    Local,
    /// A parameter of the enclosing function.
    Parameter,
    /// A field of the containing type.
    Field,
    /// A property of the containing type.
    Property,
}

impl TargetKind {
    /// The name used in diagnostic properties.
    pub fn as_str(self) -> &'static str {
        match self {
            TargetKind::Local => "Local",
            TargetKind::Parameter => "Parameter",
            TargetKind::Field => "Field",
            TargetKind::Property => "Property",
        }
    }

    fn of(kind: SymbolKind) -> Option<Self> {
        Some(match kind {
            SymbolKind::Local => TargetKind::Local,
            SymbolKind::Parameter => TargetKind::Parameter,
            SymbolKind::Field => TargetKind::Field,
            SymbolKind::Property => TargetKind::Property,
            _ => return None,
        })
    }

    /// Locals and parameters are scanned in their block; fields and
    /// properties across the whole type.
    pub fn is_type_scoped(self) -> bool {
        matches!(self, TargetKind::Field | TargetKind::Property)
    }
}

/// A lookup result stored in a variable.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BoundValue<'a> {
    /// The declarator or assignment that stores the value.
    pub site: NodeRef<'a>,
    /// The variable.
    pub symbol: SymbolId,
    /// What kind of variable it is.
    pub target: TargetKind,
}

/// How the result of a lookup is consumed.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Consumption<'a> {
    /// `lookup?.Member`; always safe.
    ConditionalAccess,
    /// `lookup.Member` or `lookup[i]`, possibly through casts and `await`.
    DirectDereference(NodeRef<'a>),
    /// Stored in a local, parameter, field or property.
    Bound(BoundValue<'a>),
    /// Passed, returned or otherwise out of reach.
    Other,
}

/// A lookup whose result may be dereferenced while null.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct NullGuardFinding<'a> {
    /// The service lookup invocation.
    pub lookup: NodeRef<'a>,
    /// Where the finding is reported: the member access for a direct
    /// dereference, otherwise the declarator or assignment.
    pub primary: NodeRef<'a>,
    /// Every unguarded dereference, in source order per body.
    pub dereferences: Vec<NodeRef<'a>>,
    /// The variable holding the result; `None` for a direct dereference.
    pub binding: Option<BoundValue<'a>>,
}

const CONSUMER_KINDS: &[SyntaxKind] = &[
    SyntaxKind::ConditionalAccessExpression,
    SyntaxKind::MemberAccessExpression,
    SyntaxKind::ElementAccessExpression,
    SyntaxKind::EqualsValueClause,
    SyntaxKind::AssignmentExpression,
];

/// Returns `true` if `invocation` calls one of the service lookup methods.
pub fn is_service_lookup(model: &SemanticModel<'_>, invocation: NodeRef<'_>) -> bool {
    invocation.kind() == SyntaxKind::InvocationExpression
        && is_any_member(
            model.compilation(),
            model.symbol_info(invocation),
            SERVICE_LOOKUP_METHODS,
        )
}

/// Classifies how `lookup` is consumed, looking through parentheses, casts,
/// `as`, `await` and `!`.
pub fn classify_consumption<'c>(model: &SemanticModel<'c>, lookup: NodeRef<'c>) -> Consumption<'c> {
    let consumer = ScanScope::new(lookup, Boundary::TransparentWrappers).find_ancestor(
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
        return Consumption::Other;
    };
    match consumer.kind() {
        SyntaxKind::ConditionalAccessExpression => Consumption::ConditionalAccess,
        SyntaxKind::MemberAccessExpression | SyntaxKind::ElementAccessExpression => {
            Consumption::DirectDereference(consumer)
        }
        SyntaxKind::EqualsValueClause => {
            let bound = consumer
                .parent()
                .filter(|d| d.kind() == SyntaxKind::VariableDeclarator)
                .and_then(|declarator| bind_site(model, declarator, model.declared_symbol(declarator)));
            bound.map_or(Consumption::Other, Consumption::Bound)
        }
        _ => {
            let symbol = consumer.left().and_then(|left| model.symbol_info(left));
            bind_site(model, consumer, symbol).map_or(Consumption::Other, Consumption::Bound)
        }
    }
}

fn bind_site<'c>(
    model: &SemanticModel<'c>,
    site: NodeRef<'c>,
    symbol: Option<SymbolId>,
) -> Option<BoundValue<'c>> {
    let symbol = symbol?;
    let target = TargetKind::of(model.compilation().symbol(symbol).kind)?;
    Some(BoundValue {
        site,
        symbol,
        target,
    })
}

/// Scans one service lookup. Returns `None` when the call is not a lookup
/// or every use of its result is safe.
pub fn scan_lookup<'c>(
    model: &SemanticModel<'c>,
    lookup: NodeRef<'c>,
) -> Option<NullGuardFinding<'c>> {
    if !is_service_lookup(model, lookup) {
        return None;
    }
    match classify_consumption(model, lookup) {
        Consumption::ConditionalAccess | Consumption::Other => None,
        Consumption::DirectDereference(access) => Some(NullGuardFinding {
            lookup,
            primary: access,
            dereferences: vec![access],
            binding: None,
        }),
        Consumption::Bound(binding) => {
            let dereferences = unguarded_dereferences(model, &binding);
            (!dereferences.is_empty()).then(|| NullGuardFinding {
                lookup,
                primary: binding.site,
                dereferences,
                binding: Some(binding),
            })
        }
    }
}

/// Dereferences of `binding`'s variable in its scope that no guard covers.
pub fn unguarded_dereferences<'c>(
    model: &SemanticModel<'c>,
    binding: &BoundValue<'c>,
) -> Vec<NodeRef<'c>> {
    let c = model.compilation();
    if let Some(next) = enclosing_statement(binding.site).and_then(|s| s.next_sibling()) {
        if is_guard_statement(model, next, binding.symbol) {
            return Vec::new();
        }
    }

    let scopes: Vec<NodeRef<'c>> = if binding.target.is_type_scoped() {
        c.containing_type(binding.symbol)
            .into_iter()
            .flat_map(|ty| c.declaring_nodes(ty))
            .collect()
    } else {
        enclosing_block(binding.site)
            .or_else(|| binding.site.enclosing_function())
            .into_iter()
            .collect()
    };

    let mut found = Vec::new();
    for scope in scopes {
        let Some(scope_model) = c.semantic_model(scope.tree().file()) else {
            continue;
        };
        found.extend(
            scope
                .descendants()
                .filter(|n| {
                    matches!(
                        n.kind(),
                        SyntaxKind::MemberAccessExpression | SyntaxKind::ElementAccessExpression
                    )
                })
                .filter(|n| !inside_nested_function(*n, scope))
                .filter(|n| !(same_body(*n, binding.site) && n.span().start < binding.site.span().end))
                .filter(|n| {
                    n.expression()
                        .is_some_and(|receiver| refers_to(&scope_model, strip_wrappers(receiver), binding.symbol))
                })
                .filter(|n| !is_guarded(&scope_model, *n, binding)),
        );
    }
    found
}

/// Returns `true` if `expr` names `symbol` directly or as `this.symbol`.
pub fn refers_to(model: &SemanticModel<'_>, expr: NodeRef<'_>, symbol: SymbolId) -> bool {
    let named = match expr.kind() {
        SyntaxKind::IdentifierName => true,
        SyntaxKind::MemberAccessExpression => expr
            .expression()
            .is_some_and(|r| r.kind() == SyntaxKind::ThisExpression),
        _ => false,
    };
    named && model.symbol_info(expr) == Some(symbol)
}

/// `symbol == null`, `null != symbol`, `symbol is ...`.
pub fn is_null_test(model: &SemanticModel<'_>, node: NodeRef<'_>, symbol: SymbolId) -> bool {
    match node.kind() {
        SyntaxKind::BinaryExpression => {
            if !matches!(
                node.operator_kind(),
                Some(SyntaxKind::EqualsEquals | SyntaxKind::ExclamationEquals)
            ) {
                return false;
            }
            let (Some(left), Some(right)) = (node.left(), node.right()) else {
                return false;
            };
            let (left, right) = (strip_wrappers(left), strip_wrappers(right));
            (refers_to(model, left, symbol) && is_null_literal(right))
                || (is_null_literal(left) && refers_to(model, right, symbol))
        }
        SyntaxKind::IsPatternExpression => node
            .nth_child_node(0)
            .is_some_and(|e| refers_to(model, strip_wrappers(e), symbol)),
        _ => false,
    }
}

/// A call to an assertion method whose first argument is `symbol`.
pub fn is_null_assertion(model: &SemanticModel<'_>, node: NodeRef<'_>, symbol: SymbolId) -> bool {
    node.kind() == SyntaxKind::InvocationExpression
        && node
            .arguments()
            .next()
            .and_then(|a| a.expression())
            .is_some_and(|arg| refers_to(model, strip_wrappers(arg), symbol))
        && is_any_member(
            model.compilation(),
            model.symbol_info(node),
            NULL_ASSERTION_METHODS,
        )
}

fn is_null_literal(node: NodeRef<'_>) -> bool {
    node.kind() == SyntaxKind::LiteralExpression && node.token(SyntaxKind::NullKeyword).is_some()
}

/// An assertion statement, or an `if` testing the symbol against null whose
/// body leaves the scope.
fn is_guard_statement(model: &SemanticModel<'_>, statement: NodeRef<'_>, symbol: SymbolId) -> bool {
    match statement.kind() {
        SyntaxKind::ExpressionStatement => statement
            .expression()
            .is_some_and(|e| is_null_assertion(model, e, symbol)),
        SyntaxKind::IfStatement => {
            let tests = statement
                .condition()
                .map(strip_wrappers)
                .is_some_and(|cond| is_null_test(model, cond, symbol));
            tests && statement.embedded_statement().is_some_and(exits)
        }
        _ => false,
    }
}

fn exits(statement: NodeRef<'_>) -> bool {
    match statement.kind() {
        SyntaxKind::ReturnStatement | SyntaxKind::ThrowStatement => true,
        SyntaxKind::Block => statement.statements().last().is_some_and(exits),
        _ => false,
    }
}

/// The function or member body a node belongs to.
fn body_of(node: NodeRef<'_>) -> Option<NodeRef<'_>> {
    node.enclosing_function()
        .or_else(|| node.ancestors().find(|a| a.kind() == SyntaxKind::FieldDeclaration))
}

fn same_body(a: NodeRef<'_>, b: NodeRef<'_>) -> bool {
    a.tree().file() == b.tree().file() && body_of(a) == body_of(b)
}

fn inside_nested_function(node: NodeRef<'_>, scope: NodeRef<'_>) -> bool {
    node.ancestors()
        .take_while(|a| *a != scope)
        .any(|a| a.kind().is_anonymous_function() || a.kind() == SyntaxKind::LocalFunctionStatement)
}

/// Returns `true` if `statement` leaves the scope or assigns `symbol`.
fn exits_or_assigns(model: &SemanticModel<'_>, statement: NodeRef<'_>, symbol: SymbolId) -> bool {
    exits(statement)
        || statement.descendants_and_self().any(|n| {
            n.kind() == SyntaxKind::AssignmentExpression
                && n.left()
                    .is_some_and(|left| refers_to(model, strip_wrappers(left), symbol))
        })
}

/// A conditional whose condition null-tests the variable guards the
/// dereferences inside it. An `if` also guards the code after it when its
/// body leaves the scope or assigns the variable.
fn guards(
    model: &SemanticModel<'_>,
    conditional: NodeRef<'_>,
    dereference: NodeRef<'_>,
    symbol: SymbolId,
) -> bool {
    let tests = conditional.condition().is_some_and(|cond| {
        cond.descendants_and_self()
            .any(|t| is_null_test(model, t, symbol))
    });
    if !tests {
        return false;
    }
    conditional.is_ancestor_of(dereference)
        || (conditional.kind() == SyntaxKind::IfStatement
            && conditional
                .embedded_statement()
                .is_some_and(|body| exits_or_assigns(model, body, symbol)))
}

/// Returns `true` if a null test or an assertion on the variable guards
/// `dereference` in its body.
fn is_guarded(model: &SemanticModel<'_>, dereference: NodeRef<'_>, binding: &BoundValue<'_>) -> bool {
    let Some(body) = body_of(dereference) else {
        return false;
    };
    let start = dereference.span().start;
    let after_site = |n: NodeRef<'_>| {
        !same_body(n, binding.site) || n.span().start >= binding.site.span().end
    };
    body.descendants()
        .take_while(|n| n.span().start < start)
        .filter(|n| after_site(*n))
        .any(|n| match n.kind() {
            SyntaxKind::IfStatement | SyntaxKind::ConditionalExpression => {
                guards(model, n, dereference, binding.symbol)
            }
            SyntaxKind::InvocationExpression => is_null_assertion(model, n, binding.symbol),
            _ => false,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{compile, find};

    fn scan(source: &str, lookup: &str) -> Option<(Vec<String>, Option<TargetKind>, String)> {
        let (c, file) = compile(source);
        let model = c.semantic_model(file).unwrap();
        let call = find(model.tree(), SyntaxKind::InvocationExpression, lookup);
        scan_lookup(&model, call).map(|f| {
            (
                f.dereferences.iter().map(|d| d.text()).collect(),
                f.binding.map(|b| b.target),
                f.primary.text(),
            )
        })
    }

    fn package(body: &str) -> String {
        format!(
            "using System;\n\
             using Microsoft;\n\
             using Microsoft.VisualStudio.Shell;\n\
             interface IFoo {{ void Bar(); int Count {{ get; }} }}\n\
             class SFoo {{ }}\n\
             class Test : Package\n\
             {{\n\
                 IFoo field;\n\
             {body}\n\
             }}"
        )
    }

    const LOOKUP: &str = "GetService(typeof(SFoo))";

    #[test]
    fn unguarded_local_reports_declarator_and_uses() {
        let source = package(
            "protected override void Initialize()\n\
             {\n\
                 var svc = GetService(typeof(SFoo)) as IFoo;\n\
                 svc.Bar();\n\
                 var n = svc.Count;\n\
             }",
        );
        let (derefs, target, primary) = scan(&source, LOOKUP).unwrap();
        assert_eq!(derefs, ["svc.Bar", "svc.Count"]);
        assert_eq!(target, Some(TargetKind::Local));
        assert_eq!(primary, "svc = GetService(typeof(SFoo)) as IFoo");
    }

    #[test]
    fn if_null_test_guards_later_uses() {
        for test in ["svc != null", "svc is object", "!(svc is null)", "null != svc"] {
            let source = package(&format!(
                "protected override void Initialize()\n\
                 {{\n\
                     var svc = (IFoo)GetService(typeof(SFoo));\n\
                     svc?.Bar();\n\
                     if ({test}) {{ svc.Bar(); }}\n\
                 }}"
            ));
            assert_eq!(scan(&source, LOOKUP), None, "{test}");
        }
    }

    #[test]
    fn assertion_guards_later_uses_only() {
        let source = package(
            "protected override void Initialize()\n\
             {\n\
                 var svc = GetService(typeof(SFoo)) as IFoo;\n\
                 svc.Bar();\n\
                 Assumes.Present(svc);\n\
                 svc.Bar();\n\
             }",
        );
        let (derefs, _, _) = scan(&source, LOOKUP).unwrap();
        assert_eq!(derefs.len(), 1);
    }

    #[test]
    fn guard_statement_after_binding_protects_everything() {
        let source = package(
            "protected override void Initialize()\n\
             {\n\
                 var svc = GetService(typeof(SFoo)) as IFoo;\n\
                 if (svc == null) return;\n\
                 svc.Bar();\n\
             }",
        );
        assert_eq!(scan(&source, LOOKUP), None);
    }

    #[test]
    fn null_test_with_a_body_that_falls_through_is_no_guard() {
        let source = package(
            "protected override void Initialize()\n\
             {\n\
                 var svc = GetService(typeof(SFoo)) as IFoo;\n\
                 if (svc == null) { Log(); }\n\
                 svc.Bar();\n\
             }\n\
             void Log() { }",
        );
        let (derefs, _, _) = scan(&source, LOOKUP).unwrap();
        assert_eq!(derefs, ["svc.Bar"]);
    }

    #[test]
    fn null_test_that_reassigns_guards_later_uses() {
        let source = package(
            "protected override void Initialize()\n\
             {\n\
                 var svc = GetService(typeof(SFoo)) as IFoo;\n\
                 if (svc == null) { svc = field; }\n\
                 svc.Bar();\n\
             }",
        );
        assert_eq!(scan(&source, LOOKUP), None);
    }

    #[test]
    fn conditional_access_is_safe() {
        let source = package(
            "protected override void Initialize()\n\
             {\n\
                 (GetService(typeof(SFoo)) as IFoo)?.Bar();\n\
             }",
        );
        assert_eq!(scan(&source, LOOKUP), None);
    }

    #[test]
    fn direct_dereference_reports_at_the_access() {
        let source = package(
            "protected override void Initialize()\n\
             {\n\
                 ((IFoo)GetService(typeof(SFoo))).Bar();\n\
             }",
        );
        let (derefs, target, primary) = scan(&source, LOOKUP).unwrap();
        assert_eq!(target, None);
        assert_eq!(primary, "((IFoo)GetService(typeof(SFoo))).Bar");
        assert_eq!(derefs, [primary]);
    }

    #[test]
    fn field_uses_aggregate_across_members() {
        let source = package(
            "protected override void Initialize()\n\
             {\n\
                 this.field = GetService(typeof(SFoo)) as IFoo;\n\
             }\n\
             void Use() { field.Bar(); }\n\
             void Checked() { if (this.field != null) { this.field.Bar(); } }\n\
             void Later() { System.Action a = () => field.Bar(); }",
        );
        let (derefs, target, primary) = scan(&source, LOOKUP).unwrap();
        assert_eq!(target, Some(TargetKind::Field));
        assert_eq!(primary, "this.field = GetService(typeof(SFoo)) as IFoo");
        assert_eq!(derefs, ["field.Bar"]);
    }

    #[test]
    fn passing_the_result_along_is_out_of_scope() {
        let source = package(
            "protected override void Initialize() { Take(GetService(typeof(SFoo))); }\n\
             void Take(object o) { }",
        );
        assert_eq!(scan(&source, LOOKUP), None);
    }

    #[test]
    fn awaited_async_lookup_is_classified() {
        let source = "using System.Threading;\n\
             using System.Threading.Tasks;\n\
             using Microsoft.VisualStudio.Shell;\n\
             interface IFoo { void Bar(); }\n\
             class SFoo { }\n\
             class Test : AsyncPackage\n\
             {\n\
                 protected override async Task InitializeAsync(CancellationToken ct, System.IProgress<ServiceProgressData> p)\n\
                 {\n\
                     var svc = await GetServiceAsync(typeof(SFoo)) as IFoo;\n\
                     svc.Bar();\n\
                 }\n\
             }";
        let (derefs, target, _) = scan(source, "GetServiceAsync(typeof(SFoo))").unwrap();
        assert_eq!(target, Some(TargetKind::Local));
        assert_eq!(derefs, ["svc.Bar"]);
    }

    #[test]
    fn other_calls_are_not_lookups() {
        let source = package(
            "protected override void Initialize() { var o = Make(); o.ToString(); }\n\
             object Make() => null;",
        );
        let (c, file) = compile(&source);
        let model = c.semantic_model(file).unwrap();
        let call = find(model.tree(), SyntaxKind::InvocationExpression, "Make()");
        assert!(!is_service_lookup(&model, call));
        assert_eq!(scan_lookup(&model, call), None);
    }
}
