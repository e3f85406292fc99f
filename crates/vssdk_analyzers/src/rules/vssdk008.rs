//! VSSDK008: UI-thread-bound work while a MEF part is being constructed.

use std::collections::HashSet;

use vssdk_common::VssdkResult;
use vssdk_diagnostics::{DiagnosticCode, Label, Severity};
use vssdk_semantic::{Compilation, SemanticModel, SymbolId, SymbolKind};
use vssdk_source::Span;
use vssdk_syntax::{NodeRef, SyntaxKind};

use crate::hierarchy::is_equal_to_or_derived_from;
use crate::thread_affinity::ThreadAffinityTables;
use crate::well_known::WellKnownType;
use crate::{AnalyzerRule, TreeAnalyzer, TreeContext};

/// Detects exported MEF parts whose constructors or member initializers
/// touch UI-thread-bound members, or assert they are on the UI thread.
///
/// MEF may construct a part on any thread. Lambdas and local functions are
/// skipped since they do not run as part of construction.
pub struct NoUiThreadInMefConstruction;

struct Analyzer {
    export: SymbolId,
}

enum Affinity {
    Asserts,
    Requires,
}

impl AnalyzerRule for NoUiThreadInMefConstruction {
    fn code(&self) -> DiagnosticCode {
        DiagnosticCode::vssdk(8)
    }

    fn name(&self) -> &str {
        "avoid-ui-thread-in-mef-construction"
    }

    fn description(&self) -> &str {
        "MEF parts should not depend on the UI thread while they are constructed"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn on_compilation_start(&self, compilation: &Compilation) -> Option<Box<dyn TreeAnalyzer>> {
        Some(Box::new(Analyzer {
            export: WellKnownType::ExportAttribute.resolve(compilation)?,
        }))
    }
}

impl Analyzer {
    fn is_exported(&self, model: &SemanticModel<'_>, class: NodeRef<'_>) -> bool {
        class.attributes().any(|a| {
            is_equal_to_or_derived_from(model.compilation(), model.attribute_class(a), self.export)
        })
    }
}

/// Code that runs while an instance is constructed: instance constructors
/// and instance field and property initializers.
fn construction_roots<'a>(class: NodeRef<'a>) -> Vec<NodeRef<'a>> {
    let mut roots = Vec::new();
    for member in class.members() {
        if member.has_modifier(SyntaxKind::StaticKeyword) {
            continue;
        }
        match member.kind() {
            SyntaxKind::ConstructorDeclaration => roots.push(member),
            SyntaxKind::FieldDeclaration => {
                roots.extend(member.declarators().filter_map(|d| d.initializer_value()))
            }
            SyntaxKind::PropertyDeclaration => roots.extend(member.initializer_value()),
            _ => {}
        }
    }
    roots
}

/// Returns `true` if `node` sits in a lambda or local function at or below
/// `root`.
fn runs_later(node: NodeRef<'_>, root: NodeRef<'_>) -> bool {
    for ancestor in node.ancestors() {
        if ancestor.kind().is_anonymous_function()
            || ancestor.kind() == SyntaxKind::LocalFunctionStatement
        {
            return true;
        }
        if ancestor == root {
            break;
        }
    }
    false
}

fn is_member(c: &Compilation, symbol: SymbolId) -> bool {
    matches!(
        c.symbol(symbol).kind,
        SymbolKind::Method(_) | SymbolKind::Property | SymbolKind::Field | SymbolKind::Event
    )
}

fn classify(
    c: &Compilation,
    tables: &ThreadAffinityTables,
    symbol: SymbolId,
) -> Option<Affinity> {
    if tables.asserting_main_thread.contains_symbol(c, symbol) {
        Some(Affinity::Asserts)
    } else if tables.requiring_main_thread.contains_symbol(c, symbol) {
        Some(Affinity::Requires)
    } else {
        None
    }
}

/// What a construction-time node touches.
enum Site<'a> {
    /// A member access or simple name, bound as a member.
    Member(NodeRef<'a>),
    /// The target type of a cast or `as` conversion.
    Conversion(NodeRef<'a>),
}

impl<'a> Site<'a> {
    /// The node the diagnostic is reported at.
    fn location(&self) -> Option<NodeRef<'a>> {
        match *self {
            Site::Member(node) if node.kind() != SyntaxKind::IdentifierName => node.name(),
            Site::Member(node) | Site::Conversion(node) => Some(node),
        }
    }
}

fn candidate(node: NodeRef<'_>) -> Option<Site<'_>> {
    match node.kind() {
        SyntaxKind::MemberAccessExpression | SyntaxKind::MemberBindingExpression => {
            Some(Site::Member(node))
        }
        SyntaxKind::IdentifierName => {
            let is_name_part = node.parent().is_some_and(|p| {
                matches!(
                    p.kind(),
                    SyntaxKind::MemberAccessExpression
                        | SyntaxKind::MemberBindingExpression
                        | SyntaxKind::QualifiedName
                ) && p.name() == Some(node)
            });
            (!is_name_part).then_some(Site::Member(node))
        }
        SyntaxKind::CastExpression => node.declared_type().map(Site::Conversion),
        SyntaxKind::BinaryExpression if node.token(SyntaxKind::AsKeyword).is_some() => {
            node.declared_type().map(Site::Conversion)
        }
        _ => None,
    }
}

impl TreeAnalyzer for Analyzer {
    fn analyze_tree(&self, ctx: &TreeContext<'_>) -> VssdkResult<()> {
        let c = ctx.compilation();
        let model = ctx.model();
        let tables = ctx.tables();
        for class in ctx.nodes_of(&[SyntaxKind::ClassDeclaration]) {
            if !self.is_exported(model, class) {
                continue;
            }
            let mut reported: HashSet<Span> = HashSet::new();
            for root in construction_roots(class) {
                for node in root.descendants_and_self() {
                    if ctx.is_cancelled() {
                        return Ok(());
                    }
                    let Some(site) = candidate(node) else {
                        continue;
                    };
                    if runs_later(node, root) {
                        continue;
                    }
                    let affinity = match site {
                        Site::Member(target) => model
                            .symbol_info(target)
                            .filter(|s| is_member(c, *s))
                            .and_then(|s| classify(c, tables, s)),
                        Site::Conversion(ty) => model
                            .bind_type(ty)
                            .and_then(|t| c.original_definition(&t))
                            .filter(|t| tables.requiring_main_thread.contains_symbol(c, *t))
                            .map(|_| Affinity::Requires),
                    };
                    let (Some(affinity), Some(location)) = (affinity, site.location()) else {
                        continue;
                    };
                    let span = location.span();
                    if !reported.insert(span) {
                        continue;
                    }
                    ctx.enter(node);
                    let (message, label) = match affinity {
                        Affinity::Asserts => (
                            format!(
                                "`{}` asserts the UI thread while the MEF part `{}` is constructed",
                                location.text(),
                                class.identifier_text()
                            ),
                            "asserts the UI thread",
                        ),
                        Affinity::Requires => (
                            format!(
                                "`{}` requires the UI thread while the MEF part `{}` is constructed",
                                location.text(),
                                class.identifier_text()
                            ),
                            "requires the UI thread",
                        ),
                    };
                    ctx.report(
                        ctx.diagnostic(message, span)
                            .with_label(Label::primary(span, label))
                            .with_help("defer the work until the part is first used, and switch to the UI thread there"),
                    );
                }
            }
        }
        Ok(())
    }
}
