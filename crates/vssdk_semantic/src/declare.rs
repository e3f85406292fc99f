//! Declaration pass.
//!
//! Walks every tree once and allocates a symbol for each namespace, type,
//! member, parameter, type parameter and local it declares. Types are left
//! unresolved here; [`crate::resolve`] fills them in once every name exists.

use crate::arena::Arena;
use crate::symbol::{DeclRef, MethodKind, Modifiers, Symbol, SymbolId, SymbolKind, TypeKind};
use std::collections::HashMap;
use vssdk_common::{Ident, Interner};
use vssdk_source::FileId;
use vssdk_syntax::{NodeId, NodeRef, SyntaxKind, SyntaxTree};

/// A local or parameter name together with the node it is visible in.
#[derive(Clone, Copy, Debug)]
pub(crate) struct LocalScope {
    pub(crate) scope: NodeId,
    pub(crate) symbol: SymbolId,
}

/// Output of the declaration pass.
pub(crate) struct Declarations {
    pub(crate) symbols: Arena<SymbolId, Symbol>,
    pub(crate) global: SymbolId,
    pub(crate) declared: HashMap<(FileId, NodeId), SymbolId>,
    pub(crate) locals: HashMap<(FileId, Ident), Vec<LocalScope>>,
}

pub(crate) fn declare(trees: &[SyntaxTree], interner: &Interner) -> Declarations {
    let mut symbols = Arena::new();
    let global = symbols.alloc(Symbol::new(
        interner.get_or_intern(""),
        SymbolKind::Namespace,
        None,
    ));
    let mut declarer = Declarer {
        interner,
        symbols,
        declared: HashMap::new(),
        locals: HashMap::new(),
        file: FileId::DUMMY,
    };
    for tree in trees {
        declarer.file = tree.file();
        let root = tree.root();
        let decl = declarer.decl_ref(root);
        declarer.symbols[global].declarations.push(decl);
        declarer.declared.insert((declarer.file, root.id()), global);
        declarer.namespace_members(root, global);
        declarer.declare_locals(tree);
    }
    Declarations {
        symbols: declarer.symbols,
        global,
        declared: declarer.declared,
        locals: declarer.locals,
    }
}

struct Declarer<'a> {
    interner: &'a Interner,
    symbols: Arena<SymbolId, Symbol>,
    declared: HashMap<(FileId, NodeId), SymbolId>,
    locals: HashMap<(FileId, Ident), Vec<LocalScope>>,
    file: FileId,
}

impl Declarer<'_> {
    fn decl_ref(&self, node: NodeRef<'_>) -> DeclRef {
        DeclRef {
            file: self.file,
            node: node.id(),
        }
    }

    /// Allocates a symbol declared by `node` without linking it into its
    /// container's member list.
    fn alloc(
        &mut self,
        name: &str,
        kind: SymbolKind,
        container: SymbolId,
        node: NodeRef<'_>,
    ) -> SymbolId {
        let mut symbol = Symbol::new(self.interner.get_or_intern(name), kind, Some(container));
        symbol.modifiers = modifiers_of(node);
        symbol.declarations.push(self.decl_ref(node));
        let id = self.symbols.alloc(symbol);
        self.declared.insert((self.file, node.id()), id);
        id
    }

    fn add_member(
        &mut self,
        name: &str,
        kind: SymbolKind,
        container: SymbolId,
        node: NodeRef<'_>,
    ) -> SymbolId {
        let id = self.alloc(name, kind, container, node);
        self.symbols[container].members.push(id);
        id
    }

    fn find_member(&self, container: SymbolId, name: Ident, matches: impl Fn(&Symbol) -> bool) -> Option<SymbolId> {
        self.symbols[container]
            .members
            .iter()
            .copied()
            .find(|&m| self.symbols[m].name == name && matches(&self.symbols[m]))
    }

    // ========================================================================
    // Namespaces and types
    // ========================================================================

    fn namespace_members(&mut self, node: NodeRef<'_>, container: SymbolId) {
        for member in node.members() {
            match member.kind() {
                SyntaxKind::NamespaceDeclaration | SyntaxKind::FileScopedNamespaceDeclaration => {
                    self.namespace(member, container)
                }
                kind if kind.is_type_declaration() => self.type_declaration(member, container),
                _ => {}
            }
        }
    }

    fn namespace(&mut self, node: NodeRef<'_>, container: SymbolId) {
        let segments: Vec<&str> = node
            .name()
            .map(|name| {
                name.tokens()
                    .filter(|t| t.kind() == SyntaxKind::Identifier && !t.is_missing())
                    .map(|t| t.text())
                    .collect()
            })
            .unwrap_or_default();
        let mut current = container;
        for segment in segments {
            let ident = self.interner.get_or_intern(segment);
            current = match self.find_member(current, ident, Symbol::is_namespace) {
                Some(existing) => existing,
                None => {
                    let id = self
                        .symbols
                        .alloc(Symbol::new(ident, SymbolKind::Namespace, Some(current)));
                    self.symbols[current].members.push(id);
                    id
                }
            };
        }
        let decl = self.decl_ref(node);
        self.symbols[current].declarations.push(decl);
        self.declared.insert((self.file, node.id()), current);
        self.namespace_members(node, current);
    }

    fn type_declaration(&mut self, node: NodeRef<'_>, container: SymbolId) {
        let type_kind = match node.kind() {
            SyntaxKind::ClassDeclaration => TypeKind::Class,
            SyntaxKind::StructDeclaration => TypeKind::Struct,
            SyntaxKind::InterfaceDeclaration => TypeKind::Interface,
            SyntaxKind::EnumDeclaration => TypeKind::Enum,
            SyntaxKind::DelegateDeclaration => TypeKind::Delegate,
            _ => return,
        };
        let name = node.identifier_text();
        if name.is_empty() {
            return;
        }
        let arity = type_parameter_nodes(node).count();
        let ident = self.interner.get_or_intern(name);
        let existing = self.find_member(container, ident, |s| {
            s.type_kind() == Some(type_kind) && s.arity() == arity
        });
        let id = match existing {
            Some(id) => {
                let decl = self.decl_ref(node);
                let modifiers = modifiers_of(node);
                let symbol = &mut self.symbols[id];
                symbol.declarations.push(decl);
                symbol.modifiers.insert(modifiers);
                self.declared.insert((self.file, node.id()), id);
                id
            }
            None => {
                let id = self.add_member(name, SymbolKind::Type(type_kind), container, node);
                self.type_parameters(node, id);
                id
            }
        };

        match type_kind {
            TypeKind::Delegate => self.parameters(node, id),
            TypeKind::Enum => {
                for member in node
                    .child_nodes()
                    .filter(|n| n.kind() == SyntaxKind::EnumMemberDeclaration)
                {
                    let member_id =
                        self.add_member(member.identifier_text(), SymbolKind::Field, id, member);
                    self.symbols[member_id]
                        .modifiers
                        .insert(Modifiers::STATIC | Modifiers::CONST);
                }
            }
            _ => {
                for member in node.members() {
                    self.member(member, id);
                }
            }
        }
    }

    fn type_parameters(&mut self, node: NodeRef<'_>, owner: SymbolId) {
        let params: Vec<NodeRef<'_>> = type_parameter_nodes(node).collect();
        for param in params {
            let id = self.alloc(param.identifier_text(), SymbolKind::TypeParameter, owner, param);
            self.symbols[owner].type_parameters.push(id);
        }
    }

    fn parameters(&mut self, node: NodeRef<'_>, owner: SymbolId) {
        for param in node.parameters() {
            let id = self.alloc(param.identifier_text(), SymbolKind::Parameter, owner, param);
            if param.child_node(SyntaxKind::EqualsValueClause).is_some() {
                self.symbols[id].modifiers.insert(Modifiers::OPTIONAL);
            }
            self.symbols[owner].parameters.push(id);
            self.add_scoped(param.identifier_text(), node.id(), id);
        }
    }

    // ========================================================================
    // Members
    // ========================================================================

    fn member(&mut self, node: NodeRef<'_>, container: SymbolId) {
        match node.kind() {
            kind if kind.is_type_declaration() => self.type_declaration(node, container),
            SyntaxKind::FieldDeclaration | SyntaxKind::EventFieldDeclaration => {
                let kind = if node.kind() == SyntaxKind::FieldDeclaration {
                    SymbolKind::Field
                } else {
                    SymbolKind::Event
                };
                let modifiers = modifiers_of(node);
                let declarators: Vec<NodeRef<'_>> = node.declarators().collect();
                for declarator in declarators {
                    let id = self.add_member(declarator.identifier_text(), kind, container, declarator);
                    self.symbols[id].modifiers = modifiers;
                }
            }
            SyntaxKind::EventDeclaration => {
                self.add_member(node.identifier_text(), SymbolKind::Event, container, node);
            }
            SyntaxKind::PropertyDeclaration => {
                self.add_member(node.identifier_text(), SymbolKind::Property, container, node);
            }
            SyntaxKind::IndexerDeclaration => {
                let id = self.add_member("this[]", SymbolKind::Property, container, node);
                self.parameters(node, id);
            }
            SyntaxKind::MethodDeclaration => {
                let id = self.add_member(
                    node.identifier_text(),
                    SymbolKind::Method(MethodKind::Ordinary),
                    container,
                    node,
                );
                self.type_parameters(node, id);
                self.parameters(node, id);
            }
            SyntaxKind::ConstructorDeclaration => {
                let name = if node.has_modifier(SyntaxKind::StaticKeyword) {
                    ".cctor"
                } else {
                    ".ctor"
                };
                let id = self.add_member(
                    name,
                    SymbolKind::Method(MethodKind::Constructor),
                    container,
                    node,
                );
                self.parameters(node, id);
            }
            SyntaxKind::DestructorDeclaration => {
                self.add_member(
                    "Finalize",
                    SymbolKind::Method(MethodKind::Destructor),
                    container,
                    node,
                );
            }
            SyntaxKind::OperatorDeclaration | SyntaxKind::ConversionOperatorDeclaration => {
                let name = format!(
                    "operator {}",
                    node.child_tokens()
                        .skip_while(|t| t.kind() != SyntaxKind::OperatorKeyword)
                        .skip(1)
                        .map(|t| t.text())
                        .collect::<String>()
                );
                let id = self.add_member(
                    &name,
                    SymbolKind::Method(MethodKind::Operator),
                    container,
                    node,
                );
                self.parameters(node, id);
            }
            _ => {}
        }
    }

    // ========================================================================
    // Locals
    // ========================================================================

    fn add_scoped(&mut self, name: &str, scope: NodeId, symbol: SymbolId) {
        if name.is_empty() {
            return;
        }
        let ident = self.interner.get_or_intern(name);
        self.locals
            .entry((self.file, ident))
            .or_default()
            .push(LocalScope { scope, symbol });
    }

    /// The innermost declared member or function containing `node`.
    fn owner_of(&self, node: NodeRef<'_>) -> Option<SymbolId> {
        node.ancestors()
            .filter(|n| {
                n.kind().is_function_like()
                    || matches!(
                        n.kind(),
                        SyntaxKind::PropertyDeclaration
                            | SyntaxKind::IndexerDeclaration
                            | SyntaxKind::EventDeclaration
                            | SyntaxKind::VariableDeclarator
                    )
                    || n.kind().is_type_declaration()
            })
            .find_map(|n| {
                self.declared
                    .get(&(self.file, n.id()))
                    .copied()
                    .filter(|&id| self.symbols[id].kind != SymbolKind::Local)
            })
    }

    fn declare_local(&mut self, node: NodeRef<'_>, name: &str, scope: NodeRef<'_>) {
        let Some(owner) = self.owner_of(node) else {
            return;
        };
        let id = self.alloc(name, SymbolKind::Local, owner, node);
        self.add_scoped(name, scope.id(), id);
    }

    fn declare_locals(&mut self, tree: &SyntaxTree) {
        for node in tree.nodes() {
            match node.kind() {
                SyntaxKind::VariableDeclarator => {
                    let Some(declaration) = node.parent() else { continue };
                    let Some(owner) = declaration.parent() else { continue };
                    if matches!(
                        owner.kind(),
                        SyntaxKind::FieldDeclaration | SyntaxKind::EventFieldDeclaration
                    ) {
                        continue;
                    }
                    let scope = if owner.kind() == SyntaxKind::LocalDeclarationStatement {
                        owner.parent().unwrap_or(owner)
                    } else {
                        owner
                    };
                    self.declare_local(node, node.identifier_text(), scope);
                }
                SyntaxKind::ForEachStatement => {
                    self.declare_local(node, node.identifier_text(), node);
                }
                SyntaxKind::CatchDeclaration => {
                    if node.identifier().is_some() {
                        let scope = node.parent().unwrap_or(node);
                        self.declare_local(node, node.identifier_text(), scope);
                    }
                }
                SyntaxKind::SingleVariableDesignation => {
                    if let Some(scope) = designation_scope(node) {
                        self.declare_local(node, node.identifier_text(), scope);
                    }
                }
                SyntaxKind::Parameter => {
                    let Some(parent) = node.parent() else { continue };
                    let function = if parent.kind() == SyntaxKind::ParameterList {
                        parent.parent()
                    } else {
                        Some(parent)
                    };
                    let Some(function) = function.filter(|f| f.kind().is_anonymous_function())
                    else {
                        continue;
                    };
                    let Some(owner) = self.owner_of(function) else { continue };
                    let id = self.alloc(node.identifier_text(), SymbolKind::Parameter, owner, node);
                    self.add_scoped(node.identifier_text(), function.id(), id);
                }
                SyntaxKind::LocalFunctionStatement => {
                    let Some(owner) = self.owner_of(node) else { continue };
                    let id = self.alloc(
                        node.identifier_text(),
                        SymbolKind::Method(MethodKind::LocalFunction),
                        owner,
                        node,
                    );
                    self.type_parameters(node, id);
                    self.parameters(node, id);
                    let scope = node.parent().unwrap_or(node);
                    self.add_scoped(node.identifier_text(), scope.id(), id);
                }
                _ => {}
            }
        }
    }
}

fn type_parameter_nodes<'a>(node: NodeRef<'a>) -> impl Iterator<Item = NodeRef<'a>> + 'a {
    node.child_node(SyntaxKind::TypeParameterList)
        .into_iter()
        .flat_map(|list| list.child_nodes())
        .filter(|n| n.kind() == SyntaxKind::TypeParameter)
}

fn modifiers_of(node: NodeRef<'_>) -> Modifiers {
    let is_parameter = node.kind() == SyntaxKind::Parameter;
    node.child_tokens()
        .filter(|t| is_parameter || t.kind() != SyntaxKind::ThisKeyword)
        .filter_map(|t| Modifiers::from_keyword(t.kind()))
        .fold(Modifiers::NONE, |acc, m| acc | m)
}

/// Pattern and `out var` variables are visible in the enclosing block, or
/// in the whole body of an expression-bodied function or lambda.
fn designation_scope(node: NodeRef<'_>) -> Option<NodeRef<'_>> {
    node.ancestors().find(|n| {
        matches!(
            n.kind(),
            SyntaxKind::Block | SyntaxKind::SwitchSection | SyntaxKind::ArrowExpressionClause
        ) || n.kind().is_anonymous_function()
            || n.kind().is_function_like()
            || matches!(
                n.kind(),
                SyntaxKind::FieldDeclaration | SyntaxKind::PropertyDeclaration
            )
    })
}
