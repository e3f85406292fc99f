//! Namespace and type name lookup.
//!
//! A name is looked up through the scopes that enclose its node, innermost
//! first: type parameters of enclosing methods and types, nested types of
//! enclosing types and their bases, then each enclosing namespace together
//! with the `using` directives of its declaration. The compilation unit's
//! directives belong to the global namespace.

use crate::compilation::Compilation;
use crate::symbol::SymbolId;
use crate::types::{SpecialType, TypeRef};
use std::collections::HashSet;
use vssdk_common::Ident;
use vssdk_syntax::{NodeRef, SyntaxKind};

/// The result of resolving a name in a namespace-or-type position.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum NamespaceOrType {
    /// A namespace.
    Namespace(SymbolId),
    /// A type.
    Type(TypeRef),
}

enum Scope<'a> {
    TypeParameters(SymbolId),
    Type(SymbolId),
    Namespace {
        symbol: SymbolId,
        imports: Option<NodeRef<'a>>,
    },
}

impl Compilation {
    fn scopes<'a>(&self, node: NodeRef<'a>) -> Vec<Scope<'a>> {
        let mut scopes = Vec::new();
        let mut namespaces: Vec<(SymbolId, NodeRef<'a>)> = Vec::new();
        for ancestor in node.ancestors() {
            let kind = ancestor.kind();
            if kind.is_type_declaration() {
                if let Some(id) = self.declared_at(ancestor) {
                    scopes.push(Scope::TypeParameters(id));
                    scopes.push(Scope::Type(id));
                }
            } else if matches!(
                kind,
                SyntaxKind::MethodDeclaration | SyntaxKind::LocalFunctionStatement
            ) {
                if let Some(id) = self.declared_at(ancestor) {
                    scopes.push(Scope::TypeParameters(id));
                }
            } else if matches!(
                kind,
                SyntaxKind::NamespaceDeclaration
                    | SyntaxKind::FileScopedNamespaceDeclaration
                    | SyntaxKind::CompilationUnit
            ) {
                if let Some(id) = self.declared_at(ancestor) {
                    namespaces.push((id, ancestor));
                }
            }
        }
        for (i, &(symbol, decl)) in namespaces.iter().enumerate() {
            scopes.push(Scope::Namespace {
                symbol,
                imports: Some(decl),
            });
            // `namespace A.B { }` also puts `A` in scope.
            let stop = namespaces.get(i + 1).map(|&(outer, _)| outer);
            let mut current = self.symbols[symbol].container;
            while let Some(ns) = current {
                if Some(ns) == stop {
                    break;
                }
                scopes.push(Scope::Namespace {
                    symbol: ns,
                    imports: None,
                });
                current = self.symbols[ns].container;
            }
        }
        scopes
    }

    /// The interned identifier of a simple name node, or `None` when no
    /// symbol in the compilation could have that name.
    pub(crate) fn ident_of(&self, node: NodeRef<'_>) -> Option<Ident> {
        let token = node.identifier()?;
        self.interner.get(token.text())
    }

    /// Looks up a simple namespace-or-type name from `context`.
    pub(crate) fn lookup_namespace_or_type(
        &self,
        context: NodeRef<'_>,
        name: Ident,
        arity: usize,
    ) -> Option<NamespaceOrType> {
        for scope in self.scopes(context) {
            match scope {
                Scope::TypeParameters(owner) => {
                    if arity == 0 {
                        let found = self.symbols[owner]
                            .type_parameters
                            .iter()
                            .copied()
                            .find(|&p| self.symbols[p].name == name);
                        if let Some(param) = found {
                            return Some(NamespaceOrType::Type(TypeRef::Parameter(param)));
                        }
                    }
                }
                Scope::Type(ty) => {
                    if let Some(nested) = self.nested_type(ty, name, arity) {
                        return Some(NamespaceOrType::Type(TypeRef::named(nested)));
                    }
                }
                Scope::Namespace { symbol, imports } => {
                    if let Some(found) = self.namespace_member(symbol, name, arity) {
                        return Some(found);
                    }
                    if let Some(found) = imports.and_then(|i| self.lookup_in_imports(i, name, arity)) {
                        return Some(found);
                    }
                }
            }
        }
        None
    }

    /// The namespace or type named `name` directly inside namespace `ns`.
    pub(crate) fn namespace_member(
        &self,
        ns: SymbolId,
        name: Ident,
        arity: usize,
    ) -> Option<NamespaceOrType> {
        self.symbols[ns].members.iter().copied().find_map(|m| {
            let symbol = &self.symbols[m];
            if symbol.name != name {
                return None;
            }
            if symbol.is_namespace() && arity == 0 {
                Some(NamespaceOrType::Namespace(m))
            } else if symbol.is_type() && symbol.arity() == arity {
                Some(NamespaceOrType::Type(TypeRef::named(m)))
            } else {
                None
            }
        })
    }

    /// A type nested in `ty` or in one of its base classes.
    pub(crate) fn nested_type(&self, ty: SymbolId, name: Ident, arity: usize) -> Option<SymbolId> {
        let mut visited = HashSet::new();
        let mut current = Some(ty);
        while let Some(def) = current {
            if !visited.insert(def) {
                break;
            }
            let symbol = &self.symbols[def];
            let found = symbol.members.iter().copied().find(|&m| {
                let member = &self.symbols[m];
                member.name == name && member.is_type() && member.arity() == arity
            });
            if found.is_some() {
                return found;
            }
            current = symbol.base.as_ref().and_then(TypeRef::definition);
        }
        None
    }

    fn lookup_in_imports(
        &self,
        imports: NodeRef<'_>,
        name: Ident,
        arity: usize,
    ) -> Option<NamespaceOrType> {
        let text = self.interner.resolve(name);
        for using in imports.usings() {
            if let Some(alias) = using.child_node(SyntaxKind::NameEquals) {
                let alias_name = alias.name().map_or("", |n| n.identifier_text());
                if arity == 0 && alias_name == text {
                    return self.resolve_using_target(using);
                }
                continue;
            }
            let is_static = using.token(SyntaxKind::StaticKeyword).is_some();
            let found = match self.resolve_using_target(using) {
                Some(NamespaceOrType::Namespace(ns)) if !is_static => {
                    match self.namespace_member(ns, name, arity) {
                        Some(NamespaceOrType::Type(t)) => Some(NamespaceOrType::Type(t)),
                        _ => None,
                    }
                }
                Some(NamespaceOrType::Type(t)) if is_static => t
                    .definition()
                    .and_then(|def| self.nested_type(def, name, arity))
                    .map(|nested| NamespaceOrType::Type(TypeRef::named(nested))),
                _ => None,
            };
            if found.is_some() {
                return found;
            }
        }
        None
    }

    /// Resolves the target of a `using` directive. Targets are resolved
    /// against the enclosing namespaces only, never against other directives.
    pub(crate) fn resolve_using_target(&self, using: NodeRef<'_>) -> Option<NamespaceOrType> {
        let target = using.name()?;
        let start = using
            .parent()
            .and_then(|p| self.declared_at(p))
            .unwrap_or(self.global);
        let mut current = Some(start);
        while let Some(ns) = current {
            if let Some(found) = self.resolve_in_namespace(target, ns) {
                return Some(found);
            }
            current = self.symbols[ns].container;
        }
        None
    }

    fn resolve_in_namespace(&self, node: NodeRef<'_>, ns: SymbolId) -> Option<NamespaceOrType> {
        match node.kind() {
            SyntaxKind::PredefinedType => {
                let token = node.child_tokens().next()?;
                SpecialType::from_keyword(token.kind())
                    .map(|s| NamespaceOrType::Type(self.special_type(s)))
            }
            SyntaxKind::IdentifierName => self.namespace_member(ns, self.ident_of(node)?, 0),
            SyntaxKind::GenericName => {
                let args: Vec<TypeRef> = type_argument_nodes(node)
                    .map(|arg| match self.resolve_in_namespace(arg, ns) {
                        Some(NamespaceOrType::Type(t)) => t,
                        _ => TypeRef::Unknown,
                    })
                    .collect();
                let found = self.namespace_member(ns, self.ident_of(node)?, args.len())?;
                Some(with_type_args(found, args))
            }
            SyntaxKind::QualifiedName => {
                let left = self.resolve_in_namespace(node.left()?, ns)?;
                let right = node.name()?;
                let args: Vec<TypeRef> = type_argument_nodes(right)
                    .map(|arg| match self.resolve_in_namespace(arg, ns) {
                        Some(NamespaceOrType::Type(t)) => t,
                        _ => TypeRef::Unknown,
                    })
                    .collect();
                self.member_of(left, right, args)
            }
            SyntaxKind::AliasQualifiedName => {
                let right = node.name()?;
                self.member_of(NamespaceOrType::Namespace(self.global), right, Vec::new())
            }
            _ => None,
        }
    }

    /// Looks up the simple name `right` inside a resolved namespace or type.
    fn member_of(
        &self,
        left: NamespaceOrType,
        right: NodeRef<'_>,
        args: Vec<TypeRef>,
    ) -> Option<NamespaceOrType> {
        let name = self.ident_of(right)?;
        let found = match left {
            NamespaceOrType::Namespace(ns) => self.namespace_member(ns, name, args.len())?,
            NamespaceOrType::Type(t) => {
                let nested = self.nested_type(t.definition()?, name, args.len())?;
                NamespaceOrType::Type(TypeRef::named(nested))
            }
        };
        Some(with_type_args(found, args))
    }

    /// Resolves a name in namespace-or-type position from its own location.
    pub(crate) fn resolve_namespace_or_type(&self, node: NodeRef<'_>) -> Option<NamespaceOrType> {
        match node.kind() {
            SyntaxKind::IdentifierName => {
                self.lookup_namespace_or_type(node, self.ident_of(node)?, 0)
            }
            SyntaxKind::GenericName => {
                let args = self.type_arguments(node);
                let found = self.lookup_namespace_or_type(node, self.ident_of(node)?, args.len())?;
                Some(with_type_args(found, args))
            }
            SyntaxKind::QualifiedName => {
                let left = self.resolve_namespace_or_type(node.left()?)?;
                let right = node.name()?;
                let args = self.type_arguments(right);
                self.member_of(left, right, args)
            }
            SyntaxKind::AliasQualifiedName => {
                let alias = node.nth_child_node(0)?;
                let right = node.name()?;
                let left = if alias.token(SyntaxKind::GlobalKeyword).is_some()
                    || alias.identifier_text() == "global"
                {
                    NamespaceOrType::Namespace(self.global)
                } else {
                    self.lookup_namespace_or_type(alias, self.ident_of(alias)?, 0)?
                };
                let args = self.type_arguments(right);
                self.member_of(left, right, args)
            }
            _ => self.resolve_type_syntax(node).map(NamespaceOrType::Type),
        }
    }

    /// Resolves the type arguments of a generic name; unresolvable
    /// arguments become [`TypeRef::Unknown`].
    pub(crate) fn type_arguments(&self, node: NodeRef<'_>) -> Vec<TypeRef> {
        type_argument_nodes(node)
            .map(|arg| self.resolve_type_syntax(arg).unwrap_or(TypeRef::Unknown))
            .collect()
    }

    /// Resolves a type syntax node from its own location.
    pub(crate) fn resolve_type_syntax(&self, node: NodeRef<'_>) -> Option<TypeRef> {
        match node.kind() {
            SyntaxKind::PredefinedType => {
                let token = node.child_tokens().next()?;
                SpecialType::from_keyword(token.kind()).map(|s| self.special_type(s))
            }
            SyntaxKind::IdentifierName
            | SyntaxKind::GenericName
            | SyntaxKind::QualifiedName
            | SyntaxKind::AliasQualifiedName => match self.resolve_namespace_or_type(node)? {
                NamespaceOrType::Type(t) => Some(t),
                NamespaceOrType::Namespace(_) => None,
            },
            SyntaxKind::NullableType => {
                let inner = self.resolve_type_syntax(node.nth_child_node(0)?)?;
                Some(TypeRef::Nullable(Box::new(inner)))
            }
            SyntaxKind::ArrayType => {
                let mut ty = self.resolve_type_syntax(node.nth_child_node(0)?)?;
                let ranks = node
                    .child_nodes()
                    .filter(|n| n.kind() == SyntaxKind::ArrayRankSpecifier)
                    .count()
                    .max(1);
                for _ in 0..ranks {
                    ty = TypeRef::Array(Box::new(ty));
                }
                Some(ty)
            }
            SyntaxKind::TupleType => Some(TypeRef::Tuple(
                node.child_nodes()
                    .filter(|n| n.kind() == SyntaxKind::TupleElement)
                    .map(|element| {
                        element
                            .declared_type()
                            .and_then(|t| self.resolve_type_syntax(t))
                            .unwrap_or(TypeRef::Unknown)
                    })
                    .collect(),
            )),
            SyntaxKind::OmittedTypeArgument => Some(TypeRef::Unknown),
            _ => None,
        }
    }

    /// The type for a predefined keyword: the `System` definition when the
    /// compilation declares it, otherwise [`TypeRef::Special`].
    pub fn special_type(&self, special: SpecialType) -> TypeRef {
        if special == SpecialType::Void {
            return TypeRef::Special(special);
        }
        let system = self
            .interner
            .get("System")
            .and_then(|name| self.namespace_member(self.global, name, 0));
        let found = match (system, self.interner.get(special.system_name())) {
            (Some(NamespaceOrType::Namespace(ns)), Some(name)) => self.namespace_member(ns, name, 0),
            _ => None,
        };
        match found {
            Some(NamespaceOrType::Type(t)) => t,
            _ => TypeRef::Special(special),
        }
    }
}

fn type_argument_nodes<'a>(node: NodeRef<'a>) -> impl Iterator<Item = NodeRef<'a>> + 'a {
    node.child_node(SyntaxKind::TypeArgumentList)
        .into_iter()
        .flat_map(|list| list.child_nodes())
}

fn with_type_args(found: NamespaceOrType, args: Vec<TypeRef>) -> NamespaceOrType {
    match found {
        NamespaceOrType::Type(TypeRef::Named { definition, .. }) if !args.is_empty() => {
            NamespaceOrType::Type(TypeRef::Named { definition, args })
        }
        other => other,
    }
}
