//! Per-file binding of names and expressions.
//!
//! A [`SemanticModel`] answers "what does this node refer to" and "what is
//! its type" for nodes of one compilation. Results are computed on demand;
//! the only cached state lives in the [`Compilation`] itself. Binding is
//! best effort: anything the binder does not understand yields `None`
//! rather than an error.

use crate::compilation::Compilation;
use crate::lookup::NamespaceOrType;
use crate::symbol::{MethodKind, SymbolId, SymbolKind, TypeKind};
use crate::types::{SpecialType, TypeRef};
use std::cell::Cell;
use vssdk_common::Ident;
use vssdk_syntax::{NodeRef, SyntaxKind, SyntaxTree};

const MAX_BIND_DEPTH: u32 = 64;

/// What a name or expression denotes.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Binding {
    /// A namespace.
    Namespace(SymbolId),
    /// A type.
    Type(TypeRef),
    /// A value: a local, member, call result or computed expression.
    Value {
        /// The referenced symbol, such as the invoked method.
        symbol: Option<SymbolId>,
        /// The type of the value, when known.
        ty: Option<TypeRef>,
    },
}

impl Binding {
    fn value(symbol: Option<SymbolId>, ty: Option<TypeRef>) -> Option<Binding> {
        Some(Binding::Value { symbol, ty })
    }
}

impl From<NamespaceOrType> for Binding {
    fn from(found: NamespaceOrType) -> Self {
        match found {
            NamespaceOrType::Namespace(ns) => Binding::Namespace(ns),
            NamespaceOrType::Type(t) => Binding::Type(t),
        }
    }
}

/// Binder for the nodes of one file.
pub struct SemanticModel<'c> {
    compilation: &'c Compilation,
    tree: &'c SyntaxTree,
    depth: Cell<u32>,
}

impl<'c> SemanticModel<'c> {
    pub(crate) fn new(compilation: &'c Compilation, tree: &'c SyntaxTree) -> Self {
        Self {
            compilation,
            tree,
            depth: Cell::new(0),
        }
    }

    /// The compilation this model binds against.
    pub fn compilation(&self) -> &'c Compilation {
        self.compilation
    }

    /// The tree this model was created for.
    pub fn tree(&self) -> &'c SyntaxTree {
        self.tree
    }

    /// The symbol declared by a declaration node.
    pub fn declared_symbol(&self, node: NodeRef<'_>) -> Option<SymbolId> {
        self.compilation.declared_at(node)
    }

    /// The symbol a name, member access, invocation or creation refers to.
    pub fn symbol_info(&self, node: NodeRef<'_>) -> Option<SymbolId> {
        match self.bind(node)? {
            Binding::Namespace(ns) => Some(ns),
            Binding::Type(t) => t.definition(),
            Binding::Value { symbol, .. } => symbol,
        }
    }

    /// The type of an expression, or the type named by a type node.
    pub fn type_of(&self, node: NodeRef<'_>) -> Option<TypeRef> {
        match self.bind(node)? {
            Binding::Namespace(_) => None,
            Binding::Type(t) => Some(t),
            Binding::Value { ty, .. } => ty,
        }
    }

    /// Resolves a node in type position. `var` yields `None`.
    pub fn bind_type(&self, node: NodeRef<'_>) -> Option<TypeRef> {
        if self.is_var(node) {
            return None;
        }
        self.compilation.resolve_type_syntax(node)
    }

    /// The attribute class an attribute refers to. `[Foo]` binds to
    /// `FooAttribute` when such a class exists, otherwise to `Foo`.
    pub fn attribute_class(&self, attribute: NodeRef<'_>) -> Option<SymbolId> {
        let c = self.compilation;
        let name = attribute.name()?;
        let simple = match name.kind() {
            SyntaxKind::QualifiedName | SyntaxKind::AliasQualifiedName => name.name()?,
            _ => name,
        };
        let suffixed = c
            .interner
            .get(&format!("{}Attribute", simple.identifier_text()))
            .and_then(|ident| {
                if simple == name {
                    c.lookup_namespace_or_type(name, ident, 0)
                } else {
                    match c.resolve_namespace_or_type(name.left()?)? {
                        NamespaceOrType::Namespace(ns) => c.namespace_member(ns, ident, 0),
                        NamespaceOrType::Type(t) => c
                            .nested_type(t.definition()?, ident, 0)
                            .map(|n| NamespaceOrType::Type(TypeRef::named(n))),
                    }
                }
            });
        let found = suffixed.or_else(|| c.resolve_namespace_or_type(name))?;
        match found {
            NamespaceOrType::Type(t) => t
                .definition()
                .filter(|&d| c.symbol(d).type_kind() == Some(TypeKind::Class)),
            NamespaceOrType::Namespace(_) => None,
        }
    }

    /// The type of a symbol. Locals declared with `var` are inferred from
    /// their initializer or iteration source.
    pub fn symbol_type(&self, id: SymbolId) -> Option<TypeRef> {
        let c = self.compilation;
        let symbol = c.symbol(id);
        if let Some(ty) = &symbol.ty {
            return Some(ty.clone());
        }
        if !matches!(symbol.kind, SymbolKind::Local | SymbolKind::Parameter) {
            return None;
        }
        let node = c.declaring_nodes(id).next()?;
        self.local_type(node)
    }

    /// The innermost member or function symbol containing `node`; local
    /// functions count, lambdas do not.
    pub fn enclosing_symbol(&self, node: NodeRef<'_>) -> Option<SymbolId> {
        let c = self.compilation;
        node.ancestors().find_map(|a| {
            c.declared_at(a).filter(|&id| {
                !matches!(
                    c.symbol(id).kind,
                    SymbolKind::Local | SymbolKind::Parameter | SymbolKind::Namespace
                )
            })
        })
    }

    /// The innermost type declaration symbol containing `node`.
    pub fn enclosing_type(&self, node: NodeRef<'_>) -> Option<SymbolId> {
        node.enclosing_type()
            .and_then(|t| self.compilation.declared_at(t))
    }

    /// Binds `node`. Deeply nested or self-referential inference gives up
    /// and returns `None`.
    pub fn bind(&self, node: NodeRef<'_>) -> Option<Binding> {
        let depth = self.depth.get();
        if depth >= MAX_BIND_DEPTH {
            return None;
        }
        self.depth.set(depth + 1);
        let result = self.bind_node(node);
        self.depth.set(depth);
        result
    }

    fn bind_node(&self, node: NodeRef<'_>) -> Option<Binding> {
        let c = self.compilation;
        match node.kind() {
            SyntaxKind::IdentifierName | SyntaxKind::GenericName => {
                if let Some(parent) = node.parent() {
                    let is_name_part = matches!(
                        parent.kind(),
                        SyntaxKind::MemberAccessExpression
                            | SyntaxKind::MemberBindingExpression
                            | SyntaxKind::QualifiedName
                            | SyntaxKind::AliasQualifiedName
                    ) && parent.name() == Some(node);
                    if is_name_part {
                        return self.bind(parent);
                    }
                    if parent.kind() == SyntaxKind::Attribute {
                        return self
                            .attribute_class(parent)
                            .map(|class| Binding::Type(TypeRef::named(class)));
                    }
                }
                if is_type_position(node) {
                    if self.is_var(node) {
                        return None;
                    }
                    return c.resolve_namespace_or_type(node).map(Binding::from);
                }
                self.bind_simple_name(node)
            }
            SyntaxKind::QualifiedName | SyntaxKind::AliasQualifiedName => {
                match node.parent() {
                    Some(parent) if parent.kind() == SyntaxKind::Attribute => self
                        .attribute_class(parent)
                        .map(|class| Binding::Type(TypeRef::named(class))),
                    _ => c.resolve_namespace_or_type(node).map(Binding::from),
                }
            }
            SyntaxKind::PredefinedType
            | SyntaxKind::NullableType
            | SyntaxKind::ArrayType
            | SyntaxKind::TupleType => c.resolve_type_syntax(node).map(Binding::Type),
            SyntaxKind::MemberAccessExpression => self.bind_member_access(node),
            SyntaxKind::MemberBindingExpression => {
                let receiver = conditional_receiver(node)?;
                self.bind_member(node, receiver)
            }
            SyntaxKind::InvocationExpression => self.bind_invocation(node),
            SyntaxKind::ObjectCreationExpression => {
                let ty = node.declared_type().and_then(|t| self.bind_type(t));
                let ctor = ty.as_ref().and_then(|t| self.constructor(t, node));
                Binding::value(ctor, ty)
            }
            SyntaxKind::ImplicitObjectCreationExpression => {
                let ty = self.target_type(node);
                let ctor = ty.as_ref().and_then(|t| self.constructor(t, node));
                Binding::value(ctor, ty)
            }
            SyntaxKind::ArrayCreationExpression => {
                Binding::value(None, node.declared_type().and_then(|t| self.bind_type(t)))
            }
            SyntaxKind::ImplicitArrayCreationExpression => {
                let element = node
                    .child_node(SyntaxKind::InitializerExpression)
                    .and_then(|init| init.nth_child_node(0))
                    .and_then(|first| self.type_of(first));
                Binding::value(None, element.map(|e| TypeRef::Array(Box::new(e))))
            }
            SyntaxKind::CastExpression => {
                Binding::value(None, node.declared_type().and_then(|t| self.bind_type(t)))
            }
            SyntaxKind::BinaryExpression => self.bind_binary(node),
            SyntaxKind::IsPatternExpression => Binding::value(None, Some(self.bool_type())),
            SyntaxKind::AwaitExpression => {
                let awaited = self.type_of(node.expression()?)?;
                Binding::value(None, self.awaited_type(&awaited))
            }
            SyntaxKind::ParenthesizedExpression
            | SyntaxKind::CheckedExpression
            | SyntaxKind::Argument => self.bind(node.expression()?),
            SyntaxKind::ConditionalAccessExpression => {
                let ty = self.type_of(node.when_not_null()?);
                Binding::value(None, ty)
            }
            SyntaxKind::PostfixUnaryExpression => {
                let operand = node.nth_child_node(0)?;
                if node.operator_kind() == Some(SyntaxKind::Exclamation) {
                    return self.bind(operand);
                }
                Binding::value(None, self.type_of(operand))
            }
            SyntaxKind::PrefixUnaryExpression => {
                if node.operator_kind() == Some(SyntaxKind::Exclamation) {
                    return Binding::value(None, Some(self.bool_type()));
                }
                Binding::value(None, self.type_of(node.expression()?))
            }
            SyntaxKind::AssignmentExpression => Binding::value(None, self.type_of(node.left()?)),
            SyntaxKind::ConditionalExpression => {
                let ty = node
                    .nth_child_node(1)
                    .and_then(|n| self.type_of(n))
                    .or_else(|| node.nth_child_node(2).and_then(|n| self.type_of(n)));
                Binding::value(None, ty)
            }
            SyntaxKind::LiteralExpression => Binding::value(None, self.literal_type(node)),
            SyntaxKind::ThisExpression => {
                let ty = self.enclosing_type(node).map(|t| c.self_type(t));
                Binding::value(None, ty)
            }
            SyntaxKind::BaseExpression => {
                let ty = self
                    .enclosing_type(node)
                    .and_then(|t| c.symbol(t).base.clone());
                Binding::value(None, ty)
            }
            SyntaxKind::TypeOfExpression => {
                let ty = c.type_by_qualified_name("System.Type").map(TypeRef::named);
                Binding::value(None, ty)
            }
            SyntaxKind::SizeOfExpression => {
                Binding::value(None, Some(c.special_type(SpecialType::Int)))
            }
            SyntaxKind::DefaultExpression => {
                Binding::value(None, node.declared_type().and_then(|t| self.bind_type(t)))
            }
            SyntaxKind::ElementAccessExpression => {
                let receiver = node.expression()?;
                self.bind_element(node, receiver)
            }
            SyntaxKind::ElementBindingExpression => {
                let receiver = conditional_receiver(node)?;
                self.bind_element(node, receiver)
            }
            SyntaxKind::DeclarationExpression => {
                let local = node.designation().and_then(|d| c.declared_at(d));
                let ty = local.and_then(|l| self.symbol_type(l));
                Binding::value(local, ty)
            }
            SyntaxKind::TupleExpression => {
                let items = node
                    .child_nodes()
                    .map(|a| self.type_of(a).unwrap_or(TypeRef::Unknown))
                    .collect();
                Binding::value(None, Some(TypeRef::Tuple(items)))
            }
            SyntaxKind::SwitchExpression => {
                let ty = node
                    .child_nodes()
                    .filter(|n| n.kind() == SyntaxKind::SwitchExpressionArm)
                    .find_map(|arm| arm.child_nodes().last().and_then(|e| self.type_of(e)));
                Binding::value(None, ty)
            }
            kind if kind.is_anonymous_function() => Binding::value(None, None),
            SyntaxKind::ThrowExpression
            | SyntaxKind::AnonymousObjectCreationExpression
            | SyntaxKind::InitializerExpression => Binding::value(None, None),
            _ => None,
        }
    }

    fn bind_simple_name(&self, node: NodeRef<'_>) -> Option<Binding> {
        let c = self.compilation;
        let name = c.ident_of(node)?;
        let generic = node.kind() == SyntaxKind::GenericName;
        let type_args = if generic {
            c.type_arguments(node)
        } else {
            Vec::new()
        };
        let argument_count = invocation_argument_count(node);

        if let Some(local) = self.lookup_local(node, name) {
            let symbol = c.symbol(local);
            if symbol.method_kind() == Some(MethodKind::LocalFunction) {
                return self.select_member(&[local], None, argument_count, &type_args);
            }
            if !generic {
                return Binding::value(Some(local), self.symbol_type(local));
            }
        }

        for ty in node
            .ancestors()
            .filter(|a| a.kind().is_type_declaration())
            .filter_map(|a| c.declared_at(a))
        {
            let candidates = c.lookup_members_ident(ty, name);
            if candidates.is_empty() {
                continue;
            }
            let receiver = c.self_type(ty);
            if let Some(found) =
                self.select_member(&candidates, Some(&receiver), argument_count, &type_args)
            {
                return Some(found);
            }
        }

        if let Some(found) = c.lookup_namespace_or_type(node, name, type_args.len()) {
            return Some(match found {
                NamespaceOrType::Type(TypeRef::Named { definition, .. }) => {
                    Binding::Type(TypeRef::Named {
                        definition,
                        args: type_args,
                    })
                }
                other => other.into(),
            });
        }

        self.lookup_static_import(node, name, argument_count, &type_args)
    }

    /// Members reachable through `using static` directives.
    fn lookup_static_import(
        &self,
        node: NodeRef<'_>,
        name: Ident,
        argument_count: Option<usize>,
        type_args: &[TypeRef],
    ) -> Option<Binding> {
        let c = self.compilation;
        node.ancestors()
            .filter(|a| {
                matches!(
                    a.kind(),
                    SyntaxKind::CompilationUnit
                        | SyntaxKind::NamespaceDeclaration
                        | SyntaxKind::FileScopedNamespaceDeclaration
                )
            })
            .flat_map(|scope| scope.usings())
            .filter(|using| using.token(SyntaxKind::StaticKeyword).is_some())
            .find_map(|using| {
                let NamespaceOrType::Type(ty) = c.resolve_using_target(using)? else {
                    return None;
                };
                let candidates = c.lookup_members_ident(ty.definition()?, name);
                self.select_member(&candidates, Some(&ty), argument_count, type_args)
            })
    }

    fn bind_member_access(&self, node: NodeRef<'_>) -> Option<Binding> {
        let c = self.compilation;
        let receiver = node.expression()?;
        match self.bind(receiver)? {
            Binding::Namespace(ns) => {
                let name_node = node.name()?;
                let args = c.type_arguments(name_node);
                let found = c.namespace_member(ns, c.ident_of(name_node)?, args.len())?;
                Some(match found {
                    NamespaceOrType::Type(TypeRef::Named { definition, .. }) => {
                        Binding::Type(TypeRef::Named { definition, args })
                    }
                    other => other.into(),
                })
            }
            Binding::Type(ty) => self.member_of_type(node, &ty),
            Binding::Value { ty, .. } => self.member_of_type(node, &ty?),
        }
    }

    /// Binds the member named by `node` (a member access or member binding)
    /// on the value of `receiver`.
    fn bind_member(&self, node: NodeRef<'_>, receiver: NodeRef<'_>) -> Option<Binding> {
        match self.bind(receiver)? {
            Binding::Type(ty) => self.member_of_type(node, &ty),
            Binding::Value { ty, .. } => self.member_of_type(node, &strip_nullable(ty?)),
            Binding::Namespace(_) => None,
        }
    }

    fn member_of_type(&self, node: NodeRef<'_>, ty: &TypeRef) -> Option<Binding> {
        let c = self.compilation;
        let name_node = node.name()?;
        let name = c.ident_of(name_node)?;
        let type_args = c.type_arguments(name_node);
        let def = self.member_lookup_type(ty)?;
        let candidates = c.lookup_members_ident(def, name);
        self.select_member(&candidates, Some(ty), invocation_argument_count(node), &type_args)
    }

    /// The named type whose members are searched for a receiver of `ty`.
    fn member_lookup_type(&self, ty: &TypeRef) -> Option<SymbolId> {
        let c = self.compilation;
        match ty {
            TypeRef::Array(_) => c.type_by_qualified_name("System.Array"),
            TypeRef::Special(special) => {
                c.type_by_qualified_name(&format!("System.{}", special.system_name()))
            }
            _ => ty.definition(),
        }
    }

    /// Picks among same-named members: with an argument count, the first
    /// applicable method; without one, a non-method member first.
    fn select_member(
        &self,
        candidates: &[SymbolId],
        receiver: Option<&TypeRef>,
        argument_count: Option<usize>,
        type_args: &[TypeRef],
    ) -> Option<Binding> {
        let c = self.compilation;
        let method_fits = |m: SymbolId| {
            let symbol = c.symbol(m);
            symbol.is_method() && (type_args.is_empty() || symbol.arity() == type_args.len())
        };
        let not_method = |m: &SymbolId| !c.symbol(*m).is_method();
        let chosen = match argument_count {
            Some(count) => candidates
                .iter()
                .copied()
                .find(|&m| method_fits(m) && c.accepts_argument_count(m, count))
                .or_else(|| candidates.iter().copied().find(not_method)),
            None => candidates
                .iter()
                .copied()
                .find(not_method)
                .or_else(|| candidates.iter().copied().find(|&m| method_fits(m))),
        }?;
        let symbol = c.symbol(chosen);
        if symbol.is_type() {
            return Some(Binding::Type(TypeRef::Named {
                definition: chosen,
                args: type_args.to_vec(),
            }));
        }
        let ty = if symbol.is_method() {
            let method_map: Vec<(SymbolId, TypeRef)> = symbol
                .type_parameters
                .iter()
                .copied()
                .zip(type_args.iter().cloned())
                .collect();
            c.member_type(chosen, receiver)
                .map(|t| t.substitute(&method_map))
        } else if c.is_local_like(chosen) {
            self.symbol_type(chosen)
        } else {
            c.member_type(chosen, receiver)
        };
        Binding::value(Some(chosen), ty)
    }

    fn bind_invocation(&self, node: NodeRef<'_>) -> Option<Binding> {
        let c = self.compilation;
        let target = node.expression()?;
        match self.bind(target) {
            Some(Binding::Value {
                symbol: Some(method),
                ty,
            }) if c.symbol(method).is_method() => Binding::value(Some(method), ty),
            Some(Binding::Value { ty: Some(ty), .. }) => {
                Binding::value(None, self.delegate_return_type(&ty))
            }
            _ => Binding::value(None, None),
        }
    }

    /// The return type of invoking a value of delegate type `ty`.
    fn delegate_return_type(&self, ty: &TypeRef) -> Option<TypeRef> {
        let c = self.compilation;
        let def = ty.definition()?;
        if c.symbol(def).type_kind() != Some(TypeKind::Delegate) {
            return None;
        }
        let map = c.substitution(ty);
        c.symbol(def).ty.as_ref().map(|t| t.substitute(&map))
    }

    fn constructor(&self, ty: &TypeRef, creation: NodeRef<'_>) -> Option<SymbolId> {
        let c = self.compilation;
        let def = ty.definition()?;
        let count = creation.arguments().count();
        c.symbol(def).members.iter().copied().find(|&m| {
            c.symbol(m).method_kind() == Some(MethodKind::Constructor)
                && c.name(m) == ".ctor"
                && c.accepts_argument_count(m, count)
        })
    }

    fn bind_binary(&self, node: NodeRef<'_>) -> Option<Binding> {
        let left = node.left()?;
        let ty = match node.operator_text().as_str() {
            "as" => node.declared_type().and_then(|t| self.bind_type(t)),
            "??" => self
                .type_of(left)
                .map(strip_nullable)
                .or_else(|| node.right().and_then(|r| self.type_of(r))),
            "==" | "!=" | "<" | ">" | "<=" | ">=" | "&&" | "||" => Some(self.bool_type()),
            _ => self.type_of(left),
        };
        Binding::value(None, ty)
    }

    fn bind_element(&self, node: NodeRef<'_>, receiver: NodeRef<'_>) -> Option<Binding> {
        let c = self.compilation;
        let receiver_ty = strip_nullable(self.type_of(receiver)?);
        if let TypeRef::Array(element) = receiver_ty {
            return Binding::value(None, Some(*element));
        }
        let def = receiver_ty.definition()?;
        let count = node.arguments().count();
        let indexer = c
            .lookup_members(def, "this[]")
            .into_iter()
            .find(|&p| c.accepts_argument_count(p, count))?;
        Binding::value(Some(indexer), c.member_type(indexer, Some(&receiver_ty)))
    }

    /// The result type of `await` on a value of type `ty`: the awaiter's
    /// `GetResult` return type, or the single type argument of a task-like
    /// type when no awaiter is declared.
    fn awaited_type(&self, ty: &TypeRef) -> Option<TypeRef> {
        let c = self.compilation;
        let def = ty.definition()?;
        let from_awaiter = c
            .lookup_members(def, "GetAwaiter")
            .into_iter()
            .find(|&m| c.accepts_argument_count(m, 0))
            .and_then(|get_awaiter| c.member_type(get_awaiter, Some(ty)))
            .and_then(|awaiter| {
                let awaiter_def = awaiter.definition()?;
                let get_result = c
                    .lookup_members(awaiter_def, "GetResult")
                    .into_iter()
                    .next()?;
                c.member_type(get_result, Some(&awaiter))
            });
        if from_awaiter.is_some() {
            return from_awaiter;
        }
        match (c.name(def), ty.args()) {
            ("Task" | "ValueTask" | "JoinableTask", [result]) => Some(result.clone()),
            ("Task" | "ValueTask" | "JoinableTask", []) => Some(TypeRef::Special(SpecialType::Void)),
            _ => None,
        }
    }

    fn literal_type(&self, node: NodeRef<'_>) -> Option<TypeRef> {
        let c = self.compilation;
        let token = node.child_tokens().next()?;
        let special = match token.kind() {
            SyntaxKind::StringLiteral => SpecialType::String,
            SyntaxKind::CharacterLiteral => SpecialType::Char,
            SyntaxKind::TrueKeyword | SyntaxKind::FalseKeyword => SpecialType::Bool,
            SyntaxKind::NumericLiteral => numeric_literal_type(token.text()),
            SyntaxKind::DefaultKeyword => return self.target_type(node),
            _ => return None,
        };
        Some(c.special_type(special))
    }

    fn bool_type(&self) -> TypeRef {
        self.compilation.special_type(SpecialType::Bool)
    }

    /// The type a target-typed expression converts to: the declared type of
    /// the variable it initializes or the type of the assignment target.
    fn target_type(&self, node: NodeRef<'_>) -> Option<TypeRef> {
        let parent = node.parent()?;
        match parent.kind() {
            SyntaxKind::EqualsValueClause => {
                let owner = parent.parent()?;
                match owner.kind() {
                    SyntaxKind::VariableDeclarator => {
                        let declaration = owner.parent()?;
                        self.bind_type(declaration.nth_child_node(0)?)
                    }
                    SyntaxKind::PropertyDeclaration | SyntaxKind::Parameter => {
                        self.bind_type(owner.declared_type()?)
                    }
                    _ => None,
                }
            }
            SyntaxKind::AssignmentExpression if parent.right() == Some(node) => {
                self.type_of(parent.left()?)
            }
            SyntaxKind::ReturnStatement | SyntaxKind::ArrowExpressionClause => {
                let function = node.enclosing_function()?;
                let method = self.compilation.declared_at(function)?;
                self.compilation.symbol(method).ty.clone()
            }
            _ => None,
        }
    }

    fn lookup_local(&self, node: NodeRef<'_>, name: Ident) -> Option<SymbolId> {
        let tree = node.tree();
        let entries = self.compilation.locals.get(&(tree.file(), name))?;
        entries
            .iter()
            .filter_map(|entry| {
                let scope = tree.try_node(entry.scope)?;
                (scope == node || scope.is_ancestor_of(node)).then_some((scope.id(), entry.symbol))
            })
            .max_by_key(|&(scope, _)| scope)
            .map(|(_, symbol)| symbol)
    }

    fn local_type(&self, node: NodeRef<'_>) -> Option<TypeRef> {
        match node.kind() {
            SyntaxKind::VariableDeclarator => {
                let declaration = node.parent()?;
                let type_node = declaration.nth_child_node(0)?;
                if self.is_var(type_node) {
                    self.type_of(node.initializer_value()?)
                } else {
                    self.bind_type(type_node)
                }
            }
            SyntaxKind::ForEachStatement => {
                let type_node = node.declared_type()?;
                if self.is_var(type_node) {
                    let source = self.type_of(node.expression()?)?;
                    element_type(&source)
                } else {
                    self.bind_type(type_node)
                }
            }
            SyntaxKind::CatchDeclaration | SyntaxKind::Parameter => {
                self.bind_type(node.declared_type()?)
            }
            SyntaxKind::SingleVariableDesignation => {
                let parent = node.parent()?;
                match parent.kind() {
                    SyntaxKind::DeclarationPattern
                    | SyntaxKind::RecursivePattern
                    | SyntaxKind::DeclarationExpression => self.bind_type(parent.declared_type()?),
                    SyntaxKind::VarPattern => {
                        let test = parent
                            .ancestors()
                            .find(|a| a.kind() == SyntaxKind::IsPatternExpression)?;
                        self.type_of(test.left()?)
                    }
                    _ => None,
                }
            }
            _ => None,
        }
    }

    /// `var` used as a type, when no type named `var` is in scope.
    fn is_var(&self, node: NodeRef<'_>) -> bool {
        node.kind() == SyntaxKind::IdentifierName
            && node.identifier_text() == "var"
            && self.compilation.resolve_type_syntax(node).is_none()
    }
}

/// Returns `true` if a simple name sits where only a namespace or type can
/// appear.
fn is_type_position(node: NodeRef<'_>) -> bool {
    let Some(parent) = node.parent() else {
        return false;
    };
    match parent.kind() {
        SyntaxKind::TypeArgumentList
        | SyntaxKind::ArrayType
        | SyntaxKind::NullableType
        | SyntaxKind::PointerType
        | SyntaxKind::SimpleBaseType
        | SyntaxKind::TypeConstraint
        | SyntaxKind::TupleElement
        | SyntaxKind::ExplicitInterfaceSpecifier
        | SyntaxKind::UsingDirective
        | SyntaxKind::NamespaceDeclaration
        | SyntaxKind::FileScopedNamespaceDeclaration
        | SyntaxKind::QualifiedName
        | SyntaxKind::AliasQualifiedName => true,
        _ => parent.declared_type() == Some(node),
    }
}

/// Number of arguments when `node` names the target of an invocation.
fn invocation_argument_count(node: NodeRef<'_>) -> Option<usize> {
    let parent = node.parent()?;
    match parent.kind() {
        SyntaxKind::MemberAccessExpression | SyntaxKind::MemberBindingExpression
            if parent.name() == Some(node) =>
        {
            invocation_argument_count(parent)
        }
        SyntaxKind::InvocationExpression if parent.expression() == Some(node) => {
            Some(parent.arguments().count())
        }
        _ => None,
    }
}

/// The receiver expression of the conditional access that a member or
/// element binding belongs to.
fn conditional_receiver(node: NodeRef<'_>) -> Option<NodeRef<'_>> {
    node.ancestors()
        .filter(|a| a.kind() == SyntaxKind::ConditionalAccessExpression)
        .find(|access| {
            access
                .when_not_null()
                .is_some_and(|tail| tail == node || tail.is_ancestor_of(node))
        })
        .and_then(|access| access.expression())
}

fn strip_nullable(ty: TypeRef) -> TypeRef {
    match ty {
        TypeRef::Nullable(inner) => *inner,
        other => other,
    }
}

fn element_type(ty: &TypeRef) -> Option<TypeRef> {
    match ty {
        TypeRef::Array(element) => Some((**element).clone()),
        TypeRef::Named { args, .. } if args.len() == 1 => Some(args[0].clone()),
        _ => None,
    }
}

fn numeric_literal_type(text: &str) -> SpecialType {
    let lower = text.to_ascii_lowercase();
    if lower.starts_with("0x") || lower.starts_with("0b") {
        return if lower.ends_with('l') {
            SpecialType::Long
        } else {
            SpecialType::Int
        };
    }
    if lower.ends_with('m') {
        SpecialType::Decimal
    } else if lower.ends_with('f') {
        SpecialType::Float
    } else if lower.ends_with('d') || lower.contains('.') || lower.contains('e') {
        SpecialType::Double
    } else if lower.ends_with("ul") || lower.ends_with("lu") {
        SpecialType::ULong
    } else if lower.ends_with('l') {
        SpecialType::Long
    } else if lower.ends_with('u') {
        SpecialType::UInt
    } else {
        SpecialType::Int
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_literal_suffixes() {
        assert_eq!(numeric_literal_type("42"), SpecialType::Int);
        assert_eq!(numeric_literal_type("42L"), SpecialType::Long);
        assert_eq!(numeric_literal_type("1.5"), SpecialType::Double);
        assert_eq!(numeric_literal_type("1.5f"), SpecialType::Float);
        assert_eq!(numeric_literal_type("0xFF"), SpecialType::Int);
        assert_eq!(numeric_literal_type("10m"), SpecialType::Decimal);
        assert_eq!(numeric_literal_type("7UL"), SpecialType::ULong);
    }

    #[test]
    fn element_type_of_arrays_and_sequences() {
        let int = TypeRef::Special(SpecialType::Int);
        assert_eq!(
            element_type(&TypeRef::Array(Box::new(int.clone()))),
            Some(int.clone())
        );
        let list = TypeRef::Named {
            definition: SymbolId::from_raw(3),
            args: vec![int.clone()],
        };
        assert_eq!(element_type(&list), Some(int));
        assert_eq!(element_type(&TypeRef::Unknown), None);
    }
}
