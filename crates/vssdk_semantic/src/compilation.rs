//! The compiled program: syntax trees plus their declared symbols.
//!
//! A [`Compilation`] is built once from a set of trees and is immutable
//! afterwards. It is `Sync`, so analyzers running on several threads share
//! it by reference. Per-file binding goes through
//! [`Compilation::semantic_model`].

use crate::arena::Arena;
use crate::declare::{self, LocalScope};
use crate::lookup::NamespaceOrType;
use crate::model::SemanticModel;
use crate::resolve;
use crate::symbol::{accepts_argument_count, DeclRef, Modifiers, Symbol, SymbolId, SymbolKind};
use crate::types::TypeRef;
use std::collections::{HashMap, HashSet};
use tracing::debug;
use vssdk_common::{Ident, Interner};
use vssdk_diagnostics::DiagnosticSink;
use vssdk_source::{FileId, SourceDb};
use vssdk_syntax::{NodeId, NodeRef, SyntaxTree};

/// A set of syntax trees with resolved declarations.
pub struct Compilation {
    pub(crate) trees: Vec<SyntaxTree>,
    tree_index: HashMap<FileId, usize>,
    pub(crate) interner: Interner,
    pub(crate) symbols: Arena<SymbolId, Symbol>,
    pub(crate) global: SymbolId,
    pub(crate) declared: HashMap<(FileId, NodeId), SymbolId>,
    pub(crate) locals: HashMap<(FileId, Ident), Vec<LocalScope>>,
}

impl Compilation {
    /// Builds a compilation from already parsed trees.
    pub fn new(trees: Vec<SyntaxTree>) -> Self {
        let interner = Interner::new();
        let declarations = declare::declare(&trees, &interner);
        let tree_index = trees
            .iter()
            .enumerate()
            .map(|(i, tree)| (tree.file(), i))
            .collect();
        let mut compilation = Self {
            trees,
            tree_index,
            interner,
            symbols: declarations.symbols,
            global: declarations.global,
            declared: declarations.declared,
            locals: declarations.locals,
        };
        resolve::resolve(&mut compilation);
        debug!(
            files = compilation.trees.len(),
            symbols = compilation.symbols.len(),
            "compilation built"
        );
        compilation
    }

    /// Parses every file of `db` and builds a compilation from the trees.
    /// Parse errors go to `sink`; the trees are still used.
    pub fn from_source_db(db: &SourceDb, sink: &DiagnosticSink) -> Self {
        let trees = db
            .files()
            .map(|file| vssdk_syntax::parse_file(file.id, db, sink))
            .collect();
        Self::new(trees)
    }

    /// A new compilation in which `tree` replaces the tree of the same file,
    /// or is added if the file is new.
    pub fn with_tree(&self, tree: SyntaxTree) -> Compilation {
        let mut trees = self.trees.clone();
        match self.tree_index.get(&tree.file()) {
            Some(&i) => trees[i] = tree,
            None => trees.push(tree),
        }
        Compilation::new(trees)
    }

    /// All trees, in the order they were supplied.
    pub fn trees(&self) -> &[SyntaxTree] {
        &self.trees
    }

    /// The tree of `file`.
    pub fn tree(&self, file: FileId) -> Option<&SyntaxTree> {
        self.tree_index.get(&file).map(|&i| &self.trees[i])
    }

    /// A binder for nodes of `file`.
    pub fn semantic_model(&self, file: FileId) -> Option<SemanticModel<'_>> {
        self.tree(file).map(|tree| SemanticModel::new(self, tree))
    }

    /// The identifier interner shared by every symbol name.
    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    /// Returns the symbol with the given id.
    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id]
    }

    /// Iterates over every symbol.
    pub fn symbols(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.symbols.iter()
    }

    /// The simple name of a symbol.
    pub fn name(&self, id: SymbolId) -> &str {
        self.interner.resolve(self.symbols[id].name)
    }

    /// The global namespace.
    pub fn global_namespace(&self) -> SymbolId {
        self.global
    }

    /// The symbol declared by `node`, if any.
    pub fn declared_at(&self, node: NodeRef<'_>) -> Option<SymbolId> {
        self.declared.get(&(node.tree().file(), node.id())).copied()
    }

    /// Resolves a declaration reference to its node.
    pub fn node(&self, decl: DeclRef) -> Option<NodeRef<'_>> {
        self.tree(decl.file)?.try_node(decl.node)
    }

    /// Nodes that declare `id`.
    pub fn declaring_nodes(&self, id: SymbolId) -> impl Iterator<Item = NodeRef<'_>> + '_ {
        self.symbols[id]
            .declarations
            .iter()
            .filter_map(|decl| self.node(*decl))
    }

    /// The namespace directly containing `id`, skipping containing types.
    /// `None` for the global namespace.
    pub fn containing_namespace(&self, id: SymbolId) -> Option<SymbolId> {
        let mut current = self.symbols[id].container;
        while let Some(c) = current {
            if self.symbols[c].is_namespace() {
                return Some(c);
            }
            current = self.symbols[c].container;
        }
        None
    }

    /// The innermost type containing `id`.
    pub fn containing_type(&self, id: SymbolId) -> Option<SymbolId> {
        let mut current = self.symbols[id].container;
        while let Some(c) = current {
            if self.symbols[c].is_type() {
                return Some(c);
            }
            current = self.symbols[c].container;
        }
        None
    }

    /// The dotted name of a symbol, such as
    /// `Microsoft.VisualStudio.Shell.AsyncPackage.InitializeAsync`.
    pub fn qualified_name(&self, id: SymbolId) -> String {
        let mut parts = Vec::new();
        let mut current = Some(id);
        while let Some(c) = current {
            if c == self.global {
                break;
            }
            parts.push(self.name(c));
            current = self.symbols[c].container;
        }
        parts.reverse();
        parts.join(".")
    }

    /// Finds a type by its metadata name: dotted namespaces, `+` before
    /// nested types and a `` `n `` suffix for generic arity, as in
    /// ``System.Threading.Tasks.Task`1``.
    pub fn type_by_qualified_name(&self, name: &str) -> Option<SymbolId> {
        let mut nested = name.split('+');
        let outer = nested.next()?;
        let (namespaces, first) = match outer.rsplit_once('.') {
            Some((ns, ty)) => (Some(ns), ty),
            None => (None, outer),
        };
        let mut ns = self.global;
        for segment in namespaces.into_iter().flat_map(|ns| ns.split('.')) {
            let ident = self.interner.get(segment)?;
            match self.namespace_member(ns, ident, 0)? {
                NamespaceOrType::Namespace(inner) => ns = inner,
                NamespaceOrType::Type(_) => return None,
            }
        }
        let (simple, arity) = split_arity(first)?;
        let mut current = match self.namespace_member(ns, self.interner.get(simple)?, arity)? {
            NamespaceOrType::Type(t) => t.definition()?,
            NamespaceOrType::Namespace(_) => return None,
        };
        for segment in nested {
            let (simple, arity) = split_arity(segment)?;
            let ident = self.interner.get(simple)?;
            current = self.symbols[current].members.iter().copied().find(|&m| {
                let member = &self.symbols[m];
                member.name == ident && member.is_type() && member.arity() == arity
            })?;
        }
        Some(current)
    }

    /// The generic definition of a type, with type arguments stripped.
    pub fn original_definition(&self, ty: &TypeRef) -> Option<SymbolId> {
        ty.definition()
    }

    /// The type as seen from inside its own declaration, with its type
    /// parameters as arguments.
    pub fn self_type(&self, def: SymbolId) -> TypeRef {
        TypeRef::Named {
            definition: def,
            args: self.symbols[def]
                .type_parameters
                .iter()
                .map(|&p| TypeRef::Parameter(p))
                .collect(),
        }
    }

    /// Pairs each type parameter of `ty`'s definition with its argument.
    pub fn substitution(&self, ty: &TypeRef) -> Vec<(SymbolId, TypeRef)> {
        match ty.definition() {
            Some(def) => self.symbols[def]
                .type_parameters
                .iter()
                .copied()
                .zip(ty.args().iter().cloned())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Finds `target` among `ty` and its bases and interfaces, with type
    /// arguments carried through each hop. Terminates on cyclic bases.
    pub fn base_instance(&self, ty: &TypeRef, target: SymbolId) -> Option<TypeRef> {
        let mut visited = HashSet::new();
        self.base_instance_inner(ty, target, &mut visited)
    }

    fn base_instance_inner(
        &self,
        ty: &TypeRef,
        target: SymbolId,
        visited: &mut HashSet<SymbolId>,
    ) -> Option<TypeRef> {
        let def = ty.definition()?;
        if def == target {
            return Some(ty.clone());
        }
        if !visited.insert(def) {
            return None;
        }
        let map = self.substitution(ty);
        let symbol = &self.symbols[def];
        symbol
            .base
            .iter()
            .chain(&symbol.interfaces)
            .find_map(|parent| self.base_instance_inner(&parent.substitute(&map), target, visited))
    }

    /// Members named `name` of `ty`, then of its base classes, then of its
    /// interfaces, most derived first.
    pub fn lookup_members(&self, ty: SymbolId, name: &str) -> Vec<SymbolId> {
        match self.interner.get(name) {
            Some(ident) => self.lookup_members_ident(ty, ident),
            None => Vec::new(),
        }
    }

    pub(crate) fn lookup_members_ident(&self, ty: SymbolId, name: Ident) -> Vec<SymbolId> {
        let mut found = Vec::new();
        let mut visited = HashSet::new();
        let mut pending = vec![ty];
        let mut next_round = Vec::new();
        while !pending.is_empty() {
            for def in pending.drain(..) {
                let mut current = Some(def);
                while let Some(c) = current {
                    if !visited.insert(c) {
                        break;
                    }
                    let symbol = &self.symbols[c];
                    found.extend(
                        symbol
                            .members
                            .iter()
                            .copied()
                            .filter(|&m| self.symbols[m].name == name),
                    );
                    next_round.extend(symbol.interfaces.iter().filter_map(TypeRef::definition));
                    current = symbol.base.as_ref().and_then(TypeRef::definition);
                }
            }
            std::mem::swap(&mut pending, &mut next_round);
        }
        found
    }

    /// The type of a field, property, event or parameter as seen through a
    /// receiver of type `receiver`, or the return type of a method.
    pub fn member_type(&self, member: SymbolId, receiver: Option<&TypeRef>) -> Option<TypeRef> {
        let ty = self.symbols[member].ty.as_ref()?;
        let container = self.symbols[member].container;
        let map = match (receiver, container) {
            (Some(receiver), Some(container)) => self
                .base_instance(receiver, container)
                .map(|instance| self.substitution(&instance))
                .unwrap_or_default(),
            _ => Vec::new(),
        };
        Some(ty.substitute(&map))
    }

    /// Returns `true` if `method` can be called with `count` arguments.
    pub fn accepts_argument_count(&self, method: SymbolId, count: usize) -> bool {
        let modifiers: Vec<Modifiers> = self.symbols[method]
            .parameters
            .iter()
            .map(|&p| self.symbols[p].modifiers)
            .collect();
        accepts_argument_count(count, &modifiers)
    }

    /// Returns `true` if `id` is a local, parameter or local function.
    pub fn is_local_like(&self, id: SymbolId) -> bool {
        matches!(
            self.symbols[id].kind,
            SymbolKind::Local | SymbolKind::Parameter
        ) || self.symbols[id].method_kind() == Some(crate::symbol::MethodKind::LocalFunction)
    }
}

fn split_arity(segment: &str) -> Option<(&str, usize)> {
    match segment.split_once('`') {
        Some((name, arity)) => Some((name, arity.parse().ok()?)),
        None => Some((segment, 0)),
    }
}
