//! Declared entities: namespaces, types, members, parameters and locals.

use crate::arena::ArenaId;
use crate::types::TypeRef;
use std::ops::BitOr;
use vssdk_common::Ident;
use vssdk_source::FileId;
use vssdk_syntax::{NodeId, SyntaxKind};

/// Opaque, copyable id of a [`Symbol`] within its compilation.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct SymbolId(u32);

impl SymbolId {
    /// Creates an id from a raw index.
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw index.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

impl ArenaId for SymbolId {
    fn from_raw(index: u32) -> Self {
        Self(index)
    }

    fn as_raw(self) -> u32 {
        self.0
    }
}

/// The syntax node that declares a symbol.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct DeclRef {
    /// File of the declaring tree.
    pub file: FileId,
    /// The declaring node.
    pub node: NodeId,
}

/// The flavor of a type symbol.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum TypeKind {
    /// `class`
    Class,
    /// `struct`
    Struct,
    /// `interface`
    Interface,
    /// `enum`
    Enum,
    /// `delegate`
    Delegate,
}

/// The flavor of a method symbol.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum MethodKind {
    /// A named method.
    Ordinary,
    /// An instance or static constructor.
    Constructor,
    /// A finalizer.
    Destructor,
    /// A user-defined operator or conversion.
    Operator,
    /// A local function inside a body.
    LocalFunction,
}

/// What a symbol is.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum SymbolKind {
    /// A namespace, including the global namespace.
    Namespace,
    /// A named type.
    Type(TypeKind),
    /// A method, constructor, operator or local function.
    Method(MethodKind),
    /// A property or indexer.
    Property,
    /// A field, constant or enum member.
    Field,
    /// An event.
    Event,
    /// A parameter of a method, indexer, delegate or lambda.
    Parameter,
    /// A generic type parameter.
    TypeParameter,
    /// A local variable, pattern variable, `foreach` variable or catch variable.
    Local,
}

/// Declaration modifiers as a small bit set.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Debug)]
pub struct Modifiers(u16);

impl Modifiers {
    /// No modifiers.
    pub const NONE: Self = Self(0);
    /// `static`, or implicitly static (constants, enum members).
    pub const STATIC: Self = Self(1 << 0);
    /// `abstract`
    pub const ABSTRACT: Self = Self(1 << 1);
    /// `virtual`
    pub const VIRTUAL: Self = Self(1 << 2);
    /// `override`
    pub const OVERRIDE: Self = Self(1 << 3);
    /// `sealed`
    pub const SEALED: Self = Self(1 << 4);
    /// `async`
    pub const ASYNC: Self = Self(1 << 5);
    /// `const`
    pub const CONST: Self = Self(1 << 6);
    /// `readonly`
    pub const READONLY: Self = Self(1 << 7);
    /// `partial`
    pub const PARTIAL: Self = Self(1 << 8);
    /// A parameter with a default value.
    pub const OPTIONAL: Self = Self(1 << 9);
    /// `params`
    pub const PARAMS: Self = Self(1 << 10);
    /// `ref`, `out` or `in` on a parameter.
    pub const BY_REF: Self = Self(1 << 11);
    /// `this` on the first parameter of an extension method.
    pub const THIS: Self = Self(1 << 12);

    /// Returns `true` if every flag in `other` is set.
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Sets the flags in `other`.
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// The flag for a modifier keyword, if it is one this model tracks.
    pub fn from_keyword(kind: SyntaxKind) -> Option<Self> {
        Some(match kind {
            SyntaxKind::StaticKeyword => Self::STATIC,
            SyntaxKind::AbstractKeyword => Self::ABSTRACT,
            SyntaxKind::VirtualKeyword => Self::VIRTUAL,
            SyntaxKind::OverrideKeyword => Self::OVERRIDE,
            SyntaxKind::SealedKeyword => Self::SEALED,
            SyntaxKind::AsyncKeyword => Self::ASYNC,
            SyntaxKind::ConstKeyword => Self::CONST | Self::STATIC,
            SyntaxKind::ReadOnlyKeyword => Self::READONLY,
            SyntaxKind::PartialKeyword => Self::PARTIAL,
            SyntaxKind::ParamsKeyword => Self::PARAMS,
            SyntaxKind::RefKeyword | SyntaxKind::OutKeyword | SyntaxKind::InKeyword => {
                Self::BY_REF
            }
            SyntaxKind::ThisKeyword => Self::THIS,
            _ => return None,
        })
    }
}

impl BitOr for Modifiers {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// One declared entity.
///
/// Symbols are created by the declaration pass and filled in by the
/// resolution pass; a finished [`Compilation`](crate::Compilation) never
/// changes them.
#[derive(Clone, Debug)]
pub struct Symbol {
    /// Simple name. Constructors are `.ctor`, indexers `this[]`.
    pub name: Ident,
    /// What the symbol is.
    pub kind: SymbolKind,
    /// Declaration modifiers.
    pub modifiers: Modifiers,
    /// The namespace, type or member that contains this symbol. `None` only
    /// for the global namespace.
    pub container: Option<SymbolId>,
    /// Declaring nodes. Namespaces and partial types have several.
    pub declarations: Vec<DeclRef>,
    /// Nested namespaces, types and members, in declaration order.
    pub members: Vec<SymbolId>,
    /// Generic type parameters of a type, method or delegate.
    pub type_parameters: Vec<SymbolId>,
    /// Parameters of a method, indexer or delegate.
    pub parameters: Vec<SymbolId>,
    /// Type of a field, property, event, parameter or local; return type of
    /// a method or delegate. `None` when unresolved or inferred on demand.
    pub ty: Option<TypeRef>,
    /// Base class of a class.
    pub base: Option<TypeRef>,
    /// Directly implemented or extended interfaces.
    pub interfaces: Vec<TypeRef>,
}

impl Symbol {
    pub(crate) fn new(name: Ident, kind: SymbolKind, container: Option<SymbolId>) -> Self {
        Self {
            name,
            kind,
            modifiers: Modifiers::NONE,
            container,
            declarations: Vec::new(),
            members: Vec::new(),
            type_parameters: Vec::new(),
            parameters: Vec::new(),
            ty: None,
            base: None,
            interfaces: Vec::new(),
        }
    }

    /// The type flavor, for type symbols.
    pub fn type_kind(&self) -> Option<TypeKind> {
        match self.kind {
            SymbolKind::Type(kind) => Some(kind),
            _ => None,
        }
    }

    /// The method flavor, for method symbols.
    pub fn method_kind(&self) -> Option<MethodKind> {
        match self.kind {
            SymbolKind::Method(kind) => Some(kind),
            _ => None,
        }
    }

    /// Returns `true` for namespaces.
    pub fn is_namespace(&self) -> bool {
        self.kind == SymbolKind::Namespace
    }

    /// Returns `true` for named types.
    pub fn is_type(&self) -> bool {
        matches!(self.kind, SymbolKind::Type(_))
    }

    /// Returns `true` for methods of any flavor.
    pub fn is_method(&self) -> bool {
        matches!(self.kind, SymbolKind::Method(_))
    }

    /// Returns `true` if the symbol is static.
    pub fn is_static(&self) -> bool {
        self.modifiers.contains(Modifiers::STATIC)
    }

    /// Number of generic type parameters.
    pub fn arity(&self) -> usize {
        self.type_parameters.len()
    }
}

/// Returns `true` if a call with `count` arguments can bind to a method
/// whose parameters carry `parameter_modifiers`, honoring optional and
/// `params` parameters.
pub(crate) fn accepts_argument_count(count: usize, parameter_modifiers: &[Modifiers]) -> bool {
    let has_params = parameter_modifiers
        .last()
        .is_some_and(|m| m.contains(Modifiers::PARAMS));
    let required = parameter_modifiers
        .iter()
        .filter(|m| !m.contains(Modifiers::OPTIONAL) && !m.contains(Modifiers::PARAMS))
        .count();
    count >= required && (has_params || count <= parameter_modifiers.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifier_set_operations() {
        let mut mods = Modifiers::ASYNC;
        assert!(!mods.contains(Modifiers::OVERRIDE));
        mods.insert(Modifiers::OVERRIDE);
        assert!(mods.contains(Modifiers::ASYNC | Modifiers::OVERRIDE));
        assert_eq!(
            Modifiers::from_keyword(SyntaxKind::ConstKeyword),
            Some(Modifiers::CONST | Modifiers::STATIC)
        );
        assert_eq!(Modifiers::from_keyword(SyntaxKind::PublicKeyword), None);
    }

    #[test]
    fn argument_count_rules() {
        let plain = [Modifiers::NONE, Modifiers::NONE];
        assert!(accepts_argument_count(2, &plain));
        assert!(!accepts_argument_count(1, &plain));
        assert!(!accepts_argument_count(3, &plain));

        let optional = [Modifiers::NONE, Modifiers::OPTIONAL];
        assert!(accepts_argument_count(1, &optional));
        assert!(accepts_argument_count(2, &optional));

        let params = [Modifiers::NONE, Modifiers::PARAMS];
        assert!(accepts_argument_count(1, &params));
        assert!(accepts_argument_count(5, &params));
        assert!(!accepts_argument_count(0, &params));
    }
}
