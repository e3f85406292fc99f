//! Type references.
//!
//! A [`TypeRef`] names a type as written or inferred: a named type together
//! with its type arguments, a type parameter, or a composite such as an
//! array or tuple. Named types point at the *definition* symbol, so the
//! original definition of `Base<int>` is simply its `definition` field.

use crate::symbol::SymbolId;
use vssdk_syntax::SyntaxKind;

/// A reference to a type.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum TypeRef {
    /// A named type, possibly instantiated with type arguments.
    Named {
        /// The generic definition.
        definition: SymbolId,
        /// Type arguments, one per type parameter of the definition.
        args: Vec<TypeRef>,
    },
    /// A generic type parameter.
    Parameter(SymbolId),
    /// `T[]`
    Array(Box<TypeRef>),
    /// `T?`
    Nullable(Box<TypeRef>),
    /// `(A, B)`
    Tuple(Vec<TypeRef>),
    /// A built-in type whose `System` definition is not part of the compilation.
    Special(SpecialType),
    /// A type that could not be resolved, kept as a placeholder inside
    /// otherwise resolved composites.
    Unknown,
}

impl TypeRef {
    /// A non-generic named type.
    pub fn named(definition: SymbolId) -> Self {
        TypeRef::Named {
            definition,
            args: Vec::new(),
        }
    }

    /// The named-type definition, looking through nullable annotations.
    pub fn definition(&self) -> Option<SymbolId> {
        match self {
            TypeRef::Named { definition, .. } => Some(*definition),
            TypeRef::Nullable(inner) => inner.definition(),
            _ => None,
        }
    }

    /// Type arguments of a named type; empty for anything else.
    pub fn args(&self) -> &[TypeRef] {
        match self {
            TypeRef::Named { args, .. } => args,
            TypeRef::Nullable(inner) => inner.args(),
            _ => &[],
        }
    }

    /// Returns `true` for `void`.
    pub fn is_void(&self) -> bool {
        matches!(self, TypeRef::Special(SpecialType::Void))
    }

    /// Replaces type parameters according to `map`.
    pub fn substitute(&self, map: &[(SymbolId, TypeRef)]) -> TypeRef {
        if map.is_empty() {
            return self.clone();
        }
        match self {
            TypeRef::Parameter(p) => map
                .iter()
                .find(|(param, _)| param == p)
                .map_or_else(|| self.clone(), |(_, arg)| arg.clone()),
            TypeRef::Named { definition, args } => TypeRef::Named {
                definition: *definition,
                args: args.iter().map(|a| a.substitute(map)).collect(),
            },
            TypeRef::Array(elem) => TypeRef::Array(Box::new(elem.substitute(map))),
            TypeRef::Nullable(inner) => TypeRef::Nullable(Box::new(inner.substitute(map))),
            TypeRef::Tuple(items) => TypeRef::Tuple(items.iter().map(|t| t.substitute(map)).collect()),
            TypeRef::Special(_) | TypeRef::Unknown => self.clone(),
        }
    }
}

/// Built-in types named by keywords.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum SpecialType {
    /// `void`
    Void,
    /// `object`
    Object,
    /// `string`
    String,
    /// `bool`
    Bool,
    /// `char`
    Char,
    /// `byte`
    Byte,
    /// `sbyte`
    SByte,
    /// `short`
    Short,
    /// `ushort`
    UShort,
    /// `int`
    Int,
    /// `uint`
    UInt,
    /// `long`
    Long,
    /// `ulong`
    ULong,
    /// `float`
    Float,
    /// `double`
    Double,
    /// `decimal`
    Decimal,
}

impl SpecialType {
    /// The special type named by a predefined-type keyword.
    pub fn from_keyword(kind: SyntaxKind) -> Option<Self> {
        Some(match kind {
            SyntaxKind::VoidKeyword => SpecialType::Void,
            SyntaxKind::ObjectKeyword => SpecialType::Object,
            SyntaxKind::StringKeyword => SpecialType::String,
            SyntaxKind::BoolKeyword => SpecialType::Bool,
            SyntaxKind::CharKeyword => SpecialType::Char,
            SyntaxKind::ByteKeyword => SpecialType::Byte,
            SyntaxKind::SByteKeyword => SpecialType::SByte,
            SyntaxKind::ShortKeyword => SpecialType::Short,
            SyntaxKind::UShortKeyword => SpecialType::UShort,
            SyntaxKind::IntKeyword => SpecialType::Int,
            SyntaxKind::UIntKeyword => SpecialType::UInt,
            SyntaxKind::LongKeyword => SpecialType::Long,
            SyntaxKind::ULongKeyword => SpecialType::ULong,
            SyntaxKind::FloatKeyword => SpecialType::Float,
            SyntaxKind::DoubleKeyword => SpecialType::Double,
            SyntaxKind::DecimalKeyword => SpecialType::Decimal,
            _ => return None,
        })
    }

    /// The name of the corresponding type in the `System` namespace.
    pub fn system_name(self) -> &'static str {
        match self {
            SpecialType::Void => "Void",
            SpecialType::Object => "Object",
            SpecialType::String => "String",
            SpecialType::Bool => "Boolean",
            SpecialType::Char => "Char",
            SpecialType::Byte => "Byte",
            SpecialType::SByte => "SByte",
            SpecialType::Short => "Int16",
            SpecialType::UShort => "UInt16",
            SpecialType::Int => "Int32",
            SpecialType::UInt => "UInt32",
            SpecialType::Long => "Int64",
            SpecialType::ULong => "UInt64",
            SpecialType::Float => "Single",
            SpecialType::Double => "Double",
            SpecialType::Decimal => "Decimal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitute_replaces_parameters_recursively() {
        let t = SymbolId::from_raw(1);
        let list = SymbolId::from_raw(2);
        let generic = TypeRef::Named {
            definition: list,
            args: vec![TypeRef::Array(Box::new(TypeRef::Parameter(t)))],
        };
        let int = TypeRef::Special(SpecialType::Int);
        let closed = generic.substitute(&[(t, int.clone())]);
        assert_eq!(
            closed,
            TypeRef::Named {
                definition: list,
                args: vec![TypeRef::Array(Box::new(int))],
            }
        );
        assert_eq!(closed.definition(), Some(list));
    }

    #[test]
    fn definition_looks_through_nullable() {
        let def = SymbolId::from_raw(7);
        let nullable = TypeRef::Nullable(Box::new(TypeRef::named(def)));
        assert_eq!(nullable.definition(), Some(def));
        assert!(TypeRef::Special(SpecialType::Void).is_void());
        assert_eq!(TypeRef::Unknown.definition(), None);
    }

    #[test]
    fn keywords_map_to_system_names() {
        let int = SpecialType::from_keyword(SyntaxKind::IntKeyword);
        assert_eq!(int.map(SpecialType::system_name), Some("Int32"));
        assert_eq!(SpecialType::from_keyword(SyntaxKind::Identifier), None);
    }
}
