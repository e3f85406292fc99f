//! Resolution pass: base lists and member signatures.
//!
//! Runs after every symbol has been declared. Symbols are resolved in
//! allocation order, which puts an outer type's base list ahead of its
//! nested types, so a nested type can name types inherited by its parent.

use crate::compilation::Compilation;
use crate::symbol::{SymbolId, SymbolKind, TypeKind};
use crate::types::TypeRef;
use vssdk_syntax::SyntaxKind;

pub(crate) fn resolve(compilation: &mut Compilation) {
    let ids: Vec<SymbolId> = compilation.symbols.ids().collect();
    for &id in &ids {
        if let Some((base, interfaces)) = resolve_base_list(compilation, id) {
            let symbol = &mut compilation.symbols[id];
            symbol.base = base;
            symbol.interfaces = interfaces;
        }
    }
    for &id in &ids {
        if let Some(ty) = resolve_signature(compilation, id) {
            compilation.symbols[id].ty = Some(ty);
        }
    }
}

fn resolve_base_list(
    compilation: &Compilation,
    id: SymbolId,
) -> Option<(Option<TypeRef>, Vec<TypeRef>)> {
    let symbol = &compilation.symbols[id];
    let kind = symbol.type_kind()?;
    if matches!(kind, TypeKind::Enum | TypeKind::Delegate) {
        return None;
    }
    let mut base = None;
    let mut interfaces = Vec::new();
    for decl in &symbol.declarations {
        let Some(node) = compilation.node(*decl) else {
            continue;
        };
        for (position, syntax) in node.base_types().enumerate() {
            let Some(ty) = compilation.resolve_type_syntax(syntax) else {
                continue;
            };
            let is_interface = ty
                .definition()
                .and_then(|d| compilation.symbols[d].type_kind())
                == Some(TypeKind::Interface);
            if kind == TypeKind::Class && position == 0 && !is_interface && base.is_none() {
                base = Some(ty);
            } else if !interfaces.contains(&ty) {
                interfaces.push(ty);
            }
        }
    }
    Some((base, interfaces))
}

fn resolve_signature(compilation: &Compilation, id: SymbolId) -> Option<TypeRef> {
    let symbol = &compilation.symbols[id];
    let node = compilation.node(*symbol.declarations.first()?)?;
    match symbol.kind {
        SymbolKind::Field | SymbolKind::Event if node.kind() == SyntaxKind::VariableDeclarator => {
            let declaration = node.parent()?;
            compilation.resolve_type_syntax(declaration.nth_child_node(0)?)
        }
        SymbolKind::Field if node.kind() == SyntaxKind::EnumMemberDeclaration => {
            symbol.container.map(TypeRef::named)
        }
        SymbolKind::Event | SymbolKind::Property | SymbolKind::Parameter => {
            compilation.resolve_type_syntax(node.declared_type()?)
        }
        SymbolKind::Method(_) | SymbolKind::Type(TypeKind::Delegate) => {
            match node.kind() {
                SyntaxKind::ConstructorDeclaration | SyntaxKind::DestructorDeclaration => {
                    Some(compilation.special_type(crate::types::SpecialType::Void))
                }
                _ => compilation.resolve_type_syntax(node.declared_type()?),
            }
        }
        _ => None,
    }
}
