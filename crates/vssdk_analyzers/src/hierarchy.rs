//! Base-class and interface walks over type symbols.
//!
//! Type symbols in a [`Compilation`] are always generic definitions, and
//! instantiated references are reduced with
//! [`Compilation::original_definition`] before they get here. So
//! `class D : Base<int>` is derived from `Base<T>` without any special
//! handling.

use std::collections::HashSet;

use vssdk_semantic::{Compilation, SymbolId, TypeRef};

/// Returns `true` if `ty` is `base` or has `base` somewhere in its base
/// class chain. Stops at a type without a base. A cyclic chain (invalid
/// input) stops once every type in it has been visited.
pub fn is_equal_to_or_derived_from(
    compilation: &Compilation,
    ty: Option<SymbolId>,
    base: SymbolId,
) -> bool {
    base_chain(compilation, ty).any(|def| def == base)
}

/// [`is_equal_to_or_derived_from`] for a type reference.
pub fn type_is_equal_to_or_derived_from(
    compilation: &Compilation,
    ty: Option<&TypeRef>,
    base: SymbolId,
) -> bool {
    let def = ty.and_then(|t| compilation.original_definition(t));
    is_equal_to_or_derived_from(compilation, def, base)
}

/// `ty` followed by each of its base classes, most derived first.
pub fn base_chain(
    compilation: &Compilation,
    ty: Option<SymbolId>,
) -> impl Iterator<Item = SymbolId> + '_ {
    let mut visited = HashSet::new();
    let mut current = ty;
    std::iter::from_fn(move || {
        let def = current.filter(|d| visited.insert(*d))?;
        current = compilation
            .symbol(def)
            .base
            .as_ref()
            .and_then(|b| compilation.original_definition(b));
        Some(def)
    })
}

/// The direct base class of `ty`, as a definition.
pub fn direct_base(compilation: &Compilation, ty: SymbolId) -> Option<SymbolId> {
    compilation
        .symbol(ty)
        .base
        .as_ref()
        .and_then(|b| compilation.original_definition(b))
}

/// Returns `true` if `ty`, one of its base classes, or an interface any of
/// them extends is `iface`.
pub fn implements_interface(
    compilation: &Compilation,
    ty: Option<SymbolId>,
    iface: SymbolId,
) -> bool {
    let mut visited = HashSet::new();
    let mut pending: Vec<SymbolId> = base_chain(compilation, ty).collect();
    while let Some(def) = pending.pop() {
        if def == iface {
            return true;
        }
        if !visited.insert(def) {
            continue;
        }
        pending.extend(
            compilation
                .symbol(def)
                .interfaces
                .iter()
                .filter_map(|i| compilation.original_definition(i)),
        );
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{compile, compile_bare};

    fn id(c: &Compilation, name: &str) -> SymbolId {
        c.type_by_qualified_name(name)
            .unwrap_or_else(|| panic!("missing {name}"))
    }

    #[test]
    fn multi_hop_derivation() {
        let (c, _) = compile(
            "using Microsoft.VisualStudio.Shell;\n\
             class D : AsyncPackage { }\n\
             class C : D { }",
        );
        let package = id(&c, "Microsoft.VisualStudio.Shell.Package");
        let async_package = id(&c, "Microsoft.VisualStudio.Shell.AsyncPackage");
        let class_c = id(&c, "C");
        assert!(is_equal_to_or_derived_from(&c, Some(class_c), async_package));
        assert!(is_equal_to_or_derived_from(&c, Some(class_c), package));
        assert!(is_equal_to_or_derived_from(&c, Some(package), package));
        assert!(!is_equal_to_or_derived_from(&c, Some(package), async_package));
        assert!(!is_equal_to_or_derived_from(&c, None, package));
        assert_eq!(direct_base(&c, class_c), Some(id(&c, "D")));
    }

    #[test]
    fn generic_base_matches_its_definition() {
        let (c, _) = compile_bare("class Base<T> { } class Derived : Base<int> { }");
        let base = id(&c, "Base`1");
        let derived = id(&c, "Derived");
        assert!(is_equal_to_or_derived_from(&c, Some(derived), base));
        let instance = c.symbol(derived).base.clone();
        assert!(type_is_equal_to_or_derived_from(&c, instance.as_ref(), base));
    }

    #[test]
    fn cyclic_bases_terminate() {
        let (c, _) = compile_bare("class A : B { } class B : A { } class Other { }");
        let a = id(&c, "A");
        let other = id(&c, "Other");
        assert!(!is_equal_to_or_derived_from(&c, Some(a), other));
        assert!(base_chain(&c, Some(a)).count() <= 2);
    }

    #[test]
    fn interfaces_are_transitive() {
        let (c, _) = compile_bare(
            "interface IRoot { }\n\
             interface IMiddle : IRoot { }\n\
             class Impl : IMiddle { }\n\
             class Sub : Impl { }\n\
             class Unrelated { }",
        );
        let root = id(&c, "IRoot");
        assert!(implements_interface(&c, Some(id(&c, "Sub")), root));
        assert!(implements_interface(&c, Some(id(&c, "IMiddle")), root));
        assert!(!implements_interface(&c, Some(id(&c, "Unrelated")), root));
    }

    #[test]
    fn package_implements_service_provider() {
        let (c, _) = compile("class Empty { }");
        let provider = id(&c, "System.IServiceProvider");
        let async_package = id(&c, "Microsoft.VisualStudio.Shell.AsyncPackage");
        assert!(implements_interface(&c, Some(async_package), provider));
    }
}
