//! Matching symbols against declarative namespace, type and member specs.
//!
//! Rules describe the framework entities they care about as
//! [`QualifiedTypeSpec`]s (`Microsoft.VisualStudio.Shell.AsyncPackage`) and
//! [`QualifiedMemberSpec`]s (`...ThreadHelper::JoinableTaskFactory`). The
//! functions here answer whether a resolved symbol is one of them. Every
//! query takes an `Option<SymbolId>` so unresolved sites simply fail to
//! match.

use std::fmt;

use thiserror::Error;
use vssdk_semantic::{Compilation, SymbolId};

/// The type-name part of a [`QualifiedTypeSpec`].
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum TypeName {
    /// A specific simple name, without generic arity.
    Named(String),
    /// Any type in the namespace (`Namespace.*`).
    Wildcard,
}

/// A namespace path plus a type name.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct QualifiedTypeSpec {
    /// Namespace segments, outermost first. Empty for the global namespace.
    pub namespace: Vec<String>,
    /// The type's simple name, or a wildcard.
    pub type_name: TypeName,
}

impl QualifiedTypeSpec {
    /// A spec for the type `name` in the namespace `namespace`.
    pub fn new(namespace: &[&str], name: &str) -> Self {
        Self {
            namespace: namespace.iter().map(|s| s.to_string()).collect(),
            type_name: TypeName::Named(name.to_string()),
        }
    }

    /// A spec matching every type directly in `namespace`.
    pub fn wildcard(namespace: &[&str]) -> Self {
        Self {
            namespace: namespace.iter().map(|s| s.to_string()).collect(),
            type_name: TypeName::Wildcard,
        }
    }

    /// Parses a dotted name such as `A.B.Type` or `A.B.*`. The last segment
    /// is the type name. Returns `None` for empty segments.
    pub fn parse(dotted: &str) -> Option<Self> {
        let mut segments: Vec<&str> = dotted.split('.').map(str::trim).collect();
        if segments.iter().any(|s| s.is_empty()) {
            return None;
        }
        let last = segments.pop()?;
        if segments.contains(&"*") {
            return None;
        }
        let type_name = match last {
            "*" => TypeName::Wildcard,
            name => TypeName::Named(name.to_string()),
        };
        Some(Self {
            namespace: segments.into_iter().map(String::from).collect(),
            type_name,
        })
    }

    /// Returns `true` for a `Namespace.*` spec.
    pub fn is_wildcard(&self) -> bool {
        self.type_name == TypeName::Wildcard
    }
}

impl fmt::Display for QualifiedTypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.namespace {
            write!(f, "{segment}.")?;
        }
        match &self.type_name {
            TypeName::Named(name) => f.write_str(name),
            TypeName::Wildcard => f.write_str("*"),
        }
    }
}

/// A member of a specific type.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct QualifiedMemberSpec {
    /// The type declaring the member.
    pub containing_type: QualifiedTypeSpec,
    /// The member's simple name.
    pub member: String,
}

impl QualifiedMemberSpec {
    /// A spec for `member` of the type `name` in `namespace`.
    pub fn new(namespace: &[&str], name: &str, member: &str) -> Self {
        Self {
            containing_type: QualifiedTypeSpec::new(namespace, name),
            member: member.to_string(),
        }
    }
}

impl fmt::Display for QualifiedMemberSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.containing_type, self.member)
    }
}

/// A spec that cannot be turned into a [`TypeMatchEntry`].
#[derive(Clone, PartialEq, Eq, Debug, Error)]
pub enum MatchSpecError {
    /// A member name was combined with a `Namespace.*` type.
    #[error("member `{member}` cannot be combined with the wildcard type `{type_spec}`")]
    WildcardMember {
        /// The wildcard type spec.
        type_spec: String,
        /// The member that was requested.
        member: String,
    },
}

/// One row of a classification table.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TypeMatchEntry {
    type_spec: QualifiedTypeSpec,
    member: Option<String>,
    inverted: bool,
}

impl TypeMatchEntry {
    /// Creates an entry. A member entry must name a specific type.
    pub fn new(
        type_spec: QualifiedTypeSpec,
        member: Option<String>,
        inverted: bool,
    ) -> Result<Self, MatchSpecError> {
        if let (Some(member), true) = (&member, type_spec.is_wildcard()) {
            return Err(MatchSpecError::WildcardMember {
                type_spec: type_spec.to_string(),
                member: member.clone(),
            });
        }
        Ok(Self {
            type_spec,
            member,
            inverted,
        })
    }

    /// The type part of the entry.
    pub fn type_spec(&self) -> &QualifiedTypeSpec {
        &self.type_spec
    }

    /// The member name, for member entries.
    pub fn member(&self) -> Option<&str> {
        self.member.as_deref()
    }

    /// Returns `true` if a match means "exempt" rather than "listed".
    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    /// Returns `true` unless the type part is a wildcard.
    pub fn is_exact(&self) -> bool {
        !self.type_spec.is_wildcard()
    }

    /// Returns `true` if `ty` matches the type part and, for member entries,
    /// `member` is the listed member. Type-wide entries match every member.
    pub fn matches(&self, compilation: &Compilation, ty: Option<SymbolId>, member: Option<&str>) -> bool {
        if !matches_type(compilation, ty, &self.type_spec) {
            return false;
        }
        match &self.member {
            Some(expected) => member == Some(expected.as_str()),
            None => true,
        }
    }
}

impl fmt::Display for TypeMatchEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.inverted {
            f.write_str("!")?;
        }
        write!(f, "[{}]", self.type_spec)?;
        if let Some(member) = &self.member {
            write!(f, "::{member}")?;
        }
        Ok(())
    }
}

/// Returns `true` if `symbol` is declared directly in the namespace `path`
/// (outermost segment first). A symbol in a deeper or shallower namespace
/// does not match.
pub fn belongs_to_namespace<S: AsRef<str>>(
    compilation: &Compilation,
    symbol: Option<SymbolId>,
    path: &[S],
) -> bool {
    let Some(symbol) = symbol else {
        return false;
    };
    let global = compilation.global_namespace();
    let mut current = compilation.containing_namespace(symbol);
    for segment in path.iter().rev() {
        match current {
            Some(ns) if ns != global && compilation.name(ns) == segment.as_ref() => {
                current = compilation.containing_namespace(ns);
            }
            _ => return false,
        }
    }
    current == Some(global)
}

/// Returns `true` if `symbol` is a type matching `spec`.
pub fn matches_type(
    compilation: &Compilation,
    symbol: Option<SymbolId>,
    spec: &QualifiedTypeSpec,
) -> bool {
    let Some(id) = symbol else {
        return false;
    };
    if !compilation.symbol(id).is_type() {
        return false;
    }
    let name_matches = match &spec.type_name {
        TypeName::Named(name) => compilation.name(id) == name,
        TypeName::Wildcard => true,
    };
    name_matches && belongs_to_namespace(compilation, Some(id), &spec.namespace)
}

/// Returns `true` if `symbol` is the member `spec.member` of a type matching
/// `spec.containing_type`.
pub fn matches_member(
    compilation: &Compilation,
    symbol: Option<SymbolId>,
    spec: &QualifiedMemberSpec,
) -> bool {
    let Some(id) = symbol else {
        return false;
    };
    compilation.name(id) == spec.member
        && matches_type(compilation, compilation.containing_type(id), &spec.containing_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::compile;

    fn type_id(c: &Compilation, name: &str) -> Option<SymbolId> {
        c.type_by_qualified_name(name)
    }

    #[test]
    fn namespace_must_match_exactly() {
        let (c, _) = compile("namespace Microsoft.VisualStudio.Shell.Extra { class Deep { } }");
        let package = type_id(&c, "Microsoft.VisualStudio.Shell.Package");
        let deep = type_id(&c, "Microsoft.VisualStudio.Shell.Extra.Deep");
        let shell = ["Microsoft", "VisualStudio", "Shell"];
        assert!(belongs_to_namespace(&c, package, &shell));
        assert!(!belongs_to_namespace(&c, deep, &shell));
        assert!(!belongs_to_namespace(&c, package, &["VisualStudio", "Shell"]));
        assert!(!belongs_to_namespace(&c, None, &shell));
    }

    #[test]
    fn global_namespace_is_the_empty_path() {
        let (c, _) = compile("class Loose { }");
        let loose = type_id(&c, "Loose");
        assert!(belongs_to_namespace::<&str>(&c, loose, &[]));
        assert!(matches_type(&c, loose, &QualifiedTypeSpec::new(&[], "Loose")));
    }

    #[test]
    fn wildcard_matches_any_type_in_namespace() {
        let (c, _) = compile("namespace Microsoft.VisualStudio.Shell.Interop { class Custom { } }");
        let spec = QualifiedTypeSpec::wildcard(&["Microsoft", "VisualStudio", "Shell", "Interop"]);
        for name in ["IVsSolution", "SVsShell", "Custom"] {
            let id = type_id(&c, &format!("Microsoft.VisualStudio.Shell.Interop.{name}"));
            assert!(matches_type(&c, id, &spec), "{name}");
            assert_eq!(
                matches_type(&c, id, &spec),
                belongs_to_namespace(&c, id, &spec.namespace)
            );
        }
        let outside = type_id(&c, "Microsoft.VisualStudio.Shell.Package");
        assert!(!matches_type(&c, outside, &spec));
    }

    #[test]
    fn same_simple_name_in_other_namespace_does_not_match() {
        let (c, _) = compile("namespace Contoso { public class AsyncPackage { } }");
        let spec = QualifiedTypeSpec::new(&["Microsoft", "VisualStudio", "Shell"], "AsyncPackage");
        assert!(!matches_type(&c, type_id(&c, "Contoso.AsyncPackage"), &spec));
        assert!(matches_type(
            &c,
            type_id(&c, "Microsoft.VisualStudio.Shell.AsyncPackage"),
            &spec
        ));
    }

    #[test]
    fn member_matches_name_and_containing_type() {
        let (c, _) = compile("class Empty { }");
        let helper = type_id(&c, "Microsoft.VisualStudio.Shell.ThreadHelper").unwrap();
        let property = c.lookup_members(helper, "JoinableTaskFactory")[0];
        let spec = QualifiedMemberSpec::new(
            &["Microsoft", "VisualStudio", "Shell"],
            "ThreadHelper",
            "JoinableTaskFactory",
        );
        assert!(matches_member(&c, Some(property), &spec));
        let package = type_id(&c, "Microsoft.VisualStudio.Shell.AsyncPackage").unwrap();
        let other = c.lookup_members(package, "JoinableTaskFactory")[0];
        assert!(!matches_member(&c, Some(other), &spec));
    }

    #[test]
    fn parse_and_display() {
        let spec = QualifiedTypeSpec::parse("Microsoft.VisualStudio.Shell.Interop.*").unwrap();
        assert!(spec.is_wildcard());
        assert_eq!(spec.to_string(), "Microsoft.VisualStudio.Shell.Interop.*");
        assert!(QualifiedTypeSpec::parse("A..B").is_none());
        assert!(QualifiedTypeSpec::parse("A.*.B").is_none());
    }

    #[test]
    fn member_entry_rejects_wildcard_type() {
        let err = TypeMatchEntry::new(
            QualifiedTypeSpec::wildcard(&["EnvDTE"]),
            Some("Solution".to_string()),
            false,
        )
        .unwrap_err();
        assert!(err.to_string().contains("EnvDTE.*"));
        let entry = TypeMatchEntry::new(
            QualifiedTypeSpec::new(&["EnvDTE"], "DTE"),
            Some("Solution".to_string()),
            true,
        )
        .unwrap();
        assert_eq!(entry.to_string(), "![EnvDTE.DTE]::Solution");
    }
}
