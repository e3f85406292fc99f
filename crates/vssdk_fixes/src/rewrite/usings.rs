//! Adding `using` directives without duplicating visible ones.

use std::fmt;

use vssdk_syntax::make;
use vssdk_syntax::{NodeRef, SyntaxKind, SyntaxTree};

use super::{indentation, line_ending, trailing_trivia};
use crate::error::FixError;

/// A `using` directive a fix depends on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UsingSpec {
    /// `using Namespace;`
    Namespace(String),
    /// `using Alias = Target;`
    Alias {
        /// The alias name.
        alias: String,
        /// The aliased namespace or type.
        target: String,
    },
}

impl UsingSpec {
    /// `using {namespace};`
    pub fn namespace(namespace: impl Into<String>) -> Self {
        UsingSpec::Namespace(namespace.into())
    }

    /// `using {alias} = {target};`
    pub fn alias(alias: impl Into<String>, target: impl Into<String>) -> Self {
        UsingSpec::Alias {
            alias: alias.into(),
            target: target.into(),
        }
    }
}

impl fmt::Display for UsingSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UsingSpec::Namespace(ns) => write!(f, "using {ns};"),
            UsingSpec::Alias { alias, target } => write!(f, "using {alias} = {target};"),
        }
    }
}

fn normalize(name: &str) -> String {
    let compact: String = name.chars().filter(|c| !c.is_whitespace()).collect();
    compact.replace("global::", "")
}

fn is_namespace_scope(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::CompilationUnit
            | SyntaxKind::NamespaceDeclaration
            | SyntaxKind::FileScopedNamespaceDeclaration
    )
}

/// The using-bearing scopes that enclose `node`, innermost first.
fn scopes<'a>(node: NodeRef<'a>) -> impl Iterator<Item = NodeRef<'a>> {
    node.ancestors_and_self()
        .filter(|n| is_namespace_scope(n.kind()))
}

/// Returns `true` if `directive` provides what `using` asks for, or claims
/// the same alias for something else.
fn covers(directive: NodeRef<'_>, using: &UsingSpec) -> bool {
    let name = directive.name().map(|n| normalize(&n.text()));
    let alias = directive
        .child_node(SyntaxKind::NameEquals)
        .and_then(|ne| ne.name())
        .map(|n| n.text());
    match (using, alias) {
        (UsingSpec::Namespace(ns), None) => {
            directive.token(SyntaxKind::StaticKeyword).is_none()
                && name.as_deref() == Some(normalize(ns).as_str())
        }
        (UsingSpec::Alias { alias: wanted, .. }, Some(existing)) => existing == *wanted,
        _ => false,
    }
}

/// Finds a directive visible from `scope` that already satisfies `using`.
///
/// An alias of the same name bound to a different target is returned too;
/// adding a second alias would not compile.
pub fn find_equivalent_using<'a>(scope: NodeRef<'a>, using: &UsingSpec) -> Option<NodeRef<'a>> {
    scopes(scope)
        .flat_map(|s| s.usings())
        .find(|d| covers(*d, using))
}

pub(super) fn ensure_using(scope: NodeRef<'_>, using: &UsingSpec) -> Result<SyntaxTree, FixError> {
    let tree = scope.tree();
    if find_equivalent_using(scope, using).is_some() {
        return Ok(tree.edit().finish());
    }
    let directive = make::parse_using_directive(&using.to_string())?;
    let mut editor = tree.edit();

    let last = scopes(scope).find_map(|s| s.usings().last());
    match last {
        Some(last) => {
            let trailing = if trailing_trivia(last).ends_with('\n') {
                line_ending(last)
            } else {
                " "
            };
            let directive = directive
                .with_leading_trivia(indentation(last))
                .with_trailing_trivia(trailing);
            editor.insert_after(last.id(), vec![directive]);
        }
        None => {
            let root = tree.root();
            let Some(first) = root.child_nodes().next() else {
                return Ok(editor.finish());
            };
            let newline = line_ending(first);
            let directive = directive
                .with_leading_trivia(first.leading_trivia())
                .with_trailing_trivia(newline);
            editor.insert_before(first.id(), vec![directive]);
            editor.replace(first.id(), first.green().with_leading_trivia(newline));
        }
    }
    Ok(editor.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{node_with_text, parse};

    fn ensure(source: &str, using: UsingSpec) -> String {
        let tree = parse(source);
        let class = tree
            .nodes()
            .find(|n| n.kind() == SyntaxKind::ClassDeclaration)
            .unwrap();
        ensure_using(class, &using).unwrap().text()
    }

    #[test]
    fn appends_after_the_last_using() {
        let out = ensure(
            "using System;\nusing Microsoft.VisualStudio.Shell;\n\nclass P { }\n",
            UsingSpec::namespace("System.Threading"),
        );
        assert_eq!(
            out,
            "using System;\nusing Microsoft.VisualStudio.Shell;\nusing System.Threading;\n\nclass P { }\n"
        );
    }

    #[test]
    fn existing_namespace_is_not_duplicated() {
        let source = "using global::System.Threading;\nclass P { }\n";
        assert_eq!(ensure(source, UsingSpec::namespace("System.Threading")), source);
    }

    #[test]
    fn usings_in_enclosing_namespaces_count() {
        let source = "using System;\nnamespace N\n{\n    using Microsoft.VisualStudio.Shell;\n    class P { }\n}\n";
        assert_eq!(
            ensure(source, UsingSpec::namespace("Microsoft.VisualStudio.Shell")),
            source
        );
        assert_eq!(
            ensure(source, UsingSpec::namespace("System.Threading")),
            "using System;\nnamespace N\n{\n    using Microsoft.VisualStudio.Shell;\n    using System.Threading;\n    class P { }\n}\n"
        );
    }

    #[test]
    fn aliases_are_matched_by_name() {
        let task = UsingSpec::alias("Task", "System.Threading.Tasks.Task");
        let source = "using Task = System.Threading.Tasks.Task;\nclass P { }\n";
        assert_eq!(ensure(source, task.clone()), source);

        let conflicting = "using Task = Other.Task;\nclass P { }\n";
        assert_eq!(ensure(conflicting, task.clone()), conflicting);

        let namespace_only = "using System.Threading.Tasks;\nclass P { }\n";
        assert_eq!(
            ensure(namespace_only, task),
            "using System.Threading.Tasks;\nusing Task = System.Threading.Tasks.Task;\nclass P { }\n"
        );
    }

    #[test]
    fn file_without_usings_gets_one_before_the_first_member() {
        let out = ensure(
            "// header\nclass P { }\n",
            UsingSpec::namespace("Microsoft"),
        );
        assert_eq!(out, "// header\nusing Microsoft;\n\nclass P { }\n");
    }

    #[test]
    fn static_usings_do_not_import_the_namespace() {
        let tree = parse("using static System.Math;\nclass P { }\n");
        let class = node_with_text(&tree, SyntaxKind::ClassDeclaration, "class P { }").unwrap();
        assert!(find_equivalent_using(class, &UsingSpec::namespace("System.Math")).is_none());
    }
}
