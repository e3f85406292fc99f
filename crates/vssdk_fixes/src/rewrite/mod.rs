//! Tree rewrites performed by code fixes.
//!
//! Every rewrite takes a tree and returns a new one; trees are never edited
//! in place. Nodes are addressed by [`Annotation`]s attached before the
//! first rewrite, so an edit still finds its target after earlier edits
//! have shifted every offset in the file. An edit whose target has
//! disappeared returns `Ok(None)`.
//!
//! Replacements copy the leading and trailing trivia of the node they
//! replace, so comments and formatting around an edit survive.

mod arguments;
mod initialize;
mod usings;

pub use initialize::{unique_name, InitializeConversion};
pub use usings::{find_equivalent_using, UsingSpec};

use vssdk_syntax::make;
use vssdk_syntax::{Annotation, GreenNode, GreenToken, NodeRef, SyntaxKind, SyntaxTree};

use crate::error::FixError;

/// One step of a prepared fix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FixEdit {
    /// Renames the rightmost identifier of a type reference, so
    /// `Shell.Package` becomes `Shell.AsyncPackage`.
    RenameTypeReference {
        /// The type syntax.
        node: Annotation,
        /// The new simple name.
        name: String,
    },
    /// Turns a synchronous `Initialize` override into `InitializeAsync`.
    ConvertInitialize(InitializeConversion),
    /// Sets `name = value` on an attribute, adding the argument if needed.
    SetNamedArgument {
        /// The attribute.
        attribute: Annotation,
        /// The property name.
        name: String,
        /// The new value, as source text.
        value: String,
    },
    /// Removes the argument `name = ...` from an attribute.
    RemoveNamedArgument {
        /// The attribute.
        attribute: Annotation,
        /// The property name.
        name: String,
    },
    /// Ors `flag` into the flags argument of an attribute, adding the
    /// argument after the last positional one if there is none.
    AddFlag {
        /// The attribute.
        attribute: Annotation,
        /// The flag expression, such as `PackageAutoLoadFlags.BackgroundLoad`.
        flag: String,
    },
    /// Replaces an expression.
    ReplaceExpression {
        /// The expression.
        node: Annotation,
        /// The replacement source text.
        replacement: String,
    },
    /// Inserts a statement right after another one in the same block.
    InsertStatementAfter {
        /// The statement to insert after.
        anchor: Annotation,
        /// The new statement, including its `;`.
        statement: String,
    },
    /// Adds a `using` directive visible from a node, unless an equivalent
    /// one already is.
    EnsureUsing {
        /// A node of the file, usually the declaration being fixed.
        scope: Annotation,
        /// The directive.
        using: UsingSpec,
    },
}

impl FixEdit {
    /// Applies the edit to `tree`. Returns `Ok(None)` when its target node
    /// is no longer present.
    pub fn apply(&self, tree: &SyntaxTree) -> Result<Option<SyntaxTree>, FixError> {
        match self {
            FixEdit::RenameTypeReference { node, name } => {
                Ok(locate(tree, *node).map(|n| rename_type_reference(n, name)))
            }
            FixEdit::ConvertInitialize(conversion) => conversion.apply(tree),
            FixEdit::SetNamedArgument {
                attribute,
                name,
                value,
            } => match locate(tree, *attribute) {
                Some(a) => arguments::set_named_argument(a, name, value).map(Some),
                None => Ok(None),
            },
            FixEdit::RemoveNamedArgument { attribute, name } => {
                Ok(locate(tree, *attribute).map(|a| arguments::remove_named_argument(a, name)))
            }
            FixEdit::AddFlag { attribute, flag } => match locate(tree, *attribute) {
                Some(a) => arguments::add_flag(a, flag).map(Some),
                None => Ok(None),
            },
            FixEdit::ReplaceExpression { node, replacement } => match locate(tree, *node) {
                Some(n) => replace_expression(n, replacement).map(Some),
                None => Ok(None),
            },
            FixEdit::InsertStatementAfter { anchor, statement } => match locate(tree, *anchor) {
                Some(a) => insert_statement_after(a, statement).map(Some),
                None => Ok(None),
            },
            FixEdit::EnsureUsing { scope, using } => match locate(tree, *scope) {
                Some(s) => usings::ensure_using(s, using).map(Some),
                None => Ok(None),
            },
        }
    }
}

fn locate(tree: &SyntaxTree, annotation: Annotation) -> Option<NodeRef<'_>> {
    tree.find_annotated(annotation)
}

/// Trailing trivia of the last token of `node`.
pub(crate) fn trailing_trivia<'a>(node: NodeRef<'a>) -> &'a str {
    node.last_token().map_or("", |t| t.trailing())
}

/// The whitespace that starts the line `node` is on.
pub(crate) fn indentation<'a>(node: NodeRef<'a>) -> &'a str {
    let leading = node.leading_trivia();
    let line = leading.rfind('\n').map_or(leading, |i| &leading[i + 1..]);
    let end = line
        .find(|c: char| c != ' ' && c != '\t')
        .unwrap_or(line.len());
    &line[..end]
}

/// The line terminator used after `node`, or `\n` when none is found.
pub(crate) fn line_ending(node: NodeRef<'_>) -> &'static str {
    if trailing_trivia(node).ends_with("\r\n") || node.leading_trivia().contains("\r\n") {
        "\r\n"
    } else {
        "\n"
    }
}

/// Copies the outer trivia of `original` onto `replacement`.
pub(crate) fn with_trivia_of(replacement: GreenNode, original: NodeRef<'_>) -> GreenNode {
    replacement
        .with_leading_trivia(original.leading_trivia())
        .with_trailing_trivia(trailing_trivia(original))
}

fn rename_type_reference(node: NodeRef<'_>, name: &str) -> SyntaxTree {
    let mut editor = node.tree().edit();
    if let Some(last) = node
        .tokens()
        .filter(|t| t.kind() == SyntaxKind::Identifier)
        .last()
    {
        editor.replace_token(last.id(), GreenToken::new(SyntaxKind::Identifier, name));
    }
    editor.finish()
}

fn replace_expression(node: NodeRef<'_>, replacement: &str) -> Result<SyntaxTree, FixError> {
    let green = with_trivia_of(make::parse_expression(replacement)?, node);
    let mut editor = node.tree().edit();
    editor.replace(node.id(), green);
    Ok(editor.finish())
}

fn insert_statement_after(anchor: NodeRef<'_>, statement: &str) -> Result<SyntaxTree, FixError> {
    let green = make::parse_statement(statement)?;
    let green = if trailing_trivia(anchor).ends_with('\n') {
        green
            .with_leading_trivia(indentation(anchor))
            .with_trailing_trivia(line_ending(anchor))
    } else {
        green.with_leading_trivia("").with_trailing_trivia(" ")
    };
    let mut editor = anchor.tree().edit();
    editor.insert_after(anchor.id(), vec![green]);
    Ok(editor.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{annotate, parse, node_with_text};

    #[test]
    fn rename_keeps_qualification_and_trivia() {
        let source = "class A : /* base */ Microsoft.VisualStudio.Shell.Package /* end */ { }";
        let tree = parse(source);
        let (tree, ann) = annotate(&tree, SyntaxKind::QualifiedName, "Microsoft.VisualStudio.Shell.Package");
        let edit = FixEdit::RenameTypeReference {
            node: ann,
            name: "AsyncPackage".into(),
        };
        let out = edit.apply(&tree).unwrap().unwrap();
        assert_eq!(
            out.text(),
            "class A : /* base */ Microsoft.VisualStudio.Shell.AsyncPackage /* end */ { }"
        );
    }

    #[test]
    fn replaced_expression_keeps_surrounding_comments() {
        let source = "class A { object c = /* old */ new JoinableTaskContext() /* ok */; }";
        let tree = parse(source);
        let (tree, ann) =
            annotate(&tree, SyntaxKind::ObjectCreationExpression, "new JoinableTaskContext()");
        let edit = FixEdit::ReplaceExpression {
            node: ann,
            replacement: "ThreadHelper.JoinableTaskContext".into(),
        };
        let out = edit.apply(&tree).unwrap().unwrap();
        assert_eq!(
            out.text(),
            "class A { object c = /* old */ ThreadHelper.JoinableTaskContext /* ok */; }"
        );
    }

    #[test]
    fn inserted_statement_takes_the_anchor_indentation() {
        let source = "class A\n{\n    void M()\n    {\n        var s = Get();\n        s.Use();\n    }\n}\n";
        let tree = parse(source);
        let (tree, ann) = annotate(&tree, SyntaxKind::LocalDeclarationStatement, "var s = Get();");
        let edit = FixEdit::InsertStatementAfter {
            anchor: ann,
            statement: "Assumes.Present(s);".into(),
        };
        let out = edit.apply(&tree).unwrap().unwrap();
        assert_eq!(
            out.text(),
            "class A\n{\n    void M()\n    {\n        var s = Get();\n        Assumes.Present(s);\n        s.Use();\n    }\n}\n"
        );
    }

    #[test]
    fn inserted_statement_on_a_shared_line() {
        let source = "class A { void M() { var s = Get(); s.Use(); } }";
        let tree = parse(source);
        let (tree, ann) = annotate(&tree, SyntaxKind::LocalDeclarationStatement, "var s = Get();");
        let edit = FixEdit::InsertStatementAfter {
            anchor: ann,
            statement: "Assumes.Present(s);".into(),
        };
        let out = edit.apply(&tree).unwrap().unwrap();
        assert_eq!(
            out.text(),
            "class A { void M() { var s = Get(); Assumes.Present(s); s.Use(); } }"
        );
    }

    #[test]
    fn missing_target_yields_none() {
        let tree = parse("class A { }");
        let edit = FixEdit::ReplaceExpression {
            node: Annotation::fresh(),
            replacement: "x".into(),
        };
        assert!(edit.apply(&tree).unwrap().is_none());
        assert!(node_with_text(&tree, SyntaxKind::ClassDeclaration, "class A { }").is_some());
    }

    #[test]
    fn bad_snippet_is_an_error() {
        let tree = parse("class A { object o = null; }");
        let (tree, ann) = annotate(&tree, SyntaxKind::LiteralExpression, "null");
        let edit = FixEdit::ReplaceExpression {
            node: ann,
            replacement: "(".into(),
        };
        assert!(matches!(edit.apply(&tree), Err(FixError::Snippet(_))));
    }

    #[test]
    fn indentation_ignores_comments_on_earlier_lines() {
        let tree = parse("class A\n{\n    // note\n    int x;\n}\n");
        let field = node_with_text(&tree, SyntaxKind::FieldDeclaration, "int x;").unwrap();
        assert_eq!(indentation(field), "    ");
        assert_eq!(line_ending(field), "\n");
    }
}
