//! Hand-rolled lossless parser for the C# subset used by Visual Studio
//! extensions.
//!
//! The main entry point is [`parse_file`], which lexes and parses a source
//! file into a [`SyntaxTree`]. Every byte of input, including whitespace,
//! comments and tokens the parser could not place, is kept in the tree, so
//! printing a tree reproduces its source exactly. Code fixes rely on this to
//! rewrite one node while leaving the surrounding formatting untouched.
//!
//! # Architecture
//!
//! - **Lexer** ([`lexer`]): Converts source text to tokens with attached
//!   leading and trailing trivia.
//! - **Parser** ([`parser`]): Recursive descent parser with precedence
//!   climbing for expressions and speculative scanning for the generic,
//!   cast and declaration ambiguities of C#.
//! - **Green tree** ([`green`]): Position-independent nodes built by the
//!   parser and by code fixes.
//! - **Syntax tree** ([`tree`]): An indexed, immutable tree with parent
//!   links, spans and a structural editor.
//! - **Accessors** ([`ast`]) and **snippets** ([`make`]).

#![warn(missing_docs)]

/// Role accessors on syntax nodes.
pub mod ast;
mod decl;
mod expr;
/// Position-independent tree elements.
pub mod green;
/// Token and node kinds.
pub mod kind;
/// Lexical analyzer for C# source text.
pub mod lexer;
/// Parsing source snippets into green nodes.
pub mod make;
/// Recursive descent parser with error recovery.
pub mod parser;
mod pattern;
mod stmt;
/// The indexed syntax tree and its editor.
pub mod tree;

pub use green::{Annotation, GreenElement, GreenNode, GreenToken};
pub use kind::SyntaxKind;
pub use tree::{Element, ElementRef, NodeId, NodeRef, SyntaxTree, TokenId, TokenRef, TreeEditor};

use vssdk_diagnostics::DiagnosticSink;
use vssdk_source::{FileId, SourceDb};

/// Parses a source file into a syntax tree.
///
/// Lexing and parse errors are reported to the diagnostic sink; the tree is
/// always complete and prints back to the file's exact content.
pub fn parse_file(file_id: FileId, source_db: &SourceDb, sink: &DiagnosticSink) -> SyntaxTree {
    let file = source_db.get_file(file_id);
    parse_text(file_id, &file.content, sink)
}

/// Parses source text attributed to `file_id`.
pub fn parse_text(file_id: FileId, source: &str, sink: &DiagnosticSink) -> SyntaxTree {
    let tokens = lexer::lex(source, file_id, sink);
    let mut parser = parser::CSharpParser::new(tokens, file_id, sink);
    let root = parser.parse_compilation_unit();
    SyntaxTree::from_green(file_id, &root)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_source(source: &str) -> (SyntaxTree, Vec<vssdk_diagnostics::Diagnostic>) {
        let mut db = SourceDb::new();
        let file_id = db.add_source("Test.cs", source.to_string());
        let sink = DiagnosticSink::new();
        let tree = parse_file(file_id, &db, &sink);
        (tree, sink.take_all())
    }

    fn parse_ok(source: &str) -> SyntaxTree {
        let (tree, errors) = parse_source(source);
        assert!(
            errors.is_empty(),
            "unexpected errors: {:?}",
            errors.iter().map(|e| &e.message).collect::<Vec<_>>()
        );
        assert_eq!(tree.text(), source);
        tree
    }

    #[test]
    fn integration_async_package() {
        let tree = parse_ok(
            r#"// Copyright
using System;
using System.Runtime.InteropServices;
using System.Threading;
using Microsoft.VisualStudio.Shell;
using Microsoft.VisualStudio.Shell.Interop;
using Task = System.Threading.Tasks.Task;

namespace Contoso.Extension
{
    [PackageRegistration(UseManagedResourcesOnly = true, AllowsBackgroundLoading = true)]
    [Guid(PackageGuidString)]
    [ProvideAutoLoad(UIContextGuids80.SolutionExists, PackageAutoLoadFlags.BackgroundLoad)]
    public sealed class ContosoPackage : AsyncPackage
    {
        public const string PackageGuidString = "0b8d8f2c-0000-0000-0000-000000000000";

        private IVsSolution? solution;

        protected override async Task InitializeAsync(CancellationToken cancellationToken, IProgress<ServiceProgressData> progress)
        {
            await JoinableTaskFactory.SwitchToMainThreadAsync(cancellationToken);
            solution = await GetServiceAsync(typeof(SVsSolution)) as IVsSolution;
            if (solution is null)
            {
                return;
            }

            solution?.GetProperty((int)__VSPROPID.VSPROPID_IsSolutionOpen, out object open);
            _ = Task.Run(async () => await DoWorkAsync().ConfigureAwait(false));
            var items = new List<string> { "a", $"b{open}" };
            foreach (var item in items)
            {
                Console.WriteLine(item is string s && s.Length > 0 ? s : "<none>");
            }
        }

        private async Task DoWorkAsync() => await Task.Delay(10);
    }
}
"#,
        );
        let classes: Vec<_> = tree
            .root()
            .descendants()
            .filter(|n| n.kind() == SyntaxKind::ClassDeclaration)
            .collect();
        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0].identifier_text(), "ContosoPackage");
        assert_eq!(classes[0].members().count(), 4);
    }

    #[test]
    fn errors_keep_text_lossless() {
        let source = "class C {\n  void M() {\n    int x = ;\n    if (x {\n  }\n";
        let (tree, errors) = parse_source(source);
        assert!(!errors.is_empty());
        assert_eq!(tree.text(), source);
    }

    #[test]
    fn deeply_nested_input_is_rejected_without_overflow() {
        let source = format!("class C {{ int x = {}1{}; }}", "(".repeat(500), ")".repeat(500));
        let (tree, errors) = parse_source(&source);
        assert!(errors.iter().any(|e| e.message.contains("nested too deeply")));
        assert_eq!(tree.text(), source);
    }

    #[test]
    fn kinds_serialize_by_name() {
        let json = serde_json::to_string(&SyntaxKind::InvocationExpression).unwrap();
        assert_eq!(json, "\"InvocationExpression\"");
    }
}
