//! Constructing syntax from source snippets.
//!
//! Code fixes build replacement nodes by parsing small snippets such as
//! `"x is null"` or `"using Microsoft.VisualStudio.Shell;"` rather than
//! assembling green nodes by hand. Each function parses exactly one
//! construct and fails if the snippet has errors or trailing input.

use crate::green::{GreenNode, GreenToken};
use crate::kind::SyntaxKind;
use crate::lexer::lex;
use crate::parser::{identifier_name, CSharpParser, TypeMode};
use thiserror::Error;
use vssdk_diagnostics::DiagnosticSink;
use vssdk_source::FileId;

/// A snippet that did not parse as the requested construct.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot parse `{snippet}` as {construct}: {message}")]
pub struct MakeError {
    /// The snippet text.
    pub snippet: String,
    /// What the snippet was parsed as.
    pub construct: &'static str,
    /// The first parse error.
    pub message: String,
}

fn parse_snippet(
    snippet: &str,
    construct: &'static str,
    parse: impl FnOnce(&mut CSharpParser<'_>) -> GreenNode,
) -> Result<GreenNode, MakeError> {
    let sink = DiagnosticSink::new();
    let tokens = lex(snippet, FileId::DUMMY, &sink);
    let mut parser = CSharpParser::new(tokens, FileId::DUMMY, &sink);
    let node = parse(&mut parser);
    if !parser.at_eof() {
        parser.expected("end of snippet");
    }
    match sink.take_all().into_iter().next() {
        Some(diag) => Err(MakeError {
            snippet: snippet.to_string(),
            construct,
            message: diag.message,
        }),
        None => Ok(node),
    }
}

/// Parses an expression.
pub fn parse_expression(snippet: &str) -> Result<GreenNode, MakeError> {
    parse_snippet(snippet, "an expression", |p| p.parse_expression())
}

/// Parses a statement, including its terminating `;`.
pub fn parse_statement(snippet: &str) -> Result<GreenNode, MakeError> {
    parse_snippet(snippet, "a statement", |p| p.parse_statement())
}

/// Parses a type.
pub fn parse_type(snippet: &str) -> Result<GreenNode, MakeError> {
    parse_snippet(snippet, "a type", |p| p.parse_type(TypeMode::Normal))
}

/// Parses a `using` directive.
pub fn parse_using_directive(snippet: &str) -> Result<GreenNode, MakeError> {
    parse_snippet(snippet, "a using directive", |p| p.parse_using_directive())
}

/// Parses a parenthesized parameter list.
pub fn parse_parameter_list(snippet: &str) -> Result<GreenNode, MakeError> {
    parse_snippet(snippet, "a parameter list", |p| p.parse_parameter_list())
}

/// Parses a single attribute argument such as `UIContextGuids80.NoSolution`
/// or `AllowsBackgroundLoading = true`.
pub fn parse_attribute_argument(snippet: &str) -> Result<GreenNode, MakeError> {
    parse_snippet(snippet, "an attribute argument", |p| {
        p.parse_attribute_argument()
    })
}

/// Parses a member declaration.
pub fn parse_member(snippet: &str) -> Result<GreenNode, MakeError> {
    parse_snippet(snippet, "a member declaration", |p| {
        p.parse_member()
            .unwrap_or_else(|| GreenNode::new(SyntaxKind::SkippedTokens, Vec::new()))
    })
}

/// A token with its fixed text, such as `;` or `await`.
pub fn token(kind: SyntaxKind) -> GreenToken {
    GreenToken::fixed(kind)
}

/// An `IdentifierName` node for `name`.
pub fn identifier(name: &str) -> GreenNode {
    identifier_name(GreenToken::new(SyntaxKind::Identifier, name).into())
}
