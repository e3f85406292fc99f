//! Core parser infrastructure, names, types and attributes.
//!
//! The [`CSharpParser`] struct provides primitive operations (bump, expect,
//! eat), speculative scanning used to disambiguate generics, casts and
//! declarations, and error recovery. Parse methods build [`GreenNode`]s
//! bottom-up; a node's kind is chosen once all of its children are known.
//! Declarations, statements, expressions and patterns live in sibling
//! modules as further `impl` blocks.

use crate::green::{GreenElement, GreenNode, GreenToken};
use crate::kind::SyntaxKind;
use crate::lexer::LexedToken;
use vssdk_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};
use vssdk_source::{FileId, Span};

/// Code for parse errors.
pub const PARSE_ERROR: DiagnosticCode = DiagnosticCode::new(Category::Syntax, 2);

/// Nesting depth at which the parser stops descending.
const MAX_DEPTH: usize = 200;

/// How a `?` after a type is treated while parsing or scanning it.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum TypeMode {
    /// Declarations: `T?` is always a nullable type.
    Normal,
    /// Casts and `as`: `T?` only when the `?` cannot start a conditional.
    Expression,
    /// Patterns: never consume `?`.
    Pattern,
}

/// A recursive descent parser for C# source text.
///
/// The parser consumes the token stream produced by the lexer and builds a
/// lossless green tree. Errors are reported to the diagnostic sink; missing
/// tokens are inserted as zero-width tokens and unplaceable tokens are kept
/// in [`SyntaxKind::SkippedTokens`] nodes, so every input produces a tree
/// that prints back to exactly the input.
pub struct CSharpParser<'src> {
    pub(crate) tokens: Vec<LexedToken>,
    pub(crate) pos: usize,
    file: FileId,
    sink: &'src DiagnosticSink,
    pub(crate) depth: usize,
}

impl<'src> CSharpParser<'src> {
    /// Creates a parser over tokens lexed from a file.
    pub fn new(tokens: Vec<LexedToken>, file: FileId, sink: &'src DiagnosticSink) -> Self {
        Self {
            tokens,
            pos: 0,
            file,
            sink,
            depth: 0,
        }
    }

    // ========================================================================
    // Primitive operations
    // ========================================================================

    /// Returns the kind of the token at `pos`, or `EndOfFile` past the end.
    pub(crate) fn kind_at(&self, pos: usize) -> SyntaxKind {
        self.tokens
            .get(pos)
            .map_or(SyntaxKind::EndOfFile, |t| t.kind())
    }

    /// Returns the text of the token at `pos`.
    pub(crate) fn text_at(&self, pos: usize) -> &str {
        self.tokens.get(pos).map_or("", |t| t.token.text.as_str())
    }

    /// Returns the kind of the current token.
    pub(crate) fn current(&self) -> SyntaxKind {
        self.kind_at(self.pos)
    }

    /// Returns the kind of the token `n` positions ahead.
    pub(crate) fn nth(&self, n: usize) -> SyntaxKind {
        self.kind_at(self.pos + n)
    }

    /// Returns `true` if the current token matches the given kind.
    pub(crate) fn at(&self, kind: SyntaxKind) -> bool {
        self.current() == kind
    }

    /// Returns `true` if the parser is at end of file.
    pub(crate) fn at_eof(&self) -> bool {
        self.at(SyntaxKind::EndOfFile)
    }

    /// Returns `true` if the token at `pos` is the identifier `text`.
    pub(crate) fn is_contextual_at(&self, pos: usize, text: &str) -> bool {
        self.kind_at(pos) == SyntaxKind::Identifier && self.text_at(pos) == text
    }

    /// Returns `true` if the current token is the identifier `text`.
    pub(crate) fn at_contextual(&self, text: &str) -> bool {
        self.is_contextual_at(self.pos, text)
    }

    /// Returns `true` if no trivia separates the token at `pos` from the next one.
    pub(crate) fn adjacent(&self, pos: usize) -> bool {
        match (self.tokens.get(pos), self.tokens.get(pos + 1)) {
            (Some(a), Some(b)) => a.token.trailing.is_empty() && b.token.leading.is_empty(),
            _ => false,
        }
    }

    /// Returns the span of the current token.
    pub(crate) fn current_span(&self) -> Span {
        match self.tokens.get(self.pos) {
            Some(t) => Span::new(
                self.file,
                t.offset,
                t.offset + t.token.text.len() as u32,
            ),
            None => Span::new(self.file, 0, 0),
        }
    }

    /// Consumes the current token. At end of file a missing token is returned.
    pub(crate) fn bump(&mut self) -> GreenElement {
        if self.at_eof() {
            return GreenToken::missing(SyntaxKind::Identifier).into();
        }
        let token = self.tokens[self.pos].token.clone();
        self.pos += 1;
        token.into()
    }

    /// Consumes the current token, re-tagging it with `kind`.
    pub(crate) fn bump_remap(&mut self, kind: SyntaxKind) -> GreenElement {
        let mut element = self.bump();
        if let GreenElement::Token(t) = &mut element {
            t.kind = kind;
        }
        element
    }

    /// Consumes the current token if it matches `kind`.
    pub(crate) fn eat(&mut self, kind: SyntaxKind) -> Option<GreenElement> {
        self.at(kind).then(|| self.bump())
    }

    /// Pushes the current token onto `out` if it matches `kind`.
    pub(crate) fn eat_into(&mut self, kind: SyntaxKind, out: &mut Vec<GreenElement>) -> bool {
        match self.eat(kind) {
            Some(t) => {
                out.push(t);
                true
            }
            None => false,
        }
    }

    /// Expects the current token to match `kind`. Emits an error and returns a
    /// missing token if not.
    pub(crate) fn expect(&mut self, kind: SyntaxKind) -> GreenElement {
        if let Some(t) = self.eat(kind) {
            return t;
        }
        let what = kind
            .token_text()
            .map_or_else(|| format!("{kind:?}"), |t| format!("'{t}'"));
        self.expected(&what);
        GreenToken::missing(kind).into()
    }

    /// Expects an identifier.
    pub(crate) fn expect_ident(&mut self) -> GreenElement {
        if let Some(t) = self.eat(SyntaxKind::Identifier) {
            return t;
        }
        self.expected("identifier");
        GreenToken::missing(SyntaxKind::Identifier).into()
    }

    /// Wraps the current token in a `SkippedTokens` node.
    pub(crate) fn skip_token(&mut self) -> GreenNode {
        GreenNode::new(SyntaxKind::SkippedTokens, vec![self.bump()])
    }

    /// Enters one level of nesting. Returns `false` (after reporting) when
    /// the input nests too deeply to parse.
    pub(crate) fn enter(&mut self) -> bool {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            self.error("construct is nested too deeply");
            return false;
        }
        true
    }

    /// Leaves one level of nesting.
    pub(crate) fn leave(&mut self) {
        self.depth -= 1;
    }

    // ========================================================================
    // Error handling
    // ========================================================================

    /// Emits an error diagnostic at the current position.
    pub(crate) fn error(&self, msg: &str) {
        self.sink
            .emit(Diagnostic::error(PARSE_ERROR, msg, self.current_span()));
    }

    /// Emits an "expected X" error at the current position.
    pub(crate) fn expected(&self, what: &str) {
        let found = if self.at_eof() {
            "end of file".to_string()
        } else {
            format!("'{}'", self.text_at(self.pos))
        };
        self.error(&format!("expected {what}, found {found}"));
    }

    // ========================================================================
    // Compilation unit
    // ========================================================================

    /// Parses a complete source file.
    pub fn parse_compilation_unit(&mut self) -> GreenNode {
        let mut children = Vec::new();
        self.parse_using_directives(&mut children);
        while self.at(SyntaxKind::OpenBracket) && self.is_global_attribute_start() {
            children.push(self.parse_attribute_list().into());
        }
        while !self.at_eof() {
            let before = self.pos;
            if let Some(member) = self.parse_namespace_member() {
                children.push(member.into());
            }
            if self.pos == before {
                self.expected("namespace or type declaration");
                children.push(self.skip_token().into());
            }
        }
        let eof = self.tokens[self.pos].token.clone();
        children.push(eof.into());
        GreenNode::new(SyntaxKind::CompilationUnit, children)
    }

    fn is_global_attribute_start(&self) -> bool {
        (self.is_contextual_at(self.pos + 1, "assembly")
            || self.is_contextual_at(self.pos + 1, "module"))
            && self.nth(2) == SyntaxKind::Colon
    }

    /// Parses consecutive `using` directives.
    pub(crate) fn parse_using_directives(&mut self, out: &mut Vec<GreenElement>) {
        while self.at(SyntaxKind::UsingKeyword) {
            out.push(self.parse_using_directive().into());
        }
    }

    /// Parses `using [static] [Alias =] Name;`.
    pub(crate) fn parse_using_directive(&mut self) -> GreenNode {
        let mut children = vec![self.expect(SyntaxKind::UsingKeyword)];
        self.eat_into(SyntaxKind::StaticKeyword, &mut children);
        if self.at(SyntaxKind::Identifier) && self.nth(1) == SyntaxKind::Equals {
            let alias = identifier_name(self.bump());
            let equals = self.bump();
            children.push(GreenNode::new(SyntaxKind::NameEquals, vec![alias.into(), equals]).into());
        }
        children.push(self.parse_type(TypeMode::Normal).into());
        children.push(self.expect(SyntaxKind::Semicolon));
        GreenNode::new(SyntaxKind::UsingDirective, children)
    }

    // ========================================================================
    // Attributes
    // ========================================================================

    /// Parses any attribute lists at the current position onto `out`.
    pub(crate) fn parse_attribute_lists(&mut self, out: &mut Vec<GreenElement>) {
        while self.at(SyntaxKind::OpenBracket) {
            out.push(self.parse_attribute_list().into());
        }
    }

    /// Parses `[target: A(...), B]`.
    pub(crate) fn parse_attribute_list(&mut self) -> GreenNode {
        let mut children = vec![self.expect(SyntaxKind::OpenBracket)];
        if self.nth(1) == SyntaxKind::Colon
            && (self.at(SyntaxKind::Identifier) || self.current().is_reserved_keyword())
        {
            let target = self.bump();
            let colon = self.bump();
            children.push(
                GreenNode::new(SyntaxKind::AttributeTargetSpecifier, vec![target, colon]).into(),
            );
        }
        loop {
            if self.at(SyntaxKind::CloseBracket) || self.at_eof() {
                break;
            }
            let before = self.pos;
            children.push(self.parse_attribute().into());
            if !self.eat_into(SyntaxKind::Comma, &mut children) || self.pos == before {
                break;
            }
        }
        children.push(self.expect(SyntaxKind::CloseBracket));
        GreenNode::new(SyntaxKind::AttributeList, children)
    }

    fn parse_attribute(&mut self) -> GreenNode {
        let mut children = vec![self.parse_name().into()];
        if self.at(SyntaxKind::OpenParen) {
            let mut args = vec![self.bump()];
            while !self.at(SyntaxKind::CloseParen) && !self.at_eof() {
                let before = self.pos;
                args.push(self.parse_attribute_argument().into());
                if !self.eat_into(SyntaxKind::Comma, &mut args) || self.pos == before {
                    break;
                }
            }
            args.push(self.expect(SyntaxKind::CloseParen));
            children.push(GreenNode::new(SyntaxKind::AttributeArgumentList, args).into());
        }
        GreenNode::new(SyntaxKind::Attribute, children)
    }

    /// Parses `Name = expr`, `name: expr` or `expr`.
    pub(crate) fn parse_attribute_argument(&mut self) -> GreenNode {
        let mut children = Vec::new();
        if self.at(SyntaxKind::Identifier) && self.nth(1) == SyntaxKind::Equals {
            let name = identifier_name(self.bump());
            let equals = self.bump();
            children.push(GreenNode::new(SyntaxKind::NameEquals, vec![name.into(), equals]).into());
        } else if self.at(SyntaxKind::Identifier) && self.nth(1) == SyntaxKind::Colon {
            let name = identifier_name(self.bump());
            let colon = self.bump();
            children.push(GreenNode::new(SyntaxKind::NameColon, vec![name.into(), colon]).into());
        }
        children.push(self.parse_expression().into());
        GreenNode::new(SyntaxKind::AttributeArgument, children)
    }

    // ========================================================================
    // Names and types
    // ========================================================================

    /// Parses a possibly qualified, possibly generic name such as
    /// `global::System.Collections.Generic.List<T>`.
    pub(crate) fn parse_name(&mut self) -> GreenNode {
        let mut left = if self.at(SyntaxKind::Identifier) && self.nth(1) == SyntaxKind::ColonColon {
            let alias_kind = if self.at_contextual("global") {
                SyntaxKind::GlobalKeyword
            } else {
                SyntaxKind::Identifier
            };
            let alias = identifier_name(self.bump_remap(alias_kind));
            let colons = self.bump();
            let right = self.parse_simple_name_in_type();
            GreenNode::new(
                SyntaxKind::AliasQualifiedName,
                vec![alias.into(), colons, right.into()],
            )
        } else {
            self.parse_simple_name_in_type()
        };
        while self.at(SyntaxKind::Dot) && self.nth(1) == SyntaxKind::Identifier {
            let dot = self.bump();
            let right = self.parse_simple_name_in_type();
            left = GreenNode::new(SyntaxKind::QualifiedName, vec![left.into(), dot, right.into()]);
        }
        left
    }

    /// Parses an identifier with an optional type argument list, in a
    /// position where `<` always starts type arguments.
    pub(crate) fn parse_simple_name_in_type(&mut self) -> GreenNode {
        let ident = self.expect_ident();
        if self.at(SyntaxKind::LessThan) {
            let args = self.parse_type_argument_list();
            return GreenNode::new(SyntaxKind::GenericName, vec![ident, args.into()]);
        }
        identifier_name(ident)
    }

    /// Parses `<T, U>` or the omitted form `<,>`.
    pub(crate) fn parse_type_argument_list(&mut self) -> GreenNode {
        let mut children = vec![self.expect(SyntaxKind::LessThan)];
        if self.at(SyntaxKind::Comma) || self.at(SyntaxKind::GreaterThan) {
            children.push(omitted_type_argument().into());
            while self.at(SyntaxKind::Comma) {
                children.push(self.bump());
                children.push(omitted_type_argument().into());
            }
        } else {
            loop {
                children.push(self.parse_type(TypeMode::Normal).into());
                if !self.eat_into(SyntaxKind::Comma, &mut children) {
                    break;
                }
            }
        }
        children.push(self.expect(SyntaxKind::GreaterThan));
        GreenNode::new(SyntaxKind::TypeArgumentList, children)
    }

    /// Parses a type with nullable and array suffixes.
    pub(crate) fn parse_type(&mut self, mode: TypeMode) -> GreenNode {
        let core = self.parse_non_array_type();
        self.parse_type_suffixes(core, mode)
    }

    /// Parses a predefined type, tuple type or name.
    pub(crate) fn parse_non_array_type(&mut self) -> GreenNode {
        let kind = self.current();
        if kind.is_predefined_type() {
            return GreenNode::new(SyntaxKind::PredefinedType, vec![self.bump()]);
        }
        match kind {
            SyntaxKind::Identifier => self.parse_name(),
            SyntaxKind::OpenParen => self.parse_tuple_type(),
            _ => {
                self.expected("type");
                identifier_name(GreenToken::missing(SyntaxKind::Identifier).into())
            }
        }
    }

    fn parse_tuple_type(&mut self) -> GreenNode {
        if !self.enter() {
            self.leave();
            return identifier_name(self.bump());
        }
        let ty = self.parse_tuple_type_inner();
        self.leave();
        ty
    }

    fn parse_tuple_type_inner(&mut self) -> GreenNode {
        let mut children = vec![self.bump()];
        loop {
            let mut element = vec![self.parse_type(TypeMode::Normal).into()];
            self.eat_into(SyntaxKind::Identifier, &mut element);
            children.push(GreenNode::new(SyntaxKind::TupleElement, element).into());
            if !self.eat_into(SyntaxKind::Comma, &mut children) {
                break;
            }
        }
        children.push(self.expect(SyntaxKind::CloseParen));
        GreenNode::new(SyntaxKind::TupleType, children)
    }

    /// Applies `?` and `[]` suffixes to an already parsed type.
    pub(crate) fn parse_type_suffixes(&mut self, mut ty: GreenNode, mode: TypeMode) -> GreenNode {
        loop {
            if self.at(SyntaxKind::Question) && self.nullable_allowed(self.pos, mode) {
                let q = self.bump();
                ty = GreenNode::new(SyntaxKind::NullableType, vec![ty.into(), q]);
                continue;
            }
            if self.at(SyntaxKind::OpenBracket) && self.is_rank_specifier(self.pos) {
                let mut children = vec![ty.into()];
                while self.at(SyntaxKind::OpenBracket) && self.is_rank_specifier(self.pos) {
                    let mut rank = vec![self.bump()];
                    while self.eat_into(SyntaxKind::Comma, &mut rank) {}
                    rank.push(self.expect(SyntaxKind::CloseBracket));
                    children.push(GreenNode::new(SyntaxKind::ArrayRankSpecifier, rank).into());
                }
                ty = GreenNode::new(SyntaxKind::ArrayType, children);
                continue;
            }
            return ty;
        }
    }

    /// Returns `true` if `[` at `pos` starts an empty rank specifier `[]` / `[,]`.
    fn is_rank_specifier(&self, pos: usize) -> bool {
        let mut p = pos + 1;
        while self.kind_at(p) == SyntaxKind::Comma {
            p += 1;
        }
        self.kind_at(p) == SyntaxKind::CloseBracket
    }

    /// Decides whether `?` at `pos` belongs to the type being parsed.
    fn nullable_allowed(&self, pos: usize, mode: TypeMode) -> bool {
        match mode {
            TypeMode::Normal => true,
            TypeMode::Pattern => false,
            TypeMode::Expression => matches!(
                self.kind_at(pos + 1),
                SyntaxKind::CloseParen
                    | SyntaxKind::Comma
                    | SyntaxKind::Semicolon
                    | SyntaxKind::CloseBracket
                    | SyntaxKind::CloseBrace
                    | SyntaxKind::GreaterThan
                    | SyntaxKind::QuestionQuestion
                    | SyntaxKind::EndOfFile
            ),
        }
    }

    // ========================================================================
    // Speculative scanning
    // ========================================================================

    /// Scans a type starting at `pos` without consuming anything. Returns the
    /// position after the type.
    pub(crate) fn scan_type(&self, pos: usize, mode: TypeMode) -> Option<usize> {
        let mut p = self.scan_non_array_type(pos)?;
        loop {
            if self.kind_at(p) == SyntaxKind::Question && self.nullable_allowed(p, mode) {
                p += 1;
                continue;
            }
            if self.kind_at(p) == SyntaxKind::OpenBracket && self.is_rank_specifier(p) {
                p += 1;
                while self.kind_at(p) == SyntaxKind::Comma {
                    p += 1;
                }
                p += 1;
                continue;
            }
            return Some(p);
        }
    }

    fn scan_non_array_type(&self, pos: usize) -> Option<usize> {
        let kind = self.kind_at(pos);
        if kind.is_predefined_type() {
            return Some(pos + 1);
        }
        match kind {
            SyntaxKind::Identifier => {
                let mut p = pos + 1;
                if self.kind_at(p) == SyntaxKind::ColonColon
                    && self.kind_at(p + 1) == SyntaxKind::Identifier
                {
                    p += 2;
                }
                if self.kind_at(p) == SyntaxKind::LessThan {
                    p = self.scan_type_argument_list(p)?;
                }
                while self.kind_at(p) == SyntaxKind::Dot
                    && self.kind_at(p + 1) == SyntaxKind::Identifier
                {
                    p += 2;
                    if self.kind_at(p) == SyntaxKind::LessThan {
                        p = self.scan_type_argument_list(p)?;
                    }
                }
                Some(p)
            }
            SyntaxKind::OpenParen => {
                let mut p = pos + 1;
                let mut elements = 0;
                loop {
                    p = self.scan_type(p, TypeMode::Normal)?;
                    if self.kind_at(p) == SyntaxKind::Identifier {
                        p += 1;
                    }
                    elements += 1;
                    match self.kind_at(p) {
                        SyntaxKind::Comma => p += 1,
                        SyntaxKind::CloseParen if elements >= 2 => return Some(p + 1),
                        _ => return None,
                    }
                }
            }
            _ => None,
        }
    }

    /// Scans `<...>` at `pos`. Returns the position after `>`.
    pub(crate) fn scan_type_argument_list(&self, pos: usize) -> Option<usize> {
        let mut p = pos + 1;
        if matches!(self.kind_at(p), SyntaxKind::Comma | SyntaxKind::GreaterThan) {
            while self.kind_at(p) == SyntaxKind::Comma {
                p += 1;
            }
            return (self.kind_at(p) == SyntaxKind::GreaterThan).then_some(p + 1);
        }
        loop {
            p = self.scan_type(p, TypeMode::Normal)?;
            match self.kind_at(p) {
                SyntaxKind::Comma => p += 1,
                SyntaxKind::GreaterThan => return Some(p + 1),
                _ => return None,
            }
        }
    }

    /// Finds the `)` matching the `(` at `pos`, without crossing statement
    /// boundaries.
    pub(crate) fn matching_paren(&self, pos: usize) -> Option<usize> {
        let mut depth = 0usize;
        let mut p = pos;
        loop {
            match self.kind_at(p) {
                SyntaxKind::OpenParen => depth += 1,
                SyntaxKind::CloseParen => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(p);
                    }
                }
                SyntaxKind::Semicolon
                | SyntaxKind::OpenBrace
                | SyntaxKind::CloseBrace
                | SyntaxKind::EndOfFile => return None,
                _ => {}
            }
            p += 1;
        }
    }
}

/// Wraps an identifier token in an `IdentifierName` node.
pub(crate) fn identifier_name(ident: GreenElement) -> GreenNode {
    GreenNode::new(SyntaxKind::IdentifierName, vec![ident])
}

fn omitted_type_argument() -> GreenNode {
    GreenNode::new(
        SyntaxKind::OmittedTypeArgument,
        vec![GreenToken::missing(SyntaxKind::Identifier).into()],
    )
}
