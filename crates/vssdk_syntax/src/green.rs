//! Position-independent tree elements.
//!
//! Green elements own their text and trivia but know nothing about their
//! parent or offset, so they can be built by the parser, synthesized by code
//! fixes and spliced into existing trees. A [`crate::SyntaxTree`] is always
//! constructed from a root [`GreenNode`].

use crate::kind::SyntaxKind;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ANNOTATION: AtomicU64 = AtomicU64::new(1);

/// An opaque marker attached to a node so it can be found again after the
/// tree around it has been rewritten.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Annotation(u64);

impl Annotation {
    /// Returns an annotation distinct from every other annotation created in
    /// this process.
    pub fn fresh() -> Self {
        Self(NEXT_ANNOTATION.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw numeric value.
    pub fn as_raw(self) -> u64 {
        self.0
    }
}

/// A token with its leading and trailing trivia.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct GreenToken {
    /// The token kind.
    pub kind: SyntaxKind,
    /// The token text. Empty for tokens inserted by error recovery.
    pub text: String,
    /// Whitespace, comments and directives before the token.
    pub leading: String,
    /// Trivia after the token up to and including the end of its line.
    pub trailing: String,
}

impl GreenToken {
    /// Creates a token without trivia.
    pub fn new(kind: SyntaxKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            leading: String::new(),
            trailing: String::new(),
        }
    }

    /// Creates a zero-width token standing in for one that was expected but absent.
    pub fn missing(kind: SyntaxKind) -> Self {
        Self::new(kind, "")
    }

    /// Creates a punctuation or keyword token from its fixed text.
    pub fn fixed(kind: SyntaxKind) -> Self {
        Self::new(kind, kind.token_text().unwrap_or_default())
    }

    /// Replaces the leading trivia.
    pub fn with_leading(mut self, leading: impl Into<String>) -> Self {
        self.leading = leading.into();
        self
    }

    /// Replaces the trailing trivia.
    pub fn with_trailing(mut self, trailing: impl Into<String>) -> Self {
        self.trailing = trailing.into();
        self
    }

    /// Returns `true` if this token was inserted by error recovery.
    pub fn is_missing(&self) -> bool {
        self.text.is_empty() && self.kind != SyntaxKind::EndOfFile
    }

    /// Length of the token including trivia, in bytes.
    pub fn full_len(&self) -> usize {
        self.leading.len() + self.text.len() + self.trailing.len()
    }

    fn write_to(&self, out: &mut String) {
        out.push_str(&self.leading);
        out.push_str(&self.text);
        out.push_str(&self.trailing);
    }
}

/// A child of a [`GreenNode`].
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum GreenElement {
    /// A nested node.
    Node(GreenNode),
    /// A token.
    Token(GreenToken),
}

impl GreenElement {
    /// The kind of the node or token.
    pub fn kind(&self) -> SyntaxKind {
        match self {
            GreenElement::Node(n) => n.kind,
            GreenElement::Token(t) => t.kind,
        }
    }

    /// Returns the node, if this element is one.
    pub fn as_node(&self) -> Option<&GreenNode> {
        match self {
            GreenElement::Node(n) => Some(n),
            GreenElement::Token(_) => None,
        }
    }

    fn write_to(&self, out: &mut String) {
        match self {
            GreenElement::Node(n) => n.write_to(out),
            GreenElement::Token(t) => t.write_to(out),
        }
    }

    fn first_token_mut(&mut self) -> Option<&mut GreenToken> {
        match self {
            GreenElement::Node(n) => n.first_token_mut(),
            GreenElement::Token(t) => Some(t),
        }
    }

    fn last_token_mut(&mut self) -> Option<&mut GreenToken> {
        match self {
            GreenElement::Node(n) => n.last_token_mut(),
            GreenElement::Token(t) => Some(t),
        }
    }
}

impl From<GreenNode> for GreenElement {
    fn from(node: GreenNode) -> Self {
        GreenElement::Node(node)
    }
}

impl From<GreenToken> for GreenElement {
    fn from(token: GreenToken) -> Self {
        GreenElement::Token(token)
    }
}

/// An interior node: a kind, ordered children and any annotations.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct GreenNode {
    /// The node kind.
    pub kind: SyntaxKind,
    /// Child nodes and tokens in source order.
    pub children: Vec<GreenElement>,
    /// Annotations attached to this node.
    pub annotations: Vec<Annotation>,
}

impl GreenNode {
    /// Creates a node without annotations.
    pub fn new(kind: SyntaxKind, children: Vec<GreenElement>) -> Self {
        Self {
            kind,
            children,
            annotations: Vec::new(),
        }
    }

    /// Adds an annotation to this node.
    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        if !self.annotations.contains(&annotation) {
            self.annotations.push(annotation);
        }
        self
    }

    /// Prints the node, including all trivia.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.write_to(&mut out);
        out
    }

    /// Prints the node without the leading trivia of its first token and the
    /// trailing trivia of its last token.
    pub fn trimmed_text(&self) -> String {
        let mut copy = self.clone();
        copy.set_leading_trivia("");
        copy.set_trailing_trivia("");
        copy.text()
    }

    fn write_to(&self, out: &mut String) {
        for child in &self.children {
            child.write_to(out);
        }
    }

    /// Iterates over child nodes, skipping tokens.
    pub fn child_nodes(&self) -> impl Iterator<Item = &GreenNode> {
        self.children.iter().filter_map(GreenElement::as_node)
    }

    /// Returns the first token of the subtree.
    pub fn first_token(&self) -> Option<&GreenToken> {
        self.children.iter().find_map(|c| match c {
            GreenElement::Node(n) => n.first_token(),
            GreenElement::Token(t) => Some(t),
        })
    }

    /// Returns the last token of the subtree.
    pub fn last_token(&self) -> Option<&GreenToken> {
        self.children.iter().rev().find_map(|c| match c {
            GreenElement::Node(n) => n.last_token(),
            GreenElement::Token(t) => Some(t),
        })
    }

    /// Returns the first token of the subtree mutably.
    pub fn first_token_mut(&mut self) -> Option<&mut GreenToken> {
        self.children
            .iter_mut()
            .find_map(GreenElement::first_token_mut)
    }

    /// Returns the last token of the subtree mutably.
    pub fn last_token_mut(&mut self) -> Option<&mut GreenToken> {
        self.children
            .iter_mut()
            .rev()
            .find_map(GreenElement::last_token_mut)
    }

    /// Leading trivia of the first token.
    pub fn leading_trivia(&self) -> &str {
        self.first_token().map_or("", |t| t.leading.as_str())
    }

    /// Trailing trivia of the last token.
    pub fn trailing_trivia(&self) -> &str {
        self.last_token().map_or("", |t| t.trailing.as_str())
    }

    /// Replaces the leading trivia of the first token.
    pub fn set_leading_trivia(&mut self, trivia: impl Into<String>) {
        if let Some(t) = self.first_token_mut() {
            t.leading = trivia.into();
        }
    }

    /// Replaces the trailing trivia of the last token.
    pub fn set_trailing_trivia(&mut self, trivia: impl Into<String>) {
        if let Some(t) = self.last_token_mut() {
            t.trailing = trivia.into();
        }
    }

    /// Builder form of [`GreenNode::set_leading_trivia`].
    pub fn with_leading_trivia(mut self, trivia: impl Into<String>) -> Self {
        self.set_leading_trivia(trivia);
        self
    }

    /// Builder form of [`GreenNode::set_trailing_trivia`].
    pub fn with_trailing_trivia(mut self, trivia: impl Into<String>) -> Self {
        self.set_trailing_trivia(trivia);
        self
    }

    /// Finds the first descendant node (or this node) of the given kind, in
    /// pre-order.
    pub fn find_kind_mut(&mut self, kind: SyntaxKind) -> Option<&mut GreenNode> {
        if self.kind == kind {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| match c {
            GreenElement::Node(n) => n.find_kind_mut(kind),
            GreenElement::Token(_) => None,
        })
    }
}
