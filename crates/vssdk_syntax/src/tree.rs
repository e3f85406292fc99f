//! Arena-backed syntax trees with parent links, spans and editing.
//!
//! A [`SyntaxTree`] is an immutable snapshot built from a root
//! [`GreenNode`]. Nodes and tokens are stored in pre-order in flat vectors
//! and addressed by [`NodeId`] / [`TokenId`], so a node's descendants occupy
//! a contiguous id range and document order equals id order.
//!
//! Edits never mutate a tree. A [`TreeEditor`] records replacements,
//! insertions and removals against one tree and produces a new tree from
//! them. Annotations survive edits, which is how callers re-locate nodes
//! after the tree has changed shape.

use crate::green::{Annotation, GreenElement, GreenNode, GreenToken};
use crate::kind::SyntaxKind;
use std::collections::HashMap;
use std::fmt;
use vssdk_source::{FileId, Span};

/// Index of a node within its [`SyntaxTree`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct NodeId(u32);

impl NodeId {
    /// Creates a node id from a raw index.
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw index.
    pub fn as_raw(self) -> u32 {
        self.0
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of a token within its [`SyntaxTree`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct TokenId(u32);

impl TokenId {
    /// Returns the raw index.
    pub fn as_raw(self) -> u32 {
        self.0
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A child slot: either a node or a token.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Element {
    /// A child node.
    Node(NodeId),
    /// A child token.
    Token(TokenId),
}

#[derive(Clone, Debug)]
struct NodeData {
    kind: SyntaxKind,
    parent: Option<NodeId>,
    children: Vec<Element>,
    annotations: Vec<Annotation>,
    span: Span,
    /// One past the id of the last descendant.
    end: u32,
    /// Range of token ids covered by this node.
    tokens: (u32, u32),
}

#[derive(Clone, Debug)]
struct TokenData {
    kind: SyntaxKind,
    text: String,
    leading: String,
    trailing: String,
    parent: NodeId,
    /// Byte offset of the token text (after leading trivia).
    offset: u32,
}

/// An immutable, lossless syntax tree for one source file.
#[derive(Clone, Debug)]
pub struct SyntaxTree {
    file: FileId,
    nodes: Vec<NodeData>,
    tokens: Vec<TokenData>,
}

struct Builder {
    file: FileId,
    nodes: Vec<NodeData>,
    tokens: Vec<TokenData>,
    offset: u32,
}

impl Builder {
    fn build(&mut self, green: &GreenNode, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeData {
            kind: green.kind,
            parent,
            children: Vec::with_capacity(green.children.len()),
            annotations: green.annotations.clone(),
            span: Span::DUMMY,
            end: 0,
            tokens: (0, 0),
        });
        let full_start = self.offset;
        let token_start = self.tokens.len() as u32;
        let mut text_range: Option<(u32, u32)> = None;
        let mut children = Vec::with_capacity(green.children.len());

        for child in &green.children {
            match child {
                GreenElement::Node(n) => {
                    let child_id = self.build(n, Some(id));
                    children.push(Element::Node(child_id));
                    let data = &self.nodes[child_id.index()];
                    let (first, last) = data.tokens;
                    if (first..last).any(|t| !self.tokens[t as usize].text.is_empty()) {
                        let span = data.span;
                        text_range = Some(match text_range {
                            Some((s, _)) => (s, span.end),
                            None => (span.start, span.end),
                        });
                    }
                }
                GreenElement::Token(t) => {
                    let token_id = TokenId(self.tokens.len() as u32);
                    self.offset += t.leading.len() as u32;
                    let start = self.offset;
                    self.offset += t.text.len() as u32;
                    let end = self.offset;
                    self.offset += t.trailing.len() as u32;
                    self.tokens.push(TokenData {
                        kind: t.kind,
                        text: t.text.clone(),
                        leading: t.leading.clone(),
                        trailing: t.trailing.clone(),
                        parent: id,
                        offset: start,
                    });
                    children.push(Element::Token(token_id));
                    if !t.text.is_empty() {
                        text_range = Some(match text_range {
                            Some((s, _)) => (s, end),
                            None => (start, end),
                        });
                    }
                }
            }
        }

        let (start, end) = text_range.unwrap_or((full_start, full_start));
        let end_id = self.nodes.len() as u32;
        let token_end = self.tokens.len() as u32;
        let data = &mut self.nodes[id.index()];
        data.children = children;
        data.span = Span::new(self.file, start, end);
        data.end = end_id;
        data.tokens = (token_start, token_end);
        id
    }
}

impl SyntaxTree {
    /// Builds a tree for `file` from a root green node.
    pub fn from_green(file: FileId, root: &GreenNode) -> Self {
        let mut builder = Builder {
            file,
            nodes: Vec::new(),
            tokens: Vec::new(),
            offset: 0,
        };
        builder.build(root, None);
        Self {
            file: builder.file,
            nodes: builder.nodes,
            tokens: builder.tokens,
        }
    }

    /// The file this tree was parsed from.
    pub fn file(&self) -> FileId {
        self.file
    }

    /// The root node (a `CompilationUnit` for parsed files).
    pub fn root(&self) -> NodeRef<'_> {
        self.node(NodeId(0))
    }

    /// Returns a handle to the node with the given id.
    ///
    /// Panics if `id` does not belong to this tree.
    pub fn node(&self, id: NodeId) -> NodeRef<'_> {
        assert!(id.index() < self.nodes.len(), "node id out of range");
        NodeRef { tree: self, id }
    }

    /// Returns a handle to the node with the given id, if it exists.
    pub fn try_node(&self, id: NodeId) -> Option<NodeRef<'_>> {
        (id.index() < self.nodes.len()).then_some(NodeRef { tree: self, id })
    }

    /// Returns a handle to the token with the given id.
    pub fn token(&self, id: TokenId) -> TokenRef<'_> {
        TokenRef { tree: self, id }
    }

    /// Number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Iterates over all nodes in document order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeRef<'_>> {
        (0..self.nodes.len() as u32).map(move |i| NodeRef {
            tree: self,
            id: NodeId(i),
        })
    }

    /// Prints the whole tree, reproducing the source it was parsed from.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for t in &self.tokens {
            out.push_str(&t.leading);
            out.push_str(&t.text);
            out.push_str(&t.trailing);
        }
        out
    }

    /// Reconstructs the green node for `id`, including annotations.
    pub fn green_of(&self, id: NodeId) -> GreenNode {
        let data = &self.nodes[id.index()];
        let children = data
            .children
            .iter()
            .map(|c| match *c {
                Element::Node(n) => GreenElement::Node(self.green_of(n)),
                Element::Token(t) => GreenElement::Token(self.green_token(t)),
            })
            .collect();
        GreenNode {
            kind: data.kind,
            children,
            annotations: data.annotations.clone(),
        }
    }

    /// Reconstructs the green token for `id`.
    pub fn green_token(&self, id: TokenId) -> GreenToken {
        let t = &self.tokens[id.index()];
        GreenToken {
            kind: t.kind,
            text: t.text.clone(),
            leading: t.leading.clone(),
            trailing: t.trailing.clone(),
        }
    }

    /// Returns a copy of this tree with extra annotations attached.
    ///
    /// Node ids are unchanged, so ids computed against `self` remain valid
    /// for the returned tree.
    pub fn with_annotations(&self, annotations: &[(NodeId, Annotation)]) -> SyntaxTree {
        let mut tree = self.clone();
        for &(id, ann) in annotations {
            if let Some(data) = tree.nodes.get_mut(id.index()) {
                if !data.annotations.contains(&ann) {
                    data.annotations.push(ann);
                }
            }
        }
        tree
    }

    /// Finds the first node carrying `annotation`.
    pub fn find_annotated(&self, annotation: Annotation) -> Option<NodeRef<'_>> {
        self.nodes()
            .find(|n| self.nodes[n.id.index()].annotations.contains(&annotation))
    }

    /// Finds the outermost node of `kind` whose span is exactly `span`.
    pub fn find_node(&self, span: Span, kind: SyntaxKind) -> Option<NodeRef<'_>> {
        self.nodes().find(|n| n.kind() == kind && n.span() == span)
    }

    /// Finds the innermost node whose span contains `span`.
    pub fn covering_node(&self, span: Span) -> NodeRef<'_> {
        let mut current = self.root();
        'descend: loop {
            for child in current.child_nodes() {
                if child.span().start <= span.start && span.end <= child.span().end {
                    current = child;
                    continue 'descend;
                }
            }
            return current;
        }
    }

    /// Starts an edit against this tree.
    pub fn edit(&self) -> TreeEditor<'_> {
        TreeEditor {
            tree: self,
            replaced: HashMap::new(),
            before: HashMap::new(),
            after: HashMap::new(),
            tokens: HashMap::new(),
        }
    }
}

/// A borrowed handle to a node in a [`SyntaxTree`].
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a SyntaxTree,
    id: NodeId,
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for NodeRef<'_> {}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}@{}..{}",
            self.kind(),
            self.span().start,
            self.span().end
        )
    }
}

/// A child of a node: a node or token handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementRef<'a> {
    /// A child node.
    Node(NodeRef<'a>),
    /// A child token.
    Token(TokenRef<'a>),
}

impl<'a> ElementRef<'a> {
    /// The kind of the node or token.
    pub fn kind(&self) -> SyntaxKind {
        match self {
            ElementRef::Node(n) => n.kind(),
            ElementRef::Token(t) => t.kind(),
        }
    }
}

impl<'a> NodeRef<'a> {
    fn data(&self) -> &'a NodeData {
        &self.tree.nodes[self.id.index()]
    }

    /// The node's id.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The tree this node belongs to.
    pub fn tree(&self) -> &'a SyntaxTree {
        self.tree
    }

    /// The node's kind.
    pub fn kind(&self) -> SyntaxKind {
        self.data().kind
    }

    /// The span of the node's text, excluding outer trivia.
    pub fn span(&self) -> Span {
        self.data().span
    }

    /// Annotations attached to this node.
    pub fn annotations(&self) -> &'a [Annotation] {
        &self.data().annotations
    }

    /// The parent node, or `None` for the root.
    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.data().parent.map(|id| NodeRef {
            tree: self.tree,
            id,
        })
    }

    /// Iterates over proper ancestors, innermost first.
    pub fn ancestors(&self) -> impl Iterator<Item = NodeRef<'a>> {
        std::iter::successors(self.parent(), |n| n.parent())
    }

    /// Iterates over this node and its ancestors, innermost first.
    pub fn ancestors_and_self(&self) -> impl Iterator<Item = NodeRef<'a>> {
        std::iter::successors(Some(*self), |n| n.parent())
    }

    /// Iterates over children in source order.
    pub fn children(&self) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        let tree = self.tree;
        self.data().children.iter().map(move |c| match *c {
            Element::Node(id) => ElementRef::Node(NodeRef { tree, id }),
            Element::Token(id) => ElementRef::Token(TokenRef { tree, id }),
        })
    }

    /// Iterates over child nodes in source order.
    pub fn child_nodes(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        self.children().filter_map(|c| match c {
            ElementRef::Node(n) => Some(n),
            ElementRef::Token(_) => None,
        })
    }

    /// Iterates over child tokens in source order.
    pub fn child_tokens(&self) -> impl Iterator<Item = TokenRef<'a>> + 'a {
        self.children().filter_map(|c| match c {
            ElementRef::Node(_) => None,
            ElementRef::Token(t) => Some(t),
        })
    }

    /// Returns the `n`th child node.
    pub fn nth_child_node(&self, n: usize) -> Option<NodeRef<'a>> {
        self.child_nodes().nth(n)
    }

    /// Returns the first child node of `kind`.
    pub fn child_node(&self, kind: SyntaxKind) -> Option<NodeRef<'a>> {
        self.child_nodes().find(|c| c.kind() == kind)
    }

    /// Returns the first child token of `kind`.
    pub fn token(&self, kind: SyntaxKind) -> Option<TokenRef<'a>> {
        self.child_tokens().find(|t| t.kind() == kind)
    }

    /// Iterates over proper descendants in document order.
    pub fn descendants(&self) -> impl Iterator<Item = NodeRef<'a>> {
        let tree = self.tree;
        (self.id.0 + 1..self.data().end).map(move |i| NodeRef {
            tree,
            id: NodeId(i),
        })
    }

    /// Iterates over this node and its descendants in document order.
    pub fn descendants_and_self(&self) -> impl Iterator<Item = NodeRef<'a>> {
        let tree = self.tree;
        (self.id.0..self.data().end).map(move |i| NodeRef {
            tree,
            id: NodeId(i),
        })
    }

    /// Iterates over all tokens of the subtree in document order.
    pub fn tokens(&self) -> impl Iterator<Item = TokenRef<'a>> {
        let tree = self.tree;
        let (start, end) = self.data().tokens;
        (start..end).map(move |i| TokenRef {
            tree,
            id: TokenId(i),
        })
    }

    /// Returns `true` if `other` is a proper descendant of this node.
    pub fn is_ancestor_of(&self, other: NodeRef<'_>) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id < other.id && other.id.0 < self.data().end
    }

    /// The first token of the subtree.
    pub fn first_token(&self) -> Option<TokenRef<'a>> {
        self.tokens().next()
    }

    /// The last token of the subtree.
    pub fn last_token(&self) -> Option<TokenRef<'a>> {
        self.tokens().last()
    }

    /// The node's text without the outer trivia.
    pub fn text(&self) -> String {
        let mut out = String::new();
        let (start, end) = self.data().tokens;
        for i in start..end {
            let t = &self.tree.tokens[i as usize];
            if i != start {
                out.push_str(&t.leading);
            }
            out.push_str(&t.text);
            if i + 1 != end {
                out.push_str(&t.trailing);
            }
        }
        out
    }

    /// The node's text including outer trivia.
    pub fn full_text(&self) -> String {
        let mut out = String::new();
        for t in self.tokens() {
            out.push_str(t.leading());
            out.push_str(t.text());
            out.push_str(t.trailing());
        }
        out
    }

    /// Leading trivia of the first token.
    pub fn leading_trivia(&self) -> &'a str {
        self.first_token().map_or("", |t| t.leading())
    }

    /// Returns `true` if every token of the node was inserted by error recovery.
    pub fn is_missing(&self) -> bool {
        self.tokens().all(|t| t.is_missing())
    }

    /// The next sibling node, skipping tokens.
    pub fn next_sibling(&self) -> Option<NodeRef<'a>> {
        let parent = self.parent()?;
        let mut siblings = parent.child_nodes().skip_while(|n| n.id != self.id);
        siblings.next();
        siblings.next()
    }

    /// The previous sibling node, skipping tokens.
    pub fn prev_sibling(&self) -> Option<NodeRef<'a>> {
        let parent = self.parent()?;
        parent.child_nodes().take_while(|n| n.id != self.id).last()
    }

    /// Reconstructs this node as a green node.
    pub fn green(&self) -> GreenNode {
        self.tree.green_of(self.id)
    }
}

/// A borrowed handle to a token in a [`SyntaxTree`].
#[derive(Clone, Copy)]
pub struct TokenRef<'a> {
    tree: &'a SyntaxTree,
    id: TokenId,
}

impl PartialEq for TokenRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for TokenRef<'_> {}

impl fmt::Debug for TokenRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:?})", self.kind(), self.text())
    }
}

impl<'a> TokenRef<'a> {
    fn data(&self) -> &'a TokenData {
        &self.tree.tokens[self.id.index()]
    }

    /// The token's id.
    pub fn id(&self) -> TokenId {
        self.id
    }

    /// The token's kind.
    pub fn kind(&self) -> SyntaxKind {
        self.data().kind
    }

    /// The token text.
    pub fn text(&self) -> &'a str {
        &self.data().text
    }

    /// Leading trivia.
    pub fn leading(&self) -> &'a str {
        &self.data().leading
    }

    /// Trailing trivia.
    pub fn trailing(&self) -> &'a str {
        &self.data().trailing
    }

    /// The span of the token text.
    pub fn span(&self) -> Span {
        let data = self.data();
        Span::new(
            self.tree.file,
            data.offset,
            data.offset + data.text.len() as u32,
        )
    }

    /// The node that owns this token.
    pub fn parent(&self) -> NodeRef<'a> {
        NodeRef {
            tree: self.tree,
            id: self.data().parent,
        }
    }

    /// Returns `true` if this token was inserted by error recovery.
    pub fn is_missing(&self) -> bool {
        self.data().text.is_empty() && self.kind() != SyntaxKind::EndOfFile
    }

    /// Reconstructs this token as a green token.
    pub fn green(&self) -> GreenToken {
        self.tree.green_token(self.id)
    }
}

/// Records edits against a tree and produces the edited tree.
///
/// Edits inside a node that is itself replaced or removed are ignored.
/// Annotations of a replaced node move to its replacement.
pub struct TreeEditor<'a> {
    tree: &'a SyntaxTree,
    replaced: HashMap<NodeId, Vec<GreenElement>>,
    before: HashMap<NodeId, Vec<GreenElement>>,
    after: HashMap<NodeId, Vec<GreenElement>>,
    tokens: HashMap<TokenId, GreenToken>,
}

impl TreeEditor<'_> {
    /// Replaces `node` with `replacement`.
    pub fn replace(&mut self, node: NodeId, mut replacement: GreenNode) -> &mut Self {
        for ann in &self.tree.nodes[node.index()].annotations {
            if !replacement.annotations.contains(ann) {
                replacement.annotations.push(*ann);
            }
        }
        self.replaced
            .insert(node, vec![GreenElement::Node(replacement)]);
        self
    }

    /// Removes `node` together with its trivia.
    pub fn remove(&mut self, node: NodeId) -> &mut Self {
        self.replaced.insert(node, Vec::new());
        self
    }

    /// Inserts nodes immediately before `anchor`.
    pub fn insert_before(&mut self, anchor: NodeId, nodes: Vec<GreenNode>) -> &mut Self {
        self.before
            .entry(anchor)
            .or_default()
            .extend(nodes.into_iter().map(GreenElement::Node));
        self
    }

    /// Inserts nodes immediately after `anchor`.
    pub fn insert_after(&mut self, anchor: NodeId, nodes: Vec<GreenNode>) -> &mut Self {
        self.after
            .entry(anchor)
            .or_default()
            .extend(nodes.into_iter().map(GreenElement::Node));
        self
    }

    /// Replaces the kind and text of a single token. The replaced token's
    /// leading and trailing trivia stay in place.
    pub fn replace_token(&mut self, token: TokenId, replacement: GreenToken) -> &mut Self {
        let old = self.tree.green_token(token);
        let replacement = replacement
            .with_leading(old.leading)
            .with_trailing(old.trailing);
        self.tokens.insert(token, replacement);
        self
    }

    /// Builds the edited tree.
    pub fn finish(&self) -> SyntaxTree {
        let root = match self.replaced.get(&NodeId(0)).and_then(|r| r.first()) {
            Some(GreenElement::Node(n)) => n.clone(),
            _ => self.rebuild(NodeId(0)),
        };
        SyntaxTree::from_green(self.tree.file, &root)
    }

    fn rebuild(&self, id: NodeId) -> GreenNode {
        let data = &self.tree.nodes[id.index()];
        let mut children = Vec::with_capacity(data.children.len());
        for child in &data.children {
            match *child {
                Element::Node(c) => {
                    if let Some(extra) = self.before.get(&c) {
                        children.extend(extra.iter().cloned());
                    }
                    match self.replaced.get(&c) {
                        Some(replacement) => children.extend(replacement.iter().cloned()),
                        None => children.push(GreenElement::Node(self.rebuild(c))),
                    }
                    if let Some(extra) = self.after.get(&c) {
                        children.extend(extra.iter().cloned());
                    }
                }
                Element::Token(t) => {
                    let token = self
                        .tokens
                        .get(&t)
                        .cloned()
                        .unwrap_or_else(|| self.tree.green_token(t));
                    children.push(GreenElement::Token(token));
                }
            }
        }
        GreenNode {
            kind: data.kind,
            children,
            annotations: data.annotations.clone(),
        }
    }
}
