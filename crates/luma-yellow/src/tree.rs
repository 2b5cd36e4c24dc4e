//! Flat arena storage behind `SyntaxTree`.
//!
//! Nodes and tokens live in boxed slices and refer to each other by index.
//! Token `0` is a zero-length sentinel so that every real token can read its
//! start offset from the end of the previous one.

use text_size::{TextRange, TextSize};

use crate::SyntaxKind;

pub(crate) struct TreeInner {
    pub(crate) text: Box<str>,
    pub(crate) tokens: Box<[Token]>,
    pub(crate) nodes: Box<[Node]>,
    pub(crate) children: Box<[Child]>,
}

#[derive(Clone, Copy)]
pub(crate) struct Node {
    pub(crate) parent: Option<u32>,
    pub(crate) children_start: u32,
    pub(crate) children_len: u32,
    pub(crate) kind: SyntaxKind,
    /// Index of the first token covered by the node, trivia included.
    pub(crate) first_token: u32,
    /// Index of the last token covered by the node. For an empty node this is
    /// the token right before it and `first_token == last_token + 1`.
    pub(crate) last_token: u32,
}

impl Node {
    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.first_token > self.last_token
    }
}

#[derive(Clone, Copy)]
pub(crate) struct Token {
    pub(crate) kind: SyntaxKind,
    pub(crate) end: TextSize,
    pub(crate) parent: u32,
    /// Number of trivia tokens stored right before this token.
    pub(crate) leading: u32,
    /// Number of trivia tokens stored right after this token.
    pub(crate) trailing: u32,
}

#[derive(Clone, Copy)]
pub(crate) enum Child {
    Node(u32),
    Token(u32),
}

impl TreeInner {
    #[inline]
    pub(crate) fn node(&self, index: u32) -> &Node {
        &self.nodes[index as usize]
    }

    #[inline]
    pub(crate) fn token(&self, index: u32) -> &Token {
        &self.tokens[index as usize]
    }

    #[inline]
    pub(crate) fn token_start(&self, index: u32) -> TextSize {
        debug_assert!(index > 0, "the sentinel token has no start");
        self.tokens[index as usize - 1].end
    }

    #[inline]
    pub(crate) fn token_range(&self, index: u32) -> TextRange {
        TextRange::new(self.token_start(index), self.token(index).end)
    }

    #[inline]
    pub(crate) fn node_children(&self, index: u32) -> &[Child] {
        let node = self.node(index);
        let start = node.children_start as usize;
        &self.children[start..start + node.children_len as usize]
    }

    pub(crate) fn node_range(&self, index: u32) -> TextRange {
        let node = self.node(index);
        if node.is_empty() {
            TextRange::empty(self.token(node.last_token).end)
        } else {
            TextRange::new(self.token_start(node.first_token), self.token(node.last_token).end)
        }
    }

    /// Range of the node without its outermost trivia.
    pub(crate) fn node_trimmed_range(&self, index: u32) -> TextRange {
        let node = self.node(index);
        let range = self.node_range(index);
        if node.is_empty() {
            return range;
        }

        let covered = node.first_token..=node.last_token;
        let first = covered.clone().find(|&token| !self.token(token).kind.is_trivia());
        let last = covered.rev().find(|&token| !self.token(token).kind.is_trivia());

        match (first, last) {
            (Some(first), Some(last)) => {
                TextRange::new(self.token_start(first), self.token(last).end)
            }
            _ => TextRange::empty(range.start()),
        }
    }
}
