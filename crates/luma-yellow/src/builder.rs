//! Turns a stream of start/token/finish calls into a `SyntaxTree`.

use text_size::{TextLen as _, TextSize};

use crate::tree::{Child, Node, Token, TreeInner};
use crate::{SyntaxKind, SyntaxTree, TriviaPiece};

/// A node whose children are still being collected.
struct OpenNode {
    index: u32,
    children: Vec<Child>,
}

/// Token span of a node, known once its first token arrives.
#[derive(Clone, Copy)]
struct Span {
    first: u32,
    last: u32,
}

struct PendingNode {
    parent: Option<u32>,
    kind: SyntaxKind,
    span: Option<Span>,
    children: (u32, u32),
}

/// Builds a `SyntaxTree` for `text`. Tokens must be pushed in source order and
/// cover the text exactly.
pub struct Builder {
    text: Box<str>,
    nodes: Vec<PendingNode>,
    tokens: Vec<Token>,
    children: Vec<Child>,
    open: Vec<OpenNode>,
    /// Reused `OpenNode::children` buffers.
    spare: Vec<Vec<Child>>,
    offset: TextSize,
}

impl Builder {
    pub fn new(text: &str) -> Self {
        // Index 0 is a sentinel ending at offset 0, so the start of token `i`
        // is always the end of token `i - 1`.
        let sentinel =
            Token { kind: SyntaxKind::TOMBSTONE, end: 0.into(), parent: 0, leading: 0, trailing: 0 };

        Self {
            text: text.into(),
            nodes: Vec::new(),
            tokens: vec![sentinel],
            children: Vec::new(),
            open: Vec::with_capacity(64),
            spare: Vec::new(),
            offset: 0.into(),
        }
    }

    pub fn start_node(&mut self, kind: SyntaxKind) {
        let index = u32::try_from(self.nodes.len()).expect("too many nodes");
        let parent = self.open.last_mut().map(|open| {
            open.children.push(Child::Node(index));
            open.index
        });

        self.nodes.push(PendingNode { parent, kind, span: None, children: (0, 0) });
        let children = self.spare.pop().unwrap_or_default();
        self.open.push(OpenNode { index, children });
    }

    pub fn finish_node(&mut self) {
        let OpenNode { index, mut children } = self.open.pop().expect("no open node to finish");
        let start = self.children.len() as u32;
        let len = children.len() as u32;
        self.children.append(&mut children);
        self.spare.push(children);

        // Every token pushed while the node was open belongs to it. A node
        // without tokens sits right after the last token pushed so far.
        let last = self.tokens.len() as u32 - 1;
        let node = &mut self.nodes[index as usize];
        node.span.get_or_insert(Span { first: last + 1, last }).last = last;
        node.children = (start, len);
    }

    /// Pushes a significant token surrounded by its trivia. Only the token
    /// itself becomes a child of the open node.
    pub fn token(
        &mut self,
        leading: &[TriviaPiece],
        kind: SyntaxKind,
        len: TextSize,
        trailing: &[TriviaPiece],
    ) {
        let parent = self.open.last().expect("tokens need an open node").index;
        let first = self.tokens.len() as u32;

        for piece in leading {
            self.push(piece.kind.syntax_kind(), piece.len, parent, 0, 0);
        }
        let token = self.push(kind, len, parent, leading.len() as u32, trailing.len() as u32);
        for piece in trailing {
            self.push(piece.kind.syntax_kind(), piece.len, parent, 0, 0);
        }

        if let Some(open) = self.open.last_mut() {
            open.children.push(Child::Token(token));
        }

        // Nodes still waiting for their first token sit on top of the stack.
        let last = self.tokens.len() as u32 - 1;
        for open in self.open.iter().rev() {
            let span = &mut self.nodes[open.index as usize].span;
            if span.is_some() {
                break;
            }
            *span = Some(Span { first, last });
        }
    }

    fn push(
        &mut self,
        kind: SyntaxKind,
        len: TextSize,
        parent: u32,
        leading: u32,
        trailing: u32,
    ) -> u32 {
        self.offset += len;
        assert!(
            self.text.is_char_boundary(self.offset.into()),
            "token ends outside of the text or inside a character"
        );

        let index = self.tokens.len() as u32;
        self.tokens.push(Token { kind, end: self.offset, parent, leading, trailing });
        index
    }

    pub fn finish(self) -> SyntaxTree {
        assert!(self.open.is_empty(), "unfinished nodes");
        assert!(!self.nodes.is_empty(), "tree without a root");
        assert_eq!(self.offset, self.text.text_len(), "tokens do not cover the whole text");

        let nodes = self
            .nodes
            .into_iter()
            .map(|node| {
                let span = node.span.expect("finished nodes have a span");
                Node {
                    parent: node.parent,
                    children_start: node.children.0,
                    children_len: node.children.1,
                    kind: node.kind,
                    first_token: span.first,
                    last_token: span.last,
                }
            })
            .collect();

        SyntaxTree {
            tree: TreeInner {
                text: self.text,
                tokens: self.tokens.into_boxed_slice(),
                nodes,
                children: self.children.into_boxed_slice(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SyntaxKind::*;
    use crate::TriviaPieceKind;

    fn whitespace(len: u32) -> TriviaPiece {
        TriviaPiece::new(TriviaPieceKind::Whitespace, len.into())
    }

    #[test]
    fn trivia_is_stored_around_tokens() {
        let text = " x = 1 ";
        let mut builder = Builder::new(text);
        builder.start_node(CHUNK);
        builder.token(&[whitespace(1)], NAME, 1.into(), &[whitespace(1)]);
        builder.token(&[], EQ, 1.into(), &[whitespace(1)]);
        builder.token(&[], NUMBER, 1.into(), &[whitespace(1)]);
        builder.finish_node();

        let tree = builder.finish();
        let root = tree.root();

        assert_eq!(root.text(), text);
        assert_eq!(root.text_trimmed(), "x = 1");

        let name = root.first_token().unwrap();
        assert_eq!(name.kind(), WHITESPACE);
        let name = name.next_token().unwrap();
        assert_eq!(name.kind(), NAME);
        assert_eq!(name.text(), " x ");
        assert_eq!(name.text_trimmed(), "x");
    }

    #[test]
    fn empty_nodes_sit_between_tokens() {
        let text = "()";
        let mut builder = Builder::new(text);
        builder.start_node(PARAM_LIST);
        builder.token(&[], LEFT_PAREN, 1.into(), &[]);
        builder.start_node(BLOCK);
        builder.finish_node();
        builder.token(&[], RIGHT_PAREN, 1.into(), &[]);
        builder.finish_node();

        let tree = builder.finish();
        let block = tree.root().children().next().unwrap();

        assert_eq!(block.kind(), BLOCK);
        assert_eq!(block.text_range(), text_size::TextRange::empty(1.into()));
        assert_eq!(block.text(), "");
    }

    #[test]
    fn long_left_nested_chain() {
        const DEPTH: usize = 10_000;
        let text = format!("a{}", "+a".repeat(DEPTH));

        let mut builder = Builder::new(&text);
        for _ in 0..DEPTH {
            builder.start_node(BINARY_EXPR);
        }
        builder.token(&[], NAME, 1.into(), &[]);
        for _ in 0..DEPTH {
            builder.token(&[], PLUS, 1.into(), &[]);
            builder.token(&[], NAME, 1.into(), &[]);
            builder.finish_node();
        }

        let tree = builder.finish();
        let root = tree.root();
        assert_eq!(root.text(), text);

        let innermost = (1..DEPTH).fold(root, |node, _| node.children().next().unwrap());
        assert_eq!(innermost.text(), "a+a");
        assert_eq!(innermost.parent().unwrap().text(), "a+a+a");
    }
}
