//! Borrowing handles into a `SyntaxTree`.

use std::fmt::{self, Write as _};
use std::ops::Range;

use text_size::TextRange;

use crate::SyntaxKind;
use crate::tree::{Child, TreeInner};

/// Lossless tree over one source text. Concatenating every token, trivia
/// included, gives back the text.
pub struct SyntaxTree {
    pub(crate) tree: TreeInner,
}

impl SyntaxTree {
    #[inline]
    pub fn root(&self) -> SyntaxNode<'_> {
        SyntaxNode { tree: &self.tree, index: 0 }
    }

    pub fn text(&self) -> &str {
        &self.tree.text
    }

    /// Renders the tree one element per line, trivia included.
    pub fn debug_dump(&self) -> String {
        let mut out = String::new();
        dump_node(&mut out, self.root(), 0);
        out
    }
}

fn dump_node(out: &mut String, node: SyntaxNode<'_>, depth: usize) {
    let indent = depth * 2;
    _ = writeln!(out, "{:indent$}{:?}@{:?}", "", node.kind(), node.text_range());

    for child in node.children_with_tokens() {
        match child {
            NodeOrToken::Node(node) => dump_node(out, node, depth + 1),
            NodeOrToken::Token(token) => {
                let tokens = token.leading_trivia().chain([token]).chain(token.trailing_trivia());
                for token in tokens {
                    let indent = indent + 2;
                    _ = writeln!(
                        out,
                        "{:indent$}{:?}@{:?} {:?}",
                        "",
                        token.kind(),
                        token.trimmed_range(),
                        token.text_trimmed()
                    );
                }
            }
        }
    }
}

impl fmt::Debug for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntaxTree").field("text_len", &self.text().len()).finish_non_exhaustive()
    }
}

/// A token inside a `SyntaxTree`. Trivia tokens are tokens too.
#[derive(Clone, Copy)]
pub struct SyntaxToken<'a> {
    tree: &'a TreeInner,
    index: u32,
}

impl<'a> SyntaxToken<'a> {
    #[inline]
    pub fn kind(self) -> SyntaxKind {
        self.tree.token(self.index).kind
    }

    #[inline]
    pub fn is_trivia(self) -> bool {
        self.kind().is_trivia()
    }

    /// Range including the attached leading and trailing trivia.
    pub fn text_range(self) -> TextRange {
        let token = self.tree.token(self.index);
        let first = self.index - token.leading;
        let last = self.index + token.trailing;
        TextRange::new(self.tree.token_start(first), self.tree.token(last).end)
    }

    #[inline]
    pub fn trimmed_range(self) -> TextRange {
        self.tree.token_range(self.index)
    }

    pub fn text(self) -> &'a str {
        &self.tree.text[self.text_range()]
    }

    pub fn text_trimmed(self) -> &'a str {
        &self.tree.text[self.trimmed_range()]
    }

    /// The following token in source order, trivia included.
    pub fn next_token(self) -> Option<Self> {
        let index = self.index + 1;
        ((index as usize) < self.tree.tokens.len()).then_some(Self { tree: self.tree, index })
    }

    pub fn leading_trivia(self) -> TriviaIter<'a> {
        let leading = self.tree.token(self.index).leading;
        TriviaIter { tree: self.tree, indices: self.index - leading..self.index }
    }

    pub fn trailing_trivia(self) -> TriviaIter<'a> {
        let trailing = self.tree.token(self.index).trailing;
        TriviaIter { tree: self.tree, indices: self.index + 1..self.index + 1 + trailing }
    }

    pub fn parent(self) -> SyntaxNode<'a> {
        SyntaxNode { tree: self.tree, index: self.tree.token(self.index).parent }
    }
}

impl PartialEq for SyntaxToken<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.index == other.index
    }
}

impl Eq for SyntaxToken<'_> {}

impl fmt::Debug for SyntaxToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{:?} {:?}", self.kind(), self.trimmed_range(), self.text_trimmed())
    }
}

/// Trivia tokens attached to one side of a token.
#[derive(Clone)]
pub struct TriviaIter<'a> {
    tree: &'a TreeInner,
    indices: Range<u32>,
}

impl<'a> Iterator for TriviaIter<'a> {
    type Item = SyntaxToken<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.indices.next().map(|index| SyntaxToken { tree: self.tree, index })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.indices.size_hint()
    }
}

/// A node inside a `SyntaxTree`.
#[derive(Clone, Copy)]
pub struct SyntaxNode<'a> {
    tree: &'a TreeInner,
    index: u32,
}

impl<'a> SyntaxNode<'a> {
    #[inline]
    pub fn kind(self) -> SyntaxKind {
        self.tree.node(self.index).kind
    }

    /// First token spanned by the node, leading trivia included. `None` for
    /// nodes without tokens, like an empty block.
    pub fn first_token(self) -> Option<SyntaxToken<'a>> {
        let node = self.tree.node(self.index);
        (!node.is_empty()).then_some(SyntaxToken { tree: self.tree, index: node.first_token })
    }

    #[inline]
    pub fn text_range(self) -> TextRange {
        self.tree.node_range(self.index)
    }

    /// Range from the first to the last non-trivia token.
    #[inline]
    pub fn trimmed_range(self) -> TextRange {
        self.tree.node_trimmed_range(self.index)
    }

    pub fn text(self) -> &'a str {
        &self.tree.text[self.text_range()]
    }

    pub fn text_trimmed(self) -> &'a str {
        &self.tree.text[self.trimmed_range()]
    }

    pub fn parent(self) -> Option<Self> {
        let parent = self.tree.node(self.index).parent?;
        Some(Self { tree: self.tree, index: parent })
    }

    /// This node, then its parent, up to the root.
    pub fn ancestors(self) -> impl Iterator<Item = SyntaxNode<'a>> + Clone {
        std::iter::successors(Some(self), |node| node.parent())
    }

    pub fn children_with_tokens(self) -> ChildrenWithTokens<'a> {
        ChildrenWithTokens { tree: self.tree, children: self.tree.node_children(self.index).iter() }
    }

    pub fn children(self) -> impl Iterator<Item = SyntaxNode<'a>> + Clone {
        self.children_with_tokens().filter_map(SyntaxElement::into_node)
    }

    /// Direct child tokens; trivia is never a direct child.
    pub fn child_tokens(self) -> impl Iterator<Item = SyntaxToken<'a>> + Clone {
        self.children_with_tokens().filter_map(SyntaxElement::into_token)
    }

    pub fn preorder(self) -> Preorder<'a> {
        Preorder { stack: Vec::new(), root: Some(self) }
    }
}

impl PartialEq for SyntaxNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.index == other.index
    }
}

impl Eq for SyntaxNode<'_> {}

impl fmt::Debug for SyntaxNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{:?}", self.kind(), self.text_range())
    }
}

pub type SyntaxElement<'a> = NodeOrToken<SyntaxNode<'a>, SyntaxToken<'a>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeOrToken<N, T> {
    Node(N),
    Token(T),
}

impl<N, T> NodeOrToken<N, T> {
    pub fn into_node(self) -> Option<N> {
        match self {
            NodeOrToken::Node(node) => Some(node),
            NodeOrToken::Token(_) => None,
        }
    }

    pub fn into_token(self) -> Option<T> {
        match self {
            NodeOrToken::Node(_) => None,
            NodeOrToken::Token(token) => Some(token),
        }
    }
}

/// Direct children of a node in source order.
#[derive(Clone)]
pub struct ChildrenWithTokens<'a> {
    tree: &'a TreeInner,
    children: std::slice::Iter<'a, Child>,
}

impl<'a> Iterator for ChildrenWithTokens<'a> {
    type Item = SyntaxElement<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        self.children.next().map(|&child| match child {
            Child::Node(index) => NodeOrToken::Node(SyntaxNode { tree, index }),
            Child::Token(index) => NodeOrToken::Token(SyntaxToken { tree, index }),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.children.size_hint()
    }
}

/// Depth-first walk yielding an `Enter` and a `Leave` event per node.
#[derive(Clone)]
pub struct Preorder<'a> {
    stack: Vec<(SyntaxNode<'a>, ChildrenWithTokens<'a>)>,
    root: Option<SyntaxNode<'a>>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = WalkEvent<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let Some((node, children)) = self.stack.last_mut() else {
            let root = self.root.take()?;
            self.stack.push((root, root.children_with_tokens()));
            return Some(WalkEvent::Enter(root));
        };

        let node = *node;
        match children.find_map(SyntaxElement::into_node) {
            Some(child) => {
                self.stack.push((child, child.children_with_tokens()));
                Some(WalkEvent::Enter(child))
            }
            None => {
                self.stack.pop();
                Some(WalkEvent::Leave(node))
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WalkEvent<'a> {
    Enter(SyntaxNode<'a>),
    Leave(SyntaxNode<'a>),
}

#[cfg(test)]
mod tests {
    use text_size::TextRange;

    use super::*;
    use crate::SyntaxKind::*;
    use crate::{Builder, TriviaPiece, TriviaPieceKind};

    // `x = f()\n` as CHUNK(BLOCK(ASSIGN_STMT(...)), EOF)
    fn assignment() -> SyntaxTree {
        let ws = [TriviaPiece::new(TriviaPieceKind::Whitespace, 1.into())];
        let newline = [TriviaPiece::new(TriviaPieceKind::Newline, 1.into())];

        let mut builder = Builder::new("x = f()\n");
        builder.start_node(CHUNK);
        builder.start_node(BLOCK);
        builder.start_node(ASSIGN_STMT);
        builder.start_node(VAR_LIST);
        builder.start_node(NAME_REF);
        builder.token(&[], NAME, 1.into(), &ws);
        builder.finish_node();
        builder.finish_node();
        builder.token(&[], EQ, 1.into(), &ws);
        builder.start_node(EXPR_LIST);
        builder.start_node(CALL_EXPR);
        builder.start_node(NAME_REF);
        builder.token(&[], NAME, 1.into(), &[]);
        builder.finish_node();
        builder.start_node(ARG_LIST);
        builder.token(&[], LEFT_PAREN, 1.into(), &[]);
        builder.token(&[], RIGHT_PAREN, 1.into(), &[]);
        builder.finish_node();
        builder.finish_node();
        builder.finish_node();
        builder.finish_node();
        builder.finish_node();
        builder.token(&newline, EOF, 0.into(), &[]);
        builder.finish_node();
        builder.finish()
    }

    #[test]
    fn preorder_enters_and_leaves() {
        let tree = assignment();
        let mut entered = Vec::new();
        let mut depth = 0;
        for event in tree.root().preorder() {
            match event {
                WalkEvent::Enter(node) => {
                    depth += 1;
                    entered.push(node.kind());
                }
                WalkEvent::Leave(_) => depth -= 1,
            }
        }

        assert_eq!(depth, 0);
        assert_eq!(
            entered,
            [CHUNK, BLOCK, ASSIGN_STMT, VAR_LIST, NAME_REF, EXPR_LIST, CALL_EXPR, NAME_REF, ARG_LIST]
        );
    }

    #[test]
    fn parents_and_trivia() {
        let tree = assignment();
        let root = tree.root();
        let eof = root.child_tokens().last().unwrap();

        assert_eq!(eof.kind(), EOF);
        assert_eq!(eof.text_trimmed(), "");
        assert_eq!(eof.text(), "\n");
        assert_eq!(eof.leading_trivia().map(SyntaxToken::kind).collect::<Vec<_>>(), [NEWLINE]);
        assert_eq!(eof.parent(), root);

        let name = root.first_token().unwrap();
        assert_eq!(name.text(), "x ");
        assert_eq!(name.trailing_trivia().map(SyntaxToken::text).collect::<Vec<_>>(), [" "]);
        assert!(name.next_token().unwrap().is_trivia());

        let kinds: Vec<_> = name.parent().ancestors().map(SyntaxNode::kind).collect();
        assert_eq!(kinds, [NAME_REF, VAR_LIST, ASSIGN_STMT, BLOCK, CHUNK]);
    }

    #[test]
    fn trimmed_ranges_skip_outer_trivia() {
        let tree = assignment();
        let root = tree.root();
        let block = root.children().next().unwrap();
        let var_list = block.children().next().unwrap().children().next().unwrap();

        assert_eq!(var_list.text(), "x ");
        assert_eq!(var_list.trimmed_range(), TextRange::new(0.into(), 1.into()));
        assert_eq!(root.text(), "x = f()\n");
        assert_eq!(block.text_trimmed(), "x = f()");
    }

    #[test]
    fn debug_dump_lists_trivia() {
        let tree = assignment();
        let expected = r#"CHUNK@0..8
  BLOCK@0..7
    ASSIGN_STMT@0..7
      VAR_LIST@0..2
        NAME_REF@0..2
          NAME@0..1 "x"
          WHITESPACE@1..2 " "
      EQ@2..3 "="
      WHITESPACE@3..4 " "
      EXPR_LIST@4..7
        CALL_EXPR@4..7
          NAME_REF@4..5
            NAME@4..5 "f"
          ARG_LIST@5..7
            LEFT_PAREN@5..6 "("
            RIGHT_PAREN@6..7 ")"
  NEWLINE@7..8 "\n"
  EOF@8..8 ""
"#;
        assert_eq!(tree.debug_dump(), expected);
    }
}
