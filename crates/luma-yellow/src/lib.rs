//! Lossless, immutable syntax tree for Lua sources.
//!
//! Nodes and tokens are stored flat in one arena per tree. `SyntaxNode` and
//! `SyntaxToken` are `Copy` handles borrowing the tree, so navigation never
//! allocates or refcounts. Whitespace and comments are kept as trivia tokens
//! attached to the significant token they precede or follow.

pub mod ast;
mod builder;
mod syntax;
mod syntax_kind;
mod syntax_set;
mod tree;
mod trivia;

pub use builder::Builder;
pub use syntax::{
    ChildrenWithTokens, NodeOrToken, Preorder, SyntaxElement, SyntaxNode, SyntaxToken, SyntaxTree,
    TriviaIter, WalkEvent,
};
pub use syntax_kind::SyntaxKind;
pub use syntax_set::SyntaxSet;
pub use trivia::{TriviaPiece, TriviaPieceKind};
