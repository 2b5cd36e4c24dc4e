use text_size::TextSize;

use crate::SyntaxKind;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TriviaPieceKind {
    Whitespace,
    /// `\n`, `\r\n` or a lone `\r`.
    Newline,
    /// `-- ...` up to the end of the line, or a `#!` first line.
    LineComment,
    /// `--[[ ... ]]` with any level of `=`.
    BlockComment,
}

impl TriviaPieceKind {
    pub(crate) fn syntax_kind(self) -> SyntaxKind {
        match self {
            Self::Whitespace => SyntaxKind::WHITESPACE,
            Self::Newline => SyntaxKind::NEWLINE,
            Self::LineComment => SyntaxKind::LINE_COMMENT,
            Self::BlockComment => SyntaxKind::BLOCK_COMMENT,
        }
    }
}

/// Length-only trivia; the text is recovered from the tree's source.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct TriviaPiece {
    pub kind: TriviaPieceKind,
    pub len: TextSize,
}

impl TriviaPiece {
    pub fn new(kind: TriviaPieceKind, len: TextSize) -> Self {
        Self { kind, len }
    }
}
