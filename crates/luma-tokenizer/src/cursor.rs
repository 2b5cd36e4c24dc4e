use std::str::Chars;

use text_size::{TextLen as _, TextSize};

/// Returned when reading past the end; never a valid token start.
pub(crate) const EOF_CHAR: char = '\0';

/// Character reader that tracks where the current token began.
pub(crate) struct Cursor<'a> {
    chars: Chars<'a>,
    /// Bytes that were left when the current token started.
    token_start: TextSize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self { chars: text.chars(), token_start: text.text_len() }
    }

    pub(crate) fn remaining(&self) -> TextSize {
        self.rest().text_len()
    }

    pub(crate) fn rest(&self) -> &'a str {
        self.chars.as_str()
    }

    pub(crate) fn is_eof(&self) -> bool {
        self.rest().is_empty()
    }

    /// Bytes consumed since the last `start_token`.
    pub(crate) fn token_len(&self) -> TextSize {
        self.token_start - self.remaining()
    }

    pub(crate) fn start_token(&mut self) {
        self.token_start = self.remaining();
    }

    pub(crate) fn first(&self) -> char {
        self.nth(0)
    }

    pub(crate) fn second(&self) -> char {
        self.nth(1)
    }

    fn nth(&self, n: usize) -> char {
        self.chars.clone().nth(n).unwrap_or(EOF_CHAR)
    }

    pub(crate) fn at(&self, c: char) -> bool {
        self.rest().starts_with(c)
    }

    pub(crate) fn bump(&mut self) -> char {
        self.chars.next().unwrap_or(EOF_CHAR)
    }

    pub(crate) fn bump_n(&mut self, n: usize) {
        for _ in 0..n {
            self.bump();
        }
    }

    pub(crate) fn eat_while(&mut self, predicate: impl Fn(char) -> bool) {
        while !self.is_eof() && predicate(self.first()) {
            self.bump();
        }
    }
}
