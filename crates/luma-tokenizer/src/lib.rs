//! Lua tokenizer producing tokens with leading and trailing trivia.
//!
//! Leading trivia holds everything between the previous token's trailing
//! trivia and the token itself. Trailing trivia stops before the first
//! newline, so a line break always starts the next token's leading trivia.

mod cursor;

use std::ops::Range;

use cursor::Cursor;
pub use luma_yellow::SyntaxKind;
use luma_yellow::SyntaxKind::*;
use luma_yellow::{TriviaPiece, TriviaPieceKind};
use text_size::{TextRange, TextSize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: SyntaxKind,
    pub kind_range: TextRange,
    /// Indices into the trivia buffer of the tokenizer.
    pub leading: Range<usize>,
    pub trailing: Range<usize>,
}

/// A lexical problem, reported without stopping the tokenizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub message: &'static str,
    pub range: TextRange,
}

/// Every token of a text, `EOF` last, with the shared trivia buffer.
#[derive(Debug, Default)]
pub struct Tokens {
    pub tokens: Vec<Token>,
    pub trivia: Vec<TriviaPiece>,
    pub errors: Vec<LexError>,
}

impl Tokens {
    pub fn leading(&self, token: &Token) -> &[TriviaPiece] {
        &self.trivia[token.leading.clone()]
    }

    pub fn trailing(&self, token: &Token) -> &[TriviaPiece] {
        &self.trivia[token.trailing.clone()]
    }
}

pub fn tokenize(text: &str) -> Tokens {
    let mut tokenizer = Tokenizer::new(text);
    let mut tokens = Vec::with_capacity(text.len() / 4 + 1);

    loop {
        let token = tokenizer.next_token();
        let eof = token.kind == EOF;
        tokens.push(token);
        if eof {
            break;
        }
    }

    Tokens { tokens, trivia: tokenizer.trivia, errors: tokenizer.errors }
}

pub struct Tokenizer<'a> {
    text: &'a str,
    cursor: Cursor<'a>,
    trivia: Vec<TriviaPiece>,
    errors: Vec<LexError>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, cursor: Cursor::new(text), trivia: Vec::new(), errors: Vec::new() }
    }

    /// Trivia pieces referenced by a token this tokenizer returned.
    pub fn trivia(&self, range: Range<usize>) -> &[TriviaPiece] {
        &self.trivia[range]
    }

    pub fn errors(&self) -> &[LexError] {
        &self.errors
    }

    fn offset(&self) -> TextSize {
        TextSize::new(self.text.len() as u32) - self.cursor.remaining()
    }

    fn range(&self) -> TextRange {
        let end = self.offset();
        TextRange::new(end - self.cursor.token_len(), end)
    }

    fn text(&self) -> &'a str {
        &self.text[self.range()]
    }

    fn error(&mut self, message: &'static str) {
        let range = self.range();
        self.errors.push(LexError { message, range });
    }

    /// Returns the next token. Keeps returning `EOF` once the text is exhausted.
    pub fn next_token(&mut self) -> Token {
        let leading_start = self.trivia.len();
        self.leading_trivia();
        let trailing_start = self.trivia.len();
        let (kind, kind_range) = self.syntax_kind();
        self.trailing_trivia();

        Token {
            kind,
            kind_range,
            leading: leading_start..trailing_start,
            trailing: trailing_start..self.trivia.len(),
        }
    }

    fn leading_trivia(&mut self) {
        if self.offset() == TextSize::new(0) && self.cursor.at('#') {
            self.cursor.eat_while(|c| c != '\n' && c != '\r');
            self.push_trivia(TriviaPieceKind::LineComment);
        }

        while let Some(kind) = self.trivia_piece(true) {
            self.push_trivia(kind);
        }
    }

    fn trailing_trivia(&mut self) {
        while let Some(kind) = self.trivia_piece(false) {
            self.push_trivia(kind);
        }
    }

    fn push_trivia(&mut self, kind: TriviaPieceKind) {
        self.trivia.push(TriviaPiece::new(kind, self.cursor.token_len()));
        self.cursor.start_token();
    }

    fn trivia_piece(&mut self, newlines: bool) -> Option<TriviaPieceKind> {
        let kind = match self.cursor.first() {
            _ if self.cursor.is_eof() => return None,
            ' ' | '\t' | '\x0B' | '\x0C' => {
                self.cursor.eat_while(is_whitespace);
                TriviaPieceKind::Whitespace
            }
            '\n' | '\r' if newlines => {
                if self.cursor.bump() == '\r' && self.cursor.at('\n') {
                    self.cursor.bump();
                }
                TriviaPieceKind::Newline
            }
            '-' if self.cursor.second() == '-' => {
                self.cursor.bump_n(2);
                match long_bracket_level(self.cursor.rest()) {
                    Some(level) => {
                        if !self.long_bracket(level) {
                            self.error("unfinished long comment");
                        }
                        TriviaPieceKind::BlockComment
                    }
                    None => {
                        self.cursor.eat_while(|c| c != '\n' && c != '\r');
                        TriviaPieceKind::LineComment
                    }
                }
            }
            _ => return None,
        };
        Some(kind)
    }

    fn syntax_kind(&mut self) -> (SyntaxKind, TextRange) {
        let kind = if self.cursor.is_eof() { EOF } else { self.scan() };

        let range = self.range();
        self.cursor.start_token();

        (kind, range)
    }

    fn scan(&mut self) -> SyntaxKind {
        if let Some(level) = long_bracket_level(self.cursor.rest()) {
            if !self.long_bracket(level) {
                self.error("unfinished long string");
            }
            return STRING;
        }

        match self.cursor.bump() {
            '(' => LEFT_PAREN,
            ')' => RIGHT_PAREN,
            '[' => LEFT_BRACKET,
            ']' => RIGHT_BRACKET,
            '{' => LEFT_BRACE,
            '}' => RIGHT_BRACE,
            ';' => SEMICOLON,
            ',' => COMMA,
            ':' => self.either(':', DOUBLE_COLON, COLON),
            '.' => match self.cursor.first() {
                '.' => {
                    self.cursor.bump();
                    self.either('.', DOT3, DOT2)
                }
                '0'..='9' => self.number('.'),
                _ => DOT,
            },
            '=' => self.either('=', EQ2, EQ),
            '~' => self.either('=', NEQ, TILDE),
            '<' => match self.cursor.first() {
                '=' => self.bump(LTEQ),
                '<' => self.bump(SHL),
                _ => LT,
            },
            '>' => match self.cursor.first() {
                '=' => self.bump(GTEQ),
                '>' => self.bump(SHR),
                _ => GT,
            },
            '/' => self.either('/', DOUBLE_SLASH, SLASH),
            '+' => PLUS,
            '-' => MINUS,
            '*' => STAR,
            '%' => PERCENT,
            '^' => CARET,
            '#' => HASH,
            '&' => AMP,
            '|' => PIPE,
            quote @ ('"' | '\'') => self.short_string(quote),
            first_char @ '0'..='9' => self.number(first_char),
            'A'..='Z' | 'a'..='z' | '_' => {
                self.cursor.eat_while(is_name_continue);
                SyntaxKind::from_keyword(self.text()).unwrap_or(NAME)
            }
            _ => UNKNOWN,
        }
    }

    fn bump(&mut self, kind: SyntaxKind) -> SyntaxKind {
        self.cursor.bump();
        kind
    }

    fn either(&mut self, next: char, long: SyntaxKind, short: SyntaxKind) -> SyntaxKind {
        if self.cursor.at(next) { self.bump(long) } else { short }
    }

    fn short_string(&mut self, quote: char) -> SyntaxKind {
        loop {
            match self.cursor.first() {
                _ if self.cursor.is_eof() => {
                    self.error("unfinished string");
                    break;
                }
                '\n' | '\r' => {
                    self.error("unfinished string");
                    break;
                }
                '\\' => {
                    self.cursor.bump();
                    if !self.cursor.is_eof() {
                        self.cursor.bump();
                    }
                }
                c => {
                    self.cursor.bump();
                    if c == quote {
                        break;
                    }
                }
            }
        }
        STRING
    }

    /// Consumes a long bracket body opened at the cursor. Returns `false` when
    /// the text ends before the matching close.
    fn long_bracket(&mut self, level: usize) -> bool {
        self.cursor.bump_n(level + 2);
        let close = format!("]{}]", "=".repeat(level));

        match self.cursor.rest().find(&close) {
            Some(position) => {
                let chars = self.cursor.rest()[..position + close.len()].chars().count();
                self.cursor.bump_n(chars);
                true
            }
            None => {
                self.cursor.eat_while(|_| true);
                false
            }
        }
    }

    fn number(&mut self, first_char: char) -> SyntaxKind {
        let hex = first_char == '0' && matches!(self.cursor.first(), 'x' | 'X');
        if hex {
            self.cursor.bump();
        }
        let digit = move |c: char| if hex { c.is_ascii_hexdigit() } else { c.is_ascii_digit() };
        let exponent = if hex { ['p', 'P'] } else { ['e', 'E'] };

        self.cursor.eat_while(digit);
        if first_char != '.' && self.cursor.at('.') && self.cursor.second() != '.' {
            self.cursor.bump();
            self.cursor.eat_while(digit);
        }
        if exponent.contains(&self.cursor.first()) && !self.cursor.is_eof() {
            self.cursor.bump();
            if self.cursor.at('+') || self.cursor.at('-') {
                self.cursor.bump();
            }
            self.cursor.eat_while(|c| c.is_ascii_digit());
        }

        if !self.cursor.is_eof() && is_name_continue(self.cursor.first()) {
            self.cursor.eat_while(|c| is_name_continue(c) || c == '.');
            self.error("malformed number");
        }

        NUMBER
    }
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0B' | '\x0C')
}

fn is_name_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Level of a long bracket such as `[==[` starting `text`, if any.
fn long_bracket_level(text: &str) -> Option<usize> {
    let rest = text.strip_prefix('[')?;
    let level = rest.bytes().take_while(|&b| b == b'=').count();
    (rest.as_bytes().get(level) == Some(&b'[')).then_some(level)
}
