use drop_bomb::DropBomb;
use luma_errors::Diagnostic;
use luma_tokenizer::{Tokens, tokenize};
use luma_yellow::{Builder, SyntaxKind, SyntaxSet, SyntaxTree};

/// Deepest nesting of blocks and expressions the grammar descends into.
pub(crate) const MAX_DEPTH: u32 = 200;

const NESTING_OPEN: SyntaxSet = SyntaxSet::new([
    SyntaxKind::LEFT_PAREN,
    SyntaxKind::LEFT_BRACKET,
    SyntaxKind::LEFT_BRACE,
    SyntaxKind::FUNCTION_KW,
    SyntaxKind::IF_KW,
    SyntaxKind::DO_KW,
    SyntaxKind::REPEAT_KW,
]);
const NESTING_CLOSE: SyntaxSet = SyntaxSet::new([
    SyntaxKind::RIGHT_PAREN,
    SyntaxKind::RIGHT_BRACKET,
    SyntaxKind::RIGHT_BRACE,
    SyntaxKind::END_KW,
    SyntaxKind::UNTIL_KW,
]);

pub(crate) struct Parser<'t> {
    text: &'t str,
    tokens: Tokens,
    pos: usize,
    depth: u32,
    events: Vec<Event>,
    diagnostics: Vec<Diagnostic>,
}

impl<'t> Parser<'t> {
    pub(crate) fn new(text: &'t str) -> Self {
        let tokens = tokenize(text);
        let diagnostics = tokens
            .errors
            .iter()
            .map(|error| Diagnostic::error(error.message, error.range))
            .collect();

        Self { text, tokens, pos: 0, depth: 0, events: Vec::new(), diagnostics }
    }

    pub(crate) fn peek_kind(&self) -> SyntaxKind {
        self.nth(0)
    }

    /// Kind of the `n`-th token ahead; `EOF` past the end.
    pub(crate) fn nth(&self, n: usize) -> SyntaxKind {
        let last = self.tokens.tokens.len() - 1;
        self.tokens.tokens[(self.pos + n).min(last)].kind
    }

    /// Index of the current token, to detect progress.
    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn at(&self, kind: SyntaxKind) -> bool {
        self.peek_kind() == kind
    }

    pub(crate) fn at_set(&self, set: &SyntaxSet) -> bool {
        set.contains(self.peek_kind())
    }

    pub(crate) fn eat(&mut self, kind: SyntaxKind) -> bool {
        if !self.at(kind) {
            return false;
        }
        self.advance();
        true
    }

    /// Consumes the current token. Does nothing at `EOF`.
    pub(crate) fn advance(&mut self) {
        if self.at(SyntaxKind::EOF) {
            return;
        }

        self.events.push(Event::Token(self.pos as u32));
        self.pos += 1;
    }

    /// Consumes the final `EOF` token so that its leading trivia lands in the tree.
    pub(crate) fn bump_eof(&mut self) {
        assert!(self.at(SyntaxKind::EOF), "tokens left before the end of file");
        self.events.push(Event::Token(self.pos as u32));
    }

    pub(crate) fn expect(&mut self, kind: SyntaxKind) -> bool {
        if self.eat(kind) {
            return true;
        }
        self.error(&format!("expected {}", kind.describe()));
        false
    }

    pub(crate) fn start(&mut self) -> Marker {
        let index = self.events.len() as u32;
        self.events.push(Event::TOMBSTONE);
        Marker::new(index)
    }

    /// Reports an error at the current token without consuming it.
    pub(crate) fn error(&mut self, message: &str) {
        let range = self.tokens.tokens[self.pos].kind_range;
        self.diagnostics.push(Diagnostic::error(message, range));
    }

    /// Reports an error and wraps the current token in an `ERROR` node.
    pub(crate) fn error_and_bump(&mut self, message: &str) {
        if self.at(SyntaxKind::EOF) {
            self.error(message);
            return;
        }

        let m = self.start();
        self.error(message);
        self.advance();
        m.complete(self, SyntaxKind::ERROR);
    }

    /// Like `error_and_bump`, but leaves tokens from `recovery` for an
    /// enclosing rule.
    pub(crate) fn error_recover(&mut self, message: &str, recovery: &SyntaxSet) {
        if self.at_set(recovery) {
            self.error(message);
        } else {
            self.error_and_bump(message);
        }
    }

    /// Runs `f` one nesting level deeper. At `MAX_DEPTH` the rest of the
    /// construct goes into an `ERROR` node instead and `None` is returned.
    pub(crate) fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> Option<T> {
        if self.depth == MAX_DEPTH {
            self.bump_too_deep();
            return None;
        }

        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        Some(result)
    }

    /// Skips to the token closing the current construct, keeping brackets and
    /// `end`s balanced so the enclosing rules still find their closers.
    fn bump_too_deep(&mut self) {
        let start = self.pos;
        let m = self.start();
        self.error("nesting too deep");

        let mut open = 0u32;
        loop {
            match self.peek_kind() {
                SyntaxKind::EOF => break,
                kind if NESTING_OPEN.contains(kind) => open += 1,
                kind if NESTING_CLOSE.contains(kind) => match open.checked_sub(1) {
                    Some(rest) => open = rest,
                    None => break,
                },
                SyntaxKind::ELSE_KW | SyntaxKind::ELSEIF_KW if open == 0 => break,
                _ => {}
            }
            self.advance();
        }

        if self.pos == start {
            m.abandon(self);
        } else {
            m.complete(self, SyntaxKind::ERROR);
        }
    }

    /// Replays the events into a tree. Diagnostics come back sorted by offset.
    pub(crate) fn build_tree(self) -> (SyntaxTree, Vec<Diagnostic>) {
        let Parser { text, tokens, pos: _, depth: _, mut events, mut diagnostics } = self;
        let mut builder = Builder::new(text);
        let mut chain = Vec::new();

        for i in 0..events.len() {
            match std::mem::replace(&mut events[i], Event::TOMBSTONE) {
                Event::Start { kind: SyntaxKind::TOMBSTONE, .. } => {}
                Event::Start { kind, forward_parent } => {
                    // Nodes opened by `precede` sit later in the event list but
                    // must start before the node they wrap.
                    chain.push(kind);
                    let mut at = i;
                    let mut next = forward_parent;
                    while let Some(distance) = next {
                        at += distance as usize;
                        let Event::Start { kind, forward_parent } =
                            std::mem::replace(&mut events[at], Event::TOMBSTONE)
                        else {
                            unreachable!("forward parents are start events");
                        };
                        if kind != SyntaxKind::TOMBSTONE {
                            chain.push(kind);
                        }
                        next = forward_parent;
                    }

                    while let Some(kind) = chain.pop() {
                        builder.start_node(kind);
                    }
                }
                Event::Finish => builder.finish_node(),
                Event::Token(index) => {
                    let token = &tokens.tokens[index as usize];
                    builder.token(
                        tokens.leading(token),
                        token.kind,
                        token.kind_range.len(),
                        tokens.trailing(token),
                    );
                }
            }
        }

        diagnostics.sort_by_key(|diagnostic| diagnostic.range().start());
        (builder.finish(), diagnostics)
    }
}

enum Event {
    Start { kind: SyntaxKind, forward_parent: Option<u32> },
    Token(u32),
    Finish,
}

impl Event {
    const TOMBSTONE: Self = Event::Start { kind: SyntaxKind::TOMBSTONE, forward_parent: None };
}

/// An open node. Must be completed or abandoned before it is dropped.
pub(crate) struct Marker {
    index: u32,
    bomb: DropBomb,
}

impl Marker {
    fn new(index: u32) -> Self {
        Self { index, bomb: DropBomb::new("marker dropped without `complete` or `abandon`") }
    }

    pub(crate) fn complete(mut self, p: &mut Parser<'_>, kind: SyntaxKind) -> CompletedMarker {
        self.bomb.defuse();

        let Event::Start { kind: slot, .. } = &mut p.events[self.index as usize] else {
            unreachable!("markers point at start events");
        };
        *slot = kind;
        p.events.push(Event::Finish);

        CompletedMarker { index: self.index, kind }
    }

    /// Drops the node. Its tokens, if any, go to the enclosing node.
    pub(crate) fn abandon(mut self, p: &mut Parser<'_>) {
        self.bomb.defuse();

        if self.index as usize == p.events.len() - 1 {
            p.events.pop();
        }
    }
}

#[derive(Clone, Copy)]
pub(crate) struct CompletedMarker {
    index: u32,
    kind: SyntaxKind,
}

impl CompletedMarker {
    pub(crate) fn kind(self) -> SyntaxKind {
        self.kind
    }

    /// Opens a node that will wrap this one, e.g. the call around a callee.
    pub(crate) fn precede(self, p: &mut Parser<'_>) -> Marker {
        let parent = p.start();

        let Event::Start { forward_parent, .. } = &mut p.events[self.index as usize] else {
            unreachable!("markers point at start events");
        };
        *forward_parent = Some(parent.index - self.index);

        parent
    }
}
