//! Syntax diagnostics and their terminal rendering.

use std::fmt;

pub use annotate_snippets::Renderer;
use annotate_snippets::{Level, Snippet};
pub use text_size::TextRange;

/// A syntax error located by a byte range of the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    message: String,
    range: TextRange,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>, range: TextRange) -> Self {
        Self { message: message.into(), range }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn range(&self) -> TextRange {
        self.range
    }

    /// Snippet of `text` with the range underlined, headed by the message.
    pub fn render(&self, renderer: &Renderer, origin: &str, text: &str) -> String {
        let snippet = Snippet::source(text)
            .origin(origin)
            .fold(true)
            .annotation(Level::Error.span(self.range.into()));
        renderer.render(Level::Error.title(&self.message).snippet(snippet)).to_string()
    }
}

/// Renders every diagnostic, separated by blank lines.
pub fn render_all(
    diagnostics: &[Diagnostic],
    renderer: &Renderer,
    origin: &str,
    text: &str,
) -> String {
    diagnostics
        .iter()
        .map(|diagnostic| diagnostic.render(renderer, origin, text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.range, self.message)
    }
}
