//! Error-tolerant Lua parser producing a lossless `SyntaxTree`.

use luma_errors::Diagnostic;
use luma_yellow::{SyntaxTree, ast};

mod grammar;
mod parser;

pub use luma_yellow::{SyntaxKind, SyntaxNode, SyntaxToken};

/// Result of parsing one text: the tree and every problem found on the way.
pub struct Parse {
    tree: SyntaxTree,
    diagnostics: Vec<Diagnostic>,
}

impl Parse {
    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    pub fn chunk(&self) -> Option<ast::Chunk<'_>> {
        use ast::AstNode as _;
        ast::Chunk::cast(self.tree.root())
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// Tree dump followed by the diagnostics, one per line.
    pub fn debug_dump(&self) -> String {
        let mut out = self.tree.debug_dump();
        out.push_str("Errors:\n");
        for diagnostic in &self.diagnostics {
            out.push_str(&format!("  {diagnostic}\n"));
        }
        out
    }
}

impl std::fmt::Debug for Parse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.debug_dump())
    }
}

/// Parses `text` as a Lua chunk. Never fails: malformed input yields `ERROR`
/// nodes and diagnostics, and every byte of `text` stays in the tree.
pub fn parse(text: &str) -> Parse {
    let _span = tracing::trace_span!("parse", len = text.len()).entered();

    let mut parser = parser::Parser::new(text);
    grammar::chunk(&mut parser);
    let (tree, diagnostics) = parser.build_tree();

    if !diagnostics.is_empty() {
        tracing::debug!(errors = diagnostics.len(), "parsed with errors");
    }
    Parse { tree, diagnostics }
}
