use text_size::TextRange;

use crate::SyntaxKind::*;
use crate::{SyntaxKind, SyntaxNode, SyntaxToken, WalkEvent};

pub trait AstNode<'a>: Copy {
    fn cast(syntax: SyntaxNode<'a>) -> Option<Self>
    where
        Self: Sized;

    fn syntax(self) -> SyntaxNode<'a>;
}

macro_rules! ast_node {
    ($name:ident, $kind:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $name<'a>(SyntaxNode<'a>);

        impl<'a> AstNode<'a> for $name<'a> {
            fn cast(syntax: SyntaxNode<'a>) -> Option<Self> {
                (syntax.kind() == $kind).then_some(Self(syntax))
            }

            fn syntax(self) -> SyntaxNode<'a> {
                self.0
            }
        }
    };
}

ast_node!(Chunk, CHUNK);
ast_node!(Block, BLOCK);
ast_node!(FunctionStmt, FUNCTION_STMT);
ast_node!(LocalFunctionStmt, LOCAL_FUNCTION_STMT);
ast_node!(FunctionExpr, FUNCTION_EXPR);
ast_node!(FuncName, FUNC_NAME);
ast_node!(FuncBody, FUNC_BODY);

fn child<'a, N: AstNode<'a>>(parent: SyntaxNode<'a>) -> Option<N> {
    parent.children().find_map(N::cast)
}

fn token<'a>(parent: SyntaxNode<'a>, kind: SyntaxKind) -> Option<SyntaxToken<'a>> {
    parent.child_tokens().find(|token| token.kind() == kind)
}

impl<'a> Chunk<'a> {
    pub fn block(self) -> Option<Block<'a>> {
        child(self.0)
    }
}

impl<'a> Block<'a> {
    /// Statement nodes in source order.
    pub fn statements(self) -> impl Iterator<Item = SyntaxNode<'a>> {
        self.0.children()
    }
}

impl<'a> FunctionStmt<'a> {
    pub fn name(self) -> Option<FuncName<'a>> {
        child(self.0)
    }

    pub fn body(self) -> Option<FuncBody<'a>> {
        child(self.0)
    }
}

impl<'a> LocalFunctionStmt<'a> {
    pub fn name(self) -> Option<SyntaxToken<'a>> {
        token(self.0, NAME)
    }

    pub fn body(self) -> Option<FuncBody<'a>> {
        child(self.0)
    }
}

impl<'a> FunctionExpr<'a> {
    pub fn body(self) -> Option<FuncBody<'a>> {
        child(self.0)
    }
}

impl<'a> FuncName<'a> {
    /// Name tokens and separators, e.g. `a`, `.`, `b`, `:`, `m`.
    pub fn segments(self) -> impl Iterator<Item = SyntaxToken<'a>> {
        self.0.child_tokens()
    }

    /// The dotted name as written, without trivia.
    pub fn text(self) -> String {
        self.segments().map(SyntaxToken::text_trimmed).collect()
    }
}

impl<'a> FuncBody<'a> {
    /// The closing `end`, absent when the body was cut short.
    pub fn end_token(self) -> Option<SyntaxToken<'a>> {
        token(self.0, END_KW)
    }
}

/// Any construct that defines a function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionDef<'a> {
    /// `function a.b:c() ... end`
    Statement(FunctionStmt<'a>),
    /// `local function f() ... end`
    Local(LocalFunctionStmt<'a>),
    /// `function() ... end` used as a value.
    Expression(FunctionExpr<'a>),
}

impl<'a> AstNode<'a> for FunctionDef<'a> {
    fn cast(syntax: SyntaxNode<'a>) -> Option<Self> {
        match syntax.kind() {
            FUNCTION_STMT => Some(FunctionDef::Statement(FunctionStmt(syntax))),
            LOCAL_FUNCTION_STMT => Some(FunctionDef::Local(LocalFunctionStmt(syntax))),
            FUNCTION_EXPR => Some(FunctionDef::Expression(FunctionExpr(syntax))),
            _ => None,
        }
    }

    fn syntax(self) -> SyntaxNode<'a> {
        match self {
            FunctionDef::Statement(it) => it.0,
            FunctionDef::Local(it) => it.0,
            FunctionDef::Expression(it) => it.0,
        }
    }
}

impl<'a> FunctionDef<'a> {
    /// Declared name, `None` for anonymous functions.
    pub fn name(self) -> Option<String> {
        match self {
            FunctionDef::Statement(it) => it.name().map(FuncName::text),
            FunctionDef::Local(it) => it.name().map(|name| name.text_trimmed().to_owned()),
            FunctionDef::Expression(_) => None,
        }
    }

    pub fn body(self) -> Option<FuncBody<'a>> {
        match self {
            FunctionDef::Statement(it) => it.body(),
            FunctionDef::Local(it) => it.body(),
            FunctionDef::Expression(it) => it.body(),
        }
    }

    /// Whether the body ends with an `end` keyword.
    pub fn is_closed(self) -> bool {
        self.body().and_then(FuncBody::end_token).is_some()
    }

    /// From the defining keyword through the closing `end`, trivia excluded.
    pub fn range(self) -> TextRange {
        self.syntax().trimmed_range()
    }
}

/// Iterates over every function definition below `root`, outer ones first.
pub fn function_defs<'a>(root: SyntaxNode<'a>) -> impl Iterator<Item = FunctionDef<'a>> {
    root.preorder().filter_map(|event| match event {
        WalkEvent::Enter(node) => FunctionDef::cast(node),
        WalkEvent::Leave(_) => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Builder, SyntaxTree, TriviaPiece, TriviaPieceKind};

    fn ws() -> TriviaPiece {
        TriviaPiece::new(TriviaPieceKind::Whitespace, 1.into())
    }

    fn tok(builder: &mut Builder, kind: SyntaxKind, len: u32, trailing: &[TriviaPiece]) {
        builder.token(&[], kind, len.into(), trailing);
    }

    // `local function f(a) end`
    fn local_function() -> SyntaxTree {
        let mut builder = Builder::new("local function f(a) end");
        builder.start_node(CHUNK);
        builder.start_node(BLOCK);
        builder.start_node(LOCAL_FUNCTION_STMT);
        tok(&mut builder, LOCAL_KW, 5, &[ws()]);
        tok(&mut builder, FUNCTION_KW, 8, &[ws()]);
        tok(&mut builder, NAME, 1, &[]);
        builder.start_node(FUNC_BODY);
        builder.start_node(PARAM_LIST);
        tok(&mut builder, LEFT_PAREN, 1, &[]);
        builder.start_node(PARAM);
        tok(&mut builder, NAME, 1, &[]);
        builder.finish_node();
        tok(&mut builder, RIGHT_PAREN, 1, &[ws()]);
        builder.finish_node();
        builder.start_node(BLOCK);
        builder.finish_node();
        tok(&mut builder, END_KW, 3, &[]);
        builder.finish_node();
        builder.finish_node();
        builder.finish_node();
        tok(&mut builder, EOF, 0, &[]);
        builder.finish_node();
        builder.finish()
    }

    #[test]
    fn local_function_accessors() {
        let tree = local_function();
        let defs: Vec<_> = function_defs(tree.root()).collect();
        assert_eq!(defs.len(), 1);

        let def = defs[0];
        assert!(matches!(def, FunctionDef::Local(_)));
        assert_eq!(def.name().as_deref(), Some("f"));
        assert!(def.is_closed());
        assert_eq!(def.range(), TextRange::new(0.into(), 23.into()));
    }

    #[test]
    fn chunk_exposes_statements() {
        let tree = local_function();
        let chunk = Chunk::cast(tree.root()).unwrap();
        let kinds: Vec<_> = chunk.block().unwrap().statements().map(SyntaxNode::kind).collect();
        assert_eq!(kinds, [LOCAL_FUNCTION_STMT]);
        assert!(Block::cast(tree.root()).is_none());
    }

    #[test]
    fn dotted_statement_name() {
        // `end` sits in an error node, so the body is unclosed.
        let mut builder = Builder::new("function a.b:c() end");
        builder.start_node(CHUNK);
        builder.start_node(FUNCTION_STMT);
        tok(&mut builder, FUNCTION_KW, 8, &[ws()]);
        builder.start_node(FUNC_NAME);
        for kind in [NAME, DOT, NAME, COLON, NAME] {
            tok(&mut builder, kind, 1, &[]);
        }
        builder.finish_node();
        builder.start_node(FUNC_BODY);
        builder.start_node(PARAM_LIST);
        tok(&mut builder, LEFT_PAREN, 1, &[]);
        tok(&mut builder, RIGHT_PAREN, 1, &[ws()]);
        builder.finish_node();
        builder.start_node(BLOCK);
        builder.finish_node();
        builder.finish_node();
        builder.finish_node();
        builder.start_node(ERROR);
        tok(&mut builder, END_KW, 3, &[]);
        builder.finish_node();
        builder.finish_node();
        let tree = builder.finish();

        let def = function_defs(tree.root()).next().unwrap();
        let FunctionDef::Statement(stmt) = def else { panic!("expected a statement") };
        assert_eq!(def.name().as_deref(), Some("a.b:c"));
        let segments: Vec<_> = stmt.name().unwrap().segments().map(SyntaxToken::kind).collect();
        assert_eq!(segments, [NAME, DOT, NAME, COLON, NAME]);
        assert!(!def.is_closed());
        assert_eq!(def.range(), TextRange::new(0.into(), 16.into()));
    }
}
