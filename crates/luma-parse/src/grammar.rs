use luma_yellow::SyntaxKind::*;
use luma_yellow::SyntaxSet;

use crate::parser::Parser;

pub(crate) mod exprs;
pub(crate) mod stmts;

/// Keywords closing a nested block.
pub(crate) const BLOCK_END: SyntaxSet = SyntaxSet::new([END_KW, ELSE_KW, ELSEIF_KW, UNTIL_KW]);

pub(crate) fn chunk(p: &mut Parser<'_>) {
    let m = p.start();
    block(p, &SyntaxSet::EMPTY);
    p.bump_eof();
    m.complete(p, CHUNK);
}

/// Statements up to `EOF` or one of `terminators`, wrapped in a `BLOCK` node.
pub(crate) fn block(p: &mut Parser<'_>, terminators: &SyntaxSet) {
    let m = p.start();
    p.nested(|p| {
        while !p.at(EOF) && !p.at_set(terminators) {
            stmts::stmt(p);
        }
    });
    m.complete(p, BLOCK);
}

pub(crate) fn nested_block(p: &mut Parser<'_>) {
    block(p, &BLOCK_END);
}

/// `(a, b, ...)` followed by a block and the closing `end`.
pub(crate) fn func_body(p: &mut Parser<'_>) {
    let m = p.start();
    if p.at(LEFT_PAREN) {
        param_list(p);
    } else {
        p.error("expected `(`");
    }
    nested_block(p);
    p.expect(END_KW);
    m.complete(p, FUNC_BODY);
}

fn param_list(p: &mut Parser<'_>) {
    let m = p.start();
    p.advance();

    while !matches!(p.peek_kind(), RIGHT_PAREN | EOF) {
        let vararg = p.at(DOT3);
        if !p.at(NAME) && !vararg {
            p.error("expected parameter name");
            break;
        }

        let param = p.start();
        p.advance();
        param.complete(p, PARAM);

        if vararg || !p.eat(COMMA) {
            break;
        }
    }

    p.expect(RIGHT_PAREN);
    m.complete(p, PARAM_LIST);
}

/// `a, b, c` as used by generic `for`.
pub(crate) fn name_list(p: &mut Parser<'_>) {
    let m = p.start();
    p.expect(NAME);
    while p.eat(COMMA) {
        p.expect(NAME);
    }
    m.complete(p, NAME_LIST);
}
