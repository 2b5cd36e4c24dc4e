use luma_yellow::SyntaxKind::{self, *};
use luma_yellow::SyntaxSet;

use super::func_body;
use crate::parser::{CompletedMarker, Parser};

const UNARY_PRIORITY: u8 = 12;

/// Tokens an expression never starts with, left for the enclosing rule.
const EXPR_RECOVERY: SyntaxSet = SyntaxSet::new([
    END_KW,
    ELSE_KW,
    ELSEIF_KW,
    UNTIL_KW,
    THEN_KW,
    DO_KW,
    IN_KW,
    RIGHT_PAREN,
    RIGHT_BRACKET,
    RIGHT_BRACE,
    SEMICOLON,
    COMMA,
    LOCAL_KW,
    RETURN_KW,
    IF_KW,
    WHILE_KW,
    FOR_KW,
    REPEAT_KW,
    BREAK_KW,
    GOTO_KW,
    DOUBLE_COLON,
    EOF,
]);

/// Left and right binding power of a binary operator.
fn binary_op(kind: SyntaxKind) -> Option<(u8, u8)> {
    let power = match kind {
        OR_KW => (1, 1),
        AND_KW => (2, 2),
        LT | GT | LTEQ | GTEQ | NEQ | EQ2 => (3, 3),
        PIPE => (4, 4),
        TILDE => (5, 5),
        AMP => (6, 6),
        SHL | SHR => (7, 7),
        DOT2 => (9, 8),
        PLUS | MINUS => (10, 10),
        STAR | SLASH | DOUBLE_SLASH | PERCENT => (11, 11),
        CARET => (14, 13),
        _ => return None,
    };
    Some(power)
}

pub(crate) fn expr_list(p: &mut Parser<'_>) {
    let m = p.start();
    expr(p);
    while p.eat(COMMA) {
        expr(p);
    }
    m.complete(p, EXPR_LIST);
}

pub(crate) fn expr(p: &mut Parser<'_>) -> Option<CompletedMarker> {
    expr_bp(p, 0)
}

fn expr_bp(p: &mut Parser<'_>, limit: u8) -> Option<CompletedMarker> {
    p.nested(|p| operand_and_operators(p, limit)).flatten()
}

fn operand_and_operators(p: &mut Parser<'_>, limit: u8) -> Option<CompletedMarker> {
    let mut lhs = if matches!(p.peek_kind(), NOT_KW | MINUS | HASH | TILDE) {
        let m = p.start();
        p.advance();
        expr_bp(p, UNARY_PRIORITY);
        m.complete(p, PREFIX_EXPR)
    } else {
        simple_expr(p)?
    };

    while let Some((left, right)) = binary_op(p.peek_kind()) {
        if left <= limit {
            break;
        }

        let m = lhs.precede(p);
        p.advance();
        expr_bp(p, right);
        lhs = m.complete(p, BINARY_EXPR);
    }

    Some(lhs)
}

fn simple_expr(p: &mut Parser<'_>) -> Option<CompletedMarker> {
    let m = match p.peek_kind() {
        NUMBER | STRING | NIL_KW | TRUE_KW | FALSE_KW => {
            let m = p.start();
            p.advance();
            m.complete(p, LITERAL)
        }
        DOT3 => {
            let m = p.start();
            p.advance();
            m.complete(p, VARARG_EXPR)
        }
        LEFT_BRACE => table(p),
        FUNCTION_KW => {
            let m = p.start();
            p.advance();
            func_body(p);
            m.complete(p, FUNCTION_EXPR)
        }
        _ => return suffixed_expr(p),
    };
    Some(m)
}

/// A primary expression followed by field accesses, indexing and calls.
pub(crate) fn suffixed_expr(p: &mut Parser<'_>) -> Option<CompletedMarker> {
    let mut lhs = primary_expr(p)?;

    loop {
        lhs = match p.peek_kind() {
            DOT => {
                let m = lhs.precede(p);
                p.advance();
                p.expect(NAME);
                m.complete(p, FIELD_EXPR)
            }
            LEFT_BRACKET => {
                let m = lhs.precede(p);
                p.advance();
                expr(p);
                p.expect(RIGHT_BRACKET);
                m.complete(p, INDEX_EXPR)
            }
            COLON => {
                let m = lhs.precede(p);
                p.advance();
                p.expect(NAME);
                args(p);
                m.complete(p, METHOD_CALL_EXPR)
            }
            LEFT_PAREN | STRING | LEFT_BRACE => {
                let m = lhs.precede(p);
                args(p);
                m.complete(p, CALL_EXPR)
            }
            _ => return Some(lhs),
        };
    }
}

fn primary_expr(p: &mut Parser<'_>) -> Option<CompletedMarker> {
    match p.peek_kind() {
        NAME => {
            let m = p.start();
            p.advance();
            Some(m.complete(p, NAME_REF))
        }
        LEFT_PAREN => {
            let m = p.start();
            p.advance();
            expr(p);
            p.expect(RIGHT_PAREN);
            Some(m.complete(p, PAREN_EXPR))
        }
        _ => {
            p.error_recover("expected expression", &EXPR_RECOVERY);
            None
        }
    }
}

fn args(p: &mut Parser<'_>) {
    let m = p.start();
    match p.peek_kind() {
        LEFT_PAREN => {
            p.advance();
            if !p.at(RIGHT_PAREN) {
                expr_list(p);
            }
            p.expect(RIGHT_PAREN);
        }
        LEFT_BRACE => {
            table(p);
        }
        STRING => p.advance(),
        _ => p.error("expected arguments"),
    }
    m.complete(p, ARG_LIST);
}

fn table(p: &mut Parser<'_>) -> CompletedMarker {
    let m = p.start();
    p.advance();

    while !matches!(p.peek_kind(), RIGHT_BRACE | EOF) {
        if !field(p) {
            break;
        }
        if !p.eat(COMMA) && !p.eat(SEMICOLON) {
            break;
        }
    }

    p.expect(RIGHT_BRACE);
    m.complete(p, TABLE_EXPR)
}

/// Returns `false` when no token could be consumed.
fn field(p: &mut Parser<'_>) -> bool {
    let start = p.position();
    let m = p.start();

    match p.peek_kind() {
        LEFT_BRACKET => {
            p.advance();
            expr(p);
            p.expect(RIGHT_BRACKET);
            p.expect(EQ);
            expr(p);
        }
        NAME if p.nth(1) == EQ => {
            p.advance();
            p.advance();
            expr(p);
        }
        _ => {
            expr(p);
        }
    }

    if p.position() == start {
        m.abandon(p);
        return false;
    }
    m.complete(p, TABLE_FIELD);
    true
}
