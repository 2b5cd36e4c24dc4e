use luma_yellow::SyntaxKind::*;
use luma_yellow::SyntaxSet;

use super::exprs::{expr, expr_list, suffixed_expr};
use super::{BLOCK_END, func_body, name_list, nested_block};
use crate::parser::Parser;

pub(crate) fn stmt(p: &mut Parser<'_>) {
    match p.peek_kind() {
        SEMICOLON => {
            let m = p.start();
            p.advance();
            m.complete(p, EMPTY_STMT);
        }
        DOUBLE_COLON => {
            let m = p.start();
            p.advance();
            p.expect(NAME);
            p.expect(DOUBLE_COLON);
            m.complete(p, LABEL_STMT);
        }
        BREAK_KW => {
            let m = p.start();
            p.advance();
            m.complete(p, BREAK_STMT);
        }
        GOTO_KW => {
            let m = p.start();
            p.advance();
            p.expect(NAME);
            m.complete(p, GOTO_STMT);
        }
        DO_KW => {
            let m = p.start();
            p.advance();
            nested_block(p);
            p.expect(END_KW);
            m.complete(p, DO_STMT);
        }
        WHILE_KW => {
            let m = p.start();
            p.advance();
            expr(p);
            p.expect(DO_KW);
            nested_block(p);
            p.expect(END_KW);
            m.complete(p, WHILE_STMT);
        }
        REPEAT_KW => {
            let m = p.start();
            p.advance();
            nested_block(p);
            p.expect(UNTIL_KW);
            expr(p);
            m.complete(p, REPEAT_STMT);
        }
        IF_KW => if_stmt(p),
        FOR_KW => for_stmt(p),
        FUNCTION_KW => function_stmt(p),
        LOCAL_KW if p.nth(1) == FUNCTION_KW => local_function_stmt(p),
        LOCAL_KW => local_stmt(p),
        RETURN_KW => return_stmt(p),
        NAME | LEFT_PAREN => expr_stmt(p),
        _ => p.error_and_bump("expected statement"),
    }
}

fn if_stmt(p: &mut Parser<'_>) {
    let m = p.start();
    p.advance();
    expr(p);
    p.expect(THEN_KW);
    nested_block(p);

    while p.at(ELSEIF_KW) {
        let clause = p.start();
        p.advance();
        expr(p);
        p.expect(THEN_KW);
        nested_block(p);
        clause.complete(p, ELSE_IF_CLAUSE);
    }

    if p.at(ELSE_KW) {
        let clause = p.start();
        p.advance();
        nested_block(p);
        clause.complete(p, ELSE_CLAUSE);
    }

    p.expect(END_KW);
    m.complete(p, IF_STMT);
}

fn for_stmt(p: &mut Parser<'_>) {
    let m = p.start();
    p.advance();

    let kind = if p.nth(1) == EQ {
        p.advance();
        p.advance();
        expr(p);
        p.expect(COMMA);
        expr(p);
        if p.eat(COMMA) {
            expr(p);
        }
        NUMERIC_FOR_STMT
    } else {
        name_list(p);
        p.expect(IN_KW);
        expr_list(p);
        GENERIC_FOR_STMT
    };

    p.expect(DO_KW);
    nested_block(p);
    p.expect(END_KW);
    m.complete(p, kind);
}

fn function_stmt(p: &mut Parser<'_>) {
    let m = p.start();
    p.advance();

    if p.at(NAME) {
        let name = p.start();
        p.advance();
        while p.eat(DOT) {
            p.expect(NAME);
        }
        if p.eat(COLON) {
            p.expect(NAME);
        }
        name.complete(p, FUNC_NAME);
    } else {
        p.error("expected function name");
    }

    func_body(p);
    m.complete(p, FUNCTION_STMT);
}

fn local_function_stmt(p: &mut Parser<'_>) {
    let m = p.start();
    p.advance();
    p.advance();
    p.expect(NAME);
    func_body(p);
    m.complete(p, LOCAL_FUNCTION_STMT);
}

fn local_stmt(p: &mut Parser<'_>) {
    let m = p.start();
    p.advance();

    loop {
        let name = p.start();
        p.expect(NAME);
        if p.at(LT) {
            let attrib = p.start();
            p.advance();
            p.expect(NAME);
            p.expect(GT);
            attrib.complete(p, ATTRIB);
        }
        name.complete(p, LOCAL_NAME);

        if !p.eat(COMMA) {
            break;
        }
    }

    if p.eat(EQ) {
        expr_list(p);
    }
    m.complete(p, LOCAL_STMT);
}

fn return_stmt(p: &mut Parser<'_>) {
    const NO_VALUES: SyntaxSet = BLOCK_END.union(&SyntaxSet::new([SEMICOLON, EOF]));

    let m = p.start();
    p.advance();
    if !p.at_set(&NO_VALUES) {
        expr_list(p);
    }
    p.eat(SEMICOLON);
    m.complete(p, RETURN_STMT);
}

/// Assignment or function call.
fn expr_stmt(p: &mut Parser<'_>) {
    let Some(lhs) = suffixed_expr(p) else {
        return;
    };

    if p.at(EQ) || p.at(COMMA) {
        let vars = lhs.precede(p);
        while p.eat(COMMA) {
            suffixed_expr(p);
        }
        let vars = vars.complete(p, VAR_LIST);

        let m = vars.precede(p);
        p.expect(EQ);
        expr_list(p);
        m.complete(p, ASSIGN_STMT);
    } else if matches!(lhs.kind(), CALL_EXPR | METHOD_CALL_EXPR) {
        lhs.precede(p).complete(p, CALL_STMT);
    } else {
        p.error("expected `=` or a call");
        lhs.precede(p).complete(p, ERROR);
    }
}
