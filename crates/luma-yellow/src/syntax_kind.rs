#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
#[repr(u16)]
pub enum SyntaxKind {
    LEFT_PAREN,
    RIGHT_PAREN,
    LEFT_BRACKET,
    RIGHT_BRACKET,
    LEFT_BRACE,
    RIGHT_BRACE,
    SEMICOLON,
    COLON,
    DOUBLE_COLON,
    COMMA,
    DOT,
    DOT2,
    DOT3,
    EQ,

    PLUS,
    MINUS,
    STAR,
    SLASH,
    DOUBLE_SLASH,
    PERCENT,
    CARET,
    HASH,
    AMP,
    TILDE,
    PIPE,
    SHL,
    SHR,
    EQ2,
    NEQ,
    LT,
    LTEQ,
    GT,
    GTEQ,

    AND_KW,
    BREAK_KW,
    DO_KW,
    ELSE_KW,
    ELSEIF_KW,
    END_KW,
    FALSE_KW,
    FOR_KW,
    FUNCTION_KW,
    GOTO_KW,
    IF_KW,
    IN_KW,
    LOCAL_KW,
    NIL_KW,
    NOT_KW,
    OR_KW,
    REPEAT_KW,
    RETURN_KW,
    THEN_KW,
    TRUE_KW,
    UNTIL_KW,
    WHILE_KW,

    NAME,
    NUMBER,
    STRING,

    WHITESPACE,
    NEWLINE,
    LINE_COMMENT,
    BLOCK_COMMENT,

    UNKNOWN,
    EOF,

    CHUNK,
    BLOCK,

    EMPTY_STMT,
    ASSIGN_STMT,
    CALL_STMT,
    LABEL_STMT,
    BREAK_STMT,
    GOTO_STMT,
    DO_STMT,
    WHILE_STMT,
    REPEAT_STMT,
    IF_STMT,
    ELSE_IF_CLAUSE,
    ELSE_CLAUSE,
    NUMERIC_FOR_STMT,
    GENERIC_FOR_STMT,
    FUNCTION_STMT,
    LOCAL_FUNCTION_STMT,
    LOCAL_STMT,
    RETURN_STMT,

    FUNC_NAME,
    FUNC_BODY,
    PARAM_LIST,
    PARAM,
    LOCAL_NAME,
    ATTRIB,
    NAME_LIST,
    VAR_LIST,
    EXPR_LIST,

    LITERAL,
    VARARG_EXPR,
    FUNCTION_EXPR,
    NAME_REF,
    PAREN_EXPR,
    FIELD_EXPR,
    INDEX_EXPR,
    CALL_EXPR,
    METHOD_CALL_EXPR,
    ARG_LIST,
    TABLE_EXPR,
    TABLE_FIELD,
    BINARY_EXPR,
    PREFIX_EXPR,

    ERROR,
    TOMBSTONE,
}

use SyntaxKind::*;

impl SyntaxKind {
    pub const fn is_trivia(self) -> bool {
        matches!(self, WHITESPACE | NEWLINE | LINE_COMMENT | BLOCK_COMMENT)
    }

    pub const fn is_keyword(self) -> bool {
        self as u16 >= AND_KW as u16 && self as u16 <= WHILE_KW as u16
    }

    pub fn from_keyword(ident: &str) -> Option<Self> {
        let kind = match ident {
            "and" => AND_KW,
            "break" => BREAK_KW,
            "do" => DO_KW,
            "else" => ELSE_KW,
            "elseif" => ELSEIF_KW,
            "end" => END_KW,
            "false" => FALSE_KW,
            "for" => FOR_KW,
            "function" => FUNCTION_KW,
            "goto" => GOTO_KW,
            "if" => IF_KW,
            "in" => IN_KW,
            "local" => LOCAL_KW,
            "nil" => NIL_KW,
            "not" => NOT_KW,
            "or" => OR_KW,
            "repeat" => REPEAT_KW,
            "return" => RETURN_KW,
            "then" => THEN_KW,
            "true" => TRUE_KW,
            "until" => UNTIL_KW,
            "while" => WHILE_KW,
            _ => return None,
        };
        Some(kind)
    }

    /// Human readable form used in parser messages, e.g. "`end`" or "identifier".
    pub fn describe(self) -> &'static str {
        match self {
            LEFT_PAREN => "`(`",
            RIGHT_PAREN => "`)`",
            LEFT_BRACKET => "`[`",
            RIGHT_BRACKET => "`]`",
            LEFT_BRACE => "`{`",
            RIGHT_BRACE => "`}`",
            SEMICOLON => "`;`",
            COLON => "`:`",
            DOUBLE_COLON => "`::`",
            COMMA => "`,`",
            DOT => "`.`",
            DOT2 => "`..`",
            DOT3 => "`...`",
            EQ => "`=`",
            GT => "`>`",
            DO_KW => "`do`",
            END_KW => "`end`",
            IN_KW => "`in`",
            THEN_KW => "`then`",
            UNTIL_KW => "`until`",
            NAME => "identifier",
            NUMBER => "number",
            STRING => "string",
            EOF => "end of file",
            _ => "token",
        }
    }
}
