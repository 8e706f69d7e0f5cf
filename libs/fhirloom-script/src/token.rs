//! Token types for the embedded scripting lexer.
//!
//! Deliberately a small subset of `libs/fhirpath`'s `TokenType` — this
//! language has no `as`/`is`/`div`/`mod`/collection-membership operators;
//! those serve FHIRPath's typed-collection semantics, which the JEXL-style
//! field scripting does not have.

#[derive(Debug, PartialEq, Clone, Eq)]
pub enum TokenType {
    StringLiteral,
    NumberLiteral,
    BooleanLiteral,
    NullLiteral,

    Identifier,
    /// `$field`, `$this` and similar dollar-prefixed scope variables. `value`
    /// holds the name with the leading `$` stripped.
    DollarVariable,

    Dot,
    Comma,
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,

    Plus,
    Minus,
    Star,
    Slash,

    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    AndAnd,
    OrOr,
    Bang,

    Question,
    Colon,

    Eof,
    Error,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub token_type: TokenType,
    pub value: String,
    pub position: usize,
}

impl Token {
    pub fn new(token_type: TokenType, value: String, position: usize) -> Self {
        Self {
            token_type,
            value,
            position,
        }
    }

    pub fn eof(position: usize) -> Self {
        Self::new(TokenType::Eof, String::new(), position)
    }

    pub fn error(message: String, position: usize) -> Self {
        Self::new(TokenType::Error, message, position)
    }
}
