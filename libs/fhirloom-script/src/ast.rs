//! AST for the embedded scripting language.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    StringLiteral(String),
    NumberLiteral(f64),
    BooleanLiteral(bool),
    NullLiteral,
    ArrayLiteral(Vec<Expr>),
    /// `$field`, `$this`, ... — a scope-bound variable, name without the `$`.
    Variable(String),
    /// A bare name: looked up as a named `vars` binding, then as a segment name.
    Identifier(String),
    /// `target.field` — property access on an object-shaped value.
    Member(Box<Expr>, String),
    /// `namespace.method(args)` — a host function call. Only valid when
    /// `target` is itself `Expr::Identifier(namespace)`.
    Call {
        target: Box<Expr>,
        method: String,
        args: Vec<Expr>,
    },
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Ternary(Box<Expr>, Box<Expr>, Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Negate,
}
