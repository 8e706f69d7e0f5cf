use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("parse error: {0}")]
    ParseError(String),

    #[error("evaluation error: {0}")]
    EvaluationError(String),

    #[error("function not found: {0}.{1}")]
    FunctionNotFound(String, String),

    #[error("variable not found: {0}")]
    VariableNotFound(String),

    #[error("type error: {0}")]
    TypeError(String),
}
