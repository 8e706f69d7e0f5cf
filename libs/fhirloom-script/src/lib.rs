//! Embedded JEXL-like scripting language used by `expressionType: JEXL`
//! field expressions.

pub mod ast;
pub mod context;
pub mod engine;
pub mod error;
pub mod functions;
pub mod lexer;
pub mod parser;
pub mod token;
pub mod value;
pub mod vocabulary;

pub use ast::Expr;
pub use context::Context;
pub use engine::Engine;
pub use error::{Error, Result};
pub use value::Value;
pub use vocabulary::{NoopVocabularyLookup, VocabularyLookup};
