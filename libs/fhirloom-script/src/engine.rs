//! Direct tree-walking evaluator, with an LRU cache of parsed ASTs keyed by
//! script source text.
//!
//! `libs/fhirpath`'s `Engine` compiles through `hir` into a bytecode `vm`
//! with a type-inference pass against FHIR `StructureDefinition`s, because
//! FHIRPath expressions run repeatedly against typed resources at validation
//! scale. This evaluator runs once per field per resource occurrence against
//! an untyped HL7 scope — a compiled plan cache buys nothing here that a
//! cached AST doesn't already buy, so the VM/HIR stage is not reproduced
//! (see `DESIGN.md`, "Scope reduction").

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use lru::LruCache;

use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::context::Context;
use crate::error::{Error, Result};
use crate::functions;
use crate::parser::Parser;
use crate::value::Value;

pub struct Engine {
    cache: Mutex<LruCache<String, Arc<Expr>>>,
}

impl Engine {
    pub fn new() -> Self {
        Self {
            cache: Mutex::new(LruCache::new(NonZeroUsize::new(256).expect("nonzero"))),
        }
    }

    pub fn evaluate(&self, source: &str, context: &Context) -> Result<Value> {
        let expr = self.compile(source)?;
        eval(&expr, context)
    }

    fn compile(&self, source: &str) -> Result<Arc<Expr>> {
        let mut cache = self.cache.lock().expect("script cache poisoned");
        if let Some(cached) = cache.get(source) {
            return Ok(cached.clone());
        }
        let expr = Arc::new(Parser::parse(source)?);
        cache.put(source.to_string(), expr.clone());
        Ok(expr)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

fn eval(expr: &Expr, ctx: &Context) -> Result<Value> {
    match expr {
        Expr::StringLiteral(s) => Ok(Value::String(s.clone())),
        Expr::NumberLiteral(n) => Ok(Value::Number(*n)),
        Expr::BooleanLiteral(b) => Ok(Value::Bool(*b)),
        Expr::NullLiteral => Ok(Value::Null),
        Expr::ArrayLiteral(items) => {
            let values = items
                .iter()
                .map(|item| eval(item, ctx))
                .collect::<Result<Vec<_>>>()?;
            Ok(Value::Array(values))
        }
        Expr::Variable(name) => {
            if name == "field" {
                ctx.field_value()
                    .ok_or_else(|| Error::VariableNotFound(format!("${name}")))
            } else {
                Err(Error::VariableNotFound(format!("${name}")))
            }
        }
        Expr::Identifier(name) => {
            if let Some(value) = ctx.get_var(name) {
                Ok(value.clone())
            } else if let Some(value) = ctx.segment_value(name) {
                Ok(value)
            } else {
                Err(Error::VariableNotFound(name.clone()))
            }
        }
        Expr::Member(target, name) => {
            eval(target, ctx)?;
            Err(Error::EvaluationError(format!(
                "member access '.{name}' is not supported"
            )))
        }
        Expr::Call { target, method, args } => {
            let namespace = match target.as_ref() {
                Expr::Identifier(name) => name.clone(),
                _ => {
                    return Err(Error::EvaluationError(
                        "function calls must target a namespace identifier".into(),
                    ))
                }
            };
            let arg_values = args
                .iter()
                .map(|arg| eval(arg, ctx))
                .collect::<Result<Vec<_>>>()?;
            functions::call(&namespace, method, arg_values, ctx)
        }
        Expr::Unary(op, inner) => {
            let value = eval(inner, ctx)?;
            match op {
                UnaryOp::Not => Ok(Value::Bool(!value.truthy())),
                UnaryOp::Negate => {
                    let n = value
                        .as_number()
                        .ok_or_else(|| Error::TypeError("cannot negate a non-numeric value".into()))?;
                    Ok(Value::Number(-n))
                }
            }
        }
        Expr::Binary(op, left, right) => eval_binary(*op, left, right, ctx),
        Expr::Ternary(cond, if_true, if_false) => {
            if eval(cond, ctx)?.truthy() {
                eval(if_true, ctx)
            } else {
                eval(if_false, ctx)
            }
        }
    }
}

fn eval_binary(op: BinaryOp, left: &Expr, right: &Expr, ctx: &Context) -> Result<Value> {
    match op {
        BinaryOp::And => {
            let l = eval(left, ctx)?;
            if !l.truthy() {
                return Ok(Value::Bool(false));
            }
            Ok(Value::Bool(eval(right, ctx)?.truthy()))
        }
        BinaryOp::Or => {
            let l = eval(left, ctx)?;
            if l.truthy() {
                return Ok(Value::Bool(true));
            }
            Ok(Value::Bool(eval(right, ctx)?.truthy()))
        }
        _ => {
            let l = eval(left, ctx)?;
            let r = eval(right, ctx)?;
            match op {
                BinaryOp::Add => numeric_or_concat(l, r),
                BinaryOp::Sub => numeric_binary(l, r, |a, b| a - b),
                BinaryOp::Mul => numeric_binary(l, r, |a, b| a * b),
                BinaryOp::Div => numeric_binary(l, r, |a, b| a / b),
                BinaryOp::Eq => Ok(Value::Bool(values_equal(&l, &r))),
                BinaryOp::NotEq => Ok(Value::Bool(!values_equal(&l, &r))),
                BinaryOp::Lt => compare(l, r, |o| o == std::cmp::Ordering::Less),
                BinaryOp::LtEq => compare(l, r, |o| o != std::cmp::Ordering::Greater),
                BinaryOp::Gt => compare(l, r, |o| o == std::cmp::Ordering::Greater),
                BinaryOp::GtEq => compare(l, r, |o| o != std::cmp::Ordering::Less),
                BinaryOp::And | BinaryOp::Or => unreachable!("handled above"),
            }
        }
    }
}

fn numeric_or_concat(l: Value, r: Value) -> Result<Value> {
    match (&l, &r) {
        (Value::String(_), _) | (_, Value::String(_)) => {
            let a = l
                .as_string()
                .ok_or_else(|| Error::TypeError(format!("cannot concatenate {l:?}")))?;
            let b = r
                .as_string()
                .ok_or_else(|| Error::TypeError(format!("cannot concatenate {r:?}")))?;
            Ok(Value::String(format!("{a}{b}")))
        }
        _ => numeric_binary(l, r, |a, b| a + b),
    }
}

fn numeric_binary(l: Value, r: Value, f: impl Fn(f64, f64) -> f64) -> Result<Value> {
    let a = l
        .as_number()
        .ok_or_else(|| Error::TypeError(format!("expected a number, got {l:?}")))?;
    let b = r
        .as_number()
        .ok_or_else(|| Error::TypeError(format!("expected a number, got {r:?}")))?;
    Ok(Value::Number(f(a, b)))
}

fn values_equal(l: &Value, r: &Value) -> bool {
    match (l, r) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Array(a), Value::Array(b)) => a == b,
        (Value::Node(a), Value::Node(b)) => a == b,
        _ => matches!((l.as_string(), r.as_string()), (Some(a), Some(b)) if a == b),
    }
}

fn compare(l: Value, r: Value, pred: impl Fn(std::cmp::Ordering) -> bool) -> Result<Value> {
    if let (Some(a), Some(b)) = (l.as_number(), r.as_number()) {
        let ordering = a
            .partial_cmp(&b)
            .ok_or_else(|| Error::TypeError("cannot compare NaN".into()))?;
        return Ok(Value::Bool(pred(ordering)));
    }
    let a = l
        .as_string()
        .ok_or_else(|| Error::TypeError(format!("cannot compare {l:?}")))?;
    let b = r
        .as_string()
        .ok_or_else(|| Error::TypeError(format!("cannot compare {r:?}")))?;
    Ok(Value::Bool(pred(a.cmp(&b))))
}
