//! The fixed host function registry.
//!
//! Scripts may only call namespaced static functions (`Namespace.method(...)`),
//! never arbitrary reflection — this trades template expressiveness for
//! determinism and auditability (`SPEC_FULL.md` §9). `generateResourceId` is
//! the single permitted non-deterministic function.

use fhirloom_hl7::Node;
use fhirloom_models::reformat_hl7_datetime;
use uuid::Uuid;

use crate::context::Context;
use crate::error::{Error, Result};
use crate::value::Value;

pub fn call(namespace: &str, method: &str, args: Vec<Value>, ctx: &Context) -> Result<Value> {
    match (namespace, method) {
        ("GeneralUtils", "generateResourceId") => Ok(Value::String(Uuid::new_v4().to_string())),
        ("HL7", "components") => hl7_components(args),
        ("DateUtil", "formatDate") => date_format(args),
        ("StringUtils", "trim") => string_trim(args),
        ("EncounterUtils", "statusFor") => encounter_status(args),
        ("Vocabulary", "lookup") => vocabulary_lookup(args, ctx),
        _ => Err(Error::FunctionNotFound(namespace.to_string(), method.to_string())),
    }
}

/// `Vocabulary.lookup(system, code)` — delegates to the context's attached
/// `VocabularyLookup`; resolves to `null` if none is attached or the code is unknown.
fn vocabulary_lookup(args: Vec<Value>, ctx: &Context) -> Result<Value> {
    let mut iter = args.into_iter();
    let system = iter
        .next()
        .and_then(|v| v.as_string())
        .ok_or_else(|| Error::EvaluationError("Vocabulary.lookup requires a system argument".into()))?;
    let code = iter
        .next()
        .and_then(|v| v.as_string())
        .ok_or_else(|| Error::EvaluationError("Vocabulary.lookup requires a code argument".into()))?;
    match ctx.vocabulary().and_then(|v| v.lookup(&system, &code)) {
        Some(term) => Ok(Value::String(term)),
        None => Ok(Value::Null),
    }
}

/// `HL7.components(field, 2, 3, ...)` — extracts the given 1-based component
/// indices out of a `$field`-bound composite node, skipping empty values.
fn hl7_components(args: Vec<Value>) -> Result<Value> {
    let mut iter = args.into_iter();
    let field = iter
        .next()
        .ok_or_else(|| Error::EvaluationError("HL7.components requires a field argument".into()))?;
    let node = match field {
        Value::Node(node) => node,
        other => {
            return Err(Error::TypeError(format!(
                "HL7.components expected a field node, got {other:?}"
            )))
        }
    };
    let components = match &node {
        Node::Composite(components) => components.as_slice(),
        Node::Repetition(repeats) => match repeats.first() {
            Some(Node::Composite(components)) => components.as_slice(),
            _ => &[],
        },
        Node::Primitive(_) => &[],
    };

    let mut result = Vec::new();
    for index_value in iter {
        let index = index_value
            .as_number()
            .ok_or_else(|| Error::TypeError("HL7.components index must be a number".into()))?
            as usize;
        if let Some(component) = components.get(index.saturating_sub(1)) {
            if let Some(leaf) = component.first_leaf() {
                if !leaf.trim().is_empty() {
                    result.push(Value::String(leaf.to_string()));
                }
            }
        }
    }
    Ok(Value::Array(result))
}

/// `DateUtil.formatDate(raw)` — reformats an HL7 `yyyyMMdd[HHmmss]` value
/// into an ISO 8601 calendar date/datetime; unrecognised input passes through.
fn date_format(args: Vec<Value>) -> Result<Value> {
    let raw = args
        .first()
        .and_then(Value::as_string)
        .ok_or_else(|| Error::EvaluationError("DateUtil.formatDate requires a string argument".into()))?;
    Ok(Value::String(reformat_hl7_datetime(&raw).unwrap_or(raw)))
}

fn string_trim(args: Vec<Value>) -> Result<Value> {
    let value = args
        .first()
        .and_then(Value::as_string)
        .ok_or_else(|| Error::EvaluationError("StringUtils.trim requires a string argument".into()))?;
    Ok(Value::String(value.trim().to_string()))
}

/// `EncounterUtils.statusFor(patientClass)` — a small static mapping from
/// HL7 PV1-2 patient class codes to FHIR encounter status, standing in for
/// the kind of code-system lookup a real template pack would ship many of.
fn encounter_status(args: Vec<Value>) -> Result<Value> {
    let code = args.first().and_then(Value::as_string).unwrap_or_default();
    let status = match code.as_str() {
        "I" => "in-progress",
        "O" | "E" => "finished",
        _ => "unknown",
    };
    Ok(Value::String(status.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_function_is_rejected() {
        let ctx = Context::new(fhirloom_hl7::Scope::default());
        assert!(call("Nope", "nothing", vec![], &ctx).is_err());
    }

    #[test]
    fn vocabulary_lookup_without_attached_vocabulary_is_null() {
        let ctx = Context::new(fhirloom_hl7::Scope::default());
        assert_eq!(
            call("Vocabulary", "lookup", vec![Value::String("OMOP".to_string()), Value::String("1".to_string())], &ctx).unwrap(),
            Value::Null
        );
    }

    #[test]
    fn date_format_reformats_valid_input() {
        assert_eq!(
            date_format(vec![Value::String("19800202".to_string())]).unwrap(),
            Value::String("1980-02-02".to_string())
        );
    }

    #[test]
    fn date_format_passes_through_unparseable_input() {
        assert_eq!(
            date_format(vec![Value::String("not-a-date".to_string())]).unwrap(),
            Value::String("not-a-date".to_string())
        );
    }

    #[test]
    fn encounter_status_maps_known_codes() {
        assert_eq!(
            encounter_status(vec![Value::String("I".to_string())]).unwrap(),
            Value::String("in-progress".to_string())
        );
        assert_eq!(
            encounter_status(vec![Value::String("Z".to_string())]).unwrap(),
            Value::String("unknown".to_string())
        );
    }
}
