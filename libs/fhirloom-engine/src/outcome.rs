//! Field-level results: never a Rust `Err` bubbling out of the resource
//! template evaluation loop (`SPEC_FULL.md` §7, §9 — "exception-driven
//! control flow → result values"). Only [`crate::error::Error`] variants for
//! unresolved references and unknown message types escape to the coordinator.

use serde_json::Value as JsonValue;

#[derive(Debug, Clone)]
pub struct Warning {
    pub field: String,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub enum FieldOutcome {
    Ok(JsonValue),
    Warn(Warning),
    Omit,
}

impl FieldOutcome {
    pub fn into_value(self) -> Option<JsonValue> {
        match self {
            FieldOutcome::Ok(value) => Some(value),
            FieldOutcome::Warn(_) | FieldOutcome::Omit => None,
        }
    }

    pub fn warning(&self) -> Option<&Warning> {
        match self {
            FieldOutcome::Warn(warning) => Some(warning),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warn_outcome_has_no_value() {
        let outcome = FieldOutcome::Warn(Warning {
            field: "gender".to_string(),
            reason: "bad code".to_string(),
        });
        assert!(outcome.into_value().is_none());
    }
}
