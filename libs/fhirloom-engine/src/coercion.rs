//! Output-type coercion applied to `HL7Spec` results: date reformatting and
//! value-set-bound code mapping (`SPEC_FULL.md` §4.3). Deliberately separate
//! from `fhirloom_script::functions`'s `DateUtil.formatDate` — that one is an
//! explicit script call; this one runs automatically from a field's declared
//! `type`/`valueSet`, a different trigger with its own failure policy (§7:
//! omit + warn rather than passthrough).

use fhirloom_models::reformat_hl7_datetime;
use fhirloom_templates::FieldType;
use serde_json::Value as JsonValue;

pub fn coerce(field_type: FieldType, raw: &str) -> Result<JsonValue, String> {
    match field_type {
        FieldType::String | FieldType::Object | FieldType::Array => Ok(JsonValue::String(raw.to_string())),
        FieldType::Integer => raw
            .trim()
            .parse::<i64>()
            .map(JsonValue::from)
            .map_err(|_| format!("'{raw}' is not a valid integer")),
        FieldType::Boolean => match raw.trim() {
            "Y" | "y" | "true" | "1" => Ok(JsonValue::Bool(true)),
            "N" | "n" | "false" | "0" => Ok(JsonValue::Bool(false)),
            other => Err(format!("'{other}' is not a valid boolean")),
        },
        FieldType::Date => reformat_hl7_datetime(raw)
            .map(JsonValue::String)
            .ok_or_else(|| format!("'{raw}' is not a valid HL7 date/datetime")),
    }
}

/// Applies a named static value-set mapping. An unrecognised value-set name
/// passes the raw code through unchanged, rather than failing the field —
/// template authors are expected to only reference value sets this crate ships.
pub fn apply_value_set(value_set: &str, raw: &str) -> String {
    match value_set {
        "administrative-gender" => administrative_gender(raw).to_string(),
        _ => raw.to_string(),
    }
}

fn administrative_gender(code: &str) -> &'static str {
    match code.trim().to_ascii_uppercase().as_str() {
        "M" => "male",
        "F" => "female",
        "O" => "other",
        _ => "unknown",
    }
}
