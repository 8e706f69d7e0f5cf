//! Expression Evaluator: dispatches a [`FieldExpression`] by its
//! `expressionType` (`SPEC_FULL.md` §4.3). Field-level failures never raise
//! here — they surface as [`FieldOutcome::Warn`]/`Omit` and are logged, not
//! propagated. Only an unresolved `Reference` target escapes as
//! [`crate::error::Error`], per §7.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Map, Value as JsonValue};
use tracing::warn;

use fhirloom_hl7::{resolve_nodes, resolve_traced, Node, Scope as Hl7Scope, Spec};
use fhirloom_models::CoverageReport;
use fhirloom_script::{Context as ScriptContext, Engine as ScriptEngine, Value as ScriptValue, VocabularyLookup};
use fhirloom_templates::{ExpressionType, FieldExpression, ResourceTemplate, TemplateLoader};

use crate::coercion;
use crate::error::{Error, Result};
use crate::outcome::{FieldOutcome, Warning};
use crate::reference::ReferenceCache;

/// Shared, per-conversion evaluation dependencies threaded through every
/// recursive template evaluation.
pub struct EvalEnv<'a> {
    pub loader: &'a TemplateLoader,
    pub script_engine: &'a ScriptEngine,
    pub vocabulary: Arc<dyn VocabularyLookup>,
    pub reference_cache: &'a mut ReferenceCache,
    pub coverage: &'a mut CoverageReport,
    pub max_depth: u32,
}

/// Evaluates every field of `template` in declaration order, returning the
/// assembled (and order-preserving, thanks to `serde_json`'s
/// `preserve_order` feature) field map.
pub fn evaluate_resource_template(
    template: &ResourceTemplate,
    ctx: &ScriptContext,
    env: &mut EvalEnv,
    depth: u32,
) -> Result<Map<String, JsonValue>> {
    let mut fields = Map::new();
    for (name, field) in &template.fields {
        if let FieldOutcome::Ok(value) = evaluate_field(name, field, ctx, env, depth)? {
            fields.insert(name.clone(), value);
        }
    }
    Ok(fields)
}

fn evaluate_field(
    name: &str,
    field: &FieldExpression,
    ctx: &ScriptContext,
    env: &mut EvalEnv,
    depth: u32,
) -> Result<FieldOutcome> {
    match field.expression_type {
        ExpressionType::Hl7Spec => Ok(evaluate_hl7spec(name, field, ctx.hl7_scope(), env)),
        ExpressionType::Jexl => evaluate_jexl(name, field, ctx, env, depth),
        ExpressionType::Resource => evaluate_resource_expr(name, field, ctx, env, depth),
        ExpressionType::Reference => evaluate_reference(field, env),
    }
}

fn evaluate_hl7spec(name: &str, field: &FieldExpression, hl7_scope: &Hl7Scope, env: &mut EvalEnv) -> FieldOutcome {
    let spec = match Spec::parse(&field.value_of) {
        Ok(spec) => spec,
        Err(err) => return warn_and_omit(name, err.to_string()),
    };

    let (value, label) = resolve_traced(&spec, hl7_scope, field.generate_list);
    if value.is_empty() {
        return FieldOutcome::Omit;
    }
    if let Some((segment, field_index)) = &label {
        env.coverage.mark_read(segment, format!("{segment}.{field_index}"));
    }

    if field.generate_list {
        let items = match value {
            fhirloom_hl7::Value::List(items) => items,
            other => match other.as_primitive_string() {
                Some(s) if !s.trim().is_empty() => vec![s],
                _ => Vec::new(),
            },
        };
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            match coerced_value(field, &item) {
                Ok(v) => out.push(v),
                Err(reason) => return warn_and_omit(name, reason),
            }
        }
        if out.is_empty() {
            FieldOutcome::Omit
        } else {
            FieldOutcome::Ok(JsonValue::Array(out))
        }
    } else {
        let raw = match value.as_primitive_string() {
            Some(s) if !s.trim().is_empty() => s,
            _ => return FieldOutcome::Omit,
        };
        match coerced_value(field, &raw) {
            Ok(v) => FieldOutcome::Ok(v),
            Err(reason) => warn_and_omit(name, reason),
        }
    }
}

fn coerced_value(field: &FieldExpression, raw: &str) -> std::result::Result<JsonValue, String> {
    match &field.value_set {
        Some(value_set) => Ok(JsonValue::String(coercion::apply_value_set(value_set, raw))),
        None => coercion::coerce(field.field_type, raw),
    }
}

fn evaluate_jexl(
    name: &str,
    field: &FieldExpression,
    ctx: &ScriptContext,
    env: &mut EvalEnv,
    depth: u32,
) -> Result<FieldOutcome> {
    let vars = evaluate_vars(&field.vars, ctx, env, depth)?;
    let mut script_ctx = ctx.clone();
    for (var_name, value) in vars {
        script_ctx = script_ctx.with_var(var_name, value);
    }

    let outcome = match env.script_engine.evaluate(&field.value_of, &script_ctx) {
        Ok(value) if field.generate_list => match value {
            ScriptValue::Array(items) => {
                let arr: Vec<JsonValue> = items.into_iter().map(script_to_json).collect();
                if arr.is_empty() {
                    FieldOutcome::Omit
                } else {
                    FieldOutcome::Ok(JsonValue::Array(arr))
                }
            }
            other => {
                let json = script_to_json(other);
                if json_is_empty(&json) {
                    FieldOutcome::Omit
                } else {
                    FieldOutcome::Ok(JsonValue::Array(vec![json]))
                }
            }
        },
        Ok(value) => {
            let json = script_to_json(value);
            if json_is_empty(&json) {
                FieldOutcome::Omit
            } else {
                FieldOutcome::Ok(json)
            }
        }
        Err(err) => warn_and_omit(name, err.to_string()),
    };
    Ok(outcome)
}

fn evaluate_resource_expr(
    name: &str,
    field: &FieldExpression,
    ctx: &ScriptContext,
    env: &mut EvalEnv,
    depth: u32,
) -> Result<FieldOutcome> {
    if depth >= env.max_depth {
        return Ok(warn_and_omit(
            name,
            format!("template recursion depth limit ({}) exceeded", env.max_depth),
        ));
    }

    let specs = match &field.specs {
        Some(specs) => specs,
        None => return Ok(warn_and_omit(name, "Resource expression has no specs".to_string())),
    };
    let spec = match Spec::parse(specs) {
        Ok(spec) => spec,
        Err(err) => return Ok(warn_and_omit(name, err.to_string())),
    };

    let nodes = resolve_nodes(&spec, ctx.hl7_scope(), field.generate_list);
    if nodes.is_empty() {
        return Ok(FieldOutcome::Omit);
    }

    let sub_template = match env.loader.load_resource_template(&field.value_of) {
        Ok(template) => template,
        Err(err) => return Ok(warn_and_omit(name, err.to_string())),
    };
    let vars = evaluate_vars(&field.vars, ctx, env, depth)?;

    if field.generate_list {
        let mut out = Vec::new();
        for node in nodes {
            if let Some(value) = build_resource_instance(&sub_template, node, ctx, &vars, env, depth)? {
                out.push(value);
            }
        }
        Ok(if out.is_empty() {
            FieldOutcome::Omit
        } else {
            FieldOutcome::Ok(JsonValue::Array(out))
        })
    } else {
        let node = nodes.into_iter().next().expect("checked non-empty above");
        match build_resource_instance(&sub_template, node, ctx, &vars, env, depth)? {
            Some(value) => Ok(FieldOutcome::Ok(value)),
            None => Ok(FieldOutcome::Omit),
        }
    }
}

fn build_resource_instance(
    sub_template: &ResourceTemplate,
    node: Node,
    ctx: &ScriptContext,
    vars: &[(String, ScriptValue)],
    env: &mut EvalEnv,
    depth: u32,
) -> Result<Option<JsonValue>> {
    let new_hl7_scope = ctx.hl7_scope().with_field(node);
    let mut sub_ctx = ScriptContext::new(new_hl7_scope).with_vocabulary(env.vocabulary.clone());
    for (var_name, value) in vars {
        sub_ctx = sub_ctx.with_var(var_name.clone(), value.clone());
    }
    let fields = evaluate_resource_template(sub_template, &sub_ctx, env, depth + 1)?;
    Ok(if fields.is_empty() { None } else { Some(JsonValue::Object(fields)) })
}

fn evaluate_reference(field: &FieldExpression, env: &mut EvalEnv) -> Result<FieldOutcome> {
    let resource_type = field
        .value_of
        .strip_prefix("$ref:")
        .unwrap_or(field.value_of.as_str());
    match env.reference_cache.resolve(resource_type) {
        Some(id) => Ok(FieldOutcome::Ok(serde_json::json!({
            "reference": format!("{resource_type}/{id}")
        }))),
        None => Err(Error::UnresolvedReference(resource_type.to_string())),
    }
}

fn evaluate_vars(
    vars: &IndexMap<String, FieldExpression>,
    ctx: &ScriptContext,
    env: &mut EvalEnv,
    depth: u32,
) -> Result<Vec<(String, ScriptValue)>> {
    let mut out = Vec::with_capacity(vars.len());
    for (var_name, expr) in vars {
        let value = match evaluate_field(var_name, expr, ctx, env, depth)? {
            FieldOutcome::Ok(json) => json_to_script_value(&json),
            FieldOutcome::Warn(_) | FieldOutcome::Omit => ScriptValue::Null,
        };
        out.push((var_name.clone(), value));
    }
    Ok(out)
}

fn warn_and_omit(field: &str, reason: String) -> FieldOutcome {
    warn!(field, reason, "field omitted");
    FieldOutcome::Warn(Warning {
        field: field.to_string(),
        reason,
    })
}

fn json_to_script_value(value: &JsonValue) -> ScriptValue {
    match value {
        JsonValue::Null => ScriptValue::Null,
        JsonValue::Bool(b) => ScriptValue::Bool(*b),
        JsonValue::Number(n) => ScriptValue::Number(n.as_f64().unwrap_or(0.0)),
        JsonValue::String(s) => ScriptValue::String(s.clone()),
        JsonValue::Array(items) => ScriptValue::Array(items.iter().map(json_to_script_value).collect()),
        JsonValue::Object(_) => ScriptValue::Null,
    }
}

fn script_to_json(value: ScriptValue) -> JsonValue {
    match value {
        ScriptValue::Null => JsonValue::Null,
        ScriptValue::Bool(b) => JsonValue::Bool(b),
        ScriptValue::Number(n) => serde_json::Number::from_f64(n)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        ScriptValue::String(s) => JsonValue::String(s),
        ScriptValue::Array(items) => JsonValue::Array(items.into_iter().map(script_to_json).collect()),
        ScriptValue::Node(node) => node.first_leaf().map(|s| JsonValue::String(s.to_string())).unwrap_or(JsonValue::Null),
    }
}

fn json_is_empty(value: &JsonValue) -> bool {
    matches!(value, JsonValue::Null) || matches!(value, JsonValue::String(s) if s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fhirloom_hl7::adapt;
    use fhirloom_script::NoopVocabularyLookup;
    use fhirloom_templates::TemplateSource;

    fn test_env<'a>(
        loader: &'a TemplateLoader,
        script_engine: &'a ScriptEngine,
        reference_cache: &'a mut ReferenceCache,
        coverage: &'a mut CoverageReport,
    ) -> EvalEnv<'a> {
        EvalEnv {
            loader,
            script_engine,
            vocabulary: Arc::new(NoopVocabularyLookup),
            reference_cache,
            coverage,
            max_depth: 32,
        }
    }

    #[test]
    fn evaluates_patient_fields_from_embedded_template() {
        let tree = adapt(
            "MSH|^~\\&|SE050|050|PACS|050|20120912011230||ADT^A01|102|T|2.6\rPID|1||123456^^^MRN||DOE^JOHN^A||19800202|M\r",
        )
        .unwrap();
        let occurrence = tree.first_occurrence("PID").unwrap().clone();
        let scope = fhirloom_hl7::Scope::for_resource_entry(&tree, "PID", occurrence, &[]);
        let ctx = ScriptContext::new(scope);

        let loader = TemplateLoader::new(TemplateSource::default());
        let engine = ScriptEngine::new();
        let mut reference_cache = ReferenceCache::new();
        let mut coverage = CoverageReport::new(None);
        let mut env = test_env(&loader, &engine, &mut reference_cache, &mut coverage);

        let template = loader.load_resource_template("resource/Patient.yml").unwrap();
        let fields = evaluate_resource_template(&template, &ctx, &mut env, 0).unwrap();

        assert_eq!(fields.get("gender"), Some(&JsonValue::String("male".to_string())));
        assert_eq!(fields.get("birthDate"), Some(&JsonValue::String("1980-02-02".to_string())));
        let names = fields.get("name").unwrap().as_array().unwrap();
        assert_eq!(names[0]["family"], JsonValue::String("DOE".to_string()));
        assert_eq!(
            names[0]["given"],
            JsonValue::Array(vec![JsonValue::String("JOHN".to_string()), JsonValue::String("A".to_string())])
        );
    }

    #[test]
    fn unresolved_reference_is_a_hard_error() {
        let tree = adapt("PV1|1|I|2000^2012^01\r").unwrap();
        let occurrence = tree.first_occurrence("PV1").unwrap().clone();
        let scope = fhirloom_hl7::Scope::for_resource_entry(&tree, "PV1", occurrence, &[]);
        let ctx = ScriptContext::new(scope);

        let loader = TemplateLoader::new(TemplateSource::default());
        let engine = ScriptEngine::new();
        let mut reference_cache = ReferenceCache::new();
        let mut coverage = CoverageReport::new(None);
        let mut env = test_env(&loader, &engine, &mut reference_cache, &mut coverage);

        let template = loader.load_resource_template("resource/Encounter.yml").unwrap();
        let result = evaluate_resource_template(&template, &ctx, &mut env, 0);
        assert!(matches!(result, Err(Error::UnresolvedReference(ref t)) if t == "Patient"));
    }
}
