//! Typed AST for Message, Resource, and Datatype Templates, decoded directly
//! from YAML via `serde`. Declaration order is load-bearing (`SPEC_FULL.md`
//! §3, §5), so every template-level map uses `IndexMap`, never `HashMap`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldType {
    String,
    Integer,
    Date,
    Boolean,
    Object,
    Array,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpressionType {
    #[serde(rename = "HL7Spec")]
    Hl7Spec,
    #[serde(rename = "JEXL")]
    Jexl,
    Resource,
    Reference,
}

/// One Message Template: a named ordered list of Resource Entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageTemplate {
    pub name: String,
    pub resources: Vec<ResourceEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceEntry {
    pub resource_name: String,
    pub segment: String,
    pub resource_path: String,
    #[serde(default)]
    pub repeats: bool,
    #[serde(default)]
    pub is_referenced: bool,
    #[serde(default)]
    pub additional_segments: Vec<String>,
}

/// A Resource Template or a Datatype Template: both are an `resourceType`
/// label plus an ordered map from output field name to [`FieldExpression`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceTemplate {
    pub resource_type: String,
    pub fields: IndexMap<String, FieldExpression>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldExpression {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub generate_list: bool,
    pub value_of: String,
    pub expression_type: ExpressionType,
    #[serde(default)]
    pub specs: Option<String>,
    /// Ordered name -> nested expression bindings, evaluated in the
    /// enclosing scope before a `Resource` expression's new frame is pushed.
    #[serde(default)]
    pub vars: IndexMap<String, FieldExpression>,
    /// Name of a small static value-set mapping table to apply to an
    /// `HL7Spec` result (e.g. `administrative-gender`); `None` means no
    /// coercion beyond the declared `type`.
    #[serde(default)]
    pub value_set: Option<String>,
}

impl ResourceEntry {
    pub fn validate(&self, template_name: &str) -> Result<(), String> {
        if self.resource_name.trim().is_empty() {
            return Err(format!(
                "resource entry in message template '{template_name}' is missing resourceName"
            ));
        }
        if self.segment.trim().is_empty() {
            return Err(format!(
                "resource entry '{}' in message template '{template_name}' is missing segment",
                self.resource_name
            ));
        }
        Ok(())
    }
}

impl FieldExpression {
    pub fn validate(&self, field_name: &str) -> Result<(), String> {
        if self.expression_type == ExpressionType::Resource && self.specs.is_none() {
            return Err(format!(
                "field '{field_name}' declares expressionType: Resource but has no specs"
            ));
        }
        for (nested_name, nested) in &self.vars {
            nested.validate(nested_name)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_minimal_resource_template() {
        let yaml = r#"
resourceType: Patient
fields:
  gender:
    type: STRING
    valueOf: "PID.8"
    expressionType: HL7Spec
  identifier:
    type: OBJECT
    valueOf: identifier
    expressionType: Resource
    specs: "PID.3"
"#;
        let template: ResourceTemplate = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(template.resource_type, "Patient");
        assert_eq!(template.fields.len(), 2);
        let keys: Vec<_> = template.fields.keys().cloned().collect();
        assert_eq!(keys, vec!["gender", "identifier"]);
    }

    #[test]
    fn resource_expression_without_specs_fails_validation() {
        let expr = FieldExpression {
            field_type: FieldType::Object,
            generate_list: false,
            value_of: "identifier".to_string(),
            expression_type: ExpressionType::Resource,
            specs: None,
            vars: IndexMap::new(),
            value_set: None,
        };
        assert!(expr.validate("identifier").is_err());
    }
}
