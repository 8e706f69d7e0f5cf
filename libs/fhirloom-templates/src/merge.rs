//! Layering: an override template merges into a base template property by
//! property, matched by the same key the base collection is keyed by
//! (`resourceName` for Resource Entries, field name for Field Expressions).
//! For each property: present-and-non-null overrides the base value,
//! present-and-null clears it, absent keeps the base — the merge semantics
//! of the retrieved pack's schema-override format (`Nullable<T>`/`merge_field`).
//! A key with no base counterpart becomes a brand-new entry, built straight
//! from the override with sensible defaults for anything it left absent.

use indexmap::IndexMap;

use crate::ast::{ExpressionType, FieldExpression, FieldType, MessageTemplate, ResourceEntry, ResourceTemplate};
use crate::override_ast::{
    FieldExpressionOverride, MessageTemplateOverride, Nullable, ResourceEntryOverride, ResourceTemplateOverride,
};

pub fn merge_message_template(base: MessageTemplate, over: MessageTemplateOverride) -> MessageTemplate {
    let name = base.name;
    let mut by_name: IndexMap<String, ResourceEntry> = base
        .resources
        .into_iter()
        .map(|entry| (entry.resource_name.clone(), entry))
        .collect();

    for entry_override in over.resources {
        let merged = match by_name.get(&entry_override.resource_name) {
            Some(base_entry) => merge_resource_entry(base_entry, &entry_override),
            None => resource_entry_from_override(entry_override.clone()),
        };
        by_name.insert(entry_override.resource_name, merged);
    }

    MessageTemplate {
        name: merge_option_nullable(&Some(name.clone()), &over.name).unwrap_or(name),
        resources: by_name.into_values().collect(),
    }
}

fn merge_resource_entry(base: &ResourceEntry, over: &ResourceEntryOverride) -> ResourceEntry {
    ResourceEntry {
        resource_name: base.resource_name.clone(),
        segment: merge_option_nullable(&Some(base.segment.clone()), &over.segment)
            .unwrap_or_else(|| base.segment.clone()),
        resource_path: merge_option_nullable(&Some(base.resource_path.clone()), &over.resource_path)
            .unwrap_or_else(|| base.resource_path.clone()),
        repeats: merge_option_nullable(&Some(base.repeats), &over.repeats).unwrap_or(base.repeats),
        is_referenced: merge_option_nullable(&Some(base.is_referenced), &over.is_referenced)
            .unwrap_or(base.is_referenced),
        additional_segments: merge_option_nullable(&Some(base.additional_segments.clone()), &over.additional_segments)
            .unwrap_or_else(|| base.additional_segments.clone()),
    }
}

fn resource_entry_from_override(over: ResourceEntryOverride) -> ResourceEntry {
    ResourceEntry {
        resource_name: over.resource_name,
        segment: nullable_value(over.segment).unwrap_or_default(),
        resource_path: nullable_value(over.resource_path).unwrap_or_default(),
        repeats: nullable_value(over.repeats).unwrap_or(false),
        is_referenced: nullable_value(over.is_referenced).unwrap_or(false),
        additional_segments: nullable_value(over.additional_segments).unwrap_or_default(),
    }
}

pub fn merge_resource_template(base: ResourceTemplate, over: ResourceTemplateOverride) -> ResourceTemplate {
    let resource_type = base.resource_type;
    let mut fields = base.fields;

    for (name, field_override) in over.fields {
        let merged = match fields.get(&name) {
            Some(base_field) => merge_field_expression(base_field, &field_override),
            None => field_expression_from_override(field_override),
        };
        fields.insert(name, merged);
    }

    ResourceTemplate {
        resource_type: merge_option_nullable(&Some(resource_type.clone()), &over.resource_type).unwrap_or(resource_type),
        fields,
    }
}

fn merge_field_expression(base: &FieldExpression, over: &FieldExpressionOverride) -> FieldExpression {
    FieldExpression {
        field_type: merge_option_nullable(&Some(base.field_type), &over.field_type).unwrap_or(base.field_type),
        generate_list: merge_option_nullable(&Some(base.generate_list), &over.generate_list)
            .unwrap_or(base.generate_list),
        value_of: merge_option_nullable(&Some(base.value_of.clone()), &over.value_of)
            .unwrap_or_else(|| base.value_of.clone()),
        expression_type: merge_option_nullable(&Some(base.expression_type), &over.expression_type)
            .unwrap_or(base.expression_type),
        specs: merge_option_nullable(&base.specs, &over.specs),
        vars: merge_option_nullable(&Some(base.vars.clone()), &over.vars).unwrap_or_default(),
        value_set: merge_option_nullable(&base.value_set, &over.value_set),
    }
}

fn field_expression_from_override(over: FieldExpressionOverride) -> FieldExpression {
    FieldExpression {
        field_type: nullable_value(over.field_type).unwrap_or(FieldType::String),
        generate_list: nullable_value(over.generate_list).unwrap_or(false),
        value_of: nullable_value(over.value_of).unwrap_or_default(),
        expression_type: nullable_value(over.expression_type).unwrap_or(ExpressionType::Hl7Spec),
        specs: nullable_value(over.specs),
        vars: nullable_value(over.vars).unwrap_or_default(),
        value_set: nullable_value(over.value_set),
    }
}

/// Merges a base value with an override that may be absent (keep base),
/// present-and-null (clear), or present-and-valued (replace).
fn merge_option_nullable<T: Clone>(base: &Option<T>, over: &Option<Nullable<T>>) -> Option<T> {
    match over {
        None => base.clone(),
        Some(Nullable::Value(v)) => Some(v.clone()),
        Some(Nullable::Null) => None,
    }
}

fn nullable_value<T>(over: Option<Nullable<T>>) -> Option<T> {
    match over {
        Some(Nullable::Value(v)) => Some(v),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string_field(value_of: &str) -> FieldExpression {
        FieldExpression {
            field_type: FieldType::String,
            generate_list: false,
            value_of: value_of.to_string(),
            expression_type: ExpressionType::Hl7Spec,
            specs: None,
            vars: IndexMap::new(),
            value_set: None,
        }
    }

    #[test]
    fn override_replaces_only_the_overridden_property() {
        let mut base_fields = IndexMap::new();
        base_fields.insert("gender".to_string(), string_field("PID.8"));
        base_fields.insert("birthDate".to_string(), string_field("PID.7"));
        let base = ResourceTemplate {
            resource_type: "Patient".to_string(),
            fields: base_fields,
        };

        let yaml = r#"
fields:
  birthDate:
    valueOf: "PID.7.1"
"#;
        let over: ResourceTemplateOverride = serde_yaml::from_str(yaml).unwrap();
        let merged = merge_resource_template(base, over);

        let keys: Vec<_> = merged.fields.keys().cloned().collect();
        assert_eq!(keys, vec!["gender", "birthDate"]);
        assert_eq!(merged.fields["birthDate"].value_of, "PID.7.1");
        // untouched properties of the overridden field are preserved from base
        assert_eq!(merged.fields["birthDate"].field_type, FieldType::String);
        assert_eq!(merged.fields["birthDate"].expression_type, ExpressionType::Hl7Spec);
        // untouched field is preserved verbatim
        assert_eq!(merged.fields["gender"].value_of, "PID.8");
    }

    #[test]
    fn explicit_null_clears_an_optional_property() {
        let mut base_fields = IndexMap::new();
        let mut gender = string_field("PID.8");
        gender.value_set = Some("administrative-gender".to_string());
        base_fields.insert("gender".to_string(), gender);
        let base = ResourceTemplate {
            resource_type: "Patient".to_string(),
            fields: base_fields,
        };

        let yaml = r#"
fields:
  gender:
    valueSet: null
"#;
        let over: ResourceTemplateOverride = serde_yaml::from_str(yaml).unwrap();
        let merged = merge_resource_template(base, over);
        assert_eq!(merged.fields["gender"].value_set, None);
        assert_eq!(merged.fields["gender"].value_of, "PID.8");
    }

    #[test]
    fn new_field_in_override_is_added() {
        let base = ResourceTemplate {
            resource_type: "Patient".to_string(),
            fields: IndexMap::new(),
        };

        let yaml = r#"
fields:
  maritalStatus:
    valueOf: "PID.16"
"#;
        let over: ResourceTemplateOverride = serde_yaml::from_str(yaml).unwrap();
        let merged = merge_resource_template(base, over);
        assert_eq!(merged.fields["maritalStatus"].value_of, "PID.16");
        assert_eq!(merged.fields["maritalStatus"].field_type, FieldType::String);
    }

    #[test]
    fn resource_entry_override_replaces_only_named_property() {
        let base = MessageTemplate {
            name: "ADT_A01".to_string(),
            resources: vec![ResourceEntry {
                resource_name: "Patient".to_string(),
                segment: "PID".to_string(),
                resource_path: "resource/Patient.yml".to_string(),
                repeats: false,
                is_referenced: true,
                additional_segments: vec![],
            }],
        };

        let yaml = r#"
resources:
  - resourceName: Patient
    repeats: true
"#;
        let over: MessageTemplateOverride = serde_yaml::from_str(yaml).unwrap();
        let merged = merge_message_template(base, over);
        let patient = merged.resources.iter().find(|r| r.resource_name == "Patient").unwrap();
        assert!(patient.repeats);
        assert_eq!(patient.segment, "PID");
        assert!(patient.is_referenced);
    }
}
