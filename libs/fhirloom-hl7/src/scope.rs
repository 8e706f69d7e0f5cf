//! The outer layer of the evaluation scope stack: named segments plus an
//! optional `$field` binding. The inner `vars` layer (named script bindings)
//! lives in the expression evaluator, which wraps a `Scope` rather than
//! extending it, since vars are evaluated values, not HL7 sub-trees.

use std::collections::HashMap;

use crate::node::{HL7Tree, Node};

#[derive(Debug, Clone, Default)]
pub struct Scope {
    segments: HashMap<String, Node>,
    field: Option<Node>,
}

impl Scope {
    /// Builds the outer frame for one Resource Entry occurrence: the driving
    /// segment bound to this specific occurrence, plus the first occurrence
    /// of each additional segment resolved against the message root.
    pub fn for_resource_entry(
        tree: &HL7Tree,
        primary_segment: &str,
        primary_occurrence: Node,
        additional_segments: &[String],
    ) -> Self {
        let mut segments = HashMap::new();
        segments.insert(primary_segment.to_string(), primary_occurrence);
        for name in additional_segments {
            if let Some(node) = tree.first_occurrence(name) {
                segments.insert(name.clone(), node.clone());
            }
        }
        Scope {
            segments,
            field: None,
        }
    }

    /// Pushes a new `$field` binding, keeping the same segment frame (used
    /// when a `Resource` expression invokes a sub-template).
    pub fn with_field(&self, field: Node) -> Scope {
        Scope {
            segments: self.segments.clone(),
            field: Some(field),
        }
    }

    pub fn segment(&self, name: &str) -> Option<&Node> {
        self.segments.get(name)
    }

    pub fn field(&self) -> Option<&Node> {
        self.field.as_ref()
    }
}
