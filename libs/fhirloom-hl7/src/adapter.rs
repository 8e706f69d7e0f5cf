//! Adapts a parsed `hl7_parser::Message` into our canonical [`HL7Tree`].
//!
//! This is the only module in the workspace that touches `hl7_parser`'s own
//! segment/field/repeat/component types; everything downstream works purely
//! on [`crate::node::Node`]. Isolating the adapter this way means a future
//! upgrade of the external parser only ever touches this one file.

use hl7_parser::message::{Component, Field, Message as RawMessage, Repeat, Segment};
use hl7_parser::parser::parse_message_with_lenient_newlines;

use crate::error::{Error, Result};
use crate::node::{HL7Tree, Node};

pub fn adapt(source: &str) -> Result<HL7Tree> {
    let raw = parse_message_with_lenient_newlines(source, true).map_err(|e| {
        tracing::warn!(error = %e, "failed to parse HL7 message");
        Error::ParseError(e.to_string())
    })?;
    Ok(adapt_message(&raw))
}

pub fn adapt_message(message: &RawMessage<'_>) -> HL7Tree {
    let mut tree = HL7Tree::new();
    for segment in &message.segments {
        tree.push_occurrence(segment.name.to_string(), convert_segment(segment));
    }
    tree
}

fn convert_segment(segment: &Segment<'_>) -> Node {
    Node::Composite(segment.fields.iter().map(convert_field).collect())
}

fn convert_field(field: &Field<'_>) -> Node {
    Node::Repetition(field.repeats.iter().map(convert_repeat).collect())
}

fn convert_repeat(repeat: &Repeat<'_>) -> Node {
    match repeat {
        Repeat::Value(v) => Node::Composite(vec![Node::Primitive(v.to_string())]),
        Repeat::Component(component) => Node::Composite(vec![convert_component(component)]),
        Repeat::Components(components) => {
            Node::Composite(components.iter().map(convert_component).collect())
        }
    }
}

fn convert_component(component: &Component<'_>) -> Node {
    match component {
        Component::Value(v) => Node::Primitive(v.to_string()),
        Component::Subcomponents(subs) => {
            Node::Composite(subs.iter().map(|s| Node::Primitive(s.0.to_string())).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adapts_minimal_adt_a01() {
        let source = "MSH|^~\\&|SE050|050|PACS|050|20120912011230||ADT^A01|102|T|2.6\rEVN||201209122222\rPID|1||123456^^^MRN||DOE^JOHN^A||19800202|M\rPV1|1|I|2000^2012^01\r";
        let tree = adapt(source).expect("valid message parses");
        assert!(tree.has_segment("MSH"));
        assert!(tree.has_segment("PID"));
        assert_eq!(tree.occurrence_count("PID"), 1);
    }
}
