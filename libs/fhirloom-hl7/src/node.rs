//! The canonical, owned HL7 message tree.
//!
//! Reflects the `SPEC_FULL.md` §9 redesign directive directly: a tagged sum
//! type instead of reflection-based navigation over the parser's own object
//! graph. `Node` is the single recursive shape used at every level below a
//! segment occurrence (field, repetition, component, subcomponent); only the
//! adapter module cares which level it is looking at.

use indexmap::IndexMap;

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A leaf value: one subcomponent, or a component/field with no further structure.
    Primitive(String),
    /// An ordered list of components (or subcomponents).
    Composite(Vec<Node>),
    /// An ordered list of repeats at a single field position.
    Repetition(Vec<Node>),
}

impl Node {
    /// True if this node, or anything beneath it, holds a non-empty (post-trim) primitive.
    pub fn has_content(&self) -> bool {
        match self {
            Node::Primitive(s) => !s.trim().is_empty(),
            Node::Composite(children) | Node::Repetition(children) => {
                children.iter().any(Node::has_content)
            }
        }
    }

    /// The first non-empty leaf primitive beneath this node, depth-first.
    pub fn first_leaf(&self) -> Option<&str> {
        match self {
            Node::Primitive(s) if !s.trim().is_empty() => Some(s.as_str()),
            Node::Primitive(_) => None,
            Node::Composite(children) | Node::Repetition(children) => {
                children.iter().find_map(Node::first_leaf)
            }
        }
    }
}

/// One parsed HL7 message: segments grouped by name, in first-appearance order,
/// each group holding every occurrence of that segment in input order.
///
/// Each occurrence is a `Node::Composite` of fields; each field is a
/// `Node::Repetition` of repeats; each repeat is a `Node::Composite` of
/// components; each component is a `Node::Primitive` or a `Node::Composite`
/// of subcomponents.
#[derive(Debug, Clone, Default)]
pub struct HL7Tree {
    pub segments: IndexMap<String, Vec<Node>>,
}

impl HL7Tree {
    pub fn new() -> Self {
        Self {
            segments: IndexMap::new(),
        }
    }

    pub fn push_occurrence(&mut self, segment_name: impl Into<String>, occurrence: Node) {
        self.segments
            .entry(segment_name.into())
            .or_default()
            .push(occurrence);
    }

    pub fn occurrences(&self, segment_name: &str) -> &[Node] {
        self.segments
            .get(segment_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn first_occurrence(&self, segment_name: &str) -> Option<&Node> {
        self.occurrences(segment_name).first()
    }

    pub fn occurrence_count(&self, segment_name: &str) -> usize {
        self.occurrences(segment_name).len()
    }

    pub fn has_segment(&self, segment_name: &str) -> bool {
        self.segments.contains_key(segment_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn primitive(s: &str) -> Node {
        Node::Primitive(s.to_string())
    }

    #[test]
    fn has_content_recurses_through_wrapping_layers() {
        let field = Node::Repetition(vec![Node::Composite(vec![primitive("")])]);
        assert!(!field.has_content());
        let field = Node::Repetition(vec![Node::Composite(vec![primitive("DOE")])]);
        assert!(field.has_content());
    }

    #[test]
    fn occurrences_groups_by_segment_name_preserving_order() {
        let mut tree = HL7Tree::new();
        tree.push_occurrence("AL1", Node::Composite(vec![primitive("1")]));
        tree.push_occurrence("AL1", Node::Composite(vec![primitive("2")]));
        assert_eq!(tree.occurrence_count("AL1"), 2);
        assert_eq!(tree.occurrence_count("PID"), 0);
    }
}
