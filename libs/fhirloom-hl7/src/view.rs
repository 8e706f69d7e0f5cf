//! The Message View: resolves a [`Spec`] against a [`Scope`] into a [`Value`].

use crate::node::Node;
use crate::scope::Scope;
use crate::spec::{Root, Spec, SpecPath};
use crate::value::Value;

/// Resolves `spec` against `scope`.
///
/// `generate_list` mirrors the calling Field Expression's `generateList`
/// flag: when set and no explicit repetition index was given, every
/// repetition is returned instead of only the first non-empty one.
///
/// Alternation (`A | B`) is evaluated left-to-right; the first alternative
/// whose resolved value is non-empty wins (`SPEC_FULL.md` §4.2, §9).
pub fn resolve(spec: &Spec, scope: &Scope, generate_list: bool) -> Value {
    resolve_traced(spec, scope, generate_list).0
}

/// Like [`resolve`], but also reports which `(segment, field)` produced the
/// winning alternative, for the coverage tracker. `$field`-rooted specs
/// report nothing: the sub-tree they address was already marked when its
/// owning spec resolved.
pub fn resolve_traced(spec: &Spec, scope: &Scope, generate_list: bool) -> (Value, Option<(String, usize)>) {
    for alternative in &spec.alternatives {
        let value = resolve_path(alternative, scope, generate_list);
        if !value.is_empty() {
            let label = match (&alternative.root, alternative.field) {
                (Root::Segment(name), Some(field)) => Some((name.clone(), field)),
                _ => None,
            };
            return (value, label);
        }
    }
    (Value::Empty, None)
}

fn resolve_path(path: &SpecPath, scope: &Scope, generate_list: bool) -> Value {
    match &path.root {
        Root::Segment(name) => resolve_segment_path(name, path, scope, generate_list),
        Root::Field => resolve_field_path(path, scope),
    }
}

fn resolve_segment_path(
    segment_name: &str,
    path: &SpecPath,
    scope: &Scope,
    generate_list: bool,
) -> Value {
    let segment = match scope.segment(segment_name) {
        Some(node) => node,
        None => return Value::Empty,
    };

    let field_index = match path.field {
        Some(index) => index,
        None => return node_to_value(segment),
    };

    let fields = match segment {
        Node::Composite(fields) => fields,
        _ => return Value::Empty,
    };
    let field = match fields.get(field_index.saturating_sub(1)) {
        Some(node) => node,
        None => return Value::Empty,
    };
    let repeats = match field {
        Node::Repetition(repeats) => repeats,
        _ => return Value::Empty,
    };

    if let Some(rep) = path.rep {
        // Repetitions are 0-based internally; the spec's `(REP)` index addresses them directly.
        match repeats.get(rep) {
            Some(repeat) => extract_from_repeat(repeat, path),
            None => Value::Empty,
        }
    } else if generate_list {
        let values: Vec<String> = repeats
            .iter()
            .filter_map(|repeat| extract_from_repeat(repeat, path).as_primitive_string())
            .filter(|s| !s.trim().is_empty())
            .collect();
        if values.is_empty() {
            Value::Empty
        } else {
            Value::List(values)
        }
    } else {
        repeats
            .iter()
            .map(|repeat| extract_from_repeat(repeat, path))
            .find(|value| !value.is_empty())
            .unwrap_or(Value::Empty)
    }
}

fn extract_from_repeat(repeat: &Node, path: &SpecPath) -> Value {
    let components = match repeat {
        Node::Composite(components) => components,
        _ => return Value::Empty,
    };

    let component = match path.component {
        None => return node_to_value(repeat),
        Some(index) => components.get(index.saturating_sub(1)),
    };
    let component = match component {
        Some(node) => node,
        None => return Value::Empty,
    };

    match path.subcomponent {
        None => node_to_value(component),
        Some(index) => match component {
            Node::Composite(subs) => subs
                .get(index.saturating_sub(1))
                .map(node_to_value)
                .unwrap_or(Value::Empty),
            Node::Primitive(s) if index == 1 => Value::Primitive(s.clone()),
            _ => Value::Empty,
        },
    }
}

/// `$field` addressing operates one level "inside" a bound field/repeat
/// sub-tree: the first index addresses a component, the second a
/// subcomponent, because the caller already narrowed the scope to a specific
/// field value before pushing this frame (`SPEC_FULL.md` §4.3.2).
fn resolve_field_path(path: &SpecPath, scope: &Scope) -> Value {
    let bound = match scope.field() {
        Some(node) => node,
        None => return Value::Empty,
    };

    // A bound field may still be wrapped in a repetition layer; take the first repeat.
    let base = match bound {
        Node::Repetition(repeats) => match repeats.first() {
            Some(node) => node,
            None => return Value::Empty,
        },
        other => other,
    };

    let component = match path.field {
        None => return node_to_value(base),
        Some(index) => match base {
            Node::Composite(children) => children.get(index.saturating_sub(1)),
            _ if index == 1 => Some(base),
            _ => None,
        },
    };
    let component = match component {
        Some(node) => node,
        None => return Value::Empty,
    };

    match path.component {
        None => node_to_value(component),
        Some(index) => match component {
            Node::Composite(subs) => subs
                .get(index.saturating_sub(1))
                .map(node_to_value)
                .unwrap_or(Value::Empty),
            Node::Primitive(s) if index == 1 => Value::Primitive(s.clone()),
            _ => Value::Empty,
        },
    }
}

/// Resolves `spec` to the raw sub-tree handle(s) it addresses, rather than
/// collapsing each repetition to a primitive string the way [`resolve`]
/// does. `Resource` expressions need this: they hand the sub-tree to a
/// nested template evaluation, not a flattened value (`SPEC_FULL.md` §4.3.2).
///
/// `all` mirrors `generateList`: when set, every non-empty repetition is
/// returned instead of only the first.
pub fn resolve_nodes(spec: &Spec, scope: &Scope, all: bool) -> Vec<Node> {
    for alternative in &spec.alternatives {
        let nodes = resolve_path_nodes(alternative, scope, all);
        if !nodes.is_empty() {
            return nodes;
        }
    }
    Vec::new()
}

fn resolve_path_nodes(path: &SpecPath, scope: &Scope, all: bool) -> Vec<Node> {
    match &path.root {
        Root::Segment(name) => resolve_segment_path_nodes(name, path, scope, all),
        Root::Field => match resolve_field_path(path, scope).into_node() {
            Some(node) if node.has_content() => vec![node],
            _ => Vec::new(),
        },
    }
}

fn resolve_segment_path_nodes(segment_name: &str, path: &SpecPath, scope: &Scope, all: bool) -> Vec<Node> {
    let segment = match scope.segment(segment_name) {
        Some(node) => node,
        None => return Vec::new(),
    };

    let field_index = match path.field {
        Some(index) => index,
        None => return if segment.has_content() { vec![segment.clone()] } else { Vec::new() },
    };

    let fields = match segment {
        Node::Composite(fields) => fields,
        _ => return Vec::new(),
    };
    let field = match fields.get(field_index.saturating_sub(1)) {
        Some(node) => node,
        None => return Vec::new(),
    };
    let repeats = match field {
        Node::Repetition(repeats) => repeats,
        _ => return Vec::new(),
    };

    if let Some(rep) = path.rep {
        repeats
            .get(rep)
            .and_then(|repeat| extract_node_from_repeat(repeat, path))
            .filter(Node::has_content)
            .into_iter()
            .collect()
    } else if all {
        repeats
            .iter()
            .filter_map(|repeat| extract_node_from_repeat(repeat, path))
            .filter(Node::has_content)
            .collect()
    } else {
        repeats
            .iter()
            .filter_map(|repeat| extract_node_from_repeat(repeat, path))
            .find(Node::has_content)
            .into_iter()
            .collect()
    }
}

fn extract_node_from_repeat(repeat: &Node, path: &SpecPath) -> Option<Node> {
    let components = match repeat {
        Node::Composite(components) => components,
        _ => return None,
    };

    let component = match path.component {
        None => return Some(repeat.clone()),
        Some(index) => components.get(index.saturating_sub(1))?,
    };

    match path.subcomponent {
        None => Some(component.clone()),
        Some(index) => match component {
            Node::Composite(subs) => subs.get(index.saturating_sub(1)).cloned(),
            Node::Primitive(_) if index == 1 => Some(component.clone()),
            _ => None,
        },
    }
}

fn node_to_value(node: &Node) -> Value {
    match node {
        Node::Primitive(s) => Value::Primitive(s.clone()),
        other => Value::Tree(other.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::adapt;
    use crate::spec::Spec;

    fn scope_for(source: &str, primary: &str) -> Scope {
        let tree = adapt(source).unwrap();
        let occurrence = tree.first_occurrence(primary).unwrap().clone();
        Scope::for_resource_entry(&tree, primary, occurrence, &[])
    }

    #[test]
    fn resolves_simple_field() {
        let scope = scope_for("PID|1||123456^^^MRN||DOE^JOHN^A||19800202|M\r", "PID");
        let spec = Spec::parse("PID.8").unwrap();
        assert_eq!(resolve(&spec, &scope, false), Value::Primitive("M".to_string()));
    }

    #[test]
    fn resolves_component() {
        let scope = scope_for("PID|1||123456^^^MRN||DOE^JOHN^A||19800202|M\r", "PID");
        let spec = Spec::parse("PID.5.1").unwrap();
        assert_eq!(resolve(&spec, &scope, false), Value::Primitive("DOE".to_string()));
    }

    #[test]
    fn missing_field_is_empty_not_error() {
        let scope = scope_for("PID|1\r", "PID");
        let spec = Spec::parse("PID.99").unwrap();
        assert_eq!(resolve(&spec, &scope, false), Value::Empty);
    }

    #[test]
    fn alternation_falls_through_to_non_empty() {
        let scope = scope_for("PID|1||||DOE^JOHN\r", "PID");
        let spec = Spec::parse("PID.4 | PID.5.1").unwrap();
        assert_eq!(resolve(&spec, &scope, false), Value::Primitive("DOE".to_string()));
    }

    #[test]
    fn generate_list_collects_all_repeats() {
        let scope = scope_for("AL1|1|DA~FO~EN\r", "AL1");
        let spec = Spec::parse("AL1.2").unwrap();
        assert_eq!(
            resolve(&spec, &scope, true),
            Value::List(vec!["DA".to_string(), "FO".to_string(), "EN".to_string()])
        );
    }

    #[test]
    fn resolve_nodes_preserves_composite_structure_per_repetition() {
        let scope = scope_for("PID|1||123456^^^MRN~789^^^SSN\r", "PID");
        let spec = Spec::parse("PID.3").unwrap();
        let nodes = resolve_nodes(&spec, &scope, true);
        assert_eq!(nodes.len(), 2);
        assert!(matches!(nodes[0], Node::Composite(_)));
    }

    #[test]
    fn resolve_nodes_without_all_takes_first_non_empty() {
        let scope = scope_for("PID|1||123456^^^MRN~789^^^SSN\r", "PID");
        let spec = Spec::parse("PID.3").unwrap();
        let nodes = resolve_nodes(&spec, &scope, false);
        assert_eq!(nodes.len(), 1);
    }
}
