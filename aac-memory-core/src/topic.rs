//! Runtime representation of `TopicTree` / `TopicNode` values.
//!
//! Topics are free-form hierarchical notes. Rather than a bespoke Rust type,
//! a `TopicNode` is a JSON object `{ "description": string|null,
//! "subtopics": { <key>: TopicNode, ... } }`, consistent with the rest of
//! the tree's "JSON at the boundary" design (see DESIGN.md, "dynamic shapes
//! → tagged unions"). This module is the single place that knows that
//! shape.

use serde_json::{Map, Value};

/// A freshly created node: no description, empty subtopics (invariant #6).
pub fn empty_node() -> Value {
    Value::Object(Map::from_iter([
        ("description".to_string(), Value::Null),
        ("subtopics".to_string(), Value::Object(Map::new())),
    ]))
}

/// A node with a string description and empty subtopics.
pub fn leaf(description: impl Into<String>) -> Value {
    Value::Object(Map::from_iter([
        ("description".to_string(), Value::String(description.into())),
        ("subtopics".to_string(), Value::Object(Map::new())),
    ]))
}

/// True iff `value` has the shape of a valid `TopicNode` (invariant #6:
/// `subtopics` present and itself an object; `description` absent, null, or
/// a string).
pub fn is_valid_node_shape(value: &Value) -> bool {
    let Some(obj) = value.as_object() else {
        return false;
    };
    let subtopics_ok = matches!(obj.get("subtopics"), Some(Value::Object(_)));
    let description_ok = matches!(
        obj.get("description"),
        None | Some(Value::Null) | Some(Value::String(_))
    );
    subtopics_ok && description_ok && obj.len() <= 2
}

pub fn subtopics(value: &Value) -> Option<&Map<String, Value>> {
    value.get("subtopics").and_then(Value::as_object)
}

pub fn subtopics_mut(value: &mut Value) -> Option<&mut Map<String, Value>> {
    value.get_mut("subtopics").and_then(Value::as_object_mut)
}

pub fn description(value: &Value) -> Option<&str> {
    match value.get("description") {
        Some(Value::String(s)) => Some(s.as_str()),
        _ => None,
    }
}

pub fn set_description(value: &mut Value, description: Option<String>) {
    if let Some(obj) = value.as_object_mut() {
        obj.insert(
            "description".to_string(),
            description.map(Value::String).unwrap_or(Value::Null),
        );
    }
}

/// Build a `TopicNode` literal from an op's `value` field, per §4.G `add` /
/// `set`: a bare string becomes the description of a node with empty
/// subtopics; an object literal is normalized to the full shape (missing
/// `subtopics` defaults to empty, per invariant #6).
pub fn from_op_value(value: &Value) -> Option<Value> {
    match value {
        Value::String(s) => Some(leaf(s.clone())),
        Value::Object(obj) => {
            let description = match obj.get("description") {
                None | Some(Value::Null) => Value::Null,
                Some(Value::String(s)) => Value::String(s.clone()),
                _ => return None,
            };
            let subtopics = match obj.get("subtopics") {
                None => Value::Object(Map::new()),
                Some(Value::Object(m)) => Value::Object(m.clone()),
                _ => return None,
            };
            if obj.keys().any(|k| k != "description" && k != "subtopics") {
                return None;
            }
            Some(Value::Object(Map::from_iter([
                ("description".to_string(), description),
                ("subtopics".to_string(), subtopics),
            ])))
        }
        _ => None,
    }
}

/// Depth of the deepest subtopic below `node`, where `node` itself is depth
/// 0. An empty-subtopics node has depth 0.
pub fn max_depth(node: &Value) -> usize {
    match subtopics(node) {
        None => 0,
        Some(children) if children.is_empty() => 0,
        Some(children) => {
            1 + children
                .values()
                .map(max_depth)
                .max()
                .unwrap_or(0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_node_shape_is_valid() {
        assert!(is_valid_node_shape(&empty_node()));
    }

    #[test]
    fn rejects_missing_subtopics() {
        assert!(!is_valid_node_shape(&json!({"description": "x"})));
    }

    #[test]
    fn from_op_value_accepts_bare_string() {
        let v = from_op_value(&json!("hello")).unwrap();
        assert_eq!(description(&v), Some("hello"));
        assert!(subtopics(&v).unwrap().is_empty());
    }

    #[test]
    fn from_op_value_rejects_extra_keys() {
        assert!(from_op_value(&json!({"description": "x", "bogus": 1})).is_none());
    }

    #[test]
    fn depth_counts_levels_below_node() {
        let leaf_node = leaf("x");
        assert_eq!(max_depth(&leaf_node), 0);

        let mut parent = empty_node();
        subtopics_mut(&mut parent)
            .unwrap()
            .insert("child".to_string(), leaf("c"));
        assert_eq!(max_depth(&parent), 1);
    }
}
