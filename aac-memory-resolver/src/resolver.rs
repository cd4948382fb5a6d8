//! Resolver — walk a path against the schema (§4.C).
//!
//! The resolver does not touch the value tree's *contents* except where the
//! schema itself is value-dependent (there is none of that in this closed
//! schema model), but it does need the current tree to know, e.g., whether
//! an object property currently exists so later stages (the executor) can
//! decide whether to auto-seed it. What it returns is a `SchemaStep` chain
//! describing what the path denotes, terminating at the step the path
//! addresses.

use aac_memory_core::path::{as_array_index, is_integer_token};
use aac_memory_core::schema::{AdditionalProperties, Field};
use aac_memory_core::{MemoryError, MemoryResult, Path, PathError, Schema, Tree};
use serde_json::Value;

/// What a resolved path denotes, and the schema `Field` governing its
/// value (when one exists — `objectProp` under `additionalProperties: true`
/// has no declared Field).
#[derive(Debug, Clone)]
pub enum SchemaStep<'a> {
    /// A top-level field.
    TopLevelField { field: &'a Field },
    /// A declared or additional property of an object.
    ObjectProp {
        parent: Path,
        property: String,
        field: Option<&'a Field>,
    },
    /// An element of an array, addressed by index.
    ArrayItem {
        parent: Path,
        index: usize,
        field: &'a Field,
    },
    /// A value in a map, addressed by key.
    MapValue {
        parent: Path,
        key: String,
        field: &'a Field,
    },
    /// A node within a `TopicTree`, addressed by its node path (the tokens
    /// after the topic field's id, excluding any trailing `description` /
    /// `subtopics` literal).
    Topic {
        topic_field: &'a Field,
        node_path: Vec<String>,
    },
    /// The `description` leaf of a topic node.
    TopicDescription {
        topic_field: &'a Field,
        node_path: Vec<String>,
    },
    /// The `subtopics` map of a topic node (used internally by `add` /
    /// wildcard expansion; not a standalone addressable value in the wire
    /// grammar, but resolvable for traversal purposes).
    TopicSubtopics {
        topic_field: &'a Field,
        node_path: Vec<String>,
    },
}

impl<'a> SchemaStep<'a> {
    /// The `Field` this step is governed by, when the schema declares one.
    pub fn field(&self) -> Option<&'a Field> {
        match self {
            SchemaStep::TopLevelField { field } => Some(field),
            SchemaStep::ObjectProp { field, .. } => *field,
            SchemaStep::ArrayItem { field, .. } => Some(field),
            SchemaStep::MapValue { field, .. } => Some(field),
            SchemaStep::Topic { topic_field, .. } => Some(topic_field),
            SchemaStep::TopicDescription { .. } => None,
            SchemaStep::TopicSubtopics { topic_field, .. } => Some(topic_field),
        }
    }

    pub fn is_container_step(&self) -> bool {
        match self {
            SchemaStep::TopLevelField { field } => field.is_container(),
            SchemaStep::ObjectProp { field, .. } => field.map(Field::is_container).unwrap_or(true),
            SchemaStep::ArrayItem { field, .. } => field.is_container(),
            SchemaStep::MapValue { field, .. } => field.is_container(),
            SchemaStep::Topic { .. } | SchemaStep::TopicSubtopics { .. } => true,
            SchemaStep::TopicDescription { .. } => false,
        }
    }
}

/// Resolve `path` against `schema`, consulting `tree` only to decide
/// whether intermediate object properties currently exist (needed to
/// classify `additionalProperties` traversal and topic node-path parsing).
pub fn resolve<'a>(schema: &'a Schema, tree: &Tree, path: &Path) -> MemoryResult<SchemaStep<'a>> {
    let tokens = path.tokens();
    if tokens.is_empty() {
        return Err(PathError::NotFound(Path::root()).into());
    }

    let top_id = &tokens[0];
    let field = schema
        .field(top_id)
        .ok_or_else(|| PathError::UnknownField(top_id.clone()))?;

    if tokens.len() == 1 {
        return Ok(SchemaStep::TopLevelField { field });
    }

    let value = tree.get(top_id.as_str());
    walk(field, &tokens[..1], &tokens[1..], value)
}

/// Recursively consume `rest` against `field`'s shape. `consumed` is the
/// token prefix already matched (including the top-level id), used to build
/// the `parent` paths carried in the returned step.
fn walk<'a>(
    field: &'a Field,
    consumed: &[String],
    rest: &[String],
    value: Option<&Value>,
) -> MemoryResult<SchemaStep<'a>> {
    match field {
        Field::Object { object, .. } => {
            let property = rest[0].clone();
            let declared = object.property(&property);
            if declared.is_none() && !object.additional_properties.permits_extra() {
                return Err(PathError::DisallowedProperty {
                    field: field.id().to_string(),
                    property,
                }
                .into());
            }
            let parent = Path::from_tokens(consumed.to_vec());
            if rest.len() == 1 {
                let resolved_field = declared.or_else(|| match &object.additional_properties {
                    AdditionalProperties::Schema(f) => Some(f.as_ref()),
                    _ => None,
                });
                return Ok(SchemaStep::ObjectProp {
                    parent,
                    property,
                    field: resolved_field,
                });
            }
            let Some(child_field) = declared else {
                // additionalProperties with no Field: cannot traverse further.
                return Err(PathError::TraverseIntoPrimitive(parent.child(property)).into());
            };
            let mut next_consumed = consumed.to_vec();
            next_consumed.push(property);
            let next_value = value
                .and_then(Value::as_object)
                .and_then(|o| o.get(&next_consumed[next_consumed.len() - 1]));
            walk(child_field, &next_consumed, &rest[1..], next_value)
        }
        Field::Array { array, .. } => {
            let token = &rest[0];
            if !is_integer_token(token) {
                return Err(PathError::NonIntegerIndex(token.clone()).into());
            }
            let index = as_array_index(token)
                .ok_or_else(|| PathError::NonIntegerIndex(token.clone()))?;
            let parent = Path::from_tokens(consumed.to_vec());
            if rest.len() == 1 {
                return Ok(SchemaStep::ArrayItem {
                    parent,
                    index,
                    field: array.items.as_ref(),
                });
            }
            let mut next_consumed = consumed.to_vec();
            next_consumed.push(token.clone());
            let next_value = value
                .and_then(Value::as_array)
                .and_then(|a| a.get(index));
            walk(array.items.as_ref(), &next_consumed, &rest[1..], next_value)
        }
        Field::Map { map, .. } => {
            let key = rest[0].clone();
            let parent = Path::from_tokens(consumed.to_vec());
            if rest.len() == 1 {
                return Ok(SchemaStep::MapValue {
                    parent,
                    key,
                    field: map.values.as_ref(),
                });
            }
            let mut next_consumed = consumed.to_vec();
            next_consumed.push(key.clone());
            let next_value = value.and_then(Value::as_object).and_then(|o| o.get(&key));
            walk(map.values.as_ref(), &next_consumed, &rest[1..], next_value)
        }
        Field::Topic { .. } => resolve_topic(field, rest),
        _ => {
            let parent = Path::from_tokens(consumed.to_vec());
            Err(PathError::TraverseIntoPrimitive(parent).into())
        }
    }
}

/// Consume `nodePath` tokens until the literal `description` or
/// `subtopics` appears (§4.C).
fn resolve_topic<'a>(topic_field: &'a Field, rest: &[String]) -> MemoryResult<SchemaStep<'a>> {
    let mut node_path = Vec::new();
    let mut i = 0;
    while i < rest.len() {
        match rest[i].as_str() {
            "description" => {
                if i != rest.len() - 1 {
                    return Err(PathError::TraverseIntoPrimitive(Path::from_tokens(
                        rest.to_vec(),
                    ))
                    .into());
                }
                return Ok(SchemaStep::TopicDescription {
                    topic_field,
                    node_path,
                });
            }
            "subtopics" => {
                if i != rest.len() - 1 {
                    // `subtopics/<key>/...` continues the node path.
                    node_path.push(rest[i + 1].clone());
                    i += 2;
                    continue;
                }
                return Ok(SchemaStep::TopicSubtopics {
                    topic_field,
                    node_path,
                });
            }
            token => {
                node_path.push(token.to_string());
                i += 1;
            }
        }
    }
    Ok(SchemaStep::Topic {
        topic_field,
        node_path,
    })
}
