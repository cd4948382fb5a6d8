//! Typed field definitions (the schema model).
//!
//! The model is closed: no `$ref`, no `oneOf`/`anyOf`/`allOf`. Field
//! equality is by identity (pointer/variant shape), not structural value —
//! titles and descriptions exist only for rendering.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Attributes common to every field kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldMeta {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    #[serde(rename = "const", skip_serializing_if = "Option::is_none")]
    pub const_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<Value>,
    /// When true, this field (or, for a descendant, its schema node) is
    /// implicitly visible without an explicit `view` so long as its parent
    /// is also visible.
    #[serde(default)]
    pub opened: bool,
}

impl FieldMeta {
    pub fn new(id: impl Into<String>) -> Self {
        FieldMeta {
            id: id.into(),
            title: None,
            description: None,
            default: None,
            enum_values: None,
            const_value: None,
            examples: Vec::new(),
            opened: false,
        }
    }

    pub fn opened(mut self) -> Self {
        self.opened = true;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// The closed set of string formats the validator recognises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StringFormat {
    Email,
    Uri,
    DateTime,
    Uuid,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StringField {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<StringFormat>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NumericField {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<f64>,
}

/// `additionalProperties` on an object field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AdditionalProperties {
    /// `additionalProperties: false` — closed object.
    Disallowed,
    /// `additionalProperties: true` — open, untyped extra keys.
    Allowed,
    /// `additionalProperties: <Field>` — open, typed extra keys.
    Schema(Box<Field>),
}

impl AdditionalProperties {
    pub fn permits_extra(&self) -> bool {
        !matches!(self, AdditionalProperties::Disallowed)
    }
}

impl Default for AdditionalProperties {
    fn default() -> Self {
        AdditionalProperties::Disallowed
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectField {
    /// Ordered property declarations, in declaration order (render order
    /// depends on this).
    pub properties: Vec<(String, Field)>,
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(default)]
    pub additional_properties: AdditionalProperties,
}

impl ObjectField {
    pub fn property(&self, name: &str) -> Option<&Field> {
        self.properties.iter().find(|(n, _)| n == name).map(|(_, f)| f)
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArrayField {
    pub items: Box<Field>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,
    #[serde(default)]
    pub unique_items: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapField {
    pub values: Box<Field>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_properties: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_properties: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicField {
    pub max_depth: usize,
    pub max_breadth_per_node: usize,
}

/// A schema node: one of the nine kinds from `spec.md` §3, tagged by kind
/// with shared `FieldMeta` plus kind-specific constraints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Field {
    String {
        #[serde(flatten)]
        meta: FieldMeta,
        #[serde(flatten)]
        constraints: StringField,
    },
    Number {
        #[serde(flatten)]
        meta: FieldMeta,
        #[serde(flatten)]
        constraints: NumericField,
    },
    Integer {
        #[serde(flatten)]
        meta: FieldMeta,
        #[serde(flatten)]
        constraints: NumericField,
    },
    Boolean {
        #[serde(flatten)]
        meta: FieldMeta,
    },
    Null {
        #[serde(flatten)]
        meta: FieldMeta,
    },
    Object {
        #[serde(flatten)]
        meta: FieldMeta,
        #[serde(flatten)]
        object: ObjectField,
    },
    Array {
        #[serde(flatten)]
        meta: FieldMeta,
        #[serde(flatten)]
        array: ArrayField,
    },
    Map {
        #[serde(flatten)]
        meta: FieldMeta,
        #[serde(flatten)]
        map: MapField,
    },
    Topic {
        #[serde(flatten)]
        meta: FieldMeta,
        #[serde(flatten)]
        topic: TopicField,
    },
}

impl Field {
    pub fn meta(&self) -> &FieldMeta {
        match self {
            Field::String { meta, .. }
            | Field::Number { meta, .. }
            | Field::Integer { meta, .. }
            | Field::Boolean { meta }
            | Field::Null { meta }
            | Field::Object { meta, .. }
            | Field::Array { meta, .. }
            | Field::Map { meta, .. }
            | Field::Topic { meta, .. } => meta,
        }
    }

    pub fn id(&self) -> &str {
        &self.meta().id
    }

    pub fn is_opened(&self) -> bool {
        self.meta().opened
    }

    pub fn is_container(&self) -> bool {
        matches!(
            self,
            Field::Object { .. } | Field::Array { .. } | Field::Map { .. } | Field::Topic { .. }
        )
    }

    pub fn is_primitive(&self) -> bool {
        !self.is_container()
    }

    /// Short kind name, used in rendered headers and error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Field::String { .. } => "string",
            Field::Number { .. } => "number",
            Field::Integer { .. } => "integer",
            Field::Boolean { .. } => "boolean",
            Field::Null { .. } => "null",
            Field::Object { .. } => "object",
            Field::Array { .. } => "array",
            Field::Map { .. } => "map",
            Field::Topic { .. } => "topic",
        }
    }

    pub fn as_object(&self) -> Option<&ObjectField> {
        match self {
            Field::Object { object, .. } => Some(object),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayField> {
        match self {
            Field::Array { array, .. } => Some(array),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&MapField> {
        match self {
            Field::Map { map, .. } => Some(map),
            _ => None,
        }
    }

    pub fn as_topic(&self) -> Option<&TopicField> {
        match self {
            Field::Topic { topic, .. } => Some(topic),
            _ => None,
        }
    }
}

/// Builder-style constructors used by schema authors and tests.
pub mod build {
    use super::*;

    pub fn string(id: impl Into<String>) -> Field {
        Field::String {
            meta: FieldMeta::new(id),
            constraints: StringField::default(),
        }
    }

    pub fn integer(id: impl Into<String>) -> Field {
        Field::Integer {
            meta: FieldMeta::new(id),
            constraints: NumericField::default(),
        }
    }

    pub fn number(id: impl Into<String>) -> Field {
        Field::Number {
            meta: FieldMeta::new(id),
            constraints: NumericField::default(),
        }
    }

    pub fn boolean(id: impl Into<String>) -> Field {
        Field::Boolean {
            meta: FieldMeta::new(id),
        }
    }

    pub fn object(
        id: impl Into<String>,
        properties: Vec<(String, Field)>,
        required: Vec<String>,
    ) -> Field {
        Field::Object {
            meta: FieldMeta::new(id),
            object: ObjectField {
                properties,
                required,
                additional_properties: AdditionalProperties::Disallowed,
            },
        }
    }

    pub fn array(id: impl Into<String>, items: Field) -> Field {
        Field::Array {
            meta: FieldMeta::new(id),
            array: ArrayField {
                items: Box::new(items),
                min_items: None,
                max_items: None,
                unique_items: false,
            },
        }
    }

    pub fn map(id: impl Into<String>, values: Field) -> Field {
        Field::Map {
            meta: FieldMeta::new(id),
            map: MapField {
                values: Box::new(values),
                key_pattern: None,
                min_properties: None,
                max_properties: None,
            },
        }
    }

    pub fn topic(id: impl Into<String>, max_depth: usize, max_breadth_per_node: usize) -> Field {
        Field::Topic {
            meta: FieldMeta::new(id),
            topic: TopicField {
                max_depth,
                max_breadth_per_node,
            },
        }
    }
}
