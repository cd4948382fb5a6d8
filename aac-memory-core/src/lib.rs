//! aac-memory-core — path grammar, schema model, value tree, and error
//! types for the structured memory engine.
//!
//! Pure data and pure functions only; no I/O, no async. Everything else in
//! the workspace (resolver, engine, renderer, DB bridge) builds on top of
//! these types.

pub mod config;
pub mod error;
pub mod path;
pub mod schema;
pub mod topic;

pub use config::EngineConfig;
pub use error::{
    BatchError, DbBindingError, MemoryError, MemoryResult, PathError, ShapeError, TopicError,
};
pub use path::Path;
pub use schema::{
    AdditionalProperties, ArrayField, Field, FieldMeta, MapField, NumericField, ObjectField,
    StringField, StringFormat, TopicField,
};

/// The runtime value tree: a mapping from top-level field id to that
/// field's value. JSON is the boundary representation end-to-end (the LLM
/// sends and receives JSON), so the tree is kept as `serde_json::Value`
/// internally too — every touch site narrows by the resolved schema step
/// before reading or writing (see DESIGN.md, "dynamic shapes → tagged
/// unions").
pub type Tree = serde_json::Map<String, serde_json::Value>;

/// A declared top-level schema: ordered field declarations, in the order
/// fields should render.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    pub fn new(fields: Vec<Field>) -> Self {
        Schema { fields }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, id: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.id() == id)
    }
}

#[cfg(test)]
mod tests {
    use super::schema::build::*;
    use super::*;

    #[test]
    fn schema_looks_up_by_id() {
        let schema = Schema::new(vec![string("name"), integer("age")]);
        assert!(schema.field("name").is_some());
        assert!(schema.field("missing").is_none());
    }
}
