//! Small schemas exercised across crates' test suites (§8 scenarios).

use aac_memory_core::schema::build::*;
use aac_memory_core::schema::Field;
use aac_memory_core::Schema;

/// An object with one required and one optional property, used for the
/// auto-seed and visibility-gate scenarios.
pub fn profile_schema() -> Schema {
    Schema::new(vec![object(
        "profile",
        vec![
            ("name".to_string(), string("name")),
            ("age".to_string(), integer("age")),
        ],
        vec!["name".to_string()],
    )])
}

/// A unique-items array of strings, plus a pattern-keyed map of contact
/// objects and a topic tree — enough surface for view/hide, pagination,
/// and topic rename scenarios in one schema.
pub fn mixed_schema() -> Schema {
    let mut tags = array("tags", string("item"));
    if let Field::Array { array, .. } = &mut tags {
        array.unique_items = true;
    }

    let mut contacts = map(
        "contacts",
        object(
            "contact",
            vec![("label".to_string(), string("label"))],
            vec![],
        ),
    );
    if let Field::Map { map, .. } = &mut contacts {
        map.key_pattern = Some(r"^[a-z][a-z0-9_]*$".to_string());
    }

    Schema::new(vec![tags, contacts, topic("research", 4, 20)])
}

/// A plain array field on its own, for pagination-focused tests.
pub fn paged_array_schema(len_hint: &str) -> Schema {
    Schema::new(vec![array(len_hint, string("item"))])
}
