//! Proptest strategies for the universal invariants (§8.1-6): path tokens,
//! valid/invalid path strings, and small JSON values shaped to fit a given
//! primitive `Field` kind.

use aac_memory_core::schema::Field;
use proptest::prelude::*;
use serde_json::{json, Value};

/// A path token drawn from the identifier-like alphabet real schemas use —
/// deliberately excludes `~` and `/` so it never needs escaping, and the
/// tests that care about escaping build those strings by hand.
pub fn token_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9_]{0,12}"
}

/// A sequence of 1-5 tokens, joined into a wire-format path string.
pub fn path_string_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(token_strategy(), 1..=5).prop_map(|tokens| format!("/{}", tokens.join("/")))
}

/// A value generator matching `field`'s primitive shape, for round-tripping
/// through `validate`/`set` without tripping a type mismatch.
pub fn value_for_field(field: &Field) -> BoxedStrategy<Value> {
    match field {
        Field::String { .. } => "[a-zA-Z0-9 ]{0,24}".prop_map(Value::String).boxed(),
        Field::Integer { .. } => any::<i32>().prop_map(|n| json!(n)).boxed(),
        Field::Number { .. } => any::<i16>().prop_map(|n| json!(n as f64 * 0.5)).boxed(),
        Field::Boolean { .. } => any::<bool>().prop_map(Value::Bool).boxed(),
        Field::Null { .. } => Just(Value::Null).boxed(),
        _ => Just(Value::Null).boxed(),
    }
}
