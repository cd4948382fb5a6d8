//! Validator — check a candidate value against a schema step (§4.D).
//!
//! Validation is shallow by default: a whole-value assignment validates the
//! node itself but does not recursively re-validate every descendant.
//! Recursion happens implicitly because later ops that touch descendants
//! resolve and validate at that finer granularity.

use aac_memory_core::schema::{AdditionalProperties, Field, StringFormat};
use aac_memory_core::{MemoryResult, ShapeError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());
static UUID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .unwrap()
});
static DATE_TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(\.\d+)?(Z|[+-]\d{2}:\d{2})?$").unwrap()
});

/// Validate `candidate` against `field`, per §4.D. A `None` field (only
/// reachable for an `additionalProperties: true` object slot) is treated as
/// untyped and always passes (§9 Open Questions: loose by design).
pub fn validate(field: Option<&Field>, candidate: &Value) -> MemoryResult<()> {
    let Some(field) = field else {
        return Ok(());
    };
    check_enum_and_const(field, candidate)?;

    match field {
        Field::String { constraints, .. } => validate_string(constraints, candidate),
        Field::Number { constraints, .. } => validate_numeric(constraints, candidate, false),
        Field::Integer { constraints, .. } => validate_numeric(constraints, candidate, true),
        Field::Boolean { .. } => expect_type(candidate.is_boolean(), "boolean", candidate),
        Field::Null { .. } => expect_type(candidate.is_null(), "null", candidate),
        Field::Object { object, .. } => {
            let obj = candidate
                .as_object()
                .filter(|_| !candidate.is_array())
                .ok_or_else(|| type_mismatch("object", candidate))?;

            let missing: Vec<String> = object
                .required
                .iter()
                .filter(|name| !obj.contains_key(name.as_str()))
                .cloned()
                .collect();
            if !missing.is_empty() {
                return Err(ShapeError::MissingRequired(missing).into());
            }

            if matches!(object.additional_properties, AdditionalProperties::Disallowed) {
                for key in obj.keys() {
                    if object.property(key).is_none() {
                        return Err(ShapeError::ClosedObjectExtraKey(key.clone()).into());
                    }
                }
            }
            Ok(())
        }
        Field::Array { array, .. } => {
            let items = candidate
                .as_array()
                .ok_or_else(|| type_mismatch("array", candidate))?;
            let len = items.len();
            if array.min_items.is_some_and(|min| len < min)
                || array.max_items.is_some_and(|max| len > max)
            {
                return Err(ShapeError::ArrayLength {
                    len,
                    min: array.min_items,
                    max: array.max_items,
                }
                .into());
            }
            if array.unique_items && has_duplicate(items) {
                return Err(ShapeError::DuplicateItem.into());
            }
            Ok(())
        }
        Field::Map { map, .. } => {
            let obj = candidate
                .as_object()
                .ok_or_else(|| type_mismatch("map", candidate))?;
            let len = obj.len();
            if map.min_properties.is_some_and(|min| len < min)
                || map.max_properties.is_some_and(|max| len > max)
            {
                return Err(ShapeError::MapSize {
                    len,
                    min: map.min_properties,
                    max: map.max_properties,
                }
                .into());
            }
            if let Some(pattern) = &map.key_pattern {
                let re = Regex::new(pattern)
                    .map_err(|_| ShapeError::KeyPatternMismatch(pattern.clone()))?;
                for key in obj.keys() {
                    if !re.is_match(key) {
                        return Err(ShapeError::KeyPatternMismatch(key.clone()).into());
                    }
                }
            }
            Ok(())
        }
        Field::Topic { .. } => {
            // Topic node literals are validated by `aac_memory_core::topic`
            // (shape + depth/breadth), not here; a bare `Field::Topic` step
            // only arises for the whole-tree value, which has no standalone
            // wire-level `set`.
            Ok(())
        }
    }
}

/// Validate a single map key against its field's `keyPattern` (used by
/// `add`/`rename` before the key is known to exist in any value).
pub fn validate_key_pattern(key_pattern: Option<&str>, key: &str) -> MemoryResult<()> {
    let Some(pattern) = key_pattern else {
        return Ok(());
    };
    let re = Regex::new(pattern).map_err(|_| ShapeError::KeyPatternMismatch(pattern.to_string()))?;
    if re.is_match(key) {
        Ok(())
    } else {
        Err(ShapeError::KeyPatternMismatch(key.to_string()).into())
    }
}

fn check_enum_and_const(field: &Field, candidate: &Value) -> MemoryResult<()> {
    let meta = field.meta();
    if let Some(values) = &meta.enum_values {
        if !values.iter().any(|v| v == candidate) {
            return Err(ShapeError::EnumViolation.into());
        }
    }
    if let Some(expected) = &meta.const_value {
        if expected != candidate {
            return Err(ShapeError::ConstViolation.into());
        }
    }
    Ok(())
}

fn validate_string(constraints: &aac_memory_core::schema::StringField, candidate: &Value) -> MemoryResult<()> {
    let s = candidate
        .as_str()
        .ok_or_else(|| type_mismatch("string", candidate))?;
    let len = s.chars().count();
    if constraints.min_length.is_some_and(|min| len < min)
        || constraints.max_length.is_some_and(|max| len > max)
    {
        return Err(ShapeError::StringLength {
            len,
            min: constraints.min_length,
            max: constraints.max_length,
        }
        .into());
    }
    if let Some(pattern) = &constraints.pattern {
        let re = Regex::new(pattern).map_err(|_| ShapeError::PatternMismatch(pattern.clone()))?;
        if !re.is_match(s) {
            return Err(ShapeError::PatternMismatch(pattern.clone()).into());
        }
    }
    if let Some(format) = constraints.format {
        if !matches_format(format, s) {
            return Err(ShapeError::FormatMismatch(format_name(format)).into());
        }
    }
    Ok(())
}

fn matches_format(format: StringFormat, s: &str) -> bool {
    match format {
        StringFormat::Email => EMAIL_RE.is_match(s),
        StringFormat::Uri => {
            s.contains(':') && s.split(':').next().is_some_and(|scheme| !scheme.is_empty())
        }
        StringFormat::DateTime => DATE_TIME_RE.is_match(s),
        StringFormat::Uuid => UUID_RE.is_match(s),
    }
}

fn format_name(format: StringFormat) -> String {
    match format {
        StringFormat::Email => "email",
        StringFormat::Uri => "uri",
        StringFormat::DateTime => "date-time",
        StringFormat::Uuid => "uuid",
    }
    .to_string()
}

fn validate_numeric(
    constraints: &aac_memory_core::schema::NumericField,
    candidate: &Value,
    require_integer: bool,
) -> MemoryResult<()> {
    let n = candidate
        .as_f64()
        .ok_or_else(|| type_mismatch(if require_integer { "integer" } else { "number" }, candidate))?;
    if require_integer && n.fract() != 0.0 {
        return Err(type_mismatch("integer", candidate));
    }
    if constraints.minimum.is_some_and(|min| n < min)
        || constraints.maximum.is_some_and(|max| n > max)
        || constraints.exclusive_minimum.is_some_and(|min| n <= min)
        || constraints.exclusive_maximum.is_some_and(|max| n >= max)
    {
        return Err(ShapeError::NumericBounds { value: n }.into());
    }
    if let Some(multiple_of) = constraints.multiple_of {
        if multiple_of != 0.0 && (n / multiple_of).fract().abs() > f64::EPSILON {
            return Err(ShapeError::NotMultipleOf {
                value: n,
                multiple_of,
            }
            .into());
        }
    }
    Ok(())
}

fn has_duplicate(items: &[Value]) -> bool {
    for i in 0..items.len() {
        for j in (i + 1)..items.len() {
            if items[i] == items[j] {
                return true;
            }
        }
    }
    false
}

fn expect_type(ok: bool, expected: &str, candidate: &Value) -> MemoryResult<()> {
    if ok {
        Ok(())
    } else {
        Err(type_mismatch(expected, candidate))
    }
}

fn type_mismatch(expected: &str, candidate: &Value) -> aac_memory_core::MemoryError {
    ShapeError::TypeMismatch {
        expected: expected.to_string(),
        got: json_type_name(candidate).to_string(),
    }
    .into()
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aac_memory_core::schema::build::*;
    use serde_json::json;

    #[test]
    fn object_requires_required_props() {
        let field = object(
            "profile",
            vec![("name".to_string(), string("name"))],
            vec!["name".to_string()],
        );
        assert!(validate(Some(&field), &json!({})).is_err());
        assert!(validate(Some(&field), &json!({"name": "Ana"})).is_ok());
    }

    #[test]
    fn array_unique_items() {
        let mut field = array("tags", string("item"));
        if let Field::Array { array, .. } = &mut field {
            array.unique_items = true;
        }
        assert!(validate(Some(&field), &json!(["a", "a"])).is_err());
        assert!(validate(Some(&field), &json!(["a", "b"])).is_ok());
    }

    #[test]
    fn map_key_pattern() {
        let mut field = map("contacts", string("value"));
        if let Field::Map { map, .. } = &mut field {
            map.key_pattern = Some("^[A-Z][a-zA-Z]+$".to_string());
        }
        assert!(validate_key_pattern(Some("^[A-Z][a-zA-Z]+$"), "John").is_ok());
        assert!(validate_key_pattern(Some("^[A-Z][a-zA-Z]+$"), "john").is_err());
    }

    #[test]
    fn string_format_email() {
        let field = {
            let mut f = string("email");
            if let Field::String { constraints, .. } = &mut f {
                constraints.format = Some(StringFormat::Email);
            }
            f
        };
        assert!(validate(Some(&field), &json!("a@b.com")).is_ok());
        assert!(validate(Some(&field), &json!("not-an-email")).is_err());
    }

    #[test]
    fn closed_object_rejects_extra_key() {
        let field = object("profile", vec![("name".to_string(), string("name"))], vec![]);
        assert!(validate(Some(&field), &json!({"name": "Ana", "extra": 1})).is_err());
    }
}
