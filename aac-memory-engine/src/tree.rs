//! Tree store (§4.E) — primitive, schema-agnostic operations on the value
//! tree. No structural auto-creation happens here; deciding when a parent
//! may be auto-seeded is the executor's job (§4.G).

use aac_memory_core::path::as_array_index;
use aac_memory_core::{BatchError, MemoryResult, Path, PathError, Tree};
use serde_json::Value;

/// Read the value at `path`. Returns `None` for root (root has no single
/// `Value` — it's the field map itself) or for any unreachable path.
pub fn get<'t>(tree: &'t Tree, path: &Path) -> Option<&'t Value> {
    let tokens = path.tokens();
    let (head, rest) = tokens.split_first()?;
    let top = tree.get(head.as_str())?;
    navigate(top, rest)
}

fn navigate<'t>(value: &'t Value, tokens: &[String]) -> Option<&'t Value> {
    let mut cur = value;
    for token in tokens {
        cur = match cur {
            Value::Object(map) => map.get(token)?,
            Value::Array(arr) => arr.get(as_array_index(token)?)?,
            _ => return None,
        };
    }
    Some(cur)
}

fn navigate_mut<'t>(value: &'t mut Value, tokens: &[String]) -> Option<&'t mut Value> {
    let mut cur = value;
    for token in tokens {
        cur = match cur {
            Value::Object(map) => map.get_mut(token)?,
            Value::Array(arr) => arr.get_mut(as_array_index(token)?)?,
            _ => return None,
        };
    }
    Some(cur)
}

/// Write `value` at `path`. Fails if the immediate parent container does
/// not exist or is not an object/array/map-shaped value. For an array
/// parent, an index equal to the current length appends; a index beyond
/// that is out of bounds.
pub fn set(tree: &mut Tree, path: &Path, value: Value) -> MemoryResult<()> {
    let tokens = path.tokens();
    let Some((last, parent_tokens)) = tokens.split_last() else {
        return Err(PathError::NotFound(Path::root()).into());
    };

    if parent_tokens.is_empty() {
        tree.insert(last.clone(), value);
        return Ok(());
    }

    let (top, rest) = parent_tokens.split_first().expect("checked non-empty above");
    let top_value = tree
        .get_mut(top.as_str())
        .ok_or_else(|| PathError::NotFound(Path::from_tokens(parent_tokens.to_vec())))?;
    let parent = if rest.is_empty() {
        top_value
    } else {
        navigate_mut(top_value, rest)
            .ok_or_else(|| PathError::NotFound(Path::from_tokens(parent_tokens.to_vec())))?
    };

    write_into_parent(parent, last, value)
}

fn write_into_parent(parent: &mut Value, key_or_index: &str, value: Value) -> MemoryResult<()> {
    match parent {
        Value::Object(map) => {
            map.insert(key_or_index.to_string(), value);
            Ok(())
        }
        Value::Array(arr) => {
            let idx = as_array_index(key_or_index)
                .ok_or_else(|| PathError::NonIntegerIndex(key_or_index.to_string()))?;
            if idx < arr.len() {
                arr[idx] = value;
                Ok(())
            } else if idx == arr.len() {
                arr.push(value);
                Ok(())
            } else {
                Err(BatchError::IndexOutOfBounds {
                    index: idx,
                    len: arr.len(),
                }
                .into())
            }
        }
        _ => Err(PathError::TraverseIntoPrimitive(Path::root()).into()),
    }
}

/// Insert `value` into the array at `path` at position `index`, shifting
/// later elements right. `index == length` appends. Fails if `path` is not
/// an array or `index` is out of `[0, length]`.
pub fn insert_at(tree: &mut Tree, path: &Path, index: usize, value: Value) -> MemoryResult<()> {
    let existing = get(tree, path).ok_or_else(|| PathError::NotFound(path.clone()))?;
    if !existing.is_array() {
        return Err(PathError::TraverseIntoPrimitive(path.clone()).into());
    }

    let tokens = path.tokens();
    let (top, rest) = tokens.split_first().expect("checked non-root above");
    let top_value = tree
        .get_mut(top.as_str())
        .ok_or_else(|| PathError::NotFound(path.clone()))?;
    let target = if rest.is_empty() {
        top_value
    } else {
        navigate_mut(top_value, rest).ok_or_else(|| PathError::NotFound(path.clone()))?
    };
    let Value::Array(arr) = target else {
        return Err(PathError::TraverseIntoPrimitive(path.clone()).into());
    };
    if index > arr.len() {
        return Err(BatchError::IndexOutOfBounds {
            index,
            len: arr.len(),
        }
        .into());
    }
    arr.insert(index, value);
    Ok(())
}

/// Remove the value at `path`. Array indices shift left (splice); object
/// and map keys are removed outright.
pub fn delete(tree: &mut Tree, path: &Path) -> MemoryResult<()> {
    let tokens = path.tokens();
    let Some((last, parent_tokens)) = tokens.split_last() else {
        return Err(PathError::NotFound(Path::root()).into());
    };

    if parent_tokens.is_empty() {
        if tree.remove(last.as_str()).is_some() {
            return Ok(());
        }
        return Err(PathError::NotFound(path.clone()).into());
    }

    let (top, rest) = parent_tokens.split_first().expect("checked non-empty above");
    let top_value = tree
        .get_mut(top.as_str())
        .ok_or_else(|| PathError::NotFound(path.clone()))?;
    let parent = if rest.is_empty() {
        top_value
    } else {
        navigate_mut(top_value, rest).ok_or_else(|| PathError::NotFound(path.clone()))?
    };

    match parent {
        Value::Object(map) => {
            if map.remove(last.as_str()).is_none() {
                return Err(PathError::NotFound(path.clone()).into());
            }
            Ok(())
        }
        Value::Array(arr) => {
            let idx =
                as_array_index(last).ok_or_else(|| PathError::NonIntegerIndex(last.clone()))?;
            if idx >= arr.len() {
                return Err(BatchError::IndexOutOfBounds {
                    index: idx,
                    len: arr.len(),
                }
                .into());
            }
            arr.remove(idx);
            Ok(())
        }
        _ => Err(PathError::TraverseIntoPrimitive(path.clone()).into()),
    }
}

/// Rename a key within the object/map at `container_path` (root means the
/// top-level field map itself). Fails on a missing old key or a collision
/// with an existing new key.
pub fn rename_key(
    tree: &mut Tree,
    container_path: &Path,
    old_key: &str,
    new_key: &str,
) -> MemoryResult<()> {
    if container_path.is_root() {
        return rename_in_map(tree, old_key, new_key, container_path);
    }

    let tokens = container_path.tokens();
    let (top, rest) = tokens.split_first().expect("checked non-root above");
    let top_value = tree
        .get_mut(top.as_str())
        .ok_or_else(|| PathError::NotFound(container_path.clone()))?;
    let container = if rest.is_empty() {
        top_value
    } else {
        navigate_mut(top_value, rest).ok_or_else(|| PathError::NotFound(container_path.clone()))?
    };

    let Value::Object(map) = container else {
        return Err(PathError::TraverseIntoPrimitive(container_path.clone()).into());
    };
    if !map.contains_key(old_key) {
        return Err(PathError::NotFound(container_path.child(old_key)).into());
    }
    if map.contains_key(new_key) {
        return Err(PathError::DisallowedProperty {
            field: container_path.to_wire(),
            property: new_key.to_string(),
        }
        .into());
    }
    let value = map.remove(old_key).unwrap();
    map.insert(new_key.to_string(), value);
    Ok(())
}

fn rename_in_map(
    tree: &mut Tree,
    old_key: &str,
    new_key: &str,
    container_path: &Path,
) -> MemoryResult<()> {
    if !tree.contains_key(old_key) {
        return Err(PathError::NotFound(container_path.child(old_key)).into());
    }
    if tree.contains_key(new_key) {
        return Err(PathError::DisallowedProperty {
            field: "/".to_string(),
            property: new_key.to_string(),
        }
        .into());
    }
    let value = tree.remove(old_key).unwrap();
    tree.insert(new_key.to_string(), value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_tree() -> Tree {
        let mut tree = Tree::new();
        tree.insert("profile".to_string(), json!({"name": "Ana"}));
        tree.insert("tags".to_string(), json!(["a", "b"]));
        tree
    }

    #[test]
    fn get_navigates_into_object_and_array() {
        let tree = sample_tree();
        assert_eq!(get(&tree, &Path::parse("/profile/name")), Some(&json!("Ana")));
        assert_eq!(get(&tree, &Path::parse("/tags/1")), Some(&json!("b")));
        assert_eq!(get(&tree, &Path::parse("/tags/5")), None);
    }

    #[test]
    fn set_writes_into_existing_object() {
        let mut tree = sample_tree();
        set(&mut tree, &Path::parse("/profile/age"), json!(30)).unwrap();
        assert_eq!(get(&tree, &Path::parse("/profile/age")), Some(&json!(30)));
    }

    #[test]
    fn set_fails_when_parent_missing() {
        let mut tree = sample_tree();
        let err = set(&mut tree, &Path::parse("/missing/x"), json!(1));
        assert!(err.is_err());
    }

    #[test]
    fn set_array_append_at_length() {
        let mut tree = sample_tree();
        set(&mut tree, &Path::parse("/tags/2"), json!("c")).unwrap();
        assert_eq!(get(&tree, &Path::parse("/tags/2")), Some(&json!("c")));
    }

    #[test]
    fn delete_splices_array() {
        let mut tree = sample_tree();
        delete(&mut tree, &Path::parse("/tags/0")).unwrap();
        assert_eq!(get(&tree, &Path::parse("/tags/0")), Some(&json!("b")));
    }

    #[test]
    fn rename_key_moves_value_and_rejects_collision() {
        let mut tree = Tree::new();
        tree.insert(
            "contacts".to_string(),
            json!({"john": {"Name": "John"}, "jane": {"Name": "Jane"}}),
        );
        rename_key(&mut tree, &Path::parse("/contacts"), "john", "John").unwrap();
        assert!(get(&tree, &Path::parse("/contacts/John")).is_some());
        assert!(get(&tree, &Path::parse("/contacts/john")).is_none());

        let err = rename_key(&mut tree, &Path::parse("/contacts"), "jane", "John");
        assert!(err.is_err());
    }

    proptest::proptest! {
        #[test]
        fn rename_there_and_back_restores_the_tree(
            key in "[a-z][a-z0-9_]{0,8}",
            other in "[a-z][a-z0-9_]{0,8}",
        ) {
            proptest::prop_assume!(key != other);
            let mut tree = Tree::new();
            tree.insert("contacts".to_string(), json!({key.clone(): {"Name": "Original"}}));
            let before = tree.clone();

            rename_key(&mut tree, &Path::parse("/contacts"), &key, &other).unwrap();
            rename_key(&mut tree, &Path::parse("/contacts"), &other, &key).unwrap();

            proptest::prop_assert_eq!(tree, before);
        }
    }
}
