//! Visibility overlay — `MemoryState` (§4.F). Purely presentational: it
//! never removes data from the tree, only controls what the renderer emits
//! and (when the visibility gate is enabled) what mutations are permitted.

use aac_memory_core::{BatchError, MemoryResult, Path, Tree};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::collections::BTreeSet;

/// A pagination window over a container's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub offset: u32,
    pub limit: u32,
}

/// The visibility overlay: which paths the LLM currently sees, and any
/// per-container pagination.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryState {
    pub visible: BTreeSet<Path>,
    pub page: BTreeMap<Path, Page>,
}

impl MemoryState {
    pub fn new() -> Self {
        MemoryState::default()
    }

    /// §4.F `openPath`.
    pub fn open_path(&mut self, path: Path) {
        self.visible.insert(path);
    }

    pub fn is_visible(&self, path: &Path) -> bool {
        self.visible.contains(path)
    }

    /// §4.F `openChildren`: open every immediate child path, derived from
    /// the container's current value.
    pub fn open_children(&mut self, path: &Path, container_value: Option<&Value>) {
        let Some(value) = container_value else {
            return;
        };
        match value {
            Value::Array(items) => {
                for i in 0..items.len() {
                    self.open_path(path.child(i.to_string()));
                }
            }
            Value::Object(map) => {
                for key in map.keys() {
                    self.open_path(path.child(key.clone()));
                }
            }
            _ => {}
        }
    }

    /// §4.F `closePathAndDescendants`: remove `path` and every visible
    /// descendant, plus their pagination entries.
    pub fn close_path_and_descendants(&mut self, path: &Path) {
        self.visible.retain(|v| !v.is_self_or_descendant_of(path));
        self.page.retain(|p, _| !p.is_self_or_descendant_of(path));
    }

    /// §4.F `setPagination`. `offset` defaults to 0, `limit` to
    /// `default_limit` when not supplied by the op.
    pub fn set_pagination(
        &mut self,
        path: Path,
        offset: Option<u32>,
        limit: Option<u32>,
        default_limit: u32,
        max_limit: u32,
    ) -> MemoryResult<()> {
        let offset = offset.unwrap_or(0);
        let limit = limit.unwrap_or(default_limit);
        if limit < 1 || limit > max_limit {
            return Err(BatchError::MissingField("page.limit").into());
        }
        self.page.insert(path, Page { offset, limit });
        Ok(())
    }

    pub fn pagination(&self, path: &Path) -> Option<Page> {
        self.page.get(path).copied()
    }
}

/// Read the value a container path currently denotes, for `open_children`
/// to enumerate. A thin convenience over `tree::get` kept here so callers
/// of the visibility overlay don't need to depend on the tree module
/// directly for this one lookup.
pub fn container_value<'t>(tree: &'t Tree, path: &Path) -> Option<&'t Value> {
    crate::tree::get(tree, path)
}

/// §4.F implicit visibility: root is always visible; a top-level field (or,
/// recursively, a descendant) whose resolved schema step carries
/// `opened: true` is visible so long as its parent is also (implicitly or
/// explicitly) visible. Used by both the permission check in the executor
/// and the renderer's walk.
pub fn effective_visibility(
    schema: &aac_memory_core::Schema,
    tree: &Tree,
    state: &MemoryState,
    path: &Path,
) -> bool {
    if path.is_root() {
        return true;
    }
    if state.is_visible(path) {
        return true;
    }
    let opened = aac_memory_resolver::resolve(schema, tree, path)
        .ok()
        .and_then(|step| step.field())
        .map(|f| f.is_opened())
        .unwrap_or(false);
    opened && effective_visibility(schema, tree, state, &path.parent())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_round_trip_preserves_visible_and_pagination() {
        let mut state = MemoryState::new();
        state.open_path(Path::parse("/profile"));
        state.open_path(Path::parse("/todos/0"));
        state
            .set_pagination(Path::parse("/todos"), Some(10), Some(25), 50, 500)
            .unwrap();

        let json = serde_json::to_string(&state).unwrap();
        let round_tripped: MemoryState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, round_tripped);
    }

    #[test]
    fn view_then_hide_wildcard_clears_children() {
        let mut state = MemoryState::new();
        for i in 0..3 {
            state.open_path(Path::parse(&format!("/todos/{i}")));
        }
        state.open_path(Path::parse("/todos"));
        state.close_path_and_descendants(&Path::parse("/todos"));
        assert!(state.visible.is_empty());
    }

    #[test]
    fn pagination_bounds_enforced() {
        let mut state = MemoryState::new();
        assert!(state
            .set_pagination(Path::parse("/todos"), Some(0), Some(0), 50, 500)
            .is_err());
        assert!(state
            .set_pagination(Path::parse("/todos"), Some(0), Some(501), 50, 500)
            .is_err());
        assert!(state
            .set_pagination(Path::parse("/todos"), Some(50), Some(25), 50, 500)
            .is_ok());
        assert_eq!(
            state.pagination(&Path::parse("/todos")),
            Some(Page {
                offset: 50,
                limit: 25
            })
        );
    }

    #[test]
    fn implicit_visibility_follows_opened_chain() {
        use aac_memory_core::schema::build::*;
        use aac_memory_core::Schema;

        let mut opened_field = string("name");
        if let aac_memory_core::Field::String { meta, .. } = &mut opened_field {
            meta.opened = true;
        }
        let mut profile_field = object(
            "profile",
            vec![("name".to_string(), opened_field)],
            vec![],
        );
        if let aac_memory_core::Field::Object { meta, .. } = &mut profile_field {
            meta.opened = true;
        }
        let unopened_field = string("age");
        let schema = Schema::new(vec![
            profile_field,
            object("private", vec![("age".to_string(), unopened_field)], vec![]),
        ]);
        let tree = Tree::new();
        let state = MemoryState::new();

        assert!(effective_visibility(&schema, &tree, &state, &Path::root()));
        assert!(effective_visibility(
            &schema,
            &tree,
            &state,
            &Path::parse("/profile")
        ));
        assert!(effective_visibility(
            &schema,
            &tree,
            &state,
            &Path::parse("/profile/name")
        ));
        assert!(!effective_visibility(
            &schema,
            &tree,
            &state,
            &Path::parse("/private")
        ));
    }
}
