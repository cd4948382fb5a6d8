//! Wires bound fields to the value tree: populates bound paths on read,
//! and mirrors mutations into the backing store (§4.J).
//!
//! The core executor (`aac_memory_engine::executor`) stays synchronous —
//! bindings are `async` because real stores are — so the bridge is deliberately
//! *not* folded into `apply_batch`. An embedder calls `populate` before
//! rendering and `apply_mutation_hook` around each mutating op in a batch,
//! trusting the op's own `ok` flag before persisting its result.

use crate::binding::DbBinding;
use crate::context::DbContext;
use crate::load_state::LoadState;
use aac_memory_core::schema::Field;
use aac_memory_core::{DbBindingError, Path, Schema, Tree};
use aac_memory_engine::op::{Action, OpInput};
use aac_memory_engine::tree;
use aac_memory_engine::visibility::{MemoryState, Page};
use aac_memory_resolver::resolve;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of bindings keyed by the wire path of the field they bind.
/// Bindings attach to a specific schema node rather than being inherited by
/// descendants — a bound `Object` field's binding governs reads/writes of
/// the whole object, not its individual properties.
#[derive(Default)]
pub struct DbBridge {
    bindings: HashMap<String, Arc<dyn DbBinding>>,
}

impl DbBridge {
    pub fn new() -> Self {
        DbBridge::default()
    }

    pub fn bind(&mut self, path: Path, binding: Arc<dyn DbBinding>) {
        self.bindings.insert(path.to_wire(), binding);
    }

    pub fn binding_for(&self, path: &Path) -> Option<&Arc<dyn DbBinding>> {
        self.bindings.get(&path.to_wire())
    }

    /// Build the context a binding at `path` should see: the binding's own
    /// context entries, overlaid with `extractChildContext` contributions
    /// from every bound ancestor along the way.
    fn context_for(&self, tree: &Tree, path: &Path) -> DbContext {
        let mut ctx = DbContext::new();
        let tokens = path.tokens();
        for depth in 0..tokens.len() {
            let ancestor = Path::from_tokens(tokens[..depth].to_vec());
            let Some(binding) = self.binding_for(&ancestor) else {
                continue;
            };
            let Some(value) = tree::get(tree, &ancestor) else {
                continue;
            };
            let key = &tokens[depth];
            ctx = ctx.merged_with(&binding.extract_child_context(value, key));
        }
        ctx
    }

    /// Load every bound, visible, not-yet-loaded path into the tree.
    /// Paths are visited shallowest-first so a parent's `extractChildContext`
    /// is available before its children are populated.
    pub async fn populate(
        &self,
        schema: &Schema,
        tree: &mut Tree,
        state: &MemoryState,
        load_state: &mut LoadState,
    ) {
        let mut visible: Vec<Path> = state.visible.iter().cloned().collect();
        visible.sort_by_key(Path::len);

        for path in visible {
            if path.is_root() || !load_state.needs_loading(&path) {
                continue;
            }
            let Some(binding) = self.binding_for(&path).cloned() else {
                continue;
            };
            let Ok(step) = resolve(schema, tree, &path) else {
                continue;
            };
            let Some(field) = step.field() else {
                continue;
            };
            let ctx = self.context_for(tree, &path);

            if is_collection(field) {
                let page = state
                    .pagination(&path)
                    .unwrap_or(Page { offset: 0, limit: 50 });
                if let Ok(result) = binding.list(&path, &ctx, page).await {
                    let value = collection_value(field, result.items, result.keys, binding.as_ref());
                    merge_loaded(tree, &path, value);
                    load_state.mark_loaded(path, result.total);
                }
            } else if let Ok(Some(raw)) = binding.read(&path, &ctx).await {
                let value = binding.from_db(raw);
                merge_loaded(tree, &path, value);
                load_state.mark_loaded(path, None);
            }
        }
    }

    /// Mirror a mutating op into the bound store, if `path` (or its
    /// resolved target) carries a binding. Returns `None` when nothing is
    /// bound there — the caller should treat the in-memory result as final.
    pub async fn apply_mutation_hook(
        &self,
        tree: &Tree,
        path: &Path,
        op: &OpInput,
        load_state: &mut LoadState,
    ) -> Option<Result<(), DbBindingError>> {
        let binding = self.binding_for(path)?;
        let ctx = self.context_for(tree, path);

        let result = match op.action {
            Action::Set | Action::Upsert => match &op.value {
                Some(value) => {
                    let payload = binding.to_db(value);
                    binding.write(path, &ctx, &payload).await
                }
                None => Err(DbBindingError {
                    path: path.clone(),
                    reason: "set/upsert requires a value".to_string(),
                }),
            },
            Action::Add => match &op.value {
                Some(value) => {
                    let payload = binding.to_db(value);
                    let index = op.index.map(|i| i as usize);
                    binding.add(path, &ctx, &payload, op.key.as_deref(), index).await
                }
                None => Err(DbBindingError {
                    path: path.clone(),
                    reason: "add requires a value".to_string(),
                }),
            },
            Action::Insert => match (&op.value, op.index) {
                (Some(value), Some(index)) => {
                    let payload = binding.to_db(value);
                    binding.insert(path, &ctx, &payload, index as usize).await
                }
                _ => Err(DbBindingError {
                    path: path.clone(),
                    reason: "insert requires a value and an index".to_string(),
                }),
            },
            Action::Delete => match &op.key {
                Some(key) => binding.delete(path, &ctx, key).await,
                None => Err(DbBindingError {
                    path: path.clone(),
                    reason: "delete requires a key".to_string(),
                }),
            },
            Action::Clear => binding.clear(path, &ctx).await,
            Action::Rename => match (&op.key, &op.new_key) {
                (Some(old_key), Some(new_key)) => binding.rename(path, &ctx, old_key, new_key).await,
                _ => Err(DbBindingError {
                    path: path.clone(),
                    reason: "rename requires key and newKey".to_string(),
                }),
            },
            Action::View | Action::Hide => return None,
        };

        if result.is_ok() {
            match op.action {
                Action::Add | Action::Insert => load_state.mark_stale(path.clone()),
                Action::Delete | Action::Clear | Action::Rename => load_state.invalidate_subtree(path),
                Action::Set | Action::Upsert => load_state.mark_loaded(path.clone(), None),
                Action::View | Action::Hide => unreachable!(),
            }
        }

        Some(result)
    }
}

fn is_collection(field: &Field) -> bool {
    matches!(field, Field::Array { .. } | Field::Map { .. } | Field::Topic { .. })
}

fn collection_value(
    field: &Field,
    items: Vec<Value>,
    keys: Option<Vec<String>>,
    binding: &dyn DbBinding,
) -> Value {
    let items: Vec<Value> = items.into_iter().map(|raw| binding.from_db(raw)).collect();
    match (field, keys) {
        (Field::Array { .. }, _) => Value::Array(items),
        (_, Some(keys)) => {
            let mut map = serde_json::Map::new();
            for (key, value) in keys.into_iter().zip(items) {
                map.insert(key, value);
            }
            Value::Object(map)
        }
        (_, None) => Value::Array(items),
    }
}

/// Shallow-merge a freshly loaded value into the tree at `path`, keeping
/// any previously loaded child keys the new payload is silent about (a
/// page that doesn't re-fetch every descendant shouldn't blank them out).
fn merge_loaded(tree: &mut Tree, path: &Path, new_value: Value) {
    let merged = match (tree::get(tree, path), &new_value) {
        (Some(Value::Object(old_map)), Value::Object(new_map)) => {
            let mut merged = old_map.clone();
            for (key, value) in new_map {
                merged.insert(key.clone(), value.clone());
            }
            Value::Object(merged)
        }
        _ => new_value,
    };

    if path.is_empty() {
        return;
    }
    let _ = tree::set(tree, path, merged);
}

#[cfg(test)]
mod tests {
    use super::*;
    use aac_memory_core::schema::build;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    struct RecordingBinding {
        payload: Value,
        writes: Mutex<Vec<Value>>,
    }

    #[async_trait]
    impl DbBinding for RecordingBinding {
        async fn read(&self, _path: &Path, _ctx: &DbContext) -> Result<Option<Value>, DbBindingError> {
            Ok(Some(self.payload.clone()))
        }

        async fn write(&self, _path: &Path, _ctx: &DbContext, value: &Value) -> Result<(), DbBindingError> {
            self.writes.lock().unwrap().push(value.clone());
            Ok(())
        }
    }

    fn schema() -> Schema {
        Schema::new(vec![build::object(
            "profile",
            vec![("name".to_string(), build::string("name"))],
            vec![],
        )])
    }

    #[tokio::test]
    async fn populate_reads_bound_top_level_field() {
        let schema = schema();
        let mut tree = Tree::new();
        let mut state = MemoryState::new();
        state.open_path(Path::parse("/profile"));
        let mut load_state = LoadState::new();

        let mut bridge = DbBridge::new();
        bridge.bind(
            Path::parse("/profile"),
            Arc::new(RecordingBinding {
                payload: json!({"name": "Ana"}),
                writes: Mutex::new(Vec::new()),
            }),
        );

        bridge.populate(&schema, &mut tree, &state, &mut load_state).await;

        assert_eq!(tree.get("profile"), Some(&json!({"name": "Ana"})));
        assert!(!load_state.needs_loading(&Path::parse("/profile")));
    }

    #[tokio::test]
    async fn mutation_hook_writes_through_and_marks_loaded() {
        let mut tree = Tree::new();
        tree.insert("profile".to_string(), json!({"name": "Ana"}));
        let mut load_state = LoadState::new();

        let mut bridge = DbBridge::new();
        bridge.bind(
            Path::parse("/profile"),
            Arc::new(RecordingBinding {
                payload: json!({}),
                writes: Mutex::new(Vec::new()),
            }),
        );

        let op = OpInput {
            action: Action::Set,
            path: Some("/profile".to_string()),
            paths: None,
            value: Some(json!({"name": "Bea"})),
            index: None,
            key: None,
            new_key: None,
            page: None,
            open_children: None,
        };

        let result = bridge
            .apply_mutation_hook(&tree, &Path::parse("/profile"), &op, &mut load_state)
            .await;

        assert!(matches!(result, Some(Ok(()))));
        assert!(!load_state.needs_loading(&Path::parse("/profile")));
    }

    #[tokio::test]
    async fn unbound_path_yields_no_hook_result() {
        let tree = Tree::new();
        let mut load_state = LoadState::new();
        let bridge = DbBridge::new();
        let op = OpInput {
            action: Action::Set,
            path: Some("/profile".to_string()),
            paths: None,
            value: Some(json!({"name": "Bea"})),
            index: None,
            key: None,
            new_key: None,
            page: None,
            open_children: None,
        };

        let result = bridge
            .apply_mutation_hook(&tree, &Path::parse("/profile"), &op, &mut load_state)
            .await;
        assert!(result.is_none());
    }
}
