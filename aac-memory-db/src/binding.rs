//! The per-field CRUD binding (§4.J). A `Field` that carries a `db` binding
//! is backed by a real store; any subset of the hooks may be implemented —
//! a binding that only implements `read`/`write` behaves like a
//! primitive/object mirror, one that implements `list`/`add`/`delete`
//! behaves like a paginated collection. Hooks not overridden fail with
//! `DbBindingError`, which the bridge surfaces as a failed op rather than a
//! panic.
//!
//! Mirrors the shape of `caliber-storage`'s `CacheBackend`: an
//! `#[async_trait]` interface over typed payloads, kept deliberately
//! smaller since bindings here operate on `serde_json::Value` rather than a
//! fixed set of cacheable entities.

use crate::context::DbContext;
use aac_memory_core::{DbBindingError, Path};
use aac_memory_engine::visibility::Page;
use async_trait::async_trait;
use serde_json::Value;

fn unbound(path: &Path, hook: &str) -> DbBindingError {
    DbBindingError {
        path: path.clone(),
        reason: format!("hook `{hook}` is not bound"),
    }
}

/// A page of values read back from `list`, alongside enough bookkeeping for
/// the renderer's pagination trailer and the load-state's `totals` map.
#[derive(Debug, Clone, PartialEq)]
pub struct DbPage {
    pub items: Vec<Value>,
    /// Explicit keys for map/topic-shaped collections; `None` for arrays,
    /// where position is the key.
    pub keys: Option<Vec<String>>,
    /// Total item count, when the backend can report it cheaply.
    pub total: Option<usize>,
}

#[async_trait]
pub trait DbBinding: Send + Sync {
    /// Read the whole value at the bound path (primitive/object fields).
    async fn read(&self, path: &Path, _ctx: &DbContext) -> Result<Option<Value>, DbBindingError> {
        Err(unbound(path, "read"))
    }

    /// Persist the whole value at the bound path.
    async fn write(&self, path: &Path, _ctx: &DbContext, _value: &Value) -> Result<(), DbBindingError> {
        Err(unbound(path, "write"))
    }

    /// Read one page of a collection-shaped field (array/map/topic).
    async fn list(&self, path: &Path, _ctx: &DbContext, _page: Page) -> Result<DbPage, DbBindingError> {
        Err(unbound(path, "list"))
    }

    /// Read a single keyed element, without paging the whole collection.
    async fn get(&self, path: &Path, _ctx: &DbContext, _key: &str) -> Result<Option<Value>, DbBindingError> {
        Err(unbound(path, "get"))
    }

    /// Append (array) or insert-by-key (map/topic). `key` is `Some` for
    /// map/topic adds; `index` is `Some` when the caller asked for a
    /// specific array position rather than an append.
    async fn add(
        &self,
        path: &Path,
        _ctx: &DbContext,
        _value: &Value,
        _key: Option<&str>,
        _index: Option<usize>,
    ) -> Result<(), DbBindingError> {
        Err(unbound(path, "add"))
    }

    /// Insert into an array at a specific index, shifting later elements.
    async fn insert(&self, path: &Path, _ctx: &DbContext, _value: &Value, _index: usize) -> Result<(), DbBindingError> {
        Err(unbound(path, "insert"))
    }

    /// Overwrite an existing keyed element.
    async fn update(&self, path: &Path, _ctx: &DbContext, _key: &str, _value: &Value) -> Result<(), DbBindingError> {
        Err(unbound(path, "update"))
    }

    /// Insert-or-overwrite; `key` is `None` when the binding derives the
    /// key from the value itself (via `get_db_key`).
    async fn upsert(&self, path: &Path, _ctx: &DbContext, _value: &Value, _key: Option<&str>) -> Result<(), DbBindingError> {
        Err(unbound(path, "upsert"))
    }

    async fn delete(&self, path: &Path, _ctx: &DbContext, _key: &str) -> Result<(), DbBindingError> {
        Err(unbound(path, "delete"))
    }

    async fn clear(&self, path: &Path, _ctx: &DbContext) -> Result<(), DbBindingError> {
        Err(unbound(path, "clear"))
    }

    async fn rename(&self, path: &Path, _ctx: &DbContext, _old_key: &str, _new_key: &str) -> Result<(), DbBindingError> {
        Err(unbound(path, "rename"))
    }

    /// Transform a raw stored payload into tree-shaped JSON. Identity by
    /// default, for bindings whose storage shape already matches the tree.
    fn from_db(&self, raw: Value) -> Value {
        raw
    }

    /// Transform a tree value into the shape handed to `write`/`upsert`.
    fn to_db(&self, value: &Value) -> Value {
        value.clone()
    }

    /// Derive the storage key for a value being upserted without an
    /// explicit key (e.g. a map keyed by a field inside the value itself).
    fn get_db_key(&self, _value: &Value) -> Option<String> {
        None
    }

    /// Contribute extra `DbContext` entries for a child keyed by `key`,
    /// read off the parent's own value (e.g. a topic node's id becoming
    /// its subtopics' `parentTopicId`).
    fn extract_child_context(&self, _value: &Value, _key: &str) -> DbContext {
        DbContext::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ReadOnlyBinding;

    #[async_trait]
    impl DbBinding for ReadOnlyBinding {
        async fn read(&self, _path: &Path, _ctx: &DbContext) -> Result<Option<Value>, DbBindingError> {
            Ok(Some(Value::Null))
        }
    }

    #[tokio::test]
    async fn unimplemented_hooks_fail_instead_of_panicking() {
        let binding = ReadOnlyBinding;
        let path = Path::parse("/tasks");
        let ctx = DbContext::new();

        assert!(binding.read(&path, &ctx).await.unwrap().is_some());
        let err = binding.write(&path, &ctx, &Value::Null).await.unwrap_err();
        assert!(err.reason.contains("write"));
        let err = binding.delete(&path, &ctx, "k").await.unwrap_err();
        assert!(err.reason.contains("delete"));
    }
}
