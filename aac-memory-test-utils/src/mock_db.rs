//! An in-memory `DbBinding` for exercising the population and mutation
//! paths without a real store. Mirrors `caliber_storage::MockStorage`'s
//! role in the teacher's test suite: not a mock in the verify-calls sense,
//! a real (if trivial) implementation good enough to assert behavior against.

use aac_memory_core::{DbBindingError, Path};
use aac_memory_db::{DbBinding, DbContext, DbPage};
use aac_memory_engine::visibility::Page;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Mutex;

/// Backs a single bound path. Collections are stored as an ordered
/// `(key, value)` list so both array (positional) and map (keyed) shapes
/// work without a second storage type.
pub struct MockDbBinding {
    whole: Mutex<Option<Value>>,
    entries: Mutex<Vec<(String, Value)>>,
    keyed: bool,
}

impl MockDbBinding {
    /// A binding for a primitive/object field, seeded with `initial`.
    pub fn scalar(initial: Value) -> Self {
        MockDbBinding {
            whole: Mutex::new(Some(initial)),
            entries: Mutex::new(Vec::new()),
            keyed: false,
        }
    }

    /// A binding for an array field, seeded with `items` in order.
    pub fn array(items: Vec<Value>) -> Self {
        let entries = items
            .into_iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), v))
            .collect();
        MockDbBinding {
            whole: Mutex::new(None),
            entries: Mutex::new(entries),
            keyed: false,
        }
    }

    /// A binding for a map/topic field, seeded with explicit keys.
    pub fn keyed(entries: Vec<(String, Value)>) -> Self {
        MockDbBinding {
            whole: Mutex::new(None),
            entries: Mutex::new(entries),
            keyed: true,
        }
    }

    pub fn snapshot_entries(&self) -> Vec<(String, Value)> {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait]
impl DbBinding for MockDbBinding {
    async fn read(&self, _path: &Path, _ctx: &DbContext) -> Result<Option<Value>, DbBindingError> {
        Ok(self.whole.lock().unwrap().clone())
    }

    async fn write(&self, _path: &Path, _ctx: &DbContext, value: &Value) -> Result<(), DbBindingError> {
        *self.whole.lock().unwrap() = Some(value.clone());
        Ok(())
    }

    async fn list(&self, _path: &Path, _ctx: &DbContext, page: Page) -> Result<DbPage, DbBindingError> {
        let entries = self.entries.lock().unwrap();
        let start = (page.offset as usize).min(entries.len());
        let end = (start + page.limit as usize).min(entries.len());
        let window = &entries[start..end];
        let items = window.iter().map(|(_, v)| v.clone()).collect();
        let keys = self
            .keyed
            .then(|| window.iter().map(|(k, _)| k.clone()).collect());
        Ok(DbPage {
            items,
            keys,
            total: Some(entries.len()),
        })
    }

    async fn get(&self, _path: &Path, _ctx: &DbContext, key: &str) -> Result<Option<Value>, DbBindingError> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone()))
    }

    async fn add(
        &self,
        _path: &Path,
        _ctx: &DbContext,
        value: &Value,
        key: Option<&str>,
        _index: Option<usize>,
    ) -> Result<(), DbBindingError> {
        let mut entries = self.entries.lock().unwrap();
        let key = key
            .map(str::to_string)
            .unwrap_or_else(|| entries.len().to_string());
        entries.push((key, value.clone()));
        Ok(())
    }

    async fn insert(&self, _path: &Path, _ctx: &DbContext, value: &Value, index: usize) -> Result<(), DbBindingError> {
        let mut entries = self.entries.lock().unwrap();
        let index = index.min(entries.len());
        entries.insert(index, (index.to_string(), value.clone()));
        Ok(())
    }

    async fn update(&self, _path: &Path, _ctx: &DbContext, key: &str, value: &Value) -> Result<(), DbBindingError> {
        let mut entries = self.entries.lock().unwrap();
        match entries.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => {
                slot.1 = value.clone();
                Ok(())
            }
            None => Err(DbBindingError {
                path: Path::root(),
                reason: format!("no such key `{key}`"),
            }),
        }
    }

    async fn upsert(&self, path: &Path, ctx: &DbContext, value: &Value, key: Option<&str>) -> Result<(), DbBindingError> {
        match key {
            Some(key) => {
                let mut entries = self.entries.lock().unwrap();
                match entries.iter_mut().find(|(k, _)| k == key) {
                    Some(slot) => slot.1 = value.clone(),
                    None => entries.push((key.to_string(), value.clone())),
                }
                Ok(())
            }
            None => self.write(path, ctx, value).await,
        }
    }

    async fn delete(&self, _path: &Path, _ctx: &DbContext, key: &str) -> Result<(), DbBindingError> {
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|(k, _)| k != key);
        if entries.len() == before {
            return Err(DbBindingError {
                path: Path::root(),
                reason: format!("no such key `{key}`"),
            });
        }
        Ok(())
    }

    async fn clear(&self, _path: &Path, _ctx: &DbContext) -> Result<(), DbBindingError> {
        self.entries.lock().unwrap().clear();
        *self.whole.lock().unwrap() = None;
        Ok(())
    }

    async fn rename(&self, _path: &Path, _ctx: &DbContext, old_key: &str, new_key: &str) -> Result<(), DbBindingError> {
        let mut entries = self.entries.lock().unwrap();
        if entries.iter().any(|(k, _)| k == new_key) {
            return Err(DbBindingError {
                path: Path::root(),
                reason: format!("`{new_key}` already exists"),
            });
        }
        match entries.iter_mut().find(|(k, _)| k == old_key) {
            Some(slot) => {
                slot.0 = new_key.to_string();
                Ok(())
            }
            None => Err(DbBindingError {
                path: Path::root(),
                reason: format!("no such key `{old_key}`"),
            }),
        }
    }
}
