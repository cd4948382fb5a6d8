//! DB context propagation (§4.J). A binding's hooks see a flat key/value
//! bag accumulated from the root down to the bound field — e.g. a topic
//! child's binding might see `{"userId": "...", "parentTopicId": "..."}`
//! contributed by ancestor bindings' `extractChildContext`.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DbContext {
    entries: BTreeMap<String, String>,
}

impl DbContext {
    pub fn new() -> Self {
        DbContext::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn merged_with(&self, other: &DbContext) -> DbContext {
        let mut merged = self.clone();
        for (k, v) in &other.entries {
            merged.entries.insert(k.clone(), v.clone());
        }
        merged
    }
}
