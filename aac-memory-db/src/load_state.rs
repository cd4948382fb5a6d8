//! Tracks which bound paths have been populated from the DB, and which
//! need to be reloaded before the next render (§4.J "load-state").

use aac_memory_core::Path;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadState {
    pub loaded: BTreeSet<Path>,
    pub stale: BTreeSet<Path>,
    #[serde(rename = "loadedAt")]
    pub loaded_at: BTreeMap<Path, DateTime<Utc>>,
    pub totals: BTreeMap<Path, usize>,
}

impl LoadState {
    pub fn new() -> Self {
        LoadState::default()
    }

    /// True when `path` has never been loaded, or was loaded but has since
    /// been marked stale by a mutation.
    pub fn needs_loading(&self, path: &Path) -> bool {
        !self.loaded.contains(path) || self.stale.contains(path)
    }

    pub fn mark_loaded(&mut self, path: Path, total: Option<usize>) {
        self.stale.remove(&path);
        self.loaded_at.insert(path.clone(), Utc::now());
        if let Some(total) = total {
            self.totals.insert(path.clone(), total);
        }
        self.loaded.insert(path);
    }

    pub fn mark_stale(&mut self, path: Path) {
        self.stale.insert(path);
    }

    /// A mutation that changes a container's membership (delete/clear/
    /// rename) invalidates everything under it — a stale `totals` entry or
    /// a `loaded` flag on a now-gone child would otherwise linger forever.
    pub fn invalidate_subtree(&mut self, path: &Path) {
        self.loaded.retain(|p| !p.is_self_or_descendant_of(path));
        self.stale.retain(|p| !p.is_self_or_descendant_of(path));
        self.loaded_at.retain(|p, _| !p.is_self_or_descendant_of(path));
        self.totals.retain(|p, _| !p.is_self_or_descendant_of(path));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_round_trip_preserves_all_maps() {
        let mut state = LoadState::new();
        state.mark_loaded(Path::parse("/tasks"), Some(5));
        state.mark_stale(Path::parse("/profile"));

        let json = serde_json::to_string(&state).unwrap();
        let round_tripped: LoadState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, round_tripped);
    }

    #[test]
    fn fresh_path_needs_loading() {
        let state = LoadState::new();
        assert!(state.needs_loading(&Path::parse("/tasks")));
    }

    #[test]
    fn loaded_path_does_not_need_loading_until_marked_stale() {
        let mut state = LoadState::new();
        let path = Path::parse("/tasks");
        state.mark_loaded(path.clone(), Some(3));
        assert!(!state.needs_loading(&path));
        state.mark_stale(path.clone());
        assert!(state.needs_loading(&path));
    }

    #[test]
    fn invalidate_subtree_drops_descendants_only() {
        let mut state = LoadState::new();
        state.mark_loaded(Path::parse("/tasks"), Some(2));
        state.mark_loaded(Path::parse("/tasks/0"), None);
        state.mark_loaded(Path::parse("/profile"), None);

        state.invalidate_subtree(&Path::parse("/tasks"));

        assert!(state.needs_loading(&Path::parse("/tasks")));
        assert!(state.needs_loading(&Path::parse("/tasks/0")));
        assert!(!state.needs_loading(&Path::parse("/profile")));
        assert!(!state.totals.contains_key(&Path::parse("/tasks")));
    }
}
