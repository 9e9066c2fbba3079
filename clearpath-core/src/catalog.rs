//! Task Catalog: known task names, favorites and recently used tasks.
//!
//! The three collections are persisted independently. A recent task that no
//! longer exists in `all_tasks` is hidden by [`TaskCatalog::recent_tasks`] and
//! dropped from the stored list on the next catalog mutation.

use std::collections::HashSet;

use anyhow::{Result, bail};

use crate::progress::SharedStore;
use crate::storage::{KEY_ALL_TASKS, KEY_FAVORITES, KEY_RECENTS, load_json, save_json};

pub const MAX_RECENTS: usize = 5;

/// Tasks offered before the user adds any of their own.
pub const SEED_TASKS: [&str; 18] = [
    "Washing a car",
    "Reshelving library books",
    "Factory assembly work",
    "Running photocopies",
    "Janitor jobs",
    "Restocking shelves",
    "Sorting at a recycling plant",
    "Loading trucks in a warehouse",
    "Lawn and garden work",
    "Fast food restaurant cooking",
    "Watering office plants",
    "Clerk and filing jobs",
    "Tuning a piano",
    "Running laboratory equipment",
    "Inventory control",
    "Dog obedience training",
    "Copy editing a manuscript",
    "Professional photography",
];

pub struct TaskCatalog {
    store: SharedStore,
    all_tasks: Vec<String>,
    favorites: HashSet<String>,
    recents: Vec<String>,
}

impl TaskCatalog {
    pub fn load(store: SharedStore) -> Self {
        let all_tasks = load_json::<Vec<String>>(store.as_ref(), KEY_ALL_TASKS)
            .map(dedup_in_order)
            .unwrap_or_else(|| SEED_TASKS.iter().map(|t| t.to_string()).collect());
        let favorites: HashSet<String> = load_json::<Vec<String>>(store.as_ref(), KEY_FAVORITES)
            .unwrap_or_default()
            .into_iter()
            .collect();
        let mut recents = load_json::<Vec<String>>(store.as_ref(), KEY_RECENTS)
            .map(dedup_in_order)
            .unwrap_or_default();
        recents.truncate(MAX_RECENTS);

        Self {
            store,
            all_tasks,
            favorites,
            recents,
        }
    }

    pub fn all_tasks(&self) -> &[String] {
        &self.all_tasks
    }

    pub fn contains(&self, name: &str) -> bool {
        self.all_tasks.iter().any(|t| t == name)
    }

    pub fn is_favorite(&self, name: &str) -> bool {
        self.favorites.contains(name)
    }

    /// Stored recents, including entries hidden from [`Self::recent_tasks`].
    pub fn stored_recents(&self) -> &[String] {
        &self.recents
    }

    /// Select a task: add it to the catalog if new and move it to the front of recents.
    pub fn select_task(&mut self, name: &str) {
        if !self.contains(name) {
            self.all_tasks.insert(0, name.to_string());
            save_json(self.store.as_ref(), KEY_ALL_TASKS, &self.all_tasks);
            tracing::info!(task = name, "added task to catalog");
        }

        self.prune_recents();
        self.recents.retain(|t| t != name);
        self.recents.insert(0, name.to_string());
        self.recents.truncate(MAX_RECENTS);
        save_json(self.store.as_ref(), KEY_RECENTS, &self.recents);
    }

    /// Add a user-described task. Blank descriptions are rejected.
    pub fn add_custom(&mut self, description: &str) -> Result<String> {
        let name = description.trim();
        if name.is_empty() {
            bail!("Please describe the task first.");
        }
        self.select_task(name);
        Ok(name.to_string())
    }

    /// Flip favorite membership; returns whether the task is now a favorite.
    pub fn toggle_favorite(&mut self, name: &str) -> bool {
        let now_favorite = if self.favorites.remove(name) {
            false
        } else {
            self.favorites.insert(name.to_string());
            true
        };
        save_json(self.store.as_ref(), KEY_FAVORITES, &self.sorted_favorites());

        if self.prune_recents() {
            save_json(self.store.as_ref(), KEY_RECENTS, &self.recents);
        }
        now_favorite
    }

    /// Remove a task from every collection. Progress is deleted by the caller.
    pub fn delete_task(&mut self, name: &str) {
        self.all_tasks.retain(|t| t != name);
        self.favorites.remove(name);
        self.recents.retain(|t| t != name);
        self.prune_recents();

        save_json(self.store.as_ref(), KEY_ALL_TASKS, &self.all_tasks);
        save_json(self.store.as_ref(), KEY_FAVORITES, &self.sorted_favorites());
        save_json(self.store.as_ref(), KEY_RECENTS, &self.recents);
        tracing::info!(task = name, "deleted task from catalog");
    }

    /// Favorites in catalog order.
    pub fn favorite_tasks(&self) -> Vec<&str> {
        self.all_tasks
            .iter()
            .filter(|t| self.favorites.contains(t.as_str()))
            .map(String::as_str)
            .collect()
    }

    /// Recents still present in the catalog, most recent first.
    pub fn recent_tasks(&self) -> Vec<&str> {
        self.recents
            .iter()
            .filter(|t| self.contains(t))
            .map(String::as_str)
            .collect()
    }

    fn prune_recents(&mut self) -> bool {
        let before = self.recents.len();
        let known: HashSet<&str> = self.all_tasks.iter().map(String::as_str).collect();
        self.recents.retain(|t| known.contains(t.as_str()));
        before != self.recents.len()
    }

    fn sorted_favorites(&self) -> Vec<&str> {
        let mut v: Vec<&str> = self.favorites.iter().map(String::as_str).collect();
        v.sort_unstable();
        v
    }
}

fn dedup_in_order(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items.into_iter().filter(|t| seen.insert(t.clone())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{KeyValueStore, MemoryStore};
    use std::sync::Arc;

    fn catalog() -> (SharedStore, TaskCatalog) {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let c = TaskCatalog::load(store.clone());
        (store, c)
    }

    #[test]
    fn test_first_run_uses_seed_list() {
        let (_, c) = catalog();
        assert_eq!(c.all_tasks().len(), SEED_TASKS.len());
        assert_eq!(c.all_tasks()[0], "Washing a car");
        assert!(c.favorite_tasks().is_empty());
        assert!(c.recent_tasks().is_empty());
    }

    #[test]
    fn test_custom_task_is_prepended() {
        let (_, mut c) = catalog();
        let name = c.add_custom("  Bake bread  ").unwrap();
        assert_eq!(name, "Bake bread");
        assert_eq!(c.all_tasks()[0], "Bake bread");
        assert_eq!(c.recent_tasks(), vec!["Bake bread"]);
        assert!(c.add_custom("   ").is_err());
    }

    #[test]
    fn test_select_existing_does_not_duplicate() {
        let (_, mut c) = catalog();
        c.select_task("Janitor jobs");
        assert_eq!(c.all_tasks().len(), SEED_TASKS.len());
        assert_eq!(c.all_tasks()[4], "Janitor jobs");
    }

    #[test]
    fn test_toggle_favorite_twice() {
        let (_, mut c) = catalog();
        assert!(c.toggle_favorite("Tuning a piano"));
        assert!(c.toggle_favorite("Washing a car"));
        assert_eq!(c.favorite_tasks(), vec!["Washing a car", "Tuning a piano"]);
        assert!(!c.toggle_favorite("Tuning a piano"));
        assert_eq!(c.favorite_tasks(), vec!["Washing a car"]);
    }

    #[test]
    fn test_collections_persist_independently() {
        let (store, mut c) = catalog();
        c.add_custom("Fold laundry").unwrap();
        c.toggle_favorite("Fold laundry");

        let reloaded = TaskCatalog::load(store.clone());
        assert_eq!(reloaded.all_tasks()[0], "Fold laundry");
        assert_eq!(reloaded.favorite_tasks(), vec!["Fold laundry"]);
        assert_eq!(reloaded.recent_tasks(), vec!["Fold laundry"]);

        store.set(KEY_FAVORITES, "oops").unwrap();
        let reloaded = TaskCatalog::load(store);
        assert!(reloaded.favorite_tasks().is_empty());
        assert_eq!(reloaded.recent_tasks(), vec!["Fold laundry"]);
    }

    #[test]
    fn test_stale_recent_hidden_then_pruned() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        store.set(KEY_ALL_TASKS, r#"["a","b"]"#).unwrap();
        store.set(KEY_RECENTS, r#"["ghost","a"]"#).unwrap();

        let mut c = TaskCatalog::load(store.clone());
        assert_eq!(c.recent_tasks(), vec!["a"]);
        assert_eq!(c.stored_recents(), ["ghost", "a"]);

        c.toggle_favorite("b");
        assert_eq!(c.stored_recents(), ["a"]);
        let stored: Vec<String> = load_json(store.as_ref(), KEY_RECENTS).unwrap();
        assert_eq!(stored, vec!["a"]);
    }
}
