//! Durable key/value records.
//!
//! Every collection lives under its own fixed key as serialized JSON text.
//! Readers tolerate missing keys (first run) and malformed values; writers log
//! failures and carry on with the in-memory state.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{Result, anyhow};
use serde::Serialize;
use serde::de::DeserializeOwned;

pub const KEY_ALL_TASKS: &str = "clearpath.allTasks";
pub const KEY_FAVORITES: &str = "clearpath.favoriteTasks";
pub const KEY_RECENTS: &str = "clearpath.recentTasks";
pub const KEY_PROGRESS: &str = "clearpath.taskProgress";

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}

/// Process-local store. Used by tests and when no state directory is usable.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let records = self.records.lock().map_err(|_| anyhow!("memory store poisoned"))?;
        Ok(records.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut records = self.records.lock().map_err(|_| anyhow!("memory store poisoned"))?;
        records.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Read and decode a record. Missing or malformed values yield `None`.
pub fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!(key, error = %e, "failed to read stored record");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!(key, error = %e, "stored record is malformed; using defaults");
            None
        }
    }
}

/// Encode and write a record. Failures are logged, never returned.
pub fn save_json<T: Serialize + ?Sized>(store: &dyn KeyValueStore, key: &str, value: &T) {
    let raw = match serde_json::to_string(value) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(key, error = %e, "failed to serialize record");
            return;
        }
    };

    if let Err(e) = store.set(key, &raw) {
        tracing::warn!(key, error = %e, "failed to persist record");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(anyhow!("disk on fire"))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(anyhow!("quota exceeded"))
        }
    }

    #[test]
    fn test_load_missing_key_is_none() {
        let store = MemoryStore::new();
        assert_eq!(load_json::<Vec<String>>(&store, KEY_ALL_TASKS), None);
    }

    #[test]
    fn test_load_malformed_is_none() {
        let store = MemoryStore::new();
        store.set(KEY_ALL_TASKS, "{not json").unwrap();
        assert_eq!(load_json::<Vec<String>>(&store, KEY_ALL_TASKS), None);
    }

    #[test]
    fn test_save_then_load() {
        let store = MemoryStore::new();
        save_json(&store, KEY_RECENTS, &vec!["a", "b"]);
        let back: Vec<String> = load_json(&store, KEY_RECENTS).unwrap();
        assert_eq!(back, vec!["a", "b"]);
    }

    #[test]
    fn test_failing_store_is_swallowed() {
        save_json(&FailingStore, KEY_RECENTS, &vec!["a"]);
        assert_eq!(load_json::<Vec<String>>(&FailingStore, KEY_RECENTS), None);
    }
}
