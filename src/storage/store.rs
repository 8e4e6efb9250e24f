//! Thread-Safe Key-Value Store
//!
//! This module implements the in-memory store behind Durin: a
//! `HashMap<String, String>` guarded by a single mutex.
//!
//! ## Design Decisions
//!
//! 1. **One lock**: every operation takes the same exclusive lock, for the
//!    duration of the call only. Reads and writes do not run in parallel,
//!    but every operation is a single map access so hold times stay short.
//! 2. **No validation**: keys and values are checked by the parser. The store
//!    accepts whatever it is given.
//! 3. **Unordered enumeration**: `list` and `list_as_json` return keys in
//!    hash order. Callers must only rely on set membership.
//!
//! ## Concurrency Model
//!
//! ```text
//! ┌──────────────┐  ┌──────────────┐  ┌──────────────┐
//! │ Connection 1 │  │ Connection N │  │  Persister   │
//! └──────┬───────┘  └──────┬───────┘  └──────┬───────┘
//!        │                 │                 │
//!        ▼                 ▼                 ▼
//! ┌─────────────────────────────────────────────────────┐
//! │                 Store (Mutex<HashMap>)              │
//! └─────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// The key-value store shared by every connection and the persister.
///
/// This struct is designed to be wrapped in an `Arc` and shared across
/// all client handler tasks.
///
/// # Example
///
/// ```
/// use durin::storage::Store;
///
/// let store = Store::new();
/// store.set("name", "Ariz");
/// assert_eq!(store.get("name"), Some("Ariz".to_string()));
///
/// store.del("name");
/// assert_eq!(store.get("name"), None);
/// ```
#[derive(Debug, Default)]
pub struct Store {
    data: Mutex<HashMap<String, String>>,
}

impl Store {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the given mapping, typically a loaded snapshot.
    pub fn from_map(data: HashMap<String, String>) -> Self {
        Self {
            data: Mutex::new(data),
        }
    }

    /// Acquires the store-wide lock.
    ///
    /// A panic while holding the lock cannot leave the map half-updated (every
    /// mutation is a single insert or remove), so a poisoned lock is reused.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Gets the value for a key.
    pub fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    /// Sets a key, overwriting any previous value.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.lock().insert(key.into(), value.into());
    }

    /// Deletes a key. Deleting an absent key is not an error.
    ///
    /// # Returns
    ///
    /// Returns `true` if the key existed.
    pub fn del(&self, key: &str) -> bool {
        self.lock().remove(key).is_some()
    }

    /// Returns every key starting with `prefix`. An empty prefix matches all keys.
    pub fn list(&self, prefix: &str) -> Vec<String> {
        self.lock()
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect()
    }

    /// Returns every key/value pair whose key starts with `prefix`.
    pub fn list_as_json(&self, prefix: &str) -> HashMap<String, String> {
        self.lock()
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Returns a copy of the whole mapping.
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.lock().clone()
    }

    /// Compares the live mapping with `other` under the lock.
    ///
    /// Returns a copy of the live mapping when the two differ, `None` when they
    /// are equal. The copy is taken while the lock is held, so it is a
    /// consistent view even if writes land right after.
    pub fn diff_snapshot(&self, other: &HashMap<String, String>) -> Option<HashMap<String, String>> {
        let data = self.lock();
        if *data == *other {
            None
        } else {
            Some(data.clone())
        }
    }

    /// Returns the number of keys.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
