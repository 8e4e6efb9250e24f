//! Storage Module
//!
//! This module provides the in-memory store, the snapshot file format, and
//! the background task that reconciles the two.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Store (Mutex<HashMap>)                      │
//! └─────────────────────────────────────────────────────────────┘
//!                            ▲
//!                            │ compare / copy under lock
//!              ┌─────────────┴─────────────┐
//!              │        Persister          │
//!              │  (Background Tokio Task)  │
//!              └─────────────┬─────────────┘
//!                            │ read / overwrite
//!                            ▼
//!                     snapshot file (JSON)
//! ```
//!
//! ## Example
//!
//! ```
//! use durin::storage::Store;
//!
//! let store = Store::new();
//! store.set("name", "Ariz");
//! assert_eq!(store.get("name"), Some("Ariz".to_string()));
//! assert_eq!(store.list("na"), vec!["name".to_string()]);
//! ```

pub mod persister;
pub mod snapshot;
pub mod store;

pub use persister::{
    persist_once, Persister, PersisterConfig, PersisterStats, DEFAULT_PERSIST_INTERVAL,
    DEFAULT_SNAPSHOT_PATH,
};
pub use snapshot::SnapshotError;
pub use store::Store;
