//! Command Routing Module
//!
//! This module implements the dispatch layer for Durin. It receives parsed
//! requests, executes them against the store, and returns responses.
//!
//! ## Architecture
//!
//! ```text
//! Client Request
//!       │
//!       ▼
//! ┌─────────────────┐
//! │  Line Parser    │  (protocol module)
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │     Router      │  (this module)
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │      Store      │  (storage module)
//! └─────────────────┘
//! ```
//!
//! ## Supported Commands
//!
//! - `set <key> <value>`
//! - `get <key>`
//! - `del <key>`
//! - `keys [prefix]`
//! - `json <prefix>`

pub mod router;

pub use router::Router;
