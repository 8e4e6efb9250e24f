//! # Durin - A Minimal Networked Key-Value Store
//!
//! Durin keeps string keys and string values in memory, serves them over a
//! newline-delimited text protocol, and snapshots the whole dataset to a JSON
//! file in the background so it survives restarts.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                               Durin                                     │
//! │                                                                         │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐                  │
//! │  │ TCP Server  │───>│ Connection  │───>│   Router    │                  │
//! │  │ (Listener)  │    │  Handler    │    │             │                  │
//! │  └─────────────┘    └──────┬──────┘    └──────┬──────┘                  │
//! │                            │                  │                         │
//! │                            ▼                  ▼                         │
//! │                     ┌─────────────┐    ┌──────────────────────────┐     │
//! │                     │ Line Parser │    │  Store (Mutex<HashMap>)  │     │
//! │                     └─────────────┘    └──────────────────────────┘     │
//! │                                               ▲                         │
//! │                                               │                         │
//! │                     ┌─────────────────────────┴───────────────────────┐ │
//! │                     │     Persister (Background Tokio Task)           │ │
//! │                     │     polls and rewrites the JSON snapshot        │ │
//! │                     └─────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use durin::commands::Router;
//! use durin::connection::ConnectionStats;
//! use durin::server::{accept_loop, open_store};
//! use durin::storage::{Persister, PersisterConfig};
//! use std::sync::Arc;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = PersisterConfig::new("durin.db");
//!     let store = Arc::new(open_store(Some(&config.path)).await?);
//!     let _persister = Persister::start(Arc::clone(&store), config);
//!
//!     let listener = TcpListener::bind("127.0.0.1:8045").await?;
//!     let stats = Arc::new(ConnectionStats::new());
//!     accept_loop(listener, Router::new(store), stats).await;
//!     Ok(())
//! }
//! ```
//!
//! ## Supported Commands
//!
//! - `set <key> <value>` → `OK`
//! - `get <key>` → `<value>` or `(error) key not found`
//! - `del <key>` → `OK`, even for absent keys
//! - `keys [prefix]` → `["k1","k2"]` or `[]`
//! - `json <prefix>` → `{"k1":"v1"}` or `{}`
//!
//! ## Module Overview
//!
//! - [`protocol`]: request/response types and the line parser
//! - [`storage`]: the store, the snapshot format and the persister
//! - [`commands`]: the router between parsed requests and the store
//! - [`connection`]: client connection management
//! - [`api`]: JSON request/response adapter over the same router
//! - [`config`]: server command-line configuration

pub mod api;
pub mod commands;
pub mod config;
pub mod connection;
pub mod protocol;
pub mod server;
pub mod storage;

// Re-export commonly used types for convenience
pub use commands::Router;
pub use config::ServerConfig;
pub use connection::{handle_connection, ConnectionStats};
pub use protocol::{parse, Command, ParseError, Request, Response};
pub use storage::{Persister, PersisterConfig, SnapshotError, Store};

/// The default port Durin listens on
pub const DEFAULT_PORT: u16 = 8045;

/// The default host Durin binds to
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Version of Durin
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
