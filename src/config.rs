//! Server configuration
//!
//! Every setting comes from a command-line flag; [`ServerConfig::default`]
//! gives the values used when no flag is passed.

use crate::storage::{PersisterConfig, DEFAULT_SNAPSHOT_PATH};
use crate::{DEFAULT_HOST, DEFAULT_PORT};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Command-line configuration of the `durin` server.
#[derive(Debug, Clone, Parser)]
#[command(name = "durin", version, about = "A minimal networked key-value store")]
pub struct ServerConfig {
    /// Host to bind to
    #[arg(long, default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Snapshot file the store is loaded from and saved to
    #[arg(long, value_name = "PATH", default_value = DEFAULT_SNAPSHOT_PATH)]
    pub db: PathBuf,

    /// Keep everything in memory: no snapshot load, no persister
    #[arg(long)]
    pub no_persist: bool,

    /// Milliseconds between two snapshot checks
    #[arg(long, value_name = "MS", default_value_t = 1000)]
    pub persist_interval_ms: u64,

    /// Also serve the JSON request/response API on this address
    #[arg(long, value_name = "ADDR")]
    pub api_addr: Option<SocketAddr>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            db: PathBuf::from(DEFAULT_SNAPSHOT_PATH),
            no_persist: false,
            persist_interval_ms: 1000,
            api_addr: None,
            log_level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    /// Returns the bind address as a string
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the persister settings, or `None` when persistence is disabled.
    pub fn persister_config(&self) -> Option<PersisterConfig> {
        if self.no_persist {
            return None;
        }
        Some(
            PersisterConfig::new(&self.db)
                .with_interval(Duration::from_millis(self.persist_interval_ms)),
        )
    }
}
