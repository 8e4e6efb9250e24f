//! Durin - A Minimal Networked Key-Value Store
//!
//! This is the main entry point for the Durin server.
//! It loads the snapshot, starts the persister, sets up the TCP listener,
//! and handles incoming connections.

use anyhow::Context;
use clap::Parser;
use durin::commands::Router;
use durin::config::ServerConfig;
use durin::connection::ConnectionStats;
use durin::server::{accept_loop, open_store};
use durin::storage::{persist_once, Persister};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing(config: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

fn print_banner(config: &ServerConfig) {
    let persistence = match config.persister_config() {
        Some(persister) => format!(
            "{} (every {} ms)",
            persister.path.display(),
            persister.interval.as_millis()
        ),
        None => "disabled".to_string(),
    };

    println!(
        r#"
Durin v{} - Minimal Networked Key-Value Store
──────────────────────────────────────────────────────────────
Server started on {}
Snapshot: {}
Ready to accept connections.

Use Ctrl+C to shutdown.
"#,
        durin::VERSION,
        config.bind_address(),
        persistence
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();

    init_tracing(&config);
    print_banner(&config);

    let persister_config = config.persister_config();

    // A corrupt snapshot stops startup; nothing may overwrite it.
    let store = match open_store(persister_config.as_ref().map(|c| c.path.as_path())).await {
        Ok(store) => Arc::new(store),
        Err(e) => {
            error!(error = %e, "Refusing to start with an untrustworthy snapshot");
            return Err(e).context("failed to load snapshot");
        }
    };

    let mut persister = persister_config
        .clone()
        .map(|c| Persister::start(Arc::clone(&store), c));

    let router = Router::new(Arc::clone(&store));
    let stats = Arc::new(ConnectionStats::new());

    let listener = TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("failed to bind {}", config.bind_address()))?;
    info!("Listening on {}", config.bind_address());

    let api = async {
        match config.api_addr {
            Some(addr) => match TcpListener::bind(addr).await {
                Ok(listener) => durin::api::serve(listener, router.clone()).await,
                Err(e) => Err(e),
            },
            None => std::future::pending().await,
        }
    };

    let persister_stopped = async {
        match persister.as_mut() {
            Some(persister) => persister.wait().await,
            None => std::future::pending().await,
        }
    };

    tokio::select! {
        _ = accept_loop(listener, router.clone(), stats) => {}
        result = api => {
            result.context("envelope API failed")?;
        }
        result = persister_stopped => {
            // Only ends on its own when the snapshot can no longer be trusted.
            result.context("snapshot persister stopped")?;
        }
        result = signal::ctrl_c() => {
            result.context("failed to listen for Ctrl+C")?;
            info!("Shutdown signal received, stopping server...");
        }
    }

    if let Some(persister) = persister.take() {
        if let Err(e) = persister.shutdown().await {
            warn!(error = %e, "Snapshot persister ended with an error");
        }
    }

    if let Some(persister_config) = persister_config {
        match persist_once(&store, &persister_config.path).await {
            Ok(true) => info!("Final snapshot saved"),
            Ok(false) => {}
            Err(e) => warn!(error = %e, "Final snapshot not saved"),
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
