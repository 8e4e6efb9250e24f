//! Connection Handler Module
//!
//! This module handles individual client connections to Durin.
//! Each client gets its own handler task that runs in a loop,
//! reading request lines and sending response lines.
//!
//! ## Connection Lifecycle
//!
//! ```text
//! 1. Client connects (TCP handshake)
//!        │
//!        ▼
//! 2. ConnectionHandler spawned
//!        │
//!        ▼
//! 3. ┌──────────────────────────────┐
//!    │      Main Loop               │
//!    │                              │
//!    │  Read bytes from socket      │
//!    │  Split off complete lines    │
//!    │  Parse + route each line     │
//!    │  Send one response line      │
//!    │         [Loop back]          │
//!    └──────────────────────────────┘
//!        │
//!        ▼
//! 4. Client disconnects / error
//!        │
//!        ▼
//! 5. Handler task ends
//! ```
//!
//! ## Buffer Management
//!
//! Incoming bytes accumulate in a `BytesMut` buffer. TCP is a stream
//! protocol: one read may hold half a request or several of them, so lines
//! are split off only once their `\n` has arrived.

use crate::commands::Router;
use crate::protocol::{ParseError, Response};
use bytes::{Bytes, BytesMut};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufWriter};
use tracing::{debug, info, trace, warn};

/// Maximum length of a single request line (64 KB)
pub const MAX_LINE_LENGTH: usize = 64 * 1024;

/// Initial buffer capacity
const INITIAL_BUFFER_SIZE: usize = 4096;

/// Statistics for connection handling
#[derive(Debug, Default)]
pub struct ConnectionStats {
    /// Total number of connections accepted
    pub connections_accepted: AtomicU64,
    /// Currently active connections
    pub active_connections: AtomicU64,
    /// Total requests processed
    pub commands_processed: AtomicU64,
    /// Total bytes read
    pub bytes_read: AtomicU64,
    /// Total bytes written
    pub bytes_written: AtomicU64,
}

impl ConnectionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection_opened(&self) {
        self.connections_accepted.fetch_add(1, Ordering::Relaxed);
        self.active_connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connection_closed(&self) {
        self.active_connections.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn command_processed(&self) {
        self.commands_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn bytes_read(&self, count: usize) {
        self.bytes_read.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn bytes_written(&self, count: usize) {
        self.bytes_written
            .fetch_add(count as u64, Ordering::Relaxed);
    }
}

/// Handles a single client connection.
///
/// Generic over the byte stream so it can run over a `TcpStream` or any
/// other duplex stream.
pub struct ConnectionHandler<S> {
    /// The client stream, write-buffered
    stream: BufWriter<S>,

    /// Client's address (for logging)
    addr: SocketAddr,

    /// Buffer for incoming data
    buffer: BytesMut,

    /// Dispatches parsed requests to the store
    router: Router,

    /// Connection statistics (shared)
    stats: Arc<ConnectionStats>,
}

impl<S> ConnectionHandler<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Creates a new connection handler.
    ///
    /// # Arguments
    ///
    /// * `stream` - The byte stream for this connection
    /// * `addr` - The client's socket address
    /// * `router` - The router for executing requests
    /// * `stats` - Shared connection statistics
    pub fn new(stream: S, addr: SocketAddr, router: Router, stats: Arc<ConnectionStats>) -> Self {
        stats.connection_opened();

        Self {
            stream: BufWriter::new(stream),
            addr,
            buffer: BytesMut::with_capacity(INITIAL_BUFFER_SIZE),
            router,
            stats,
        }
    }

    /// Runs the main connection loop.
    ///
    /// This method reads requests from the client, executes them,
    /// and sends back responses until the client disconnects or an error occurs.
    pub async fn run(mut self) -> Result<(), ConnectionError> {
        info!(client = %self.addr, "Client connected");

        let result = self.main_loop().await;

        match &result {
            Ok(()) => info!(client = %self.addr, "Client disconnected"),
            Err(ConnectionError::Io(io_err))
                if io_err.kind() == std::io::ErrorKind::ConnectionReset =>
            {
                debug!(client = %self.addr, "Connection reset by client")
            }
            Err(e) => warn!(client = %self.addr, error = %e, "Connection error"),
        }

        self.stats.connection_closed();
        result
    }

    /// The main read-execute-respond loop.
    async fn main_loop(&mut self) -> Result<(), ConnectionError> {
        loop {
            while let Some(line) = self.next_line()? {
                self.respond(&line).await?;
            }

            if self.read_more_data().await? == 0 {
                // The client closed its side. A final line without `\n` still
                // counts as a request.
                if !self.buffer.is_empty() {
                    let line = self.buffer.split().freeze();
                    self.respond(&line).await?;
                }
                return Ok(());
            }
        }
    }

    /// Splits the next complete line (terminator included) off the buffer.
    fn next_line(&mut self) -> Result<Option<Bytes>, ConnectionError> {
        match self.buffer.iter().position(|&b| b == b'\n') {
            Some(pos) if pos >= MAX_LINE_LENGTH => Err(ConnectionError::LineTooLong),
            Some(pos) => {
                let line = self.buffer.split_to(pos + 1).freeze();
                trace!(
                    client = %self.addr,
                    consumed = line.len(),
                    remaining = self.buffer.len(),
                    "Framed request line"
                );
                Ok(Some(line))
            }
            None if self.buffer.len() >= MAX_LINE_LENGTH => Err(ConnectionError::LineTooLong),
            None => Ok(None),
        }
    }

    /// Executes one request line and writes its response line.
    async fn respond(&mut self, line: &[u8]) -> Result<(), ConnectionError> {
        let response = match std::str::from_utf8(line) {
            Ok(line) => self.router.execute(line),
            Err(_) => Response::error(ParseError::syntax()),
        };
        self.stats.command_processed();

        self.send_response(&response).await
    }

    /// Reads more data from the stream into the buffer.
    ///
    /// # Returns
    ///
    /// The number of bytes read; `0` means the client closed the stream.
    async fn read_more_data(&mut self) -> Result<usize, ConnectionError> {
        // Ensure we have some capacity
        if self.buffer.capacity() - self.buffer.len() < 1024 {
            self.buffer.reserve(4096);
        }

        let n = self.stream.get_mut().read_buf(&mut self.buffer).await?;

        self.stats.bytes_read(n);
        trace!(client = %self.addr, bytes = n, "Read data");

        Ok(n)
    }

    /// Sends a response to the client.
    async fn send_response(&mut self, response: &Response) -> Result<(), ConnectionError> {
        let line = response.to_line();
        self.stream.write_all(line.as_bytes()).await?;
        self.stream.flush().await?;
        self.stats.bytes_written(line.len());
        trace!(
            client = %self.addr,
            bytes = line.len(),
            "Sent response"
        );
        Ok(())
    }
}

/// Errors that can occur while handling a connection.
///
/// Protocol-level errors never show up here: they are answered with an
/// `(error)` line and the connection carries on.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// I/O error (network issue)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A request line exceeded the size limit
    #[error("Request line exceeds {} bytes", MAX_LINE_LENGTH)]
    LineTooLong,
}

/// Handles a client connection.
///
/// This is a convenience function that creates a ConnectionHandler
/// and runs it to completion.
///
/// # Arguments
///
/// * `stream` - The byte stream for this connection
/// * `addr` - The client's socket address
/// * `router` - The router for executing requests
/// * `stats` - Shared connection statistics
pub async fn handle_connection<S>(
    stream: S,
    addr: SocketAddr,
    router: Router,
    stats: Arc<ConnectionStats>,
) where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let handler = ConnectionHandler::new(stream, addr, router, stats);
    if let Err(e) = handler.run().await {
        match e {
            ConnectionError::Io(ref io_err)
                if io_err.kind() == std::io::ErrorKind::ConnectionReset => {}
            _ => {
                debug!(client = %addr, error = %e, "Connection ended with error");
            }
        }
    }
}
