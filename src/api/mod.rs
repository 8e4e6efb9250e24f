//! Request/Response API
//!
//! An alternate transport for `set`, `get` and `del`: JSON bodies over HTTP
//! instead of request lines. It is a thin adapter; every request ends up in
//! the same [`Router`](crate::commands::Router) as the line protocol.

pub mod envelope;

pub use envelope::{app, dispatch, serve, ApiData, ApiError, ApiRequest, ApiResponse};
