//! Request/Response Envelope
//!
//! A JSON request/response layer over the same [`Router`] the line protocol
//! uses. The command comes from the endpoint; the body carries the already
//! separated key and value:
//!
//! ```text
//! POST /set  {"key": "foo", "value": "bar"}  ->  {"data": {"key": "foo"}}
//! POST /get  {"key": "foo"}                  ->  {"data": {"key": "foo", "value": "bar"}}
//! POST /del  {"key": "foo"}                  ->  {"data": {"key": "foo"}}
//! POST /get  {"key": "nope"}                 ->  {"error": {"code": 404, "message": "key not found"}}
//! ```
//!
//! A response carries either `data` or `error`, never both.

use crate::commands::Router;
use crate::protocol::{Command, CommandError, ParseError, Response};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::Json;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::{debug, info};

/// Body of every envelope request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiRequest {
    #[serde(default)]
    pub key: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Success payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Error payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub code: u16,
    pub message: String,
}

/// Body of every envelope response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiResponse {
    Data(ApiData),
    Error(ApiError),
}

impl ApiResponse {
    fn data(key: String, value: Option<String>) -> Self {
        ApiResponse::Data(ApiData {
            key: Some(key),
            value,
        })
    }

    fn error(code: u16, message: impl Into<String>) -> Self {
        ApiResponse::Error(ApiError {
            code,
            message: message.into(),
        })
    }

    /// HTTP status mirroring the envelope.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiResponse::Data(_) => StatusCode::OK,
            ApiResponse::Error(err) => {
                StatusCode::from_u16(err.code).unwrap_or(StatusCode::BAD_REQUEST)
            }
        }
    }
}

impl From<CommandError> for ApiResponse {
    fn from(err: CommandError) -> Self {
        ApiResponse::error(err.code(), err.to_string())
    }
}

/// Validates an envelope request and routes it.
///
/// Keys must be non-empty and free of spaces and newlines, and `set` needs a
/// non-blank value without newlines: anything else could not be addressed
/// through the line protocol afterwards.
pub fn dispatch(router: &Router, command: Command, request: ApiRequest) -> ApiResponse {
    let ApiRequest { key, value } = request;

    if key.is_empty() || key.contains([' ', '\n']) {
        return CommandError::from(ParseError::InvalidKey).into();
    }

    let value = match command {
        Command::Set => match value {
            Some(value) if !value.trim().is_empty() && !value.contains('\n') => Some(value),
            _ => return CommandError::from(ParseError::MissingValue).into(),
        },
        Command::Get | Command::Del => None,
        Command::Keys | Command::Json => {
            return CommandError::from(ParseError::syntax()).into();
        }
    };

    match router.route(command, &key, value.as_deref()) {
        Response::Value(value) => ApiResponse::data(key, Some(value)),
        Response::Error(err) => err.into(),
        _ => ApiResponse::data(key, None),
    }
}

fn reply(
    router: &Router,
    command: Command,
    body: Result<Json<ApiRequest>, JsonRejection>,
) -> (StatusCode, Json<ApiResponse>) {
    let response = match body {
        Ok(Json(request)) => dispatch(router, command, request),
        Err(rejection) => {
            debug!(error = %rejection, "Rejected envelope body");
            ApiResponse::error(400, rejection.body_text())
        }
    };
    (response.status(), Json(response))
}

async fn set_handler(
    State(router): State<Router>,
    body: Result<Json<ApiRequest>, JsonRejection>,
) -> (StatusCode, Json<ApiResponse>) {
    reply(&router, Command::Set, body)
}

async fn get_handler(
    State(router): State<Router>,
    body: Result<Json<ApiRequest>, JsonRejection>,
) -> (StatusCode, Json<ApiResponse>) {
    reply(&router, Command::Get, body)
}

async fn del_handler(
    State(router): State<Router>,
    body: Result<Json<ApiRequest>, JsonRejection>,
) -> (StatusCode, Json<ApiResponse>) {
    reply(&router, Command::Del, body)
}

/// Builds the HTTP application for the envelope endpoints.
pub fn app(router: Router) -> axum::Router {
    axum::Router::new()
        .route("/set", post(set_handler))
        .route("/get", post(get_handler))
        .route("/del", post(del_handler))
        .with_state(router)
}

/// Serves the envelope endpoints on an already bound listener.
pub async fn serve(listener: TcpListener, router: Router) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "Envelope API listening");
    }
    axum::serve(listener, app(router)).await
}
