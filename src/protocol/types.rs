//! Durin Line Protocol Data Types
//!
//! This module defines the values that flow through the text protocol:
//! the validated [`Request`] produced by the parser and the [`Response`]
//! produced by the router.
//!
//! ## Protocol Format
//!
//! Every request and every response is exactly one line terminated by `\n`.
//!
//! ```text
//! set <key> <value>\n   -> OK\n
//! get <key>\n           -> <value>\n  |  (error) key not found\n
//! del <key>\n           -> OK\n
//! keys [prefix]\n       -> ["k1","k2"]\n  |  []\n
//! json <prefix>\n       -> {"k1":"v1"}\n  |  {}\n
//! ```
//!
//! Errors are rendered as `(error) <description>\n` and never close the
//! connection.

use crate::protocol::parser::ParseError;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Line terminator used by the protocol.
pub const NEWLINE: u8 = b'\n';

/// Prefix put in front of every error line.
pub const ERROR_PREFIX: &str = "(error) ";

/// The commands understood by the line protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Get,
    Set,
    Del,
    Keys,
    Json,
}

impl Command {
    /// Returns the wire token for this command.
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Get => "get",
            Command::Set => "set",
            Command::Del => "del",
            Command::Keys => "keys",
            Command::Json => "json",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated request, built from one line of input.
///
/// For `keys` and `json` the `key` field carries the prefix filter; an
/// empty key on `keys` means "no filter".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub command: Command,
    pub key: String,
    pub value: Option<String>,
}

impl Request {
    pub fn new(command: Command, key: impl Into<String>, value: Option<String>) -> Self {
        Self {
            command,
            key: key.into(),
            value,
        }
    }
}

/// Errors a request can produce once it reaches the router.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The line was rejected before reaching the store
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// `get` on an absent key
    #[error("key not found")]
    KeyNotFound,
}

impl CommandError {
    /// Numeric code used by the request/response envelope.
    pub fn code(&self) -> u16 {
        match self {
            CommandError::Parse(_) => 400,
            CommandError::KeyNotFound => 404,
        }
    }
}

/// The outcome of routing one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Acknowledgement for `set` and `del`
    Ok,

    /// The value returned by `get`
    Value(String),

    /// Keys matched by `keys`, in no particular order
    Keys(Vec<String>),

    /// Key/value pairs matched by `json`
    Object(HashMap<String, String>),

    /// Any recoverable error
    Error(CommandError),
}

impl Response {
    /// Creates an error response.
    pub fn error(err: impl Into<CommandError>) -> Self {
        Response::Error(err.into())
    }

    /// Returns true if this is an error response.
    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error(_))
    }

    /// Renders the response as exactly one `\n`-terminated line.
    ///
    /// # Example
    ///
    /// ```
    /// use durin::protocol::Response;
    ///
    /// assert_eq!(Response::Ok.to_line(), "OK\n");
    /// assert_eq!(Response::Keys(vec![]).to_line(), "[]\n");
    /// ```
    pub fn to_line(&self) -> String {
        let mut line = self.to_string();
        line.push(NEWLINE as char);
        line
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Ok => f.write_str("OK"),
            Response::Value(value) => f.write_str(value),
            Response::Keys(keys) => write_json(f, keys),
            Response::Object(map) => write_json(f, map),
            Response::Error(err) => write!(f, "{}{}", ERROR_PREFIX, err),
        }
    }
}

/// Writes a value as compact JSON. Serializing strings and string maps cannot
/// fail, but a failure still surfaces as `fmt::Error` rather than a panic.
fn write_json<T: serde::Serialize + ?Sized>(f: &mut fmt::Formatter<'_>, value: &T) -> fmt::Result {
    let text = serde_json::to_string(value).map_err(|_| fmt::Error)?;
    f.write_str(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_line() {
        assert_eq!(Response::Ok.to_line(), "OK\n");
    }

    #[test]
    fn test_value_line() {
        assert_eq!(Response::Value("bar".to_string()).to_line(), "bar\n");
    }

    #[test]
    fn test_empty_keys_sentinel() {
        assert_eq!(Response::Keys(Vec::new()).to_line(), "[]\n");
    }

    #[test]
    fn test_keys_are_quoted() {
        let line = Response::Keys(vec!["k1".to_string()]).to_line();
        assert_eq!(line, "[\"k1\"]\n");
    }

    #[test]
    fn test_empty_object_sentinel() {
        assert_eq!(Response::Object(HashMap::new()).to_line(), "{}\n");
    }

    #[test]
    fn test_object_line() {
        let mut map = HashMap::new();
        map.insert("k1".to_string(), "v1".to_string());
        assert_eq!(Response::Object(map).to_line(), "{\"k1\":\"v1\"}\n");
    }

    #[test]
    fn test_key_not_found_line() {
        let line = Response::error(CommandError::KeyNotFound).to_line();
        assert_eq!(line, "(error) key not found\n");
    }

    #[test]
    fn test_parse_error_line() {
        let line = Response::error(ParseError::MissingValue).to_line();
        assert_eq!(line, "(error) invalid value\n");
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(CommandError::KeyNotFound.code(), 404);
        assert_eq!(CommandError::from(ParseError::InvalidKey).code(), 400);
    }

    #[test]
    fn test_command_display() {
        assert_eq!(Command::Keys.to_string(), "keys");
        assert_eq!(Command::Json.as_str(), "json");
    }
}
