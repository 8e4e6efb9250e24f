//! Line Protocol Parser
//!
//! This module turns one raw request line into a validated [`Request`].
//!
//! ## How the Parser Works
//!
//! Dispatch is a fixed-width prefix test on the start of the line rather
//! than a general tokenizer:
//!
//! - `"set "`, `"get "`, `"del "`: 3-letter command plus a mandatory space
//! - `"keys"`: optional space, optional prefix filter
//! - `"json "`: mandatory space and prefix
//!
//! The key runs from just after the command and its space up to the next
//! space, or to the end of the line. For `set`, whatever follows the key and
//! its space is the value, with surrounding whitespace trimmed.
//!
//! ## The `keys` Argument
//!
//! Spaces inside the `keys` argument are removed instead of ending it, so
//! `keys a b` filters on the prefix `ab`. An argument made only of spaces is
//! rejected as an invalid prefix. `keys` immediately followed by anything
//! other than a space or the end of line (`keysxyz`) is a syntax error with
//! a hint pointing at the real command.

use crate::protocol::types::{Command, Request};
use thiserror::Error;

/// Hint attached to near-miss `keys` commands such as `keysxyz`.
pub const KEYS_HINT: &str = "did you mean 'keys [prefix]'?";

/// Errors that can occur while parsing a request line.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Unrecognized command or malformed arguments
    #[error("invalid syntax{}", render_hint(.hint))]
    InvalidSyntax { hint: Option<&'static str> },

    /// Empty key where one is required
    #[error("invalid key")]
    InvalidKey,

    /// `keys` argument made only of whitespace
    #[error("invalid keys argument")]
    InvalidPrefix,

    /// `set` without a value
    #[error("invalid value")]
    MissingValue,
}

impl ParseError {
    /// A plain syntax error without a hint.
    pub fn syntax() -> Self {
        ParseError::InvalidSyntax { hint: None }
    }
}

fn render_hint(hint: &Option<&'static str>) -> String {
    match hint {
        Some(hint) => format!(": {}", hint),
        None => String::new(),
    }
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Parses one request line.
///
/// The line may carry its `\n` terminator (optionally preceded by `\r`) or
/// not; framing is the connection's concern.
///
/// # Example
///
/// ```
/// use durin::protocol::{parse, Command};
///
/// let request = parse("set foo bar\n").unwrap();
/// assert_eq!(request.command, Command::Set);
/// assert_eq!(request.key, "foo");
/// assert_eq!(request.value.as_deref(), Some("bar"));
/// ```
pub fn parse(line: &str) -> ParseResult<Request> {
    let body = strip_terminator(line);

    // One request per line; an embedded newline would break framing.
    if body.contains('\n') {
        return Err(ParseError::syntax());
    }

    if let Some(rest) = body.strip_prefix("set ") {
        parse_set(rest)
    } else if let Some(rest) = body.strip_prefix("get ") {
        Ok(Request::new(Command::Get, extract_key(rest)?, None))
    } else if let Some(rest) = body.strip_prefix("del ") {
        Ok(Request::new(Command::Del, extract_key(rest)?, None))
    } else if let Some(rest) = body.strip_prefix("keys") {
        parse_keys(rest)
    } else if let Some(rest) = body.strip_prefix("json ") {
        Ok(Request::new(Command::Json, extract_key(rest)?, None))
    } else {
        Err(ParseError::syntax())
    }
}

/// Removes a single trailing `\n` and the `\r` that may precede it.
fn strip_terminator(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// Returns the text up to the first space, rejecting an empty key.
fn extract_key(rest: &str) -> ParseResult<&str> {
    let key = match rest.find(' ') {
        Some(idx) => &rest[..idx],
        None => rest,
    };

    if key.is_empty() {
        return Err(ParseError::InvalidKey);
    }
    Ok(key)
}

fn parse_set(rest: &str) -> ParseResult<Request> {
    let key = extract_key(rest)?;

    // Past `key` there is either nothing or a space followed by the value.
    let value = rest[key.len()..].trim();
    if value.is_empty() {
        return Err(ParseError::MissingValue);
    }

    Ok(Request::new(Command::Set, key, Some(value.to_string())))
}

fn parse_keys(rest: &str) -> ParseResult<Request> {
    if rest.is_empty() {
        return Ok(Request::new(Command::Keys, "", None));
    }

    let arg = match rest.strip_prefix(' ') {
        Some(arg) => arg,
        None => {
            return Err(ParseError::InvalidSyntax {
                hint: Some(KEYS_HINT),
            })
        }
    };

    let prefix = arg.replace(' ', "");
    if prefix.is_empty() && !arg.is_empty() {
        return Err(ParseError::InvalidPrefix);
    }

    Ok(Request::new(Command::Keys, prefix, None))
}
