//! Command Router
//!
//! This module dispatches validated requests to the store and maps each
//! outcome to a [`Response`].
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Router                             │
//! │                                                             │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐     │
//! │  │   parse()   │───>│   route()   │───>│  Response   │     │
//! │  └─────────────┘    └─────────────┘    └─────────────┘     │
//! │                            │                                │
//! │                            ▼                                │
//! │                          Store                              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every call to [`Router::route`] performs exactly one store operation and
//! therefore takes the store lock exactly once.

use crate::protocol::{parse, Command, CommandError, ParseError, Response};
use crate::storage::Store;
use std::sync::Arc;
use tracing::trace;

/// Routes requests to the shared store.
///
/// Cloning a router is cheap; every clone talks to the same store.
#[derive(Debug, Clone)]
pub struct Router {
    store: Arc<Store>,
}

impl Router {
    /// Creates a router over the given store.
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Returns the store this router writes to.
    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// Parses one request line and routes it.
    ///
    /// Parse failures come back as [`Response::Error`]; they never escape as
    /// a Rust error, since the connection stays open after them.
    ///
    /// # Example
    ///
    /// ```
    /// use durin::commands::Router;
    /// use durin::storage::Store;
    /// use std::sync::Arc;
    ///
    /// let router = Router::new(Arc::new(Store::new()));
    /// assert_eq!(router.execute("set foo bar\n").to_line(), "OK\n");
    /// assert_eq!(router.execute("get foo\n").to_line(), "bar\n");
    /// ```
    pub fn execute(&self, line: &str) -> Response {
        match parse(line) {
            Ok(request) => self.route(request.command, &request.key, request.value.as_deref()),
            Err(e) => {
                trace!(error = %e, "Rejected request line");
                Response::error(e)
            }
        }
    }

    /// Performs one store operation for an already-validated request.
    ///
    /// For `keys` and `json`, `key` is the prefix filter.
    pub fn route(&self, command: Command, key: &str, value: Option<&str>) -> Response {
        match command {
            Command::Get => match self.store.get(key) {
                Some(value) => Response::Value(value),
                None => Response::error(CommandError::KeyNotFound),
            },
            Command::Set => match value {
                Some(value) => {
                    self.store.set(key, value);
                    Response::Ok
                }
                None => Response::error(ParseError::MissingValue),
            },
            Command::Del => {
                self.store.del(key);
                Response::Ok
            }
            Command::Keys => Response::Keys(self.store.list(key)),
            Command::Json => Response::Object(self.store.list_as_json(key)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};

    fn create_router() -> Router {
        Router::new(Arc::new(Store::new()))
    }

    #[test]
    fn test_set_get() {
        let router = create_router();

        assert_eq!(router.execute("set foo bar\n").to_line(), "OK\n");
        assert_eq!(router.execute("get foo\n").to_line(), "bar\n");
    }

    #[test]
    fn test_get_missing() {
        let router = create_router();

        assert_eq!(
            router.execute("get missing\n").to_line(),
            "(error) key not found\n"
        );
    }

    #[test]
    fn test_get_after_del() {
        let router = create_router();

        router.route(Command::Set, "key", Some("value"));
        assert_eq!(router.route(Command::Del, "key", None), Response::Ok);
        assert_eq!(
            router.route(Command::Get, "key", None),
            Response::error(CommandError::KeyNotFound)
        );
    }

    #[test]
    fn test_del_absent_key_is_ok() {
        let router = create_router();

        for _ in 0..3 {
            assert_eq!(router.execute("del ghost\n").to_line(), "OK\n");
        }
    }

    #[test]
    fn test_keys_on_empty_store() {
        let router = create_router();
        assert_eq!(router.execute("keys\n").to_line(), "[]\n");
    }

    #[test]
    fn test_keys_with_prefix() {
        let router = create_router();
        router.execute("set user:1 ariz\n");
        router.execute("set user:2 bob\n");
        router.execute("set session x\n");

        let line = router.execute("keys user:\n").to_line();
        let keys: HashSet<String> = serde_json::from_str(line.trim_end()).unwrap();
        assert_eq!(
            keys,
            HashSet::from(["user:1".to_string(), "user:2".to_string()])
        );
    }

    #[test]
    fn test_keys_strips_inner_spaces() {
        let router = create_router();
        router.execute("set abc 1\n");
        router.execute("set a 2\n");

        assert_eq!(router.execute("keys a b\n").to_line(), "[\"abc\"]\n");
    }

    #[test]
    fn test_keys_near_miss() {
        let router = create_router();

        let line = router.execute("keysxyz\n").to_line();
        assert!(line.starts_with("(error) invalid syntax"));
        assert!(line.contains("keys [prefix]"));
    }

    #[test]
    fn test_set_missing_value_leaves_store_unchanged() {
        let router = create_router();

        let response = router.execute("set foo \n");
        assert_eq!(response, Response::error(ParseError::MissingValue));
        assert!(router.store().is_empty());
    }

    #[test]
    fn test_json_prefix() {
        let router = create_router();
        router.execute("set prefix1 a\n");
        router.execute("set other b\n");

        assert_eq!(
            router.execute("json pre\n").to_line(),
            "{\"prefix1\":\"a\"}\n"
        );
    }

    #[test]
    fn test_json_matches_keys_and_values() {
        let router = create_router();
        router.execute("set k1 v1\n");
        router.execute("set k2 v2\n");
        router.execute("set x v3\n");

        let line = router.execute("json k\n").to_line();
        let object: HashMap<String, String> = serde_json::from_str(line.trim_end()).unwrap();

        let keys_line = router.execute("keys k\n").to_line();
        let keys: HashSet<String> = serde_json::from_str(keys_line.trim_end()).unwrap();

        assert_eq!(object.keys().cloned().collect::<HashSet<_>>(), keys);
        assert_eq!(object.get("k1"), Some(&"v1".to_string()));
        assert_eq!(object.get("k2"), Some(&"v2".to_string()));
    }

    #[test]
    fn test_json_no_match() {
        let router = create_router();
        router.execute("set a 1\n");

        assert_eq!(router.execute("json zzz\n").to_line(), "{}\n");
    }

    #[test]
    fn test_route_set_without_value() {
        let router = create_router();

        assert!(router.route(Command::Set, "key", None).is_error());
        assert!(router.store().is_empty());
    }

    #[test]
    fn test_invalid_syntax() {
        let router = create_router();

        assert_eq!(
            router.execute("flush\n").to_line(),
            "(error) invalid syntax\n"
        );
        assert_eq!(router.execute("get \n").to_line(), "(error) invalid key\n");
    }

    #[test]
    fn test_value_with_spaces_round_trips() {
        let router = create_router();

        router.execute("set greeting hello there\n");
        assert_eq!(router.execute("get greeting\n").to_line(), "hello there\n");
    }
}
