//! Line Protocol Implementation
//!
//! Durin speaks a newline-delimited text protocol: one request line in, one
//! response line out.
//!
//! ## Modules
//!
//! - `types`: `Command`, `Request`, `Response` and the router's error type
//! - `parser`: prefix-dispatch parser for request lines
//!
//! ## Example
//!
//! ```
//! use durin::protocol::{parse, Command, Response};
//!
//! let request = parse("get name\n").unwrap();
//! assert_eq!(request.command, Command::Get);
//!
//! let response = Response::Value("Ariz".to_string());
//! assert_eq!(response.to_line(), "Ariz\n");
//! ```

pub mod parser;
pub mod types;

pub use parser::{parse, ParseError, ParseResult, KEYS_HINT};
pub use types::{Command, CommandError, Request, Response};
