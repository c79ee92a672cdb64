//! Client transport for a remote database API.
//!
//! Turns logical operations (get/post/put/patch/delete against a resource
//! path) into authenticated HTTP requests, and turns responses back into an
//! [`ApiResponse`] or a typed [`Error`] whose [`ErrorKind`] follows the HTTP
//! status.

mod client;
mod config;
pub mod cputime;
pub mod diagnostics;
mod errors;
pub mod types;

pub use self::client::{handle_response, Connection};
pub use self::config::{
    debug_flag_set, resolve_logger, ConnectionConfig, Credentials, DEBUG_ENV,
};
pub use self::diagnostics::{Logger, MemoryLogger, StderrLogger, TracingLogger};
pub use self::errors::{ConfigError, Error, ErrorKind, Parameters, Result};
pub use self::types::{ApiResponse, JsonMap, Method, ResponseHeaders};
