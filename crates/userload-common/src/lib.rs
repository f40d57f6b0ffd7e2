//! Userload Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared plumbing for the userload workspace members.
//!
//! - **Errors**: configuration error type shared by every loader
//! - **Environment**: lookup helpers that work against the process environment or a test map
//! - **Logging**: tracing subscriber setup driven by `LOG_*` variables

pub mod env;
pub mod error;
pub mod logging;

pub use error::{ConfigError, Result};
