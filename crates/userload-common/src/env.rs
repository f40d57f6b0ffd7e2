//! Environment lookup helpers
//!
//! Loaders take a lookup closure instead of reading `std::env` directly so that tests can
//! feed a plain map without touching process-global state.

use crate::error::{ConfigError, Result};
use std::collections::HashMap;

/// Read a variable from the process environment.
pub fn process_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Build a lookup over a fixed set of pairs.
pub fn map_lookup<'a>(
    pairs: &'a [(&'a str, &'a str)],
) -> impl Fn(&str) -> Option<String> + 'a {
    let map: HashMap<&str, &str> = pairs.iter().copied().collect();
    move |name: &str| map.get(name).map(|v| v.to_string())
}

/// Fetch a variable that must be present and non-empty.
pub fn required<F>(lookup: &F, name: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(name.to_string())),
    }
}

/// Case-insensitive `TRUE` switch; anything else (or absence) is off.
pub fn flag<F>(lookup: &F, name: &str) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|v| v.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Parse an optional typed value, falling back to `default` when unset.
pub fn parsed_or<F, T>(lookup: &F, name: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::invalid(name, &raw, e.to_string())),
        None => Ok(default),
    }
}
