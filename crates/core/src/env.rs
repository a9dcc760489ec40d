//! Typed environment-variable lookups for configuration structs.
//!
//! Missing optional variables fall back to a default; present but
//! unparseable values are reported as [`CoreError::InvalidConfig`] instead of
//! panicking, so a bad configuration stops the run before it starts.

use std::str::FromStr;

use crate::error::CoreError;

/// Read `name`, returning `None` when unset or blank.
pub fn optional(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Read a required variable.
pub fn required(name: &str) -> Result<String, CoreError> {
    optional(name)
        .ok_or_else(|| CoreError::InvalidConfig(format!("{name} environment variable is required")))
}

/// Read and parse `name`, or use `default` when unset.
pub fn parse_or<T: FromStr>(name: &str, default: T) -> Result<T, CoreError> {
    match optional(name) {
        None => Ok(default),
        Some(raw) => parse_value(name, &raw),
    }
}

/// Parse a raw configuration value for `name`.
pub fn parse_value<T: FromStr>(name: &str, raw: &str) -> Result<T, CoreError> {
    raw.parse::<T>()
        .map_err(|_| CoreError::InvalidConfig(format!("{name} has an invalid value '{raw}'")))
}

/// Parse a boolean flag (`true/false`, `1/0`, `yes/no`, `on/off`).
pub fn parse_flag(name: &str, raw: &str) -> Result<bool, CoreError> {
    match raw.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(CoreError::InvalidConfig(format!(
            "{name} must be a boolean, got '{raw}'"
        ))),
    }
}
