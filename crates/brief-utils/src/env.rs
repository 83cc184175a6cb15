//! Environment variable helpers for configuration loading

use thiserror::Error;

/// Error raised when a required environment variable is missing or empty
#[derive(Debug, Error)]
#[error("environment variable {0} is not set")]
pub struct EnvError(pub String);

/// Read a required environment variable, treating empty values as unset
pub fn require_env(name: &str) -> Result<String, EnvError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(EnvError(name.to_string())),
    }
}

/// Read an optional environment variable, treating empty values as unset
pub fn optional_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
}
