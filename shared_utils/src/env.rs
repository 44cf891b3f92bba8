use std::str::FromStr;

use thiserror::Error;

/// An environment variable required by the application is not set.
#[derive(Debug, Error)]
#[error("Missing environment variable: {0}")]
pub struct MissingEnvVarError(pub String);

/// An environment variable is set but its value could not be parsed.
#[derive(Debug, Error)]
#[error("Invalid value for environment variable {name}: {value:?}")]
pub struct InvalidEnvVarError {
    pub name: String,
    pub value: String,
}

/// Reads an environment variable, returning a structured error if it's missing.
///
/// # Arguments
/// * `name` - The name of the environment variable to read.
pub fn get_env_var(name: &str) -> Result<String, MissingEnvVarError> {
    std::env::var(name).map_err(|_| MissingEnvVarError(name.to_string()))
}

/// Reads an optional environment variable.
///
/// Unset and empty (after trimming) variables both yield `None`.
pub fn get_env_var_opt(name: &str) -> Option<String> {
    get_env_var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Reads and parses an optional environment variable.
///
/// Returns `Ok(None)` when the variable is not set, and an error when it is set
/// to something `T` cannot parse.
pub fn parse_env_var<T: FromStr>(name: &str) -> Result<Option<T>, InvalidEnvVarError> {
    match get_env_var_opt(name) {
        None => Ok(None),
        Some(value) => value.parse::<T>().map(Some).map_err(|_| InvalidEnvVarError {
            name: name.to_string(),
            value,
        }),
    }
}
