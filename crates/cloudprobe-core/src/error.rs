//! Core error types

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Failed to parse configuration: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(
        "{label} not ready after {attempts} attempt(s) within {timeout:?}{}",
        .last_error.as_ref().map(|e| format!(" (last error: {e})")).unwrap_or_default()
    )]
    PollTimedOut {
        label: String,
        timeout: Duration,
        attempts: u32,
        last_error: Option<String>,
    },

    #[error("{label} gave up after {attempts} attempt(s)")]
    PollAborted { label: String, attempts: u32 },
}

pub type Result<T> = std::result::Result<T, CoreError>;
