//! CLI error types with exit code handling

use cloudprobe_client::ClientError;
use cloudprobe_core::CoreError;
use cloudprobe_schema::{RunSummary, SchemaError};
use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// One or more targets were not validated cleanly
    #[error(
        "Validation failed: {invalid} invalid, {no_validator} without validator, {parse_failed} unparsable"
    )]
    #[diagnostic(code(cloudprobe::cli::validation))]
    ValidationFailed {
        invalid: usize,
        no_validator: usize,
        parse_failed: usize,
    },

    /// CRD directory could not be turned into validators
    #[error("Schema error: {message}")]
    #[diagnostic(code(cloudprobe::cli::schema))]
    Schema {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(cloudprobe::cli::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// A wait ran out of time
    #[error("Timed out: {message}")]
    #[diagnostic(code(cloudprobe::cli::timeout))]
    Timeout { message: String },

    /// Platform or cluster call failed
    #[error("Platform error: {message}")]
    #[diagnostic(code(cloudprobe::cli::platform))]
    Platform { message: String },

    /// IO error (file not found, permissions, etc.)
    #[error("IO error: {message}")]
    #[diagnostic(code(cloudprobe::cli::io))]
    Io { message: String },

    /// Internal error (runtime, unexpected failure)
    #[error("Internal error: {message}")]
    #[diagnostic(code(cloudprobe::cli::internal))]
    Internal { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::ValidationFailed { .. } => exit_codes::VALIDATION_ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
            CliError::Timeout { .. } => exit_codes::TIMEOUT,
            CliError::Schema { .. }
            | CliError::Config { .. }
            | CliError::Platform { .. }
            | CliError::Internal { .. } => exit_codes::ERROR,
        }
    }

    pub fn validation_failed(summary: RunSummary) -> Self {
        Self::ValidationFailed {
            invalid: summary.invalid,
            no_validator: summary.no_validator,
            parse_failed: summary.parse_failed,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn io(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::io(err)
    }
}

/// Every registry failure is fatal for `validate` and exits with [`exit_codes::ERROR`]
impl From<SchemaError> for CliError {
    fn from(err: SchemaError) -> Self {
        let help = match &err {
            SchemaError::NotADirectory(_) | SchemaError::Walk(_) => {
                "--crds must point at a readable directory"
            }
            _ => "every file under the CRD directory must hold valid CustomResourceDefinitions",
        };
        CliError::Schema {
            message: err.to_string(),
            help: Some(help.to_string()),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::PollTimedOut { .. } => CliError::Timeout {
                message: err.to_string(),
            },
            CoreError::Io(e) => CliError::io(e),
            other => CliError::Config {
                message: other.to_string(),
                help: Some("check the file passed with --config".to_string()),
            },
        }
    }
}

impl From<ClientError> for CliError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Core(core) => core.into(),
            other if other.is_timeout() => CliError::Timeout {
                message: other.to_string(),
            },
            other => CliError::Platform {
                message: other.to_string(),
            },
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::internal(err.to_string())
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
