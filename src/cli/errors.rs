//! CLI-specific error types
//!
//! Every CLI error is reported as `{"status":"error","code":..,"message":..}`.

use std::fmt;
use std::io;

use crate::config::ConfigError;
use crate::connection::DatabaseError;
use crate::pagination::PaginationError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (stdin/stdout)
    IoError,
    /// Query document is malformed
    InvalidRequest,
    /// No paginator registered under the requested name
    UnknownMode,
    /// Database open or query failure
    DatabaseError,
    /// Hydration or key extraction failure
    PaginationFailed,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "FASTPAGE_CLI_CONFIG_ERROR",
            Self::IoError => "FASTPAGE_CLI_IO_ERROR",
            Self::InvalidRequest => "FASTPAGE_CLI_INVALID_REQUEST",
            Self::UnknownMode => "FASTPAGE_CLI_UNKNOWN_MODE",
            Self::DatabaseError => "FASTPAGE_CLI_DATABASE_ERROR",
            Self::PaginationFailed => "FASTPAGE_CLI_PAGINATION_FAILED",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::InvalidRequest, msg)
    }

    pub fn unknown_mode(mode: &str) -> Self {
        Self::new(
            CliErrorCode::UnknownMode,
            format!("Unknown pagination mode: {}", mode),
        )
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::invalid_request(format!("JSON error: {}", e))
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::config_error(e.to_string())
    }
}

impl From<DatabaseError> for CliError {
    fn from(e: DatabaseError) -> Self {
        Self::new(CliErrorCode::DatabaseError, e.to_string())
    }
}

impl From<PaginationError> for CliError {
    fn from(e: PaginationError) -> Self {
        let code = match &e {
            PaginationError::Database(_) => CliErrorCode::DatabaseError,
            PaginationError::UnknownCapability(_) => CliErrorCode::UnknownMode,
            _ => CliErrorCode::PaginationFailed,
        };
        Self::new(code, e.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
