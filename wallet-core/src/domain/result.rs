//! Result and error types for the core library

use thiserror::Error;

/// Core library error type
///
/// The first three kinds are caller or business errors and display as the
/// bare message, so callers can match on the exact text. The rest are
/// infrastructure failures raised by collaborators.
#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BusinessRuleViolation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Risk service error: {0}")]
    Risk(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a business rule violation
    pub fn business_rule(msg: impl Into<String>) -> Self {
        Self::BusinessRuleViolation(msg.into())
    }

    /// Create a database error
    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    /// Create a risk service error
    pub fn risk(msg: impl Into<String>) -> Self {
        Self::Risk(msg.into())
    }

    /// True when the failure came from a collaborator rather than the caller
    pub fn is_infrastructure(&self) -> bool {
        !matches!(
            self,
            Self::InvalidArgument(_) | Self::NotFound(_) | Self::BusinessRuleViolation(_)
        )
    }
}

impl From<duckdb::Error> for Error {
    fn from(err: duckdb::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Risk(err.to_string())
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;
