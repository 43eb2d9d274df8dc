//! Error Handling Infrastructure
//!
//! This module defines all error types used throughout geoquery.
//! All errors are structured and map to specific error codes for JSON output.
//!
//! # Error Categories
//! - `ConnectionFailed`: Database connection errors
//! - `QueryFailed`: Query execution errors
//! - `SeedFailed`: Sample data insertion errors
//! - `InvalidInput`: Malformed input or missing required parameters
//! - `EngineError`: Engine-specific database errors
//! - `ConfigError`: Configuration file or settings resolution errors

use thiserror::Error;

/// Main error type for geoquery operations
#[derive(Error, Debug)]
pub enum GeoError {
    /// Database connection failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Query execution failed
    #[error("Query execution failed: {0}")]
    QueryFailed(String),

    /// Inserting the sample dataset failed
    #[error("Seeding failed: {0}")]
    SeedFailed(String),

    /// Invalid input or missing required parameters
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Engine-specific database error
    #[error("Engine error ({engine}): {detail}")]
    EngineError { engine: String, detail: String },

    /// Configuration error (file unreadable, invalid JSON, etc.)
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl GeoError {
    /// Convert error to error code string for JSON output
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::ConnectionFailed(_) => "CONNECTION_FAILED",
            Self::QueryFailed(_) => "QUERY_FAILED",
            Self::SeedFailed(_) => "SEED_FAILED",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::EngineError { .. } => "ENGINE_ERROR",
            Self::ConfigError(_) => "CONFIG_ERROR",
        }
    }

    /// Human-readable error message
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }

    pub fn connection_failed(message: impl Into<String>) -> Self {
        Self::ConnectionFailed(message.into())
    }

    pub fn query_failed(message: impl Into<String>) -> Self {
        Self::QueryFailed(message.into())
    }

    pub fn seed_failed(message: impl Into<String>) -> Self {
        Self::SeedFailed(message.into())
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn engine_error(engine: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::EngineError { engine: engine.into(), detail: detail.into() }
    }

    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError(message.into())
    }
}

/// Result type alias for geoquery operations
pub type Result<T> = std::result::Result<T, GeoError>;
