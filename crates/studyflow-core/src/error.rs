//! Core error types for studyflow-core.
//!
//! This module defines the error hierarchy using thiserror so every
//! fallible operation in the library reports a typed, printable error.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for studyflow-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Rebalancing errors
    #[error("Rebalance error: {0}")]
    Rebalance(#[from] RebalanceError),

    /// AI gateway errors
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Row not found
    #[error("No such record: {0}")]
    NotFound(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Rebalancer errors.
#[derive(Error, Debug)]
pub enum RebalanceError {
    /// Capacity, horizon, or hour settings are unusable
    #[error("Invalid rebalancer configuration: {message}")]
    InvalidConfiguration { message: String },
}

/// AI gateway errors.
///
/// Rate-limit and credit exhaustion get dedicated variants because callers
/// surface them differently from generic transport failures.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// No API key in config or environment
    #[error("Gateway API key not configured (set STUDYFLOW_API_KEY)")]
    MissingApiKey,

    /// HTTP 429 from the gateway
    #[error("Gateway rate limit exceeded, try again later")]
    RateLimited,

    /// HTTP 402 from the gateway
    #[error("Gateway credits exhausted")]
    CreditsExhausted,

    /// Any other non-success HTTP status
    #[error("Gateway returned HTTP {0}")]
    Status(u16),

    /// Transport-level failure
    #[error("Gateway request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body did not contain the expected tool call
    #[error("Malformed gateway response: {0}")]
    MalformedResponse(String),
}

// Helper implementations for converting from other error types

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            rusqlite::Error::QueryReturnedNoRows => {
                DatabaseError::NotFound("query returned no rows".to_string())
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for CoreError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        CoreError::Custom(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
