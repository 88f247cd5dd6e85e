//! Error types for the Opsdesk engine

use thiserror::Error;

/// Main error type for Opsdesk operations
#[derive(Debug, Error)]
pub enum OpsdeskError {
    /// Message store operation error
    #[error("Store error: {0}")]
    Store(String),

    /// Participant directory error
    #[error("Directory error: {0}")]
    Directory(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Network/HTTP error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Session lifecycle error
    #[error("Session error: {0}")]
    Session(String),

    /// Service error
    #[error("Service error: {0}")]
    Service(String),

    /// Settings store error
    #[error("Settings error: {0}")]
    Settings(String),

    /// Not found error (generic)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Timeout error
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

/// Convenient Result type using OpsdeskError
pub type Result<T> = std::result::Result<T, OpsdeskError>;

impl OpsdeskError {
    /// Create a store error
    pub fn store(msg: impl Into<String>) -> Self {
        OpsdeskError::Store(msg.into())
    }

    /// Create a directory error
    pub fn directory(msg: impl Into<String>) -> Self {
        OpsdeskError::Directory(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        OpsdeskError::Config(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        OpsdeskError::Validation(msg.into())
    }

    /// Create a session error
    pub fn session(msg: impl Into<String>) -> Self {
        OpsdeskError::Session(msg.into())
    }

    /// Create a service error
    pub fn service(msg: impl Into<String>) -> Self {
        OpsdeskError::Service(msg.into())
    }

    /// Create a settings error
    pub fn settings(msg: impl Into<String>) -> Self {
        OpsdeskError::Settings(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        OpsdeskError::NotFound(msg.into())
    }

    /// Create a timeout error
    pub fn timeout(msg: impl Into<String>) -> Self {
        OpsdeskError::Timeout(msg.into())
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        OpsdeskError::Other(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = OpsdeskError::store("page fetch rejected");
        assert_eq!(err.to_string(), "Store error: page fetch rejected");

        let err = OpsdeskError::session("no active conversation");
        assert_eq!(err.to_string(), "Session error: no active conversation");
    }

    #[test]
    fn test_result_type() {
        fn returns_result() -> Result<i32> {
            Ok(42)
        }

        assert_eq!(returns_result().unwrap(), 42);
    }
}
