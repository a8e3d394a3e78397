//! Cache error types
//!
//! This module defines error types for generation store operations.

/// Cache error types
#[derive(Debug)]
pub enum CacheError {
    /// Cache entry not found
    NotFound,
    /// Named generation does not exist
    GenerationMissing(String),
    /// Backend failure (storage unavailable, quota, ...)
    Backend(String),
    /// I/O error (for durable backends)
    IoError(std::io::Error),
    /// Serialization/deserialization error
    SerializationError(String),
}

impl std::fmt::Display for CacheError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheError::NotFound => write!(f, "Cache entry not found"),
            CacheError::GenerationMissing(name) => {
                write!(f, "Cache generation '{}' does not exist", name)
            }
            CacheError::Backend(msg) => write!(f, "Cache backend error: {}", msg),
            CacheError::IoError(err) => write!(f, "I/O error: {}", err),
            CacheError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for CacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CacheError::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CacheError {
    fn from(err: std::io::Error) -> Self {
        CacheError::IoError(err)
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::SerializationError(err.to_string())
    }
}
