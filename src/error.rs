// Error types module

use std::fmt;

use crate::cache::CacheError;

/// Centralized error type for the agent
///
/// Categorizes errors into 4 main types so callers embedding the agent
/// can decide what is fatal (configuration) and what is operational
/// (cache backend, network).
#[derive(Debug)]
pub enum AgentError {
    /// Configuration errors (invalid generation names, empty URL set, etc.)
    Config(String),

    /// Cache storage errors (backend unavailable, serialization, etc.)
    Cache(CacheError),

    /// Network fetch errors that escaped local recovery
    Fetch(String),

    /// Internal agent errors (unexpected states)
    Internal(String),
}

impl fmt::Display for AgentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AgentError::Cache(err) => write!(f, "Cache error: {}", err),
            AgentError::Fetch(msg) => write!(f, "Fetch error: {}", msg),
            AgentError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AgentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AgentError::Cache(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CacheError> for AgentError {
    fn from(err: CacheError) -> Self {
        AgentError::Cache(err)
    }
}
