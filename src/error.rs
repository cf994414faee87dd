//! Errors returned by fusion operations

use thiserror::Error;

/// Errors that can occur in fusion operations
///
/// All of these are local, synchronous failures. None are retried
/// internally and none leave registered state partially mutated.
#[derive(Debug, Error)]
pub enum FusionError {
    #[error("entity {global_id} already registered in world {world}")]
    DuplicateEntity { world: String, global_id: String },

    #[error("unknown world: {0}")]
    UnknownWorld(String),

    #[error("world {world} is at capacity ({max_entities} entities)")]
    CapacityExceeded { world: String, max_entities: usize },

    #[error("invalid entity {global_id}: {reason}")]
    InvalidEntity { global_id: String, reason: String },

    #[error("unknown entity: {0}")]
    UnknownEntity(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for fusion operations
pub type FusionResult<T> = Result<T, FusionError>;
