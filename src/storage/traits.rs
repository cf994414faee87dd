//! Storage trait definitions

use crate::ontology::OntologyExport;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// An external store for periodic ontology exports.
///
/// Exports are whole documents; there is no delta format and nothing is
/// read back at startup.
pub trait SnapshotStore: Send + Sync {
    /// Append an export, returning its row id
    fn save_export(&self, export: &OntologyExport) -> StorageResult<i64>;

    /// The most recently saved export, if any
    fn latest_export(&self) -> StorageResult<Option<OntologyExport>>;

    /// Number of exports saved so far
    fn export_count(&self) -> StorageResult<usize>;
}

/// Extension trait for opening stores from paths
pub trait OpenStore: SnapshotStore + Sized {
    /// Open or create a store at the given path
    fn open(path: impl AsRef<Path>) -> StorageResult<Self>;

    /// Create an in-memory store (useful for testing)
    fn open_in_memory() -> StorageResult<Self>;
}
