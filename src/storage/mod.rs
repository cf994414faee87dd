//! Storage backends for ontology exports
//!
//! Exports leave the process through the `SnapshotStore` trait. The primary
//! implementation is `SqliteSnapshotStore`.

mod sqlite;
mod traits;

pub use sqlite::SqliteSnapshotStore;
pub use traits::{OpenStore, SnapshotStore, StorageError, StorageResult};
