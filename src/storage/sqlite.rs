//! SQLite snapshot store for ontology exports

use super::traits::{OpenStore, SnapshotStore, StorageResult};
use crate::ontology::OntologyExport;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, PoisonError};

/// SQLite-backed export store
///
/// One row per export, holding the serialized document alongside its
/// headline counts. Thread-safe via internal mutex on the connection.
pub struct SqliteSnapshotStore {
    conn: Mutex<Connection>,
}

impl SqliteSnapshotStore {
    fn init_schema(conn: &Connection) -> StorageResult<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS ontology_exports (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                exported_at TEXT NOT NULL,
                node_count INTEGER NOT NULL,
                relationship_count INTEGER NOT NULL,
                pattern_count INTEGER NOT NULL,
                document_json TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_exports_time
                ON ontology_exports(exported_at);

            PRAGMA journal_mode = WAL;
            "#,
        )?;
        Ok(())
    }

    fn from_connection(conn: Connection) -> StorageResult<Self> {
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl OpenStore for SqliteSnapshotStore {
    fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::from_connection(Connection::open(path)?)
    }

    fn open_in_memory() -> StorageResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }
}

impl SnapshotStore for SqliteSnapshotStore {
    fn save_export(&self, export: &OntologyExport) -> StorageResult<i64> {
        let document = serde_json::to_string(export)?;
        let conn = self.conn();
        conn.execute(
            "INSERT INTO ontology_exports
                (exported_at, node_count, relationship_count, pattern_count, document_json)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                export.exported_at.to_rfc3339(),
                export.metrics.node_count as i64,
                export.metrics.relationship_count as i64,
                export.metrics.pattern_count as i64,
                document,
            ],
        )?;
        let id = conn.last_insert_rowid();
        tracing::debug!(export_id = id, nodes = export.metrics.node_count, "ontology export saved");
        Ok(id)
    }

    fn latest_export(&self) -> StorageResult<Option<OntologyExport>> {
        let document: Option<String> = self
            .conn()
            .query_row(
                "SELECT document_json FROM ontology_exports ORDER BY id DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;

        match document {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn export_count(&self) -> StorageResult<usize> {
        let count: i64 = self
            .conn()
            .query_row("SELECT COUNT(*) FROM ontology_exports", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
