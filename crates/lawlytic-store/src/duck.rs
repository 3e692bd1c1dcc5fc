//! DuckDB document store.

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::SecondsFormat;
use duckdb::{Connection, params};
use lawlytic_core::{DocumentRecord, DocumentSummary, RecordPatch};
use tracing::{debug, info};

use crate::{DocumentStore, StoreError};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS documents (
    id          VARCHAR PRIMARY KEY,
    owner_id    VARCHAR NOT NULL,
    file_name   VARCHAR NOT NULL,
    created_at  VARCHAR NOT NULL,
    body        VARCHAR NOT NULL
)";

/// DuckDB store holding one row per document.
///
/// The full record is kept as JSON in `body`; `owner_id` and `created_at` are
/// broken out so listing is a single indexed-order scan. `created_at` is an
/// RFC 3339 UTC string with fixed precision, so string order is time order.
///
/// Supports both in-memory (ephemeral) and persistent (file-backed) modes.
pub struct DuckStore {
    conn: Mutex<Connection>,
}

impl DuckStore {
    /// Open or create a persistent database at `path`.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Open an in-memory database.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        info!(documents = store.count()?, "document table ready");
        Ok(store)
    }

    fn conn(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Other("duckdb connection lock poisoned".into()))
    }

    /// Number of stored documents.
    pub fn count(&self) -> Result<usize, StoreError> {
        let conn = self.conn()?;
        let n: i64 = conn.query_row("SELECT count(*)::BIGINT FROM documents", [], |row| {
            row.get(0)
        })?;
        Ok(n as usize)
    }

    fn load(conn: &Connection, id: &str) -> Result<DocumentRecord, StoreError> {
        let mut stmt = conn.prepare("SELECT body FROM documents WHERE id = ?")?;
        let body = stmt
            .query_map(params![id], |row| row.get::<_, String>(0))?
            .next()
            .transpose()?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        Ok(serde_json::from_str(&body)?)
    }

    fn write(conn: &Connection, record: &DocumentRecord) -> Result<(), StoreError> {
        let body = serde_json::to_string(record)?;
        let created_at = record
            .created_at
            .to_rfc3339_opts(SecondsFormat::Micros, true);
        conn.execute(
            "INSERT OR REPLACE INTO documents (id, owner_id, file_name, created_at, body)
             VALUES (?, ?, ?, ?, ?)",
            params![record.id, record.owner_id, record.file_name, created_at, body],
        )?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for DuckStore {
    async fn save(&self, record: &DocumentRecord) -> Result<String, StoreError> {
        let conn = self.conn()?;
        Self::write(&conn, record)?;
        debug!(id = %record.id, "document saved");
        Ok(record.id.clone())
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<DocumentSummary>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT body FROM documents WHERE owner_id = ? ORDER BY created_at DESC, id DESC",
        )?;
        let bodies = stmt
            .query_map(params![owner_id], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<String>, _>>()?;

        bodies
            .iter()
            .map(|body| {
                let record: DocumentRecord = serde_json::from_str(body)?;
                Ok(record.to_summary())
            })
            .collect()
    }

    async fn get(&self, id: &str) -> Result<DocumentRecord, StoreError> {
        let conn = self.conn()?;
        Self::load(&conn, id)
    }

    async fn update(&self, id: &str, patch: RecordPatch) -> Result<(), StoreError> {
        let conn = self.conn()?;
        let mut record = Self::load(&conn, id)?;
        record.apply(patch);
        let body = serde_json::to_string(&record)?;
        conn.execute(
            "UPDATE documents SET body = ? WHERE id = ?",
            params![body, id],
        )?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "duckdb"
    }
}
