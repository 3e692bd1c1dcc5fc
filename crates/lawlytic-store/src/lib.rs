//! Storage layer: the document store facade and blob storage for original uploads.
//!
//! Callers hold an `Arc<dyn DocumentStore>` chosen once at startup by
//! [`open_document_store`] and never branch on the backend behind it.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use lawlytic_core::{DocumentRecord, DocumentSummary, RecordPatch};
use tracing::{info, warn};

mod blob;
mod error;
mod fallback;
mod memory;

pub use blob::{BlobStore, FsBlobStore, MemoryBlobStore};
pub use error::StoreError;
pub use fallback::FallbackStore;
pub use memory::MemoryStore;

#[cfg(feature = "duckdb")]
mod duck;
#[cfg(feature = "duckdb")]
pub use duck::DuckStore;

/// Persistence for analysed documents.
///
/// Writes are readable by subsequent calls on the same store; nothing
/// stronger is promised.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Store `record` under `record.id`, replacing any previous version.
    async fn save(&self, record: &DocumentRecord) -> Result<String, StoreError>;

    /// Summaries of every document owned by `owner_id`, newest first.
    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<DocumentSummary>, StoreError>;

    /// Fetch a record; [`StoreError::NotFound`] if absent.
    async fn get(&self, id: &str) -> Result<DocumentRecord, StoreError>;

    /// Apply `patch` to an existing record; [`StoreError::NotFound`] if absent.
    async fn update(&self, id: &str, patch: RecordPatch) -> Result<(), StoreError>;

    /// Short backend name for logs.
    fn backend(&self) -> &'static str;
}

/// Order summaries newest first, ties broken by id for a stable listing.
pub(crate) fn sort_newest_first(summaries: &mut [DocumentSummary]) {
    summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
}

/// Pick the document store for this process.
///
/// With a database path (and the `duckdb` feature) the durable store is used,
/// wrapped in a [`FallbackStore`] so later write failures degrade to memory.
/// If it cannot be opened, or no path is given, records live in memory only.
pub fn open_document_store(db_path: Option<&Path>) -> Arc<dyn DocumentStore> {
    match db_path {
        Some(path) => open_durable(path),
        None => {
            info!("no database configured, documents are kept in memory");
            Arc::new(MemoryStore::new())
        }
    }
}

#[cfg(feature = "duckdb")]
fn open_durable(path: &Path) -> Arc<dyn DocumentStore> {
    match DuckStore::open(path) {
        Ok(store) => {
            info!(path = %path.display(), "opened document database");
            Arc::new(FallbackStore::new(Arc::new(store)))
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "document database unavailable, falling back to memory");
            Arc::new(MemoryStore::new())
        }
    }
}

#[cfg(not(feature = "duckdb"))]
fn open_durable(path: &Path) -> Arc<dyn DocumentStore> {
    warn!(
        path = %path.display(),
        "built without the duckdb feature, documents are kept in memory"
    );
    Arc::new(MemoryStore::new())
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::record;

    #[tokio::test]
    async fn no_path_uses_memory() {
        let store = open_document_store(None);
        assert_eq!(store.backend(), "memory");
        store.save(&record("doc_a", "u1", 1)).await.unwrap();
        assert_eq!(store.get("doc_a").await.unwrap().owner_id, "u1");
    }

    #[cfg(not(feature = "duckdb"))]
    #[tokio::test]
    async fn path_without_duckdb_uses_memory() {
        let store = open_document_store(Some(Path::new("/tmp/lawlytic-test.duckdb")));
        assert_eq!(store.backend(), "memory");
    }

    #[cfg(feature = "duckdb")]
    #[tokio::test]
    async fn path_with_duckdb_is_durable() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = open_document_store(Some(&tmp.path().join("docs.duckdb")));
        assert_eq!(store.backend(), "fallback");
    }

    #[cfg(feature = "duckdb")]
    #[tokio::test]
    async fn unopenable_path_uses_memory() {
        let store = open_document_store(Some(Path::new("/nonexistent/dir/docs.duckdb")));
        assert_eq!(store.backend(), "memory");
    }
}
