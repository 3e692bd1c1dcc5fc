//! Durable store with an in-memory safety net.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use lawlytic_core::{DocumentRecord, DocumentSummary, RecordPatch};
use tracing::warn;

use crate::{DocumentStore, MemoryStore, StoreError, sort_newest_first};

/// Wraps a primary store; when it fails, work continues against memory.
///
/// - A failed `save` is logged and the record kept in memory, so the caller
///   still gets an id that `get` resolves.
/// - Reads prefer the in-memory copy, which is the newer one when both exist.
/// - A failed `update` patches the record into memory.
pub struct FallbackStore {
    primary: Arc<dyn DocumentStore>,
    fallback: MemoryStore,
}

impl FallbackStore {
    pub fn new(primary: Arc<dyn DocumentStore>) -> Self {
        Self {
            primary,
            fallback: MemoryStore::new(),
        }
    }

    /// Records that only exist in memory because the primary rejected them.
    pub async fn fallback_count(&self) -> usize {
        self.fallback.document_count().await
    }
}

#[async_trait]
impl DocumentStore for FallbackStore {
    async fn save(&self, record: &DocumentRecord) -> Result<String, StoreError> {
        match self.primary.save(record).await {
            Ok(id) => Ok(id),
            Err(e) => {
                warn!(
                    id = %record.id,
                    backend = self.primary.backend(),
                    error = %e,
                    "save failed, keeping document in memory"
                );
                self.fallback.save(record).await
            }
        }
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<DocumentSummary>, StoreError> {
        // Memory holds the newest copy of anything the primary rejected.
        let mut summaries = self.fallback.list_by_owner(owner_id).await?;
        let seen: HashSet<String> = summaries.iter().map(|s| s.id.clone()).collect();
        match self.primary.list_by_owner(owner_id).await {
            Ok(primary) => summaries.extend(primary.into_iter().filter(|s| !seen.contains(&s.id))),
            Err(e) => warn!(owner_id, error = %e, "list failed on primary store"),
        }
        sort_newest_first(&mut summaries);
        Ok(summaries)
    }

    async fn get(&self, id: &str) -> Result<DocumentRecord, StoreError> {
        if self.fallback.contains(id).await {
            return self.fallback.get(id).await;
        }
        self.primary.get(id).await
    }

    async fn update(&self, id: &str, patch: RecordPatch) -> Result<(), StoreError> {
        if self.fallback.contains(id).await {
            return self.fallback.update(id, patch).await;
        }
        match self.primary.update(id, patch.clone()).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => Err(e),
            Err(e) => {
                warn!(id, error = %e, "update failed, keeping patched document in memory");
                let mut record = self.primary.get(id).await?;
                record.apply(patch);
                self.fallback.save(&record).await.map(|_| ())
            }
        }
    }

    fn backend(&self) -> &'static str {
        "fallback"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::record;
    use lawlytic_core::TimelineEvent;

    /// Primary whose writes always fail and whose reads see a fixed set.
    struct ReadOnlyStore {
        inner: MemoryStore,
    }

    #[async_trait]
    impl DocumentStore for ReadOnlyStore {
        async fn save(&self, _: &DocumentRecord) -> Result<String, StoreError> {
            Err(StoreError::Other("disk full".into()))
        }
        async fn list_by_owner(&self, owner: &str) -> Result<Vec<DocumentSummary>, StoreError> {
            self.inner.list_by_owner(owner).await
        }
        async fn get(&self, id: &str) -> Result<DocumentRecord, StoreError> {
            self.inner.get(id).await
        }
        async fn update(&self, id: &str, _: RecordPatch) -> Result<(), StoreError> {
            self.inner.get(id).await?;
            Err(StoreError::Other("disk full".into()))
        }
        fn backend(&self) -> &'static str {
            "read-only"
        }
    }

    /// Primary that is down entirely.
    struct DownStore;

    #[async_trait]
    impl DocumentStore for DownStore {
        async fn save(&self, _: &DocumentRecord) -> Result<String, StoreError> {
            Err(StoreError::Other("connection refused".into()))
        }
        async fn list_by_owner(&self, _: &str) -> Result<Vec<DocumentSummary>, StoreError> {
            Err(StoreError::Other("connection refused".into()))
        }
        async fn get(&self, _: &str) -> Result<DocumentRecord, StoreError> {
            Err(StoreError::Other("connection refused".into()))
        }
        async fn update(&self, _: &str, _: RecordPatch) -> Result<(), StoreError> {
            Err(StoreError::Other("connection refused".into()))
        }
        fn backend(&self) -> &'static str {
            "down"
        }
    }

    async fn read_only_with(records: &[DocumentRecord]) -> ReadOnlyStore {
        let inner = MemoryStore::new();
        for r in records {
            inner.save(r).await.unwrap();
        }
        ReadOnlyStore { inner }
    }

    #[tokio::test]
    async fn passes_through_healthy_primary() {
        let primary = Arc::new(MemoryStore::new());
        let store = FallbackStore::new(primary.clone());

        store.save(&record("doc_1", "alice", 1)).await.unwrap();
        assert!(primary.contains("doc_1").await);
        assert_eq!(store.fallback_count().await, 0);
        assert_eq!(store.get("doc_1").await.unwrap().id, "doc_1");
    }

    #[tokio::test]
    async fn failed_save_lands_in_memory() {
        let store = FallbackStore::new(Arc::new(DownStore));

        let id = store.save(&record("doc_1", "alice", 1)).await.unwrap();
        assert_eq!(id, "doc_1");
        assert_eq!(store.fallback_count().await, 1);
        assert_eq!(store.get("doc_1").await.unwrap().owner_id, "alice");
        assert_eq!(store.list_by_owner("alice").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn list_merges_both_tiers_newest_first() {
        let primary = read_only_with(&[record("doc_a", "alice", 2)]).await;
        let store = FallbackStore::new(Arc::new(primary));
        store.save(&record("doc_b", "alice", 5)).await.unwrap();

        let ids: Vec<String> = store
            .list_by_owner("alice")
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec!["doc_b", "doc_a"]);
    }

    #[tokio::test]
    async fn failed_update_patches_into_memory() {
        let primary = read_only_with(&[record("doc_a", "alice", 2)]).await;
        let store = FallbackStore::new(Arc::new(primary));
        let events = vec![TimelineEvent {
            date: "2026-02-01".into(),
            event: "Notice served.".into(),
            parties: None,
        }];

        store
            .update("doc_a", RecordPatch::timeline(events.clone()))
            .await
            .unwrap();

        assert_eq!(store.get("doc_a").await.unwrap().timeline, Some(events));
        // Listed once even though both tiers now hold it.
        assert_eq!(store.list_by_owner("alice").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_of_unknown_document_is_not_found() {
        let primary = read_only_with(&[]).await;
        let store = FallbackStore::new(Arc::new(primary));
        let err = store
            .update("ghost", RecordPatch::default())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
