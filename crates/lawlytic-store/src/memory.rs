//! Non-durable document store.

use std::collections::HashMap;

use async_trait::async_trait;
use lawlytic_core::{DocumentRecord, DocumentSummary, RecordPatch};
use tokio::sync::RwLock;

use crate::{DocumentStore, StoreError, sort_newest_first};

/// Records held in process memory; lost on exit.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, DocumentRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn document_count(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.records.read().await.contains_key(id)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn save(&self, record: &DocumentRecord) -> Result<String, StoreError> {
        self.records
            .write()
            .await
            .insert(record.id.clone(), record.clone());
        Ok(record.id.clone())
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<DocumentSummary>, StoreError> {
        let mut summaries: Vec<DocumentSummary> = self
            .records
            .read()
            .await
            .values()
            .filter(|r| r.owner_id == owner_id)
            .map(DocumentRecord::to_summary)
            .collect();
        sort_newest_first(&mut summaries);
        Ok(summaries)
    }

    async fn get(&self, id: &str) -> Result<DocumentRecord, StoreError> {
        self.records
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn update(&self, id: &str, patch: RecordPatch) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        record.apply(patch);
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
