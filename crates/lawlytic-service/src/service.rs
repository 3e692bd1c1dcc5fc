//! Document operations: upload and analyse, list, detail, chat, timeline.

use std::sync::Arc;

use chrono::Utc;
use lawlytic_ai::{
    BatchAnalyzer, ClauseScheduler, LlmGateway, RetryPolicy, SchedulerConfig, answer_question,
    extract_timeline,
};
use lawlytic_core::{
    ClauseAnalysis, DocumentRecord, DocumentSummary, RecordPatch, RiskCounts, TimelineEvent,
    describe_counts, extract_clauses,
};
use lawlytic_store::{BlobStore, DocumentStore, StoreError};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::extract::{ExtractError, TextExtractor};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("file is not readable text: {0}")]
    InvalidText(String),

    #[error("no meaningful clauses found")]
    NoClauses,

    #[error("question is empty")]
    EmptyQuestion,

    #[error("document not found: {0}")]
    NotFound(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => Self::NotFound(id),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<ExtractError> for ServiceError {
    fn from(e: ExtractError) -> Self {
        match e {
            ExtractError::Unsupported(_) | ExtractError::NotPdf => {
                Self::UnsupportedType(e.to_string())
            }
            ExtractError::InvalidUtf8 => Self::InvalidText(e.to_string()),
            ExtractError::Tool(_) | ExtractError::Io(_) => Self::Internal(e.to_string()),
        }
    }
}

/// Result of a successful upload.
#[derive(Debug, Clone, Serialize)]
pub struct UploadOutcome {
    pub document_id: String,
    pub analysis: Vec<ClauseAnalysis>,
}

#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    pub retry: RetryPolicy,
    pub scheduler: SchedulerConfig,
}

/// New document id: `doc_` followed by 32 hex digits.
pub fn new_document_id() -> String {
    format!("doc_{}", Uuid::new_v4().simple())
}

/// The document operations, over one gateway, document store, and blob store.
pub struct DocumentService {
    gateway: Arc<dyn LlmGateway>,
    scheduler: ClauseScheduler,
    store: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStore>,
    extractor: TextExtractor,
}

impl DocumentService {
    pub fn new(
        gateway: Arc<dyn LlmGateway>,
        store: Arc<dyn DocumentStore>,
        blobs: Arc<dyn BlobStore>,
        config: ServiceConfig,
    ) -> Self {
        let analyzer = BatchAnalyzer::new(gateway.clone(), config.retry);
        Self {
            gateway,
            scheduler: ClauseScheduler::new(analyzer, config.scheduler),
            store,
            blobs,
            extractor: TextExtractor::default(),
        }
    }

    pub fn with_extractor(mut self, extractor: TextExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Extract, analyse, and store an uploaded file.
    ///
    /// Fails only when no analysis can be produced at all: an unsupported or
    /// unreadable file, or one without clauses. Model faults show up as Gray
    /// entries in the returned analysis.
    pub async fn upload(
        &self,
        owner_id: &str,
        file_name: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<UploadOutcome, ServiceError> {
        let full_text = self.extractor.extract(bytes, content_type).await?;
        let clauses = extract_clauses(&full_text);
        if clauses.is_empty() {
            return Err(ServiceError::NoClauses);
        }
        info!(file_name, clauses = clauses.len(), "analysing upload");

        let analysis = self.scheduler.analyze_clauses(&clauses).await;

        let blob_ref = match self.blobs.put(owner_id, file_name, bytes).await {
            Ok(r) => Some(r),
            Err(e) => {
                warn!(file_name, error = %e, "could not store original file");
                None
            }
        };

        let risk_counts = RiskCounts::tally(&analysis);
        let record = DocumentRecord {
            id: new_document_id(),
            owner_id: owner_id.to_string(),
            file_name: file_name.to_string(),
            blob_ref,
            created_at: Utc::now(),
            full_text,
            summary: Some(describe_counts(analysis.len(), &risk_counts)),
            risk_counts,
            analysis,
            timeline: None,
        };
        let document_id = match self.store.save(&record).await {
            Ok(id) => id,
            Err(e) => {
                if let Some(blob_ref) = &record.blob_ref {
                    if let Err(cleanup) = self.blobs.delete(blob_ref).await {
                        warn!(blob = %blob_ref, error = %cleanup, "could not remove orphaned original file");
                    }
                }
                return Err(e.into());
            }
        };

        let fallbacks = record.analysis.iter().filter(|a| a.is_fallback()).count();
        info!(
            document_id = %document_id,
            clauses = record.analysis.len(),
            fallbacks,
            backend = self.store.backend(),
            "document processed"
        );

        Ok(UploadOutcome {
            document_id,
            analysis: record.analysis,
        })
    }

    pub async fn list(&self, owner_id: &str) -> Result<Vec<DocumentSummary>, ServiceError> {
        Ok(self.store.list_by_owner(owner_id).await?)
    }

    pub async fn get(&self, id: &str) -> Result<DocumentRecord, ServiceError> {
        Ok(self.store.get(id).await?)
    }

    /// Answer a question from the stored document's full text.
    pub async fn chat(&self, id: &str, question: &str) -> Result<String, ServiceError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(ServiceError::EmptyQuestion);
        }
        let record = self.store.get(id).await?;
        Ok(answer_question(self.gateway.as_ref(), &record.full_text, question).await)
    }

    /// Generate the document's timeline from its clause texts and store it.
    ///
    /// Regenerated on every call; a model fault yields (and stores) an empty
    /// timeline.
    pub async fn timeline(&self, id: &str) -> Result<Vec<TimelineEvent>, ServiceError> {
        let record = self.store.get(id).await?;
        let text = if record.analysis.is_empty() {
            record.full_text.clone()
        } else {
            record.clause_text()
        };

        let events = extract_timeline(self.gateway.as_ref(), &text).await;
        self.store
            .update(id, RecordPatch::timeline(events.clone()))
            .await?;
        info!(document_id = id, events = events.len(), "timeline stored");
        Ok(events)
    }
}
