//! Analyse pipeline: read a file from disk → infer its type → upload through the service.

use std::path::Path;
use std::time::Instant;

use anyhow::Context;
use lawlytic_service::{DocumentService, UploadOutcome, content_type_for};

#[derive(Debug)]
pub struct AnalyzeStats {
    pub outcome: UploadOutcome,
    pub file_name: String,
    pub bytes: usize,
    pub elapsed_secs: f64,
}

/// Run one file through extraction, clause analysis, and storage.
pub async fn run_analyze(
    service: &DocumentService,
    path: &Path,
    owner: &str,
    content_type: Option<&str>,
) -> anyhow::Result<AnalyzeStats> {
    let start = Instant::now();

    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    eprintln!("  Read {} bytes from {}", bytes.len(), path.display());

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    let content_type = resolve_content_type(&file_name, content_type)?;

    eprintln!("  Analysing as {content_type}...");
    let outcome = service
        .upload(owner, &file_name, &content_type, &bytes)
        .await
        .with_context(|| format!("analysing {file_name}"))?;

    Ok(AnalyzeStats {
        outcome,
        file_name,
        bytes: bytes.len(),
        elapsed_secs: start.elapsed().as_secs_f64(),
    })
}

/// An explicit `--content-type` wins; otherwise go by extension.
fn resolve_content_type(file_name: &str, explicit: Option<&str>) -> anyhow::Result<String> {
    match explicit {
        Some(ct) => Ok(ct.to_string()),
        None => content_type_for(file_name)
            .map(str::to_string)
            .with_context(|| format!("cannot tell the type of {file_name}; pass --content-type")),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use lawlytic_ai::mock::ScriptedGateway;
    use lawlytic_service::ServiceConfig;
    use lawlytic_store::{MemoryBlobStore, MemoryStore};
    use tempfile::TempDir;

    #[test]
    fn explicit_content_type_wins() {
        assert_eq!(
            resolve_content_type("notes.bin", Some("text/plain")).unwrap(),
            "text/plain"
        );
        assert_eq!(
            resolve_content_type("lease.pdf", None).unwrap(),
            "application/pdf"
        );
        assert!(resolve_content_type("lease.docx", None).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn analyses_file_from_disk() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nda.txt");
        std::fs::write(
            &path,
            "The Recipient shall keep all Confidential Information secret.\n\
             This Agreement is governed by the laws of England and Wales.\n",
        )
        .unwrap();

        let gateway = ScriptedGateway::echoing("Green");
        let service = DocumentService::new(
            Arc::new(gateway.clone()),
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryBlobStore::new()),
            ServiceConfig::default(),
        );

        let stats = run_analyze(&service, &path, "alice", None).await.unwrap();
        assert_eq!(stats.file_name, "nda.txt");
        assert_eq!(stats.outcome.analysis.len(), 2);
        assert_eq!(gateway.call_count(), 1);

        let stored = service.get(&stats.outcome.document_id).await.unwrap();
        assert_eq!(stored.file_name, "nda.txt");
    }

    #[tokio::test]
    async fn missing_file_is_reported_with_path() {
        let service = DocumentService::new(
            Arc::new(ScriptedGateway::echoing("Green")),
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryBlobStore::new()),
            ServiceConfig::default(),
        );
        let err = run_analyze(&service, Path::new("/no/such/lease.txt"), "alice", None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("/no/such/lease.txt"));
    }
}
