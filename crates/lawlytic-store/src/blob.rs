//! Blob storage for original uploaded files.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::StoreError;

/// Opaque byte storage keyed by a reference string the store hands out.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` for `owner_id`, returning a reference for [`get`](Self::get).
    async fn put(&self, owner_id: &str, file_name: &str, bytes: &[u8]) -> Result<String, StoreError>;

    /// Fetch bytes by reference; [`StoreError::BlobNotFound`] if absent.
    async fn get(&self, blob_ref: &str) -> Result<Vec<u8>, StoreError>;

    /// Remove a blob; [`StoreError::BlobNotFound`] if absent.
    async fn delete(&self, blob_ref: &str) -> Result<(), StoreError>;
}

/// Reference of the form `owner/<uuid>-<name>`, safe to use as a relative path.
fn blob_ref(owner_id: &str, file_name: &str) -> String {
    format!(
        "{}/{}-{}",
        sanitize(owner_id),
        Uuid::new_v4().simple(),
        sanitize(file_name)
    )
}

fn sanitize(segment: &str) -> String {
    let cleaned: String = segment
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "_".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Blobs as files under a root directory.
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, blob_ref: &str) -> Result<PathBuf, StoreError> {
        let escapes = blob_ref.starts_with('/')
            || blob_ref
                .split('/')
                .any(|part| part.is_empty() || part == "..");
        if escapes {
            return Err(StoreError::BlobNotFound(blob_ref.to_string()));
        }
        Ok(self.root.join(blob_ref))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(&self, owner_id: &str, file_name: &str, bytes: &[u8]) -> Result<String, StoreError> {
        let reference = blob_ref(owner_id, file_name);
        let path = self.resolve(&reference)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        debug!(blob = %reference, bytes = bytes.len(), "blob stored");
        Ok(reference)
    }

    async fn get(&self, blob_ref: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.resolve(blob_ref)?;
        tokio::fs::read(&path)
            .await
            .map_err(|e| not_found_or_io(e, blob_ref))
    }

    async fn delete(&self, blob_ref: &str) -> Result<(), StoreError> {
        let path = self.resolve(blob_ref)?;
        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| not_found_or_io(e, blob_ref))?;
        debug!(blob = %blob_ref, "blob removed");
        Ok(())
    }
}

fn not_found_or_io(e: std::io::Error, blob_ref: &str) -> StoreError {
    match e.kind() {
        std::io::ErrorKind::NotFound => StoreError::BlobNotFound(blob_ref.to_string()),
        _ => StoreError::Io(e),
    }
}

/// Blobs held in process memory.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn blob_count(&self) -> usize {
        self.blobs.read().await.len()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, owner_id: &str, file_name: &str, bytes: &[u8]) -> Result<String, StoreError> {
        let reference = blob_ref(owner_id, file_name);
        self.blobs
            .write()
            .await
            .insert(reference.clone(), bytes.to_vec());
        Ok(reference)
    }

    async fn get(&self, blob_ref: &str) -> Result<Vec<u8>, StoreError> {
        self.blobs
            .read()
            .await
            .get(blob_ref)
            .cloned()
            .ok_or_else(|| StoreError::BlobNotFound(blob_ref.to_string()))
    }

    async fn delete(&self, blob_ref: &str) -> Result<(), StoreError> {
        self.blobs
            .write()
            .await
            .remove(blob_ref)
            .map(|_| ())
            .ok_or_else(|| StoreError::BlobNotFound(blob_ref.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn refs_are_scoped_by_owner_and_sanitized() {
        let r = blob_ref("user 1", "../lease agreement.pdf");
        let (owner, rest) = r.split_once('/').unwrap();
        assert_eq!(owner, "user_1");
        assert!(rest.ends_with("-_lease_agreement.pdf"));
        assert!(!r.contains(".."));
    }

    #[test]
    fn sanitize_never_yields_empty() {
        assert_eq!(sanitize(""), "_");
        assert_eq!(sanitize(".."), "_");
        assert_eq!(sanitize("nda.txt"), "nda.txt");
    }

    #[tokio::test]
    async fn fs_put_then_get() {
        let tmp = TempDir::new().unwrap();
        let store = FsBlobStore::new(tmp.path());

        let reference = store.put("alice", "nda.txt", b"Mutual NDA").await.unwrap();
        assert!(reference.starts_with("alice/"));
        assert!(tmp.path().join(&reference).exists());
        assert_eq!(store.get(&reference).await.unwrap(), b"Mutual NDA");
    }

    #[tokio::test]
    async fn fs_same_name_gets_distinct_refs() {
        let tmp = TempDir::new().unwrap();
        let store = FsBlobStore::new(tmp.path());

        let a = store.put("alice", "nda.txt", b"v1").await.unwrap();
        let b = store.put("alice", "nda.txt", b"v2").await.unwrap();
        assert_ne!(a, b);
        assert_eq!(store.get(&a).await.unwrap(), b"v1");
    }

    #[tokio::test]
    async fn fs_delete_removes_file() {
        let tmp = TempDir::new().unwrap();
        let store = FsBlobStore::new(tmp.path());
        let reference = store.put("alice", "nda.txt", b"v1").await.unwrap();

        store.delete(&reference).await.unwrap();
        assert!(!tmp.path().join(&reference).exists());
        assert!(store.delete(&reference).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn fs_missing_blob_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let store = FsBlobStore::new(tmp.path());
        assert!(matches!(
            store.get("alice/missing.txt").await,
            Err(StoreError::BlobNotFound(_))
        ));
    }

    #[tokio::test]
    async fn fs_rejects_escaping_refs() {
        let tmp = TempDir::new().unwrap();
        let store = FsBlobStore::new(tmp.path().join("blobs"));
        for bad in ["../secret", "/etc/passwd", "alice//x", "alice/../../x"] {
            assert!(store.get(bad).await.unwrap_err().is_not_found(), "{bad}");
        }
    }

    #[tokio::test]
    async fn memory_put_then_get() {
        let store = MemoryBlobStore::new();
        let reference = store.put("bob", "lease.pdf", b"%PDF-1.4").await.unwrap();
        assert_eq!(store.get(&reference).await.unwrap(), b"%PDF-1.4");
        assert_eq!(store.blob_count().await, 1);
        assert!(store.get("bob/other").await.is_err());

        store.delete(&reference).await.unwrap();
        assert_eq!(store.blob_count().await, 0);
        assert!(store.delete(&reference).await.is_err());
    }
}
