//! Local-disk blob sink for attachment uploads.
//!
//! Blobs are written before the owning database transaction commits;
//! on a failed commit the service removes them again, so an orphaned
//! blob can only survive a crash in that window. Metadata rows are the
//! source of truth and never point at a missing blob.

use std::path::{Path, PathBuf};

use tokio::fs;
use uuid::Uuid;

use crate::config::MAX_ATTACHMENT_BYTES;
use crate::errors::{AppError, AppResult};

/// Filesystem-backed blob store rooted at the configured upload dir.
#[derive(Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the upload directory if it does not exist yet.
    pub async fn ensure_root(&self) -> AppResult<()> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| AppError::blob(format!("Failed to create upload dir: {}", e)))
    }

    /// Persist raw bytes under a collision-free stored name and return it.
    ///
    /// The stored name is a fresh UUID prefixed to a sanitized version of
    /// the client filename, so uploads can never overwrite each other or
    /// escape the upload directory.
    pub async fn store(&self, file_name: &str, bytes: &[u8]) -> AppResult<String> {
        if bytes.is_empty() {
            return Err(AppError::validation("Attachment is empty"));
        }
        if bytes.len() > MAX_ATTACHMENT_BYTES {
            return Err(AppError::validation(format!(
                "Attachment exceeds maximum size of {} bytes",
                MAX_ATTACHMENT_BYTES
            )));
        }

        let stored_name = format!("{}_{}", Uuid::new_v4(), sanitize_file_name(file_name));
        let path = self.root.join(&stored_name);

        fs::write(&path, bytes)
            .await
            .map_err(|e| AppError::blob(format!("Failed to write blob: {}", e)))?;

        Ok(stored_name)
    }

    /// Remove a previously stored blob. Missing blobs are not an error,
    /// so cleanup after a failed transaction is idempotent.
    pub async fn remove(&self, stored_name: &str) -> AppResult<()> {
        let path = self.root.join(stored_name);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::blob(format!("Failed to remove blob: {}", e))),
        }
    }

    pub fn path_for(&self, stored_name: &str) -> PathBuf {
        self.root.join(stored_name)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Strip path separators and control characters from a client filename.
fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !matches!(c, '/' | '\\' | '\0') && !c.is_control())
        .collect();
    // Reject names that are only dots after cleaning.
    let trimmed = cleaned.trim_matches('.').trim();
    if trimmed.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_path_components() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "....etcpasswd");
        assert_eq!(sanitize_file_name("photo.png"), "photo.png");
        assert_eq!(sanitize_file_name("a/b\\c.txt"), "abc.txt");
    }

    #[test]
    fn sanitize_rejects_degenerate_names() {
        assert_eq!(sanitize_file_name(""), "upload");
        assert_eq!(sanitize_file_name("..."), "upload");
    }

    #[tokio::test]
    async fn store_and_remove_round_trip() {
        let dir = std::env::temp_dir().join(format!("blobs-{}", Uuid::new_v4()));
        let store = FileStore::new(&dir);
        store.ensure_root().await.unwrap();

        let stored = store.store("doc.pdf", b"content").await.unwrap();
        assert!(stored.ends_with("doc.pdf"));
        assert!(store.path_for(&stored).exists());

        store.remove(&stored).await.unwrap();
        assert!(!store.path_for(&stored).exists());
        // Removing again is fine.
        store.remove(&stored).await.unwrap();

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn store_rejects_empty_payload() {
        let store = FileStore::new(std::env::temp_dir());
        let err = store.store("x.bin", b"").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
