//! Durable storage for uploaded sources and rendered summaries.
//!
//! Every stored name carries a random token, so concurrent requests never address the same
//! key and no locking is needed.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

/// Errors raised by document storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The requested name is not a plain file name.
    #[error("Invalid document name: {0}")]
    InvalidName(String),
    /// No document exists under the requested name.
    #[error("Document not found: {0}")]
    NotFound(String),
    /// Filesystem operation failed.
    #[error("Storage I/O failed for {path}: {source}")]
    Io {
        /// Path being accessed.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Collaborator persisting uploads and rendered documents.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Persist an uploaded source under a unique name derived from `original_name`.
    ///
    /// Returns the local path of the stored file for extraction.
    async fn save_upload(&self, original_name: &str, bytes: &[u8])
    -> Result<PathBuf, StorageError>;

    /// Persist a rendered document under `name`.
    async fn save_rendered(&self, name: &str, bytes: &[u8]) -> Result<(), StorageError>;

    /// Read a rendered document back by name.
    async fn open_rendered(&self, name: &str) -> Result<Vec<u8>, StorageError>;
}

/// Filesystem-backed store with separate upload and output directories.
#[derive(Debug, Clone)]
pub struct FsDocumentStore {
    upload_dir: PathBuf,
    output_dir: PathBuf,
}

impl FsDocumentStore {
    /// Create a store rooted at the given directories. Directories are created on first write.
    pub fn new(upload_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    async fn write(dir: &Path, name: &str, bytes: &[u8]) -> Result<PathBuf, StorageError> {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|source| io_error(dir, source))?;
        let path = dir.join(name);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| io_error(&path, source))?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "Stored document");
        Ok(path)
    }
}

#[async_trait]
impl DocumentStore for FsDocumentStore {
    async fn save_upload(
        &self,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<PathBuf, StorageError> {
        let name = upload_name(original_name);
        Self::write(&self.upload_dir, &name, bytes).await
    }

    async fn save_rendered(&self, name: &str, bytes: &[u8]) -> Result<(), StorageError> {
        validate_name(name)?;
        Self::write(&self.output_dir, name, bytes).await.map(|_| ())
    }

    async fn open_rendered(&self, name: &str) -> Result<Vec<u8>, StorageError> {
        validate_name(name)?;
        let path = self.output_dir.join(name);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(name.to_string()))
            }
            Err(source) => Err(io_error(&path, source)),
        }
    }
}

/// Short random hex token used to keep stored names unique.
pub(crate) fn unique_token(len: usize) -> String {
    let mut token = Uuid::new_v4().simple().to_string();
    token.truncate(len);
    token
}

/// Unique storage name for an upload: `<6 hex>_<sanitised original name>`.
pub(crate) fn upload_name(original_name: &str) -> String {
    let base = Path::new(original_name)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("upload");
    let sanitized: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{}_{}", unique_token(6), sanitized)
}

/// Accept only plain file names: no separators, no parent references.
pub fn validate_name(name: &str) -> Result<(), StorageError> {
    let plain = !name.is_empty()
        && !name.contains(['/', '\\'])
        && !name.contains("..")
        && name != ".";
    if plain {
        Ok(())
    } else {
        Err(StorageError::InvalidName(name.to_string()))
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.display().to_string(),
        source,
    }
}
