//! Uploaded file storage and transaction-scoped file cleanup.
//!
//! The database transaction and the file store are not atomic together.
//! [`FileCleanup`] records which files must go when the transaction commits
//! (superseded files) and which must go when it rolls back (files written
//! during the attempt), and drains exactly one of the two lists.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Directory for account representative and gallery images.
pub const ACCOUNT_IMAGES_DIR: &str = "account-images";

/// Directory for game cover images.
pub const GAME_IMAGES_DIR: &str = "game-images";

/// Accepted image file extensions (lowercase).
pub const SUPPORTED_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "gif"];

/// Return the lowercase extension of `filename` if it is a supported image.
pub fn image_extension(filename: &str) -> Result<String, CoreError> {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    if SUPPORTED_IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(CoreError::Validation(format!(
            "Unsupported image format '.{ext}'. Supported: {}",
            SUPPORTED_IMAGE_EXTENSIONS.join(", ")
        )))
    }
}

// ---------------------------------------------------------------------------
// File store
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Invalid storage path: {0}")]
    InvalidPath(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Where uploaded files live. Paths are relative to the store root.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Write `bytes` under `directory` with a generated name; returns the
    /// stored relative path.
    async fn put(&self, directory: &str, extension: &str, bytes: &[u8])
        -> Result<String, StorageError>;

    /// Delete a stored file. Deleting a missing file is not an error.
    async fn delete(&self, path: &str) -> Result<(), StorageError>;

    async fn exists(&self, path: &str) -> Result<bool, StorageError>;

    /// Whether the store can accept writes right now.
    async fn is_ready(&self) -> bool;
}

/// [`FileStore`] backed by a local directory.
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Join a relative path onto the root, refusing anything that could
    /// escape it.
    fn resolve(&self, relative: &str) -> Result<PathBuf, StorageError> {
        let path = Path::new(relative);
        let safe = !relative.is_empty()
            && path
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if safe {
            Ok(self.root.join(path))
        } else {
            Err(StorageError::InvalidPath(relative.to_string()))
        }
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn put(
        &self,
        directory: &str,
        extension: &str,
        bytes: &[u8],
    ) -> Result<String, StorageError> {
        let relative = format!("{directory}/{}.{extension}", uuid::Uuid::new_v4());
        let full = self.resolve(&relative)?;
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&full, bytes).await?;
        tracing::debug!(path = %relative, size = bytes.len(), "Stored file");
        Ok(relative)
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        let full = self.resolve(path)?;
        match tokio::fs::remove_file(&full).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, path: &str) -> Result<bool, StorageError> {
        let full = self.resolve(path)?;
        Ok(tokio::fs::try_exists(&full).await?)
    }

    async fn is_ready(&self) -> bool {
        match tokio::fs::metadata(&self.root).await {
            Ok(meta) => meta.is_dir() && !meta.permissions().readonly(),
            Err(_) => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Cleanup
// ---------------------------------------------------------------------------

/// Outcome of the transaction a [`FileCleanup`] is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxOutcome {
    Committed,
    RolledBack,
}

/// Pending file deletions tied to one transaction.
///
/// [`FileCleanup::finish`] consumes the helper, so each list is drained at
/// most once.
#[derive(Debug, Default)]
#[must_use = "call `finish` once the transaction outcome is known"]
pub struct FileCleanup {
    on_success: Vec<String>,
    on_failure: Vec<String>,
}

impl FileCleanup {
    pub fn new() -> Self {
        Self::default()
    }

    /// A file that is superseded once the transaction commits.
    pub fn delete_on_success(&mut self, path: impl Into<String>) {
        self.on_success.push(path.into());
    }

    /// A file written during the attempt; removed if the transaction fails.
    pub fn delete_on_failure(&mut self, path: impl Into<String>) {
        self.on_failure.push(path.into());
    }

    pub fn pending_on_success(&self) -> &[String] {
        &self.on_success
    }

    pub fn pending_on_failure(&self) -> &[String] {
        &self.on_failure
    }

    /// Delete the list matching `outcome` and discard the other.
    ///
    /// Best effort: a failed deletion is logged and skipped. Returns the
    /// paths that could not be deleted.
    pub async fn finish(self, store: &dyn FileStore, outcome: TxOutcome) -> Vec<String> {
        let targets = match outcome {
            TxOutcome::Committed => self.on_success,
            TxOutcome::RolledBack => self.on_failure,
        };
        let mut failed = Vec::new();
        for path in targets {
            if let Err(e) = store.delete(&path).await {
                tracing::warn!(path = %path, error = %e, ?outcome, "Failed to delete file");
                failed.push(path);
            }
        }
        failed
    }
}
