//! Multi-step write operations that span a database transaction and the
//! file store.
//!
//! Each service validates first, then opens one transaction, runs its
//! writes against it, and hands the result to [`settle`].

pub mod accounts;
pub mod discount_codes;
pub mod games;

use market_core::storage::{self, FileCleanup, FileStore, TxOutcome};
use sqlx::{Postgres, Transaction};

use crate::error::AppResult;
use crate::handlers::form::Upload;

/// Commit or roll back `tx` according to `result`, then run the matching
/// file cleanup.
///
/// A failed commit counts as a rollback.
pub async fn settle<T>(
    tx: Transaction<'_, Postgres>,
    result: AppResult<T>,
    cleanup: FileCleanup,
    files: &dyn FileStore,
) -> AppResult<T> {
    let result = match result {
        Ok(value) => tx.commit().await.map(|()| value).map_err(Into::into),
        Err(e) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::warn!(error = %rollback_err, "Rollback failed");
            }
            Err(e)
        }
    };

    let outcome = if result.is_ok() {
        TxOutcome::Committed
    } else {
        TxOutcome::RolledBack
    };
    let failed = cleanup.finish(files, outcome).await;
    if !failed.is_empty() {
        tracing::warn!(count = failed.len(), ?outcome, "Some files could not be cleaned up");
    }
    result
}

/// Store `upload` under `directory` and register it for deletion on
/// rollback. Returns the stored path.
pub async fn store_upload(
    files: &dyn FileStore,
    cleanup: &mut FileCleanup,
    directory: &str,
    upload: &Upload,
) -> AppResult<String> {
    let extension = storage::image_extension(&upload.filename)?;
    let path = files.put(directory, &extension, &upload.bytes).await?;
    cleanup.delete_on_failure(path.clone());
    Ok(path)
}

/// Reject unsupported uploads before any transaction opens.
pub fn check_images<'a>(uploads: impl IntoIterator<Item = &'a Upload>) -> AppResult<()> {
    for upload in uploads {
        storage::image_extension(&upload.filename)?;
    }
    Ok(())
}
