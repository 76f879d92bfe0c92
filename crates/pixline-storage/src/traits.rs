//! Storage abstraction trait.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

use pixline_core::{ArtifactDescriptor, ArtifactId, ArtifactKind, OutputFormat};

/// Storage operation errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("staging write failed: {0}")]
    Stage(String),

    #[error("publish failed: {0}")]
    Publish(String),

    #[error("remove failed: {0}")]
    Remove(String),

    #[error("path outside store root: {0}")]
    InvalidPath(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// On-disk lifecycle of original and derived files.
///
/// Implementations must guarantee that no publicly addressable path ever
/// resolves to a file that is still being written: `publish` moves a fully
/// written staged file into place with an atomic rename, never a write at
/// the destination.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Write bytes to a private staged location, not reachable by any
    /// public-serving path. The file is fully flushed before the path is
    /// returned.
    async fn stage(&self, bytes: Vec<u8>) -> StorageResult<PathBuf>;

    /// Atomically move a staged file to its servable location under the
    /// allocated identifier. Either fully succeeds (descriptor returned) or
    /// fully fails (nothing visible at the destination).
    async fn publish(
        &self,
        staged: &Path,
        id: ArtifactId,
        kind: ArtifactKind,
        format: OutputFormat,
    ) -> StorageResult<ArtifactDescriptor>;

    /// Best-effort delete of a staged file. A stray staged file does not
    /// affect the correctness of published artifacts, so failures are
    /// logged, never surfaced.
    async fn discard(&self, staged: &Path);

    /// Delete a published artifact. Idempotent: removing an identifier that
    /// was never published (or was already removed) succeeds.
    async fn remove(&self, id: ArtifactId) -> StorageResult<()>;
}
