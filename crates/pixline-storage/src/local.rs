//! Local filesystem artifact store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use pixline_core::{ArtifactDescriptor, ArtifactId, ArtifactKind, OutputFormat};

use crate::traits::{ArtifactStore, StorageError, StorageResult};

/// Artifact store backed by two directories on the same filesystem.
///
/// `staging_dir` holds in-flight files and must never be exposed by a file
/// server; `public_dir` holds published artifacts served under `base_url`.
/// Publish is a `rename(2)`, so both directories must live on the same
/// filesystem for the atomicity guarantee to hold.
#[derive(Clone)]
pub struct LocalArtifactStore {
    staging_dir: PathBuf,
    public_dir: PathBuf,
    base_url: String,
}

impl LocalArtifactStore {
    pub async fn new(
        staging_dir: impl Into<PathBuf>,
        public_dir: impl Into<PathBuf>,
        base_url: impl Into<String>,
    ) -> StorageResult<Self> {
        let staging_dir = staging_dir.into();
        let public_dir = public_dir.into();

        if staging_dir == public_dir {
            return Err(StorageError::InvalidPath(
                "staging and public directories must be distinct".to_string(),
            ));
        }

        fs::create_dir_all(&staging_dir).await?;
        fs::create_dir_all(&public_dir).await?;

        // Canonical roots make the containment check in publish() immune to
        // relative-path aliasing.
        let staging_dir = staging_dir.canonicalize()?;
        let public_dir = public_dir.canonicalize()?;

        Ok(LocalArtifactStore {
            staging_dir,
            public_dir,
            base_url: base_url.into(),
        })
    }

    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    pub fn public_dir(&self) -> &Path {
        &self.public_dir
    }

    fn storage_key(id: ArtifactId, format: OutputFormat) -> String {
        format!("{}.{}", id, format.extension())
    }

    fn url_for(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }

    /// A staged path is only accepted if it resolves inside the staging
    /// directory. Paths are produced by `stage()` itself in normal
    /// operation; this guards against misuse with arbitrary paths.
    fn verify_staged(&self, staged: &Path) -> StorageResult<PathBuf> {
        let canonical = staged.canonicalize().map_err(|e| {
            StorageError::Publish(format!(
                "staged file {} not readable: {}",
                staged.display(),
                e
            ))
        })?;
        if canonical.strip_prefix(&self.staging_dir).is_err() {
            return Err(StorageError::InvalidPath(format!(
                "{} is not a staged file",
                staged.display()
            )));
        }
        Ok(canonical)
    }
}

#[async_trait]
impl ArtifactStore for LocalArtifactStore {
    async fn stage(&self, bytes: Vec<u8>) -> StorageResult<PathBuf> {
        let path = self.staging_dir.join(format!("{}.staged", Uuid::new_v4()));
        let size = bytes.len();
        let start = std::time::Instant::now();

        let result = async {
            let mut file = fs::File::create(&path).await?;
            file.write_all(&bytes).await?;
            file.sync_all().await?;
            Ok::<(), std::io::Error>(())
        }
        .await;

        if let Err(e) = result {
            // Never leave a half-written staged file behind.
            let _ = fs::remove_file(&path).await;
            return Err(StorageError::Stage(format!(
                "failed to write {}: {}",
                path.display(),
                e
            )));
        }

        tracing::debug!(
            path = %path.display(),
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "staged upload bytes"
        );

        Ok(path)
    }

    async fn publish(
        &self,
        staged: &Path,
        id: ArtifactId,
        kind: ArtifactKind,
        format: OutputFormat,
    ) -> StorageResult<ArtifactDescriptor> {
        let staged = self.verify_staged(staged)?;
        let key = Self::storage_key(id, format);
        let dest = self.public_dir.join(&key);
        let start = std::time::Instant::now();

        let byte_size = fs::metadata(&staged).await?.len();

        // The staged file is fully written and synced; rename is the only
        // operation that ever touches the destination path.
        fs::rename(&staged, &dest).await.map_err(|e| {
            StorageError::Publish(format!(
                "failed to move {} to {}: {}",
                staged.display(),
                dest.display(),
                e
            ))
        })?;

        tracing::info!(
            key = %key,
            kind = kind.as_str(),
            size_bytes = byte_size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "published artifact"
        );

        Ok(ArtifactDescriptor {
            id,
            kind,
            url: self.url_for(&key),
            storage_path: key,
            content_type: format.mime_type().to_string(),
            byte_size,
            created_at: Utc::now(),
        })
    }

    async fn discard(&self, staged: &Path) {
        match fs::remove_file(staged).await {
            Ok(()) => {
                tracing::debug!(path = %staged.display(), "discarded staged file");
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(
                    path = %staged.display(),
                    error = %e,
                    "failed to discard staged file"
                );
            }
        }
    }

    async fn remove(&self, id: ArtifactId) -> StorageResult<()> {
        let stem = id.to_string();
        let mut removed = 0usize;

        let mut entries = match fs::read_dir(&self.public_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(StorageError::Remove(e.to_string())),
        };

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StorageError::Remove(e.to_string()))?
        {
            let path = entry.path();
            let matches = path
                .file_stem()
                .and_then(|s| s.to_str())
                .is_some_and(|s| s == stem);
            if !matches {
                continue;
            }
            match fs::remove_file(&path).await {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(StorageError::Remove(format!(
                        "failed to delete {}: {}",
                        path.display(),
                        e
                    )));
                }
            }
        }

        tracing::info!(id = %id, removed, "removed published artifact");
        Ok(())
    }
}
