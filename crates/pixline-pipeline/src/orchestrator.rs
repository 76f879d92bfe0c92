//! The pipeline orchestrator.
//!
//! Drives one upload through `Received -> Validated -> Staged ->
//! Transformed -> Published -> Done`, with a terminal failure reachable
//! from any non-terminal stage. Failures roll back every staged or
//! published artifact belonging to the upload before surfacing. There is no
//! automatic retry: transformation and storage outcomes are deterministic
//! for the same bytes, so resubmission is the caller's decision.

use pixline_core::{
    ArtifactId, ArtifactKind, IngestReceipt, ProcessingOptions, UploadCandidate,
};
use pixline_processing::{IntakeValidator, TranscodeError, TranscodeOutput, Transcoder};

use crate::context::PipelineContext;
use crate::error::PipelineError;

/// Stages an upload moves through; failure events carry the stage they
/// aborted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Validated,
    Staged,
    Transformed,
    Published,
}

#[derive(Clone)]
pub struct Pipeline {
    ctx: PipelineContext,
    validator: IntakeValidator,
}

impl Pipeline {
    pub fn new(ctx: PipelineContext) -> Self {
        let validator = IntakeValidator::from_config(ctx.config());
        Pipeline { ctx, validator }
    }

    /// Ingest one upload: validate, stage, transform, publish atomically.
    ///
    /// With `options` omitted the configured defaults apply; a caller
    /// override replaces the whole options value. On success the staged
    /// intermediates are gone and the receipt's descriptors point at fully
    /// published files. On failure nothing belonging to this upload
    /// remains, staged or published.
    pub async fn ingest(
        &self,
        candidate: UploadCandidate,
        options: Option<ProcessingOptions>,
    ) -> Result<IngestReceipt, PipelineError> {
        let options = options.unwrap_or_else(|| self.ctx.config().default_options());
        options.validate()?;

        let file = candidate.display_filename();
        let size = candidate.data.len();

        // Received -> Validated. No disk work has happened yet, so a
        // rejection here leaves zero artifacts by construction.
        if let Err(e) = self.validator.validate(&candidate) {
            tracing::debug!(%file, error = %e, "upload rejected");
            return Err(e.into());
        }
        tracing::debug!(stage = ?Stage::Validated, %file, size, "upload accepted");

        // Validated -> Staged.
        let staged_original = self.ctx.store().stage(candidate.data).await?;
        tracing::debug!(stage = ?Stage::Staged, %file, "original staged");

        // Staged -> Transformed. One permit covers both derivatives so an
        // upload's peak raster memory is counted once.
        let permit = self
            .ctx
            .transform_permits()
            .clone()
            .acquire_owned()
            .await
            .expect("transform semaphore is never closed");

        let primary = {
            let staged = staged_original.clone();
            let opts = options.clone();
            self.run_transform(move || Transcoder::process(&staged, &opts))
                .await
        };
        let primary = match primary {
            Ok(out) => out,
            Err(e) => {
                tracing::warn!(stage = ?Stage::Staged, %file, error = %e, "primary transform failed, rolling back");
                self.ctx.store().discard(&staged_original).await;
                return Err(e.into());
            }
        };

        let thumbnail_out = {
            let staged = staged_original.clone();
            let opts = options.clone();
            self.run_transform(move || {
                Transcoder::thumbnail(&staged, opts.thumbnail_size, opts.output_format, opts.quality)
            })
            .await
        };
        let thumbnail_out = match thumbnail_out {
            Ok(out) => out,
            Err(e) => {
                tracing::warn!(stage = ?Stage::Staged, %file, error = %e, "thumbnail transform failed, rolling back");
                self.ctx.store().discard(&primary.path).await;
                self.ctx.store().discard(&staged_original).await;
                return Err(e.into());
            }
        };
        drop(permit);
        tracing::debug!(
            stage = ?Stage::Transformed,
            %file,
            primary_width = primary.width,
            primary_height = primary.height,
            "derivatives transformed"
        );

        // Transformed -> Published, all-or-nothing across the artifact set.
        let primary_id = ArtifactId::new();
        let original = match self
            .ctx
            .store()
            .publish(&primary.path, primary_id, ArtifactKind::Original, options.output_format)
            .await
        {
            Ok(desc) => desc,
            Err(e) => {
                tracing::warn!(stage = ?Stage::Transformed, %file, error = %e, "primary publish failed, rolling back");
                self.ctx.store().discard(&thumbnail_out.path).await;
                self.ctx.store().discard(&primary.path).await;
                self.ctx.store().discard(&staged_original).await;
                return Err(e.into());
            }
        };

        let thumbnail = match self
            .ctx
            .store()
            .publish(
                &thumbnail_out.path,
                ArtifactId::new(),
                ArtifactKind::Thumbnail,
                options.output_format,
            )
            .await
        {
            Ok(desc) => desc,
            Err(e) => {
                // The published primary must not outlive its failed sibling.
                tracing::warn!(stage = ?Stage::Transformed, %file, error = %e, "thumbnail publish failed, rolling back primary");
                if let Err(remove_err) = self.ctx.store().remove(primary_id).await {
                    tracing::warn!(id = %primary_id, error = %remove_err, "rollback of published primary failed");
                }
                self.ctx.store().discard(&thumbnail_out.path).await;
                self.ctx.store().discard(&staged_original).await;
                return Err(e.into());
            }
        };

        // Published -> Done. Only now is the staged original disposable.
        self.ctx.store().discard(&staged_original).await;

        tracing::info!(
            stage = ?Stage::Published,
            %file,
            original_id = %original.id,
            thumbnail_id = %thumbnail.id,
            "upload published"
        );

        Ok(IngestReceipt {
            original,
            thumbnail,
        })
    }

    /// Invalidate a previously published artifact. Idempotent.
    pub async fn remove(&self, id: ArtifactId) -> Result<(), PipelineError> {
        Ok(self.ctx.store().remove(id).await?)
    }

    /// Decode/resize/encode is CPU-bound; run it off the async pool.
    async fn run_transform<F>(&self, f: F) -> Result<TranscodeOutput, TranscodeError>
    where
        F: FnOnce() -> Result<TranscodeOutput, TranscodeError> + Send + 'static,
    {
        match tokio::task::spawn_blocking(f).await {
            Ok(result) => result,
            Err(e) => Err(TranscodeError::Worker(e.to_string())),
        }
    }
}
