//! Unified error surface for the pipeline.
//!
//! Three client-visible kinds, per the failure taxonomy: bad input (client
//! error, no retry), transcode failure (deterministic, no retry), storage
//! failure (retryable with a fresh submission). Internal detail stays in
//! the source errors for logging; `client_message` never exposes paths or
//! codec output.

use pixline_core::OptionsError;
use pixline_processing::{TranscodeError, ValidationError};
use pixline_storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] ValidationError),

    #[error("invalid options: {0}")]
    InvalidOptions(#[from] OptionsError),

    #[error("transcode failed: {0}")]
    Transcode(#[from] TranscodeError),

    #[error("storage failure: {0}")]
    Storage(#[from] StorageError),
}

impl PipelineError {
    /// Stable machine-readable kind.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::InvalidInput(_) | PipelineError::InvalidOptions(_) => "INVALID_INPUT",
            PipelineError::Transcode(_) => "TRANSCODE_ERROR",
            PipelineError::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Human-readable message safe to surface to a client. Validation
    /// reasons are concrete; server-side failures stay generic.
    pub fn client_message(&self) -> String {
        match self {
            PipelineError::InvalidInput(e) => e.to_string(),
            PipelineError::InvalidOptions(e) => e.to_string(),
            PipelineError::Transcode(TranscodeError::UnsupportedOrCorrupt(_)) => {
                "unsupported or corrupt image".to_string()
            }
            PipelineError::Transcode(_) => "failed to process image".to_string(),
            PipelineError::Storage(_) => "storage failure, the upload may be retried".to_string(),
        }
    }

    /// Whether resubmitting the same bytes may succeed. Transformation is
    /// deterministic, so only storage failures qualify.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PipelineError::Storage(_))
    }
}
