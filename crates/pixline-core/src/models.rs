//! Data model for the ingestion pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::ArtifactId;

/// Output formats the transcoder can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Jpeg,
    Png,
    WebP,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Result<Self, OptionsError> {
        match s.to_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            "png" => Ok(OutputFormat::Png),
            "webp" => Ok(OutputFormat::WebP),
            _ => Err(OptionsError::UnknownFormat(s.to_string())),
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
            OutputFormat::WebP => "image/webp",
        }
    }

    /// Extension used in storage filenames and servable URLs.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
            OutputFormat::WebP => "webp",
        }
    }

    /// Whether the encoder consumes a quality setting. Quality is ignored,
    /// not an error, for lossless formats.
    pub fn is_lossy(self) -> bool {
        !matches!(self, OutputFormat::Png)
    }
}

/// The role of a published artifact within its upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Original,
    Thumbnail,
}

impl ArtifactKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ArtifactKind::Original => "original",
            ArtifactKind::Thumbnail => "thumbnail",
        }
    }
}

/// Durable description of one published artifact.
///
/// Only the store constructs these, and only after the backing bytes are
/// fully and atomically visible at their servable location. Immutable once
/// returned; replacing media means new descriptors plus `remove` of the old
/// identifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactDescriptor {
    pub id: ArtifactId,
    pub kind: ArtifactKind,
    /// Store-relative key, e.g. `<id>.jpg`. The id-to-path mapping is the
    /// store's exclusive responsibility.
    pub storage_path: String,
    /// Stable servable URL, e.g. `/uploads/<id>.jpg`.
    pub url: String,
    pub content_type: String,
    pub byte_size: u64,
    pub created_at: DateTime<Utc>,
}

/// An inbound file as handed over by the transport layer.
///
/// Ephemeral: exists from the moment the transport finishes receiving bytes
/// until validation rejects it or the pipeline completes.
#[derive(Clone, Debug)]
pub struct UploadCandidate {
    pub data: Vec<u8>,
    pub declared_content_type: String,
    pub declared_size: u64,
    /// Display-only. Never used to build storage paths.
    pub original_filename: String,
}

impl UploadCandidate {
    pub fn new(
        data: Vec<u8>,
        declared_content_type: impl Into<String>,
        original_filename: impl Into<String>,
    ) -> Self {
        let declared_size = data.len() as u64;
        UploadCandidate {
            data,
            declared_content_type: declared_content_type.into(),
            declared_size,
            original_filename: original_filename.into(),
        }
    }

    /// Sanitized form of the client filename, safe for logs and persistence.
    pub fn display_filename(&self) -> String {
        sanitize_display_filename(&self.original_filename)
    }
}

/// Clamp a client-supplied filename to something loggable: basename only,
/// alphanumerics plus `.`/`-`/`_`, at most 255 chars.
pub fn sanitize_display_filename(filename: &str) -> String {
    const MAX: usize = 255;
    let base = std::path::Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(filename);
    if base.contains("..") {
        return "file".to_string();
    }
    let s: String = base
        .chars()
        .take(MAX)
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if s.trim_matches(|c| c == '_' || c == '.').is_empty() {
        "file".to_string()
    } else {
        s
    }
}

/// Per-invocation transformation settings.
///
/// Callers either pass a whole struct or take the config defaults; fields
/// are never silently mixed. Invalid combinations are rejected up front,
/// before any transformation begins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingOptions {
    /// Bounding box for the primary artifact. Aspect ratio is preserved and
    /// the source is never upscaled.
    pub target_width: u32,
    pub target_height: u32,
    /// 1-100; applies to lossy formats only.
    pub quality: u8,
    pub output_format: OutputFormat,
    /// Edge length of the exact-square thumbnail.
    pub thumbnail_size: u32,
}

impl ProcessingOptions {
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.target_width == 0 || self.target_height == 0 {
            return Err(OptionsError::ZeroDimension);
        }
        if self.thumbnail_size == 0 {
            return Err(OptionsError::ZeroThumbnail);
        }
        if !(1..=100).contains(&self.quality) {
            return Err(OptionsError::QualityOutOfRange(self.quality));
        }
        Ok(())
    }
}

/// Rejection reasons for malformed processing options.
#[derive(Debug, thiserror::Error)]
pub enum OptionsError {
    #[error("target dimensions must be non-zero")]
    ZeroDimension,

    #[error("thumbnail size must be non-zero")]
    ZeroThumbnail,

    #[error("quality {0} outside 1-100")]
    QualityOutOfRange(u8),

    #[error("unknown output format: {0}")]
    UnknownFormat(String),
}

/// The descriptor set returned for a completed upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestReceipt {
    pub original: ArtifactDescriptor,
    pub thumbnail: ArtifactDescriptor,
}
