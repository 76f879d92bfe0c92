//! Intake validation for untrusted uploads.
//!
//! Checks run in order and short-circuit on the first failure: declared
//! content type against the allow-set, size against the ceiling, then the
//! actual byte signature against the declared type. Validation never
//! touches disk, so a rejected candidate leaves no trace.

use pixline_core::{PipelineConfig, UploadCandidate};

/// Rejection reasons for inbound uploads.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("missing content type")]
    MissingContentType,

    #[error("unsupported content type: {content_type} (allowed: {allowed:?})")]
    UnsupportedContentType {
        content_type: String,
        allowed: Vec<String>,
    },

    #[error("file too large: {size} bytes (max: {max} bytes)")]
    TooLarge { size: u64, max: u64 },

    #[error("empty file")]
    EmptyFile,

    #[error("byte signature ({detected}) does not match declared type {declared}")]
    SignatureMismatch { declared: String, detected: String },
}

/// Validates a candidate upload before any disk or processing work occurs.
#[derive(Clone)]
pub struct IntakeValidator {
    max_upload_bytes: u64,
    allowed_content_types: Vec<String>,
}

impl IntakeValidator {
    pub fn new(max_upload_bytes: u64, allowed_content_types: Vec<String>) -> Self {
        let allowed_content_types = allowed_content_types
            .iter()
            .map(|ct| normalize_content_type(ct))
            .collect();
        IntakeValidator {
            max_upload_bytes,
            allowed_content_types,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(
            config.max_upload_bytes,
            config.allowed_content_types.clone(),
        )
    }

    pub fn validate(&self, candidate: &UploadCandidate) -> Result<(), ValidationError> {
        let declared = self.check_content_type(&candidate.declared_content_type)?;
        self.check_size(candidate)?;
        self.check_signature(&candidate.data, &declared)?;
        Ok(())
    }

    fn check_content_type(&self, declared: &str) -> Result<String, ValidationError> {
        let normalized = normalize_content_type(declared);
        if normalized.is_empty() {
            return Err(ValidationError::MissingContentType);
        }
        if !self.allowed_content_types.contains(&normalized) {
            return Err(ValidationError::UnsupportedContentType {
                content_type: declared.to_string(),
                allowed: self.allowed_content_types.clone(),
            });
        }
        Ok(normalized)
    }

    fn check_size(&self, candidate: &UploadCandidate) -> Result<(), ValidationError> {
        // The declared size is checked first so a streaming transport can
        // reject before buffering; the actual length is authoritative.
        let actual = candidate.data.len() as u64;
        let size = candidate.declared_size.max(actual);
        if size > self.max_upload_bytes {
            return Err(ValidationError::TooLarge {
                size,
                max: self.max_upload_bytes,
            });
        }
        if actual == 0 {
            return Err(ValidationError::EmptyFile);
        }
        Ok(())
    }

    /// Declared-type spoofing is a known risk class; the magic bytes must
    /// identify a format whose MIME type equals the declared one.
    fn check_signature(&self, data: &[u8], declared: &str) -> Result<(), ValidationError> {
        let detected = sniff_content_type(data);
        if detected != Some(declared) {
            return Err(ValidationError::SignatureMismatch {
                declared: declared.to_string(),
                detected: detected.unwrap_or("unknown").to_string(),
            });
        }
        Ok(())
    }
}

/// Lowercase, strip any `; charset=`-style parameters, and fold the
/// `image/jpg` alias into `image/jpeg`.
fn normalize_content_type(content_type: &str) -> String {
    let ct = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_lowercase();
    if ct == "image/jpg" {
        "image/jpeg".to_string()
    } else {
        ct
    }
}

/// MIME type identified by the leading magic bytes, if any.
fn sniff_content_type(data: &[u8]) -> Option<&'static str> {
    match image::guess_format(data).ok()? {
        image::ImageFormat::Jpeg => Some("image/jpeg"),
        image::ImageFormat::Png => Some("image/png"),
        image::ImageFormat::WebP => Some("image/webp"),
        image::ImageFormat::Gif => Some("image/gif"),
        image::ImageFormat::Bmp => Some("image/bmp"),
        image::ImageFormat::Tiff => Some("image/tiff"),
        image::ImageFormat::Avif => Some("image/avif"),
        _ => None,
    }
}
