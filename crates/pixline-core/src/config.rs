//! Pipeline configuration.
//!
//! All tunables live in one fully-enumerated structure, validated once at
//! construction. Call sites never re-check ranges.

use std::path::PathBuf;

use serde::Deserialize;

use crate::models::{OutputFormat, ProcessingOptions};

const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;
const DEFAULT_MAX_WIDTH: u32 = 1920;
const DEFAULT_MAX_HEIGHT: u32 = 1080;
const DEFAULT_QUALITY: u8 = 85;
const DEFAULT_THUMBNAIL_SIZE: u32 = 200;

/// Configuration for one pipeline instance.
///
/// Constructed programmatically or from `PIXLINE_*` environment variables;
/// either way [`PipelineConfig::validate`] must pass before the config is
/// handed to the orchestrator.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Ceiling on accepted upload size, in bytes.
    pub max_upload_bytes: u64,
    /// Declared content types the intake accepts. Image types only.
    pub allowed_content_types: Vec<String>,
    /// Bounding box for the primary artifact.
    pub max_width: u32,
    pub max_height: u32,
    /// Encoder quality (1-100) for lossy output formats.
    pub quality: u8,
    pub output_format: OutputFormat,
    /// Edge length of the square thumbnail.
    pub thumbnail_size: u32,
    /// Upper bound on simultaneously decoded rasters.
    pub max_concurrent_transforms: usize,
    /// Staged files live here; never publicly served.
    pub staging_dir: PathBuf,
    /// Published artifacts live here, served under `base_url`.
    pub public_dir: PathBuf,
    /// URL prefix published artifacts are addressable under.
    pub base_url: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            allowed_content_types: vec![
                "image/jpeg".to_string(),
                "image/png".to_string(),
                "image/webp".to_string(),
                "image/gif".to_string(),
            ],
            max_width: DEFAULT_MAX_WIDTH,
            max_height: DEFAULT_MAX_HEIGHT,
            quality: DEFAULT_QUALITY,
            output_format: OutputFormat::Jpeg,
            thumbnail_size: DEFAULT_THUMBNAIL_SIZE,
            max_concurrent_transforms: default_transform_parallelism(),
            staging_dir: PathBuf::from("data/staging"),
            public_dir: PathBuf::from("data/uploads"),
            base_url: "/uploads".to_string(),
        }
    }
}

fn default_transform_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(2)
}

/// Raw `PIXLINE_*` environment overrides, deserialized with `envy`.
/// Sequence fields are comma-separated.
#[derive(Debug, Deserialize)]
struct EnvOverrides {
    max_upload_bytes: Option<u64>,
    allowed_content_types: Option<Vec<String>>,
    max_width: Option<u32>,
    max_height: Option<u32>,
    quality: Option<u8>,
    output_format: Option<String>,
    thumbnail_size: Option<u32>,
    max_concurrent_transforms: Option<usize>,
    staging_dir: Option<PathBuf>,
    public_dir: Option<PathBuf>,
    base_url: Option<String>,
}

impl PipelineConfig {
    /// Build from defaults overridden by `PIXLINE_*` environment variables.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let raw: EnvOverrides = envy::prefixed("PIXLINE_").from_env()?;
        let mut config = PipelineConfig::default();

        if let Some(v) = raw.max_upload_bytes {
            config.max_upload_bytes = v;
        }
        if let Some(v) = raw.allowed_content_types {
            config.allowed_content_types = v;
        }
        if let Some(v) = raw.max_width {
            config.max_width = v;
        }
        if let Some(v) = raw.max_height {
            config.max_height = v;
        }
        if let Some(v) = raw.quality {
            config.quality = v;
        }
        if let Some(v) = raw.output_format {
            config.output_format = OutputFormat::parse(&v)?;
        }
        if let Some(v) = raw.thumbnail_size {
            config.thumbnail_size = v;
        }
        if let Some(v) = raw.max_concurrent_transforms {
            config.max_concurrent_transforms = v;
        }
        if let Some(v) = raw.staging_dir {
            config.staging_dir = v;
        }
        if let Some(v) = raw.public_dir {
            config.public_dir = v;
        }
        if let Some(v) = raw.base_url {
            config.base_url = v;
        }

        config.validate()?;
        Ok(config)
    }

    /// Range-check every field. Runs once at construction.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_upload_bytes == 0 {
            return Err(ConfigError::invalid("max_upload_bytes", "must be non-zero"));
        }
        if self.allowed_content_types.is_empty() {
            return Err(ConfigError::invalid(
                "allowed_content_types",
                "allow-set must not be empty",
            ));
        }
        if let Some(ct) = self
            .allowed_content_types
            .iter()
            .find(|ct| !ct.to_lowercase().starts_with("image/"))
        {
            return Err(ConfigError::invalid(
                "allowed_content_types",
                format!("non-image type in allow-set: {ct}"),
            ));
        }
        if self.max_width == 0 || self.max_height == 0 {
            return Err(ConfigError::invalid(
                "max_width/max_height",
                "bounding box must be non-zero",
            ));
        }
        if !(1..=100).contains(&self.quality) {
            return Err(ConfigError::invalid("quality", "must be within 1-100"));
        }
        if self.thumbnail_size == 0 {
            return Err(ConfigError::invalid("thumbnail_size", "must be non-zero"));
        }
        if self.max_concurrent_transforms == 0 {
            return Err(ConfigError::invalid(
                "max_concurrent_transforms",
                "must be at least 1",
            ));
        }
        if self.staging_dir == self.public_dir {
            return Err(ConfigError::invalid(
                "staging_dir",
                "staging and public directories must differ",
            ));
        }
        if self.base_url.trim_end_matches('/').is_empty() {
            return Err(ConfigError::invalid("base_url", "must not be empty"));
        }
        Ok(())
    }

    /// The per-invocation defaults derived from this config.
    pub fn default_options(&self) -> ProcessingOptions {
        ProcessingOptions {
            target_width: self.max_width,
            target_height: self.max_height,
            quality: self.quality,
            output_format: self.output_format,
            thumbnail_size: self.thumbnail_size,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid config field {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}
