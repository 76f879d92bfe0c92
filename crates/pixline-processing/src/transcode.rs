//! The transformation engine.
//!
//! `process` produces the display-optimized primary artifact and
//! `thumbnail` the fixed-size square variant, both from a staged source
//! file. Each call decodes the source, corrects for the embedded
//! orientation tag, resizes under the policy for its artifact kind, and
//! re-encodes. Outputs are always rebuilt from the corrected raster, so no
//! embedded metadata (EXIF, GPS, camera tags) survives, even when no resize
//! is requested.
//!
//! Calls are deterministic and side-effect-free on their input: the staged
//! source is read, never modified, and the output lands at a new staged
//! path beside it. Everything here is synchronous and CPU-bound; callers
//! run it on the blocking pool.

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use image::{DynamicImage, GenericImageView};

use pixline_core::{ArtifactId, OutputFormat, ProcessingOptions};

use crate::image::{encode, orientation, resize};

/// Transformation failures.
#[derive(Debug, thiserror::Error)]
pub enum TranscodeError {
    #[error("unsupported or corrupt image: {0}")]
    UnsupportedOrCorrupt(String),

    #[error("encode failed: {0}")]
    Encode(String),

    #[error("transform worker failed: {0}")]
    Worker(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A transcoded artifact, staged and ready to publish.
#[derive(Debug, Clone)]
pub struct TranscodeOutput {
    pub path: PathBuf,
    pub content_type: String,
    pub byte_size: u64,
    pub width: u32,
    pub height: u32,
}

pub struct Transcoder;

impl Transcoder {
    /// Produce the primary artifact: oriented, fitted within the bounding
    /// box without upscaling, re-encoded to the requested format/quality.
    pub fn process(
        staged: &Path,
        options: &ProcessingOptions,
    ) -> Result<TranscodeOutput, TranscodeError> {
        let data = std::fs::read(staged)?;
        let img = decode(&data)?;
        let img = orientation::apply(img, orientation::read_orientation(&data));
        let img = resize::fit_within(img, options.target_width, options.target_height);
        write_staged_output(&img, staged, options.output_format, options.quality)
    }

    /// Produce the thumbnail variant: oriented, filled and center-cropped
    /// to an exact `size x size` square.
    pub fn thumbnail(
        staged: &Path,
        size: u32,
        format: OutputFormat,
        quality: u8,
    ) -> Result<TranscodeOutput, TranscodeError> {
        let data = std::fs::read(staged)?;
        let img = decode(&data)?;
        let img = orientation::apply(img, orientation::read_orientation(&data));
        let img = resize::cover_square(img, size);
        write_staged_output(&img, staged, format, quality)
    }
}

fn decode(data: &[u8]) -> Result<DynamicImage, TranscodeError> {
    image::ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| TranscodeError::UnsupportedOrCorrupt(e.to_string()))?
        .decode()
        .map_err(|e| TranscodeError::UnsupportedOrCorrupt(e.to_string()))
}

/// Write encoded bytes to a fresh staged path beside the input. The input
/// file stays in place; deleting it once downstream writes succeed is the
/// orchestrator's job.
fn write_staged_output(
    img: &DynamicImage,
    input: &Path,
    format: OutputFormat,
    quality: u8,
) -> Result<TranscodeOutput, TranscodeError> {
    let bytes = encode::encode(img, format, quality)?;
    let (width, height) = img.dimensions();

    let name = format!("{}.{}.staged", ArtifactId::new(), format.extension());
    let path = input.with_file_name(name);

    let written = (|| -> std::io::Result<()> {
        let mut file = std::fs::File::create(&path)?;
        file.write_all(&bytes)?;
        file.sync_all()
    })();
    if let Err(e) = written {
        let _ = std::fs::remove_file(&path);
        return Err(e.into());
    }

    tracing::debug!(
        path = %path.display(),
        width,
        height,
        size_bytes = bytes.len(),
        format = format.mime_type(),
        "wrote transcoded artifact to staging"
    );

    Ok(TranscodeOutput {
        path,
        content_type: format.mime_type().to_string(),
        byte_size: bytes.len() as u64,
        width,
        height,
    })
}
