//! Re-encoding to the target output format.
//!
//! Every artifact is encoded from a raster, never copied from source bytes,
//! so embedded source metadata cannot survive into an output.

use bytes::Bytes;
use image::DynamicImage;
use std::io::Cursor;

use pixline_core::OutputFormat;

use crate::transcode::TranscodeError;

/// Encode at the given quality. Quality applies to lossy formats and is
/// ignored for PNG.
pub fn encode(
    img: &DynamicImage,
    format: OutputFormat,
    quality: u8,
) -> Result<Bytes, TranscodeError> {
    match format {
        OutputFormat::Jpeg => encode_jpeg(img, quality),
        OutputFormat::Png => encode_png(img),
        OutputFormat::WebP => encode_webp(img, quality),
    }
}

fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Bytes, TranscodeError> {
    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();

    let mut comp = mozjpeg::Compress::new(mozjpeg::ColorSpace::JCS_RGB);
    comp.set_size(width as usize, height as usize);
    comp.set_quality(quality as f32);
    comp.set_progressive_mode();
    comp.set_optimize_coding(true);

    let mut comp = comp.start_compress(Vec::new()).map_err(encode_err)?;
    comp.write_scanlines(&rgb).map_err(encode_err)?;
    let data = comp.finish().map_err(encode_err)?;

    Ok(Bytes::from(data))
}

fn encode_png(img: &DynamicImage) -> Result<Bytes, TranscodeError> {
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)
        .map_err(encode_err)?;
    Ok(Bytes::from(buffer))
}

fn encode_webp(img: &DynamicImage, quality: u8) -> Result<Bytes, TranscodeError> {
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let encoder = webp::Encoder::from_rgba(&rgba, width, height);
    let data = encoder.encode(quality as f32);

    Ok(Bytes::copy_from_slice(&data))
}

fn encode_err(e: impl std::fmt::Display) -> TranscodeError {
    TranscodeError::Encode(e.to_string())
}
