//! EXIF orientation correction.

use image::{imageops, DynamicImage};

/// Read the EXIF orientation tag (1-8) from raw source bytes.
///
/// Absent, unreadable, or out-of-range values are treated as 1 (normal).
pub fn read_orientation(data: &[u8]) -> u8 {
    let mut cursor = std::io::Cursor::new(data);
    let Ok(exif) = exif::Reader::new().read_from_container(&mut cursor) else {
        return 1;
    };
    match exif
        .get_field(exif::Tag::Orientation, exif::In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
    {
        Some(v @ 1..=8) => v as u8,
        _ => 1,
    }
}

/// Rotation and flip operations needed for a given EXIF orientation.
/// Returns (clockwise rotation angle, flip horizontal, flip vertical).
pub fn orientation_transforms(orientation: u8) -> (Option<u16>, bool, bool) {
    match orientation {
        1 => (None, false, false),      // Normal
        2 => (None, true, false),       // Mirror horizontal
        3 => (Some(180), false, false), // Rotate 180
        4 => (None, false, true),       // Mirror vertical
        5 => (Some(270), true, false),  // Mirror horizontal + Rotate 270 CW
        6 => (Some(90), false, false),  // Rotate 90 CW
        7 => (Some(90), true, false),   // Mirror horizontal + Rotate 90 CW
        8 => (Some(270), false, false), // Rotate 270 CW
        _ => (None, false, false),      // Invalid, treat as normal
    }
}

/// Apply the correction for `orientation` to the raster.
pub fn apply(mut img: DynamicImage, orientation: u8) -> DynamicImage {
    let (rotate, flip_h, flip_v) = orientation_transforms(orientation);

    tracing::debug!(
        orientation,
        rotate = ?rotate,
        flip_horizontal = flip_h,
        flip_vertical = flip_v,
        "applying orientation correction"
    );

    if let Some(angle) = rotate {
        img = rotate_by_angle(img, angle);
    }
    if flip_h {
        img = DynamicImage::ImageRgba8(imageops::flip_horizontal(&img.to_rgba8()));
    }
    if flip_v {
        img = DynamicImage::ImageRgba8(imageops::flip_vertical(&img.to_rgba8()));
    }

    img
}

fn rotate_by_angle(img: DynamicImage, angle: u16) -> DynamicImage {
    match angle {
        90 => DynamicImage::ImageRgba8(imageops::rotate90(&img.to_rgba8())),
        180 => DynamicImage::ImageRgba8(imageops::rotate180(&img.to_rgba8())),
        270 => DynamicImage::ImageRgba8(imageops::rotate270(&img.to_rgba8())),
        _ => img,
    }
}
