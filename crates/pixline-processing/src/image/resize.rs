//! Resize policies for derivative artifacts.
//!
//! The primary artifact fits within a bounding box; the thumbnail fills and
//! center-crops an exact square. The two policies are deliberately distinct
//! and must not be unified.

use image::{imageops::FilterType, DynamicImage, GenericImageView};

const FILTER: FilterType = FilterType::Lanczos3;

/// Shrink to fit within `max_width x max_height`, preserving the aspect
/// ratio. A source already inside the box is returned unchanged: the
/// primary artifact is never upscaled beyond its original dimensions.
pub fn fit_within(img: DynamicImage, max_width: u32, max_height: u32) -> DynamicImage {
    let (width, height) = img.dimensions();
    if width <= max_width && height <= max_height {
        return img;
    }
    img.resize(max_width, max_height, FILTER)
}

/// Scale to cover a `size x size` square and center-crop the excess.
/// The result is always exactly square, upscaling small sources if needed.
pub fn cover_square(img: DynamicImage, size: u32) -> DynamicImage {
    img.resize_to_fill(size, size, FILTER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn img(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([128, 64, 32, 255])))
    }

    #[test]
    fn test_fit_within_downscales_preserving_aspect() {
        let out = fit_within(img(4000, 2000), 1920, 1080);
        assert_eq!(out.dimensions(), (1920, 960));
    }

    #[test]
    fn test_fit_within_bounded_by_height() {
        let out = fit_within(img(2000, 4000), 1920, 1080);
        let (width, height) = out.dimensions();
        assert_eq!(height, 1080);
        assert!(width <= 1920);
    }

    #[test]
    fn test_fit_within_never_upscales() {
        let out = fit_within(img(100, 50), 1920, 1080);
        assert_eq!(out.dimensions(), (100, 50));
    }

    #[test]
    fn test_cover_square_is_exact() {
        assert_eq!(cover_square(img(300, 100), 200).dimensions(), (200, 200));
        assert_eq!(cover_square(img(100, 300), 200).dimensions(), (200, 200));
    }

    #[test]
    fn test_cover_square_upscales_small_sources() {
        assert_eq!(cover_square(img(50, 80), 200).dimensions(), (200, 200));
    }
}
