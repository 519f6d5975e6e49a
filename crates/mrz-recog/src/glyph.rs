//! Glyph image operations
//!
//! Thin pixel-buffer helpers over the `image` crate: decoding to 8-bit
//! grayscale, bounds-checked cropping of a region, and the canonical
//! resize-then-pad step that precedes descriptor extraction.

use image::imageops::{self, FilterType};
use image::GrayImage;
use mrz_core::Region;

use crate::error::{RecogError, RecogResult};

/// A glyph crop tagged with the document it came from
#[derive(Debug, Clone)]
pub struct Glyph {
    /// Grayscale glyph pixels
    pub image: GrayImage,
    /// Grouping key of the source document ("card")
    pub card: String,
}

impl Glyph {
    /// Create a glyph from an image and a card key
    pub fn new(image: GrayImage, card: impl Into<String>) -> Self {
        Self {
            image,
            card: card.into(),
        }
    }

    /// Glyph height in pixels
    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// A glyph with its target class (a character code point)
#[derive(Debug, Clone)]
pub struct LabeledGlyph {
    /// The glyph crop
    pub glyph: Glyph,
    /// Character code point
    pub label: u32,
}

impl LabeledGlyph {
    /// Create a labeled glyph from a character
    pub fn new(image: GrayImage, card: impl Into<String>, label: char) -> Self {
        Self {
            glyph: Glyph::new(image, card),
            label: label as u32,
        }
    }
}

/// Decode an encoded image (PNG, JPEG, ...) to 8-bit grayscale
pub fn load_gray(bytes: &[u8]) -> RecogResult<GrayImage> {
    Ok(image::load_from_memory(bytes)?.to_luma8())
}

/// Crop the pixels under a region
///
/// # Errors
///
/// Returns [`RecogError::RegionOutOfBounds`] for empty regions and regions
/// that are not fully inside the image.
pub fn crop_region(image: &GrayImage, region: &Region) -> RecogResult<GrayImage> {
    let (image_width, image_height) = image.dimensions();
    if region.is_empty() || !region.fits_within(image_width, image_height) {
        return Err(RecogError::RegionOutOfBounds {
            x: region.min_x,
            y: region.min_y,
            width: region.width,
            height: region.height,
            image_width,
            image_height,
        });
    }

    Ok(imageops::crop_imm(
        image,
        region.min_x as u32,
        region.min_y as u32,
        region.width as u32,
        region.height as u32,
    )
    .to_image())
}

/// Resize to `side` x `side`, then pad by `border` pixels on every side
///
/// The border replicates the nearest edge pixel, so padding adds no
/// gradient of its own.
pub fn resize_and_pad(image: &GrayImage, side: u32, border: u32) -> RecogResult<GrayImage> {
    if image.width() == 0 || image.height() == 0 {
        return Err(RecogError::EmptyInput("glyph image has no pixels"));
    }
    if side == 0 {
        return Err(RecogError::InvalidParameter(
            "resize side must be positive".to_string(),
        ));
    }

    let resized = imageops::resize(image, side, side, FilterType::Triangle);
    let padded_side = side + 2 * border;
    let last = side - 1;

    Ok(GrayImage::from_fn(padded_side, padded_side, |x, y| {
        let sx = x.saturating_sub(border).min(last);
        let sy = y.saturating_sub(border).min(last);
        *resized.get_pixel(sx, sy)
    }))
}
