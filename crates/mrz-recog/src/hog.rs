//! Histogram of oriented gradients
//!
//! Computes a dense HOG descriptor over a grayscale image.
//!
//! # Algorithm Overview
//!
//! 1. **Gradients**: central differences `[-1, 0, 1]` on intensities scaled
//!    to `[0, 1]`, with edge pixels clamped.
//!
//! 2. **Cell histograms**: each pixel votes its gradient magnitude into the
//!    unsigned orientation bin (0-180 degrees) of the cell that contains it.
//!    Pixels past the last whole cell are ignored.
//!
//! 3. **Blocks**: square groups of cells, taken at a fixed cell stride, are
//!    concatenated and L2-normalized, then all blocks are concatenated row
//!    by row.

use image::GrayImage;

use crate::error::{RecogError, RecogResult};

/// Regularizer added under the normalization root
const NORM_EPSILON: f64 = 1e-5;

/// Options for HOG extraction
///
/// The defaults are the parameter set the glyph classifier is trained
/// with; changing any of them invalidates stored models.
#[derive(Debug, Clone, PartialEq)]
pub struct HogOptions {
    /// Side of a square cell in pixels (default: 5)
    pub cell_size: u32,
    /// Side of a square block in cells (default: 2)
    pub block_size: u32,
    /// Block step in cells (default: 1)
    pub block_stride: u32,
    /// Number of orientation bins over 180 degrees (default: 4)
    pub bins: usize,
}

impl Default for HogOptions {
    fn default() -> Self {
        Self {
            cell_size: 5,
            block_size: 2,
            block_stride: 1,
            bins: 4,
        }
    }
}

impl HogOptions {
    /// Create new options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate options
    pub fn validate(&self) -> RecogResult<()> {
        if self.cell_size == 0 {
            return Err(RecogError::InvalidParameter(
                "cell_size must be positive".to_string(),
            ));
        }
        if self.block_size == 0 {
            return Err(RecogError::InvalidParameter(
                "block_size must be positive".to_string(),
            ));
        }
        if self.block_stride == 0 {
            return Err(RecogError::InvalidParameter(
                "block_stride must be positive".to_string(),
            ));
        }
        if self.bins == 0 {
            return Err(RecogError::InvalidParameter(
                "bins must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Number of blocks along one axis of `extent` pixels
    fn blocks_along(&self, extent: u32) -> u32 {
        let cells = extent / self.cell_size;
        if cells < self.block_size {
            0
        } else {
            (cells - self.block_size) / self.block_stride + 1
        }
    }

    /// Descriptor length for an image of the given size
    pub fn descriptor_len(&self, width: u32, height: u32) -> usize {
        let per_block = (self.block_size * self.block_size) as usize * self.bins;
        (self.blocks_along(width) * self.blocks_along(height)) as usize * per_block
    }
}

/// Compute the HOG descriptor of a grayscale image
///
/// # Errors
///
/// Fails on invalid options or when the image is smaller than one block.
pub fn hog(image: &GrayImage, options: &HogOptions) -> RecogResult<Vec<f64>> {
    options.validate()?;
    let (w, h) = image.dimensions();
    let blocks_wide = options.blocks_along(w);
    let blocks_high = options.blocks_along(h);
    if blocks_wide == 0 || blocks_high == 0 {
        return Err(RecogError::InvalidParameter(format!(
            "image {}x{} is smaller than one {}x{} block of {}px cells",
            w, h, options.block_size, options.block_size, options.cell_size
        )));
    }

    let cells = cell_histograms(image, options);
    let cells_wide = (w / options.cell_size) as usize;
    let bins = options.bins;
    let bs = options.block_size as usize;

    let mut descriptor = Vec::with_capacity(options.descriptor_len(w, h));
    for by in 0..blocks_high as usize {
        for bx in 0..blocks_wide as usize {
            let cy0 = by * options.block_stride as usize;
            let cx0 = bx * options.block_stride as usize;

            let start = descriptor.len();
            for cy in cy0..cy0 + bs {
                for cx in cx0..cx0 + bs {
                    let offset = (cy * cells_wide + cx) * bins;
                    descriptor.extend_from_slice(&cells[offset..offset + bins]);
                }
            }
            normalize(&mut descriptor[start..]);
        }
    }

    Ok(descriptor)
}

/// Per-cell orientation histograms, row-major, `bins` entries per cell
fn cell_histograms(image: &GrayImage, options: &HogOptions) -> Vec<f64> {
    let (w, h) = image.dimensions();
    let cs = options.cell_size;
    let cells_wide = w / cs;
    let cells_high = h / cs;
    let bins = options.bins;
    let bin_width = 180.0 / bins as f64;
    let mut hist = vec![0.0; (cells_wide * cells_high) as usize * bins];

    let intensity = |x: u32, y: u32| image.get_pixel(x, y)[0] as f64 / 255.0;

    for y in 0..cells_high * cs {
        for x in 0..cells_wide * cs {
            let gx = intensity((x + 1).min(w - 1), y) - intensity(x.saturating_sub(1), y);
            let gy = intensity(x, (y + 1).min(h - 1)) - intensity(x, y.saturating_sub(1));
            let magnitude = (gx * gx + gy * gy).sqrt();
            if magnitude == 0.0 {
                continue;
            }

            let mut angle = gy.atan2(gx).to_degrees();
            if angle < 0.0 {
                angle += 180.0;
            }
            let bin = ((angle / bin_width) as usize) % bins;

            let cell = ((y / cs) * cells_wide + x / cs) as usize;
            hist[cell * bins + bin] += magnitude;
        }
    }

    hist
}

/// L2 block normalization
fn normalize(block: &mut [f64]) {
    let denom = (block.iter().map(|v| v * v).sum::<f64>() + NORM_EPSILON * NORM_EPSILON).sqrt();
    for v in block.iter_mut() {
        *v /= denom;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_descriptor_len_canonical() {
        // 24x24 -> 4x4 cells -> 3x3 blocks of 2x2 cells x 4 bins
        assert_eq!(HogOptions::default().descriptor_len(24, 24), 144);
    }

    #[test]
    fn test_hog_validation() {
        let img = GrayImage::new(24, 24);
        let no_bins = HogOptions {
            bins: 0,
            ..HogOptions::default()
        };
        assert!(hog(&img, &no_bins).is_err());
        assert!(hog(&GrayImage::new(8, 8), &HogOptions::default()).is_err());
    }

    #[test]
    fn test_hog_flat_image_is_zero() {
        let img = GrayImage::from_pixel(24, 24, Luma([128]));
        let d = hog(&img, &HogOptions::default()).unwrap();
        assert_eq!(d.len(), 144);
        assert!(d.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_hog_vertical_edge_votes_horizontal_gradient() {
        // Dark left half, bright right half: gradient points along +x (bin 0)
        let img = GrayImage::from_fn(24, 24, |x, _| Luma([if x < 12 { 0 } else { 255 }]));
        let d = hog(&img, &HogOptions::default()).unwrap();
        let bin0: f64 = d.iter().step_by(4).sum();
        let others: f64 = d.iter().enumerate().filter(|(i, _)| i % 4 != 0).map(|(_, v)| v).sum();
        assert!(bin0 > 0.0);
        assert_eq!(others, 0.0);
    }

    #[test]
    fn test_hog_blocks_are_unit_l2() {
        let img = GrayImage::from_fn(24, 24, |x, y| Luma([((x * 37 + y * 11) % 256) as u8]));
        let d = hog(&img, &HogOptions::default()).unwrap();
        for block in d.chunks(16) {
            let norm: f64 = block.iter().map(|v| v * v).sum::<f64>().sqrt();
            assert!(norm < 1.0 + 1e-9);
            assert!(norm > 0.99);
        }
    }
}
