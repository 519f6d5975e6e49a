//! MRZ line reading
//!
//! Turns segmented glyph boxes into line strings.
//!
//! # Algorithm Overview
//!
//! 1. Drop lines with fewer than [`OcrOptions::min_line_len`] regions
//! 2. Keep only the last [`OcrOptions::max_lines`] lines; spurious text
//!    detected above the machine-readable zone sits on top
//! 3. Crop every kept region and describe all glyphs as one batch, so the
//!    height feature sees the whole document
//! 4. Classify the batch in a single predictor call
//! 5. Reassemble predictions per line in region order
//!
//! Region order inside a line is taken as given. Sorting glyphs left to
//! right is the segmenter's job.

use image::GrayImage;
use mrz_core::{Line, Region, group_lines, median_of};

use crate::classifier::GlyphPredictor;
use crate::descriptor::get_descriptors;
use crate::error::{RecogError, RecogResult};
use crate::glyph::{Glyph, crop_region};
use crate::store::ModelStore;

/// Character written for glyphs the classifier rejects
pub const UNKNOWN_CHAR: char = '?';

/// Output of the external segmenter
#[derive(Debug, Clone)]
pub struct SegmentedImage {
    /// Grayscale source image
    pub image: GrayImage,
    /// Text lines, top to bottom
    pub lines: Vec<Line>,
    /// Visualization mask, passed through untouched
    pub mask: Option<GrayImage>,
    /// Typical glyph area, passed through untouched
    pub average_surface: f64,
}

impl SegmentedImage {
    /// Wrap pre-grouped lines
    pub fn new(
        image: GrayImage,
        lines: Vec<Line>,
        mask: Option<GrayImage>,
        average_surface: f64,
    ) -> Self {
        Self {
            image,
            lines,
            mask,
            average_surface,
        }
    }

    /// Group bare glyph boxes into lines
    ///
    /// The average surface is the median region area.
    pub fn from_regions(image: GrayImage, regions: Vec<Region>) -> Self {
        let areas: Vec<i64> = regions.iter().map(Region::area).collect();
        let average_surface = median_of(&areas).unwrap_or(0) as f64;
        let grouping = group_lines(regions);
        Self::new(image, grouping.lines, None, average_surface)
    }
}

/// Options for [`apply_ocr`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrOptions {
    /// Minimum regions for a line to be kept (default: 6)
    pub min_line_len: usize,
    /// Maximum number of bottom lines kept (default: 3)
    pub max_lines: usize,
    /// Document key for height normalization (default: "document")
    pub card: String,
}

impl Default for OcrOptions {
    fn default() -> Self {
        Self {
            min_line_len: 6,
            max_lines: 3,
            card: "document".to_string(),
        }
    }
}

impl OcrOptions {
    /// Create new options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum line length
    pub fn with_min_line_len(mut self, len: usize) -> Self {
        self.min_line_len = len;
        self
    }

    /// Set the maximum number of lines
    pub fn with_max_lines(mut self, lines: usize) -> Self {
        self.max_lines = lines;
        self
    }

    /// Set the document key
    pub fn with_card(mut self, card: impl Into<String>) -> Self {
        self.card = card.into();
        self
    }

    /// Validate parameters
    pub fn validate(&self) -> RecogResult<()> {
        if self.max_lines == 0 {
            return Err(RecogError::InvalidParameter(
                "max_lines must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Recognized text with its annotated regions
#[derive(Debug, Clone)]
pub struct OcrResult {
    /// One string per kept line, top to bottom
    pub lines: Vec<String>,
    /// Kept regions with `line` and `predicted` filled in
    pub regions: Vec<Vec<Region>>,
    /// Mask passed through from segmentation
    pub mask: Option<GrayImage>,
    /// Average surface passed through from segmentation
    pub average_surface: f64,
}

impl OcrResult {
    /// Number of classified glyphs
    pub fn glyph_count(&self) -> usize {
        self.regions.iter().map(Vec::len).sum()
    }
}

/// Read the machine-readable lines of a segmented image
///
/// # Errors
///
/// Fails if a kept region lies outside the image, or if the predictor
/// fails. An image whose lines are all filtered out yields an empty result.
pub fn apply_ocr<P: GlyphPredictor + ?Sized>(
    segmented: SegmentedImage,
    predictor: &P,
    options: &OcrOptions,
) -> RecogResult<OcrResult> {
    options.validate()?;
    let SegmentedImage {
        image,
        lines,
        mask,
        average_surface,
    } = segmented;

    let total = lines.len();
    let mut kept: Vec<Vec<Region>> = lines
        .into_iter()
        .filter(|line| line.len() >= options.min_line_len)
        .map(|line| line.regions)
        .collect();
    let long_enough = kept.len();
    if kept.len() > options.max_lines {
        kept.drain(..kept.len() - options.max_lines);
    }
    log::debug!(
        "{total} lines segmented, {long_enough} long enough, {} kept",
        kept.len()
    );

    let glyphs = kept
        .iter()
        .flatten()
        .map(|region| {
            crop_region(&image, region).map(|crop| Glyph::new(crop, options.card.as_str()))
        })
        .collect::<RecogResult<Vec<_>>>()?;

    let predictions = if glyphs.is_empty() {
        Vec::new()
    } else {
        let descriptors = get_descriptors(&glyphs)?;
        predictor.predict(&descriptors)?
    };
    if predictions.len() != glyphs.len() {
        return Err(RecogError::InvalidParameter(format!(
            "predictor returned {} labels for {} glyphs",
            predictions.len(),
            glyphs.len()
        )));
    }

    let mut predicted = predictions
        .into_iter()
        .map(|label| label.and_then(char::from_u32));
    let mut text = Vec::with_capacity(kept.len());
    for (index, line) in kept.iter_mut().enumerate() {
        let mut s = String::with_capacity(line.len());
        for (region, ch) in line.iter_mut().zip(predicted.by_ref()) {
            region.line = Some(index);
            region.predicted = ch;
            s.push(ch.unwrap_or(UNKNOWN_CHAR));
        }
        text.push(s);
    }

    let unknown = text
        .iter()
        .map(|s| s.chars().filter(|&c| c == UNKNOWN_CHAR).count())
        .sum::<usize>();
    if unknown > 0 {
        log::warn!("{unknown} glyphs could not be classified");
    }

    Ok(OcrResult {
        lines: text,
        regions: kept,
        mask,
        average_surface,
    })
}

/// Load the stored classifier and read a segmented image
pub fn read_lines(
    segmented: SegmentedImage,
    store: &ModelStore,
    options: &OcrOptions,
) -> RecogResult<OcrResult> {
    let classifier = store.load()?;
    apply_ocr(segmented, &classifier, options)
}
