//! Glyph descriptors
//!
//! A descriptor is the HOG vector of a canonicalized glyph followed by one
//! extra feature: the glyph's height relative to the shortest and tallest
//! glyph of the same document. In the MRZ typeface digits render slightly
//! shorter than letters, and this cue separates pairs such as `0`/`O` that
//! look alike to the gradient histogram.
//!
//! The height feature is normalized per card because absolute pixel
//! heights depend on capture scale. Batches must therefore contain every
//! glyph of a document together: a batch of one glyph degenerates to a
//! constant feature of `1`.

use std::collections::HashMap;

use image::GrayImage;

use crate::error::{RecogError, RecogResult};
use crate::glyph::{Glyph, LabeledGlyph, resize_and_pad};
use crate::hog::{HogOptions, hog};

/// Fixed-length feature vector of one glyph
pub type Descriptor = Vec<f64>;

/// Side of the square a glyph is resized to before padding
pub const CANONICAL_SIDE: u32 = 20;

/// Border added around the resized glyph
pub const CANONICAL_PADDING: u32 = 2;

/// A descriptor with its class and source document
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSample {
    /// Complete descriptor (HOG plus height feature)
    pub descriptor: Descriptor,
    /// Character code point
    pub label: u32,
    /// Source document key, used only for height normalization
    pub card: String,
}

/// Compute the base (HOG only) descriptor of one glyph image
///
/// The glyph is resized to 20x20, padded by 2 pixels and described with the
/// default [`HogOptions`].
pub fn get_descriptor(image: &GrayImage) -> RecogResult<Descriptor> {
    let canonical = resize_and_pad(image, CANONICAL_SIDE, CANONICAL_PADDING)?;
    hog(&canonical, &HogOptions::default())
}

/// Height feature of each glyph relative to its card
///
/// `(height - min) / (max - min)` over the glyphs sharing a card, or `1`
/// when every glyph of that card has the same height.
pub fn height_features<S: AsRef<str>>(heights: &[u32], cards: &[S]) -> RecogResult<Vec<f64>> {
    if heights.len() != cards.len() {
        return Err(RecogError::InvalidParameter(format!(
            "{} heights but {} card keys",
            heights.len(),
            cards.len()
        )));
    }

    let mut ranges: HashMap<&str, (u32, u32)> = HashMap::new();
    for (&h, card) in heights.iter().zip(cards) {
        let range = ranges.entry(card.as_ref()).or_insert((h, h));
        range.0 = range.0.min(h);
        range.1 = range.1.max(h);
    }

    Ok(heights
        .iter()
        .zip(cards)
        .map(|(&h, card)| {
            let (min, max) = ranges[card.as_ref()];
            if min == max {
                1.0
            } else {
                (h - min) as f64 / (max - min) as f64
            }
        })
        .collect())
}

/// Compute complete descriptors for a batch of glyphs
///
/// Every descriptor in the result has the same length: the HOG length plus
/// one.
pub fn get_descriptors(glyphs: &[Glyph]) -> RecogResult<Vec<Descriptor>> {
    let heights: Vec<u32> = glyphs.iter().map(Glyph::height).collect();
    let cards: Vec<&str> = glyphs.iter().map(|g| g.card.as_str()).collect();
    let bonuses = height_features(&heights, &cards)?;

    glyphs
        .iter()
        .zip(bonuses)
        .map(|(glyph, bonus)| {
            let mut descriptor = get_descriptor(&glyph.image)?;
            descriptor.push(bonus);
            Ok(descriptor)
        })
        .collect()
}

/// Build training samples from labeled glyphs
///
/// Height features are computed over each card's glyphs within `labeled`,
/// so a training set should hold whole documents.
pub fn build_training_set(labeled: &[LabeledGlyph]) -> RecogResult<Vec<TrainingSample>> {
    let glyphs: Vec<Glyph> = labeled.iter().map(|l| l.glyph.clone()).collect();
    let descriptors = get_descriptors(&glyphs)?;

    Ok(descriptors
        .into_iter()
        .zip(labeled)
        .map(|(descriptor, l)| TrainingSample {
            descriptor,
            label: l.label,
            card: l.glyph.card.clone(),
        })
        .collect())
}

/// Check that all descriptors share one length and return it
pub fn common_length(descriptors: &[Descriptor]) -> RecogResult<usize> {
    let first = descriptors
        .first()
        .ok_or(RecogError::EmptyInput("no descriptors"))?;
    let expected = first.len();
    for (index, d) in descriptors.iter().enumerate() {
        if d.len() != expected {
            return Err(RecogError::DescriptorLength {
                index,
                expected,
                actual: d.len(),
            });
        }
    }
    Ok(expected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn stripes(w: u32, h: u32) -> GrayImage {
        GrayImage::from_fn(w, h, |x, _| Luma([if x % 4 < 2 { 0 } else { 255 }]))
    }

    #[test]
    fn test_height_features_per_card() {
        let f = height_features(&[10, 20, 30, 7, 7], &["a", "a", "a", "b", "b"]).unwrap();
        assert_eq!(f, vec![0.0, 0.5, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_height_features_length_mismatch() {
        assert!(height_features(&[10, 20], &["a"]).is_err());
    }

    #[test]
    fn test_get_descriptor_length() {
        let d = get_descriptor(&stripes(11, 17)).unwrap();
        assert_eq!(d.len(), 144);
    }

    #[test]
    fn test_single_glyph_batch_degenerates_to_one() {
        let d = get_descriptors(&[Glyph::new(stripes(9, 14), "card")]).unwrap();
        assert_eq!(d[0].len(), 145);
        assert_eq!(d[0][144], 1.0);
    }

    #[test]
    fn test_common_length() {
        assert_eq!(common_length(&[vec![0.0; 3], vec![1.0; 3]]).unwrap(), 3);
        assert!(matches!(
            common_length(&[vec![0.0; 3], vec![1.0; 2]]),
            Err(RecogError::DescriptorLength { index: 1, .. })
        ));
        assert!(common_length(&[]).is_err());
    }
}
