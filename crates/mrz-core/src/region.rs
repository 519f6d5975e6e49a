//! Region, Line - Glyph boxes and the text lines built from them
//!
//! A [`Region`] is the axis-aligned box of one glyph candidate as produced
//! by connected-component segmentation. Downstream stages annotate it in
//! place with the index of the line it was assigned to and with the
//! character the classifier predicted for it.

use crate::error::{Error, Result};

/// A glyph region of interest
///
/// Coordinates are integer pixels in source-image space. Like a plain
/// rectangle this is a small `Copy` type; the annotations travel with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Region {
    /// Left x coordinate
    pub min_x: i32,
    /// Top y coordinate
    pub min_y: i32,
    /// Width
    pub width: i32,
    /// Height
    pub height: i32,
    /// Index of the line this region was grouped into
    pub line: Option<usize>,
    /// Character predicted for this region
    pub predicted: Option<char>,
}

impl Region {
    /// Create a new region
    ///
    /// # Errors
    ///
    /// Returns an error if width or height is negative.
    pub fn new(min_x: i32, min_y: i32, width: i32, height: i32) -> Result<Self> {
        if width < 0 || height < 0 {
            return Err(Error::InvalidDimension { width, height });
        }
        Ok(Self::new_unchecked(min_x, min_y, width, height))
    }

    /// Create a region without validation
    pub const fn new_unchecked(min_x: i32, min_y: i32, width: i32, height: i32) -> Self {
        Self {
            min_x,
            min_y,
            width,
            height,
            line: None,
            predicted: None,
        }
    }

    /// Get the right x coordinate (exclusive)
    #[inline]
    pub fn max_x(&self) -> i64 {
        self.min_x as i64 + self.width as i64
    }

    /// Get the bottom y coordinate (exclusive)
    #[inline]
    pub fn max_y(&self) -> i64 {
        self.min_y as i64 + self.height as i64
    }

    /// Get the area
    #[inline]
    pub fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }

    /// Check if the region is empty (zero area)
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Check if the region lies entirely inside a `width` x `height` image
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.min_x >= 0
            && self.min_y >= 0
            && self.max_x() <= width as i64
            && self.max_y() <= height as i64
    }
}

/// A text line: regions in encounter order plus a drifting anchor
///
/// The anchor is the `(x, y)` of the most recently added region, so the
/// vertical membership test follows mild skew along the line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Line {
    /// Regions in the order they were assigned
    pub regions: Vec<Region>,
    /// Anchor x (left edge of the last added region)
    pub x: i32,
    /// Anchor y (top edge of the last added region)
    pub y: i32,
}

impl Line {
    /// Start a new line from its first region
    pub fn new(first: Region) -> Self {
        Self {
            x: first.min_x,
            y: first.min_y,
            regions: vec![first],
        }
    }

    /// Build a line from regions already grouped by a segmenter
    ///
    /// The anchor is taken from the last region; an empty vector yields an
    /// empty line anchored at the origin.
    pub fn from_regions(regions: Vec<Region>) -> Self {
        let (x, y) = regions
            .last()
            .map(|r| (r.min_x, r.min_y))
            .unwrap_or((0, 0));
        Self { regions, x, y }
    }

    /// Append a region and move the anchor onto it
    pub fn push(&mut self, region: Region) {
        self.x = region.min_x;
        self.y = region.min_y;
        self.regions.push(region);
    }

    /// Number of regions in the line
    #[inline]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Check whether the line has no regions
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Iterate over the regions in encounter order
    pub fn iter(&self) -> std::slice::Iter<'_, Region> {
        self.regions.iter()
    }

    /// Current anchor point
    pub fn anchor(&self) -> (i32, i32) {
        (self.x, self.y)
    }
}

impl<'a> IntoIterator for &'a Line {
    type Item = &'a Region;
    type IntoIter = std::slice::Iter<'a, Region>;

    fn into_iter(self) -> Self::IntoIter {
        self.regions.iter()
    }
}
