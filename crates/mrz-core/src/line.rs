//! Text line grouping
//!
//! Clusters an unordered set of glyph regions into text lines by vertical
//! proximity.
//!
//! # Algorithm Overview
//!
//! 1. **Tolerance**: a single global vertical tolerance is derived from the
//!    mean glyph height, `round(mean(height) / 2)`.
//!
//! 2. **Assignment**: regions are visited in input order. Each one joins the
//!    first line (in creation order) whose anchor `y` is within the
//!    tolerance, or starts a new line. Joining moves the line anchor onto the
//!    region, so the test drifts along slightly skewed lines.
//!
//! 3. **Ordering**: lines are sorted top to bottom by anchor `y`. Regions
//!    inside a line keep their encounter order.

use crate::region::{Line, Region};

/// Result of line grouping
#[derive(Debug, Clone, Default)]
pub struct LineGrouping {
    /// Lines sorted top to bottom
    pub lines: Vec<Line>,
    /// Vertical tolerance used for membership
    pub allowed_shift: i32,
}

impl LineGrouping {
    /// Total number of regions over all lines
    pub fn region_count(&self) -> usize {
        self.lines.iter().map(Line::len).sum()
    }
}

/// Compute the vertical membership tolerance for a set of regions
///
/// This is half the mean region height, rounded half away from zero.
/// Returns 0 for an empty set.
pub fn allowed_shift(regions: &[Region]) -> i32 {
    if regions.is_empty() {
        return 0;
    }
    // Sum over an ascending copy of the heights
    let mut heights: Vec<i64> = regions.iter().map(|r| r.height as i64).collect();
    heights.sort_unstable();
    let mean = heights.iter().sum::<i64>() as f64 / heights.len() as f64;
    (mean / 2.0).round() as i32
}

/// Group regions into text lines
///
/// Every region ends up in exactly one line and is annotated with the index
/// of that line in the returned (sorted) order. A region within tolerance of
/// several lines joins the earliest-created one.
pub fn group_lines(regions: Vec<Region>) -> LineGrouping {
    let shift = allowed_shift(&regions);
    let tolerance = u32::try_from(shift).ok();
    let mut lines: Vec<Line> = Vec::new();

    for region in regions {
        match lines
            .iter_mut()
            .find(|line| tolerance.is_some_and(|t| line.y.abs_diff(region.min_y) <= t))
        {
            Some(line) => line.push(region),
            None => lines.push(Line::new(region)),
        }
    }

    lines.sort_by_key(|line| line.y);
    for (index, line) in lines.iter_mut().enumerate() {
        for region in &mut line.regions {
            region.line = Some(index);
        }
    }

    log::debug!(
        "grouped {} regions into {} lines (allowed shift {})",
        lines.iter().map(Line::len).sum::<usize>(),
        lines.len(),
        shift
    );

    LineGrouping {
        lines,
        allowed_shift: shift,
    }
}
