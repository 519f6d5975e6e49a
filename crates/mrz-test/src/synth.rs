//! Synthetic glyphs and pages
//!
//! Every character maps to a distinct 3x5 bitmap derived from its code
//! point. The top-left cell is always inked, so no glyph is the photometric
//! inverse of another (unsigned gradient histograms cannot tell those
//! apart). Pages are white with black glyphs laid out on a fixed grid.

use image::{GrayImage, Luma};
use mrz_core::Region;

/// Bitmap columns
const CELLS_WIDE: u32 = 3;
/// Bitmap rows
const CELLS_HIGH: u32 = 5;
/// Side of one bitmap cell in pixels
const CELL_SIDE: u32 = 4;

/// Rendered glyph width in pixels
pub const GLYPH_WIDTH: u32 = CELLS_WIDE * CELL_SIDE;
/// Rendered glyph height in pixels
pub const GLYPH_HEIGHT: u32 = CELLS_HIGH * CELL_SIDE;
/// Horizontal gap between glyphs
pub const GLYPH_GAP: u32 = 4;
/// Vertical distance between consecutive line tops
pub const LINE_PITCH: u32 = 40;
/// Page margin on every side
pub const MARGIN: u32 = 10;

const INK: Luma<u8> = Luma([0]);
const PAPER: Luma<u8> = Luma([255]);

/// 15-bit cell mask for a character
fn glyph_mask(ch: char) -> u16 {
    // Odd multiplier: a bijection on the low 14 bits of the code point
    let hashed = (ch as u32).wrapping_mul(0x1B5D) & 0x3FFF;
    ((hashed << 1) | 1) as u16
}

/// Render one glyph as a tight `GLYPH_WIDTH` x `GLYPH_HEIGHT` image
pub fn render_glyph(ch: char) -> GrayImage {
    let mask = glyph_mask(ch);
    GrayImage::from_fn(GLYPH_WIDTH, GLYPH_HEIGHT, |x, y| {
        let bit = (y / CELL_SIDE) * CELLS_WIDE + x / CELL_SIDE;
        if mask & (1 << bit) != 0 { INK } else { PAPER }
    })
}

/// A rendered page together with the glyph boxes on it
#[derive(Debug, Clone)]
pub struct SyntheticPage {
    /// Grayscale page image
    pub image: GrayImage,
    /// Glyph boxes per text line, in reading order
    pub lines: Vec<Vec<Region>>,
}

impl SyntheticPage {
    /// All glyph boxes in reading order
    pub fn regions(&self) -> Vec<Region> {
        self.lines.iter().flatten().copied().collect()
    }
}

/// Render text lines onto a white page
///
/// Line `i` starts at `MARGIN + i * LINE_PITCH`; spaces advance the cursor
/// without producing a glyph box.
pub fn render_page(lines: &[&str]) -> SyntheticPage {
    let longest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) as u32;
    let width = 2 * MARGIN + longest * (GLYPH_WIDTH + GLYPH_GAP);
    let height = 2 * MARGIN + lines.len() as u32 * LINE_PITCH;
    let mut image = GrayImage::from_pixel(width.max(1), height.max(1), PAPER);

    let mut boxes = Vec::with_capacity(lines.len());
    for (row, text) in lines.iter().enumerate() {
        let top = MARGIN + row as u32 * LINE_PITCH;
        let mut line = Vec::new();
        for (col, ch) in text.chars().enumerate() {
            if ch == ' ' {
                continue;
            }
            let left = MARGIN + col as u32 * (GLYPH_WIDTH + GLYPH_GAP);
            let glyph = render_glyph(ch);
            for (x, y, px) in glyph.enumerate_pixels() {
                image.put_pixel(left + x, top + y, *px);
            }
            line.push(Region::new_unchecked(
                left as i32,
                top as i32,
                GLYPH_WIDTH as i32,
                GLYPH_HEIGHT as i32,
            ));
        }
        boxes.push(line);
    }

    SyntheticPage {
        image,
        lines: boxes,
    }
}
