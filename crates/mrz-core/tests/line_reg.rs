//! Line grouping regression test
//!
//! Test structure:
//!   Test 0: two well-separated lines (y = 10,10,60,60,60, height 20)
//!   Test 1: tolerance boundary (exactly allowed shift joins, one more splits)
//!   Test 2: stray outlier becomes its own line
//!   Test 3: rendered MRZ page regions regroup into their rows
//!   Test 4: coordinates at the ends of the i32 range

use mrz_core::{Region, allowed_shift, group_lines};
use mrz_test::{RegParams, render_page};

fn glyph(x: i32, y: i32) -> Region {
    Region::new_unchecked(x, y, 10, 20)
}

/// Test 0: well-separated lines
#[test]
fn test_0_two_lines() {
    let mut rp = RegParams::new("line_0_two_lines");

    let regions = vec![
        glyph(60, 60),
        glyph(0, 10),
        glyph(20, 60),
        glyph(20, 10),
        glyph(40, 60),
    ];
    let grouping = group_lines(regions);

    rp.compare_values(10.0, grouping.allowed_shift as f64, 0.0);
    rp.compare_values(2.0, grouping.lines.len() as f64, 0.0);
    rp.compare_values(2.0, grouping.lines[0].len() as f64, 0.0);
    rp.compare_values(3.0, grouping.lines[1].len() as f64, 0.0);
    rp.compare_values(10.0, grouping.lines[0].y as f64, 0.0);

    // Encounter order is kept within a line
    let xs: Vec<i32> = grouping.lines[1].iter().map(|r| r.min_x).collect();
    rp.compare_slices(&[60, 20, 40], &xs);

    assert!(rp.cleanup(), "line test 0 (two lines) failed");
}

/// Test 1: tolerance boundary
#[test]
fn test_1_tolerance_boundary() {
    let mut rp = RegParams::new("line_1_boundary");

    let shift = allowed_shift(&[glyph(0, 0)]);
    rp.compare_values(10.0, shift as f64, 0.0);

    let joined = group_lines(vec![glyph(0, 100), glyph(12, 100 + shift)]);
    rp.compare_values(1.0, joined.lines.len() as f64, 0.0);

    let split = group_lines(vec![glyph(0, 100), glyph(12, 100 + shift + 1)]);
    rp.compare_values(2.0, split.lines.len() as f64, 0.0);

    let above = group_lines(vec![glyph(0, 100), glyph(12, 100 - shift - 1)]);
    rp.compare_values(2.0, above.lines.len() as f64, 0.0);

    assert!(rp.cleanup(), "line test 1 (tolerance boundary) failed");
}

/// Test 2: outlier region
#[test]
fn test_2_outlier() {
    let mut rp = RegParams::new("line_2_outlier");

    let mut regions: Vec<Region> = (0..8).map(|i| glyph(i * 12, 200)).collect();
    regions.insert(3, glyph(40, 20));
    let grouping = group_lines(regions);

    rp.compare_values(2.0, grouping.lines.len() as f64, 0.0);
    rp.compare_values(1.0, grouping.lines[0].len() as f64, 0.0);
    rp.compare_values(8.0, grouping.lines[1].len() as f64, 0.0);
    rp.compare_values(0.0, grouping.lines[0].regions[0].line.unwrap_or(99) as f64, 0.0);

    assert!(rp.cleanup(), "line test 2 (outlier) failed");
}

/// Test 3: rendered page
#[test]
fn test_3_rendered_page() {
    let mut rp = RegParams::new("line_3_page");

    let page = render_page(&["P<UTOERIKSSON", "L898902C36UTO", "ANNA<MARIA<<<"]);
    let mut regions = page.regions();
    regions.reverse();
    let grouping = group_lines(regions);

    rp.compare_values(3.0, grouping.lines.len() as f64, 0.0);
    rp.compare_values(39.0, grouping.region_count() as f64, 0.0);
    for (line, expected) in grouping.lines.iter().zip(&page.lines) {
        rp.compare_values(expected[0].min_y as f64, line.y as f64, 0.0);
        rp.compare_values(expected.len() as f64, line.len() as f64, 0.0);
    }

    assert!(rp.cleanup(), "line test 3 (rendered page) failed");
}

/// Test 4: extreme coordinates
#[test]
fn test_4_extreme_coordinates() {
    let mut rp = RegParams::new("line_4_extreme");

    let regions = vec![
        glyph(0, i32::MAX - 5),
        glyph(0, -10),
        glyph(20, i32::MAX - 2),
        glyph(20, i32::MIN),
    ];
    let grouping = group_lines(regions);

    rp.compare_values(3.0, grouping.lines.len() as f64, 0.0);
    rp.compare_values(i32::MIN as f64, grouping.lines[0].y as f64, 0.0);
    rp.compare_values(-10.0, grouping.lines[1].y as f64, 0.0);
    rp.compare_values(2.0, grouping.lines[2].len() as f64, 0.0);
    rp.compare_values((i32::MAX - 2) as f64, grouping.lines[2].y as f64, 0.0);

    assert!(rp.cleanup(), "line test 4 (extreme coordinates) failed");
}
