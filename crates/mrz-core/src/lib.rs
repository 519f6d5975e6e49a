//! MRZ Core - Basic data structures for machine-readable zone segmentation
//!
//! This crate provides the data model and the purely geometric algorithms
//! shared by the recognition pipeline:
//!
//! - [`Region`] - A glyph bounding box annotated with its line and prediction
//! - [`Line`] - An ordered text line of regions with a drifting anchor
//! - [`group_lines`] - Vertical-proximity clustering of regions into lines
//! - [`select_median`] / [`select_nth`] - In-place Hoare quickselect
//!
//! # Example
//!
//! ```
//! use mrz_core::{Region, group_lines};
//!
//! let regions = vec![
//!     Region::new_unchecked(0, 10, 8, 20),
//!     Region::new_unchecked(10, 12, 8, 20),
//!     Region::new_unchecked(0, 60, 8, 20),
//! ];
//! let grouping = group_lines(regions);
//! assert_eq!(grouping.lines.len(), 2);
//! assert_eq!(grouping.lines[0].len(), 2);
//! ```

pub mod error;
pub mod line;
pub mod region;
pub mod select;

pub use error::{Error, Result};
pub use line::{LineGrouping, allowed_shift, group_lines};
pub use region::{Line, Region};
pub use select::{median_of, select_median, select_nth};
