//! MRZ - Machine-readable zone recognition for Rust
//!
//! Reads the machine-readable lines of identity documents from glyph boxes
//! found by an external segmenter.
//!
//! # Overview
//!
//! - Geometry and line grouping of glyph regions
//! - Order statistics (quickselect median)
//! - HOG descriptors and precomputed-kernel SVM classification
//! - Model artifact persistence
//! - Line filtering and reassembly
//!
//! # Example
//!
//! ```
//! use mrz::{Region, group_lines};
//!
//! let regions = vec![
//!     Region::new_unchecked(0, 100, 12, 20),
//!     Region::new_unchecked(16, 102, 12, 20),
//! ];
//! let grouping = group_lines(regions);
//! assert_eq!(grouping.lines.len(), 1);
//! assert_eq!(grouping.allowed_shift, 10);
//! ```

// Re-export core types (primary data structures used everywhere)
pub use mrz_core::*;

// Re-export the recognition crate as a module
pub use mrz_recog as recog;
