//! Error types for mrz-core
//!
//! The geometric algorithms in this crate are total over their inputs, so
//! the error surface is small: it covers validation of externally supplied
//! boxes.

use thiserror::Error;

/// mrz-core error type
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid region dimensions
    #[error("invalid region dimensions: {width}x{height}")]
    InvalidDimension { width: i32, height: i32 },

}

/// Result type alias for mrz-core operations
pub type Result<T> = std::result::Result<T, Error>;
