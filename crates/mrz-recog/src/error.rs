//! Error types for mrz-recog

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during descriptor extraction, training,
/// prediction and model persistence
#[derive(Debug, Error)]
pub enum RecogError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] mrz_core::Error),

    /// Image decoding or buffer error
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error outside artifact loading
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid parameter provided
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Empty input where at least one element is required
    #[error("empty input: {0}")]
    EmptyInput(&'static str),

    /// Descriptors in one batch disagree in length
    #[error("descriptor {index} has length {actual}, expected {expected}")]
    DescriptorLength {
        index: usize,
        expected: usize,
        actual: usize,
    },

    /// Region does not fit inside the source image
    #[error(
        "region at ({x}, {y}) size {width}x{height} is outside the {image_width}x{image_height} image"
    )]
    RegionOutOfBounds {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        image_width: u32,
        image_height: u32,
    },

    /// Training could not produce a model
    #[error("training error: {0}")]
    TrainingError(String),

    /// Programmatic path configuration is unusable
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// No candidate location holds a complete artifact pair
    #[error("model artifacts not found; tried: {}", format_attempts(.attempted))]
    ArtifactNotFound { attempted: Vec<String> },

    /// An artifact exists but could not be read or decoded
    #[error("failed to load {} (paired with {}): {message}", .path.display(), .paired_with.display())]
    ArtifactLoad {
        path: PathBuf,
        paired_with: PathBuf,
        message: String,
    },

    /// An artifact could not be written
    #[error("failed to write {}: {message}", .path.display())]
    ArtifactWrite { path: PathBuf, message: String },

    /// The two artifacts were not written by the same training run
    #[error(
        "artifact pair mismatch: {} and {} carry different fingerprints",
        .descriptors_path.display(),
        .model_path.display()
    )]
    ArtifactMismatch {
        descriptors_path: PathBuf,
        model_path: PathBuf,
    },
}

fn format_attempts(attempted: &[String]) -> String {
    if attempted.is_empty() {
        "no candidate locations configured".to_string()
    } else {
        attempted.join("; ")
    }
}

/// Result type for recognition operations
pub type RecogResult<T> = Result<T, RecogError>;
