//! mrz-recog - Glyph recognition for machine-readable zones
//!
//! This crate turns segmented MRZ glyph boxes into text:
//!
//! - **Descriptors**: HOG features of canonicalized glyphs plus a
//!   per-document height cue
//! - **Classification**: precomputed-kernel SVM, multi-class or one-class
//!   depending on the training labels
//! - **Model store**: fingerprinted artifact pairs resolved from the
//!   environment, injected paths or deployment directories
//! - **OCR**: line filtering, batched classification and line reassembly
//!
//! # Quick Start
//!
//! ```no_run
//! use mrz_recog::{ModelStore, OcrOptions, SegmentedImage, load_gray, read_lines};
//! use mrz_core::Region;
//!
//! let bytes = std::fs::read("passport.png").unwrap();
//! let image = load_gray(&bytes).unwrap();
//! let regions: Vec<Region> = Vec::new(); // from a segmenter
//!
//! let segmented = SegmentedImage::from_regions(image, regions);
//! let result = read_lines(segmented, &ModelStore::from_env(), &OcrOptions::default()).unwrap();
//! for line in &result.lines {
//!     println!("{line}");
//! }
//! ```
//!
//! # Modules
//!
//! - [`glyph`]: Image loading, cropping and canonicalization
//! - [`hog`]: Histogram of oriented gradients
//! - [`descriptor`]: Complete glyph descriptors
//! - [`kernel`]: Kernel functions and precomputed matrices
//! - [`svm`]: SMO solver and trained machines
//! - [`classifier`]: Training and prediction
//! - [`store`]: Artifact persistence
//! - [`ocr`]: Line reading

pub mod classifier;
pub mod descriptor;
mod error;
pub mod glyph;
pub mod hog;
pub mod kernel;
pub mod ocr;
pub mod store;
pub mod svm;

pub use error::{RecogError, RecogResult};

// Re-export commonly used types
pub use classifier::{
    Classifier, ClassifierOptions, Evaluation, GlyphPredictor, Misclassification, TrainReport,
    predict, train,
};
pub use descriptor::{
    Descriptor, TrainingSample, build_training_set, get_descriptor, get_descriptors,
    height_features,
};
pub use glyph::{Glyph, LabeledGlyph, crop_region, load_gray};
pub use hog::{HogOptions, hog};
pub use kernel::KernelOptions;
pub use ocr::{OcrOptions, OcrResult, SegmentedImage, UNKNOWN_CHAR, apply_ocr, read_lines};
pub use store::{ModelPathConfig, ModelPaths, ModelStore, load_classifier, save_classifier};
pub use svm::{SvmModel, SvmParams, TrainingMode};

// Re-export core for convenience
pub use mrz_core;
