//! Precomputed-kernel support vector machines
//!
//! Two training modes share one solver:
//!
//! - **Multi-class**: C-support classification, one binary machine per
//!   pair of classes, prediction by majority vote.
//! - **One-class**: a novelty detector trained on samples of a single
//!   class; rows it rejects predict no label.
//!
//! Both consume kernel matrices whose column 0 holds the 1-based sample
//! serial number (see [`crate::kernel::precomputed_matrix`]).

mod model;
mod solver;

pub use model::{BinaryMachine, SupportVector, SvmModel, SvmParams, TrainingMode};
