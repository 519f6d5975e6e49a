//! mrz-test - Regression test framework for the MRZ crates
//!
//! This crate provides a small regression harness in the spirit of a C
//! `regutils`-style test driver, plus deterministic synthetic fixtures:
//!
//! - [`RegParams`]: numbered value/string comparisons that collect failures
//!   and report them together on [`RegParams::cleanup`]
//! - [`synth`]: rendered glyph images and MRZ-like pages with their boxes
//!
//! # Usage
//!
//! ```ignore
//! use mrz_test::RegParams;
//!
//! let mut rp = RegParams::new("line_group");
//! rp.compare_values(2.0, lines.len() as f64, 0.0);
//! assert!(rp.cleanup());
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: log filter for the crates under test (via `env_logger`)

mod params;
pub mod synth;

pub use params::RegParams;
pub use synth::{render_glyph, render_page, SyntheticPage};
