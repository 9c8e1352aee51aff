//! Iterative variable-order character n-gram modeling.
//!
//! This crate provides:
//! - Deterministic character vocabularies with a reserved unknown symbol
//! - Cleaning and encoding of raw corpora into symbol streams
//! - An adaptive-depth count tree that lengthens a context only once it has
//!   proven frequent, with Laplace-smoothed next-symbol distributions
//! - Fitting, bits-per-character scoring and text generation
//! - End-to-end experiment runs over primary, auxiliary and test corpora
//!
//! # Example
//! ```rust
//! use itergram_core::model::CharModel;
//! use itergram_core::text::Vocabulary;
//!
//! let text = "mwana wa mwana wa mwana";
//! let mut model = CharModel::new(Vocabulary::build(text), 3, 2);
//! let stream = model.encode(text);
//! model.fit(&stream, 1).unwrap();
//!
//! let score = model.evaluate(&model.encode("mwana wa")).unwrap();
//! assert_eq!(score.positions, 5);
//! println!("{score}");
//! ```

/// Alphabet, symbol IDs and corpus streams.
pub mod text;

/// Count tree, fitting, scoring, persistence and generation.
pub mod model;

/// Configured end-to-end runs.
pub mod experiment;

/// Error type shared by the whole crate.
pub mod error;

/// Corpus loading and output path helpers, used by the experiment runner.
pub(crate) mod io;

pub use error::{ModelError, Result};
