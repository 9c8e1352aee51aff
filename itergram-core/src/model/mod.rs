//! Top-level module for the iterative character model.
//!
//! This module provides:
//! - The adaptive-depth count tree (`ContextTree`)
//! - Smoothed next-symbol distributions (`Distribution`)
//! - Fitting and scoring over symbol streams (`fit`, `evaluate`)
//! - A bundled, persistable model (`CharModel`)
//! - Text sampling from a fitted model (`Generator`)

/// Arena-backed count matrix whose context length grows per sequence once
/// a context has been seen more than `threshold` times.
pub mod context_tree;

/// Dense, deterministic next-symbol distributions.
pub mod distribution;

/// Streaming a symbol sequence through the count tree, one or more passes.
pub mod training;

/// Bits-per-character loss and top-1 accuracy over a symbol stream.
pub mod scoring;

/// Vocabulary, context length and tree bundled together.
///
/// Supports cleaning/encoding raw text, prediction from a prompt, and
/// saving/loading with `postcard`.
pub mod char_model;

/// Generation parameters (length, randomness).
pub mod generation_input;

/// Greedy or weighted-random text generation from a fitted model.
pub mod generator;

pub use char_model::CharModel;
pub use context_tree::{ContextTree, TreeStats};
pub use distribution::{Distribution, NORMALIZATION_TOLERANCE};
pub use generation_input::GenerationInput;
pub use generator::Generator;
pub use scoring::{Score, evaluate};
pub use training::{fit, fit_passes};
