use std::fmt;

use super::context_tree::ContextTree;
use super::distribution::NORMALIZATION_TOLERANCE;
use crate::error::{ModelError, Result};
use crate::text::SymbolStream;

/// Result of scoring a stream against a fitted tree.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Score {
	/// Mean `-log2 p(target)` in bits per character.
	pub mean_loss: f64,
	/// Fraction of positions whose argmax prediction equals the target.
	pub accuracy: f64,
	/// Number of positions scored.
	pub positions: usize,
}

impl fmt::Display for Score {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{:.4} bits/char, accuracy {:.2}% over {} positions", self.mean_loss, self.accuracy * 100.0, self.positions)
	}
}

/// Scores every position `i` in `[n, len)` of `stream`.
///
/// Each position predicts `stream[i]` from `stream[i - n..i]`: the loss is
/// `-log2 p(target)` and the prediction is the distribution's argmax (lowest
/// symbol ID on ties).
///
/// # Errors
/// - `InsufficientHistory` if the stream has no position with `n` symbols of history
/// - `Unnormalized` if a distribution does not sum to 1, which aborts scoring
/// - `SymbolOutOfRange` if the stream was encoded with another vocabulary
pub fn evaluate(stream: &SymbolStream, n: usize, tree: &ContextTree) -> Result<Score> {
	let mut total_loss = 0.0;
	let mut correct = 0usize;
	let mut positions = 0usize;

	for (context, target) in stream.positions(n) {
		let distribution = tree.probabilities(context)?;
		distribution.check_normalized(NORMALIZATION_TOLERANCE)?;

		let p = distribution
			.get(target)
			.ok_or(ModelError::SymbolOutOfRange { symbol: target, vocab_size: tree.vocab_size() })?;
		total_loss -= p.log2();
		if distribution.argmax() == Some(target) {
			correct += 1;
		}
		positions += 1;
	}

	if positions == 0 {
		return Err(ModelError::InsufficientHistory { len: stream.len(), n });
	}

	Ok(Score {
		mean_loss: total_loss / positions as f64,
		accuracy: correct as f64 / positions as f64,
		positions,
	})
}
