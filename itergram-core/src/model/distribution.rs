use crate::error::{ModelError, Result};
use crate::text::Symbol;

/// Largest allowed deviation of a distribution's sum from 1.
pub const NORMALIZATION_TOLERANCE: f64 = 1e-4;

/// A next-symbol probability distribution over a whole vocabulary.
///
/// Stored densely and indexed by symbol ID, so enumeration order is the ID
/// order and argmax tie-breaking is deterministic.
#[derive(Clone, Debug, PartialEq)]
pub struct Distribution {
	probabilities: Vec<f64>,
}

impl Distribution {
	/// Laplace (+1) smoothed distribution for a node's counts:
	/// `p(s) = (counts[s] + 1) / (total + vocab_size)`.
	pub(crate) fn smoothed(counts: &[u64], total: u64) -> Self {
		let denominator = (total + counts.len() as u64) as f64;
		Self {
			probabilities: counts.iter().map(|&count| (count + 1) as f64 / denominator).collect(),
		}
	}

	/// The smoothed distribution of an all-zero node.
	pub(crate) fn uniform(vocab_size: usize) -> Self {
		Self { probabilities: vec![1.0 / vocab_size as f64; vocab_size] }
	}

	pub fn len(&self) -> usize {
		self.probabilities.len()
	}

	pub fn is_empty(&self) -> bool {
		self.probabilities.is_empty()
	}

	/// Probability of `symbol`, or `None` if it is outside the vocabulary.
	pub fn get(&self, symbol: Symbol) -> Option<f64> {
		self.probabilities.get(symbol as usize).copied()
	}

	/// Probabilities in symbol ID order.
	pub fn as_slice(&self) -> &[f64] {
		&self.probabilities
	}

	/// `(symbol, probability)` pairs in symbol ID order.
	pub fn iter(&self) -> impl Iterator<Item = (Symbol, f64)> + '_ {
		self.probabilities.iter().enumerate().map(|(id, &p)| (id as Symbol, p))
	}

	/// Most probable symbol. Ties go to the lowest ID.
	pub fn argmax(&self) -> Option<Symbol> {
		self.argmax_excluding(None)
	}

	/// Most probable symbol other than `excluded`. Ties go to the lowest ID.
	pub fn argmax_excluding(&self, excluded: Option<Symbol>) -> Option<Symbol> {
		let mut best: Option<(Symbol, f64)> = None;
		for (symbol, p) in self.iter() {
			if Some(symbol) == excluded {
				continue;
			}
			match best {
				Some((_, best_p)) if p <= best_p => {}
				_ => best = Some((symbol, p)),
			}
		}
		best.map(|(symbol, _)| symbol)
	}

	pub fn sum(&self) -> f64 {
		self.probabilities.iter().sum()
	}

	/// Checks that the distribution sums to 1 within `tolerance`.
	///
	/// # Errors
	/// Returns `Unnormalized` otherwise. Smoothing guarantees this never
	/// fires, so an error here is an internal defect.
	pub fn check_normalized(&self, tolerance: f64) -> Result<()> {
		let sum = self.sum();
		if (sum - 1.0).abs() > tolerance {
			return Err(ModelError::Unnormalized { sum });
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use float_cmp::approx_eq;

	#[test]
	fn smoothing_adds_one_to_every_count() {
		let distribution = Distribution::smoothed(&[3, 1, 0], 4);
		assert!(approx_eq!(f64, distribution.get(0).unwrap(), 4.0 / 7.0, ulps = 2));
		assert!(approx_eq!(f64, distribution.get(1).unwrap(), 2.0 / 7.0, ulps = 2));
		assert!(approx_eq!(f64, distribution.get(2).unwrap(), 1.0 / 7.0, ulps = 2));
		assert_eq!(distribution.get(3), None);
		assert!(distribution.check_normalized(NORMALIZATION_TOLERANCE).is_ok());
	}

	#[test]
	fn zero_counts_are_uniform() {
		assert_eq!(Distribution::smoothed(&[0; 4], 0), Distribution::uniform(4));
	}

	#[test]
	fn argmax_breaks_ties_on_lowest_id() {
		let distribution = Distribution::smoothed(&[0, 5, 5, 1], 11);
		assert_eq!(distribution.argmax(), Some(1));
		assert_eq!(distribution.argmax_excluding(Some(1)), Some(2));
		assert_eq!(Distribution::uniform(3).argmax(), Some(0));
	}

	#[test]
	fn unnormalized_distribution_is_reported() {
		let broken = Distribution { probabilities: vec![0.5, 0.6] };
		assert!(matches!(
			broken.check_normalized(NORMALIZATION_TOLERANCE),
			Err(ModelError::Unnormalized { .. })
		));
	}
}
