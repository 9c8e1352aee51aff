use crate::error::{ModelError, Result};

/// Input parameters for sampling text from a fitted model.
///
/// # Invariants
/// - `randomness` is always within `[0.0, 1.0]`
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationInput {
	/// Number of characters to generate after the prompt.
	pub length: usize,

	/// Probability of sampling a step from the distribution instead of
	/// taking its argmax (0.0 = greedy, 1.0 = always sampled).
	randomness: f64,
}

impl GenerationInput {
	/// Greedy generation of `length` characters.
	pub fn new(length: usize) -> Self {
		Self { length, randomness: 0.0 }
	}

	/// Returns the current randomness factor.
	pub fn randomness(&self) -> f64 {
		self.randomness
	}

	/// Sets the randomness factor (0.0..=1.0).
	///
	/// # Errors
	/// Returns an error if the value is outside the valid range.
	pub fn set_randomness(&mut self, randomness: f64) -> Result<()> {
		if !(0.0..=1.0).contains(&randomness) {
			return Err(ModelError::InvalidConfig(format!(
				"randomness must be between 0.0 and 1.0, got {randomness}"
			)));
		}
		self.randomness = randomness;
		Ok(())
	}
}
