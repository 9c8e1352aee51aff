use rand::Rng;

use super::char_model::CharModel;
use super::distribution::Distribution;
use super::generation_input::GenerationInput;
use crate::error::Result;
use crate::text::Symbol;

/// Samples text from a fitted [`CharModel`].
///
/// # Responsibilities
/// - Encode the prompt with the model's vocabulary (cleaning foreign characters)
/// - Predict each next character from the last `n` generated symbols
/// - Mix greedy (argmax) and weighted random steps according to `randomness`
///
/// The unknown symbol is never produced.
#[derive(Debug)]
pub struct Generator<'m> {
	model: &'m CharModel,
}

impl<'m> Generator<'m> {
	pub fn new(model: &'m CharModel) -> Self {
		Self { model }
	}

	/// Generates up to `input.length` characters following `prompt`.
	///
	/// Returns only the generated continuation. Generation stops early when
	/// the vocabulary has nothing but the unknown symbol.
	///
	/// # Notes
	/// - Deterministic for a seeded `rng`
	/// - With `randomness == 0.0` the `rng` is never drawn from
	pub fn generate<R: Rng + ?Sized>(&self, prompt: &str, input: &GenerationInput, rng: &mut R) -> Result<String> {
		let n = self.model.n();
		let unknown = self.model.vocabulary().unknown();
		let mut history: Vec<Symbol> = self.model.encode(prompt).as_slice().to_vec();
		let mut generated = String::new();

		for _ in 0..input.length {
			let context = &history[history.len().saturating_sub(n)..];
			let distribution = self.model.tree().probabilities(context)?;

			let randomized = input.randomness() > 0.0 && rng.random_range(0.0..1.0) < input.randomness();
			let next = if randomized {
				Self::sample(&distribution, unknown, rng)
			} else {
				distribution.argmax_excluding(Some(unknown))
			};

			let Some(symbol) = next else { break };
			if let Some(ch) = self.model.vocabulary().char_of(symbol) {
				generated.push(ch);
			}
			history.push(symbol);
		}

		Ok(generated)
	}

	/// Picks a symbol with probability proportional to its weight, skipping
	/// `excluded`.
	///
	/// This method performs:
	/// - an O(n) scan to total the remaining weight
	/// - a cumulative subtraction to select a bucket
	fn sample<R: Rng + ?Sized>(distribution: &Distribution, excluded: Symbol, rng: &mut R) -> Option<Symbol> {
		let total: f64 = distribution
			.iter()
			.filter(|&(symbol, _)| symbol != excluded)
			.map(|(_, p)| p)
			.sum();
		if total <= 0.0 {
			return None;
		}

		let mut r = rng.random_range(0.0..total);
		let mut fallback = None;
		for (symbol, p) in distribution.iter().filter(|&(symbol, _)| symbol != excluded) {
			if r < p {
				return Some(symbol);
			}
			r -= p;
			fallback = Some(symbol);
		}

		// Rounding can leave r just above the last bucket
		fallback
	}
}
