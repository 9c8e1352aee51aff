use serde::{Deserialize, Serialize};

use super::Symbol;

/// An immutable sequence of symbol IDs for one corpus.
///
/// Built once per corpus (train, validation, test, auxiliary) and only read
/// afterwards by fitting and scoring.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct SymbolStream {
	symbols: Vec<Symbol>,
}

impl SymbolStream {
	pub fn len(&self) -> usize {
		self.symbols.len()
	}

	pub fn is_empty(&self) -> bool {
		self.symbols.is_empty()
	}

	pub fn as_slice(&self) -> &[Symbol] {
		&self.symbols
	}

	/// Number of positions with at least `n` preceding symbols.
	pub fn scoreable(&self, n: usize) -> usize {
		self.symbols.len().saturating_sub(n)
	}

	/// Yields `(context, target)` for every position `i` in `[n, len)`, with
	/// `context = stream[i - n..i]` (most recent last) and `target = stream[i]`.
	///
	/// Positions with fewer than `n` preceding symbols are skipped.
	pub fn positions(&self, n: usize) -> impl Iterator<Item = (&[Symbol], Symbol)> + '_ {
		(n..self.symbols.len()).map(move |i| (&self.symbols[i - n..i], self.symbols[i]))
	}
}

impl From<Vec<Symbol>> for SymbolStream {
	fn from(symbols: Vec<Symbol>) -> Self {
		Self { symbols }
	}
}

/// Splits raw text into `(train, validation)` by character count.
///
/// The last `floor(val_split * chars)` characters form the validation part.
/// `val_split` is clamped to `[0, 1]`.
pub fn split_corpus(text: &str, val_split: f64) -> (&str, &str) {
	let total = text.chars().count();
	let validation = (val_split.clamp(0.0, 1.0) * total as f64).floor() as usize;
	let train_chars = total - validation.min(total);

	let boundary = text
		.char_indices()
		.nth(train_chars)
		.map(|(offset, _)| offset)
		.unwrap_or(text.len());
	text.split_at(boundary)
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[test]
	fn positions_skip_short_history() {
		let stream = SymbolStream::from(vec![0, 1, 2, 3]);
		let positions: Vec<(Vec<Symbol>, Symbol)> =
			stream.positions(2).map(|(context, target)| (context.to_vec(), target)).collect();
		assert_eq!(positions, vec![(vec![0, 1], 2), (vec![1, 2], 3)]);
		assert_eq!(stream.scoreable(2), 2);
	}

	#[test]
	fn zero_order_positions_have_empty_context() {
		let stream = SymbolStream::from(vec![4, 5]);
		let positions: Vec<(Vec<Symbol>, Symbol)> =
			stream.positions(0).map(|(context, target)| (context.to_vec(), target)).collect();
		assert_eq!(positions, vec![(vec![], 4), (vec![], 5)]);
	}

	#[rstest]
	#[case(3)]
	#[case(4)]
	#[case(10)]
	fn stream_no_longer_than_n_has_no_positions(#[case] n: usize) {
		let stream = SymbolStream::from(vec![0, 1, 2]);
		assert_eq!(stream.positions(n).count(), 0);
		assert_eq!(stream.scoreable(n), 0);
	}

	#[rstest]
	#[case("abcdefghij", 0.1, "abcdefghi", "j")]
	#[case("abcdefghij", 0.25, "abcdefgh", "ij")]
	#[case("abcdefghij", 0.0, "abcdefghij", "")]
	#[case("abcdefghij", 1.0, "", "abcdefghij")]
	#[case("ŋŋŋŋ", 0.5, "ŋŋ", "ŋŋ")]
	#[case("", 0.3, "", "")]
	fn split_by_characters(
		#[case] text: &str,
		#[case] val_split: f64,
		#[case] train: &str,
		#[case] validation: &str,
	) {
		assert_eq!(split_corpus(text, val_split), (train, validation));
	}
}
