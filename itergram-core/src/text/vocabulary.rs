use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use super::{Symbol, SymbolStream, UNKNOWN_CHAR};
use crate::error::{ModelError, Result};

/// Maps the character alphabet of a corpus to dense symbol IDs.
///
/// IDs are assigned deterministically: distinct characters sorted by code
/// point take `0..k`, and the reserved unknown character takes the last ID.
/// Two vocabularies built from texts with the same alphabet are therefore
/// identical, which keeps argmax tie-breaking stable across runs.
///
/// # Invariants
/// - `UNKNOWN_CHAR` is always a member
/// - `chars[id]` and `index[&ch]` are inverse bijections over `[0, len)`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(try_from = "Vec<char>", into = "Vec<char>")]
pub struct Vocabulary {
	/// Character for each ID, in ID order.
	chars: Vec<char>,
	/// Reverse lookup from character to ID.
	index: HashMap<char, Symbol>,
	/// ID of `UNKNOWN_CHAR`.
	unknown: Symbol,
}

impl Vocabulary {
	/// Builds a vocabulary from the distinct characters of `text`, plus the
	/// unknown symbol.
	pub fn build(text: &str) -> Self {
		Self::build_from([text])
	}

	/// Builds a vocabulary over the union alphabet of several texts.
	pub fn build_from<'a, I>(texts: I) -> Self
	where
		I: IntoIterator<Item = &'a str>,
	{
		let mut distinct: BTreeSet<char> = texts.into_iter().flat_map(str::chars).collect();
		// U+FFFD in the corpus is the unknown symbol itself
		distinct.remove(&UNKNOWN_CHAR);

		let mut chars: Vec<char> = distinct.into_iter().collect();
		chars.push(UNKNOWN_CHAR);
		Self::from_ordered(chars)
	}

	/// Builds the lookup index for an already ordered, duplicate-free list.
	fn from_ordered(chars: Vec<char>) -> Self {
		let index: HashMap<char, Symbol> = chars
			.iter()
			.enumerate()
			.map(|(id, &ch)| (ch, id as Symbol))
			.collect();
		let unknown = index[&UNKNOWN_CHAR];
		Self { chars, index, unknown }
	}

	/// Number of symbols, unknown included.
	pub fn len(&self) -> usize {
		self.chars.len()
	}

	/// Never true: the unknown symbol is always present.
	pub fn is_empty(&self) -> bool {
		self.chars.is_empty()
	}

	/// ID of the reserved unknown symbol.
	pub fn unknown(&self) -> Symbol {
		self.unknown
	}

	/// ID of `ch`, if it belongs to the vocabulary.
	pub fn symbol(&self, ch: char) -> Option<Symbol> {
		self.index.get(&ch).copied()
	}

	/// Character for `symbol`, if the ID is in range.
	pub fn char_of(&self, symbol: Symbol) -> Option<char> {
		self.chars.get(symbol as usize).copied()
	}

	/// Characters in ID order.
	pub fn chars(&self) -> &[char] {
		&self.chars
	}

	/// Replaces every character absent from this vocabulary with
	/// `UNKNOWN_CHAR`, preserving length (in characters) and order.
	///
	/// Idempotent: the output only contains vocabulary characters.
	pub fn clean(&self, text: &str) -> String {
		text.chars()
			.map(|ch| if self.index.contains_key(&ch) { ch } else { UNKNOWN_CHAR })
			.collect()
	}

	/// Maps each character of `text` to its ID.
	///
	/// # Errors
	/// Returns `UnknownCharacter` on the first character outside the
	/// vocabulary. Text from another corpus must go through `clean` first.
	pub fn encode(&self, text: &str) -> Result<SymbolStream> {
		text.chars()
			.enumerate()
			.map(|(position, ch)| self.symbol(ch).ok_or(ModelError::UnknownCharacter { ch, position }))
			.collect::<Result<Vec<Symbol>>>()
			.map(SymbolStream::from)
	}

	/// `clean` followed by `encode`, which cannot fail.
	pub fn encode_cleaned(&self, text: &str) -> SymbolStream {
		let symbols: Vec<Symbol> = text
			.chars()
			.map(|ch| self.symbol(ch).unwrap_or(self.unknown))
			.collect();
		SymbolStream::from(symbols)
	}

	/// Maps IDs back to characters. Out-of-range IDs decode as `UNKNOWN_CHAR`.
	pub fn decode(&self, symbols: &[Symbol]) -> String {
		symbols
			.iter()
			.map(|&symbol| self.char_of(symbol).unwrap_or(UNKNOWN_CHAR))
			.collect()
	}
}

impl TryFrom<Vec<char>> for Vocabulary {
	type Error = ModelError;

	fn try_from(chars: Vec<char>) -> Result<Self> {
		let distinct: BTreeSet<char> = chars.iter().copied().collect();
		if distinct.len() != chars.len() {
			return Err(ModelError::CorruptModel("duplicate characters in vocabulary".to_owned()));
		}
		if !distinct.contains(&UNKNOWN_CHAR) {
			return Err(ModelError::CorruptModel("vocabulary has no unknown symbol".to_owned()));
		}
		Ok(Self::from_ordered(chars))
	}
}

impl From<Vocabulary> for Vec<char> {
	fn from(vocabulary: Vocabulary) -> Self {
		vocabulary.chars
	}
}
