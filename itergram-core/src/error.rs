use crate::text::Symbol;

/// Errors produced while building, fitting, scoring or persisting a model.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
	/// Text handed to `Vocabulary::encode` still contains a character the
	/// vocabulary does not know. Callers must `clean` first.
	#[error("character {ch:?} at position {position} is not in the vocabulary")]
	UnknownCharacter { ch: char, position: usize },

	/// A symbol ID does not fit the tree it is used with.
	#[error("symbol {symbol} is out of range for a vocabulary of {vocab_size} symbols")]
	SymbolOutOfRange { symbol: Symbol, vocab_size: usize },

	/// A smoothed distribution does not sum to 1. This is a broken invariant,
	/// not bad input, and aborts the run.
	#[error("probability distribution sums to {sum}, expected 1")]
	Unnormalized { sum: f64 },

	/// The stream is too short to score a single position.
	#[error("stream of {len} symbols has no position with {n} symbols of history")]
	InsufficientHistory { len: usize, n: usize },

	#[error("invalid configuration: {0}")]
	InvalidConfig(String),

	/// A deserialized model violates a structural invariant.
	#[error("corrupt model: {0}")]
	CorruptModel(String),

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error("serialization failed: {0}")]
	Serialization(#[from] postcard::Error),
}

pub type Result<T> = std::result::Result<T, ModelError>;
