//! Text side of the model: alphabet, symbol IDs and corpus streams.
//!
//! Everything here runs once, up front, before fitting and scoring touch
//! the count tree.

/// Character alphabet and dense symbol IDs.
mod vocabulary;

/// Immutable symbol sequences and corpus splitting.
mod stream;

pub use stream::{SymbolStream, split_corpus};
pub use vocabulary::Vocabulary;

/// Dense ID of one vocabulary symbol.
pub type Symbol = u32;

/// Character that stands for every symbol outside a vocabulary.
pub const UNKNOWN_CHAR: char = '\u{FFFD}';
