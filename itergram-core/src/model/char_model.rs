use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use super::context_tree::ContextTree;
use super::distribution::Distribution;
use super::scoring::{Score, evaluate};
use super::training::fit_passes;
use crate::error::{ModelError, Result};
use crate::text::{SymbolStream, Vocabulary};

/// A fitted character model: vocabulary, context length and count tree.
///
/// # Responsibilities
/// - Clean and encode raw text into the model's symbol IDs
/// - Fit and score symbol streams with a fixed maximum context length `n`
/// - Predict the next-character distribution for a text prompt
/// - Persist itself with `postcard`
///
/// # Invariants
/// - `tree.vocab_size() == vocabulary.len()`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(try_from = "ModelParts")]
pub struct CharModel {
	n: usize,
	vocabulary: Vocabulary,
	tree: ContextTree,
}

impl CharModel {
	/// Creates an unfitted model over `vocabulary`.
	pub fn new(vocabulary: Vocabulary, n: usize, threshold: u64) -> Self {
		let tree = ContextTree::new(vocabulary.len(), threshold);
		Self { n, vocabulary, tree }
	}

	/// Maximum context length.
	pub fn n(&self) -> usize {
		self.n
	}

	pub fn vocabulary(&self) -> &Vocabulary {
		&self.vocabulary
	}

	pub fn tree(&self) -> &ContextTree {
		&self.tree
	}

	/// Cleans `text` against the vocabulary and encodes it.
	pub fn encode(&self, text: &str) -> SymbolStream {
		self.vocabulary.encode_cleaned(text)
	}

	/// Fits `iterations` passes over `stream`. Returns the positions recorded.
	pub fn fit(&mut self, stream: &SymbolStream, iterations: usize) -> Result<usize> {
		fit_passes(stream, self.n, &mut self.tree, iterations)
	}

	pub fn evaluate(&self, stream: &SymbolStream) -> Result<Score> {
		evaluate(stream, self.n, &self.tree)
	}

	/// Next-character distribution after `prompt`, using at most its last
	/// `n` characters.
	pub fn predict(&self, prompt: &str) -> Result<Distribution> {
		let stream = self.encode(prompt);
		let symbols = stream.as_slice();
		self.tree.probabilities(&symbols[symbols.len().saturating_sub(self.n)..])
	}

	/// Serializes the model to `path`.
	pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
		let bytes = postcard::to_stdvec(self)?;
		std::fs::write(&path, bytes)?;
		debug!("model saved to {}", path.as_ref().display());
		Ok(())
	}

	/// Loads a model written by [`CharModel::save`].
	///
	/// # Errors
	/// Fails on I/O errors, undecodable bytes, or a model whose structure
	/// violates the tree or vocabulary invariants.
	pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
		let bytes = std::fs::read(&path)?;
		let model: Self = postcard::from_bytes(&bytes)?;
		debug!("model loaded from {}", path.as_ref().display());
		Ok(model)
	}
}

#[derive(Deserialize)]
struct ModelParts {
	n: usize,
	vocabulary: Vocabulary,
	tree: ContextTree,
}

impl TryFrom<ModelParts> for CharModel {
	type Error = ModelError;

	fn try_from(parts: ModelParts) -> Result<Self> {
		let ModelParts { n, vocabulary, tree } = parts;
		if tree.vocab_size() != vocabulary.len() {
			return Err(ModelError::CorruptModel(format!(
				"tree expects {} symbols, vocabulary has {}",
				tree.vocab_size(),
				vocabulary.len()
			)));
		}
		Ok(Self { n, vocabulary, tree })
	}
}
