use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::io::build_output_path;

pub const DEFAULT_N: usize = 5;
pub const DEFAULT_THRESHOLD: u64 = 64;
pub const DEFAULT_VAL_SPLIT: f64 = 0.1;

/// Parameters of one fitting and scoring run.
///
/// Passed explicitly to [`run`](super::run); there is no global parameter
/// state.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ExperimentConfig {
	/// Maximum context length considered.
	pub n: usize,

	/// Total count a node must exceed before it grows children.
	pub threshold: u64,

	/// Fitting passes over the primary training stream.
	pub train_iterations: usize,

	/// Fitting passes over the auxiliary corpus, run before the primary ones.
	pub aux_iterations: usize,

	/// Fraction of the training corpus (by characters, taken from the end)
	/// reserved for validation.
	pub val_split: f64,

	/// Primary training corpus. Its training part defines the vocabulary.
	pub train_path: PathBuf,

	/// Corpus in a related language, cleaned into the primary vocabulary.
	pub aux_path: Option<PathBuf>,

	/// Build the vocabulary over the training part and the auxiliary corpus
	/// together instead of the training part alone.
	#[serde(default)]
	pub shared_vocabulary: bool,

	/// Held-out test corpus.
	pub test_path: Option<PathBuf>,

	/// Where to save the fitted model, if anywhere.
	pub model_path: Option<PathBuf>,
}

impl ExperimentConfig {
	/// Default parameters for a run over `train_path` only.
	pub fn new<P: Into<PathBuf>>(train_path: P) -> Self {
		Self {
			n: DEFAULT_N,
			threshold: DEFAULT_THRESHOLD,
			train_iterations: 1,
			aux_iterations: 1,
			val_split: DEFAULT_VAL_SPLIT,
			train_path: train_path.into(),
			aux_path: None,
			shared_vocabulary: false,
			test_path: None,
			model_path: None,
		}
	}

	/// Model path next to the training corpus: `data/kwere.txt` → `data/kwere.bin`.
	pub fn default_model_path(&self) -> Result<PathBuf> {
		Ok(build_output_path(&self.train_path, "bin")?)
	}

	/// # Errors
	/// Returns `InvalidConfig` for zero passes or a `val_split` outside `[0, 1)`.
	pub fn validate(&self) -> Result<()> {
		if self.train_iterations == 0 {
			return Err(ModelError::InvalidConfig("train_iterations must be at least 1".to_owned()));
		}
		if self.aux_path.is_some() && self.aux_iterations == 0 {
			return Err(ModelError::InvalidConfig("aux_iterations must be at least 1".to_owned()));
		}
		if !(0.0..1.0).contains(&self.val_split) {
			return Err(ModelError::InvalidConfig(format!(
				"val_split must be in [0, 1), got {}",
				self.val_split
			)));
		}
		Ok(())
	}
}
