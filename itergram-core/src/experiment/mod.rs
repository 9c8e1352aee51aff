//! End-to-end runs: load corpora, build the vocabulary, fit, score.

/// Run parameters.
mod config;

use std::fmt;
use std::path::Path;

use log::{info, warn};

pub use config::{DEFAULT_N, DEFAULT_THRESHOLD, DEFAULT_VAL_SPLIT, ExperimentConfig};

use crate::error::Result;
use crate::io::{get_filename, read_corpus};
use crate::model::{CharModel, Score};
use crate::text::{SymbolStream, Vocabulary, split_corpus};

/// Role of a corpus in a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Split {
	Train,
	Validation,
	Test,
	Auxiliary,
}

impl fmt::Display for Split {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Split::Train => "train",
			Split::Validation => "validation",
			Split::Test => "test",
			Split::Auxiliary => "auxiliary",
		};
		f.write_str(name)
	}
}

/// A named raw-text corpus.
#[derive(Clone, Debug)]
pub struct Corpus {
	pub name: String,
	pub text: String,
}

impl Corpus {
	pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
		Self { name: name.into(), text: text.into() }
	}

	/// Reads a corpus file, named after its file stem.
	pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
		Ok(Self { name: get_filename(&path)?, text: read_corpus(&path)? })
	}
}

/// Every corpus a run uses.
#[derive(Clone, Debug)]
pub struct Corpora {
	pub train: Corpus,
	pub aux: Option<Corpus>,
	pub test: Option<Corpus>,
}

impl Corpora {
	/// Reads the corpora named by `config`.
	pub fn read(config: &ExperimentConfig) -> Result<Self> {
		Ok(Self {
			train: Corpus::read(&config.train_path)?,
			aux: config.aux_path.as_ref().map(Corpus::read).transpose()?,
			test: config.test_path.as_ref().map(Corpus::read).transpose()?,
		})
	}
}

/// Size of one symbol stream fed to the model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorpusSummary {
	pub split: Split,
	pub name: String,
	pub symbols: usize,
	/// Symbols mapped to the unknown symbol by cleaning.
	pub unknown: usize,
}

/// Everything a run measured, plus the fitted model.
#[derive(Debug)]
pub struct ExperimentReport {
	pub corpora: Vec<CorpusSummary>,
	pub vocab_size: usize,
	pub scores: Vec<(Split, Score)>,
	pub model: CharModel,
}

impl ExperimentReport {
	pub fn score(&self, split: Split) -> Option<&Score> {
		self.scores.iter().find(|(s, _)| *s == split).map(|(_, score)| score)
	}
}

/// Reads the corpora named by `config` and runs on them.
pub fn run(config: &ExperimentConfig) -> Result<ExperimentReport> {
	let corpora = Corpora::read(config)?;
	let report = run_with(config, &corpora)?;

	if let Some(path) = &config.model_path {
		report.model.save(path)?;
		info!("model written to {}", path.display());
	}
	Ok(report)
}

/// Runs on corpora already in memory. File paths in `config` are ignored.
///
/// 1. split validation off the end of the training corpus
/// 2. build the vocabulary from the training part, joined by the auxiliary
///    corpus when `shared_vocabulary` is set
/// 3. clean and encode every other corpus into that vocabulary
/// 4. fit the auxiliary corpus, then the primary training stream
/// 5. score every stream that has at least one position with `n` symbols of history
pub fn run_with(config: &ExperimentConfig, corpora: &Corpora) -> Result<ExperimentReport> {
	config.validate()?;

	let (train_text, validation_text) = split_corpus(&corpora.train.text, config.val_split);
	let vocabulary = match &corpora.aux {
		Some(aux) if config.shared_vocabulary => Vocabulary::build_from([train_text, aux.text.as_str()]),
		_ => Vocabulary::build(train_text),
	};
	info!("vocabulary of {}: {} symbols", corpora.train.name, vocabulary.len());
	let vocab_size = vocabulary.len();
	let mut model = CharModel::new(vocabulary, config.n, config.threshold);

	let mut streams: Vec<(Split, &str, SymbolStream)> = vec![
		(Split::Train, corpora.train.name.as_str(), model.encode(train_text)),
		(Split::Validation, corpora.train.name.as_str(), model.encode(validation_text)),
	];
	if let Some(test) = &corpora.test {
		streams.push((Split::Test, test.name.as_str(), model.encode(&test.text)));
	}
	if let Some(aux) = &corpora.aux {
		streams.push((Split::Auxiliary, aux.name.as_str(), model.encode(&aux.text)));
	}

	let unknown = model.vocabulary().unknown();
	let summaries: Vec<CorpusSummary> = streams
		.iter()
		.map(|(split, name, stream)| CorpusSummary {
			split: *split,
			name: (*name).to_owned(),
			symbols: stream.len(),
			unknown: stream.as_slice().iter().filter(|&&symbol| symbol == unknown).count(),
		})
		.collect();
	for summary in &summaries {
		info!(
			"{} ({}): {} symbols, {} unknown",
			summary.split, summary.name, summary.symbols, summary.unknown
		);
	}

	if let Some((_, name, aux)) = streams.iter().find(|(split, ..)| *split == Split::Auxiliary) {
		info!("fitting {name} ({} passes)", config.aux_iterations);
		model.fit(aux, config.aux_iterations)?;
	}
	info!("fitting {} ({} passes)", corpora.train.name, config.train_iterations);
	model.fit(&streams[0].2, config.train_iterations)?;

	let mut scores = Vec::new();
	for (split, name, stream) in &streams {
		if stream.scoreable(config.n) == 0 {
			warn!("{split} ({name}) is too short to score with n = {}", config.n);
			continue;
		}
		let score = model.evaluate(stream)?;
		info!("{split} ({name}): {score}");
		scores.push((*split, score));
	}

	Ok(ExperimentReport { corpora: summaries, vocab_size, scores, model })
}

#[cfg(test)]
mod tests {
	use super::*;

	fn corpora() -> Corpora {
		Corpora {
			train: Corpus::new("kwere", "mwana wa mwana wa mwana wa mwana wa mwana"),
			aux: Some(Corpus::new("swahili", "mwana wangu, mwana wako!")),
			test: Some(Corpus::new("kwere_test", "mwana wa mwana")),
		}
	}

	#[test]
	fn every_split_is_scored() {
		let mut config = ExperimentConfig::new("unused.txt");
		config.n = 2;
		config.threshold = 2;
		config.val_split = 0.25;
		let report = run_with(&config, &corpora()).unwrap();

		for split in [Split::Train, Split::Validation, Split::Test, Split::Auxiliary] {
			let score = report.score(split).unwrap_or_else(|| panic!("{split} not scored"));
			assert!(score.mean_loss > 0.0);
			assert!((0.0..=1.0).contains(&score.accuracy));
		}
		assert_eq!(report.vocab_size, report.model.vocabulary().len());
	}

	#[test]
	fn auxiliary_characters_outside_training_alphabet_become_unknown() {
		let mut config = ExperimentConfig::new("unused.txt");
		config.val_split = 0.0;
		config.n = 1;
		let report = run_with(&config, &corpora()).unwrap();

		let aux = report.corpora.iter().find(|c| c.split == Split::Auxiliary).unwrap();
		// g, u, ',', k, o and '!' never occur in the training text
		assert_eq!(aux.unknown, 6);
		let validation = report.corpora.iter().find(|c| c.split == Split::Validation).unwrap();
		assert_eq!(validation.symbols, 0);
		assert!(report.score(Split::Validation).is_none());
	}

	#[test]
	fn shared_vocabulary_keeps_auxiliary_characters() {
		let mut config = ExperimentConfig::new("unused.txt");
		config.val_split = 0.0;
		config.n = 1;
		config.shared_vocabulary = true;
		let report = run_with(&config, &corpora()).unwrap();

		let aux = report.corpora.iter().find(|c| c.split == Split::Auxiliary).unwrap();
		assert_eq!(aux.unknown, 0);
		assert_eq!(report.vocab_size, Vocabulary::build("mwana wa").len() + 6);
		for ch in ['g', 'k', '!'] {
			assert!(report.model.vocabulary().symbol(ch).is_some());
		}
	}

	#[test]
	fn shared_vocabulary_without_auxiliary_corpus_uses_training_alphabet() {
		let mut config = ExperimentConfig::new("unused.txt");
		config.val_split = 0.0;
		config.shared_vocabulary = true;
		let corpora = Corpora { aux: None, ..corpora() };
		let report = run_with(&config, &corpora).unwrap();
		assert_eq!(report.model.vocabulary(), &Vocabulary::build(&corpora.train.text));
	}

	#[test]
	fn invalid_configuration_is_rejected_before_fitting() {
		let mut config = ExperimentConfig::new("unused.txt");
		config.train_iterations = 0;
		assert!(matches!(run_with(&config, &corpora()), Err(crate::ModelError::InvalidConfig(_))));
	}

	#[test]
	fn oversampling_changes_the_fit() {
		let mut config = ExperimentConfig::new("unused.txt");
		config.n = 2;
		config.threshold = 4;
		let once = run_with(&config, &corpora()).unwrap();
		config.train_iterations = 4;
		let four = run_with(&config, &corpora()).unwrap();

		let root_once: u64 = once.model.tree().counts_at(&[]).unwrap().iter().sum();
		let root_four: u64 = four.model.tree().counts_at(&[]).unwrap().iter().sum();
		let train = once.corpora[0].symbols as u64 - 2;
		let aux = once.corpora.iter().find(|c| c.split == Split::Auxiliary).unwrap().symbols as u64 - 2;
		assert_eq!(root_once, train + aux);
		assert_eq!(root_four, 4 * train + aux);
	}
}
