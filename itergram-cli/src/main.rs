use std::path::PathBuf;

use clap::Parser;
use itergram_core::experiment::{self, DEFAULT_N, DEFAULT_THRESHOLD, DEFAULT_VAL_SPLIT, ExperimentConfig};
use itergram_core::model::{GenerationInput, Generator};
use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Fits an iterative character n-gram model and reports bits per character.
#[derive(Parser)]
#[command(version, about)]
struct Args {
	/// Primary training corpus (its training part defines the vocabulary)
	#[arg(short = 't', long, required = true)]
	train: PathBuf,

	/// Auxiliary corpus in a related language, fitted before the primary one
	#[arg(short = 'a', long)]
	aux: Option<PathBuf>,

	/// Held-out test corpus
	#[arg(long)]
	test: Option<PathBuf>,

	/// Maximum context length
	#[arg(short = 'n', long, default_value_t = DEFAULT_N)]
	n: usize,

	/// Total count a context must exceed before it is refined
	#[arg(long, default_value_t = DEFAULT_THRESHOLD)]
	threshold: u64,

	/// Fitting passes over the primary corpus
	#[arg(long, default_value_t = 1)]
	train_iterations: usize,

	/// Fitting passes over the auxiliary corpus
	#[arg(long, default_value_t = 1)]
	aux_iterations: usize,

	/// Fraction of the primary corpus reserved for validation
	#[arg(long, default_value_t = DEFAULT_VAL_SPLIT)]
	val_split: f64,

	/// Save the fitted model (next to the training corpus if no path is given)
	#[arg(short = 'o', long, num_args = 0..=1)]
	save: Option<Option<PathBuf>>,

	/// Build the vocabulary over the training and auxiliary corpora together
	#[arg(long)]
	shared_vocabulary: bool,

	/// Number of characters to generate after the run
	#[arg(short = 'g', long, default_value_t = 0)]
	generate: usize,

	/// Text the generated characters continue
	#[arg(long, default_value = "")]
	prompt: String,

	/// Probability of sampling each generated character instead of taking the most likely one
	#[arg(long, default_value_t = 0.0)]
	randomness: f64,

	/// Seed for generation (random if absent)
	#[arg(long)]
	seed: Option<u64>,
}

impl Args {
	/// Maps the command line onto an experiment configuration.
	fn config(&self) -> Result<ExperimentConfig, Box<dyn std::error::Error>> {
		let mut config = ExperimentConfig::new(&self.train);
		config.n = self.n;
		config.threshold = self.threshold;
		config.train_iterations = self.train_iterations;
		config.aux_iterations = self.aux_iterations;
		config.val_split = self.val_split;
		config.aux_path = self.aux.clone();
		config.shared_vocabulary = self.shared_vocabulary;
		config.test_path = self.test.clone();
		config.model_path = match &self.save {
			Some(None) => Some(config.default_model_path()?),
			Some(Some(path)) => Some(path.clone()),
			None => None,
		};
		config.validate()?;
		Ok(config)
	}

	/// Generation request, if any characters were asked for.
	fn generation_input(&self) -> Result<Option<GenerationInput>, Box<dyn std::error::Error>> {
		if self.generate == 0 {
			return Ok(None);
		}
		let mut input = GenerationInput::new(self.generate);
		input.set_randomness(self.randomness)?;
		Ok(Some(input))
	}
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let args = Args::parse();
	let config = args.config()?;
	let generation = args.generation_input()?;
	let report = experiment::run(&config)?;

	println!("vocabulary: {} symbols (random baseline {:.4} bits/char)", report.vocab_size, (report.vocab_size as f64).log2());
	for corpus in &report.corpora {
		println!("{:<10} {:<16} {:>10} symbols {:>8} unknown", corpus.split.to_string(), corpus.name, corpus.symbols, corpus.unknown);
	}
	for (split, score) in &report.scores {
		println!("{:<10} {score}", split.to_string());
	}

	if let Some(input) = generation {
		let mut rng = match args.seed {
			Some(seed) => StdRng::seed_from_u64(seed),
			None => StdRng::from_os_rng(),
		};
		info!("generating {} characters", args.generate);
		let generated = Generator::new(&report.model).generate(&args.prompt, &input, &mut rng)?;
		println!("{}{}", args.prompt, generated);
	}

	Ok(())
}
