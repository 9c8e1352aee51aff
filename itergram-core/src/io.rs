use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Reads a whole UTF-8 corpus file into memory.
///
/// Line breaks are kept: they are characters of the corpus like any other.
pub(crate) fn read_corpus<P: AsRef<Path>>(filename: P) -> io::Result<String> {
	fs::read_to_string(filename)
}

/// Builds an output path based on an input path and a new extension.
///
/// Example:
/// `data/kwere_train.txt` + `"bin"` → `data/kwere_train.bin`
pub(crate) fn build_output_path<P: AsRef<Path>>(
	input_path: P,
	output_extension: &str,
) -> io::Result<PathBuf> {
	let input_path = input_path.as_ref();

	let parent = input_path.parent().unwrap_or_else(|| Path::new("."));
	let file_stem = input_path
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Input path has no filename"))?;

	let mut output = PathBuf::from(parent);
	output.push(file_stem);
	output.set_extension(output_extension);

	Ok(output)
}

/// Extracts the base filename without extension, used to label corpora.
///
/// Examples:
/// - `"./data/swahili.txt"` → `"swahili"`
/// - `"swahili.txt"` → `"swahili"`
pub(crate) fn get_filename<P: AsRef<Path>>(input_path: P) -> io::Result<String> {
	let stem = input_path
		.as_ref()
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Path has no filename"))?;

	Ok(stem.to_string_lossy().to_string())
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("data/kwere_train.txt", "data/kwere_train.bin")]
	#[case("corpus", "corpus.bin")]
	fn output_path_swaps_extension(#[case] input: &str, #[case] expected: &str) {
		assert_eq!(build_output_path(input, "bin").unwrap(), PathBuf::from(expected));
	}

	#[test]
	fn filename_drops_directory_and_extension() {
		assert_eq!(get_filename("./data/swahili.txt").unwrap(), "swahili");
		assert!(get_filename("..").is_err());
	}

	#[test]
	fn corpus_keeps_line_breaks() {
		let path = std::env::temp_dir().join(format!("itergram-io-{}.txt", std::process::id()));
		fs::write(&path, "habari\nza asubuhi\n").unwrap();
		let text = read_corpus(&path).unwrap();
		fs::remove_file(&path).unwrap();
		assert_eq!(text, "habari\nza asubuhi\n");
	}
}
