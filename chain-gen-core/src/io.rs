use std::path::{Path, PathBuf};
use std::{fs, io};

/// Reads a whole text file into memory.
pub(crate) fn read_txt<P: AsRef<Path>>(filename: P) -> io::Result<String> {
	fs::read_to_string(filename)
}

/// Builds the snapshot path for a source file and token depth.
///
/// Example:
/// `data/corpus.txt` + depth 2 → `data/corpus-d2.bin`
pub(crate) fn snapshot_path<P: AsRef<Path>>(source_path: P, depth: usize) -> io::Result<PathBuf> {
	let source_path = source_path.as_ref();

	let parent = source_path.parent().unwrap_or_else(|| Path::new("."));
	let file_stem = source_path
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Source path has no filename"))?;

	let mut output = PathBuf::from(parent);
	output.push(format!("{}-d{}", file_stem.to_string_lossy(), depth));
	output.set_extension("bin");

	Ok(output)
}
