use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while constructing a generator or producing text.
///
/// Build-time and read-time failures abort construction. A sampling gap
/// during generation (a token without successors) is absorbed by
/// restarting the walk and never reaches this type.
#[derive(Debug, Error)]
pub enum GeneratorError {
	/// The source text file could not be read.
	#[error("failed to read source text {path:?}: {source}")]
	SourceRead {
		path: PathBuf,
		#[source]
		source: io::Error,
	},

	/// The source text contains no words after whitespace splitting.
	#[error("source text is empty after whitespace splitting")]
	EmptySource,

	/// The token depth must be at least 1.
	#[error("depth must be at least 1")]
	InvalidDepth,

	/// No vertex starts with an uppercase letter, so a walk cannot begin.
	#[error("corpus has no capitalized token to start a walk from")]
	NoStartToken,

	/// Reading or writing the snapshot file failed.
	#[error("snapshot I/O failed: {0}")]
	SnapshotIo(#[from] io::Error),

	/// Encoding the snapshot failed.
	#[error("snapshot encoding failed: {0}")]
	SnapshotCodec(#[from] postcard::Error),
}
