use std::path::{Path, PathBuf};

use rand::prelude::IteratorRandom;

use super::cache::StateCache;
use super::token_graph::TokenGraph;
use crate::error::GeneratorError;
use crate::io;

/// Sentence-ending marks, in the order they are checked.
const END_MARKS: [&str; 7] = [".", "?", "!", "...", ")", "@", "\n"];

/// High-level Markov text generator over a single source text.
///
/// # Responsibilities
/// - Build the token graph from the source, or reload it from a snapshot
/// - Generate pseudo-random text by weighted random walk
/// - Rebuild on explicit cache invalidation
///
/// The graph is built once at construction and never mutated afterwards,
/// so a built `TextBuilder` can be shared read-only across threads.
pub struct TextBuilder {
	depth: usize,
	source_path: PathBuf,
	cache: StateCache,
	graph: TokenGraph,
}

impl TextBuilder {
	/// Creates a generator for `source_path` with tokens of `depth` words.
	///
	/// Consults the snapshot cache first; on a hit the source is not
	/// re-parsed. On a miss the source is read, parsed and the resulting
	/// graph is persisted for the next construction.
	///
	/// # Errors
	/// - `InvalidDepth` if `depth` is 0
	/// - `SourceRead` if the source file cannot be read
	/// - `EmptySource` if the source contains no words
	pub fn new<P: AsRef<Path>>(depth: usize, source_path: P) -> Result<Self, GeneratorError> {
		if depth == 0 {
			return Err(GeneratorError::InvalidDepth);
		}
		let source_path = source_path.as_ref().to_path_buf();
		let cache = StateCache::new(&source_path, depth)?;
		let text = read_source(&source_path)?;

		let graph = match cache.load(text.as_bytes()) {
			Some(graph) => {
				log::debug!("reusing snapshot for {}", source_path.display());
				graph
			}
			None => {
				log::debug!("building graph for {}", source_path.display());
				let graph = TokenGraph::from_text(&text, depth)?;
				cache.save(text.as_bytes(), &graph)?;
				graph
			}
		};

		Ok(Self { depth, source_path, cache, graph })
	}

	/// Convenience constructor with a token depth of 1.
	pub fn with_default_depth<P: AsRef<Path>>(source_path: P) -> Result<Self, GeneratorError> {
		Self::new(1, source_path)
	}

	/// Generates text of at least `min_length` words, stopping at the
	/// first sentence-ending mark produced after that minimum. The
	/// requested minimum is divided by the token depth, since each token
	/// already spans `depth` words.
	///
	/// The walk starts from a uniformly random capitalized token. At each
	/// step a successor is drawn proportionally to its observed count; a
	/// token without successors restarts the walk from a fresh
	/// capitalized token while keeping the text accumulated so far.
	///
	/// # Errors
	/// `NoStartToken` if the corpus has no capitalized token at all.
	pub fn generate_text(&self, min_length: usize) -> Result<String, GeneratorError> {
		let min_steps = min_length / self.depth;

		let mut text = String::new();
		let mut token = self.random_start()?;
		let mut counter = 0usize;

		loop {
			if counter > min_steps {
				if let Some(end) = ending(token) {
					text.push_str(end);
					break;
				}
			}
			counter += 1;

			text.push_str(token);
			text.push(' ');

			token = match self.graph.sample_successor(token) {
				Some(next) => next,
				None => {
					// Dead end: restart the walk, keep the output so far
					log::debug!("dead end at {token:?}, restarting walk");
					self.random_start()?
				}
			};
		}

		Ok(text)
	}

	/// Drops the persisted snapshot and rebuilds the graph from the
	/// current source content immediately.
	///
	/// Call this when the source file was edited in place: its path and
	/// depth are unchanged, so a stale snapshot written for the old
	/// content would otherwise still be around.
	///
	/// Returns self so it can be chained after a constructor or any
	/// other method.
	pub fn invalidate_cache(mut self) -> Result<Self, GeneratorError> {
		self.cache.invalidate()?;
		let text = read_source(&self.source_path)?;
		self.graph = TokenGraph::from_text(&text, self.depth)?;
		self.cache.save(text.as_bytes(), &self.graph)?;
		Ok(self)
	}

	/// Token depth this generator was built with.
	pub fn depth(&self) -> usize {
		self.depth
	}

	/// Read-only access to the underlying graph.
	pub fn graph(&self) -> &TokenGraph {
		&self.graph
	}

	/// Picks a uniformly random sentence-start token.
	fn random_start(&self) -> Result<&str, GeneratorError> {
		self.graph
			.capitalized_tokens()
			.choose(&mut rand::rng())
			.ok_or(GeneratorError::NoStartToken)
	}
}

fn read_source(source_path: &Path) -> Result<String, GeneratorError> {
	io::read_txt(source_path).map_err(|source| GeneratorError::SourceRead {
		path: source_path.to_path_buf(),
		source,
	})
}

/// Returns the ending piece of `token` if it contains a sentence mark:
/// the token truncated at the earliest occurring mark, inclusive. Ties at
/// the same position are broken by `END_MARKS` order. Tokens of a single
/// character never end a sentence, so a lone punctuation mark cannot
/// short-circuit a walk.
fn ending(token: &str) -> Option<&str> {
	if token.chars().count() <= 1 {
		return None;
	}

	let mut earliest: Option<(usize, usize)> = None;
	for mark in END_MARKS {
		if let Some(index) = token.find(mark) {
			if earliest.is_none_or(|(at, _)| index < at) {
				earliest = Some((index, mark.len()));
			}
		}
	}

	earliest.map(|(at, len)| &token[..at + len])
}

#[cfg(test)]
mod tests {
	use std::fs;
	use std::path::PathBuf;

	use tempfile::TempDir;

	use super::*;

	const CORPUS: &str =
		"The cat sat on the mat. The dog ran far away! Кот сидел на ковре. A bird may sing?";

	fn corpus_file(dir: &TempDir, text: &str) -> PathBuf {
		let path = dir.path().join("corpus.txt");
		fs::write(&path, text).unwrap();
		path
	}

	#[test]
	fn ending_truncates_at_the_mark() {
		assert_eq!(ending("sat."), Some("sat."));
		assert_eq!(ending("away!"), Some("away!"));
		assert_eq!(ending("(laughs)"), Some("(laughs)"));
		assert_eq!(ending("sat.down"), Some("sat."));
	}

	#[test]
	fn ending_picks_the_earliest_mark() {
		assert_eq!(ending("a?b."), Some("a?"));
		assert_eq!(ending("hm..."), Some("hm."));
	}

	#[test]
	fn ending_ignores_single_characters_and_plain_words() {
		assert_eq!(ending("."), None);
		assert_eq!(ending("?"), None);
		assert_eq!(ending("word"), None);
	}

	#[test]
	fn generated_text_ends_with_a_sentence_mark() {
		let dir = TempDir::new().unwrap();
		let builder = TextBuilder::new(1, corpus_file(&dir, CORPUS)).unwrap();

		for _ in 0..50 {
			let text = builder.generate_text(0).unwrap();
			assert!(!text.is_empty());
			let last = text.chars().last().unwrap();
			assert!(
				matches!(last, '.' | '?' | '!' | ')' | '@' | '\n'),
				"unexpected ending: {text:?}"
			);
		}
	}

	#[test]
	fn generated_text_meets_the_minimum_length() {
		let dir = TempDir::new().unwrap();
		let builder = TextBuilder::new(1, corpus_file(&dir, CORPUS)).unwrap();

		for _ in 0..20 {
			let text = builder.generate_text(12).unwrap();
			assert!(text.split_whitespace().count() >= 12, "too short: {text:?}");
		}
	}

	#[test]
	fn depth_two_walks_still_terminate_on_a_mark() {
		let dir = TempDir::new().unwrap();
		let builder = TextBuilder::new(2, corpus_file(&dir, CORPUS)).unwrap();

		for _ in 0..20 {
			let text = builder.generate_text(8).unwrap();
			assert!(text.split_whitespace().count() >= 8, "too short: {text:?}");
			let last = text.chars().last().unwrap();
			assert!(matches!(last, '.' | '?' | '!'), "unexpected ending: {text:?}");
		}
	}

	#[test]
	fn dead_ends_restart_the_walk() {
		// "Cc" has no successor, so walks through it must restart
		let dir = TempDir::new().unwrap();
		let builder = TextBuilder::new(1, corpus_file(&dir, "Aa Bb. Cc")).unwrap();

		for _ in 0..20 {
			let text = builder.generate_text(5).unwrap();
			assert!(text.ends_with('.'), "unexpected ending: {text:?}");
		}
	}

	#[test]
	fn corpus_without_capitalized_tokens_is_surfaced() {
		let dir = TempDir::new().unwrap();
		let builder = TextBuilder::new(1, corpus_file(&dir, "aa bb. cc dd.")).unwrap();

		assert!(matches!(
			builder.generate_text(0),
			Err(GeneratorError::NoStartToken)
		));
	}

	#[test]
	fn sole_token_corpus_degenerates_to_that_token() {
		let dir = TempDir::new().unwrap();
		let builder = TextBuilder::new(3, corpus_file(&dir, "Hi.")).unwrap();

		// One vertex, no edges: append once, restart, then terminate on it
		assert_eq!(builder.generate_text(0).unwrap(), "Hi. Hi.");
	}

	#[test]
	fn construction_reuses_a_matching_snapshot() {
		let dir = TempDir::new().unwrap();
		let path = corpus_file(&dir, CORPUS);

		let first = TextBuilder::new(1, &path).unwrap();
		let second = TextBuilder::new(1, &path).unwrap();
		assert_eq!(first.graph(), second.graph());
	}

	#[test]
	fn invalidate_cache_reflects_source_edits() {
		let dir = TempDir::new().unwrap();
		let path = corpus_file(&dir, "Alpha beta.");
		let builder = TextBuilder::new(1, &path).unwrap();

		fs::write(&path, "Gamma delta.").unwrap();
		let builder = builder.invalidate_cache().unwrap();

		assert!(builder.graph().contains("Gamma"));
		assert!(!builder.graph().contains("Alpha"));
		assert!(builder.generate_text(0).unwrap().starts_with("Gamma"));
	}

	#[test]
	fn missing_source_fails_construction() {
		let dir = TempDir::new().unwrap();
		assert!(matches!(
			TextBuilder::new(1, dir.path().join("nope.txt")),
			Err(GeneratorError::SourceRead { .. })
		));
	}

	#[test]
	fn zero_depth_fails_construction() {
		let dir = TempDir::new().unwrap();
		assert!(matches!(
			TextBuilder::new(0, corpus_file(&dir, CORPUS)),
			Err(GeneratorError::InvalidDepth)
		));
	}
}
