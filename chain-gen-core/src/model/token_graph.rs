use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::node::Node;
use crate::error::GeneratorError;

/// Weighted token transition graph.
///
/// Vertices are tokens: a fixed number of consecutive whitespace-separated
/// words of the source text (`depth` words per token), in original order
/// and casing, deduplicated by exact string equality. Each vertex owns a
/// weighted set of successor tokens.
///
/// # Responsibilities
/// - Parse a source text into tokens of a configurable depth
/// - Accumulate transition counts between consecutive tokens
/// - Sample successors proportionally to their observed counts
/// - Enumerate legal sentence-start vertices
///
/// # Invariants
/// - Every token referenced as a successor exists as a vertex
///   (possibly with an empty successor set)
/// - Edge weights are strictly positive and only grow during a build
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenGraph {
	/// Mapping from a token to its successor set.
	nodes: HashMap<String, Node>,
}

impl TokenGraph {
	/// Builds a graph from a raw source text.
	///
	/// Words are whitespace-separated; consecutive words are grouped into
	/// tokens of exactly `depth` words, advancing by `depth` per token. A
	/// trailing group smaller than `depth` is dropped. The first token is
	/// registered as a vertex with no predecessor; every following token
	/// records a transition from its predecessor.
	///
	/// A text with fewer than `depth` words yields a single vertex and no
	/// edges, so generation degenerates to that sole token.
	///
	/// # Errors
	/// - `InvalidDepth` if `depth` is 0.
	/// - `EmptySource` if the text contains no words.
	pub fn from_text(text: &str, depth: usize) -> Result<Self, GeneratorError> {
		if depth == 0 {
			return Err(GeneratorError::InvalidDepth);
		}

		let words: Vec<&str> = text.split_whitespace().collect();
		if words.is_empty() {
			return Err(GeneratorError::EmptySource);
		}

		let tokens: Vec<String> = if words.len() < depth {
			// Degenerate corpus: the whole word sequence is the sole vertex
			vec![words.join(" ")]
		} else {
			words.chunks_exact(depth).map(|group| group.join(" ")).collect()
		};

		let mut graph = Self::default();
		graph.get_or_create(&tokens[0]);

		for pair in tokens.windows(2) {
			graph.record_transition(&pair[0], &pair[1]);
		}

		Ok(graph)
	}

	/// Registers a token as a vertex if it is not one already.
	///
	/// Idempotent: an existing vertex is left untouched.
	pub fn get_or_create(&mut self, token: &str) -> &mut Node {
		self.nodes.entry(token.to_owned()).or_default()
	}

	/// Records one observed transition from `from` to `to`.
	///
	/// Increments the edge weight, initializing it to 1 on first sight.
	/// Both endpoints are registered as vertices, so the successor
	/// invariant holds at every point of a build.
	pub fn record_transition(&mut self, from: &str, to: &str) {
		self.get_or_create(from).add_transition(to);
		self.get_or_create(to);
	}

	/// Picks a successor of `from` using weighted random sampling.
	///
	/// Returns `None` if `from` is unknown or has no outgoing edges.
	pub fn sample_successor(&self, from: &str) -> Option<&str> {
		self.nodes.get(from)?.sample()
	}

	/// Lazily enumerates vertices that can legally start a sentence:
	/// tokens whose first character is an uppercase Latin or Cyrillic
	/// letter.
	pub fn capitalized_tokens(&self) -> impl Iterator<Item = &str> {
		self.nodes
			.keys()
			.filter(|token| token.chars().next().is_some_and(is_capital))
			.map(String::as_str)
	}

	/// Number of vertices.
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	/// True when the graph has no vertices.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// True when `token` is a vertex.
	pub fn contains(&self, token: &str) -> bool {
		self.nodes.contains_key(token)
	}

	/// Returns the weight of the edge from `from` to `to`, if present.
	pub fn weight(&self, from: &str, to: &str) -> Option<usize> {
		self.nodes.get(from)?.weight(to)
	}
}

/// Uppercase letter in the corpus alphabets (Latin or Cyrillic).
fn is_capital(c: char) -> bool {
	matches!(c, 'A'..='Z' | 'А'..='Я' | 'Ё')
}
