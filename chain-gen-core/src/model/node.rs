use std::collections::HashMap;

use rand::Rng;

use serde::{Deserialize, Serialize};


/// A vertex in the token transition graph.
///
/// A `Node` stores all observed transitions from one token to its
/// successor tokens. Conceptually, this is a node in a Markov chain where
/// outgoing edges are weighted by their number of observations.
///
/// ## Responsibilities:
/// - Accumulate transition occurrences during a build
/// - Pick the next token using weighted random sampling
///
/// ## Invariants
/// - Each transition occurrence count is strictly positive
/// - Counts only ever grow while the graph is being built
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Node {
	/// Outgoing transitions indexed by the successor token.
	/// The value represents how many times this transition was observed.
	/// Example: { "the cat" => 42, "a dog" => 3 }
	transitions: HashMap<String, usize>,
}

impl Node {
	/// Records an occurrence of a transition toward `next`.
	///
	/// - If the transition already exists, its occurrence count is increased.
	/// - Otherwise, a new transition is created with an initial count of 1.
	pub fn add_transition(&mut self, next: &str) {
		*self.transitions.entry(next.to_owned()).or_insert(0) += 1;
	}

	/// Picks a successor token using weighted random sampling.
	///
	/// The probability of selecting a successor is proportional to its
	/// occurrence count.
	///
	/// This method performs:
	/// - an O(n) scan over the transitions
	/// - a cumulative subtraction to select a bucket
	///
	/// Returns `None` if the node has no transitions.
	pub fn sample(&self) -> Option<&str> {
		if self.transitions.is_empty() {
			return None;
		}

		// Compute the total number of occurrences
		let total: usize = self.transitions.values().sum();
		if total == 0 {
			// Should not happen due to invariants, but kept for safety
			return None;
		}

		// Randomly select a successor
		let mut r = rand::rng().random_range(0..total);

		let mut fallback: Option<&str> = None;
		for (next, occurrence) in &self.transitions {
			if r < *occurrence {
				return Some(next);
			}
			r -= occurrence;
			fallback = Some(next);
		}

		// Fallback: should not happen, but kept for safety.
		fallback
	}

	/// Returns the occurrence count of a transition, if present.
	pub fn weight(&self, next: &str) -> Option<usize> {
		self.transitions.get(next).copied()
	}

	/// True when the node has no outgoing transitions.
	pub fn is_empty(&self) -> bool {
		self.transitions.is_empty()
	}
}
