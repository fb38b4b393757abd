use std::collections::BTreeMap;

use rand::Rng;

use serde::{Deserialize, Serialize};

use super::token::Token;

/// Successors observed after one n-gram state.
///
/// Conceptually, this is a node in a Markov chain where outgoing edges
/// are weighted by their number of observations. The state key itself is
/// held by the owning [`Chain`](super::chain::Chain).
///
/// ## Responsibilities:
/// - Accumulate transition occurrences during learning
/// - Predict the next token using weighted random sampling
///
/// ## Invariants
/// - Each transition occurrence count is strictly positive
/// - Transitions are kept ordered so that serialization is deterministic
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct State {
	/// Outgoing transitions indexed by the next token.
	/// The value represents how many times this transition was observed.
	/// Example: { Word("there") => 2, Word("bob") => 1, End => 1 }
	transitions: BTreeMap<Token, usize>,
}

impl State {
	/// Creates a new empty state.
	pub fn new() -> Self {
		Self::default()
	}

	/// Records an occurrence of a transition toward `next`.
	///
	/// - If the transition already exists, its occurrence count is increased.
	/// - Otherwise, a new transition is created with an initial count of 1.
	pub fn add_transition(&mut self, next: Token) {
		*self.transitions.entry(next).or_insert(0) += 1;
	}

	/// Number of times `token` was observed after this state.
	pub fn count(&self, token: &Token) -> usize {
		self.transitions.get(token).copied().unwrap_or(0)
	}

	/// Total number of observations (the multiset cardinality).
	pub fn total(&self) -> usize {
		self.transitions.values().sum()
	}

	/// Iterates over `(successor, count)` pairs in token order.
	pub fn transitions(&self) -> impl Iterator<Item = (&Token, usize)> {
		self.transitions.iter().map(|(token, count)| (token, *count))
	}

	/// Predicts the next token using weighted random sampling.
	///
	/// The probability of selecting a token is proportional to its
	/// occurrence count.
	///
	/// This method performs:
	/// - an O(n) scan over the transitions
	/// - a cumulative subtraction to select a bucket
	///
	/// Returns `None` if the state has no transitions.
	pub fn predict<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Token> {
		let total = self.total();
		if total == 0 {
			return None;
		}

		let mut r = rng.random_range(0..total);
		for (next, occurrence) in &self.transitions {
			if r < *occurrence {
				return Some(next);
			}
			r -= occurrence;
		}

		// Unreachable while counts sum to `total`.
		self.transitions.keys().next_back()
	}
}

#[cfg(test)]
mod tests {
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	use super::*;

	fn word(w: &str) -> Token {
		Token::Word(w.to_owned())
	}

	#[test]
	fn counts_are_multiset() {
		let mut state = State::new();
		state.add_transition(word("there"));
		state.add_transition(word("bob"));
		state.add_transition(word("there"));

		assert_eq!(state.count(&word("there")), 2);
		assert_eq!(state.count(&word("bob")), 1);
		assert_eq!(state.count(&Token::End), 0);
		assert_eq!(state.total(), 3);
	}

	#[test]
	fn empty_state_predicts_nothing() {
		let mut rng = StdRng::seed_from_u64(7);
		assert_eq!(State::new().predict(&mut rng), None);
	}

	#[test]
	fn predict_follows_weights() {
		let mut state = State::new();
		for _ in 0..9 {
			state.add_transition(word("often"));
		}
		state.add_transition(Token::End);

		let mut rng = StdRng::seed_from_u64(42);
		let often = (0..2000)
			.filter(|_| state.predict(&mut rng) == Some(&word("often")))
			.count();
		// Expected 1800, generous margin.
		assert!((1650..=1950).contains(&often), "got {often}");
	}

	#[test]
	fn predict_only_returns_observed_tokens() {
		let mut state = State::new();
		state.add_transition(word("a"));
		state.add_transition(word("b"));

		let mut rng = StdRng::seed_from_u64(1);
		for _ in 0..100 {
			let next = state.predict(&mut rng).unwrap();
			assert!(state.count(next) > 0);
		}
	}
}
