use std::collections::BTreeMap;

use rand::Rng;
use rand::prelude::IteratorRandom;
use serde::{Deserialize, Serialize};

use super::state::State;
use super::token::Token;
use crate::error::{Error, Result};

/// Word-level Markov chain of a fixed order.
///
/// The `Chain` maps every state (a window of `state_size` consecutive tokens)
/// to the multiset of tokens observed right after it.
///
/// # Responsibilities
/// - Build the transition mapping from messages
/// - Predict the next token given a state
/// - Walk the chain to produce a sequence of words
///
/// # Invariants
/// - `state_size` is always >= 1
/// - Every key has exactly `state_size` tokens and was observed in training text
/// - Keys never contain `End`; successors never contain `Begin`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Chain {
	/// Number of tokens in a state (the n-gram order).
	state_size: usize,

	/// Mapping from a state to its observed successors
	states: BTreeMap<Vec<Token>, State>,
}

impl Chain {
	/// Creates a new empty chain of order `state_size`.
	///
	/// # Errors
	/// Returns `Error::InvalidStateSize` if `state_size < 1`.
	pub fn new(state_size: usize) -> Result<Self> {
		if state_size < 1 {
			return Err(Error::InvalidStateSize(state_size));
		}
		Ok(Self { state_size, states: BTreeMap::new() })
	}

	pub fn state_size(&self) -> usize {
		self.state_size
	}

	/// Number of distinct states.
	pub fn len(&self) -> usize {
		self.states.len()
	}

	pub fn is_empty(&self) -> bool {
		self.states.is_empty()
	}

	/// The state every message starts from: `state_size` times `Begin`.
	pub fn begin_state(&self) -> Vec<Token> {
		vec![Token::Begin; self.state_size]
	}

	/// Returns a random state from the chain, chosen uniformly.
	///
	/// Returns `None` if the chain has no states.
	pub fn get_random_seed<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&[Token]> {
		self.states.keys().choose(rng).map(Vec::as_slice)
	}

	/// Adds the words of one message to the chain.
	///
	/// The message is padded as `[Begin; n] ++ words ++ [End]` and every
	/// window of `n` tokens records the token that follows it.
	///
	/// # Notes
	/// - Empty messages are ignored.
	/// - Words are stored as-is (no case folding).
	pub fn add_sentence<S: AsRef<str>>(&mut self, words: &[S]) {
		if words.is_empty() {
			return;
		}

		let mut items = self.begin_state();
		items.extend(words.iter().map(|w| Token::Word(w.as_ref().to_owned())));
		items.push(Token::End);

		for window in items.windows(self.state_size + 1) {
			let (state, next) = window.split_at(self.state_size);
			match self.states.get_mut(state) {
				Some(existing) => existing.add_transition(next[0].clone()),
				None => {
					let mut fresh = State::new();
					fresh.add_transition(next[0].clone());
					self.states.insert(state.to_vec(), fresh);
				}
			}
		}
	}

	/// Returns the successors of `state`, if the state was observed.
	pub fn successors(&self, state: &[Token]) -> Option<&State> {
		self.states.get(state)
	}

	/// Iterates over all `(state, successors)` pairs in state order.
	pub fn states(&self) -> impl Iterator<Item = (&[Token], &State)> {
		self.states.iter().map(|(key, state)| (key.as_slice(), state))
	}

	/// Predicts the next token given a state.
	///
	/// Returns `None` if the state is unknown (dead end).
	pub fn predict<R: Rng + ?Sized>(&self, state: &[Token], rng: &mut R) -> Option<&Token> {
		self.states.get(state)?.predict(rng)
	}

	/// Walks the chain from `init` and returns the emitted words.
	///
	/// Stops on `End` or on a dead end. `limit` bounds the character length
	/// of the emitted words joined by single spaces: as soon as the walk
	/// goes past it, the walk is abandoned and `None` is returned. Every step
	/// adds at least one character, so a walk always terminates.
	///
	/// # Notes
	/// - `init` must have `state_size` tokens, otherwise nothing is emitted.
	pub fn walk<R: Rng + ?Sized>(&self, init: &[Token], limit: usize, rng: &mut R) -> Option<Vec<String>> {
		let mut state = init.to_vec();
		let mut words = Vec::new();
		let mut length = 0;

		while let Some(Token::Word(word)) = self.predict(&state, rng) {
			length += word.chars().count() + usize::from(!words.is_empty());
			if length > limit {
				return None;
			}
			words.push(word.clone());
			state.remove(0);
			state.push(Token::Word(word.clone()));
		}

		Some(words)
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
	fn zero_state_size_is_rejected() {
		assert!(matches!(Chain::new(0), Err(Error::InvalidStateSize(0))));
	}

	#[test]
	fn message_is_padded() {
		let mut chain = Chain::new(2).unwrap();
		chain.add_sentence(&["hi", "bob"]);

		let begin = chain.successors(&[Token::Begin, Token::Begin]).unwrap();
		assert_eq!(begin.count(&word("hi")), 1);
		let second = chain.successors(&[Token::Begin, word("hi")]).unwrap();
		assert_eq!(second.count(&word("bob")), 1);
		let last = chain.successors(&[word("hi"), word("bob")]).unwrap();
		assert_eq!(last.count(&Token::End), 1);
		assert_eq!(chain.len(), 3);
	}

	#[test]
	fn empty_message_adds_nothing() {
		let mut chain = Chain::new(1).unwrap();
		chain.add_sentence::<&str>(&[]);
		assert!(chain.is_empty());
	}

	#[test]
	fn walk_reproduces_single_message() {
		let mut chain = Chain::new(1).unwrap();
		chain.add_sentence(&["one", "two", "three"]);

		let mut rng = StdRng::seed_from_u64(3);
		let words = chain.walk(&chain.begin_state(), usize::MAX, &mut rng).unwrap();
		assert_eq!(words, vec!["one", "two", "three"]);
	}

	#[test]
	fn walk_gives_up_past_limit() {
		let mut chain = Chain::new(1).unwrap();
		chain.add_sentence(&["one", "two", "three"]);

		let mut rng = StdRng::seed_from_u64(3);
		// "one two" is 7 chars, "one two three" is 13.
		assert_eq!(chain.walk(&chain.begin_state(), 12, &mut rng), None);
		assert!(chain.walk(&chain.begin_state(), 13, &mut rng).is_some());
	}

	#[test]
	fn walk_stops_on_dead_end() {
		let chain = Chain::new(1).unwrap();
		let mut rng = StdRng::seed_from_u64(0);
		assert_eq!(chain.walk(&[word("nowhere")], 10, &mut rng), Some(vec![]));
	}

	#[test]
	fn random_seed_is_a_known_state() {
		let mut chain = Chain::new(2).unwrap();
		chain.add_sentence(&["a", "b", "c"]);
		let mut rng = StdRng::seed_from_u64(9);
		for _ in 0..20 {
			let seed = chain.get_random_seed(&mut rng).unwrap();
			assert!(chain.successors(seed).is_some());
		}
		assert_eq!(Chain::new(2).unwrap().get_random_seed(&mut rng), None);
	}
}
