use std::fmt;

use serde::{Deserialize, Serialize};

/// A single item of a message as seen by the chain.
///
/// - `Begin` pads states at the start of a message and never appears as a
///   successor.
/// - `End` is the terminal marker and never appears inside a state.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Token {
	Begin,
	Word(String),
	End,
}

impl Token {
	/// Returns the word carried by this token, if any.
	pub fn as_word(&self) -> Option<&str> {
		match self {
			Token::Word(w) => Some(w),
			_ => None,
		}
	}
}

impl fmt::Display for Token {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Token::Begin => f.write_str("<begin>"),
			Token::Word(w) => f.write_str(w),
			Token::End => f.write_str("<end>"),
		}
	}
}

/// Splits a message into words on whitespace.
///
/// Punctuation stays attached to the neighbouring word ("hello," is one token).
pub fn tokenize(text: &str) -> Vec<String> {
	text.split_whitespace().map(str::to_owned).collect()
}

/// Joins words back into text with single spaces.
pub fn join<S: AsRef<str>>(words: &[S]) -> String {
	let mut text = String::new();
	for (i, word) in words.iter().enumerate() {
		if i > 0 {
			text.push(' ');
		}
		text.push_str(word.as_ref());
	}
	text
}

/// Character length of `join(words)` without building the string.
pub(crate) fn joined_len<S: AsRef<str>>(words: &[S]) -> usize {
	let chars: usize = words.iter().map(|w| w.as_ref().chars().count()).sum();
	chars + words.len().saturating_sub(1)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn tokenize_keeps_punctuation() {
		assert_eq!(tokenize("  hi,  there!\nbob "), vec!["hi,", "there!", "bob"]);
		assert!(tokenize(" \t\n").is_empty());
	}

	#[test]
	fn joined_len_counts_chars() {
		let words = ["héllo", "wörld"];
		assert_eq!(joined_len(&words), join(&words).chars().count());
		assert_eq!(joined_len::<&str>(&[]), 0);
	}
}
