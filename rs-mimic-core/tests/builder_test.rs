//! Integration tests for [`rs_mimic_core::CorpusBuilder`].
//!
//! Covers sender filtering, the transition mapping, batch builds and rebuilds.

use std::collections::BTreeMap;

use rs_mimic_core::model::token::{self, Token};
use rs_mimic_core::{CorpusBuilder, CorpusDir, Error, Identity, MessageRecord};

fn word(w: &str) -> Token {
	Token::Word(w.to_owned())
}

fn history() -> Vec<MessageRecord> {
	vec![
		MessageRecord::new("A", "hi there"),
		MessageRecord::new("B", "hello world"),
		MessageRecord::new("A", "hi there friend"),
		MessageRecord::new("A", "hi bob"),
	]
}

/// Counts, for every window of `n` tokens in the padded messages, the tokens
/// that follow it.
fn empirical(messages: &[&str], n: usize) -> BTreeMap<Vec<Token>, BTreeMap<Token, usize>> {
	let mut counts: BTreeMap<Vec<Token>, BTreeMap<Token, usize>> = BTreeMap::new();
	for message in messages {
		let words = token::tokenize(message);
		if words.is_empty() {
			continue;
		}
		let mut items = vec![Token::Begin; n];
		items.extend(words.into_iter().map(Token::Word));
		items.push(Token::End);
		for window in items.windows(n + 1) {
			*counts.entry(window[..n].to_vec()).or_default().entry(window[n].clone()).or_default() += 1;
		}
	}
	counts
}

/// **Test: the documented `hi` scenario.**
///
/// **Expected:** state `("hi",)` maps to `{there: 2, bob: 1}`.
#[test]
fn test_hi_successors() {
	let builder = CorpusBuilder::new(1).unwrap();
	let corpus = builder.build(&history(), &Identity::from("A")).unwrap();

	let hi = corpus.chain().successors(&[word("hi")]).unwrap();
	assert_eq!(hi.count(&word("there")), 2);
	assert_eq!(hi.count(&word("bob")), 1);
	assert_eq!(hi.total(), 3);
	assert_eq!(corpus.sender(), &Identity::from("A"));
	assert_eq!(corpus.sentences(), ["hi there", "hi there friend", "hi bob"]);
}

/// **Test: the mapping holds exactly the observed transitions, for several orders.**
#[test]
fn test_successors_match_observed_counts() {
	let messages = [
		"the cat sat on the mat",
		"the cat ran",
		"on the mat the cat sat down",
		"",
		"the the the",
	];
	let records: Vec<MessageRecord> = messages.iter().map(|m| MessageRecord::new("x", *m)).collect();

	for n in 1..=3 {
		let corpus = CorpusBuilder::new(n).unwrap().build(&records, &Identity::from("x")).unwrap();
		let expected = empirical(&messages, n);

		assert_eq!(corpus.chain().len(), expected.len(), "order {n}");
		for (state, successors) in corpus.chain().states() {
			let observed: BTreeMap<Token, usize> = successors.transitions().map(|(t, c)| (t.clone(), c)).collect();
			assert_eq!(Some(&observed), expected.get(state), "order {n}, state {state:?}");
		}
	}
}

/// **Test: identity matching is exact.**
#[test]
fn test_build_unknown_or_differently_cased_sender() {
	let builder = CorpusBuilder::default();
	for sender in ["a", "C", "A "] {
		let result = builder.build(&history(), &Identity::from(sender));
		assert!(matches!(result, Err(Error::InsufficientData { .. })), "sender {sender:?}");
	}
}

#[test]
fn test_build_blank_messages_only() {
	let records = vec![MessageRecord::new("A", "   "), MessageRecord::new("A", "")];
	let result = CorpusBuilder::default().build(&records, &Identity::from("A"));
	assert!(matches!(result, Err(Error::InsufficientData { sender }) if sender.as_str() == "A"));
}

#[test]
fn test_zero_state_size() {
	assert!(matches!(CorpusBuilder::new(0), Err(Error::InvalidStateSize(0))));
}

/// **Test: batch build isolates failures per sender.**
#[test]
fn test_build_all() {
	let mut records = history();
	records.push(MessageRecord::new("silent", "  "));

	let results = CorpusBuilder::new(1).unwrap().build_all(&records);
	assert_eq!(results.len(), 3);
	assert!(results[&Identity::from("A")].is_ok());
	assert!(results[&Identity::from("B")].is_ok());
	assert!(matches!(results[&Identity::from("silent")], Err(Error::InsufficientData { .. })));
}

/// **Test: rebuilding with one more message updates counts and keeps the others.**
#[test]
fn test_rebuild_with_new_message() {
	let builder = CorpusBuilder::new(1).unwrap();
	let sender = Identity::from("A");
	let before = builder.build(&history(), &sender).unwrap();

	let mut grown = history();
	grown.push(MessageRecord::new("A", "hi bob again"));
	let after = builder.build(&grown, &sender).unwrap();

	let hi_before = before.chain().successors(&[word("hi")]).unwrap();
	let hi_after = after.chain().successors(&[word("hi")]).unwrap();
	assert_eq!(hi_after.count(&word("bob")), hi_before.count(&word("bob")) + 1);
	assert_eq!(hi_after.count(&word("there")), hi_before.count(&word("there")));

	for (state, successors) in before.chain().states() {
		let updated = after.chain().successors(state).unwrap();
		for (token, count) in successors.transitions() {
			assert!(updated.count(token) >= count);
		}
	}
}

/// **Test: building twice from the same history writes identical bytes.**
#[test]
fn test_build_is_deterministic_on_disk() {
	let dir = tempfile::tempdir().unwrap();
	let first = CorpusDir::new(dir.path().join("one"));
	let second = CorpusDir::new(dir.path().join("two"));
	let builder = CorpusBuilder::new(2).unwrap();
	let sender = Identity::from("A");

	let a = builder.build_into(&history(), &sender, &first).unwrap();
	let b = builder.build_into(&history(), &sender, &second).unwrap();

	assert_eq!(std::fs::read(a).unwrap(), std::fs::read(b).unwrap());
}

/// **Test: a failing build leaves the previous corpus in place.**
#[test]
fn test_failed_rebuild_keeps_previous_file() {
	let dir = tempfile::tempdir().unwrap();
	let store = CorpusDir::new(dir.path());
	let builder = CorpusBuilder::new(1).unwrap();
	let sender = Identity::from("A");

	let path = builder.build_into(&history(), &sender, &store).unwrap();
	let saved = std::fs::read(&path).unwrap();

	let empty = vec![MessageRecord::new("A", " ")];
	assert!(builder.build_into(&empty, &sender, &store).is_err());
	assert_eq!(std::fs::read(&path).unwrap(), saved);
}
