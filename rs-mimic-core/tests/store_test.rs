//! Integration tests for [`rs_mimic_core::CorpusDir`].
//!
//! Covers save/load round trips, sender listing and lookup failures.

use std::collections::HashSet;

use rand::SeedableRng;
use rand::rngs::StdRng;

use rs_mimic_core::{
	Corpus, CorpusDir, CorpusSource, Error, GenerationRequest, Generator, Identity,
};

fn corpus(sender: &str) -> Corpus {
	Corpus::from_messages(Identity::from(sender), 2, ["see you at the station", "see you later", "late again"]).unwrap()
}

#[test]
fn test_save_then_load() {
	let dir = tempfile::tempdir().unwrap();
	let store = CorpusDir::new(dir.path().join("corpora"));
	let original = corpus("wyn@example.com");

	let path = store.save(&original).unwrap();
	assert_eq!(path, dir.path().join("corpora").join("wyn@example.com.corpus"));
	assert!(store.contains(original.sender()));

	let loaded = store.load(original.sender()).unwrap();
	assert_eq!(*loaded, original);
}

#[test]
fn test_missing_corpus() {
	let dir = tempfile::tempdir().unwrap();
	let store = CorpusDir::new(dir.path());
	let result = store.load(&Identity::from("ghost"));
	assert!(matches!(result, Err(Error::CorpusNotFound { sender }) if sender.as_str() == "ghost"));

	let absent = CorpusDir::new(dir.path().join("does-not-exist"));
	assert!(absent.senders().unwrap().is_empty());
}

/// **Test: identities with path characters are stored and listed safely.**
#[test]
fn test_senders_round_trip_odd_identities() {
	let dir = tempfile::tempdir().unwrap();
	let store = CorpusDir::new(dir.path());
	let senders = ["../escape", "Ugwp Nx2/Do2", "café", ".hidden", "plain"];
	for sender in senders {
		store.save(&corpus(sender)).unwrap();
	}
	std::fs::write(dir.path().join("notes.txt"), "not a corpus").unwrap();

	let mut expected: Vec<Identity> = senders.iter().map(|s| Identity::from(*s)).collect();
	expected.sort();
	assert_eq!(store.senders().unwrap(), expected);

	for sender in &expected {
		assert_eq!(store.load(sender).unwrap().sender(), sender);
	}
	// Nothing escaped the directory.
	assert!(!dir.path().parent().unwrap().join("escape.corpus").exists());
}

/// **Test: the empty identity and identities differing only in case get
/// their own, listed files.**
#[test]
fn test_empty_and_case_variant_identities() {
	let dir = tempfile::tempdir().unwrap();
	let store = CorpusDir::new(dir.path());
	for sender in ["", "Alice", "alice"] {
		let path = store.save(&corpus(sender)).unwrap();
		assert!(!path.file_name().unwrap().to_string_lossy().starts_with('.'));
	}

	assert_eq!(store.senders().unwrap(), vec![Identity::from(""), Identity::from("Alice"), Identity::from("alice")]);
	assert_eq!(store.load(&Identity::from("")).unwrap().sender().as_str(), "");

	let names: HashSet<String> = std::fs::read_dir(dir.path())
		.unwrap()
		.map(|entry| entry.unwrap().file_name().to_string_lossy().to_lowercase())
		.collect();
	assert_eq!(names.len(), 3);
}

/// **Test: saving over an existing corpus replaces it and leaves no temp file.**
#[test]
fn test_overwrite_is_clean() {
	let dir = tempfile::tempdir().unwrap();
	let store = CorpusDir::new(dir.path());
	let first = corpus("a");
	store.save(&first).unwrap();

	let second = Corpus::from_messages(Identity::from("a"), 2, ["something else entirely"]).unwrap();
	store.save(&second).unwrap();

	assert_eq!(*store.load(&Identity::from("a")).unwrap(), second);
	let entries = std::fs::read_dir(dir.path()).unwrap().count();
	assert_eq!(entries, 1);
}

#[test]
fn test_file_of_another_sender_is_rejected() {
	let dir = tempfile::tempdir().unwrap();
	let store = CorpusDir::new(dir.path());
	let path = store.save(&corpus("alice")).unwrap();
	std::fs::copy(&path, store.corpus_path(&Identity::from("bob"))).unwrap();

	assert!(matches!(store.load(&Identity::from("bob")), Err(Error::InvalidCorpusFile(_))));
}

#[test]
fn test_garbage_file_is_rejected() {
	let dir = tempfile::tempdir().unwrap();
	let store = CorpusDir::new(dir.path());
	std::fs::write(store.corpus_path(&Identity::from("x")), b"garbage").unwrap();
	assert!(matches!(store.load(&Identity::from("x")), Err(Error::InvalidCorpusFile(_))));
}

#[test]
fn test_generator_reads_from_disk() {
	let dir = tempfile::tempdir().unwrap();
	let store = CorpusDir::new(dir.path());
	store.save(&corpus("a")).unwrap();

	let generator = Generator::new(store);
	let mut rng = StdRng::seed_from_u64(10);
	let message = generator
		.generate_with_rng(&GenerationRequest::new("a", 2, 140), &mut rng)
		.unwrap();
	assert!(message.text.starts_with("see you") || message.text.starts_with("late again"));
}
