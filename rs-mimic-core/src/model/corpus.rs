use std::path::Path;

use serde::{Deserialize, Serialize};

use super::chain::Chain;
use super::token::{self, Token};
use crate::error::{Error, Result};
use crate::history::Identity;
use crate::io;

/// File signature of a serialized corpus.
const MAGIC: &[u8; 4] = b"MMCP";
/// Bumped whenever the serialized layout changes.
const FORMAT_VERSION: u8 = 1;

/// The statistical model of one sender.
///
/// This struct manages:
/// - `sender`: identity whose messages were used for training.
/// - `chain`: the word-level transition mapping.
/// - `sentences`: every training message, re-joined from its tokens and kept
///   in training order (used to reject generated text that copies history).
///
/// Everything is stored in ordered containers: building twice from the same
/// messages yields byte-identical files.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Corpus {
	sender: Identity,
	chain: Chain,
	sentences: Vec<String>,
}

impl Corpus {
	/// Returns an empty corpus for `sender`.
	///
	/// # Errors
	/// Returns `Error::InvalidStateSize` if `state_size < 1`.
	pub(crate) fn new(sender: Identity, state_size: usize) -> Result<Self> {
		Ok(Self { sender, chain: Chain::new(state_size)?, sentences: Vec::new() })
	}

	/// Trains a corpus from a sender's messages, in order.
	///
	/// # Errors
	/// - `Error::InvalidStateSize` if `state_size < 1`
	/// - `Error::InsufficientData` if no message contains a word
	pub fn from_messages<I, S>(sender: Identity, state_size: usize, messages: I) -> Result<Self>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut corpus = Self::new(sender, state_size)?;
		for message in messages {
			corpus.add_sentence(message.as_ref());
		}
		if corpus.sentences.is_empty() {
			return Err(Error::InsufficientData { sender: corpus.sender });
		}
		Ok(corpus)
	}

	/// Adds one message to the corpus.
	///
	/// Returns `false` (and changes nothing) if the message has no words.
	/// Duplicated messages are counted again: frequencies matter.
	pub fn add_sentence(&mut self, message: &str) -> bool {
		let words = token::tokenize(message);
		if words.is_empty() {
			return false;
		}
		self.chain.add_sentence(&words);
		self.sentences.push(token::join(&words));
		true
	}

	pub fn sender(&self) -> &Identity {
		&self.sender
	}

	pub fn state_size(&self) -> usize {
		self.chain.state_size()
	}

	pub fn chain(&self) -> &Chain {
		&self.chain
	}

	/// Training messages, whitespace-normalized, in training order.
	pub fn sentences(&self) -> &[String] {
		&self.sentences
	}

	/// Length in chars of the longest single word of the corpus.
	pub fn longest_word(&self) -> usize {
		self.sentences
			.iter()
			.flat_map(|s| s.split(' '))
			.map(|w| w.chars().count())
			.max()
			.unwrap_or(0)
	}

	/// Serializes the corpus: magic, format version, then `postcard` payload.
	pub fn to_bytes(&self) -> Result<Vec<u8>> {
		let mut bytes = Vec::with_capacity(MAGIC.len() + 1);
		bytes.extend_from_slice(MAGIC);
		bytes.push(FORMAT_VERSION);
		bytes.extend(postcard::to_stdvec(self)?);
		Ok(bytes)
	}

	/// Reads back a corpus written by [`Corpus::to_bytes`].
	///
	/// # Errors
	/// - `Error::InvalidCorpusFile` on a wrong header or broken invariants
	/// - `Error::Encoding` if the payload cannot be decoded
	pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
		let header = MAGIC.len() + 1;
		if bytes.len() < header || &bytes[..MAGIC.len()] != MAGIC {
			return Err(Error::InvalidCorpusFile("missing corpus signature".to_owned()));
		}
		let version = bytes[MAGIC.len()];
		if version != FORMAT_VERSION {
			return Err(Error::InvalidCorpusFile(format!(
				"unsupported format version {version} (expected {FORMAT_VERSION})"
			)));
		}

		let corpus: Corpus = postcard::from_bytes(&bytes[header..])?;
		corpus.check()?;
		Ok(corpus)
	}

	/// Loads a corpus file.
	pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
		let bytes = std::fs::read(path)?;
		Self::from_bytes(&bytes)
	}

	/// Writes the corpus to `path`, atomically replacing any previous file.
	pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
		io::write_atomic(path, &self.to_bytes()?)?;
		Ok(())
	}

	/// Validates the invariants a decoded corpus must hold.
	fn check(&self) -> Result<()> {
		let state_size = self.chain.state_size();
		if state_size < 1 {
			return Err(Error::InvalidCorpusFile("state size is 0".to_owned()));
		}
		if self.chain.is_empty() || self.sentences.is_empty() {
			return Err(Error::InvalidCorpusFile("corpus is empty".to_owned()));
		}
		for (key, successors) in self.chain.states() {
			if key.len() != state_size || key.contains(&Token::End) {
				return Err(Error::InvalidCorpusFile("malformed state".to_owned()));
			}
			if successors.transitions().any(|(t, count)| count == 0 || *t == Token::Begin) {
				return Err(Error::InvalidCorpusFile("malformed transition".to_owned()));
			}
		}
		Ok(())
	}
}
