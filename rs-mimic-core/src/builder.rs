use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::history::{self, Identity, MessageRecord};
use crate::model::corpus::Corpus;
use crate::store::CorpusDir;

/// State size used when nothing else is configured.
pub const DEFAULT_STATE_SIZE: usize = 2;

/// Builds per-sender corpora from message history.
///
/// The state size is fixed here, at build time: a corpus can only be sampled
/// with the order it was built with, and changing the order means building
/// again from the full history.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CorpusBuilder {
	state_size: usize,
}

impl Default for CorpusBuilder {
	fn default() -> Self {
		Self { state_size: DEFAULT_STATE_SIZE }
	}
}

impl CorpusBuilder {
	/// # Errors
	/// Returns `Error::InvalidStateSize` if `state_size < 1`.
	pub fn new(state_size: usize) -> Result<Self> {
		if state_size < 1 {
			return Err(Error::InvalidStateSize(state_size));
		}
		Ok(Self { state_size })
	}

	pub fn state_size(&self) -> usize {
		self.state_size
	}

	/// Builds the corpus of `target_sender` from the whole history.
	///
	/// Only records whose sender is exactly `target_sender` are used, in
	/// history order.
	///
	/// # Errors
	/// Returns `Error::InsufficientData` if the sender has no record with at
	/// least one word.
	pub fn build(&self, history: &[MessageRecord], target_sender: &Identity) -> Result<Corpus> {
		let messages = history
			.iter()
			.filter(|record| &record.sender == target_sender)
			.map(|record| record.text.as_str());
		Corpus::from_messages(target_sender.clone(), self.state_size, messages)
	}

	/// Builds a corpus for every sender found in `history`.
	///
	/// Each sender gets its own result: a sender without usable text does not
	/// prevent the others from being built.
	pub fn build_all(&self, history: &[MessageRecord]) -> BTreeMap<Identity, Result<Corpus>> {
		history::group_by_sender(history)
			.into_iter()
			.map(|(sender, messages)| {
				(sender.clone(), Corpus::from_messages(sender.clone(), self.state_size, messages))
			})
			.collect()
	}

	/// Builds `target_sender`'s corpus and writes it to `store`, replacing the
	/// previous one. Nothing is written when the build fails.
	pub fn build_into(&self, history: &[MessageRecord], target_sender: &Identity, store: &CorpusDir) -> Result<PathBuf> {
		let corpus = self.build(history, target_sender)?;
		store.save(&corpus)
	}
}
