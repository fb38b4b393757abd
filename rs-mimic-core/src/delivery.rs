//! Hand-off of generated text to a chat session.
//!
//! The chat protocol itself lives outside this crate; it is reached through
//! the [`MessageSink`] capability.

use thiserror::Error;

use crate::history::Identity;

#[derive(Error, Debug)]
pub enum SendError {
	#[error("chat session is not connected")]
	NotConnected,

	#[error("message to {recipient} rejected: {reason}")]
	Rejected { recipient: Identity, reason: String },

	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),
}

/// Capability to send one text message to one recipient.
pub trait MessageSink {
	fn send(&mut self, recipient: &Identity, text: &str) -> Result<(), SendError>;
}

impl<T: MessageSink + ?Sized> MessageSink for &mut T {
	fn send(&mut self, recipient: &Identity, text: &str) -> Result<(), SendError> {
		(**self).send(recipient, text)
	}
}

/// Outcome of a [`broadcast`].
#[derive(Debug, Default)]
pub struct DeliveryReport {
	pub delivered: Vec<Identity>,
	/// Recipients not contacted (own account, duplicates).
	pub skipped: Vec<Identity>,
	pub failed: Vec<(Identity, SendError)>,
}

impl DeliveryReport {
	pub fn is_complete(&self) -> bool {
		self.failed.is_empty()
	}
}

/// Sends `text`, unmodified, to every recipient.
///
/// The bot's own account (`own_identity`) and repeated recipients are
/// skipped. A failed send is recorded and the remaining recipients are still
/// contacted.
pub fn broadcast<S: MessageSink + ?Sized>(
	sink: &mut S,
	own_identity: Option<&Identity>,
	recipients: &[Identity],
	text: &str,
) -> DeliveryReport {
	let mut report = DeliveryReport::default();

	for recipient in recipients {
		let seen = report.delivered.contains(recipient) || report.failed.iter().any(|(r, _)| r == recipient);
		if Some(recipient) == own_identity || seen {
			report.skipped.push(recipient.clone());
			continue;
		}
		match sink.send(recipient, text) {
			Ok(()) => report.delivered.push(recipient.clone()),
			Err(e) => report.failed.push((recipient.clone(), e)),
		}
	}

	report
}
