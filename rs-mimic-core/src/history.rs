use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::io;

/// Stable identifier of a chat participant (account address, conversation id...).
///
/// Matching is exact: no case folding, no trimming.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for Identity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for Identity {
	fn from(value: &str) -> Self {
		Self::new(value)
	}
}

impl From<String> for Identity {
	fn from(value: String) -> Self {
		Self(value)
	}
}

/// One message of an exported chat history.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct MessageRecord {
	pub sender: Identity,
	pub text: String,
}

impl MessageRecord {
	pub fn new(sender: impl Into<Identity>, text: impl Into<String>) -> Self {
		Self { sender: sender.into(), text: text.into() }
	}
}

/// Accepted layouts of a `.json` history file.
#[derive(Deserialize)]
#[serde(untagged)]
enum HistoryFile {
	/// `[{"sender": "...", "text": "..."}, ...]`
	Records(Vec<MessageRecord>),
	/// `{"20170102_10h00m00s.000000": "text", ...}`, one sender only.
	/// Keys sort chronologically.
	Keyed(BTreeMap<String, String>),
}

/// Reads a chat history file into an ordered list of records.
///
/// # Formats
/// - `.json` array of `{sender, text}` objects
/// - `.json` object mapping sortable keys (timestamps) to message text,
///   attributed to `default_sender`
/// - `.txt` with one message per non-empty line, attributed to `default_sender`
///
/// # Errors
/// - `Error::Storage` if the file cannot be read, has an unknown extension,
///   or needs a default sender and none was given
/// - `Error::History` if the JSON is malformed
pub fn read_history<P: AsRef<Path>>(path: P, default_sender: Option<&Identity>) -> Result<Vec<MessageRecord>> {
	let path = path.as_ref();
	let extension = path.extension().and_then(|e| e.to_str()).unwrap_or_default();

	match extension {
		"json" => {
			let contents = std::fs::read_to_string(path)?;
			match serde_json::from_str::<HistoryFile>(&contents)? {
				HistoryFile::Records(records) => Ok(records),
				HistoryFile::Keyed(messages) => {
					let sender = require_sender(path, default_sender)?;
					Ok(messages
						.into_values()
						.map(|text| MessageRecord { sender: sender.clone(), text })
						.collect())
				}
			}
		}
		"txt" => {
			let sender = require_sender(path, default_sender)?;
			Ok(io::read_file(path)?
				.into_iter()
				.filter(|line| !line.trim().is_empty())
				.map(|text| MessageRecord { sender: sender.clone(), text })
				.collect())
		}
		_ => Err(Error::Storage(std::io::Error::new(
			std::io::ErrorKind::InvalidInput,
			format!("unsupported history file: {}", path.display()),
		))),
	}
}

fn require_sender<'a>(path: &Path, default_sender: Option<&'a Identity>) -> Result<&'a Identity> {
	default_sender.ok_or_else(|| {
		Error::Storage(std::io::Error::new(
			std::io::ErrorKind::InvalidInput,
			format!("{} has no sender information, a sender must be given", path.display()),
		))
	})
}

/// Groups message texts by sender, keeping the original message order
/// inside each group.
pub fn group_by_sender(history: &[MessageRecord]) -> BTreeMap<&Identity, Vec<&str>> {
	let mut groups: BTreeMap<&Identity, Vec<&str>> = BTreeMap::new();
	for record in history {
		groups.entry(&record.sender).or_default().push(&record.text);
	}
	groups
}
