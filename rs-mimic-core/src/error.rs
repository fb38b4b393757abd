use thiserror::Error;

use crate::history::Identity;

#[derive(Error, Debug)]
pub enum Error {
	#[error("not enough training text for sender {sender}")]
	InsufficientData { sender: Identity },

	#[error("no corpus built for sender {sender}")]
	CorpusNotFound { sender: Identity },

	#[error("no message of at most {max_chars} chars after {attempts} attempts")]
	GenerationExhausted { attempts: usize, max_chars: usize },

	#[error("state size must be >= 1, got {0}")]
	InvalidStateSize(usize),

	#[error("corpus for {sender} has state size {stored}, requested {requested} (rebuild required)")]
	StateSizeMismatch { sender: Identity, stored: usize, requested: usize },

	#[error("start state not found in corpus: {0}")]
	UnknownStartState(String),

	#[error("invalid generation options: {0}")]
	InvalidOptions(String),

	#[error("invalid corpus file: {0}")]
	InvalidCorpusFile(String),

	#[error("storage error: {0}")]
	Storage(#[from] std::io::Error),

	#[error("corpus encoding error: {0}")]
	Encoding(#[from] postcard::Error),

	#[error("history format error: {0}")]
	History(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
