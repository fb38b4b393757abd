//! Word-level Markov text generation for mimicking a chat participant.
//!
//! This crate provides the text pipeline of the mimic bot:
//! - Building one n-gram corpus per sender from message history
//! - Persisting corpora atomically, one file per sender
//! - Sampling length-bounded messages with bounded rejection sampling
//! - The delivery boundary used to hand generated text to a chat session
//!
//! The crate performs no logging and no network I/O. Every failure is
//! returned to the caller as an [`Error`].

/// Corpus construction from message history.
pub mod builder;

/// Sender-to-corpus lookup (on disk or in memory).
pub mod store;

/// Delivery boundary towards the chat session.
pub mod delivery;

/// Message history records and file readers.
pub mod history;

/// Core n-gram model and generation logic.
pub mod model;

/// Crate error type.
pub mod error;

/// File and path helpers.
///
/// Not exposed
pub(crate) mod io;

pub use builder::CorpusBuilder;
pub use error::{Error, Result};
pub use history::{Identity, MessageRecord};
pub use model::corpus::Corpus;
pub use model::generator::{GeneratedMessage, Generator};
pub use model::generation_request::{GenerationOptions, GenerationRequest, OverlapFilter, StartSeed};
pub use store::{CorpusDir, CorpusMap, CorpusSource};
