use crate::error::{Error, Result};
use crate::history::Identity;

/// Retry ceiling used when nothing else is configured.
pub const DEFAULT_MAX_ATTEMPTS: usize = 10;

/// Strategy used to select the starting state of each attempt.
///
/// # Variants
/// - `Begin`: start like a real message does (weighted over message openings).
/// - `Random`: start from any state of the corpus, chosen uniformly; the
///   words of that state open the generated text.
/// - `Custom(String)`: the generated text opens with these words. With fewer
///   words than the state size they must be the opening of some message.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum StartSeed {
	#[default]
	Begin,
	Random,
	Custom(String),
}

/// Rejects generated text that copies the training messages verbatim.
///
/// A candidate of `w` words is checked with windows of
/// `min(max_total, round(max_ratio * w)) + 1` consecutive words; if any
/// window appears word-for-word in the training text, the candidate is
/// rejected.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlapFilter {
	/// Largest accepted share of the candidate copied in one run (0.0..=1.0).
	pub max_ratio: f32,
	/// Largest accepted number of consecutive copied words.
	pub max_total: usize,
}

impl Default for OverlapFilter {
	fn default() -> Self {
		Self { max_ratio: 0.7, max_total: 15 }
	}
}

/// Sampling parameters shared by every request of a [`Generator`](super::generator::Generator).
///
/// # Invariants (checked by `validate`)
/// - `max_attempts >= 1`
/// - `overlap.max_ratio` in `0.0..=1.0`
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationOptions {
	/// Number of candidates sampled before giving up.
	pub max_attempts: usize,

	/// Shortest accepted message, prefix included.
	pub min_chars: usize,

	/// Starting state strategy.
	pub start: StartSeed,

	/// Optional copy detection.
	pub overlap: Option<OverlapFilter>,
}

impl Default for GenerationOptions {
	fn default() -> Self {
		Self { max_attempts: DEFAULT_MAX_ATTEMPTS, min_chars: 0, start: StartSeed::Begin, overlap: None }
	}
}

impl GenerationOptions {
	/// Checks the options are usable.
	///
	/// # Errors
	/// Returns `Error::InvalidOptions` describing the first problem found.
	pub fn validate(&self) -> Result<()> {
		if self.max_attempts == 0 {
			return Err(Error::InvalidOptions("max_attempts must be >= 1".to_owned()));
		}
		if let Some(filter) = &self.overlap {
			if !(0.0..=1.0).contains(&filter.max_ratio) {
				return Err(Error::InvalidOptions("overlap ratio must be between 0.0 and 1.0".to_owned()));
			}
		}
		if let StartSeed::Custom(words) = &self.start {
			if words.trim().is_empty() {
				return Err(Error::InvalidOptions("custom start cannot be empty".to_owned()));
			}
		}
		Ok(())
	}
}

/// One call of the generator boundary:
/// `generate(sender, state_size, max_chars, prefix)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationRequest {
	pub sender: Identity,
	/// Order the caller expects the stored corpus to have.
	pub state_size: usize,
	/// Upper bound on the full message (prefix included), in chars.
	pub max_chars: usize,
	/// Literal text put in front of the generated words.
	pub prefix: String,
}

impl GenerationRequest {
	pub fn new(sender: impl Into<Identity>, state_size: usize, max_chars: usize) -> Self {
		Self { sender: sender.into(), state_size, max_chars, prefix: String::new() }
	}

	pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.prefix = prefix.into();
		self
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_are_valid() {
		assert!(GenerationOptions::default().validate().is_ok());
	}

	#[test]
	fn zero_attempts_is_rejected() {
		let options = GenerationOptions { max_attempts: 0, ..Default::default() };
		assert!(matches!(options.validate(), Err(Error::InvalidOptions(_))));
	}

	#[test]
	fn ratio_out_of_range_is_rejected() {
		let options = GenerationOptions {
			overlap: Some(OverlapFilter { max_ratio: 1.5, max_total: 15 }),
			..Default::default()
		};
		assert!(options.validate().is_err());
	}

	#[test]
	fn blank_custom_start_is_rejected() {
		let options = GenerationOptions { start: StartSeed::Custom("  ".to_owned()), ..Default::default() };
		assert!(options.validate().is_err());
	}
}
