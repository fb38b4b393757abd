use rand::Rng;

use super::corpus::Corpus;
use super::generation_request::{GenerationOptions, GenerationRequest, OverlapFilter, StartSeed};
use super::token::{self, Token};
use crate::error::{Error, Result};
use crate::store::CorpusSource;

/// A generated message, ready to be handed to a delivery sink.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedMessage {
	/// Prefix followed by the generated words.
	pub text: String,
	/// Length of `text` in chars.
	pub length: usize,
}

/// High-level generator answering requests against a set of corpora.
///
/// # Responsibilities
/// - Look up the requested sender's corpus through a [`CorpusSource`]
/// - Check the corpus was built with the requested state size
/// - Run bounded rejection sampling until a candidate fits the budget
#[derive(Debug)]
pub struct Generator<S> {
	source: S,
	options: GenerationOptions,
}

impl<S: CorpusSource> Generator<S> {
	/// Creates a generator with default options.
	pub fn new(source: S) -> Self {
		Self { source, options: GenerationOptions::default() }
	}

	/// Creates a generator with custom options.
	///
	/// # Errors
	/// Returns `Error::InvalidOptions` if the options do not validate.
	pub fn with_options(source: S, options: GenerationOptions) -> Result<Self> {
		options.validate()?;
		Ok(Self { source, options })
	}

	pub fn options(&self) -> &GenerationOptions {
		&self.options
	}

	pub fn source(&self) -> &S {
		&self.source
	}

	/// Generates one message for `request` using the thread RNG.
	///
	/// # Errors
	/// - `Error::CorpusNotFound` if the sender has no corpus
	/// - `Error::StateSizeMismatch` if the corpus was built with another order
	/// - `Error::GenerationExhausted` if no candidate fit within the attempts
	pub fn generate(&self, request: &GenerationRequest) -> Result<GeneratedMessage> {
		self.generate_with_rng(request, &mut rand::rng())
	}

	/// Same as [`Generator::generate`] with a caller-provided RNG.
	pub fn generate_with_rng<R: Rng + ?Sized>(&self, request: &GenerationRequest, rng: &mut R) -> Result<GeneratedMessage> {
		let corpus = self.source.load(&request.sender)?;
		if corpus.state_size() != request.state_size {
			return Err(Error::StateSizeMismatch {
				sender: request.sender.clone(),
				stored: corpus.state_size(),
				requested: request.state_size,
			});
		}
		generate(&corpus, request.max_chars, &request.prefix, &self.options, rng)
	}
}

impl Corpus {
	/// Generates one message of at most `max_chars` chars (prefix included)
	/// with default options and the thread RNG.
	pub fn generate(&self, max_chars: usize, prefix: &str) -> Result<GeneratedMessage> {
		generate(self, max_chars, prefix, &GenerationOptions::default(), &mut rand::rng())
	}
}

/// Samples a message from `corpus` whose full text `prefix + words` has
/// at most `max_chars` chars.
///
/// # Behavior
/// - Each attempt picks a start state, walks the chain until `End` or a
///   dead end, and joins the words with single spaces.
/// - A candidate is rejected if it is empty, too long, shorter than
///   `options.min_chars`, or copies the training text (when an overlap
///   filter is set).
/// - Attempts are independent; at most `options.max_attempts` are made.
///
/// # Errors
/// - `Error::InvalidOptions` if options are invalid or `min_chars > max_chars`
/// - `Error::UnknownStartState` if a custom start is not in the corpus
/// - `Error::GenerationExhausted` when every attempt was rejected
///
/// # Notes
/// - Text is never truncated: an over-long walk is abandoned as soon as it
///   passes the budget, which also bounds the time spent per attempt.
pub fn generate<R: Rng + ?Sized>(
	corpus: &Corpus,
	max_chars: usize,
	prefix: &str,
	options: &GenerationOptions,
	rng: &mut R,
) -> Result<GeneratedMessage> {
	options.validate()?;
	if options.min_chars > max_chars {
		return Err(Error::InvalidOptions(format!(
			"min_chars ({}) is greater than max_chars ({max_chars})",
			options.min_chars
		)));
	}

	let prefix_len = prefix.chars().count();
	let budget = max_chars.saturating_sub(prefix_len);
	// Padded so that matches only happen on word boundaries.
	let rejoined = options.overlap.map(|_| format!(" {} ", corpus.sentences().join(" ")));

	for _ in 0..options.max_attempts {
		let words = match make_candidate(corpus, &options.start, budget, rng)? {
			Some(words) if !words.is_empty() => words,
			_ => continue,
		};

		let text = format!("{prefix}{}", token::join(&words));
		let length = text.chars().count();
		if length > max_chars || length < options.min_chars {
			continue;
		}
		if let (Some(filter), Some(rejoined)) = (&options.overlap, &rejoined) {
			if overlaps(&words, rejoined, filter) {
				continue;
			}
		}

		return Ok(GeneratedMessage { text, length });
	}

	Err(Error::GenerationExhausted { attempts: options.max_attempts, max_chars })
}

/// Runs one attempt. Returns `None` when the walk went past `budget`.
fn make_candidate<R: Rng + ?Sized>(
	corpus: &Corpus,
	start: &StartSeed,
	budget: usize,
	rng: &mut R,
) -> Result<Option<Vec<String>>> {
	let (state, mut words) = start_state(corpus, start, rng)?;

	let seed_len = token::joined_len(&words);
	if seed_len > budget {
		return Ok(None);
	}
	let remaining = if words.is_empty() { budget } else { budget.saturating_sub(seed_len + 1) };

	Ok(corpus.chain().walk(&state, remaining, rng).map(|walked| {
		words.extend(walked);
		words
	}))
}

/// Resolves the start strategy into a state and the words it contributes.
fn start_state<R: Rng + ?Sized>(corpus: &Corpus, start: &StartSeed, rng: &mut R) -> Result<(Vec<Token>, Vec<String>)> {
	let chain = corpus.chain();
	let n = chain.state_size();

	match start {
		StartSeed::Begin => Ok((chain.begin_state(), Vec::new())),
		StartSeed::Random => {
			let seed = chain
				.get_random_seed(rng)
				.ok_or_else(|| Error::InsufficientData { sender: corpus.sender().clone() })?;
			let words = seed.iter().filter_map(Token::as_word).map(str::to_owned).collect();
			Ok((seed.to_vec(), words))
		}
		StartSeed::Custom(text) => {
			let words = token::tokenize(text);
			let state: Vec<Token> = if words.len() < n {
				let mut state = vec![Token::Begin; n - words.len()];
				state.extend(words.iter().cloned().map(Token::Word));
				state
			} else {
				words[words.len() - n..].iter().cloned().map(Token::Word).collect()
			};
			if chain.successors(&state).is_none() {
				return Err(Error::UnknownStartState(text.clone()));
			}
			Ok((state, words))
		}
	}
}

/// Whether a run of `words` long enough to count as copying occurs in the
/// (space-padded) training text.
fn overlaps(words: &[String], rejoined: &str, filter: &OverlapFilter) -> bool {
	let overlap_max = filter.max_total.min((filter.max_ratio * words.len() as f32).round() as usize);
	let window = overlap_max + 1;
	let gram_count = words.len().saturating_sub(overlap_max).max(1);

	(0..gram_count).any(|i| {
		let end = (i + window).min(words.len());
		let gram = format!(" {} ", token::join(&words[i..end]));
		rejoined.contains(&gram)
	})
}
