//! Subcommand implementations.

use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{Context as _, Result, bail};
use log::{debug, error, info, warn};
use rand::Rng;

use rs_mimic_core::delivery::broadcast;
use rs_mimic_core::history::read_history;
use rs_mimic_core::{
	CorpusBuilder, CorpusDir, CorpusSource, Error, GeneratedMessage, GenerationOptions, GenerationRequest, Generator,
	Identity, OverlapFilter, StartSeed,
};

use crate::cli::{BuildArgs, GenerateArgs, GenerationArgs, SendArgs};
use crate::config::Config;
use crate::sink::ConsoleSink;

/// Upper bound of `--delay -1`: messages go out at a different time every day.
const MAX_RANDOM_DELAY_SECS: u64 = 8 * 60 * 60;

pub struct Context {
	pub config_dir: PathBuf,
	pub config: Config,
}

impl Context {
	fn store(&self) -> CorpusDir {
		CorpusDir::new(self.config.corpus_dir(&self.config_dir))
	}
}

pub fn build(ctx: &Context, args: &BuildArgs) -> Result<()> {
	let history = args
		.history
		.clone()
		.or_else(|| ctx.config.history_path(&ctx.config_dir))
		.context("No history file: pass --history or set `history` in config.json")?;
	let sender = args.sender.as_deref().map(Identity::from);
	let state_size = args.state_size.unwrap_or(ctx.config.state_size);

	let records = read_history(&history, sender.as_ref())
		.with_context(|| format!("Failed to read history {}", history.display()))?;
	info!("Loaded {} messages from {}", records.len(), history.display());

	let builder = CorpusBuilder::new(state_size)?;
	let store = ctx.store();
	debug!("Creating corpora with state size {state_size} in {}", store.path().display());

	if args.all {
		let results = builder.build_all(&records);
		let total = results.len();
		let mut built = 0;
		for (sender, result) in results {
			match result.and_then(|corpus| store.save(&corpus)) {
				Ok(path) => {
					built += 1;
					info!("Built corpus for {sender}: {}", path.display());
				}
				Err(e) => warn!("Skipped {sender}: {e}"),
			}
		}
		if built == 0 {
			bail!("No corpus could be built from {}", history.display());
		}
		info!("Built {built} of {total} corpora");
	} else {
		let sender = sender.context("--sender is required unless --all is given")?;
		let path = builder
			.build_into(&records, &sender, &store)
			.with_context(|| format!("Failed to build corpus for {sender}"))?;
		info!("Built corpus for {sender}: {}", path.display());
	}

	Ok(())
}

pub fn generate(ctx: &Context, args: &GenerateArgs) -> Result<()> {
	for _ in 0..args.count {
		let message = generate_message(ctx, &args.generation)?;
		debug!("Generated message ({} chars)", message.length);
		println!("{}", message.text);
	}
	Ok(())
}

pub fn send(ctx: &Context, args: &SendArgs) -> Result<()> {
	let delay = match args.delay {
		-1 => rand::rng().random_range(1..=MAX_RANDOM_DELAY_SECS),
		d if d >= 0 => d as u64,
		d => bail!("delay must be >= -1, got {d}"),
	};
	if delay > 0 {
		info!("Sleeping for {delay} seconds");
		thread::sleep(Duration::from_secs(delay));
	}

	let message = generate_message(ctx, &args.generation)?;
	info!("Generated message ({} chars): \"{}\"", message.length, message.text);

	let names = if args.recipients.is_empty() { &ctx.config.recipients } else { &args.recipients };
	let recipients: Vec<Identity> = names.iter().map(|r| Identity::from(r.as_str())).collect();
	if recipients.is_empty() {
		bail!("No recipients: pass --to or set `recipients` in config.json");
	}
	let own = ctx.config.own_identity.as_deref().map(Identity::from);

	let mut sink = ConsoleSink::new(io::stdout().lock());
	let report = broadcast(&mut sink, own.as_ref(), &recipients, &message.text);
	for skipped in &report.skipped {
		debug!("Skipped {skipped}");
	}
	for (recipient, e) in &report.failed {
		error!("Failed to send to {recipient}: {e}");
	}
	info!("Sent message to {} recipients", report.delivered.len());

	if !report.is_complete() {
		bail!("{} of {} sends failed", report.failed.len(), recipients.len());
	}
	Ok(())
}

pub fn senders(ctx: &Context) -> Result<()> {
	let store = ctx.store();
	for sender in store.senders()? {
		let corpus = store.load(&sender)?;
		println!("{sender}\tstate_size={}\tmessages={}", corpus.state_size(), corpus.sentences().len());
	}
	Ok(())
}

fn options(config: &Config, args: &GenerationArgs) -> GenerationOptions {
	let start = match (&args.start, args.random_start) {
		(Some(words), _) => StartSeed::Custom(words.clone()),
		(None, true) => StartSeed::Random,
		(None, false) => StartSeed::Begin,
	};
	GenerationOptions {
		max_attempts: args.tries.unwrap_or(config.max_attempts),
		min_chars: args.min_chars.unwrap_or(config.min_chars),
		start,
		overlap: args.no_copy.then(OverlapFilter::default),
	}
}

fn request(config: &Config, args: &GenerationArgs) -> GenerationRequest {
	GenerationRequest::new(
		args.sender.as_str(),
		args.state_size.unwrap_or(config.state_size),
		args.max_chars.unwrap_or(config.max_chars),
	)
	.with_prefix(args.prefix.clone().unwrap_or_else(|| config.prefix.clone()))
}

/// Generates one message, building the corpus from the configured history
/// first when it is missing or was built with another state size.
fn generate_message(ctx: &Context, args: &GenerationArgs) -> Result<GeneratedMessage> {
	let store = ctx.store();
	let request = request(&ctx.config, args);
	let generator = Generator::with_options(&store, options(&ctx.config, args))?;
	debug!("Starting message generation for {}. Max. chars: {}", request.sender, request.max_chars);

	match generator.generate(&request) {
		Err(e @ (Error::StateSizeMismatch { .. } | Error::CorpusNotFound { .. })) => {
			let Some(history) = ctx.config.history_path(&ctx.config_dir) else {
				return Err(e).context("No history configured to build the corpus from");
			};
			info!("{e}; building from {}", history.display());
			rebuild(&history, &request, &store)?;
			Ok(generator.generate(&request)?)
		}
		result => Ok(result?),
	}
}

fn rebuild(history: &Path, request: &GenerationRequest, store: &CorpusDir) -> Result<()> {
	let records = read_history(history, Some(&request.sender))
		.with_context(|| format!("Failed to read history {}", history.display()))?;
	let path = CorpusBuilder::new(request.state_size)?.build_into(&records, &request.sender, store)?;
	info!("Saved corpus to {}", path.display());
	Ok(())
}
