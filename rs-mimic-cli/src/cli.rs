//! Command line definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "rs-mimic")]
#[command(about = "Mimic a chat contact with a word-level Markov chain", long_about = None)]
#[command(version)]
pub struct Cli {
	/// Directory holding config.json, corpora and logs.
	#[arg(short, long, global = true)]
	pub config_dir: Option<PathBuf>,

	/// Log at debug level (RUST_LOG takes precedence).
	#[arg(short, long, global = true)]
	pub verbose: bool,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Build corpora from a chat history file.
	Build(BuildArgs),
	/// Print generated messages.
	Generate(GenerateArgs),
	/// Generate one message and send it to the recipients.
	Send(SendArgs),
	/// List senders that have a corpus.
	Senders,
}

#[derive(Args)]
pub struct BuildArgs {
	/// History file (.json or .txt); defaults to `history` from the config.
	#[arg(long)]
	pub history: Option<PathBuf>,

	/// Sender to build; also the author of .txt and keyed .json histories.
	#[arg(long)]
	pub sender: Option<String>,

	/// Build every sender found in the history.
	#[arg(long)]
	pub all: bool,

	/// Markov state size (n-gram order).
	#[arg(short, long)]
	pub state_size: Option<usize>,
}

#[derive(Args)]
pub struct GenerationArgs {
	/// Sender to mimic.
	#[arg(long)]
	pub sender: String,

	/// Maximum message length in chars, prefix included.
	#[arg(short = 'n', long)]
	pub max_chars: Option<usize>,

	/// Minimum message length in chars, prefix included.
	#[arg(long)]
	pub min_chars: Option<usize>,

	/// Markov state size the corpus must have.
	#[arg(short, long)]
	pub state_size: Option<usize>,

	/// Text put in front of the generated words.
	#[arg(long)]
	pub prefix: Option<String>,

	/// Candidates sampled before giving up.
	#[arg(long)]
	pub tries: Option<usize>,

	/// Open the message with these words.
	#[arg(long, conflicts_with = "random_start")]
	pub start: Option<String>,

	/// Start from any state of the corpus instead of a message opening.
	#[arg(long)]
	pub random_start: bool,

	/// Reject messages copying the history verbatim.
	#[arg(long)]
	pub no_copy: bool,
}

#[derive(Args)]
pub struct GenerateArgs {
	#[command(flatten)]
	pub generation: GenerationArgs,

	/// Number of messages to print.
	#[arg(long, default_value_t = 1)]
	pub count: usize,
}

#[derive(Args)]
pub struct SendArgs {
	#[command(flatten)]
	pub generation: GenerationArgs,

	/// Recipient; repeat for several. Defaults to `recipients` from the config.
	#[arg(long = "to")]
	pub recipients: Vec<String>,

	/// Seconds to wait before sending; -1 waits a random time up to 8 hours.
	#[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
	pub delay: i64,
}
