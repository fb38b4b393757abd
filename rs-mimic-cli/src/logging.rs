use std::fs::{self, OpenOptions};
use std::path::Path;

use anyhow::{Context, Result};
use env_logger::{Builder, Env, Target};

/// Initializes the global logger.
///
/// Level comes from `RUST_LOG`, defaulting to `info` (`debug` when
/// `verbose`). With `log_file` set, records are appended to that file
/// instead of stderr.
pub fn init(verbose: bool, log_file: Option<&Path>) -> Result<()> {
	let default_level = if verbose { "debug" } else { "info" };
	let mut builder = Builder::from_env(Env::default().default_filter_or(default_level));
	builder.format_timestamp_millis();

	if let Some(path) = log_file {
		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
		}
		let file = OpenOptions::new()
			.create(true)
			.append(true)
			.open(path)
			.with_context(|| format!("Failed to open log file {}", path.display()))?;
		builder.target(Target::Pipe(Box::new(file)));
	}

	builder.try_init().context("Logger already initialized")?;
	Ok(())
}
