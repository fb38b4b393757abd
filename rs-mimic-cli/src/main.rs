mod cli;
mod commands;
mod config;
mod logging;
mod sink;

use anyhow::Result;
use clap::Parser;
use log::debug;

use cli::{Cli, Commands};
use commands::Context;
use config::Config;

fn main() -> Result<()> {
	let cli = Cli::parse();

	let config_dir = cli.config_dir.unwrap_or_else(config::default_config_dir);
	let config = Config::load(&config_dir)?;
	logging::init(cli.verbose, config.log_file(&config_dir).as_deref())?;
	debug!("Using config dir {}", config_dir.display());

	let ctx = Context { config_dir, config };
	match &cli.command {
		Commands::Build(args) => commands::build(&ctx, args),
		Commands::Generate(args) => commands::generate(&ctx, args),
		Commands::Send(args) => commands::send(&ctx, args),
		Commands::Senders => commands::senders(&ctx),
	}
}
