use std::{
	fs,
	io::{self, Write},
	path::{Path, PathBuf},
	sync::Arc,
};

use clap::{
	Parser, Subcommand,
	builder::{
		Styles,
		styling::{AnsiColor, Effects},
	},
};
use color_eyre::eyre::WrapErr;
use tracing_subscriber::EnvFilter;

use relact_config::Config;
use relact_service::{ExecutionContext, ExportScrub, Outcome, RelatedActivities};
use relact_storage::{Dataset, MemoryStore};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Parser)]
#[command(
	version = VERSION,
	rename_all = "kebab",
	styles = styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	#[command(subcommand)]
	pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
	/// Run the related-activities rewrite on a retrieve-multiple context.
	Rewrite {
		#[arg(long, value_name = "FILE")]
		context: PathBuf,
		/// JSON dataset the closure lookups run against.
		#[arg(long, value_name = "FILE")]
		dataset: PathBuf,
	},
	/// Strip HTML from the records of an export retrieve context.
	Scrub {
		#[arg(long, value_name = "FILE")]
		context: PathBuf,
	},
}

/// Loads the config, runs one hook against the context file, and prints the resulting context.
pub fn run(args: Args) -> color_eyre::Result<()> {
	let config = relact_config::load(&args.config)?;

	init_tracing(&config);

	let ctx = match args.command {
		Command::Rewrite { context, dataset } => {
			let mut ctx = read_context(&context)?;
			let dataset = Dataset::load(&dataset)?;
			let outcome = rewrite(&config, &mut ctx, dataset);

			tracing::info!(rewritten = outcome.is_rewritten(), phase = ?outcome.phase(), "Rewrite finished.");

			ctx
		},
		Command::Scrub { context } => {
			let mut ctx = read_context(&context)?;
			let scrubbed = scrub(&config, &mut ctx);

			tracing::info!(scrubbed, "Scrub finished.");

			ctx
		},
	};
	let mut stdout = io::stdout().lock();

	serde_json::to_writer_pretty(&mut stdout, &ctx)?;
	writeln!(stdout)?;

	Ok(())
}

pub fn rewrite(config: &Config, ctx: &mut ExecutionContext, dataset: Dataset) -> Outcome {
	RelatedActivities::new(Arc::new(MemoryStore::new(dataset)), config).execute(ctx)
}

pub fn scrub(config: &Config, ctx: &mut ExecutionContext) -> usize {
	ExportScrub::new(&config.scrub).execute(ctx)
}

pub fn read_context(path: &Path) -> color_eyre::Result<ExecutionContext> {
	let raw = fs::read_to_string(path)
		.wrap_err_with(|| format!("Failed to read context file {}.", path.display()))?;

	serde_json::from_str(&raw)
		.wrap_err_with(|| format!("Failed to parse context file {}.", path.display()))
}

pub fn styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Red.on_default() | Effects::BOLD)
		.usage(AnsiColor::Red.on_default() | Effects::BOLD)
		.literal(AnsiColor::Blue.on_default() | Effects::BOLD)
		.placeholder(AnsiColor::Green.on_default())
}

fn init_tracing(config: &Config) {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}
