use clap::Parser;

fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = relact_hook::Args::parse();

	relact_hook::run(args)
}
