mod tools;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{Verbosity, WarnLevel};

#[derive(Parser, Debug)]
#[command(
	author,
	version,
	about,
	long_about = None,
	propagate_version = true,
	disable_help_subcommand = true,
)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	#[command(flatten)]
	verbose: Verbosity<WarnLevel>,
}

#[derive(Subcommand, Debug)]
enum Commands {
	/// Commands for tileset definitions
	Config(tools::config::Subcommand),

	/// Print the SQL of a tile
	Sql(tools::sql::Subcommand),

	/// Serve tiles rendered on every request, for developing a tileset
	Dev(tools::dev::Subcommand),

	/// Serve stored tiles and render missing ones
	Live(tools::live::Subcommand),

	/// Serve all tilesets of the storage
	Serve(tools::serve::Subcommand),

	/// Commands for tile storage
	Storage(tools::storage::Subcommand),

	/// Commands for tile generation
	Generate(tools::generate::Subcommand),

	/// Render a tileset into an MBTiles file
	Mbtilesdump(tools::mbtilesdump::Subcommand),

	/// Render a tileset into a directory
	Tilesdump(tools::tilesdump::Subcommand),

	/// Run a Prometheus exporter for storage statistics
	Prometheus(tools::prometheus::Subcommand),
}

fn main() -> Result<()> {
	let cli = Cli::parse();

	env_logger::Builder::new()
		.filter_level(cli.verbose.log_level_filter())
		.format_timestamp(None)
		.init();

	run(cli)
}

fn run(cli: Cli) -> Result<()> {
	match &cli.command {
		Commands::Config(arguments) => tools::config::run(arguments),
		Commands::Sql(arguments) => tools::sql::run(arguments),
		Commands::Dev(arguments) => tools::dev::run(arguments),
		Commands::Live(arguments) => tools::live::run(arguments),
		Commands::Serve(arguments) => tools::serve::run(arguments),
		Commands::Storage(arguments) => tools::storage::run(arguments),
		Commands::Generate(arguments) => tools::generate::run(arguments),
		Commands::Mbtilesdump(arguments) => tools::mbtilesdump::run(arguments),
		Commands::Tilesdump(arguments) => tools::tilesdump::run(arguments),
		Commands::Prometheus(arguments) => tools::prometheus::run(arguments),
	}
}
