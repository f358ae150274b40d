use super::args::{SourceArgs, StorageArgs, load_config, read_tiles};
use anyhow::Result;
use std::{path::PathBuf, sync::Arc};
use tilekiln_container::{Tileset, generate_tiles};

#[derive(clap::Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	#[command(subcommand)]
	sub_command: GenerateCommands,
}

#[derive(clap::Subcommand, Debug)]
enum GenerateCommands {
	/// Render the z/x/y tiles listed on stdin into storage
	Tiles(Tiles),
}

#[derive(clap::Args, Debug)]
struct Tiles {
	/// Tileset definition file (YAML)
	#[arg(long, value_name = "FILE")]
	config: PathBuf,

	/// Number of concurrent renders
	#[arg(short = 'n', long, default_value_t = num_cpus::get(), value_name = "COUNT")]
	num_threads: usize,

	#[command(flatten)]
	source: SourceArgs,

	#[command(flatten)]
	storage: StorageArgs,
}

#[tokio::main]
pub async fn run(command: &Subcommand) -> Result<()> {
	match &command.sub_command {
		GenerateCommands::Tiles(args) => {
			let config = load_config(&args.config, None)?;
			let tiles = read_tiles(std::io::stdin().lock())?;
			let threads = args.num_threads.min(tiles.len()).max(1);
			eprintln!("Rendering {} tiles over {threads} threads", tiles.len());

			let storage = args.storage.storage(threads).await?;
			let kiln = args.source.kiln(config, threads).await?;
			let tileset = Tileset::from_config(storage, Arc::clone(kiln.config()));
			let written = generate_tiles(&kiln, &tileset, tiles, threads).await?;
			log::info!("rendered {written} tiles of '{}'", tileset.id());
		}
	}
	Ok(())
}
