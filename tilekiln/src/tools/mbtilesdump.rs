use super::args::{DumpArgs, SourceArgs};
use anyhow::Result;
use std::path::PathBuf;
use tilekiln_container::MBTilesDump;

#[derive(clap::Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// MBTiles file to create
	#[arg(long, value_name = "FILE")]
	output: PathBuf,

	#[command(flatten)]
	dump: DumpArgs,

	#[command(flatten)]
	source: SourceArgs,
}

/// Render a zoom range of a tileset into a new MBTiles file.
#[tokio::main]
pub async fn run(args: &Subcommand) -> Result<()> {
	let (config, zooms) = args.dump.config_and_zooms()?;
	let kiln = args.source.kiln(config, args.dump.num_threads).await?;
	let count = MBTilesDump::write(&kiln, &args.output, zooms, args.dump.num_threads).await?;
	log::info!("wrote {count} tiles to {:?}", args.output);
	Ok(())
}
