use super::args::{DumpArgs, SourceArgs};
use anyhow::Result;
use std::path::PathBuf;
use tilekiln_container::DirectoryDump;

#[derive(clap::Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// Directory to write <z>/<x>/<y>.mvt files into
	#[arg(long, value_name = "DIR")]
	output: PathBuf,

	#[command(flatten)]
	dump: DumpArgs,

	#[command(flatten)]
	source: SourceArgs,
}

/// Render a zoom range of a tileset into a directory of tiles.
#[tokio::main]
pub async fn run(args: &Subcommand) -> Result<()> {
	let (config, zooms) = args.dump.config_and_zooms()?;
	let kiln = args.source.kiln(config, args.dump.num_threads).await?;
	let count = DirectoryDump::write(&kiln, &args.output, zooms, args.dump.num_threads).await?;
	log::info!("wrote {count} tiles to {:?}", args.output);
	Ok(())
}
