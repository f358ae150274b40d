use super::args::{ServerArgs, SourceArgs, load_config};
use anyhow::Result;
use std::{path::PathBuf, sync::Arc};
use tilekiln::server::{AppContext, TileServer, tile_router};
use tilekiln_core::TilesetId;

#[derive(clap::Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// Tileset definition file (YAML)
	#[arg(long, value_name = "FILE")]
	config: PathBuf,

	/// Serve under this id instead of the one in the definition
	#[arg(long)]
	id: Option<TilesetId>,

	#[command(flatten)]
	server: ServerArgs,

	#[command(flatten)]
	source: SourceArgs,
}

/// Render every request from the source database and store nothing.
#[tokio::main]
pub async fn run(args: &Subcommand) -> Result<()> {
	let config = load_config(&args.config, args.id.as_ref())?;
	let kiln = args.source.kiln(config, args.server.num_threads).await?;

	let server_config = args.server.server_config();
	let mut context = AppContext::new(&server_config.base_url());
	context.add_dev(Arc::new(kiln));

	let mut server = TileServer::new(server_config, tile_router(Arc::new(context)));
	server.run_until_ctrl_c().await
}
