use super::args::{ServerArgs, SourceArgs, StorageArgs, load_config};
use anyhow::Result;
use std::{path::PathBuf, sync::Arc};
use tilekiln::server::{AppContext, TileServer, tile_router};
use tilekiln_container::Tileset;
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

	#[command(flatten)]
	storage: StorageArgs,
}

/// Serve stored tiles, rendering and storing the ones that are missing.
#[tokio::main]
pub async fn run(args: &Subcommand) -> Result<()> {
	let config = load_config(&args.config, args.id.as_ref())?;
	let storage = args.storage.storage(args.server.num_threads).await?;
	let kiln = Arc::new(args.source.kiln(config, args.server.num_threads).await?);
	let tileset = Tileset::from_config(storage, kiln.config().clone());

	let server_config = args.server.server_config();
	let mut context = AppContext::new(&server_config.base_url());
	context.add_live(tileset, kiln);

	let mut server = TileServer::new(server_config, tile_router(Arc::new(context)));
	server.run_until_ctrl_c().await
}
