use super::args::{ServerArgs, StorageArgs};
use anyhow::Result;
use std::sync::Arc;
use tilekiln::server::{AppContext, TileServer, tile_router};

#[derive(clap::Args, Debug)]
#[command(disable_version_flag = true)]
pub struct Subcommand {
	#[command(flatten)]
	server: ServerArgs,

	#[command(flatten)]
	storage: StorageArgs,
}

/// Serve every tileset in storage, without rendering.
#[tokio::main]
pub async fn run(args: &Subcommand) -> Result<()> {
	let storage = args.storage.storage(args.server.num_threads).await?;

	let server_config = args.server.server_config();
	let mut context = AppContext::new(&server_config.base_url());
	let tilesets = storage.get_tilesets().await?;
	if tilesets.is_empty() {
		log::warn!("storage holds no tilesets");
	}
	for tileset in tilesets {
		context.add_static(tileset);
	}

	let mut server = TileServer::new(server_config, tile_router(Arc::new(context)));
	server.run_until_ctrl_c().await
}
