use super::args::{StorageArgs, load_config, read_tiles, tileset_id};
use anyhow::Result;
use clap::ArgGroup;
use std::{path::PathBuf, sync::Arc};
use tilekiln_container::Tileset;
use tilekiln_core::TilesetId;

#[derive(clap::Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	#[command(subcommand)]
	sub_command: StorageCommands,
}

#[derive(clap::Subcommand, Debug)]
enum StorageCommands {
	/// Create the storage schema and the tables of a tileset
	Init(Init),
	/// Remove a tileset and all of its tiles
	Destroy(Selected),
	/// Delete the tiles of a tileset, optionally only at some zooms
	Delete(Delete),
	/// Delete the z/x/y tiles listed on stdin
	Tiledelete(Selected),
}

#[derive(clap::Args, Debug)]
struct Init {
	/// Tileset definition file (YAML)
	#[arg(long, value_name = "FILE")]
	config: PathBuf,

	/// Store under this id instead of the one in the definition
	#[arg(long)]
	id: Option<TilesetId>,

	#[command(flatten)]
	storage: StorageArgs,
}

/// A tileset picked by `--id`, or by the id in `--config`.
#[derive(clap::Args, Debug)]
#[command(group(ArgGroup::new("tileset").required(true).multiple(true).args(["config", "id"])))]
struct Selected {
	/// Tileset definition file (YAML)
	#[arg(long, value_name = "FILE")]
	config: Option<PathBuf>,

	/// Tileset id, takes precedence over the id in the definition
	#[arg(long)]
	id: Option<TilesetId>,

	#[command(flatten)]
	storage: StorageArgs,
}

#[derive(clap::Args, Debug)]
#[command(group(ArgGroup::new("tileset").required(true).multiple(true).args(["config", "id"])))]
struct Delete {
	/// Tileset definition file (YAML)
	#[arg(long, value_name = "FILE")]
	config: Option<PathBuf>,

	/// Tileset id, takes precedence over the id in the definition
	#[arg(long)]
	id: Option<TilesetId>,

	/// Zoom to delete, may be repeated
	#[arg(short, long = "zoom")]
	zooms: Vec<u8>,

	#[command(flatten)]
	storage: StorageArgs,
}

#[tokio::main]
pub async fn run(command: &Subcommand) -> Result<()> {
	match &command.sub_command {
		StorageCommands::Init(args) => {
			let config = load_config(&args.config, args.id.as_ref())?;
			let storage = args.storage.storage(1).await?;
			storage.create_schema().await?;
			let tileset = Tileset::from_config(storage, Arc::new(config));
			tileset.prepare_storage().await?;
			log::info!("prepared storage of tileset '{}'", tileset.id());
		}
		StorageCommands::Destroy(args) => {
			let id = tileset_id(args.config.as_ref(), args.id.as_ref())?;
			args.storage.storage(1).await?.remove_tileset(&id).await?;
			log::info!("removed tileset '{id}'");
		}
		StorageCommands::Delete(args) => {
			let id = tileset_id(args.config.as_ref(), args.id.as_ref())?;
			let zooms = (!args.zooms.is_empty()).then_some(args.zooms.as_slice());
			args.storage.storage(1).await?.truncate_tables(&id, zooms).await?;
		}
		StorageCommands::Tiledelete(args) => {
			let id = tileset_id(args.config.as_ref(), args.id.as_ref())?;
			let tiles = read_tiles(std::io::stdin().lock())?;
			eprintln!("Deleting {} tiles", tiles.len());
			args.storage.storage(1).await?.delete_tiles(&id, &tiles).await?;
		}
	}
	Ok(())
}
