use super::args::load_config;
use anyhow::{Result, anyhow};
use std::path::PathBuf;
use tilekiln_core::{Config, Tile};

#[derive(clap::Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// Tileset definition file (YAML)
	#[arg(long, value_name = "FILE")]
	config: PathBuf,

	/// Print only the query of this layer
	#[arg(long)]
	layer: Option<String>,

	#[arg(short, long)]
	zoom: u8,

	#[arg(short)]
	x: u32,

	#[arg(short)]
	y: u32,
}

/// Print the SQL a tile is rendered with.
pub fn run(args: &Subcommand) -> Result<()> {
	let config = load_config(&args.config, None)?;
	let tile = Tile::new(args.zoom, args.x, args.y)?;

	for query in queries(&config, &tile, args.layer.as_deref())? {
		println!("{query}");
	}
	Ok(())
}

fn queries(config: &Config, tile: &Tile, layer: Option<&str>) -> Result<Vec<String>> {
	let Some(layer_id) = layer else {
		return Ok(config.layer_queries(tile));
	};

	let layer = config
		.layer(layer_id)
		.ok_or_else(|| anyhow!("Layer '{layer_id}' not found in configuration"))?;
	let sql = layer.render_sql(tile).ok_or_else(|| {
		anyhow!(
			"Zoom {} not between min zoom {} and max zoom {} for layer {layer_id}.",
			tile.zoom,
			layer.minzoom(),
			layer.maxzoom()
		)
	})?;
	Ok(vec![sql])
}
