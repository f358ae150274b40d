use super::{blocking, render_pyramid};
use crate::Kiln;
use anyhow::{Result, ensure};
use std::{fs, path::Path};
use tilekiln_core::{Blob, Tile, ZoomRange};
use tilekiln_derive::context;

const BATCH_SIZE: usize = 64;

/// Writes a pyramid as `<root>/<z>/<x>/<y>.mvt` files.
pub struct DirectoryDump;

impl DirectoryDump {
	#[context("dumping tiles to directory '{}'", root.display())]
	pub async fn write(kiln: &Kiln, root: &Path, zooms: ZoomRange, workers: usize) -> Result<u64> {
		ensure!(!root.is_file(), "'{}' is a file", root.display());
		render_pyramid(kiln, zooms, workers, BATCH_SIZE, |batch| {
			let root = root.to_path_buf();
			blocking(move || batch.iter().try_for_each(|(tile, blob)| write_tile(&root, tile, blob)))
		})
		.await
	}
}

#[context("writing tile {tile}")]
fn write_tile(root: &Path, tile: &Tile, blob: &Blob) -> Result<()> {
	let dir = root.join(tile.zoom.to_string()).join(tile.x.to_string());
	fs::create_dir_all(&dir)?;
	fs::write(dir.join(format!("{}.mvt", tile.y)), blob.as_slice())?;
	Ok(())
}
