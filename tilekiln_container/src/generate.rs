use crate::{Kiln, Tileset};
use anyhow::Result;
use futures::{StreamExt, TryStreamExt, stream};
use std::sync::atomic::{AtomicU64, Ordering};
use tilekiln_core::Tile;
use tilekiln_derive::context;

/// Render `tiles` into the storage of `tileset`, with at most `workers` renders in flight.
///
/// Every render checks out its own source session, so `workers` should not exceed the
/// size of the source pool. Stops at the first failure. Returns the number of tiles
/// written.
#[context("generating tiles of '{}'", tileset.id())]
pub async fn generate_tiles<I>(kiln: &Kiln, tileset: &Tileset, tiles: I, workers: usize) -> Result<u64>
where
	I: IntoIterator<Item = Tile>,
{
	let written = AtomicU64::new(0);
	let written_ref = &written;

	stream::iter(tiles)
		.map(Ok::<Tile, anyhow::Error>)
		.try_for_each_concurrent(workers.max(1), |tile| async move {
			let blob = kiln.render(&tile).await?;
			tileset.save_tile(&tile, &blob).await?;
			let count = written_ref.fetch_add(1, Ordering::Relaxed) + 1;
			if count % 1000 == 0 {
				log::info!("generated {count} tiles of '{}'", tileset.id());
			}
			Ok(())
		})
		.await?;

	Ok(written.into_inner())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{MockSource, RenderError, Storage};
	use pretty_assertions::assert_eq;
	use std::{path::Path, sync::Arc};
	use tilekiln_core::{Blob, Config};

	const CONFIG: &str = "
metadata: {name: Generate}
vector_layers:
  land: {sql: [{minzoom: 0, maxzoom: 3, sql: '{{zoom}}/{{x}}/{{y}}'}]}
";

	async fn setup(source: MockSource) -> (Kiln, Tileset) {
		let config = Arc::new(Config::from_yaml(CONFIG, Path::new(".")).unwrap());
		let storage = Storage::memory();
		storage.create_schema().await.unwrap();
		let tileset = Tileset::from_config(storage, config.clone());
		tileset.prepare_storage().await.unwrap();
		(Kiln::new(config, Arc::new(source)), tileset)
	}

	#[tokio::test]
	async fn renders_and_stores_every_tile() {
		let (kiln, tileset) = setup(MockSource::new()).await;
		let tiles: Vec<Tile> = ["0/0/0", "2/1/3", "3/7/7"].iter().map(|t| t.parse().unwrap()).collect();

		let count = generate_tiles(&kiln, &tileset, tiles.clone(), 2).await.unwrap();
		assert_eq!(count, 3);
		for tile in tiles {
			assert_eq!(
				tileset.get_tile(&tile).await.unwrap(),
				Some(Blob::from(format!("land|{tile};")))
			);
		}
	}

	#[tokio::test]
	async fn failure_stops_generation() {
		let (kiln, tileset) = setup(MockSource::new().fail_layer("land")).await;
		let err = generate_tiles(&kiln, &tileset, vec![Tile::new(1, 0, 0).unwrap()], 4)
			.await
			.unwrap_err();
		assert_eq!(err.to_string(), "generating tiles of 'generate'");
		assert!(err.chain().any(|e| e.downcast_ref::<RenderError>().is_some()));
		assert_eq!(tileset.tile_counts().await.unwrap(), vec![]);
	}
}
