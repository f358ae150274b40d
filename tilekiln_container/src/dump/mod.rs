//! Render a whole zoom pyramid straight to files, bypassing the tile storage.

mod directory;
pub use directory::*;

mod mbtiles;
pub use mbtiles::*;

use crate::Kiln;
use anyhow::Result;
use futures::{StreamExt, stream};
use std::future::Future;
use tilekiln_core::{Blob, Tile, ZoomRange};

/// Render every tile of `zooms` with `workers` renders in flight and hand the finished
/// tiles to `sink` in batches of up to `batch_size`. Tiles arrive in no particular order.
/// Returns the number of tiles.
async fn render_pyramid<F, Fut>(
	kiln: &Kiln,
	zooms: ZoomRange,
	workers: usize,
	batch_size: usize,
	mut sink: F,
) -> Result<u64>
where
	F: FnMut(Vec<(Tile, Blob)>) -> Fut,
	Fut: Future<Output = Result<()>>,
{
	log::info!("rendering {} tiles of zooms {zooms}", zooms.tile_count());

	let mut batches = stream::iter(zooms.tiles())
		.map(|tile| async move { kiln.render(&tile).await.map(|blob| (tile, blob)) })
		.buffer_unordered(workers.max(1))
		.chunks(batch_size.max(1));

	let mut count = 0;
	let mut current_zoom = None;
	while let Some(results) = batches.next().await {
		let batch = results.into_iter().collect::<Result<Vec<_>, _>>()?;
		for (tile, _) in &batch {
			if current_zoom.is_none_or(|zoom| tile.zoom > zoom) {
				current_zoom = Some(tile.zoom);
				log::info!("starting zoom {}", tile.zoom);
			}
		}
		count += batch.len() as u64;
		sink(batch).await?;
	}
	Ok(count)
}

/// Run file or SQLite I/O on the blocking pool.
async fn blocking<T, F>(f: F) -> Result<T>
where
	T: Send + 'static,
	F: FnOnce() -> Result<T> + Send + 'static,
{
	tokio::task::spawn_blocking(f).await?
}
