use anyhow::{Context, Result};
use dashmap::DashMap;
use std::{collections::BTreeMap, sync::Arc};
use tilekiln_container::{Kiln, Tileset};
use tilekiln_core::{Blob, Tile, TilesetId, TilesetMetadata};
use tokio::sync::Mutex;

/// How a tileset answers tile requests.
#[derive(Debug)]
enum Mode {
	/// From storage only.
	Static(Tileset),
	/// From storage, rendering and storing misses.
	Live(Tileset, Arc<Kiln>),
	/// Always rendering, never storing.
	Dev(Arc<Kiln>),
}

/// One tileset known to the server.
#[derive(Debug)]
pub struct ServedTileset {
	metadata: TilesetMetadata,
	mode: Mode,
}

impl ServedTileset {
	pub fn metadata(&self) -> &TilesetMetadata {
		&self.metadata
	}

	fn covers(&self, zoom: u8) -> bool {
		match (self.metadata.minzoom, self.metadata.maxzoom) {
			(Some(min), Some(max)) => min <= zoom && zoom <= max,
			_ => false,
		}
	}
}

/// Everything a request handler needs, built once before the server starts.
#[derive(Debug)]
pub struct AppContext {
	base_url: String,
	tilesets: BTreeMap<TilesetId, ServedTileset>,
	/// One lock per tile that is currently being rendered by the live path.
	inflight: InflightMap,
}

impl AppContext {
	pub fn new(base_url: &str) -> AppContext {
		AppContext {
			base_url: base_url.trim_end_matches('/').to_string(),
			tilesets: BTreeMap::new(),
			inflight: DashMap::new(),
		}
	}

	/// Serve `tileset` from storage only.
	pub fn add_static(&mut self, tileset: Tileset) {
		self.insert(tileset.metadata().clone(), Mode::Static(tileset));
	}

	/// Serve `tileset` from storage and render misses with `kiln`.
	pub fn add_live(&mut self, tileset: Tileset, kiln: Arc<Kiln>) {
		self.insert(tileset.metadata().clone(), Mode::Live(tileset, kiln));
	}

	/// Render every request with `kiln`.
	pub fn add_dev(&mut self, kiln: Arc<Kiln>) {
		self.insert(kiln.config().metadata(), Mode::Dev(kiln));
	}

	fn insert(&mut self, metadata: TilesetMetadata, mode: Mode) {
		log::info!("serving tileset '{}'", metadata.id);
		if self.tilesets.contains_key(&metadata.id) {
			log::warn!("tileset '{}' is added twice, the last one wins", metadata.id);
		}
		self.tilesets.insert(metadata.id.clone(), ServedTileset { metadata, mode });
	}

	pub fn base_url(&self) -> &str {
		&self.base_url
	}

	pub fn tileset(&self, id: &str) -> Option<&ServedTileset> {
		let id = id.parse::<TilesetId>().ok()?;
		self.tilesets.get(&id)
	}

	pub fn tileset_ids(&self) -> impl Iterator<Item = &TilesetId> {
		self.tilesets.keys()
	}

	/// TileJSON of a served tileset, with tile URLs below this server.
	pub fn tilejson(&self, served: &ServedTileset) -> String {
		let url = format!("{}/{}", self.base_url, served.metadata.id);
		match &served.mode {
			Mode::Static(tileset) | Mode::Live(tileset, _) => tileset.tilejson(&url),
			Mode::Dev(kiln) => kiln.config().tilejson(&url),
		}
	}

	/// The tile, or `None` if there is none to serve.
	pub async fn tile(&self, served: &ServedTileset, tile: &Tile) -> Result<Option<Blob>> {
		if !served.covers(tile.zoom) {
			return Ok(None);
		}
		match &served.mode {
			Mode::Static(tileset) => Ok(tileset.get_tile(tile).await?),
			Mode::Live(tileset, kiln) => self.live_tile(tileset, kiln, tile).await.map(Some),
			Mode::Dev(kiln) => Ok(Some(kiln.render(tile).await?)),
		}
	}

	/// Read-through cache. Concurrent misses of one tile are rendered once; the other
	/// requests wait for that render and then read the stored tile.
	async fn live_tile(&self, tileset: &Tileset, kiln: &Kiln, tile: &Tile) -> Result<Blob> {
		if let Some(blob) = tileset.get_tile(tile).await? {
			return Ok(blob);
		}

		let slot = InflightSlot::enter(&self.inflight, (tileset.id().clone(), *tile));
		let _guard = slot.lock().lock().await;
		if let Some(blob) = tileset.get_tile(tile).await? {
			log::debug!("{tile} of '{}' was rendered by a concurrent request", tileset.id());
			return Ok(blob);
		}
		let blob = kiln.render(tile).await?;
		tileset
			.save_tile(tile, &blob)
			.await
			.with_context(|| format!("storing rendered tile {tile}"))?;
		Ok(blob)
	}
}

type InflightMap = DashMap<(TilesetId, Tile), Arc<Mutex<()>>>;

/// A share of one in-flight lock. The map entry is removed when the last share is
/// dropped, including when a request is cancelled mid-render.
struct InflightSlot<'a> {
	map: &'a InflightMap,
	key: (TilesetId, Tile),
	lock: Option<Arc<Mutex<()>>>,
}

impl<'a> InflightSlot<'a> {
	fn enter(map: &'a InflightMap, key: (TilesetId, Tile)) -> InflightSlot<'a> {
		let lock = map.entry(key.clone()).or_default().clone();
		InflightSlot {
			map,
			key,
			lock: Some(lock),
		}
	}

	fn lock(&self) -> &Mutex<()> {
		self.lock.as_deref().unwrap_or_else(|| unreachable!("lock is only taken on drop"))
	}
}

impl Drop for InflightSlot<'_> {
	fn drop(&mut self) {
		drop(self.lock.take());
		self.map.remove_if(&self.key, |_, entry| Arc::strong_count(entry) == 1);
	}
}
