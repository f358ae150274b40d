use super::{StorageBackend, StorageError};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use tilekiln_core::{Blob, Tile, TilesetId, TilesetMetadata};

const SCHEMA: &str = "tilekiln schema";

/// Storage kept in process memory.
///
/// Follows the same rules as [`PgStorage`](super::PgStorage): the schema has to be created
/// and a tileset prepared before tiles can be stored, and only zooms inside the tileset's
/// range can hold tiles.
#[derive(Debug, Default)]
pub struct MemoryStorage {
	inner: RwLock<Option<BTreeMap<TilesetId, MemoryTileset>>>,
}

#[derive(Debug)]
struct MemoryTileset {
	metadata: TilesetMetadata,
	tiles: BTreeMap<Tile, Blob>,
}

impl MemoryTileset {
	fn has_zoom(&self, zoom: u8) -> bool {
		match (self.metadata.minzoom, self.metadata.maxzoom) {
			(Some(min), Some(max)) => min <= zoom && zoom <= max,
			_ => false,
		}
	}
}

impl MemoryStorage {
	pub fn new() -> MemoryStorage {
		MemoryStorage::default()
	}

	fn read<T>(
		&self,
		id: &TilesetId,
		f: impl FnOnce(&MemoryTileset) -> Result<T, StorageError>,
	) -> Result<T, StorageError> {
		let guard = self.inner.read();
		let tilesets = guard.as_ref().ok_or_else(|| StorageError::NotPrepared(SCHEMA.to_string()))?;
		let tileset = tilesets
			.get(id)
			.ok_or_else(|| StorageError::NotPrepared(id.to_string()))?;
		f(tileset)
	}

	fn write<T>(
		&self,
		id: &TilesetId,
		f: impl FnOnce(&mut MemoryTileset) -> Result<T, StorageError>,
	) -> Result<T, StorageError> {
		let mut guard = self.inner.write();
		let tilesets = guard.as_mut().ok_or_else(|| StorageError::NotPrepared(SCHEMA.to_string()))?;
		let tileset = tilesets
			.get_mut(id)
			.ok_or_else(|| StorageError::NotPrepared(id.to_string()))?;
		f(tileset)
	}
}

#[async_trait]
impl StorageBackend for MemoryStorage {
	async fn create_schema(&self) -> Result<(), StorageError> {
		let mut guard = self.inner.write();
		if guard.is_none() {
			*guard = Some(BTreeMap::new());
		}
		Ok(())
	}

	async fn prepare_storage(&self, metadata: &TilesetMetadata) -> Result<(), StorageError> {
		let mut guard = self.inner.write();
		let tilesets = guard.as_mut().ok_or_else(|| StorageError::NotPrepared(SCHEMA.to_string()))?;
		tilesets
			.entry(metadata.id.clone())
			.and_modify(|tileset| tileset.metadata = metadata.clone())
			.or_insert_with(|| MemoryTileset {
				metadata: metadata.clone(),
				tiles: BTreeMap::new(),
			});
		Ok(())
	}

	async fn tileset_metadata(&self, id: &TilesetId) -> Result<Option<TilesetMetadata>, StorageError> {
		let guard = self.inner.read();
		let tilesets = guard.as_ref().ok_or_else(|| StorageError::NotPrepared(SCHEMA.to_string()))?;
		Ok(tilesets.get(id).map(|tileset| tileset.metadata.clone()))
	}

	async fn all_metadata(&self) -> Result<Vec<TilesetMetadata>, StorageError> {
		let guard = self.inner.read();
		let tilesets = guard.as_ref().ok_or_else(|| StorageError::NotPrepared(SCHEMA.to_string()))?;
		Ok(tilesets.values().map(|tileset| tileset.metadata.clone()).collect())
	}

	async fn get_tile(&self, id: &TilesetId, tile: &Tile) -> Result<Option<Blob>, StorageError> {
		self.read(id, |tileset| Ok(tileset.tiles.get(tile).cloned()))
	}

	async fn save_tile(&self, id: &TilesetId, tile: &Tile, blob: &Blob) -> Result<(), StorageError> {
		self.write(id, |tileset| {
			if !tileset.has_zoom(tile.zoom) {
				return Err(StorageError::NoPartition {
					id: id.clone(),
					zoom: tile.zoom,
				});
			}
			tileset.tiles.insert(*tile, blob.clone());
			Ok(())
		})
	}

	async fn delete_tiles(&self, id: &TilesetId, tiles: &[Tile]) -> Result<(), StorageError> {
		self.write(id, |tileset| {
			for tile in tiles {
				tileset.tiles.remove(tile);
			}
			Ok(())
		})
	}

	async fn truncate_tables(&self, id: &TilesetId, zooms: Option<&[u8]>) -> Result<(), StorageError> {
		self.write(id, |tileset| {
			match zooms {
				None => tileset.tiles.clear(),
				Some(zooms) => tileset.tiles.retain(|tile, _| !zooms.contains(&tile.zoom)),
			}
			Ok(())
		})
	}

	async fn remove_tileset(&self, id: &TilesetId) -> Result<(), StorageError> {
		let mut guard = self.inner.write();
		if let Some(tilesets) = guard.as_mut() {
			tilesets.remove(id);
		}
		Ok(())
	}

	async fn tile_counts(&self, id: &TilesetId) -> Result<Vec<(u8, u64)>, StorageError> {
		self.read(id, |tileset| {
			let mut counts: BTreeMap<u8, u64> = BTreeMap::new();
			for tile in tileset.tiles.keys() {
				*counts.entry(tile.zoom).or_default() += 1;
			}
			Ok(counts.into_iter().collect())
		})
	}
}
