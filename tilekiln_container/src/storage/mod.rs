//! The persistent tile cache.
//!
//! Tiles are stored per tileset, keyed by their coordinate, in partitions per zoom level
//! so a whole zoom can be evicted at once. Storage also records each tileset's
//! [`TilesetMetadata`], which is all a static server needs to serve it.

mod error;
pub use error::*;

mod memory;
pub use memory::*;

mod postgres;
pub use postgres::*;

use crate::Tileset;
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};
use tilekiln_core::{Blob, Tile, TilesetId, TilesetMetadata};

/// Operations a storage backend has to provide.
///
/// Every method is atomic on its own. Writers of different keys never contend, writers of
/// the same key are last-writer-wins.
#[async_trait]
pub trait StorageBackend: Debug + Send + Sync {
	/// Create the shared schema objects. Does nothing if they exist.
	async fn create_schema(&self) -> Result<(), StorageError>;

	/// Create the tables of a tileset for every zoom of its range and record its metadata.
	async fn prepare_storage(&self, metadata: &TilesetMetadata) -> Result<(), StorageError>;

	/// Recorded metadata of `id`, `None` if the tileset was never prepared.
	async fn tileset_metadata(&self, id: &TilesetId) -> Result<Option<TilesetMetadata>, StorageError>;

	/// Recorded metadata of every tileset, ordered by id.
	async fn all_metadata(&self) -> Result<Vec<TilesetMetadata>, StorageError>;

	async fn get_tile(&self, id: &TilesetId, tile: &Tile) -> Result<Option<Blob>, StorageError>;

	async fn save_tile(&self, id: &TilesetId, tile: &Tile, blob: &Blob) -> Result<(), StorageError>;

	/// Delete single tiles. Missing tiles are ignored.
	async fn delete_tiles(&self, id: &TilesetId, tiles: &[Tile]) -> Result<(), StorageError>;

	/// Empty the given zoom partitions, or all of them for `None`.
	///
	/// Callers only pass zooms inside the tileset's range.
	async fn truncate_tables(&self, id: &TilesetId, zooms: Option<&[u8]>) -> Result<(), StorageError>;

	/// Drop the tables and metadata of a tileset.
	async fn remove_tileset(&self, id: &TilesetId) -> Result<(), StorageError>;

	/// Number of stored tiles per zoom, ascending by zoom. Zooms without tiles may be left out.
	async fn tile_counts(&self, id: &TilesetId) -> Result<Vec<(u8, u64)>, StorageError>;
}

/// Shared handle to a storage backend.
#[derive(Clone, Debug)]
pub struct Storage {
	backend: Arc<dyn StorageBackend>,
}

impl Storage {
	pub fn new(backend: impl StorageBackend + 'static) -> Storage {
		Storage {
			backend: Arc::new(backend),
		}
	}

	/// A fresh, empty in-memory storage.
	pub fn memory() -> Storage {
		Storage::new(MemoryStorage::new())
	}

	pub async fn create_schema(&self) -> Result<(), StorageError> {
		self.backend.create_schema().await
	}

	pub async fn prepare_storage(&self, metadata: &TilesetMetadata) -> Result<(), StorageError> {
		log::info!(
			"preparing storage for '{}' at zooms {:?}..={:?}",
			metadata.id,
			metadata.minzoom,
			metadata.maxzoom
		);
		self.backend.prepare_storage(metadata).await
	}

	/// The cached tile, `None` on a cache miss.
	pub async fn get_tile(&self, id: &TilesetId, tile: &Tile) -> Result<Option<Blob>, StorageError> {
		self.backend.get_tile(id, tile).await
	}

	pub async fn save_tile(&self, id: &TilesetId, tile: &Tile, blob: &Blob) -> Result<(), StorageError> {
		self.backend.save_tile(id, tile, blob).await
	}

	pub async fn delete_tiles(&self, id: &TilesetId, tiles: &[Tile]) -> Result<(), StorageError> {
		if tiles.is_empty() {
			return Ok(());
		}
		self.backend.delete_tiles(id, tiles).await
	}

	/// Evict all tiles of `id`, or only those at `zooms`.
	///
	/// Zooms outside the tileset's range hold no tiles and are skipped with a warning.
	pub async fn truncate_tables(&self, id: &TilesetId, zooms: Option<&[u8]>) -> Result<(), StorageError> {
		let metadata = self
			.backend
			.tileset_metadata(id)
			.await?
			.ok_or_else(|| StorageError::NotPrepared(id.to_string()))?;

		let Some(zooms) = zooms else {
			log::info!("truncating all tiles of '{id}'");
			return self.backend.truncate_tables(id, None).await;
		};

		let in_range = |zoom: &u8| match (metadata.minzoom, metadata.maxzoom) {
			(Some(min), Some(max)) => (min..=max).contains(zoom),
			_ => false,
		};
		let mut valid: Vec<u8> = Vec::with_capacity(zooms.len());
		for zoom in zooms {
			if !in_range(zoom) {
				log::warn!("tileset '{id}' has no tiles at zoom {zoom}, skipping it");
			} else if !valid.contains(zoom) {
				valid.push(*zoom);
			}
		}
		if valid.is_empty() {
			return Ok(());
		}
		valid.sort_unstable();

		log::info!("truncating zooms {valid:?} of '{id}'");
		self.backend.truncate_tables(id, Some(&valid)).await
	}

	pub async fn remove_tileset(&self, id: &TilesetId) -> Result<(), StorageError> {
		log::info!("removing tileset '{id}'");
		self.backend.remove_tileset(id).await
	}

	/// Every tileset recorded in storage, built from its stored metadata.
	pub async fn get_tilesets(&self) -> Result<Vec<Tileset>, StorageError> {
		Ok(self
			.backend
			.all_metadata()
			.await?
			.into_iter()
			.map(|metadata| Tileset::from_metadata(self.clone(), metadata))
			.collect())
	}

	pub async fn tileset_metadata(&self, id: &TilesetId) -> Result<Option<TilesetMetadata>, StorageError> {
		self.backend.tileset_metadata(id).await
	}

	pub async fn tile_counts(&self, id: &TilesetId) -> Result<Vec<(u8, u64)>, StorageError> {
		self.backend.tile_counts(id).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	fn id(name: &str) -> TilesetId {
		TilesetId::new(name).unwrap()
	}

	fn tile(zoom: u8, x: u32, y: u32) -> Tile {
		Tile::new(zoom, x, y).unwrap()
	}

	async fn storage_with(ids: &[&str]) -> Storage {
		let storage = Storage::memory();
		storage.create_schema().await.unwrap();
		for name in ids {
			let metadata = TilesetMetadata {
				minzoom: Some(0),
				maxzoom: Some(4),
				..TilesetMetadata::new(id(name), name)
			};
			storage.prepare_storage(&metadata).await.unwrap();
		}
		storage
	}

	async fn fill(storage: &Storage, name: &str) {
		for zoom in 0..=4 {
			let t = tile(zoom, 0, 0);
			storage.save_tile(&id(name), &t, &Blob::from(format!("{name} {t}"))).await.unwrap();
		}
	}

	#[tokio::test]
	async fn truncate_one_zoom_leaves_the_rest() {
		let storage = storage_with(&["a", "b"]).await;
		fill(&storage, "a").await;
		fill(&storage, "b").await;

		storage.truncate_tables(&id("a"), Some(&[2])).await.unwrap();

		for zoom in 0..=4 {
			let a = storage.get_tile(&id("a"), &tile(zoom, 0, 0)).await.unwrap();
			assert_eq!(a.is_none(), zoom == 2, "zoom {zoom}");
			let b = storage.get_tile(&id("b"), &tile(zoom, 0, 0)).await.unwrap();
			assert!(b.is_some());
		}
	}

	#[tokio::test]
	async fn truncate_everything() {
		let storage = storage_with(&["a"]).await;
		fill(&storage, "a").await;
		storage.truncate_tables(&id("a"), None).await.unwrap();
		assert_eq!(storage.tile_counts(&id("a")).await.unwrap(), vec![]);
	}

	#[tokio::test]
	async fn truncate_skips_zooms_out_of_range() {
		let storage = storage_with(&["a"]).await;
		fill(&storage, "a").await;
		storage.truncate_tables(&id("a"), Some(&[9, 3, 3])).await.unwrap();
		assert_eq!(
			storage.tile_counts(&id("a")).await.unwrap(),
			vec![(0, 1), (1, 1), (2, 1), (4, 1)]
		);
		storage.truncate_tables(&id("a"), Some(&[20])).await.unwrap();
	}

	#[tokio::test]
	async fn truncate_unknown_tileset() {
		let storage = storage_with(&[]).await;
		let err = storage.truncate_tables(&id("nope"), None).await.unwrap_err();
		assert!(matches!(err, StorageError::NotPrepared(name) if name == "nope"));
	}

	#[tokio::test]
	async fn tilesets_from_metadata() {
		let storage = storage_with(&["b", "a"]).await;
		let tilesets = storage.get_tilesets().await.unwrap();
		assert_eq!(
			tilesets.iter().map(|t| t.id().as_str()).collect::<Vec<_>>(),
			vec!["a", "b"]
		);
		assert!(tilesets[0].config().is_none());
		assert_eq!(tilesets[0].metadata().maxzoom, Some(4));
	}

	#[tokio::test]
	async fn deleting_nothing_is_fine() {
		let storage = storage_with(&["a"]).await;
		storage.delete_tiles(&id("a"), &[]).await.unwrap();
	}
}
