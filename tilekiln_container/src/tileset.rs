use crate::{Storage, StorageError};
use std::sync::Arc;
use tilekiln_core::{Blob, Config, Tile, TilesetId, TilesetMetadata};

/// A tileset bound to the storage that caches its tiles.
///
/// Created from a full [`Config`] on the generation and admin paths, or only from the
/// metadata recorded in storage when serving.
#[derive(Clone, Debug)]
pub struct Tileset {
	storage: Storage,
	metadata: TilesetMetadata,
	config: Option<Arc<Config>>,
}

impl Tileset {
	pub fn from_config(storage: Storage, config: Arc<Config>) -> Tileset {
		Tileset {
			storage,
			metadata: config.metadata(),
			config: Some(config),
		}
	}

	pub fn from_metadata(storage: Storage, metadata: TilesetMetadata) -> Tileset {
		Tileset {
			storage,
			metadata,
			config: None,
		}
	}

	pub fn id(&self) -> &TilesetId {
		&self.metadata.id
	}

	pub fn metadata(&self) -> &TilesetMetadata {
		&self.metadata
	}

	/// The full configuration, if this tileset was not read back from storage.
	pub fn config(&self) -> Option<&Arc<Config>> {
		self.config.as_ref()
	}

	pub fn storage(&self) -> &Storage {
		&self.storage
	}

	/// Create the storage tables of this tileset and record its metadata.
	pub async fn prepare_storage(&self) -> Result<(), StorageError> {
		self.storage.prepare_storage(&self.metadata).await
	}

	pub async fn get_tile(&self, tile: &Tile) -> Result<Option<Blob>, StorageError> {
		self.storage.get_tile(self.id(), tile).await
	}

	pub async fn save_tile(&self, tile: &Tile, blob: &Blob) -> Result<(), StorageError> {
		self.storage.save_tile(self.id(), tile, blob).await
	}

	pub async fn delete_tiles(&self, tiles: &[Tile]) -> Result<(), StorageError> {
		self.storage.delete_tiles(self.id(), tiles).await
	}

	/// Evict every cached tile, or those at `zooms`.
	pub async fn truncate(&self, zooms: Option<&[u8]>) -> Result<(), StorageError> {
		self.storage.truncate_tables(self.id(), zooms).await
	}

	pub async fn remove(&self) -> Result<(), StorageError> {
		self.storage.remove_tileset(self.id()).await
	}

	pub async fn tile_counts(&self) -> Result<Vec<(u8, u64)>, StorageError> {
		self.storage.tile_counts(self.id()).await
	}

	pub fn tilejson(&self, url: &str) -> String {
		match &self.config {
			Some(config) => config.tilejson(url),
			None => self.metadata.tilejson(url),
		}
	}
}
