use thiserror::Error;
use tilekiln_core::TilesetId;

/// Failures of the tile storage. A cache miss is not one of them.
#[derive(Debug, Error)]
pub enum StorageError {
	#[error("storage for '{0}' has not been prepared")]
	NotPrepared(String),

	#[error("tileset '{id}' has no storage for zoom {zoom}")]
	NoPartition { id: TilesetId, zoom: u8 },

	#[error("{context}")]
	Database {
		context: String,
		#[source]
		source: sqlx::Error,
	},

	#[error("stored metadata of '{id}' is invalid")]
	Metadata {
		id: String,
		#[source]
		source: serde_json::Error,
	},
}
