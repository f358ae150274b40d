use super::SourceError;
use thiserror::Error;
use tilekiln_core::Tile;

/// A tile that could not be rendered. Nothing of it must be cached.
///
/// The message names the tile and layer, never the query text.
#[derive(Debug, Error)]
pub enum RenderError {
	#[error("no source database connection for tile {tile}")]
	Session {
		tile: Tile,
		#[source]
		source: SourceError,
	},

	#[error("query of layer '{layer}' failed for tile {tile}")]
	Query {
		layer: String,
		tile: Tile,
		#[source]
		source: SourceError,
	},
}

impl RenderError {
	pub fn tile(&self) -> Tile {
		match self {
			RenderError::Session { tile, .. } | RenderError::Query { tile, .. } => *tile,
		}
	}
}
