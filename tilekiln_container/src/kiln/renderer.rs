use super::{RenderError, SourceDatabase};
use std::sync::Arc;
use tilekiln_core::{Blob, Config, Tile};

/// Renders tiles of one tileset.
///
/// An MVT tile is a sequence of independently encoded layers, so the kiln runs the query
/// of every layer present at the tile's zoom and concatenates the results in layer order.
/// All queries of one tile share a single source session; parallelism comes from
/// rendering several tiles at once.
pub struct Kiln {
	config: Arc<Config>,
	source: Arc<dyn SourceDatabase>,
}

impl Kiln {
	pub fn new(config: Arc<Config>, source: Arc<dyn SourceDatabase>) -> Kiln {
		Kiln { config, source }
	}

	pub fn config(&self) -> &Arc<Config> {
		&self.config
	}

	/// Render `tile`. Any failing layer fails the whole tile.
	pub async fn render(&self, tile: &Tile) -> Result<Blob, RenderError> {
		let plan = self.config.layer_query_plan(tile);
		let mut blob = Blob::new_empty();
		if plan.is_empty() {
			log::debug!("no layers of '{}' at {tile}", self.config.id());
			return Ok(blob);
		}

		let mut session = self
			.source
			.session()
			.await
			.map_err(|source| RenderError::Session { tile: *tile, source })?;

		for query in plan {
			log::trace!("rendering layer '{}' of {tile}:\n{}", query.layer_id, query.sql);
			let layer = session
				.fetch_layer(&query.sql)
				.await
				.map_err(|source| RenderError::Query {
					layer: query.layer_id,
					tile: *tile,
					source,
				})?;
			blob.append(&layer);
		}

		log::debug!("rendered {tile} of '{}' ({} bytes)", self.config.id(), blob.len());
		Ok(blob)
	}
}

impl std::fmt::Debug for Kiln {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Kiln").field("tileset", self.config.id()).finish()
	}
}
