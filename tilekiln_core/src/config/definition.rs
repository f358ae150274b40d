use super::SqlTemplate;
use crate::{Tile, ZoomRange};

/// Default MVT extent of a layer, in tile units.
pub const DEFAULT_EXTENT: u32 = 4096;

/// One SQL template bound to an inclusive zoom range of a layer.
///
/// The template selects the layer's features for a tile; [`Definition::render_sql`] wraps it
/// in an `ST_AsMVT` aggregate so the query returns a finished single-layer MVT buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct Definition {
	layer_id: String,
	zoom_range: ZoomRange,
	template: SqlTemplate,
	extent: u32,
	buffer: u32,
}

impl Definition {
	pub fn new(layer_id: &str, zoom_range: ZoomRange, template: SqlTemplate, extent: u32, buffer: u32) -> Definition {
		Definition {
			layer_id: layer_id.to_string(),
			zoom_range,
			template,
			extent,
			buffer,
		}
	}

	pub fn layer_id(&self) -> &str {
		&self.layer_id
	}

	pub fn zoom_range(&self) -> ZoomRange {
		self.zoom_range
	}

	pub fn minzoom(&self) -> u8 {
		self.zoom_range.min()
	}

	pub fn maxzoom(&self) -> u8 {
		self.zoom_range.max()
	}

	pub fn extent(&self) -> u32 {
		self.extent
	}

	pub fn buffer(&self) -> u32 {
		self.buffer
	}

	/// The executable query for `tile`.
	pub fn render_sql(&self, tile: &Tile) -> String {
		format!(
			"WITH mvtgeom AS\n(\n{}\n)\nSELECT ST_AsMVT(mvtgeom.*, '{}', {})\nFROM mvtgeom;",
			self.template.render(tile, self.extent, self.buffer).trim_end(),
			self.layer_id,
			self.extent
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn wraps_query_in_mvt_aggregate() {
		let definition = Definition::new(
			"water",
			ZoomRange::new(0, 14).unwrap(),
			SqlTemplate::parse("SELECT geom FROM water WHERE z = {{zoom}}\n").unwrap(),
			DEFAULT_EXTENT,
			0,
		);
		assert_eq!(
			definition.render_sql(&Tile::new(3, 1, 2).unwrap()),
			"WITH mvtgeom AS\n(\nSELECT geom FROM water WHERE z = 3\n)\nSELECT ST_AsMVT(mvtgeom.*, 'water', 4096)\nFROM mvtgeom;"
		);
	}

	#[test]
	fn custom_extent_is_used_everywhere() {
		let definition = Definition::new(
			"pois",
			ZoomRange::new(10, 10).unwrap(),
			SqlTemplate::parse("SELECT {{extent}}, {{buffer}}").unwrap(),
			512,
			16,
		);
		let sql = definition.render_sql(&Tile::new(10, 0, 0).unwrap());
		assert!(sql.contains("SELECT 512, 16\n"));
		assert!(sql.ends_with("ST_AsMVT(mvtgeom.*, 'pois', 512)\nFROM mvtgeom;"));
		assert_eq!(definition.minzoom(), 10);
		assert_eq!(definition.maxzoom(), 10);
	}
}
