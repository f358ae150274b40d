use super::{ConfigError, Definition};
use crate::{Tile, ZoomRange};
use serde::{Deserialize, Serialize};
use std::{
	cmp::Ordering,
	collections::{BTreeMap, BTreeSet},
	fmt,
};

/// Kind of geometry a layer can hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryType {
	Point,
	Line,
	Polygon,
}

impl fmt::Display for GeometryType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			GeometryType::Point => "point",
			GeometryType::Line => "line",
			GeometryType::Polygon => "polygon",
		})
	}
}

/// A named output layer and the definitions that produce it.
///
/// Definitions are kept sorted by zoom and never overlap, so every zoom is served by
/// at most one of them. Zooms between two definitions are allowed and simply produce
/// no layer.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerConfig {
	id: String,
	description: Option<String>,
	fields: BTreeMap<String, String>,
	geometry_type: BTreeSet<GeometryType>,
	definitions: Vec<Definition>,
	zoom_range: ZoomRange,
}

impl LayerConfig {
	/// Build a layer, rejecting an empty or overlapping set of definitions.
	pub fn new(
		id: &str,
		description: Option<String>,
		fields: BTreeMap<String, String>,
		geometry_type: BTreeSet<GeometryType>,
		mut definitions: Vec<Definition>,
	) -> Result<LayerConfig, ConfigError> {
		if id.is_empty() || !id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-') {
			return Err(ConfigError::InvalidLayerId(id.to_string()));
		}

		definitions.sort_by_key(|d| (d.minzoom(), d.maxzoom()));
		for pair in definitions.windows(2) {
			let (first, second) = (pair[0].zoom_range(), pair[1].zoom_range());
			if first.overlaps(&second) {
				return Err(ConfigError::OverlappingDefinitions {
					layer: id.to_string(),
					first,
					second,
				});
			}
		}

		let zoom_range = definitions
			.iter()
			.map(|d| d.zoom_range())
			.reduce(|a, b| a.union(&b))
			.ok_or_else(|| ConfigError::NoDefinitions(id.to_string()))?;

		Ok(LayerConfig {
			id: id.to_string(),
			description,
			fields,
			geometry_type,
			definitions,
			zoom_range,
		})
	}

	pub fn id(&self) -> &str {
		&self.id
	}

	pub fn description(&self) -> Option<&str> {
		self.description.as_deref()
	}

	pub fn fields(&self) -> &BTreeMap<String, String> {
		&self.fields
	}

	pub fn geometry_type(&self) -> &BTreeSet<GeometryType> {
		&self.geometry_type
	}

	/// Definitions in ascending zoom order.
	pub fn definitions(&self) -> &[Definition] {
		&self.definitions
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

	/// The definition covering `zoom`, if any.
	pub fn definition_for(&self, zoom: u8) -> Option<&Definition> {
		if !self.zoom_range.contains(zoom) {
			return None;
		}
		self
			.definitions
			.binary_search_by(|d| {
				if d.maxzoom() < zoom {
					Ordering::Less
				} else if d.minzoom() > zoom {
					Ordering::Greater
				} else {
					Ordering::Equal
				}
			})
			.ok()
			.map(|index| &self.definitions[index])
	}

	/// The query producing this layer for `tile`, or `None` when no definition covers its zoom.
	pub fn render_sql(&self, tile: &Tile) -> Option<String> {
		self.definition_for(tile.zoom).map(|d| d.render_sql(tile))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{SqlTemplate, config::definition::DEFAULT_EXTENT};
	use pretty_assertions::assert_eq;
	use rstest::rstest;

	fn definition(min: u8, max: u8) -> Definition {
		Definition::new(
			"roads",
			ZoomRange::new(min, max).unwrap(),
			SqlTemplate::parse(&format!("SELECT '{min}-{max}' AS source")).unwrap(),
			DEFAULT_EXTENT,
			0,
		)
	}

	fn layer(ranges: &[(u8, u8)]) -> Result<LayerConfig, ConfigError> {
		LayerConfig::new(
			"roads",
			None,
			BTreeMap::new(),
			BTreeSet::new(),
			ranges.iter().map(|&(min, max)| definition(min, max)).collect(),
		)
	}

	#[test]
	fn derived_zoom_range() {
		let layer = layer(&[(8, 14), (0, 3)]).unwrap();
		assert_eq!(layer.minzoom(), 0);
		assert_eq!(layer.maxzoom(), 14);
		assert_eq!(
			layer.definitions().iter().map(|d| d.minzoom()).collect::<Vec<_>>(),
			vec![0, 8]
		);
	}

	#[rstest]
	#[case(0, Some("0-3"))]
	#[case(3, Some("0-3"))]
	#[case(4, Some("4-7"))]
	#[case(7, Some("4-7"))]
	#[case(8, None)]
	#[case(9, None)]
	#[case(10, Some("10-14"))]
	#[case(14, Some("10-14"))]
	#[case(15, None)]
	#[case(31, None)]
	fn selects_the_covering_definition(#[case] zoom: u8, #[case] expected: Option<&str>) {
		let layer = layer(&[(10, 14), (0, 3), (4, 7)]).unwrap();
		let tile = Tile::new(zoom, 0, 0).unwrap();
		let sql = layer.render_sql(&tile);
		match expected {
			Some(source) => assert!(sql.unwrap().contains(&format!("'{source}'"))),
			None => assert_eq!(sql, None),
		}
	}

	#[test]
	fn selection_is_deterministic() {
		let layer = layer(&[(0, 5), (6, 12)]).unwrap();
		let tile = Tile::new(9, 100, 200).unwrap();
		assert_eq!(layer.render_sql(&tile), layer.render_sql(&tile));
	}

	#[rstest]
	#[case(&[(0, 5), (5, 10)])]
	#[case(&[(0, 14), (3, 4)])]
	#[case(&[(2, 2), (0, 1), (1, 3)])]
	fn overlapping_definitions_are_rejected(#[case] ranges: &[(u8, u8)]) {
		let err = layer(ranges).unwrap_err();
		assert!(matches!(err, ConfigError::OverlappingDefinitions { .. }), "{err:?}");
	}

	#[test]
	fn empty_layer_is_rejected() {
		assert!(matches!(layer(&[]).unwrap_err(), ConfigError::NoDefinitions(id) if id == "roads"));
	}

	#[rstest]
	#[case("")]
	#[case("road's")]
	#[case("a b")]
	fn invalid_ids(#[case] id: &str) {
		let err = LayerConfig::new(id, None, BTreeMap::new(), BTreeSet::new(), vec![definition(0, 1)]).unwrap_err();
		assert!(matches!(err, ConfigError::InvalidLayerId(_)));
	}

	#[test]
	fn geometry_type_names() {
		assert_eq!(GeometryType::Line.to_string(), "line");
		let parsed: BTreeSet<GeometryType> = serde_yaml_ng::from_str("[polygon, point]").unwrap();
		assert_eq!(
			parsed.into_iter().collect::<Vec<_>>(),
			vec![GeometryType::Point, GeometryType::Polygon]
		);
	}
}
