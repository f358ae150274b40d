use super::{
	ConfigError, DEFAULT_EXTENT, Definition, LayerConfig, SqlTemplate,
	source::{ConfigSource, DefinitionSource, LayerSource, MetadataSource},
};
use crate::{Tile, TilesetId, TilesetMetadata, ZoomRange};
use std::{
	fs,
	path::{Path, PathBuf},
};

/// The SQL of one layer for one tile.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayerQuery {
	pub layer_id: String,
	pub sql: String,
}

/// A validated tileset definition.
///
/// Immutable once loaded. Reloading a changed file produces a new `Config`.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
	id: TilesetId,
	name: String,
	description: Option<String>,
	attribution: Option<String>,
	version: Option<String>,
	bounds: Option<[f64; 4]>,
	center: Option<[f64; 3]>,
	layers: Vec<LayerConfig>,
	zoom_range: Option<ZoomRange>,
}

impl Config {
	/// Load a definition file. SQL files it references are resolved relative to its directory.
	pub fn from_path(path: &Path) -> Result<Config, ConfigError> {
		let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
			path: path.to_path_buf(),
			source,
		})?;
		let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
		let config = Config::from_yaml(&text, base_dir)?;
		log::debug!(
			"loaded tileset '{}' from '{}' with {} layers",
			config.id,
			path.display(),
			config.layers.len()
		);
		Ok(config)
	}

	/// Parse a definition document. `file:` references are resolved against `base_dir`.
	pub fn from_yaml(text: &str, base_dir: &Path) -> Result<Config, ConfigError> {
		let source: ConfigSource = serde_yaml_ng::from_str(text)?;
		let metadata = source.metadata.unwrap_or_default();

		let name = metadata.name.clone().ok_or(ConfigError::MissingName)?;
		let id = match &metadata.id {
			Some(id) => TilesetId::new(id)?,
			None => TilesetId::from_name(&name)?,
		};
		let (bounds, center) = parse_extent(&metadata)?;

		let mut layers = Vec::with_capacity(source.vector_layers.len());
		for (key, value) in source.vector_layers {
			let layer_id = key
				.as_str()
				.ok_or_else(|| ConfigError::InvalidLayerId(format!("{key:?}")))?
				.to_string();
			let layer: LayerSource = serde_yaml_ng::from_value(value)?;
			layers.push(build_layer(&layer_id, layer, base_dir)?);
		}

		let zoom_range = layers.iter().map(|l| l.zoom_range()).reduce(|a, b| a.union(&b));

		Ok(Config {
			id,
			name,
			description: metadata.description,
			attribution: metadata.attribution,
			version: metadata.version,
			bounds,
			center,
			layers,
			zoom_range,
		})
	}

	/// The same tileset under another id.
	pub fn with_id(&self, id: TilesetId) -> Config {
		Config { id, ..self.clone() }
	}

	pub fn id(&self) -> &TilesetId {
		&self.id
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn description(&self) -> Option<&str> {
		self.description.as_deref()
	}

	pub fn attribution(&self) -> Option<&str> {
		self.attribution.as_deref()
	}

	pub fn version(&self) -> Option<&str> {
		self.version.as_deref()
	}

	pub fn bounds(&self) -> Option<[f64; 4]> {
		self.bounds
	}

	pub fn center(&self) -> Option<[f64; 3]> {
		self.center
	}

	/// Layers in declaration order.
	pub fn layers(&self) -> &[LayerConfig] {
		&self.layers
	}

	pub fn layer(&self, id: &str) -> Option<&LayerConfig> {
		self.layers.iter().find(|l| l.id() == id)
	}

	/// Union of the layer zoom ranges, `None` without layers.
	pub fn zoom_range(&self) -> Option<ZoomRange> {
		self.zoom_range
	}

	pub fn minzoom(&self) -> Option<u8> {
		self.zoom_range.map(|r| r.min())
	}

	pub fn maxzoom(&self) -> Option<u8> {
		self.zoom_range.map(|r| r.max())
	}

	/// SQL of every layer present in `tile`, in layer order.
	pub fn layer_queries(&self, tile: &Tile) -> Vec<String> {
		self.layers.iter().filter_map(|l| l.render_sql(tile)).collect()
	}

	/// Like [`Config::layer_queries`], paired with the layer ids.
	pub fn layer_query_plan(&self, tile: &Tile) -> Vec<LayerQuery> {
		self
			.layers
			.iter()
			.filter_map(|layer| {
				layer.render_sql(tile).map(|sql| LayerQuery {
					layer_id: layer.id().to_string(),
					sql,
				})
			})
			.collect()
	}

	pub fn metadata(&self) -> TilesetMetadata {
		TilesetMetadata {
			id: self.id.clone(),
			name: self.name.clone(),
			description: self.description.clone(),
			attribution: self.attribution.clone(),
			version: self.version.clone(),
			bounds: self.bounds,
			center: self.center,
			minzoom: self.minzoom(),
			maxzoom: self.maxzoom(),
		}
	}

	pub fn tilejson(&self, url: &str) -> String {
		self.metadata().tilejson(url)
	}
}

fn parse_extent(metadata: &MetadataSource) -> Result<(Option<[f64; 4]>, Option<[f64; 3]>), ConfigError> {
	let bounds = match metadata.bounds.as_deref() {
		None => None,
		Some(&[west, south, east, north]) => {
			let longitudes = -180.0..=180.0;
			let latitudes = -90.0..=90.0;
			let valid = west < east
				&& south < north
				&& longitudes.contains(&west)
				&& longitudes.contains(&east)
				&& latitudes.contains(&south)
				&& latitudes.contains(&north);
			if !valid {
				return Err(ConfigError::Metadata {
					field: "bounds",
					message: format!("[{west}, {south}, {east}, {north}] is not a valid extent"),
				});
			}
			Some([west, south, east, north])
		}
		Some(_) => {
			return Err(ConfigError::Metadata {
				field: "bounds",
				message: "needs four numbers: west, south, east, north".to_string(),
			});
		}
	};

	let center = match metadata.center.as_deref() {
		None => None,
		Some(&[lon, lat, zoom]) if lon.is_finite() && lat.is_finite() && zoom.is_finite() => Some([lon, lat, zoom]),
		Some(_) => {
			return Err(ConfigError::Metadata {
				field: "center",
				message: "needs three numbers: longitude, latitude, zoom".to_string(),
			});
		}
	};

	Ok((bounds, center))
}

fn build_layer(id: &str, source: LayerSource, base_dir: &Path) -> Result<LayerConfig, ConfigError> {
	let definitions = source
		.sql
		.into_iter()
		.map(|definition| build_definition(id, definition, base_dir))
		.collect::<Result<Vec<_>, _>>()?;
	LayerConfig::new(
		id,
		source.description,
		source.fields,
		source.geometry_type,
		definitions,
	)
}

fn build_definition(layer: &str, source: DefinitionSource, base_dir: &Path) -> Result<Definition, ConfigError> {
	let zoom_range = ZoomRange::new(source.minzoom, source.maxzoom).map_err(|source| ConfigError::ZoomRange {
		layer: layer.to_string(),
		source,
	})?;

	let text = match (source.sql, source.file) {
		(Some(sql), None) => sql,
		(None, Some(file)) => {
			let path: PathBuf = base_dir.join(file);
			fs::read_to_string(&path).map_err(|source| ConfigError::Io { path, source })?
		}
		_ => {
			return Err(ConfigError::SqlSource {
				layer: layer.to_string(),
			});
		}
	};
	let template = SqlTemplate::parse(&text).map_err(|message| ConfigError::Template {
		layer: layer.to_string(),
		message,
	})?;

	let extent = source.extent.unwrap_or(DEFAULT_EXTENT);
	if extent == 0 {
		return Err(ConfigError::ZeroExtent {
			layer: layer.to_string(),
		});
	}

	Ok(Definition::new(
		layer,
		zoom_range,
		template,
		extent,
		source.buffer.unwrap_or(0),
	))
}

#[cfg(test)]
mod tests {
	use super::*;
	use assert_fs::{TempDir, prelude::*};
	use pretty_assertions::assert_eq;
	use rstest::rstest;

	const ROADS: &str = "
metadata:
  name: Roads only
vector_layers:
  roads:
    sql:
      - minzoom: 0
        maxzoom: 14
        sql: SELECT geom FROM roads
";

	fn load(text: &str) -> Result<Config, ConfigError> {
		Config::from_yaml(text, Path::new("."))
	}

	fn tile(zoom: u8, x: u32, y: u32) -> Tile {
		Tile::new(zoom, x, y).unwrap()
	}

	#[test]
	fn roads_example() {
		let config = load(ROADS).unwrap();
		assert_eq!(config.id().as_str(), "roads_only");

		let queries = config.layer_queries(&tile(10, 3, 5));
		assert_eq!(queries.len(), 1);
		assert!(queries[0].contains("SELECT geom FROM roads"));

		assert_eq!(config.layer_queries(&tile(20, 0, 0)), Vec::<String>::new());
	}

	#[test]
	fn layers_keep_declaration_order() {
		let config = load(
			"
metadata: {name: Ordered}
vector_layers:
  zebra:
    sql: [{minzoom: 2, maxzoom: 4, sql: SELECT 'zebra'}]
  alpha:
    sql: [{minzoom: 0, maxzoom: 10, sql: SELECT 'alpha'}]
  middle:
    sql: [{minzoom: 5, maxzoom: 6, sql: SELECT 'middle'}]
",
		)
		.unwrap();

		assert_eq!(
			config.layers().iter().map(|l| l.id()).collect::<Vec<_>>(),
			vec!["zebra", "alpha", "middle"]
		);
		assert_eq!(config.minzoom(), Some(0));
		assert_eq!(config.maxzoom(), Some(10));

		let plan = config.layer_query_plan(&tile(3, 0, 0));
		assert_eq!(
			plan.iter().map(|q| q.layer_id.as_str()).collect::<Vec<_>>(),
			vec!["zebra", "alpha"]
		);
		assert_eq!(
			plan.into_iter().map(|q| q.sql).collect::<Vec<_>>(),
			config.layer_queries(&tile(3, 0, 0))
		);
	}

	#[test]
	fn zoom_bounds_are_min_and_max_over_layers() {
		let config = load(
			"
metadata: {name: Bounds}
vector_layers:
  a: {sql: [{minzoom: 4, maxzoom: 6, sql: SELECT 1}, {minzoom: 9, maxzoom: 12, sql: SELECT 2}]}
  b: {sql: [{minzoom: 2, maxzoom: 3, sql: SELECT 3}]}
",
		)
		.unwrap();
		let min = config.layers().iter().map(|l| l.minzoom()).min();
		let max = config.layers().iter().map(|l| l.maxzoom()).max();
		assert_eq!((config.minzoom(), config.maxzoom()), (min, max));
		assert_eq!((min, max), (Some(2), Some(12)));
	}

	#[test]
	fn no_layers_leaves_zooms_undefined() {
		let config = load("metadata: {name: Empty}").unwrap();
		assert_eq!(config.zoom_range(), None);
		assert!(config.layer_queries(&tile(0, 0, 0)).is_empty());
		assert!(!config.tilejson("http://x/empty").contains("minzoom"));
	}

	#[test]
	fn metadata_and_tilejson() {
		let config = load(
			"
metadata:
  id: custom
  name: Full
  description: All the fields
  attribution: Somebody
  version: '1.0.0'
  bounds: [-10, -20, 30, 40]
  center: [1.5, 2.5, 6]
vector_layers:
  roads: {sql: [{minzoom: 3, maxzoom: 9, sql: SELECT 1}]}
",
		)
		.unwrap();

		let metadata = config.metadata();
		assert_eq!(metadata.id.as_str(), "custom");
		assert_eq!(metadata.version.as_deref(), Some("1.0.0"));
		assert_eq!(metadata.bounds, Some([-10.0, -20.0, 30.0, 40.0]));
		assert_eq!(metadata.center, Some([1.5, 2.5, 6.0]));
		assert_eq!((metadata.minzoom, metadata.maxzoom), (Some(3), Some(9)));
		assert_eq!(config.tilejson("http://h/custom"), metadata.tilejson("http://h/custom"));
	}

	#[test]
	fn with_id_overrides_only_the_id() {
		let config = load(ROADS).unwrap();
		let renamed = config.with_id(TilesetId::new("other").unwrap());
		assert_eq!(renamed.id().as_str(), "other");
		assert_eq!(renamed.layers(), config.layers());
		assert_eq!(renamed.name(), config.name());
	}

	#[test]
	fn sql_from_file() {
		let dir = TempDir::new().unwrap();
		dir.child("water.sql").write_str("SELECT way FROM water WHERE way && {{bbox}}").unwrap();
		dir.child("tileset.yaml")
			.write_str(
				"
metadata: {name: Files}
vector_layers:
  water: {sql: [{minzoom: 0, maxzoom: 5, file: water.sql, buffer: 8}]}
",
			)
			.unwrap();

		let config = Config::from_path(&dir.path().join("tileset.yaml")).unwrap();
		let sql = &config.layer_queries(&tile(0, 0, 0))[0];
		assert!(sql.contains("SELECT way FROM water WHERE way && ST_MakeEnvelope("));
		assert!(config.layer("water").is_some());
		assert!(config.layer("land").is_none());
	}

	#[test]
	fn missing_file_is_an_io_error() {
		let err = load("metadata: {name: X}\nvector_layers: {a: {sql: [{minzoom: 0, maxzoom: 1, file: nope.sql}]}}")
			.unwrap_err();
		assert!(matches!(err, ConfigError::Io { .. }), "{err:?}");
	}

	#[test]
	fn overlapping_definitions_fail_to_load() {
		let err = load(
			"
metadata: {name: Overlap}
vector_layers:
  roads:
    sql:
      - {minzoom: 0, maxzoom: 8, sql: SELECT 1}
      - {minzoom: 8, maxzoom: 14, sql: SELECT 2}
",
		)
		.unwrap_err();
		assert_eq!(
			err.to_string(),
			"definitions of layer 'roads' overlap: [0, 8] and [8, 14]"
		);
	}

	#[rstest]
	#[case("vector_layers: {}", "metadata.name is required")]
	#[case("metadata: {description: no name}", "metadata.name is required")]
	#[case("metadata: {name: X, colour: red}", "invalid config document")]
	#[case("metadata: [", "invalid config document")]
	#[case("metadata: {name: X, id: 'bad id'}", "not a valid tileset id")]
	#[case("metadata: {name: X, bounds: [1, 2, 3]}", "metadata.bounds needs four numbers")]
	#[case("metadata: {name: X, bounds: [10, 0, -10, 5]}", "metadata.bounds [10, 0, -10, 5] is not a valid extent")]
	#[case("metadata: {name: X, center: [1, 2]}", "metadata.center needs three numbers")]
	#[case("metadata: {name: X}\nvector_layers: {a: {sql: []}}", "layer 'a' has no sql definitions")]
	#[case(
		"metadata: {name: X}\nvector_layers: {a: {sql: [{minzoom: 0, maxzoom: 1}]}}",
		"needs exactly one of 'sql' or 'file'"
	)]
	#[case(
		"metadata: {name: X}\nvector_layers: {a: {sql: [{minzoom: 0, maxzoom: 1, sql: x, file: y}]}}",
		"needs exactly one of 'sql' or 'file'"
	)]
	#[case(
		"metadata: {name: X}\nvector_layers: {a: {sql: [{minzoom: 5, maxzoom: 1, sql: x}]}}",
		"invalid zoom range"
	)]
	#[case(
		"metadata: {name: X}\nvector_layers: {a: {sql: [{minzoom: 0, maxzoom: 40, sql: x}]}}",
		"invalid zoom range"
	)]
	#[case(
		"metadata: {name: X}\nvector_layers: {a: {sql: [{minzoom: 0, maxzoom: 1, sql: '{{ z }}'}]}}",
		"malformed sql template in layer 'a'"
	)]
	#[case(
		"metadata: {name: X}\nvector_layers: {a: {sql: [{minzoom: 0, maxzoom: 1, sql: x, extent: 0}]}}",
		"has extent 0"
	)]
	#[case(
		"metadata: {name: X}\nvector_layers: {'a b': {sql: [{minzoom: 0, maxzoom: 1, sql: x}]}}",
		"layer id 'a b'"
	)]
	fn invalid_documents(#[case] text: &str, #[case] message: &str) {
		let err = load(text).unwrap_err();
		assert!(err.to_string().contains(message), "{err}");
	}

	#[test]
	fn sql_template_alias() {
		let config = load("metadata: {name: X}\nvector_layers: {a: {sql: [{minzoom: 0, maxzoom: 1, sql_template: 'SELECT {{zoom}}'}]}}").unwrap();
		assert!(config.layer_queries(&tile(1, 0, 0))[0].contains("SELECT 1\n"));
	}
}
