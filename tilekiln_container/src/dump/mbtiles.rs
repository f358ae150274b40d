//! MBTiles 1.3 export.
//!
//! Tiles are stored gzip-compressed with `format = pbf`, rows in the TMS scheme
//! (`tile_row = 2^z - 1 - y`).

use super::{blocking, render_pyramid};
use crate::Kiln;
use anyhow::Result;
use flate2::{Compression, bufread::GzEncoder};
use r2d2::Pool;
use r2d2_sqlite::{SqliteConnectionManager, rusqlite::params};
use serde_json::json;
use std::{fs::remove_file, io::Read, path::Path, sync::Arc};
use tilekiln_core::{Blob, Config, Tile, ZoomRange};
use tilekiln_derive::context;

const BATCH_SIZE: usize = 1024;

/// Writer of a fresh MBTiles file.
#[derive(Clone)]
pub struct MBTilesDump {
	pool: Pool<SqliteConnectionManager>,
}

impl MBTilesDump {
	/// Create the file, replacing an existing one.
	#[context("creating MBTiles file '{}'", path.display())]
	pub fn create(path: &Path) -> Result<MBTilesDump> {
		if path.exists() {
			remove_file(path)?;
		}
		let pool = Pool::builder()
			.max_size(1)
			.build(SqliteConnectionManager::file(path))?;

		pool.get()?.execute_batch(
			"CREATE TABLE metadata (name TEXT, value TEXT, UNIQUE (name));
			CREATE TABLE tiles (zoom_level INTEGER, tile_column INTEGER, tile_row INTEGER, tile_data BLOB);
			CREATE UNIQUE INDEX tile_index ON tiles (zoom_level, tile_column, tile_row);",
		)?;

		Ok(MBTilesDump { pool })
	}

	/// Render `zooms` of the kiln's tileset into a new MBTiles file at `path`.
	#[context("dumping '{}' to MBTiles file '{}'", kiln.config().id(), path.display())]
	pub async fn write(kiln: &Kiln, path: &Path, zooms: ZoomRange, workers: usize) -> Result<u64> {
		let dump = {
			let path = path.to_path_buf();
			let config = Arc::clone(kiln.config());
			blocking(move || {
				let dump = MBTilesDump::create(&path)?;
				dump.write_metadata(&config, zooms)?;
				Ok(dump)
			})
			.await?
		};

		let count = render_pyramid(kiln, zooms, workers, BATCH_SIZE, |batch| {
			let dump = dump.clone();
			blocking(move || dump.add_tiles(&batch))
		})
		.await?;

		log::info!("wrote {count} tiles to '{}'", path.display());
		Ok(count)
	}

	#[context("writing MBTiles metadata")]
	fn write_metadata(&self, config: &Config, zooms: ZoomRange) -> Result<()> {
		self.set_metadata("name", config.name())?;
		self.set_metadata("format", "pbf")?;
		self.set_metadata("type", "baselayer")?;

		let [west, south, east, north] = config.bounds().unwrap_or([-180.0, -85.051_128_78, 180.0, 85.051_128_78]);
		self.set_metadata("bounds", &format!("{west},{south},{east},{north}"))?;
		let [lon, lat, zoom] = config.center().unwrap_or([0.0, 0.0, f64::from(zooms.min())]);
		self.set_metadata("center", &format!("{lon},{lat},{zoom}"))?;
		self.set_metadata("minzoom", &zooms.min().to_string())?;
		self.set_metadata("maxzoom", &zooms.max().to_string())?;

		if let Some(description) = config.description() {
			self.set_metadata("description", description)?;
		}
		if let Some(attribution) = config.attribution() {
			self.set_metadata("attribution", attribution)?;
		}
		if let Some(version) = config.version() {
			self.set_metadata("version", version)?;
		}

		let vector_layers: Vec<_> = config
			.layers()
			.iter()
			.map(|layer| {
				json!({
					"id": layer.id(),
					"description": layer.description().unwrap_or_default(),
					"fields": layer.fields(),
					"minzoom": layer.minzoom(),
					"maxzoom": layer.maxzoom(),
				})
			})
			.collect();
		self.set_metadata("json", &json!({ "vector_layers": vector_layers }).to_string())
	}

	#[context("setting metadata '{}'", name)]
	fn set_metadata(&self, name: &str, value: &str) -> Result<()> {
		self.pool.get()?.execute(
			"INSERT OR REPLACE INTO metadata (name, value) VALUES (?1, ?2)",
			params![name, value],
		)?;
		Ok(())
	}

	/// Compress and insert tiles in one transaction.
	#[context("adding {} tiles to MBTiles file", tiles.len())]
	fn add_tiles(&self, tiles: &[(Tile, Blob)]) -> Result<()> {
		let mut connection = self.pool.get()?;
		let transaction = connection.transaction()?;
		for (tile, blob) in tiles {
			transaction.execute(
				"INSERT INTO tiles (zoom_level, tile_column, tile_row, tile_data) VALUES (?1, ?2, ?3, ?4)",
				params![tile.zoom, tile.x, tile.tms_y(), gzip(blob)?.as_slice()],
			)?;
		}
		transaction.commit()?;
		Ok(())
	}
}

#[context("compressing tile")]
fn gzip(blob: &Blob) -> Result<Blob> {
	let mut encoder = GzEncoder::new(blob.as_slice(), Compression::best());
	let mut compressed = Vec::new();
	encoder.read_to_end(&mut compressed)?;
	Ok(Blob::from(compressed))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::MockSource;
	use assert_fs::NamedTempFile;
	use flate2::read::GzDecoder;
	use pretty_assertions::assert_eq;
	use r2d2_sqlite::rusqlite::Connection;
	use std::sync::Arc;

	const CONFIG: &str = "
metadata: {name: Dump, attribution: Someone}
vector_layers:
  roads:
    description: Streets
    fields: {name: String}
    sql: [{minzoom: 0, maxzoom: 8, sql: '{{zoom}}/{{x}}/{{y}}'}]
";

	fn gunzip(data: &[u8]) -> String {
		let mut text = String::new();
		GzDecoder::new(data).read_to_string(&mut text).unwrap();
		text
	}

	#[tokio::test]
	async fn writes_pyramid_and_metadata() -> Result<()> {
		let config = Config::from_yaml(CONFIG, Path::new("."))?;
		let kiln = Kiln::new(Arc::new(config), Arc::new(MockSource::new()));
		let file = NamedTempFile::new("dump.mbtiles")?;

		let count = MBTilesDump::write(&kiln, file.path(), ZoomRange::new(0, 2)?, 2).await?;
		assert_eq!(count, 21);

		let connection = Connection::open(file.path())?;
		let rows: u32 = connection.query_row("SELECT count(*) FROM tiles", [], |row| row.get(0))?;
		assert_eq!(rows, 21);

		// xyz 2/1/0 is stored at tms row 3
		let data: Vec<u8> = connection.query_row(
			"SELECT tile_data FROM tiles WHERE zoom_level = 2 AND tile_column = 1 AND tile_row = 3",
			[],
			|row| row.get(0),
		)?;
		assert_eq!(gunzip(&data), "roads|2/1/0;");

		let metadata = |name: &str| -> String {
			connection
				.query_row("SELECT value FROM metadata WHERE name = ?1", [name], |row| row.get(0))
				.unwrap()
		};
		assert_eq!(metadata("format"), "pbf");
		assert_eq!(metadata("name"), "Dump");
		assert_eq!(metadata("attribution"), "Someone");
		assert_eq!(metadata("minzoom"), "0");
		assert_eq!(metadata("maxzoom"), "2");
		assert_eq!(metadata("center"), "0,0,0");
		let json: serde_json::Value = serde_json::from_str(&metadata("json"))?;
		assert_eq!(
			json,
			json!({"vector_layers": [{"id": "roads", "description": "Streets", "fields": {"name": "String"}, "minzoom": 0, "maxzoom": 8}]})
		);
		Ok(())
	}

	#[tokio::test]
	async fn replaces_existing_file() -> Result<()> {
		let config = Config::from_yaml(CONFIG, Path::new("."))?;
		let kiln = Kiln::new(Arc::new(config), Arc::new(MockSource::new()));
		let file = NamedTempFile::new("dump.mbtiles")?;
		std::fs::write(file.path(), "not a database")?;

		MBTilesDump::write(&kiln, file.path(), ZoomRange::new(0, 0)?, 1).await?;
		let connection = Connection::open(file.path())?;
		let rows: u32 = connection.query_row("SELECT count(*) FROM tiles", [], |row| row.get(0))?;
		assert_eq!(rows, 1);
		Ok(())
	}
}
