//! PostgreSQL tile storage.
//!
//! Layout:
//!
//! - `tilekiln.metadata(id, minzoom, maxzoom, metadata, updated)` holds one row per
//!   tileset, `metadata` being its [`TilesetMetadata`] as JSON.
//! - `tiles."<id>"` holds the tiles of a tileset, `PARTITION BY LIST (zoom)`, with one
//!   partition `tiles."<id>-z<zoom>"` per zoom so a zoom can be truncated at once. Ids cannot
//!   contain `-`, so a partition name never equals another tileset's table name.
//!
//! Tileset ids are restricted to `[A-Za-z0-9_]`, which makes them safe to quote as
//! identifiers.

use super::{StorageBackend, StorageError};
use crate::DatabaseConfig;
use async_trait::async_trait;
use sqlx::{Executor, PgPool};
use tilekiln_core::{Blob, Tile, TilesetId, TilesetMetadata};

const UNDEFINED_TABLE: &str = "42P01";
const CHECK_VIOLATION: &str = "23514";

const CREATE_SCHEMA: &str = "
CREATE SCHEMA IF NOT EXISTS tilekiln;
CREATE SCHEMA IF NOT EXISTS tiles;
CREATE TABLE IF NOT EXISTS tilekiln.metadata (
	id text PRIMARY KEY,
	minzoom smallint,
	maxzoom smallint,
	metadata text NOT NULL,
	updated timestamptz NOT NULL DEFAULT statement_timestamp()
);";

/// Tile storage in a PostgreSQL database.
#[derive(Clone, Debug)]
pub struct PgStorage {
	pool: PgPool,
}

impl PgStorage {
	pub async fn connect(config: &DatabaseConfig) -> Result<PgStorage, StorageError> {
		let pool = config.connect().await.map_err(|source| StorageError::Database {
			context: format!("failed to connect to storage database {config}"),
			source,
		})?;
		Ok(PgStorage::from_pool(pool))
	}

	pub fn from_pool(pool: PgPool) -> PgStorage {
		PgStorage { pool }
	}
}

fn table(id: &TilesetId) -> String {
	format!("tiles.\"{id}\"")
}

fn partition(id: &TilesetId, zoom: u8) -> String {
	format!("tiles.\"{id}-z{zoom}\"")
}

fn error_code(err: &sqlx::Error) -> Option<String> {
	err.as_database_error().and_then(|e| e.code()).map(|code| code.into_owned())
}

/// Turn a failed statement on tileset `id` into a [`StorageError`].
fn classify(id: &TilesetId, context: impl FnOnce() -> String) -> impl FnOnce(sqlx::Error) -> StorageError {
	move |source| {
		if error_code(&source).as_deref() == Some(UNDEFINED_TABLE) {
			StorageError::NotPrepared(id.to_string())
		} else {
			StorageError::Database {
				context: context(),
				source,
			}
		}
	}
}

fn parse_metadata(id: &str, text: &str) -> Result<TilesetMetadata, StorageError> {
	serde_json::from_str(text).map_err(|source| StorageError::Metadata {
		id: id.to_string(),
		source,
	})
}

#[async_trait]
impl StorageBackend for PgStorage {
	async fn create_schema(&self) -> Result<(), StorageError> {
		let database = |context: &'static str| {
			move |source| StorageError::Database {
				context: context.to_string(),
				source,
			}
		};
		let mut transaction = self.pool.begin().await.map_err(database("failed to start a transaction"))?;
		(&mut *transaction).execute(sqlx::raw_sql(CREATE_SCHEMA))
			.await
			.map_err(database("failed to create the storage schema"))?;
		transaction
			.commit()
			.await
			.map_err(database("failed to commit the storage schema"))?;
		Ok(())
	}

	async fn prepare_storage(&self, metadata: &TilesetMetadata) -> Result<(), StorageError> {
		let id = &metadata.id;
		let context = || format!("failed to prepare storage for '{id}'");

		let mut ddl = format!(
			"CREATE TABLE IF NOT EXISTS {} (
	zoom smallint NOT NULL,
	x integer NOT NULL,
	y integer NOT NULL,
	tile bytea NOT NULL,
	generated timestamptz NOT NULL DEFAULT statement_timestamp(),
	PRIMARY KEY (zoom, x, y)
) PARTITION BY LIST (zoom);\n",
			table(id)
		);
		if let (Some(min), Some(max)) = (metadata.minzoom, metadata.maxzoom) {
			for zoom in min..=max {
				ddl.push_str(&format!(
					"CREATE TABLE IF NOT EXISTS {} PARTITION OF {} FOR VALUES IN ({zoom});\n",
					partition(id, zoom),
					table(id)
				));
			}
		}

		let json = serde_json::to_string(metadata).map_err(|source| StorageError::Metadata {
			id: id.to_string(),
			source,
		})?;

		let mut transaction = self.pool.begin().await.map_err(classify(id, context))?;
		(&mut *transaction).execute(sqlx::raw_sql(&ddl))
			.await
			.map_err(|source| match error_code(&source).as_deref() {
				// the tiles schema is missing
				Some("3F000") => StorageError::NotPrepared("tilekiln schema".to_string()),
				_ => StorageError::Database {
					context: context(),
					source,
				},
			})?;
		sqlx::query(
			"INSERT INTO tilekiln.metadata (id, minzoom, maxzoom, metadata, updated)
			VALUES ($1, $2, $3, $4, statement_timestamp())
			ON CONFLICT (id) DO UPDATE
			SET minzoom = EXCLUDED.minzoom, maxzoom = EXCLUDED.maxzoom,
				metadata = EXCLUDED.metadata, updated = EXCLUDED.updated",
		)
		.bind(id.as_str())
		.bind(metadata.minzoom.map(i16::from))
		.bind(metadata.maxzoom.map(i16::from))
		.bind(json)
		.execute(&mut *transaction)
		.await
		.map_err(|source| {
			if error_code(&source).as_deref() == Some(UNDEFINED_TABLE) {
				StorageError::NotPrepared("tilekiln schema".to_string())
			} else {
				StorageError::Database {
					context: context(),
					source,
				}
			}
		})?;
		transaction.commit().await.map_err(classify(id, context))?;
		Ok(())
	}

	async fn tileset_metadata(&self, id: &TilesetId) -> Result<Option<TilesetMetadata>, StorageError> {
		let text = sqlx::query_scalar::<_, String>("SELECT metadata FROM tilekiln.metadata WHERE id = $1")
			.bind(id.as_str())
			.fetch_optional(&self.pool)
			.await
			.map_err(classify(id, || format!("failed to read metadata of '{id}'")))?;
		text.map(|text| parse_metadata(id.as_str(), &text)).transpose()
	}

	async fn all_metadata(&self) -> Result<Vec<TilesetMetadata>, StorageError> {
		let rows = sqlx::query_as::<_, (String, String)>("SELECT id, metadata FROM tilekiln.metadata ORDER BY id")
			.fetch_all(&self.pool)
			.await
			.map_err(|source| {
				if error_code(&source).as_deref() == Some(UNDEFINED_TABLE) {
					StorageError::NotPrepared("tilekiln schema".to_string())
				} else {
					StorageError::Database {
						context: "failed to list tilesets".to_string(),
						source,
					}
				}
			})?;
		rows.iter().map(|(id, text)| parse_metadata(id, text)).collect()
	}

	async fn get_tile(&self, id: &TilesetId, tile: &Tile) -> Result<Option<Blob>, StorageError> {
		let sql = format!("SELECT tile FROM {} WHERE zoom = $1 AND x = $2 AND y = $3", table(id));
		let tile_data = sqlx::query_scalar::<_, Vec<u8>>(&sql)
			.bind(i16::from(tile.zoom))
			.bind(tile.x as i32)
			.bind(tile.y as i32)
			.fetch_optional(&self.pool)
			.await
			.map_err(classify(id, || format!("failed to read tile {tile} of '{id}'")))?;
		Ok(tile_data.map(Blob::from))
	}

	async fn save_tile(&self, id: &TilesetId, tile: &Tile, blob: &Blob) -> Result<(), StorageError> {
		let sql = format!(
			"INSERT INTO {} (zoom, x, y, tile, generated)
			VALUES ($1, $2, $3, $4, statement_timestamp())
			ON CONFLICT (zoom, x, y) DO UPDATE
			SET tile = EXCLUDED.tile, generated = EXCLUDED.generated",
			table(id)
		);
		sqlx::query(&sql)
			.bind(i16::from(tile.zoom))
			.bind(tile.x as i32)
			.bind(tile.y as i32)
			.bind(blob.as_slice())
			.execute(&self.pool)
			.await
			.map_err(|source| {
				if error_code(&source).as_deref() == Some(CHECK_VIOLATION) {
					StorageError::NoPartition {
						id: id.clone(),
						zoom: tile.zoom,
					}
				} else {
					classify(id, || format!("failed to save tile {tile} of '{id}'"))(source)
				}
			})?;
		Ok(())
	}

	async fn delete_tiles(&self, id: &TilesetId, tiles: &[Tile]) -> Result<(), StorageError> {
		let zooms: Vec<i16> = tiles.iter().map(|t| i16::from(t.zoom)).collect();
		let xs: Vec<i32> = tiles.iter().map(|t| t.x as i32).collect();
		let ys: Vec<i32> = tiles.iter().map(|t| t.y as i32).collect();
		let sql = format!(
			"DELETE FROM {} AS t
			USING unnest($1::smallint[], $2::integer[], $3::integer[]) AS d(zoom, x, y)
			WHERE t.zoom = d.zoom AND t.x = d.x AND t.y = d.y",
			table(id)
		);
		let result = sqlx::query(&sql)
			.bind(zooms)
			.bind(xs)
			.bind(ys)
			.execute(&self.pool)
			.await
			.map_err(classify(id, || format!("failed to delete tiles of '{id}'")))?;
		log::debug!("deleted {} of {} tiles of '{id}'", result.rows_affected(), tiles.len());
		Ok(())
	}

	async fn truncate_tables(&self, id: &TilesetId, zooms: Option<&[u8]>) -> Result<(), StorageError> {
		let targets = match zooms {
			None => table(id),
			Some(zooms) => zooms
				.iter()
				.map(|zoom| partition(id, *zoom))
				.collect::<Vec<_>>()
				.join(", "),
		};
		let context = || format!("failed to truncate tiles of '{id}'");

		let mut transaction = self.pool.begin().await.map_err(classify(id, context))?;
		(&mut *transaction).execute(sqlx::raw_sql(&format!("TRUNCATE {targets};")))
			.await
			.map_err(classify(id, context))?;
		transaction.commit().await.map_err(classify(id, context))?;
		Ok(())
	}

	async fn remove_tileset(&self, id: &TilesetId) -> Result<(), StorageError> {
		let context = || format!("failed to remove tileset '{id}'");

		let mut transaction = self.pool.begin().await.map_err(classify(id, context))?;
		(&mut *transaction).execute(sqlx::raw_sql(&format!("DROP TABLE IF EXISTS {};", table(id))))
			.await
			.map_err(classify(id, context))?;
		sqlx::query("DELETE FROM tilekiln.metadata WHERE id = $1")
			.bind(id.as_str())
			.execute(&mut *transaction)
			.await
			.map_err(classify(id, context))?;
		transaction.commit().await.map_err(classify(id, context))?;
		Ok(())
	}

	async fn tile_counts(&self, id: &TilesetId) -> Result<Vec<(u8, u64)>, StorageError> {
		let sql = format!("SELECT zoom, count(*) FROM {} GROUP BY zoom ORDER BY zoom", table(id));
		let rows = sqlx::query_as::<_, (i16, i64)>(&sql)
			.fetch_all(&self.pool)
			.await
			.map_err(classify(id, || format!("failed to count tiles of '{id}'")))?;
		Ok(rows.into_iter().map(|(zoom, count)| (zoom as u8, count as u64)).collect())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn table_names() {
		let id = TilesetId::new("osm_base").unwrap();
		assert_eq!(table(&id), "tiles.\"osm_base\"");
		assert_eq!(partition(&id, 14), "tiles.\"osm_base-z14\"");
	}

	#[test]
	fn partitions_never_shadow_tileset_tables() {
		let roads = TilesetId::new("roads").unwrap();
		let roads_z3 = TilesetId::new("roads_z3").unwrap();
		assert_ne!(partition(&roads, 3), table(&roads_z3));
		assert!(TilesetId::new("roads-z3").is_err());
	}

	#[test]
	fn stored_metadata_is_json() {
		let metadata = TilesetMetadata {
			minzoom: Some(0),
			maxzoom: Some(14),
			..TilesetMetadata::new(TilesetId::new("osm").unwrap(), "OSM")
		};
		let text = serde_json::to_string(&metadata).unwrap();
		assert_eq!(parse_metadata("osm", &text).unwrap(), metadata);

		let err = parse_metadata("osm", "{}").unwrap_err();
		assert_eq!(err.to_string(), "stored metadata of 'osm' is invalid");
	}
}
