//! Argument groups shared by several commands.

use anyhow::{Context, Result, bail};
use std::{
	io::BufRead,
	path::{Path, PathBuf},
	sync::Arc,
	time::Duration,
};
use tilekiln::config::ServerConfig;
use tilekiln_container::{DatabaseConfig, Kiln, PgSource, PgStorage, Storage};
use tilekiln_core::{Config, Tile, TilesetId, ZoomRange};
use tilekiln_derive::context;

/// Connection to the database the layer queries run against.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct SourceArgs {
	/// Source database name
	#[arg(id = "source_dbname", long = "source-dbname", value_name = "NAME")]
	pub dbname: Option<String>,

	/// Source database host
	#[arg(id = "source_host", long = "source-host", value_name = "HOST")]
	pub host: Option<String>,

	/// Source database port
	#[arg(id = "source_port", long = "source-port", value_name = "PORT")]
	pub port: Option<u16>,

	/// Source database user
	#[arg(id = "source_username", long = "source-username", value_name = "USER")]
	pub username: Option<String>,

	/// Cancel layer queries running longer than this many seconds
	#[arg(id = "source_timeout", long = "source-timeout", value_name = "SECONDS")]
	pub timeout: Option<u64>,
}

impl SourceArgs {
	pub fn database_config(&self, pool_size: usize) -> DatabaseConfig {
		DatabaseConfig {
			dbname: self.dbname.clone(),
			host: self.host.clone(),
			port: self.port,
			username: self.username.clone(),
			pool_size: pool_size as u32,
			statement_timeout: self.timeout.map(Duration::from_secs),
		}
	}

	/// A kiln rendering `config` with at most `pool_size` source connections.
	pub async fn kiln(&self, config: Config, pool_size: usize) -> Result<Kiln> {
		let database = self.database_config(pool_size);
		let source = PgSource::connect(&database)
			.await
			.with_context(|| format!("connecting to source database {database}"))?;
		Ok(Kiln::new(Arc::new(config), Arc::new(source)))
	}
}

/// Connection to the database tiles are stored in.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct StorageArgs {
	/// Storage database name
	#[arg(id = "storage_dbname", long = "storage-dbname", value_name = "NAME")]
	pub dbname: Option<String>,

	/// Storage database host
	#[arg(id = "storage_host", long = "storage-host", value_name = "HOST")]
	pub host: Option<String>,

	/// Storage database port
	#[arg(id = "storage_port", long = "storage-port", value_name = "PORT")]
	pub port: Option<u16>,

	/// Storage database user
	#[arg(id = "storage_username", long = "storage-username", value_name = "USER")]
	pub username: Option<String>,
}

impl StorageArgs {
	pub fn database_config(&self, pool_size: usize) -> DatabaseConfig {
		DatabaseConfig {
			dbname: self.dbname.clone(),
			host: self.host.clone(),
			port: self.port,
			username: self.username.clone(),
			pool_size: pool_size as u32,
			statement_timeout: None,
		}
	}

	pub async fn storage(&self, pool_size: usize) -> Result<Storage> {
		let database = self.database_config(pool_size);
		let storage = PgStorage::connect(&database)
			.await
			.with_context(|| format!("connecting to storage database {database}"))?;
		Ok(Storage::new(storage))
	}
}

/// Where a server listens.
#[derive(clap::Args, Debug, Clone)]
pub struct ServerArgs {
	/// Bind socket to this host
	#[arg(long, default_value = "127.0.0.1", value_name = "HOST")]
	pub bind_host: String,

	/// Bind socket to this port
	#[arg(long, default_value_t = 8000, value_name = "PORT")]
	pub bind_port: u16,

	/// URL tiles are served under [default: http://<bind-host>:<bind-port>]
	#[arg(long, value_name = "URL")]
	pub base_url: Option<String>,

	/// Number of database connections per pool
	#[arg(short = 'n', long, default_value_t = num_cpus::get(), value_name = "COUNT")]
	pub num_threads: usize,
}

impl ServerArgs {
	pub fn server_config(&self) -> ServerConfig {
		ServerConfig::new(&self.bind_host, self.bind_port).with_base_url(self.base_url.clone())
	}
}

/// What and how much to render into a dump.
#[derive(clap::Args, Debug, Clone)]
pub struct DumpArgs {
	/// Tileset definition file (YAML)
	#[arg(long, value_name = "FILE")]
	pub config: PathBuf,

	#[arg(long, default_value_t = 0)]
	pub minzoom: u8,

	#[arg(long, default_value_t = 14)]
	pub maxzoom: u8,

	/// Number of concurrent renders
	#[arg(short = 'n', long, default_value_t = num_cpus::get(), value_name = "COUNT")]
	pub num_threads: usize,
}

impl DumpArgs {
	pub fn config_and_zooms(&self) -> Result<(Config, ZoomRange)> {
		let config = load_config(&self.config, None)?;
		let zooms = ZoomRange::new(self.minzoom, self.maxzoom)?;
		Ok((config, zooms))
	}
}

/// Load a tileset definition, optionally overriding its id.
#[context("loading tileset definition {:?}", path)]
pub fn load_config(path: &Path, id: Option<&TilesetId>) -> Result<Config> {
	let config = Config::from_path(path)?;
	Ok(match id {
		Some(id) => config.with_id(id.clone()),
		None => config,
	})
}

/// The tileset a storage command acts on: `--id` if given, else the id of `--config`.
pub fn tileset_id(config: Option<&PathBuf>, id: Option<&TilesetId>) -> Result<TilesetId> {
	match (id, config) {
		(Some(id), _) => Ok(id.clone()),
		(None, Some(path)) => Ok(load_config(path, None)?.id().clone()),
		(None, None) => bail!("missing one of '--id' or '--config'"),
	}
}

/// Distinct tiles from `z/x/y` lines, in ascending order. Blank lines are skipped.
pub fn read_tiles(reader: impl BufRead) -> Result<Vec<Tile>> {
	let mut tiles = Vec::new();
	for (index, line) in reader.lines().enumerate() {
		let line = line.context("reading tile list")?;
		if line.trim().is_empty() {
			continue;
		}
		let tile: Tile = line.parse().with_context(|| format!("line {} of tile list", index + 1))?;
		tiles.push(tile);
	}
	tiles.sort_unstable();
	tiles.dedup();
	Ok(tiles)
}
