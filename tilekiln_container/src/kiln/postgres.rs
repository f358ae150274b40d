use super::{SourceDatabase, SourceError, SourceSession};
use crate::DatabaseConfig;
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, pool::PoolConnection};
use tilekiln_core::Blob;

/// PostGIS source database over a `sqlx` pool.
///
/// Size the pool to the number of tiles that should render in parallel.
#[derive(Clone, Debug)]
pub struct PgSource {
	pool: PgPool,
}

impl PgSource {
	pub async fn connect(config: &DatabaseConfig) -> Result<PgSource, sqlx::Error> {
		Ok(PgSource::from_pool(config.connect().await?))
	}

	pub fn from_pool(pool: PgPool) -> PgSource {
		PgSource { pool }
	}
}

#[async_trait]
impl SourceDatabase for PgSource {
	async fn session(&self) -> Result<Box<dyn SourceSession>, SourceError> {
		let connection = self.pool.acquire().await?;
		Ok(Box::new(PgSession { connection }))
	}
}

struct PgSession {
	connection: PoolConnection<Postgres>,
}

#[async_trait]
impl SourceSession for PgSession {
	async fn fetch_layer(&mut self, sql: &str) -> Result<Blob, SourceError> {
		// every tile has different SQL, so caching prepared statements only costs memory
		let row = sqlx::query_scalar::<_, Option<Vec<u8>>>(sql)
			.persistent(false)
			.fetch_optional(&mut *self.connection)
			.await?;
		Ok(row.flatten().map(Blob::from).unwrap_or_default())
	}
}
