//! Connection settings shared by the source database and the tile storage.

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::{fmt, time::Duration};

/// Where and how to connect to a PostgreSQL database.
///
/// Unset fields fall back to the usual libpq environment (`PGHOST`, `PGDATABASE`, ...).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DatabaseConfig {
	pub dbname: Option<String>,
	pub host: Option<String>,
	pub port: Option<u16>,
	pub username: Option<String>,
	/// Upper bound of open connections.
	pub pool_size: u32,
	/// Aborts statements running longer than this.
	pub statement_timeout: Option<Duration>,
}

impl DatabaseConfig {
	pub fn connect_options(&self) -> PgConnectOptions {
		let mut options = PgConnectOptions::new().application_name("tilekiln");
		if let Some(dbname) = &self.dbname {
			options = options.database(dbname);
		}
		if let Some(host) = &self.host {
			options = options.host(host);
		}
		if let Some(port) = self.port {
			options = options.port(port);
		}
		if let Some(username) = &self.username {
			options = options.username(username);
		}
		if let Some(timeout) = self.statement_timeout {
			options = options.options([("statement_timeout", format!("{}ms", timeout.as_millis()))]);
		}
		options
	}

	/// Open a pool of at most `pool_size` connections.
	pub async fn connect(&self) -> Result<PgPool, sqlx::Error> {
		log::debug!("connecting to {self}");
		PgPoolOptions::new()
			.max_connections(self.pool_size.max(1))
			.connect_with(self.connect_options())
			.await
	}
}

impl fmt::Display for DatabaseConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"postgresql://{}@{}:{}/{}",
			self.username.as_deref().unwrap_or(""),
			self.host.as_deref().unwrap_or(""),
			self.port.map(|p| p.to_string()).unwrap_or_default(),
			self.dbname.as_deref().unwrap_or("")
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn explicit_fields_win() {
		let config = DatabaseConfig {
			dbname: Some("gis".to_string()),
			host: Some("db.local".to_string()),
			port: Some(5433),
			username: Some("tiles".to_string()),
			pool_size: 4,
			statement_timeout: None,
		};
		let options = config.connect_options();
		assert_eq!(options.get_database(), Some("gis"));
		assert_eq!(options.get_host(), "db.local");
		assert_eq!(options.get_port(), 5433);
		assert_eq!(options.get_username(), "tiles");
		assert_eq!(config.to_string(), "postgresql://tiles@db.local:5433/gis");
	}

	#[test]
	fn display_of_defaults() {
		assert_eq!(DatabaseConfig::default().to_string(), "postgresql://@:/");
	}
}
