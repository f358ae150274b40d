use async_trait::async_trait;
use tilekiln_core::Blob;

/// Error type of source database implementations.
pub type SourceError = Box<dyn std::error::Error + Send + Sync>;

/// The spatial database tiles are rendered from.
#[async_trait]
pub trait SourceDatabase: Send + Sync {
	/// Check out one exclusive connection.
	async fn session(&self) -> Result<Box<dyn SourceSession>, SourceError>;
}

/// One exclusive connection to the source database.
///
/// Statements on a session run one after another.
#[async_trait]
pub trait SourceSession: Send {
	/// Run a layer query returning a single `bytea`. `NULL` or no row yields an empty blob.
	async fn fetch_layer(&mut self, sql: &str) -> Result<Blob, SourceError>;
}
