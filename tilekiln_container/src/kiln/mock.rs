use super::{SourceDatabase, SourceError, SourceSession};
use async_trait::async_trait;
use regex::Regex;
use std::{
	sync::{
		Arc, LazyLock,
		atomic::{AtomicUsize, Ordering},
	},
	time::Duration,
};
use tilekiln_core::Blob;

static LAYER_QUERY: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(?s)^WITH mvtgeom AS\n\(\n(.*)\n\)\nSELECT ST_AsMVT\(mvtgeom\.\*, '([^']*)', \d+\)").expect("layer query regex is valid")
});

/// An in-memory source database for tests.
///
/// Instead of MVT it answers every layer query with `"<layer>|<inner query>;"`, so a
/// template of `{{zoom}}/{{x}}/{{y}}` yields `roads|3/1/2;` for tile `3/1/2`.
#[derive(Debug, Default)]
pub struct MockSource {
	failing_layer: Option<String>,
	delay: Option<Duration>,
	sessions: AtomicUsize,
	queries: Arc<AtomicUsize>,
}

impl MockSource {
	pub fn new() -> MockSource {
		MockSource::default()
	}

	/// Make every query of `layer` fail.
	pub fn fail_layer(mut self, layer: &str) -> MockSource {
		self.failing_layer = Some(layer.to_string());
		self
	}

	/// Wait this long before answering each query.
	pub fn with_delay(mut self, delay: Duration) -> MockSource {
		self.delay = Some(delay);
		self
	}

	/// Number of sessions handed out so far.
	pub fn session_count(&self) -> usize {
		self.sessions.load(Ordering::SeqCst)
	}

	/// Number of layer queries answered or failed so far.
	pub fn query_count(&self) -> usize {
		self.queries.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl SourceDatabase for MockSource {
	async fn session(&self) -> Result<Box<dyn SourceSession>, SourceError> {
		self.sessions.fetch_add(1, Ordering::SeqCst);
		Ok(Box::new(MockSession {
			failing_layer: self.failing_layer.clone(),
			delay: self.delay,
			queries: Arc::clone(&self.queries),
		}))
	}
}

struct MockSession {
	failing_layer: Option<String>,
	delay: Option<Duration>,
	queries: Arc<AtomicUsize>,
}

#[async_trait]
impl SourceSession for MockSession {
	async fn fetch_layer(&mut self, sql: &str) -> Result<Blob, SourceError> {
		self.queries.fetch_add(1, Ordering::SeqCst);
		if let Some(delay) = self.delay {
			tokio::time::sleep(delay).await;
		}

		let captures = LAYER_QUERY
			.captures(sql)
			.ok_or_else(|| format!("not a layer query: {sql}"))?;
		let (inner, layer) = (captures[1].trim(), &captures[2]);

		if self.failing_layer.as_deref() == Some(layer) {
			return Err(format!("relation \"{layer}\" does not exist").into());
		}
		Ok(Blob::from(format!("{layer}|{inner};")))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	const QUERY: &str = "WITH mvtgeom AS\n(\nSELECT 1\n)\nSELECT ST_AsMVT(mvtgeom.*, 'roads', 4096)\nFROM mvtgeom;";

	#[tokio::test]
	async fn answers_with_layer_and_query() {
		let source = MockSource::new();
		let mut session = source.session().await.unwrap();
		assert_eq!(session.fetch_layer(QUERY).await.unwrap().as_str(), "roads|SELECT 1;");
		assert_eq!((source.session_count(), source.query_count()), (1, 1));
	}

	#[tokio::test]
	async fn failing_layer() {
		let source = MockSource::new().fail_layer("roads");
		let mut session = source.session().await.unwrap();
		let err = session.fetch_layer(QUERY).await.unwrap_err();
		assert_eq!(err.to_string(), "relation \"roads\" does not exist");
	}

	#[tokio::test]
	async fn rejects_other_sql() {
		let source = MockSource::new();
		let mut session = source.session().await.unwrap();
		assert!(session.fetch_layer("SELECT 1").await.is_err());
	}
}
