//! Prometheus exporter over the tile storage.

use super::handlers::{error_500, format_error_chain, ok_text};
use anyhow::Result;
use axum::{Router, body::Body, extract::State, response::Response, routing::get};
use std::fmt::Write;
use tilekiln_container::Storage;

const EXPOSITION_MIME: &str = "text/plain; version=0.0.4; charset=utf-8";

/// `/metrics`, computed from `storage` at scrape time.
pub fn metrics_router(storage: Storage) -> Router {
	Router::new().route("/metrics", get(serve_metrics)).with_state(storage)
}

async fn serve_metrics(State(storage): State<Storage>) -> Response<Body> {
	match render_metrics(&storage).await {
		Ok(text) => ok_text(EXPOSITION_MIME, text),
		Err(err) => {
			log::warn!("send 500 for metrics request. Error:\n{}", format_error_chain(&err));
			error_500()
		}
	}
}

/// Tile counts of every stored tileset, by zoom, in the text exposition format.
pub async fn render_metrics(storage: &Storage) -> Result<String> {
	let mut text = String::new();
	text.push_str("# HELP tilekiln_tiles Number of tiles in storage.\n");
	text.push_str("# TYPE tilekiln_tiles gauge\n");
	for tileset in storage.get_tilesets().await? {
		for (zoom, count) in tileset.tile_counts().await? {
			writeln!(text, "tilekiln_tiles{{tileset=\"{}\",zoom=\"{zoom}\"}} {count}", tileset.id())?;
		}
	}
	Ok(text)
}

#[cfg(test)]
mod tests {
	use super::*;
	use axum::{
		body::to_bytes,
		http::{Request, StatusCode, header},
	};
	use pretty_assertions::assert_eq;
	use tilekiln_core::{Blob, TilesetId, TilesetMetadata};
	use tower::ServiceExt;

	async fn storage() -> Storage {
		let storage = Storage::memory();
		storage.create_schema().await.unwrap();
		for (id, maxzoom) in [("roads", 2), ("water", 1)] {
			let metadata = TilesetMetadata {
				minzoom: Some(0),
				maxzoom: Some(maxzoom),
				..TilesetMetadata::new(TilesetId::new(id).unwrap(), id)
			};
			storage.prepare_storage(&metadata).await.unwrap();
		}
		let roads = TilesetId::new("roads").unwrap();
		for tile in ["0/0/0", "2/1/1", "2/1/2"] {
			storage
				.save_tile(&roads, &tile.parse().unwrap(), &Blob::from("x"))
				.await
				.unwrap();
		}
		storage
	}

	#[tokio::test]
	async fn counts_by_tileset_and_zoom() {
		let text = render_metrics(&storage().await).await.unwrap();
		assert_eq!(
			text,
			"# HELP tilekiln_tiles Number of tiles in storage.\n\
			 # TYPE tilekiln_tiles gauge\n\
			 tilekiln_tiles{tileset=\"roads\",zoom=\"0\"} 1\n\
			 tilekiln_tiles{tileset=\"roads\",zoom=\"2\"} 2\n"
		);
	}

	#[tokio::test]
	async fn missing_schema_is_a_500() {
		let router = metrics_router(Storage::memory());
		let req = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
		assert_eq!(router.oneshot(req).await.unwrap().status(), StatusCode::INTERNAL_SERVER_ERROR);
	}

	#[tokio::test]
	async fn metrics_endpoint() {
		let router = metrics_router(storage().await);
		let req = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
		let resp = router.oneshot(req).await.unwrap();
		assert_eq!(resp.status(), StatusCode::OK);
		assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), EXPOSITION_MIME);
		let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
		assert!(String::from_utf8_lossy(&body).contains("tilekiln_tiles{tileset=\"roads\",zoom=\"2\"} 2"));
	}
}
