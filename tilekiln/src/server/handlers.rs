//! HTTP handlers and small response helpers.
//!
//! CORS headers are added by the layers in `cors`, never here.

use super::AppContext;
use axum::{
	body::Body,
	extract::{Path, State},
	http::header,
	response::Response,
};
use std::sync::Arc;
use tilekiln_core::{Blob, Tile};

pub const MVT_MIME: &str = "application/vnd.mapbox-vector-tile";

/// `GET /{tileset}/tilejson.json`
pub async fn serve_tilejson(Path(prefix): Path<String>, State(context): State<Arc<AppContext>>) -> Response<Body> {
	log::debug!("handle tilejson request: {prefix}");
	match context.tileset(&prefix) {
		Some(served) => ok_json(&context.tilejson(served)),
		None => tileset_not_found(&prefix),
	}
}

/// `GET /{tileset}/{z}/{x}/{y}.mvt`
pub async fn serve_tile(
	Path((prefix, zoom, x, file)): Path<(String, String, String, String)>,
	State(context): State<Arc<AppContext>>,
) -> Response<Body> {
	log::debug!("handle tile request: {prefix}/{zoom}/{x}/{file}");

	let Some(served) = context.tileset(&prefix) else {
		return tileset_not_found(&prefix);
	};
	let Some(tile) = parse_tile(&zoom, &x, &file) else {
		log::debug!("send 404 for malformed tile path: {prefix}/{zoom}/{x}/{file}");
		return error_404();
	};

	match context.tile(served, &tile).await {
		Ok(Some(blob)) => ok_tile(blob),
		Ok(None) => {
			log::debug!("send 404 for tile request: {prefix}/{tile}");
			error_404()
		}
		Err(err) => {
			log::warn!(
				"send 500 for tile request: {prefix}/{tile}. Error:\n{}",
				format_error_chain(&err)
			);
			error_500()
		}
	}
}

fn parse_tile(zoom: &str, x: &str, file: &str) -> Option<Tile> {
	let y = file.strip_suffix(".mvt")?;
	Tile::new(zoom.parse().ok()?, x.parse().ok()?, y.parse().ok()?).ok()
}

// --- small helpers -----------------------------------------------------------

pub fn format_error_chain(err: &anyhow::Error) -> String {
	let mut result = err.to_string();

	for (i, cause) in err.chain().skip(1).enumerate() {
		if i == 0 {
			result.push_str("\n  Caused by:");
		}
		result.push_str(&format!("\n    {cause}"));
	}

	result
}

fn error_with(status: u16, message: &str) -> Response<Body> {
	Response::builder()
		.status(status)
		.header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
		.body(Body::from(message.to_string()))
		.expect("status and header are valid")
}

pub fn error_404() -> Response<Body> {
	error_with(404, "Not Found")
}

pub fn error_500() -> Response<Body> {
	error_with(500, "Internal Server Error")
}

fn tileset_not_found(prefix: &str) -> Response<Body> {
	log::debug!("send 404 for unknown tileset: {prefix}");
	error_with(404, &format!("Tileset {prefix} not found on server."))
}

fn ok_with(mime: &str, body: Body) -> Response<Body> {
	Response::builder()
		.status(200)
		.header(header::CONTENT_TYPE, mime)
		.body(body)
		.expect("status and header are valid")
}

pub fn ok_tile(blob: Blob) -> Response<Body> {
	ok_with(MVT_MIME, Body::from(blob.into_vec()))
}

pub fn ok_json(json: &str) -> Response<Body> {
	ok_with("application/json", Body::from(json.to_string()))
}

pub fn ok_text(mime: &str, text: String) -> Response<Body> {
	ok_with(mime, Body::from(text))
}

pub fn ok_empty() -> Response<Body> {
	ok_with("text/plain; charset=utf-8", Body::empty())
}
