//! Router composition for the tile server.
//!
//! Wires the handlers into an Axum `Router` without mixing in lifecycle concerns.

use super::{
	AppContext, cors,
	handlers::{error_404, ok_empty, serve_tile, serve_tilejson},
};
use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;

/// All tile endpoints of `context`:
///
/// - `/{tileset}/tilejson.json`
/// - `/{tileset}/{z}/{x}/{y}.mvt`
/// - `/favicon.ico` answers empty, every other path is a 404.
pub fn tile_router(context: Arc<AppContext>) -> Router {
	let router = Router::new()
		.route("/", get(|| async { error_404() }))
		.route("/favicon.ico", get(|| async { ok_empty() }))
		.route("/{tileset}/tilejson.json", get(serve_tilejson))
		.route("/{tileset}/{z}/{x}/{tile}", get(serve_tile))
		.fallback(|| async { error_404() })
		.with_state(context);

	cors::add_cors(router).layer(CatchPanicLayer::new())
}
