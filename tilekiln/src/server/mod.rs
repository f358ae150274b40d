//! HTTP surface of tilekiln.
//!
//! - `state` holds the [`AppContext`]: the served tilesets and the cache-or-render logic.
//! - `routes` composes the handlers into an Axum `Router`.
//! - `handlers` implement the endpoints and response helpers.
//! - `cors` builds the cross-origin layers.
//! - `metrics` renders storage statistics for Prometheus.
//! - `tile_server` owns the listener lifecycle.

mod cors;
mod handlers;
mod metrics;
pub use metrics::*;
mod routes;
pub use routes::*;
mod state;
pub use state::*;
mod tile_server;
pub use tile_server::*;
