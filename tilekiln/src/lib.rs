//! The tilekiln tile server.
//!
//! Serves the tilesets of a [`server::AppContext`] over HTTP in one of three modes:
//! static (cache only), live (cache, rendering misses) or dev (always rendering). A
//! separate listener exports storage statistics for Prometheus.

pub mod config;
pub mod server;
