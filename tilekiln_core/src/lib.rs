//! Core types of tilekiln: tile coordinates, zoom ranges, and the tileset configuration
//! model that turns a tile into per-layer SQL.
//!
//! Nothing in this crate talks to a database. [`Config`] is the validated, immutable
//! form of a tileset definition file; [`Config::layer_queries`] yields the SQL a
//! renderer has to execute for a tile, and [`Config::tilejson`] describes the tileset
//! to clients.

pub mod config;
pub use config::*;

pub mod tilejson;
pub use tilejson::*;

pub mod types;
pub use types::*;
