//! The tileset configuration model.
//!
//! A tileset is described by a YAML document:
//!
//! ```yaml
//! metadata:
//!   name: Example
//!   attribution: © contributors
//!   bounds: [-180, -85.05, 180, 85.05]
//! vector_layers:
//!   water:
//!     geometry_type: [polygon]
//!     sql:
//!       - minzoom: 0
//!         maxzoom: 8
//!         file: water_low.sql
//!       - minzoom: 9
//!         maxzoom: 14
//!         sql: SELECT ST_AsMVTGeom(way, {{unbuffered_bbox}}, {{extent}}) FROM water WHERE way && {{bbox}}
//! ```
//!
//! Loading validates everything up front, so a [`Config`] never fails at render time.

mod definition;
pub use definition::*;

mod error;
pub use error::*;

mod layer;
pub use layer::*;

mod source;

mod template;
pub use template::*;

mod tileset_config;
pub use tileset_config::*;
