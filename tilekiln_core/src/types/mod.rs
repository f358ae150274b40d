//! Contains types like tile coordinates, zoom ranges, bounding boxes and byte buffers.

mod blob;
pub use blob::*;

mod mercator_bbox;
pub use mercator_bbox::*;

mod tile;
pub use tile::*;

mod tileset_id;
pub use tileset_id::*;

mod zoom_range;
pub use zoom_range::*;
