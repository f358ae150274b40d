//! Tile coordinates in the Web Mercator tile pyramid.
//!
//! A [`Tile`] is an immutable `(zoom, x, y)` triple in the XYZ scheme (row 0 at the
//! top). It is validated on construction, parsed from and printed as `"z/x/y"`, and
//! knows its own extent in EPSG:3857 metres.
//!
//! # Examples
//!
//! ```
//! use tilekiln_core::Tile;
//!
//! let tile: Tile = "10/3/5".parse().unwrap();
//! assert_eq!(tile, Tile::new(10, 3, 5).unwrap());
//! assert_eq!(tile.to_string(), "10/3/5");
//! ```

use super::MercatorBBox;
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Highest zoom level a [`Tile`] can address.
pub const MAX_ZOOM: u8 = 31;

/// Half the circumference of the Web Mercator world, in metres.
pub const MERCATOR_HALF_WORLD: f64 = 20_037_508.342_789_244;

/// Reasons a tile coordinate can be rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TileError {
	#[error("zoom {0} is larger than the maximum zoom {MAX_ZOOM}")]
	ZoomTooLarge(u8),
	#[error("tile {zoom}/{x}/{y} is outside the {size}x{size} grid of zoom {zoom}")]
	OutOfRange { zoom: u8, x: u32, y: u32, size: u64 },
	#[error("'{0}' is not a tile coordinate of the form z/x/y")]
	Malformed(String),
}

/// A tile coordinate: zoom level plus column `x` and row `y`.
///
/// Ordering is by zoom, then `x`, then `y`, which keeps bulk operations over sets of
/// tiles deterministic.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tile {
	pub zoom: u8,
	pub x: u32,
	pub y: u32,
}

impl Tile {
	/// Create a tile, checking `zoom <= 31` and `0 <= x, y < 2^zoom`.
	pub fn new(zoom: u8, x: u32, y: u32) -> Result<Tile, TileError> {
		if zoom > MAX_ZOOM {
			return Err(TileError::ZoomTooLarge(zoom));
		}
		let size = 1u64 << zoom;
		if u64::from(x) >= size || u64::from(y) >= size {
			return Err(TileError::OutOfRange { zoom, x, y, size });
		}
		Ok(Tile { zoom, x, y })
	}

	/// Number of tiles along one axis at this tile's zoom.
	pub fn grid_size(&self) -> u64 {
		1u64 << self.zoom
	}

	/// Row index in the TMS scheme (row 0 at the bottom), as used by MBTiles.
	pub fn tms_y(&self) -> u32 {
		(self.grid_size() - 1 - u64::from(self.y)) as u32
	}

	/// Width (and height) of the tile in EPSG:3857 metres.
	pub fn tile_length(&self) -> f64 {
		2.0 * MERCATOR_HALF_WORLD / self.grid_size() as f64
	}

	/// Extent of the tile in EPSG:3857, grown on every side by `buffer` tile widths.
	///
	/// `buffer` is a fraction of the tile width, so `0.0` is the exact tile and
	/// `64.0 / 4096.0` adds 64 pixels of a 4096 extent tile.
	pub fn mercator_bbox(&self, buffer: f64) -> MercatorBBox {
		let length = self.tile_length();
		let margin = length * buffer;
		let x_min = -MERCATOR_HALF_WORLD + f64::from(self.x) * length;
		let y_max = MERCATOR_HALF_WORLD - f64::from(self.y) * length;
		MercatorBBox {
			x_min: x_min - margin,
			y_min: y_max - length - margin,
			x_max: x_min + length + margin,
			y_max: y_max + margin,
		}
	}
}

impl fmt::Display for Tile {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
	}
}

/// Same as `Display`, so tiles read well in log lines and assertion failures.
impl fmt::Debug for Tile {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Tile({}/{}/{})", self.zoom, self.x, self.y)
	}
}

impl FromStr for Tile {
	type Err = TileError;

	/// Parse `"z/x/y"`, ignoring surrounding whitespace and an optional `.mvt` suffix.
	fn from_str(text: &str) -> Result<Tile, TileError> {
		let malformed = || TileError::Malformed(text.trim().to_string());

		let trimmed = text.trim();
		let trimmed = trimmed.strip_suffix(".mvt").unwrap_or(trimmed);
		let mut parts = trimmed.split('/');
		let (Some(zoom), Some(x), Some(y), None) = (parts.next(), parts.next(), parts.next(), parts.next()) else {
			return Err(malformed());
		};

		Tile::new(
			zoom.parse().map_err(|_| malformed())?,
			x.parse().map_err(|_| malformed())?,
			y.parse().map_err(|_| malformed())?,
		)
	}
}
